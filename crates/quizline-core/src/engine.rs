//! Central quiz engine.
//!
//! Loads a test from the content store, opens a timed [`LiveSession`] for
//! it, and routes every submission through one routine that grades at most
//! once and writes to the result sink at most once.

use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::attempt::Attempt;
use crate::error::QuizError;
use crate::model::{AttemptContext, Identity};
use crate::results::QuizResult;
use crate::session::LiveSession;
use crate::traits::{ContentStore, ResultSink};

/// Time allowed when a test does not carry its own limit.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 1800;
/// Passing percentage when a test does not carry its own.
pub const DEFAULT_PASSING_SCORE: u32 = 70;

/// Configuration for the quiz engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fallback time limit in seconds.
    pub default_time_limit_secs: u64,
    /// Fallback passing percentage.
    pub passing_score: u32,
    /// Wall-clock length of one countdown second.
    pub tick_period: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            passing_score: DEFAULT_PASSING_SCORE,
            tick_period: Duration::from_secs(1),
        }
    }
}

/// What caused a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Timeout,
}

/// Result of a submit call.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub result: QuizResult,
    pub trigger: SubmitTrigger,
    /// `true` only for the call that graded the attempt.
    pub first_submission: bool,
    /// Set when the result sink rejected the result. The result is still
    /// authoritative.
    pub sink_error: Option<QuizError>,
}

/// Grade `attempt` and hand the result to `sink`.
///
/// Repeated calls return the cached result and do not write again. Sink
/// failures are logged and reported in the outcome; they never reopen the
/// attempt.
pub async fn submit(
    attempt: &mut Attempt,
    sink: &dyn ResultSink,
    trigger: SubmitTrigger,
) -> SubmitOutcome {
    let (result, first_submission) = attempt.submit();
    let result = result.clone();

    let mut sink_error = None;
    if first_submission {
        tracing::info!(
            attempt = %result.attempt_id,
            test = %result.test_id,
            score = result.percentage,
            ?trigger,
            "attempt submitted"
        );
        let context = AttemptContext {
            user_id: result.user_id.clone(),
            test_id: result.test_id.clone(),
        };
        if let Err(e) = sink.record(&result, &context).await {
            tracing::error!("failed to record result for attempt {}: {e:#}", result.attempt_id);
            sink_error = Some(QuizError::ResultSinkFailure(format!("{e:#}")));
        }
    }

    SubmitOutcome {
        result,
        trigger,
        first_submission,
        sink_error,
    }
}

/// The quiz engine.
pub struct QuizEngine {
    store: Arc<dyn ContentStore>,
    sink: Arc<dyn ResultSink>,
    config: EngineConfig,
}

impl QuizEngine {
    pub fn new(
        store: Arc<dyn ContentStore>,
        sink: Arc<dyn ResultSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub fn sink(&self) -> &Arc<dyn ResultSink> {
        &self.sink
    }

    /// Load a test into a fresh attempt without starting its countdown.
    ///
    /// Fails with `ContentUnavailable` when the store errors or has no
    /// usable questions, and with `PremiumRequired` when `identity` may not
    /// open the test. No attempt exists after a failure.
    #[instrument(skip(self, identity), fields(user = %identity.user_id, store = self.store.name()))]
    pub async fn load_attempt(
        &self,
        identity: &Identity,
        test_id: &str,
    ) -> Result<Attempt, QuizError> {
        if test_id.trim().is_empty() {
            return Err(QuizError::content(test_id, "test id is empty"));
        }

        let info = self.store.fetch_test(test_id).await.map_err(|e| {
            tracing::warn!("failed to fetch test metadata: {e:#}");
            QuizError::content(test_id, format!("{e:#}"))
        })?;

        if let Some(info) = &info {
            if !identity.can_access(info) {
                return Err(QuizError::PremiumRequired(test_id.to_string()));
            }
        }

        // Questions carry the answer key, so they are only fetched once the
        // identity may open the test.
        let questions = self.store.fetch_questions(test_id).await.map_err(|e| {
            tracing::warn!("failed to fetch questions: {e:#}");
            QuizError::content(test_id, format!("{e:#}"))
        })?;

        let allotted = info
            .as_ref()
            .and_then(|i| i.time_limit_secs())
            .unwrap_or(self.config.default_time_limit_secs);
        let passing_score = info
            .as_ref()
            .and_then(|i| i.passing_score)
            .unwrap_or(self.config.passing_score);

        let attempt = Attempt::new(
            test_id,
            identity.user_id.clone(),
            questions,
            allotted,
            passing_score,
        )?;
        tracing::info!(
            attempt = %attempt.id(),
            questions = attempt.len(),
            allotted_secs = allotted,
            "attempt started"
        );
        Ok(attempt)
    }

    /// Open a timed session: load the attempt and start its countdown.
    pub async fn start(&self, identity: &Identity, test_id: &str) -> Result<LiveSession, QuizError> {
        let attempt = self.load_attempt(identity, test_id).await?;
        Ok(LiveSession::new(
            attempt,
            Arc::clone(&self.sink),
            self.config.tick_period,
        ))
    }

    /// Submit an attempt driven outside a live session.
    pub async fn submit(&self, attempt: &mut Attempt, trigger: SubmitTrigger) -> SubmitOutcome {
        submit(attempt, self.sink.as_ref(), trigger).await
    }

    /// Previously recorded results for a user.
    pub async fn history(&self, user_id: &str) -> anyhow::Result<Vec<QuizResult>> {
        self.sink.history(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tier;
    use crate::testing::{bank, question, RecordingSink, StaticStore};

    fn engine(store: StaticStore, sink: Arc<RecordingSink>) -> QuizEngine {
        QuizEngine::new(Arc::new(store), sink, EngineConfig::default())
    }

    #[tokio::test]
    async fn empty_content_is_unavailable() {
        let sink = Arc::new(RecordingSink::default());
        let engine = engine(StaticStore::default().with_questions("t1", vec![]), sink);

        let err = engine
            .load_attempt(&Identity::new("u1", Tier::Free), "t1")
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::ContentUnavailable { ref test_id, .. } if test_id == "t1"));
    }

    #[tokio::test]
    async fn fetch_failure_is_unavailable() {
        let sink = Arc::new(RecordingSink::default());
        let engine = engine(StaticStore::failing("connection refused"), sink);

        let err = engine
            .load_attempt(&Identity::new("u1", Tier::Free), "t1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn blank_test_id_rejected() {
        let sink = Arc::new(RecordingSink::default());
        let engine = engine(StaticStore::default(), sink);
        let err = engine
            .load_attempt(&Identity::new("u1", Tier::Free), "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::ContentUnavailable { .. }));
    }

    #[tokio::test]
    async fn uses_test_metadata_for_limits() {
        let sink = Arc::new(RecordingSink::default());
        let engine = engine(StaticStore::default().with_bank(bank("t1", Tier::Free, 3)), sink);

        let attempt = engine
            .load_attempt(&Identity::new("u1", Tier::Free), "t1")
            .await
            .unwrap();
        assert_eq!(attempt.allotted_secs(), 10 * 60);
        assert_eq!(attempt.passing_score(), 60);
        assert_eq!(attempt.len(), 3);
        assert_eq!(attempt.user_id(), "u1");
    }

    #[tokio::test]
    async fn falls_back_to_configured_limits() {
        let sink = Arc::new(RecordingSink::default());
        let engine = engine(
            StaticStore::default().with_questions("t1", vec![question("q1", 0)]),
            sink,
        );

        let attempt = engine
            .load_attempt(&Identity::new("u1", Tier::Free), "t1")
            .await
            .unwrap();
        assert_eq!(attempt.allotted_secs(), DEFAULT_TIME_LIMIT_SECS);
        assert_eq!(attempt.passing_score(), DEFAULT_PASSING_SCORE);
    }

    #[tokio::test]
    async fn premium_test_gated_for_free_tier() {
        let sink = Arc::new(RecordingSink::default());
        let engine = engine(
            StaticStore::default().with_bank(bank("p1", Tier::Premium, 2)),
            sink,
        );

        let err = engine
            .load_attempt(&Identity::new("u1", Tier::Free), "p1")
            .await
            .unwrap_err();
        assert_eq!(err, QuizError::PremiumRequired("p1".into()));

        assert!(engine
            .load_attempt(&Identity::new("u2", Tier::Premium), "p1")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn gated_test_never_fetches_questions() {
        let store = Arc::new(StaticStore::default().with_bank(bank("p1", Tier::Premium, 2)));
        let engine = QuizEngine::new(
            Arc::clone(&store) as Arc<dyn ContentStore>,
            Arc::new(RecordingSink::default()),
            EngineConfig::default(),
        );

        let err = engine
            .load_attempt(&Identity::new("u1", Tier::Free), "p1")
            .await
            .unwrap_err();
        assert_eq!(err, QuizError::PremiumRequired("p1".into()));
        assert_eq!(store.question_fetches(), 0);

        engine
            .load_attempt(&Identity::new("u2", Tier::Premium), "p1")
            .await
            .unwrap();
        assert_eq!(store.question_fetches(), 1);
    }

    #[tokio::test]
    async fn submit_records_once() {
        let sink = Arc::new(RecordingSink::default());
        let engine = engine(
            StaticStore::default().with_bank(bank("t1", Tier::Free, 3)),
            Arc::clone(&sink),
        );

        let mut attempt = engine
            .load_attempt(&Identity::new("u1", Tier::Free), "t1")
            .await
            .unwrap();
        attempt.select_answer(0, 0).unwrap();

        let first = engine.submit(&mut attempt, SubmitTrigger::Manual).await;
        let second = engine.submit(&mut attempt, SubmitTrigger::Timeout).await;

        assert!(first.first_submission);
        assert!(!second.first_submission);
        assert_eq!(first.result, second.result);
        assert_eq!(sink.recorded().len(), 1);
        assert_eq!(sink.recorded()[0].1.test_id, "t1");
    }

    #[tokio::test]
    async fn sink_failure_does_not_reopen_attempt() {
        let sink = Arc::new(RecordingSink::failing());
        let engine = engine(
            StaticStore::default().with_bank(bank("t1", Tier::Free, 2)),
            Arc::clone(&sink),
        );

        let mut attempt = engine
            .load_attempt(&Identity::new("u1", Tier::Free), "t1")
            .await
            .unwrap();
        let outcome = engine.submit(&mut attempt, SubmitTrigger::Manual).await;

        assert!(matches!(
            outcome.sink_error,
            Some(QuizError::ResultSinkFailure(_))
        ));
        assert!(attempt.is_submitted());
        assert_eq!(attempt.result(), Some(&outcome.result));
    }
}
