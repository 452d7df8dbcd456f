//! REST document store client.
//!
//! Talks to a remote quiz backend that serves tests and questions and
//! accepts results:
//!
//! - `GET  {base}/tests`
//! - `GET  {base}/tests/{id}`
//! - `GET  {base}/tests/{id}/questions`
//! - `POST {base}/results`
//! - `GET  {base}/results?user_id={user}`

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizline_core::model::{AttemptContext, Question, TestInfo};
use quizline_core::results::QuizResult;
use quizline_core::traits::{ContentStore, ResultSink};

use crate::error::StoreError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP-backed content store and result sink.
pub struct HttpStore {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpStore {
    pub fn new(base_url: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::NetworkError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout(DEFAULT_TIMEOUT_SECS)
            } else {
                StoreError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::AuthenticationFailed(body));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(StoreError::ApiError { status, message });
        }
        Ok(response)
    }

    /// `{base}/{segments...}` with every segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, StoreError> {
        let invalid =
            |e: String| StoreError::NetworkError(format!("invalid base URL {}: {e}", self.base_url));
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: reqwest::Url) -> Result<T, StoreError> {
        let response = self.send(self.client.get(url.clone())).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidContent(format!("{url}: {e}")))
    }
}

#[derive(Deserialize)]
struct ApiError {
    error: String,
}

#[derive(Serialize)]
struct RecordRequest<'a> {
    #[serde(flatten)]
    context: &'a AttemptContext,
    result: &'a QuizResult,
}

#[async_trait]
impl ContentStore for HttpStore {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn fetch_questions(&self, test_id: &str) -> anyhow::Result<Vec<Question>> {
        let url = self.endpoint(&["tests", test_id, "questions"])?;
        match self.get_json(url).await {
            Err(StoreError::ApiError { status: 404, .. }) => {
                Err(StoreError::NotFound(test_id.to_string()).into())
            }
            other => Ok(other?),
        }
    }

    #[instrument(skip(self))]
    async fn fetch_test(&self, test_id: &str) -> anyhow::Result<Option<TestInfo>> {
        let url = self.endpoint(&["tests", test_id])?;
        match self.get_json(url).await {
            Ok(info) => Ok(Some(info)),
            Err(StoreError::ApiError { status: 404, .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_tests(&self) -> anyhow::Result<Vec<TestInfo>> {
        Ok(self.get_json(self.endpoint(&["tests"])?).await?)
    }
}

#[async_trait]
impl ResultSink for HttpStore {
    #[instrument(skip_all, fields(attempt = %result.attempt_id))]
    async fn record(&self, result: &QuizResult, context: &AttemptContext) -> anyhow::Result<()> {
        let body = RecordRequest { context, result };
        let url = self.endpoint(&["results"])?;
        self.send(self.client.post(url).json(&body)).await?;
        Ok(())
    }

    async fn history(&self, user_id: &str) -> anyhow::Result<Vec<QuizResult>> {
        let mut url = self.endpoint(&["results"])?;
        url.query_pairs_mut().append_pair("user_id", user_id);
        let response = self.send(self.client.get(url)).await?;
        let mut results: Vec<QuizResult> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidContent(e.to_string()))?;
        results.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn result() -> QuizResult {
        QuizResult {
            attempt_id: Uuid::new_v4(),
            test_id: "pmp".into(),
            user_id: "u1".into(),
            total_questions: 2,
            correct_count: 2,
            percentage: 100,
            elapsed_secs: 42,
            allotted_secs: 600,
            answered_count: 2,
            flagged_count: 0,
            passing_score: 70,
            passed: true,
            breakdown: vec![],
            strength_areas: vec![],
            improvement_areas: vec![],
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn fetches_questions_with_bearer_key() {
        let server = MockServer::start().await;

        let body = serde_json::json!([
            {"id": "q1", "prompt": "Pick B", "options": ["A", "B"], "correct_option": 1},
            {"id": "q2", "prompt": "Pick A", "options": ["A", "B", "C"], "correct_option": 0,
             "explanation": "A is first", "category": "basics"}
        ]);

        Mock::given(method("GET"))
            .and(path("/tests/pmp/questions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let store = HttpStore::new(&server.uri(), Some("test-key".into())).unwrap();
        let questions = store.fetch_questions("pmp").await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].category.as_deref(), Some("basics"));
    }

    #[tokio::test]
    async fn missing_test_metadata_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tests/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_json(
                serde_json::json!({"error": "no such test"}),
            ))
            .mount(&server)
            .await;

        let store = HttpStore::new(&server.uri(), None).unwrap();
        assert!(store.fetch_test("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tests/pmp/questions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let store = HttpStore::new(&server.uri(), Some("bad-key".into())).unwrap();
        let err = store.fetch_questions("pmp").await.unwrap_err();
        assert!(err.to_string().contains("authentication"));
    }

    #[tokio::test]
    async fn server_error_carries_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tests"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(serde_json::json!({"error": "maintenance"})),
            )
            .mount(&server)
            .await;

        let store = HttpStore::new(&server.uri(), None).unwrap();
        let err = store.list_tests().await.unwrap_err();
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("maintenance"));
    }

    #[tokio::test]
    async fn test_ids_are_escaped_in_paths() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tests/a%2Fb%3Fc%23d/questions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "q1", "prompt": "Pick A", "options": ["A", "B"], "correct_option": 0}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpStore::new(&format!("{}/api", server.uri()), None).unwrap();
        let questions = store.fetch_questions("a/b?c#d").await.unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn rejects_unusable_base_url() {
        let store = HttpStore::new("not a url", None).unwrap();
        assert!(matches!(
            store.endpoint(&["tests"]),
            Err(StoreError::NetworkError(_))
        ));
    }

    #[tokio::test]
    async fn records_and_reads_results() {
        let server = MockServer::start().await;
        let r = result();

        Mock::given(method("POST"))
            .and(path("/results"))
            .and(body_partial_json(serde_json::json!({
                "user_id": "u1",
                "test_id": "pmp",
                "result": {"percentage": 100}
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/results"))
            .and(query_param("user_id", "u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![r.clone()]))
            .mount(&server)
            .await;

        let store = HttpStore::new(&format!("{}/", server.uri()), None).unwrap();
        let ctx = AttemptContext {
            user_id: "u1".into(),
            test_id: "pmp".into(),
        };
        store.record(&r, &ctx).await.unwrap();

        let history = store.history("u1").await.unwrap();
        assert_eq!(history, vec![r]);
    }
}
