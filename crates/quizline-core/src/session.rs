//! A live, timed attempt.
//!
//! [`LiveSession`] owns an attempt together with its countdown and runs
//! user commands and timer ticks through a single `select!` loop. A
//! timeout submit and a user submit therefore never interleave, and the
//! idempotent [`submit`](crate::engine::submit) covers anything else.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::attempt::{Attempt, Navigation, Tick};
use crate::countdown::Countdown;
use crate::engine::{submit, SubmitOutcome, SubmitTrigger};
use crate::error::QuizError;
use crate::traits::ResultSink;

/// A user action on a running attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Select { question: usize, option: usize },
    /// Answer the question under the cursor.
    SelectCurrent(usize),
    ToggleFlag(usize),
    ToggleFlagCurrent,
    Navigate(Navigation),
    Submit,
}

/// How a session ended.
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    Submitted(SubmitOutcome),
    /// Left before submission. Nothing was graded or recorded.
    Abandoned { attempt_id: Uuid },
}

impl SessionOutcome {
    pub fn submitted(&self) -> Option<&SubmitOutcome> {
        match self {
            SessionOutcome::Submitted(outcome) => Some(outcome),
            SessionOutcome::Abandoned { .. } => None,
        }
    }
}

/// Hooks for the view layer.
pub trait SessionObserver: Send + Sync {
    /// The attempt changed in response to a command.
    fn on_change(&self, attempt: &Attempt);
    /// One second elapsed.
    fn on_tick(&self, attempt: &Attempt);
    /// A command was rejected; the attempt is unchanged.
    fn on_rejected(&self, error: &QuizError);
    fn on_submitted(&self, outcome: &SubmitOutcome);
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_change(&self, _: &Attempt) {}
    fn on_tick(&self, _: &Attempt) {}
    fn on_rejected(&self, _: &QuizError) {}
    fn on_submitted(&self, _: &SubmitOutcome) {}
}

/// An in-progress attempt with a running countdown.
pub struct LiveSession {
    attempt: Attempt,
    countdown: Countdown,
    sink: Arc<dyn ResultSink>,
}

impl LiveSession {
    /// Start the countdown for `attempt`. Must be called inside a tokio
    /// runtime.
    pub fn new(attempt: Attempt, sink: Arc<dyn ResultSink>, tick_period: Duration) -> Self {
        let countdown = Countdown::start(tick_period, attempt.remaining_secs());
        Self {
            attempt,
            countdown,
            sink,
        }
    }

    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    /// Handle to the countdown task, for checking that it was released.
    pub fn timer(&self) -> AbortHandle {
        self.countdown.abort_handle()
    }

    /// Apply a non-submitting command to the attempt.
    pub fn apply(&mut self, command: Command) -> Result<(), QuizError> {
        let cursor = self.attempt.cursor();
        match command {
            Command::Select { question, option } => self.attempt.select_answer(question, option),
            Command::SelectCurrent(option) => self.attempt.select_answer(cursor, option),
            Command::ToggleFlag(question) => self.attempt.toggle_flag(question).map(|_| ()),
            Command::ToggleFlagCurrent => self.attempt.toggle_flag(cursor).map(|_| ()),
            Command::Navigate(target) => self.attempt.navigate(target).map(|_| ()),
            Command::Submit => Ok(()),
        }
    }

    /// Drive the attempt until it is submitted (by command or timeout) or
    /// abandoned (the command channel closes first).
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        observer: &dyn SessionObserver,
    ) -> SessionOutcome {
        observer.on_change(&self.attempt);

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    None => return self.abandon(),
                    Some(Command::Submit) => {
                        return self.finish(SubmitTrigger::Manual, observer).await;
                    }
                    Some(command) => match self.apply(command) {
                        Ok(()) => observer.on_change(&self.attempt),
                        Err(e) => {
                            tracing::debug!("rejected {command:?}: {e}");
                            observer.on_rejected(&e);
                        }
                    },
                },

                tick = self.countdown.tick() => {
                    let expired = match tick {
                        Some(()) => self.attempt.tick() == Tick::Expired,
                        None => true,
                    };
                    if expired {
                        return self.finish(SubmitTrigger::Timeout, observer).await;
                    }
                    observer.on_tick(&self.attempt);
                }
            }
        }
    }

    /// Discard the attempt without grading it.
    pub fn abandon(mut self) -> SessionOutcome {
        self.countdown.cancel();
        tracing::info!(attempt = %self.attempt.id(), "attempt abandoned");
        SessionOutcome::Abandoned {
            attempt_id: self.attempt.id(),
        }
    }

    async fn finish(
        mut self,
        trigger: SubmitTrigger,
        observer: &dyn SessionObserver,
    ) -> SessionOutcome {
        self.countdown.cancel();
        let outcome = submit(&mut self.attempt, self.sink.as_ref(), trigger).await;
        observer.on_submitted(&outcome);
        SessionOutcome::Submitted(outcome)
    }
}
