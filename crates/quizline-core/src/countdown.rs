//! Cancellable countdown timer.
//!
//! Starting a [`Countdown`] spawns a task that sends one tick per period.
//! The task is aborted when the handle is cancelled or dropped, so every
//! exit path of a session releases the timer.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};

/// Owned handle to a running countdown.
#[derive(Debug)]
pub struct Countdown {
    task: JoinHandle<()>,
    ticks: mpsc::Receiver<()>,
}

impl Countdown {
    /// Start ticking every `period`, at most `max_ticks` times. The first
    /// tick arrives one full period after start.
    pub fn start(period: Duration, max_ticks: u64) -> Self {
        let (tx, ticks) = mpsc::channel(1);
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            for _ in 0..max_ticks {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self { task, ticks }
    }

    /// Wait for the next tick. Returns `None` once the countdown has been
    /// cancelled or has delivered all its ticks.
    pub async fn tick(&mut self) -> Option<()> {
        self.ticks.recv().await
    }

    /// Stop the countdown. Idempotent.
    pub fn cancel(&mut self) {
        self.task.abort();
        self.ticks.close();
        while self.ticks.try_recv().is_ok() {}
    }

    /// A handle for observing whether the timer task has finished.
    pub fn abort_handle(&self) -> AbortHandle {
        self.task.abort_handle()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn settle(handle: &AbortHandle) {
        for _ in 0..10 {
            if handle.is_finished() {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_bounded_ticks() {
        let mut countdown = Countdown::start(Duration::from_secs(1), 3);
        let started = Instant::now();

        for _ in 0..3 {
            assert_eq!(countdown.tick().await, Some(()));
        }
        assert_eq!(countdown.tick().await, None);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks() {
        let mut countdown = Countdown::start(Duration::from_secs(1), 100);
        assert_eq!(countdown.tick().await, Some(()));

        let handle = countdown.abort_handle();
        countdown.cancel();
        assert_eq!(countdown.tick().await, None);
        settle(&handle).await;
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_releases_timer() {
        let countdown = Countdown::start(Duration::from_secs(1), 100);
        let handle = countdown.abort_handle();
        drop(countdown);
        settle(&handle).await;
        assert!(handle.is_finished());
    }
}
