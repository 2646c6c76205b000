// src/session/timer.rs

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::models::submission::SubmissionPayload;

/// Countdown state derived from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Untimed quiz, not started yet, or stopped by a user submission.
    Idle,
    Running,
    /// Reached zero and auto-submitted.
    Expired,
}

/// Result of applying one tick to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Session untimed or no longer in progress; nothing changed.
    Ignored,
    Running { remaining: u32 },
    /// Time ran out; the session is now submitted and this is its payload.
    Expired(SubmissionPayload),
}

/// One countdown tick emitted by the timer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

/// Owned handle of the repeating countdown task.
///
/// The task stops when the handle is stopped or dropped, so a session that
/// is submitted or abandoned cannot receive stale ticks.
#[derive(Debug)]
pub struct TimerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl TimerHandle {
    /// Spawns a task sending a [`Tick`] every `period`, first one after
    /// `period` has elapsed.
    pub fn spawn(period: Duration, ticks: mpsc::Sender<Tick>) -> Self {
        let token = CancellationToken::new();
        let signal = token.child_token();

        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = signal.cancelled() => break,
                    _ = interval.tick() => {
                        // A receiver that stopped draining must not block cancellation.
                        tokio::select! {
                            biased;
                            _ = signal.cancelled() => break,
                            sent = ticks.send(Tick) => {
                                if sent.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                }
            }
            tracing::debug!("Countdown task finished");
        });

        Self {
            token,
            task: Some(task),
        }
    }

    /// Cancels the task and waits for it to wind down.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Countdown task ended abnormally: {:?}", e);
            }
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
