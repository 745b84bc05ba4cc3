//! Per-submission poll loop.
//!
//! State machine: `Idle → Polling → {Completed, Error}`. The interval timer exists only
//! while polling and is dropped exactly once, on the first terminal snapshot.
//!
//! Transport and decode failures while polling are logged and the loop keeps going.
//! There is no backoff and no retry ceiling: a backend that never answers keeps the
//! poller alive until the process is stopped.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{ProgressDisplay, ProgressSnapshot, ProgressStatus, ProgressView};
use crate::client::{IntakeApi, Mode};
use crate::errors::IntakeError;
use crate::render::{
    completion_panel, failing_step, failure_message, format_elapsed, processing_error_panel,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
    Completed,
    Error,
}

/// Terminal result of a poll run, carrying the snapshot that ended it.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(ProgressSnapshot),
    Failed(ProgressSnapshot),
}

impl PollOutcome {
    pub fn into_result(self) -> Result<ProgressSnapshot, IntakeError> {
        match self {
            PollOutcome::Completed(snapshot) => Ok(snapshot),
            PollOutcome::Failed(snapshot) => Err(IntakeError::Processing {
                step: failing_step(&snapshot),
                message: failure_message(&snapshot),
            }),
        }
    }
}

pub struct Poller {
    session_id: String,
    mode: Mode,
    period: Duration,
    started_at: Option<DateTime<Utc>>,
    state: PollState,
    timer: Option<Interval>,
    display: ProgressDisplay,
    latest: Option<ProgressSnapshot>,
    outcome: Option<PollOutcome>,
    requests: u32,
    cancellations: u32,
}

impl Poller {
    pub fn new(session_id: impl Into<String>, mode: Mode, period: Duration) -> Self {
        Self {
            session_id: session_id.into(),
            mode,
            period,
            started_at: None,
            state: PollState::Idle,
            timer: None,
            display: ProgressDisplay::default(),
            latest: None,
            outcome: None,
            requests: 0,
            cancellations: 0,
        }
    }

    /// When the submission began; used for the processing time on the success panel.
    pub fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// Seeds the display shown before the first poll response.
    pub fn with_display(mut self, display: ProgressDisplay) -> Self {
        self.display = display;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn display(&self) -> &ProgressDisplay {
        &self.display
    }

    pub fn latest(&self) -> Option<&ProgressSnapshot> {
        self.latest.as_ref()
    }

    pub fn is_timer_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Status requests issued so far, including failed ones.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    pub fn cancellations(&self) -> u32 {
        self.cancellations
    }

    /// Arms the timer. The first request goes out one period after this call.
    /// Does nothing unless the poller is idle.
    pub fn start(&mut self) {
        if self.state != PollState::Idle {
            return;
        }
        let mut timer = time::interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
        self.state = PollState::Polling;
        info!(
            "Polling {} progress for session {} every {}ms",
            self.mode,
            self.session_id,
            self.period.as_millis()
        );
    }

    /// Polls until a terminal snapshot arrives and returns it.
    pub async fn run<A, V>(&mut self, api: &A, view: &mut V) -> PollOutcome
    where
        A: IntakeApi + ?Sized,
        V: ProgressView + ?Sized,
    {
        self.start();
        loop {
            if let Some(outcome) = &self.outcome {
                return outcome.clone();
            }
            if let Some(timer) = self.timer.as_mut() {
                timer.tick().await;
            }
            self.poll_once(api, view).await;
        }
    }

    /// Issues one status request and applies the response. Not rate limited; `run`
    /// paces calls with the timer.
    pub async fn poll_once<A, V>(&mut self, api: &A, view: &mut V) -> PollState
    where
        A: IntakeApi + ?Sized,
        V: ProgressView + ?Sized,
    {
        if self.state != PollState::Polling {
            return self.state;
        }

        self.requests += 1;
        match api.progress(&self.session_id).await {
            Ok(snapshot) => self.apply(snapshot, view),
            Err(e) => {
                warn!(
                    "Error polling progress for session {} (attempt {}): {e}",
                    self.session_id, self.requests
                );
            }
        }
        self.state
    }

    fn apply<V: ProgressView + ?Sized>(&mut self, snapshot: ProgressSnapshot, view: &mut V) {
        self.display.apply(&snapshot);
        view.show_progress(&self.display);

        match snapshot.status {
            ProgressStatus::Pending => {
                debug!(
                    "Session {} at {:?} ({:?})",
                    self.session_id, snapshot.progress, snapshot.step_name
                );
            }
            ProgressStatus::Completed => {
                self.finish(PollState::Completed);
                let elapsed = format_elapsed(self.started_at, Utc::now());
                info!("Session {} completed in {elapsed}", self.session_id);
                view.show_result(&completion_panel(&snapshot, self.mode, &elapsed));
                self.outcome = Some(PollOutcome::Completed(snapshot.clone()));
            }
            ProgressStatus::Error => {
                self.finish(PollState::Error);
                warn!(
                    "Session {} failed at {}: {}",
                    self.session_id,
                    failing_step(&snapshot),
                    failure_message(&snapshot)
                );
                view.show_result(&processing_error_panel(&snapshot, self.mode));
                self.outcome = Some(PollOutcome::Failed(snapshot.clone()));
            }
        }

        self.latest = Some(snapshot);
    }

    fn finish(&mut self, state: PollState) {
        if self.timer.take().is_some() {
            self.cancellations += 1;
        }
        self.state = state;
    }
}
