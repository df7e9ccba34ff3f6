//! Meditation timer - Countdown state machine and its async driver.
//!
//! [`MeditationTimer`] is a plain state machine advanced one second per
//! [`tick`](MeditationTimer::tick). Completing, stopping or resetting a session
//! yields a [`CompletedSession`] when at least one whole minute has elapsed;
//! shorter sessions are dropped.
//!
//! [`TimerDriver`] runs the countdown on a Tokio task and saves completed sessions
//! through [`FitnessState::add_meditation`]. The tick loop is cancelled whenever
//! the timer stops running and restarted on the next start.

use crate::{
    core::meditation::{MeditationType, NewMeditationSession},
    entities::meditation_session,
    state::{FitnessState, Pending},
};
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Session lengths offered by the timer, in minutes.
pub const DURATION_PRESETS: [u32; 6] = [1, 5, 10, 15, 20, 30];

/// Whether the countdown is advancing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerPhase {
    /// Waiting for start; also the state after pause and after completion
    Idle,
    /// Counting down
    Running,
}

/// A session long enough to be saved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletedSession {
    /// Meditation type selected when the session ended
    pub kind: MeditationType,
    /// Whole minutes completed, always at least 1
    pub minutes: u64,
}

impl CompletedSession {
    /// Record to store, dated `saved_at`.
    pub fn to_record<Tz>(self, saved_at: &DateTime<Tz>) -> NewMeditationSession
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        NewMeditationSession::new(
            self.kind.as_str(),
            self.minutes.to_string(),
            session_date_label(saved_at),
        )
    }
}

/// History label for a session saved at `at`, e.g. `"Today, 07:45 AM"`.
pub fn session_date_label<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("Today, {}", at.format("%I:%M %p"))
}

/// Read-only view of the timer for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerSnapshot {
    /// Running or idle
    pub phase: TimerPhase,
    /// Selected meditation type
    pub kind: MeditationType,
    /// Selected session length
    pub duration_minutes: u32,
    /// Seconds left in the countdown
    pub remaining_secs: u64,
}

impl TimerSnapshot {
    /// Remaining time as `mm:ss`.
    #[must_use]
    pub fn remaining_display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }

    /// Fraction of the session already done, from 0.0 to 1.0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        let total = total_secs(self.duration_minutes);
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / total as f64)
    }

    /// Whole minutes completed so far.
    #[must_use]
    pub fn completed_minutes(&self) -> u64 {
        total_secs(self.duration_minutes).saturating_sub(self.remaining_secs) / 60
    }
}

fn total_secs(minutes: u32) -> u64 {
    u64::from(minutes) * 60
}

/// Countdown state machine for one meditation session at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeditationTimer {
    phase: TimerPhase,
    kind: MeditationType,
    duration_minutes: u32,
    remaining_secs: u64,
}

impl Default for MeditationTimer {
    fn default() -> Self {
        Self::new(5, MeditationType::default())
    }
}

impl MeditationTimer {
    /// Idle timer with the full `duration_minutes` remaining (at least one minute).
    #[must_use]
    pub fn new(duration_minutes: u32, kind: MeditationType) -> Self {
        let duration_minutes = duration_minutes.max(1);
        Self {
            phase: TimerPhase::Idle,
            kind,
            duration_minutes,
            remaining_secs: total_secs(duration_minutes),
        }
    }

    /// Current state for display.
    #[must_use]
    pub const fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            kind: self.kind,
            duration_minutes: self.duration_minutes,
            remaining_secs: self.remaining_secs,
        }
    }

    /// Whether the countdown is advancing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    /// Seconds left.
    #[must_use]
    pub const fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Begins or resumes the countdown. Returns `true` if the timer was idle.
    pub fn start(&mut self) -> bool {
        if self.is_running() || self.remaining_secs == 0 {
            return false;
        }
        self.phase = TimerPhase::Running;
        true
    }

    /// Pauses the countdown, keeping the remaining time. Returns `true` if it was running.
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.phase = TimerPhase::Idle;
        true
    }

    /// Start when idle, pause when running. Returns the new phase.
    pub fn toggle(&mut self) -> TimerPhase {
        if !self.pause() {
            self.start();
        }
        self.phase
    }

    /// Advances one second.
    ///
    /// Reaching zero completes the session: the timer resets to idle with the full
    /// duration and the completed session is returned.
    pub fn tick(&mut self) -> Option<CompletedSession> {
        if !self.is_running() || self.remaining_secs == 0 {
            return None;
        }

        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            return self.finish();
        }
        None
    }

    /// Ends the session now; returns it if at least one minute was completed.
    pub fn stop_and_save(&mut self) -> Option<CompletedSession> {
        self.finish()
    }

    /// Resets to the full duration. A running or partly elapsed session is saved
    /// first, under the same one-minute rule as [`Self::stop_and_save`].
    pub fn reset(&mut self) -> Option<CompletedSession> {
        if self.is_running() || self.remaining_secs < total_secs(self.duration_minutes) {
            return self.finish();
        }
        None
    }

    /// Chooses a preset length. Ignored while running or for non-preset values.
    pub fn select_duration(&mut self, minutes: u32) -> bool {
        if self.is_running() || !DURATION_PRESETS.contains(&minutes) {
            return false;
        }
        self.duration_minutes = minutes;
        self.remaining_secs = total_secs(minutes);
        true
    }

    /// Chooses the meditation type; allowed at any time.
    pub fn select_type(&mut self, kind: MeditationType) {
        self.kind = kind;
    }

    fn finish(&mut self) -> Option<CompletedSession> {
        let minutes = self.snapshot().completed_minutes();
        self.phase = TimerPhase::Idle;
        self.remaining_secs = total_secs(self.duration_minutes);

        (minutes > 0).then_some(CompletedSession {
            kind: self.kind,
            minutes,
        })
    }
}

struct Shared {
    timer: Mutex<MeditationTimer>,
    snapshots: watch::Sender<TimerSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, MeditationTimer> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `change` and publishes the resulting snapshot.
    fn update<T>(&self, change: impl FnOnce(&mut MeditationTimer) -> T) -> T {
        let (result, snapshot) = {
            let mut timer = self.lock();
            let result = change(&mut timer);
            (result, timer.snapshot())
        };
        self.snapshots.send_replace(snapshot);
        result
    }
}

/// Runs a [`MeditationTimer`] in real time and saves completed sessions.
pub struct TimerDriver {
    shared: Arc<Shared>,
    state: FitnessState,
    tick_period: Duration,
    ticker: Option<CancellationToken>,
}

impl TimerDriver {
    /// Driver ticking once per `tick_period` (one second in production).
    #[must_use]
    pub fn new(timer: MeditationTimer, state: FitnessState, tick_period: Duration) -> Self {
        let (snapshots, _) = watch::channel(timer.snapshot());
        Self {
            shared: Arc::new(Shared {
                timer: Mutex::new(timer),
                snapshots,
            }),
            state,
            tick_period,
            ticker: None,
        }
    }

    /// Live timer state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Current timer state.
    #[must_use]
    pub fn snapshot(&self) -> TimerSnapshot {
        self.shared.lock().snapshot()
    }

    /// Starts or resumes the countdown. Must be called within a Tokio runtime.
    pub fn start(&mut self) {
        if self.shared.update(MeditationTimer::start) {
            self.spawn_ticker();
        }
    }

    /// Pauses the countdown.
    pub fn pause(&mut self) {
        self.cancel_ticker();
        self.shared.update(MeditationTimer::pause);
    }

    /// Start/pause button.
    pub fn toggle(&mut self) {
        if self.snapshot().phase == TimerPhase::Running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Ends the session; returns the pending save when one was long enough.
    pub fn stop_and_save(&mut self) -> Option<Pending<meditation_session::Model>> {
        self.cancel_ticker();
        let completed = self.shared.update(MeditationTimer::stop_and_save);
        completed.map(|session| save_session(&self.state, session))
    }

    /// Resets the countdown, saving a partly elapsed session first.
    pub fn reset(&mut self) -> Option<Pending<meditation_session::Model>> {
        self.cancel_ticker();
        let completed = self.shared.update(MeditationTimer::reset);
        completed.map(|session| save_session(&self.state, session))
    }

    /// Chooses a preset length; ignored while running.
    pub fn select_duration(&mut self, minutes: u32) -> bool {
        self.shared.update(|timer| timer.select_duration(minutes))
    }

    /// Chooses the meditation type.
    pub fn select_type(&mut self, kind: MeditationType) {
        self.shared.update(|timer| timer.select_type(kind));
    }

    fn spawn_ticker(&mut self) {
        self.cancel_ticker();
        let cancel = CancellationToken::new();
        self.ticker = Some(cancel.clone());

        tokio::spawn(run_ticker(
            Arc::clone(&self.shared),
            self.state.clone(),
            self.tick_period,
            cancel,
        ));
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

async fn run_ticker(
    shared: Arc<Shared>,
    state: FitnessState,
    period: Duration,
    cancel: CancellationToken,
) {
    debug!("Meditation ticker started");
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(period) => {}
        }

        let (completed, running) = shared.update(|timer| (timer.tick(), timer.is_running()));
        if let Some(session) = completed {
            // Saved in the background; the worker reports failures.
            drop(save_session(&state, session));
            break;
        }
        if !running {
            break;
        }
    }
    debug!("Meditation ticker stopped");
}

fn save_session(
    state: &FitnessState,
    session: CompletedSession,
) -> Pending<meditation_session::Model> {
    let record = session.to_record(&Local::now());
    info!(
        "Saving {} minute {} session",
        session.minutes, session.kind
    );
    state.add_meditation(record.kind, record.duration, record.date)
}
