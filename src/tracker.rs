use std::time::{Duration, Instant};

use crate::error::Result;
use crate::storage::{keys, load_or_default, save, SlotStore};
use crate::store::ProgressionStore;
use crate::timer::{Phase, PhaseCompleted, PomodoroTimer, TimerSettings};

/// Owns all mutable application state: progression (with its slot store) and
/// the pomodoro timer. Timer completions are routed into rewards here.
#[derive(Debug)]
pub struct Tracker<S: SlotStore> {
    progress: ProgressionStore<S>,
    timer: PomodoroTimer,
}

impl<S: SlotStore> Tracker<S> {
    pub fn load(slots: S) -> Self {
        let settings: TimerSettings = load_or_default(&slots, keys::POMODORO_SETTINGS);
        Self {
            progress: ProgressionStore::load(slots),
            timer: PomodoroTimer::new(settings.clamped()),
        }
    }

    pub fn with_auto_start_delay(mut self, delay: Duration) -> Self {
        self.timer = self.timer.with_auto_start_delay(delay);
        self
    }

    pub fn progress(&self) -> &ProgressionStore<S> {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressionStore<S> {
        &mut self.progress
    }

    pub fn timer(&self) -> &PomodoroTimer {
        &self.timer
    }

    pub fn start(&mut self, now: Instant) {
        self.timer.start(now);
    }

    pub fn pause(&mut self) {
        self.timer.pause();
    }

    pub fn toggle_running(&mut self, now: Instant) {
        if self.timer.is_running() {
            self.timer.pause();
        } else {
            self.timer.start(now);
        }
    }

    pub fn reset(&mut self) {
        self.timer.reset();
    }

    pub fn switch_phase(&mut self, phase: Phase) {
        self.timer.switch_phase(phase);
    }

    /// Persist and apply new timer settings.
    pub fn update_settings(&mut self, settings: TimerSettings) -> Result<()> {
        self.timer.update_settings(settings);
        save(self.progress.slots_mut(), keys::POMODORO_SETTINGS, &settings)
    }

    /// Drive the timer to `now`. A completed focus phase is recorded exactly once.
    pub fn poll(&mut self, now: Instant) -> Result<Option<PhaseCompleted>> {
        let Some(done) = self.timer.poll(now) else {
            return Ok(None);
        };
        if done.phase == Phase::Focus {
            self.progress.record_pomodoro_completion(done.focus_minutes)?;
        }
        Ok(Some(done))
    }
}
