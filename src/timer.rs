//! Two-phase pomodoro countdown.
//!
//! The timer never spawns anything. A running countdown is an owned
//! [`Countdown`] schedule holding the deadline of the next one-second tick; the
//! event loop calls [`PomodoroTimer::poll`] with the current instant and due
//! ticks are applied. Dropping the schedule cancels it, so a stopped timer can
//! never deliver a stale tick.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

pub const FOCUS_MINUTES_RANGE: RangeInclusive<u32> = 10..=90;
pub const BREAK_MINUTES_RANGE: RangeInclusive<u32> = 3..=30;
pub const FOCUS_STEP: u32 = 5;
pub const BREAK_STEP: u32 = 1;
pub const DEFAULT_AUTO_START_DELAY: Duration = Duration::from_millis(500);

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Phase {
    Focus,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(rename = "focus", alias = "focusMinutes")]
    pub focus_minutes: u32,
    #[serde(rename = "break", alias = "breakMinutes")]
    pub break_minutes: u32,
    #[serde(rename = "autoStartBreak")]
    pub auto_start_break: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            break_minutes: 5,
            auto_start_break: true,
        }
    }
}

impl TimerSettings {
    pub fn minutes(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Focus => self.focus_minutes,
            Phase::Break => self.break_minutes,
        }
    }

    pub fn duration_secs(&self, phase: Phase) -> u32 {
        self.minutes(phase) * 60
    }

    /// Settings with both durations pulled into their allowed ranges.
    pub fn clamped(self) -> Self {
        Self {
            focus_minutes: self
                .focus_minutes
                .clamp(*FOCUS_MINUTES_RANGE.start(), *FOCUS_MINUTES_RANGE.end()),
            break_minutes: self
                .break_minutes
                .clamp(*BREAK_MINUTES_RANGE.start(), *BREAK_MINUTES_RANGE.end()),
            ..self
        }
    }

    /// Shift the focus duration by `steps` slider steps.
    pub fn nudge_focus(self, steps: i32) -> Self {
        let minutes = self.focus_minutes as i64 + (steps as i64 * FOCUS_STEP as i64);
        Self {
            focus_minutes: minutes.max(0) as u32,
            ..self
        }
        .clamped()
    }

    /// Shift the break duration by `steps` slider steps.
    pub fn nudge_break(self, steps: i32) -> Self {
        let minutes = self.break_minutes as i64 + (steps as i64 * BREAK_STEP as i64);
        Self {
            break_minutes: minutes.max(0) as u32,
            ..self
        }
        .clamped()
    }
}

/// Emitted when a phase countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseCompleted {
    pub phase: Phase,
    pub focus_minutes: u32,
}

/// Schedule of the next one-second tick of a running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Countdown {
    next_tick: Instant,
}

#[derive(Debug)]
pub struct PomodoroTimer {
    settings: TimerSettings,
    phase: Phase,
    state: TimerState,
    seconds_remaining: u32,
    countdown: Option<Countdown>,
    // deferred start of an automatically started break
    pending_start: Option<Instant>,
    auto_start_delay: Duration,
}

impl PomodoroTimer {
    pub fn new(settings: TimerSettings) -> Self {
        Self {
            settings,
            phase: Phase::Focus,
            state: TimerState::Idle,
            seconds_remaining: settings.duration_secs(Phase::Focus),
            countdown: None,
            pending_start: None,
            auto_start_delay: DEFAULT_AUTO_START_DELAY,
        }
    }

    pub fn with_auto_start_delay(mut self, delay: Duration) -> Self {
        self.auto_start_delay = delay;
        self
    }

    pub fn settings(&self) -> TimerSettings {
        self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn total_secs(&self) -> u32 {
        self.settings.duration_secs(self.phase)
    }

    /// True while an automatically started break is waiting for its delay.
    pub fn has_pending_start(&self) -> bool {
        self.pending_start.is_some()
    }

    pub fn clock(&self) -> String {
        format_clock(self.seconds_remaining)
    }

    pub fn start(&mut self, now: Instant) {
        if self.is_running() {
            return;
        }
        self.pending_start = None;
        self.countdown = Some(Countdown {
            next_tick: now + TICK,
        });
        self.state = TimerState::Running;
        tracing::debug!(phase = %self.phase, remaining = self.seconds_remaining, "timer started");
    }

    /// Stops ticking, including a break that is about to auto-start, and keeps
    /// the remaining time.
    pub fn pause(&mut self) {
        self.cancel();
        self.state = TimerState::Paused;
        tracing::debug!(phase = %self.phase, remaining = self.seconds_remaining, "timer paused");
    }

    pub fn reset(&mut self) {
        self.cancel();
        self.seconds_remaining = self.total_secs();
        self.state = TimerState::Idle;
    }

    pub fn switch_phase(&mut self, phase: Phase) {
        self.cancel();
        self.phase = phase;
        self.seconds_remaining = self.total_secs();
        self.state = TimerState::Idle;
    }

    /// Apply new settings. A running countdown keeps the fraction of the phase
    /// already elapsed; otherwise the remaining time snaps to the new total.
    pub fn update_settings(&mut self, settings: TimerSettings) {
        let old_total = self.total_secs();
        self.settings = settings;
        let new_total = self.total_secs();

        self.seconds_remaining = if self.is_running() && old_total > 0 {
            let fraction = (self.seconds_remaining as f64 / old_total as f64).clamp(0.0, 1.0);
            (new_total as f64 * fraction).round() as u32
        } else {
            new_total
        };
    }

    /// Apply every tick due at `now`. Returns the completion if a phase ended.
    pub fn poll(&mut self, now: Instant) -> Option<PhaseCompleted> {
        if let Some(at) = self.pending_start {
            if now >= at && self.state == TimerState::Idle {
                self.start(at);
            }
        }

        while let Some(countdown) = self.countdown {
            if countdown.next_tick > now {
                break;
            }
            if let Some(done) = self.tick(countdown.next_tick) {
                return Some(done);
            }
        }
        None
    }

    /// Advance the running countdown by one second, as of `at`.
    pub fn tick(&mut self, at: Instant) -> Option<PhaseCompleted> {
        let countdown = self.countdown.as_mut()?;
        countdown.next_tick = at + TICK;
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            Some(self.complete_phase(at))
        } else {
            None
        }
    }

    fn complete_phase(&mut self, at: Instant) -> PhaseCompleted {
        let done = PhaseCompleted {
            phase: self.phase,
            focus_minutes: self.settings.focus_minutes,
        };
        tracing::info!(phase = %done.phase, "phase complete");

        match self.phase {
            Phase::Focus => {
                self.switch_phase(Phase::Break);
                if self.settings.auto_start_break {
                    self.pending_start = Some(at + self.auto_start_delay);
                }
            }
            Phase::Break => self.switch_phase(Phase::Focus),
        }
        done
    }

    /// Drop any scheduled tick or deferred start. Safe to call when nothing is scheduled.
    fn cancel(&mut self) {
        self.countdown = None;
        self.pending_start = None;
    }
}

/// `MM:SS` rendering of a second count.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn starts_idle_in_focus() {
        let timer = PomodoroTimer::new(TimerSettings::default());
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.phase(), Phase::Focus);
        assert_eq!(timer.seconds_remaining(), 25 * 60);
    }

    #[test]
    fn ticks_once_per_second() {
        let t0 = Instant::now();
        let mut timer = PomodoroTimer::new(TimerSettings::default());
        timer.start(t0);
        assert_eq!(timer.poll(t0 + Duration::from_millis(999)), None);
        assert_eq!(timer.seconds_remaining(), 1500);
        timer.poll(t0 + secs(1));
        assert_eq!(timer.seconds_remaining(), 1499);
        timer.poll(t0 + secs(10));
        assert_eq!(timer.seconds_remaining(), 1490);
    }

    #[test]
    fn focus_expiry_fires_once_and_moves_to_break() {
        let t0 = Instant::now();
        let mut timer = PomodoroTimer::new(TimerSettings::default());
        timer.start(t0);

        let done = timer.poll(t0 + secs(25 * 60));
        assert_eq!(
            done,
            Some(PhaseCompleted {
                phase: Phase::Focus,
                focus_minutes: 25
            })
        );
        assert_eq!(timer.phase(), Phase::Break);
        assert_eq!(timer.seconds_remaining(), 5 * 60);
        assert_eq!(timer.state(), TimerState::Idle);

        // nothing more fires before the auto-start delay
        assert_eq!(timer.poll(t0 + secs(25 * 60)), None);
    }

    #[test]
    fn break_auto_starts_after_delay() {
        let t0 = Instant::now();
        let mut timer = PomodoroTimer::new(TimerSettings::default());
        timer.start(t0);
        let end = t0 + secs(1500);
        timer.poll(end);
        assert!(timer.has_pending_start());

        timer.poll(end + Duration::from_millis(499));
        assert_eq!(timer.state(), TimerState::Idle);
        timer.poll(end + Duration::from_millis(500));
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.phase(), Phase::Break);

        timer.poll(end + Duration::from_millis(1500));
        assert_eq!(timer.seconds_remaining(), 299);
    }

    #[test]
    fn break_does_not_auto_start_when_disabled() {
        let t0 = Instant::now();
        let settings = TimerSettings {
            auto_start_break: false,
            ..TimerSettings::default()
        };
        let mut timer = PomodoroTimer::new(settings);
        timer.start(t0);
        timer.poll(t0 + secs(1500));
        assert!(!timer.has_pending_start());
        timer.poll(t0 + secs(2000));
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.seconds_remaining(), 300);
    }

    #[test]
    fn break_expiry_returns_to_idle_focus() {
        let t0 = Instant::now();
        let mut timer = PomodoroTimer::new(TimerSettings::default());
        timer.switch_phase(Phase::Break);
        timer.start(t0);
        let done = timer.poll(t0 + secs(300)).unwrap();
        assert_eq!(done.phase, Phase::Break);
        assert_eq!(timer.phase(), Phase::Focus);
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(!timer.has_pending_start());
        assert_eq!(timer.seconds_remaining(), 1500);
    }

    #[test]
    fn start_is_noop_while_running() {
        let t0 = Instant::now();
        let mut timer = PomodoroTimer::new(TimerSettings::default());
        timer.start(t0);
        timer.start(t0 + Duration::from_millis(900));
        timer.poll(t0 + secs(1));
        assert_eq!(timer.seconds_remaining(), 1499);
    }

    #[test]
    fn pause_keeps_remaining_and_stops_ticks() {
        let t0 = Instant::now();
        let mut timer = PomodoroTimer::new(TimerSettings::default());
        timer.start(t0);
        timer.poll(t0 + secs(5));
        timer.pause();
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.poll(t0 + secs(100)), None);
        assert_eq!(timer.seconds_remaining(), 1495);

        timer.pause();
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.seconds_remaining(), 1495);

        timer.start(t0 + secs(200));
        timer.poll(t0 + secs(201));
        assert_eq!(timer.seconds_remaining(), 1494);
    }

    #[test]
    fn pause_from_idle_holds_full_phase() {
        let t0 = Instant::now();
        let mut timer = PomodoroTimer::new(TimerSettings::default());
        timer.pause();
        timer.pause();
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.seconds_remaining(), 1500);

        timer.start(t0);
        timer.poll(t0 + secs(1));
        assert_eq!(timer.seconds_remaining(), 1499);
    }

    #[test]
    fn pause_holds_pending_auto_start() {
        let t0 = Instant::now();
        let mut timer = PomodoroTimer::new(TimerSettings::default());
        timer.start(t0);
        assert!(timer.poll(t0 + secs(1500)).is_some());
        assert!(timer.has_pending_start());

        timer.pause();
        assert!(!timer.has_pending_start());
        assert_eq!(timer.poll(t0 + secs(1600)), None);
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.phase(), Phase::Break);
        assert_eq!(timer.seconds_remaining(), 300);
    }

    #[test]
    fn reset_and_switch_are_idempotent() {
        let mut timer = PomodoroTimer::new(TimerSettings::default());
        timer.reset();
        timer.reset();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.seconds_remaining(), 1500);

        timer.switch_phase(Phase::Break);
        assert_eq!(timer.seconds_remaining(), 300);
        assert_eq!(timer.phase(), Phase::Break);
    }

    #[test]
    fn reset_cancels_pending_auto_start() {
        let t0 = Instant::now();
        let mut timer = PomodoroTimer::new(TimerSettings::default());
        timer.start(t0);
        timer.poll(t0 + secs(1500));
        timer.reset();
        timer.poll(t0 + secs(1600));
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.seconds_remaining(), 300);
    }

    #[test]
    fn settings_update_while_running_rescales() {
        let t0 = Instant::now();
        let mut timer = PomodoroTimer::new(TimerSettings::default());
        timer.start(t0);
        timer.poll(t0 + secs(750));
        assert_eq!(timer.seconds_remaining(), 750);

        timer.update_settings(TimerSettings {
            focus_minutes: 50,
            ..TimerSettings::default()
        });
        assert_eq!(timer.seconds_remaining(), 1500);
        assert!(timer.is_running());
    }

    #[test]
    fn settings_update_while_stopped_snaps() {
        let t0 = Instant::now();
        let mut timer = PomodoroTimer::new(TimerSettings::default());
        timer.start(t0);
        timer.poll(t0 + secs(60));
        timer.pause();
        timer.update_settings(TimerSettings {
            focus_minutes: 30,
            ..TimerSettings::default()
        });
        assert_eq!(timer.seconds_remaining(), 1800);
    }

    #[test]
    fn break_settings_do_not_touch_running_focus() {
        let t0 = Instant::now();
        let mut timer = PomodoroTimer::new(TimerSettings::default());
        timer.start(t0);
        timer.poll(t0 + secs(100));
        timer.update_settings(TimerSettings {
            break_minutes: 10,
            ..TimerSettings::default()
        });
        assert_eq!(timer.seconds_remaining(), 1400);
    }

    #[test]
    fn test_clamped_and_nudge() {
        let s = TimerSettings {
            focus_minutes: 200,
            break_minutes: 0,
            auto_start_break: false,
        }
        .clamped();
        assert_eq!((s.focus_minutes, s.break_minutes), (90, 3));

        let s = TimerSettings::default().nudge_focus(1).nudge_break(-1);
        assert_eq!((s.focus_minutes, s.break_minutes), (30, 4));
        let s = TimerSettings::default().nudge_focus(-10);
        assert_eq!(s.focus_minutes, 10);
    }

    #[test]
    fn settings_json_shape() {
        let json = serde_json::to_string(&TimerSettings::default()).unwrap();
        assert_eq!(json, r#"{"focus":25,"break":5,"autoStartBreak":true}"#);
        let s: TimerSettings =
            serde_json::from_str(r#"{"focusMinutes":40,"breakMinutes":8,"autoStartBreak":false}"#)
                .unwrap();
        assert_eq!(s.focus_minutes, 40);
        assert_eq!(s.break_minutes, 8);
        assert!(!s.auto_start_break);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(0), "00:00");
    }
}
