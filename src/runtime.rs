//! The single-actor loop. Terminal input and ticks arrive one at a time, and the
//! tracker is polled up to the current instant before each one is handed back,
//! so a key press never acts on a countdown with an unapplied tick.

use std::cell::Cell;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use crate::error::Result;
use crate::storage::SlotStore;
use crate::timer::PhaseCompleted;
use crate::tracker::Tracker;

/// How long the loop waits for input before ticking.
pub const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

pub trait EventSource {
    /// Wait up to `timeout` for input. `None` means nothing arrived.
    fn next_event(&self, timeout: Duration) -> Option<AppEvent>;
}

/// Reads the terminal on the loop's own thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn next_event(&self, timeout: Duration) -> Option<AppEvent> {
        let ready = event::poll(timeout).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "terminal poll failed");
            false
        });
        if !ready {
            return None;
        }
        match event::read() {
            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => Some(AppEvent::Key(key)),
            Ok(Event::Resize(_, _)) => Some(AppEvent::Resize),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "terminal read failed");
                None
            }
        }
    }
}

/// Scripted input for headless runs.
impl EventSource for Receiver<AppEvent> {
    fn next_event(&self, timeout: Duration) -> Option<AppEvent> {
        self.recv_timeout(timeout).ok()
    }
}

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// One turn of the loop.
#[derive(Debug)]
pub struct Update {
    pub event: AppEvent,
    /// The instant the tracker was polled at; key handlers should act as of it.
    pub now: Instant,
    /// Phase that ended while polling, or the error from recording it.
    pub completed: Result<Option<PhaseCompleted>>,
}

pub struct Runner<E: EventSource, C: Clock> {
    events: E,
    clock: C,
    tick_rate: Duration,
}

impl<E: EventSource, C: Clock> Runner<E, C> {
    pub fn new(events: E, clock: C) -> Self {
        Self {
            events,
            clock,
            tick_rate: TICK_RATE,
        }
    }

    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Wait for the next event (a tick when input times out), then drive the
    /// tracker to the clock's current instant.
    pub fn step<S: SlotStore>(&self, tracker: &mut Tracker<S>) -> Update {
        let event = self
            .events
            .next_event(self.tick_rate)
            .unwrap_or(AppEvent::Tick);
        let now = self.clock.now();
        let completed = tracker.poll(now);
        Update {
            event,
            now,
            completed,
        }
    }
}
