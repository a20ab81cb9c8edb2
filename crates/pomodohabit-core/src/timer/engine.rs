//! Timer engine implementation.
//!
//! The timer is a countdown state machine with one-second resolution. It does
//! not own a thread or an interval: the caller drives it by invoking `tick()`
//! once per second while it is running.
//!
//! ## State Transitions
//!
//! ```text
//! (Work | Break) x (running | paused)
//!
//! Work  --tick at 0--> Break  (auto-started when auto_advance is on)
//! Break --tick at 0--> Work   (auto-started when auto_advance is on)
//! ```
//!
//! A tick is atomic, so `pause()` lands either before the completing tick
//! (which then does nothing) or after it (stopping the chained session).
//! Either way the pause wins over the automatic restart.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerState::default());
//! engine.start(now);
//! // Once per second:
//! let events = engine.tick(now, &mut observer);
//! ```

use chrono::{DateTime, Utc};

use super::state::{SessionKind, TimerSettings, TimerState};
use crate::events::Event;
use crate::habits::HabitId;

const WORK_DONE_MESSAGE: &str = "Work session complete! Time for a break.";
const BREAK_DONE_MESSAGE: &str = "Break over! Back to work.";

/// Receives work-session completions from the timer.
pub trait WorkSessionObserver {
    /// Called after `completed_sessions` is incremented and before the timer
    /// flips to the break.
    fn work_session_completed(
        &mut self,
        active_habit: Option<&str>,
        at: DateTime<Utc>,
    ) -> Vec<Event>;
}

/// Core timer engine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    state: TimerState,
    running: bool,
    auto_advance: bool,
}

impl TimerEngine {
    /// Create an engine from a (possibly rehydrated) state.
    ///
    /// Starts paused with the remaining time recomputed for the current
    /// session kind.
    pub fn new(state: TimerState) -> Self {
        let mut engine = Self {
            state,
            running: false,
            auto_advance: true,
        };
        engine.set_timer_for_session();
        engine
    }

    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn session_kind(&self) -> SessionKind {
        self.state.session_kind()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state.time_remaining_seconds
    }

    pub fn completed_sessions(&self) -> u64 {
        self.state.completed_sessions
    }

    pub fn active_habit(&self) -> Option<&str> {
        self.state.active_habit_id.as_deref()
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        let secs = self.state.time_remaining_seconds;
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, at: DateTime<Utc>) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        tracing::debug!(kind = ?self.session_kind(), remaining = self.remaining_secs(), "timer started");
        Some(Event::TimerStarted {
            kind: self.session_kind(),
            remaining_secs: self.state.time_remaining_seconds,
            at,
        })
    }

    pub fn pause(&mut self, at: DateTime<Utc>) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            remaining_secs: self.state.time_remaining_seconds,
            at,
        })
    }

    /// Pause, return to a work session and reload its full duration.
    pub fn reset(&mut self, at: DateTime<Utc>) -> Vec<Event> {
        let mut events: Vec<Event> = self.pause(at).into_iter().collect();
        self.state.is_work_session = true;
        self.set_timer_for_session();
        events.push(Event::TimerReset { at });
        events
    }

    /// Apply new durations. Pauses and restarts the cycle position at a work
    /// session, like a reset.
    pub fn configure(&mut self, settings: TimerSettings, at: DateTime<Utc>) -> Vec<Event> {
        let mut events: Vec<Event> = self.pause(at).into_iter().collect();
        self.state.is_work_session = true;
        settings.apply_to(&mut self.state);
        self.set_timer_for_session();
        events.push(Event::TimerReset { at });
        events
    }

    pub fn set_active_habit(&mut self, habit: Option<HabitId>) {
        self.state.active_habit_id = habit;
    }

    /// Drop the active habit if it is `id`. Returns whether it was cleared.
    pub fn forget_habit(&mut self, id: &str) -> bool {
        if self.state.active_habit_id.as_deref() == Some(id) {
            self.state.active_habit_id = None;
            true
        } else {
            false
        }
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.state.notifications_enabled = enabled;
    }

    /// Advance the countdown by one second.
    ///
    /// A tick that finds zero seconds left completes the session, so an
    /// N-second session completes on the (N+1)th tick.
    pub fn tick(
        &mut self,
        at: DateTime<Utc>,
        observer: &mut dyn WorkSessionObserver,
    ) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        if self.state.time_remaining_seconds > 0 {
            self.state.time_remaining_seconds -= 1;
            return Vec::new();
        }

        let kind = self.session_kind();
        if kind == SessionKind::Work {
            self.state.completed_sessions += 1;
        }
        tracing::debug!(?kind, completed = self.state.completed_sessions, "session completed");

        let mut events = vec![Event::SessionCompleted {
            kind,
            completed_sessions: self.state.completed_sessions,
            at,
        }];
        if kind == SessionKind::Work {
            events.extend(observer.work_session_completed(self.state.active_habit_id.as_deref(), at));
        }
        if self.state.notifications_enabled {
            let message = match kind {
                SessionKind::Work => WORK_DONE_MESSAGE,
                SessionKind::Break => BREAK_DONE_MESSAGE,
            };
            events.push(Event::Notification {
                message: message.to_string(),
                at,
            });
        }

        self.state.is_work_session = !self.state.is_work_session;
        self.set_timer_for_session();
        self.running = false;
        if self.auto_advance {
            events.extend(self.start(at));
        }
        events
    }

    /// Load the remaining time for the current session kind.
    ///
    /// Breaks are long whenever `completed_sessions` is a multiple of
    /// `sessions_per_cycle`, including zero.
    pub fn set_timer_for_session(&mut self) {
        self.state.clamp();
        let minutes = if self.state.is_work_session {
            self.state.work_duration_minutes
        } else if self.state.completed_sessions % u64::from(self.state.sessions_per_cycle) == 0 {
            self.state.long_break_duration_minutes
        } else {
            self.state.break_duration_minutes
        };
        self.state.time_remaining_seconds = u64::from(minutes) * 60;
    }
}
