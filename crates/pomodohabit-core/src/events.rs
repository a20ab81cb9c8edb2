use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gamification::Achievement;
use crate::habits::HabitId;
use crate::timer::SessionKind;

/// Every state change in the core produces an Event.
/// The rendering layer consumes them; the core never touches a display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        kind: SessionKind,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    SessionCompleted {
        kind: SessionKind,
        completed_sessions: u64,
        at: DateTime<Utc>,
    },
    /// User-facing message; only produced while notifications are enabled.
    Notification {
        message: String,
        at: DateTime<Utc>,
    },
    PointsAdded {
        amount: i64,
        total: u64,
        at: DateTime<Utc>,
    },
    AchievementAdded {
        achievement: Achievement,
    },
    LevelUp {
        level: u32,
        at: DateTime<Utc>,
    },
    StreakMilestone {
        habit_id: HabitId,
        streak: u32,
        at: DateTime<Utc>,
    },
    /// Opaque celebratory-effect request (confetti and the like).
    CelebrationRequested {
        at: DateTime<Utc>,
    },
    HabitReminder {
        habit_id: HabitId,
        name: String,
        days_since: i64,
    },
    DataCleared {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_celebration(&self) -> bool {
        matches!(self, Event::CelebrationRequested { .. })
    }
}
