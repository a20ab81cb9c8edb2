use serde::{Deserialize, Deserializer, Serialize};

use crate::habits::HabitId;
use crate::storage::TimerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Work,
    Break,
}

/// Timer configuration and cycle position.
///
/// Serialized under the `timerState` key. The countdown itself is not
/// persisted: `time_remaining_seconds` is recomputed from the session kind
/// whenever a snapshot is loaded.
///
/// A field that does not fit (a negative duration, a non-string habit
/// reference) costs only itself; the rest of the snapshot is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    #[serde(rename = "workDuration", default = "default_work", deserialize_with = "clamped")]
    pub work_duration_minutes: u32,
    #[serde(rename = "breakDuration", default = "default_break", deserialize_with = "clamped")]
    pub break_duration_minutes: u32,
    #[serde(
        rename = "longBreakDuration",
        default = "default_long_break",
        deserialize_with = "clamped"
    )]
    pub long_break_duration_minutes: u32,
    #[serde(default = "default_sessions_per_cycle", deserialize_with = "clamped")]
    pub sessions_per_cycle: u32,
    #[serde(default = "default_true")]
    pub is_work_session: bool,
    #[serde(skip)]
    pub time_remaining_seconds: u64,
    #[serde(default)]
    pub completed_sessions: u64,
    #[serde(default, deserialize_with = "habit_id_or_none")]
    pub active_habit_id: Option<HabitId>,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

fn default_work() -> u32 {
    25
}
fn default_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_sessions_per_cycle() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

fn clamped<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    i64::deserialize(deserializer).map(clamp_minutes)
}

/// Older snapshots stored the active habit as a list position; anything
/// other than a string id is dropped.
fn habit_id_or_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<HabitId>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Some(id),
        _ => None,
    })
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            work_duration_minutes: default_work(),
            break_duration_minutes: default_break(),
            long_break_duration_minutes: default_long_break(),
            sessions_per_cycle: default_sessions_per_cycle(),
            is_work_session: true,
            time_remaining_seconds: u64::from(default_work()) * 60,
            completed_sessions: 0,
            active_habit_id: None,
            notifications_enabled: true,
        }
    }
}

impl TimerState {
    /// Fresh state seeded from the configured durations.
    pub fn from_config(config: &TimerConfig, notifications_enabled: bool) -> Self {
        let mut state = Self {
            work_duration_minutes: config.work_duration,
            break_duration_minutes: config.short_break,
            long_break_duration_minutes: config.long_break,
            sessions_per_cycle: config.sessions_per_cycle,
            notifications_enabled,
            ..Self::default()
        };
        state.clamp();
        state.time_remaining_seconds = u64::from(state.work_duration_minutes) * 60;
        state
    }

    pub fn session_kind(&self) -> SessionKind {
        if self.is_work_session {
            SessionKind::Work
        } else {
            SessionKind::Break
        }
    }

    /// Durations and cycle length never drop below 1.
    pub(crate) fn clamp(&mut self) {
        self.work_duration_minutes = self.work_duration_minutes.max(1);
        self.break_duration_minutes = self.break_duration_minutes.max(1);
        self.long_break_duration_minutes = self.long_break_duration_minutes.max(1);
        self.sessions_per_cycle = self.sessions_per_cycle.max(1);
    }
}

/// User-entered timer settings, clamped on apply.
///
/// Signed so that raw form input (zero, negatives) can be passed straight
/// through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub work_minutes: i64,
    pub break_minutes: i64,
    pub long_break_minutes: i64,
    pub sessions_per_cycle: i64,
    pub notifications_enabled: bool,
}

impl TimerSettings {
    pub(crate) fn apply_to(&self, state: &mut TimerState) {
        state.work_duration_minutes = clamp_minutes(self.work_minutes);
        state.break_duration_minutes = clamp_minutes(self.break_minutes);
        state.long_break_duration_minutes = clamp_minutes(self.long_break_minutes);
        state.sessions_per_cycle = clamp_minutes(self.sessions_per_cycle);
        state.notifications_enabled = self.notifications_enabled;
    }
}

fn clamp_minutes(value: i64) -> u32 {
    u32::try_from(value.max(1)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_fields_use_app_names() {
        let json = serde_json::to_value(TimerState::default()).unwrap();
        assert_eq!(json["workDuration"], 25);
        assert_eq!(json["longBreakDuration"], 15);
        assert_eq!(json["sessionsPerCycle"], 4);
        assert_eq!(json["isWorkSession"], true);
        assert!(json.get("timeRemainingSeconds").is_none());
    }

    #[test]
    fn partial_snapshot_fills_defaults() {
        let state: TimerState =
            serde_json::from_str(r#"{"workDuration": 50, "completedSessions": 3}"#).unwrap();
        assert_eq!(state.work_duration_minutes, 50);
        assert_eq!(state.break_duration_minutes, 5);
        assert_eq!(state.completed_sessions, 3);
        assert!(state.notifications_enabled);
    }

    #[test]
    fn invalid_durations_clamp_without_losing_the_snapshot() {
        let state: TimerState = serde_json::from_str(
            r#"{"workDuration": -5, "breakDuration": 0, "sessionsPerCycle": 3, "completedSessions": 7}"#,
        )
        .unwrap();
        assert_eq!(state.work_duration_minutes, 1);
        assert_eq!(state.break_duration_minutes, 1);
        assert_eq!(state.sessions_per_cycle, 3);
        assert_eq!(state.completed_sessions, 7);
    }

    #[test]
    fn positional_active_habit_is_dropped() {
        let state: TimerState = serde_json::from_str(
            r#"{"workDuration": 50, "activeHabitId": 0, "notificationsEnabled": false}"#,
        )
        .unwrap();
        assert_eq!(state.active_habit_id, None);
        assert_eq!(state.work_duration_minutes, 50);
        assert!(!state.notifications_enabled);

        let state: TimerState =
            serde_json::from_str(r#"{"activeHabitId": null}"#).unwrap();
        assert_eq!(state.active_habit_id, None);
        let state: TimerState =
            serde_json::from_str(r#"{"activeHabitId": "abc"}"#).unwrap();
        assert_eq!(state.active_habit_id.as_deref(), Some("abc"));
    }

    #[test]
    fn settings_clamp_to_one() {
        let mut state = TimerState::default();
        TimerSettings {
            work_minutes: 0,
            break_minutes: -3,
            long_break_minutes: 20,
            sessions_per_cycle: 0,
            notifications_enabled: false,
        }
        .apply_to(&mut state);
        assert_eq!(state.work_duration_minutes, 1);
        assert_eq!(state.break_duration_minutes, 1);
        assert_eq!(state.long_break_duration_minutes, 20);
        assert_eq!(state.sessions_per_cycle, 1);
        assert!(!state.notifications_enabled);
    }
}
