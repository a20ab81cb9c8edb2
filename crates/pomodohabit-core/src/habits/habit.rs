use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque habit identifier.
pub type HabitId = String;

/// A tracked habit and its completion log.
///
/// `longest_streak >= streak` always holds, and every completion appends to
/// `history`, so `history.len() == sessions` for habits created by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub sessions: u64,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub last_completed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub history: Vec<DateTime<Utc>>,
}

impl Habit {
    pub fn new(name: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            streak: 0,
            longest_streak: 0,
            sessions: 0,
            created,
            last_completed: None,
            history: Vec::new(),
        }
    }

    /// Points granted for one completion at the current streak: 5, plus one
    /// per five streak days, capped at +5.
    pub fn completion_bonus(&self) -> i64 {
        5 + i64::from((self.streak / 5).min(5))
    }
}
