use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementKind {
    Points,
    Streak,
    LevelUp,
    Milestone,
    #[default]
    #[serde(other)]
    General,
}

impl AchievementKind {
    pub fn icon(&self) -> &'static str {
        match self {
            AchievementKind::Points => "🎯",
            AchievementKind::Streak => "🔥",
            AchievementKind::LevelUp => "⭐",
            AchievementKind::Milestone => "🏆",
            AchievementKind::General => "🎉",
        }
    }
}

/// A single ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: AchievementKind,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub icon: String,
}

impl Achievement {
    pub fn new(text: impl Into<String>, kind: AchievementKind, date: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            kind,
            date,
            icon: kind.icon().to_string(),
        }
    }

    /// Icon to display, falling back to the kind's icon for entries stored without one.
    pub fn display_icon(&self) -> &str {
        if self.icon.is_empty() {
            self.kind.icon()
        } else {
            &self.icon
        }
    }
}
