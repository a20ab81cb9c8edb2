//! Points, levels and the achievement ledger.
//!
//! Two rules are kept exactly as the app has always applied them:
//!
//! - At most one level is granted per `add_points` call, even when the
//!   points jump past several thresholds.
//! - Achievement dedup is substring containment: a candidate is rejected
//!   when any existing achievement text *contains* it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::achievement::{Achievement, AchievementKind};
use crate::events::Event;

/// Point totals that unlock a `points` achievement.
pub const POINT_MILESTONES: [u64; 6] = [50, 100, 250, 500, 1000, 2500];

pub const WELCOME_TEXT: &str = "Welcome to PomodoHabit!";

/// Points granted with the starter achievements on a first run.
const STARTER_POINTS: i64 = 25;

/// Anything that can hand out points and achievements.
///
/// The habit store and the timer's completion hook talk to the gamification
/// engine through this seam only.
pub trait Rewards {
    fn add_points(&mut self, amount: i64, at: DateTime<Utc>) -> Vec<Event>;
    fn add_achievement(&mut self, text: &str, kind: AchievementKind, at: DateTime<Utc>)
        -> Vec<Event>;
    fn has_achievement(&self, text: &str) -> bool;
}

/// Persisted gamification snapshot (`gamification` key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamificationState {
    #[serde(default)]
    pub points: u64,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

fn default_level() -> u32 {
    1
}

impl Default for GamificationState {
    fn default() -> Self {
        Self {
            points: 0,
            level: default_level(),
            achievements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GamificationEngine {
    state: GamificationState,
}

impl GamificationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(mut state: GamificationState) -> Self {
        state.level = state.level.max(1);
        Self { state }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &GamificationState {
        &self.state
    }

    pub fn points(&self) -> u64 {
        self.state.points
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    /// Achievements in insertion order.
    pub fn achievements(&self) -> &[Achievement] {
        &self.state.achievements
    }

    pub fn achievements_newest_first(&self) -> Vec<&Achievement> {
        let mut sorted: Vec<&Achievement> = self.state.achievements.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }

    /// Point total that triggers the next level-up: `level * 100`, so a fresh
    /// account reaches level 2 at 100 points rather than at the
    /// `(level + 1) * 100` threshold.
    pub fn points_for_next_level(&self) -> u64 {
        u64::from(self.state.level) * 100
    }

    /// 0.0 .. 100.0 progress bar towards the next level.
    pub fn level_progress_pct(&self) -> f64 {
        let required = self.points_for_next_level() as f64;
        (self.state.points as f64 / required * 100.0).min(100.0)
    }

    pub fn has_achievement(&self, text: &str) -> bool {
        self.state
            .achievements
            .iter()
            .any(|a| a.text.contains(text))
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn add_points(&mut self, amount: i64, at: DateTime<Utc>) -> Vec<Event> {
        self.state.points = self.state.points.saturating_add_signed(amount);
        let mut events = vec![Event::PointsAdded {
            amount,
            total: self.state.points,
            at,
        }];
        self.check_level_up(at, &mut events);
        self.check_point_milestones(at, &mut events);
        events
    }

    pub fn add_achievement(
        &mut self,
        text: &str,
        kind: AchievementKind,
        at: DateTime<Utc>,
    ) -> Vec<Event> {
        if self.has_achievement(text) {
            return Vec::new();
        }

        let achievement = Achievement::new(text, kind, at);
        tracing::debug!(text, ?kind, "achievement added");
        self.state.achievements.push(achievement.clone());
        let mut events = vec![Event::AchievementAdded { achievement }];

        if text.contains(WELCOME_TEXT) && self.state.achievements.len() == 1 {
            events.extend(self.add_achievement(
                "Setup complete! Ready to build habits!",
                AchievementKind::Milestone,
                at,
            ));
            events.extend(self.add_achievement(
                "First timer session awaits!",
                AchievementKind::General,
                at,
            ));
            events.extend(self.add_points(STARTER_POINTS, at));
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Single step only; a large jump still grants one level per call.
    fn check_level_up(&mut self, at: DateTime<Utc>, events: &mut Vec<Event>) {
        if self.state.points < self.points_for_next_level() {
            return;
        }
        self.state.level += 1;
        let level = self.state.level;
        tracing::info!(level, points = self.state.points, "level up");
        events.push(Event::LevelUp { level, at });
        events.extend(self.add_achievement(
            &format!("Leveled up to Level {level}!"),
            AchievementKind::LevelUp,
            at,
        ));
        events.push(Event::CelebrationRequested { at });
    }

    fn check_point_milestones(&mut self, at: DateTime<Utc>, events: &mut Vec<Event>) {
        for milestone in POINT_MILESTONES {
            if self.state.points >= milestone && !self.has_achievement(&format!("{milestone} Points"))
            {
                events.extend(self.add_achievement(
                    &format!("Achievement Unlocked: {milestone} Points!"),
                    AchievementKind::Points,
                    at,
                ));
            }
        }
    }
}

impl Rewards for GamificationEngine {
    fn add_points(&mut self, amount: i64, at: DateTime<Utc>) -> Vec<Event> {
        GamificationEngine::add_points(self, amount, at)
    }

    fn add_achievement(
        &mut self,
        text: &str,
        kind: AchievementKind,
        at: DateTime<Utc>,
    ) -> Vec<Event> {
        GamificationEngine::add_achievement(self, text, kind, at)
    }

    fn has_achievement(&self, text: &str) -> bool {
        GamificationEngine::has_achievement(self, text)
    }
}
