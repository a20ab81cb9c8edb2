//! Habit collection and streak bookkeeping.
//!
//! Streak continuity is decided on calendar days in the clock's zone:
//!
//! ```text
//! last completed today      -> streak unchanged
//! last completed yesterday  -> streak + 1
//! anything else             -> streak = 1
//! ```
//!
//! `sessions` counts every completion regardless of the day.

use chrono::{DateTime, Utc};

use super::habit::{Habit, HabitId};
use crate::clock::Clock;
use crate::events::Event;
use crate::gamification::{AchievementKind, Rewards};

/// Streak values that unlock a `streak` achievement.
pub const STREAK_MILESTONES: [u32; 3] = [3, 7, 30];

/// Milestones that also ask the renderer for a celebration.
const CELEBRATED_STREAKS: [u32; 2] = [7, 30];

/// Days without a completion before a habit shows up in reminders.
const REMINDER_AFTER_DAYS: i64 = 2;

const FIRST_HABIT_TEXT: &str = "First habit created! Your journey begins!";

const SAMPLE_HABITS: [(&str, &str); 3] = [
    ("Exercise", "Started tracking Exercise!"),
    ("Reading", "Created Reading habit!"),
    ("Meditation", "Added Meditation to your routine!"),
];

const SAMPLE_POINTS: i64 = 50;

#[derive(Debug, Clone, Default)]
pub struct HabitStore {
    habits: Vec<Habit>,
}

impl HabitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_habits(habits: Vec<Habit>) -> Self {
        Self { habits }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// Habits not completed for at least two calendar days.
    pub fn reminders(&self, clock: &dyn Clock) -> Vec<Event> {
        let today = clock.today();
        self.habits
            .iter()
            .filter_map(|habit| {
                let last = clock.local_date(habit.last_completed?);
                let days_since = (today - last).num_days();
                (days_since >= REMINDER_AFTER_DAYS).then(|| Event::HabitReminder {
                    habit_id: habit.id.clone(),
                    name: habit.name.clone(),
                    days_since,
                })
            })
            .collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Add a habit. Blank names are ignored.
    ///
    /// The very first habit in the collection earns a milestone achievement.
    pub fn add_habit(
        &mut self,
        name: &str,
        at: DateTime<Utc>,
        rewards: &mut dyn Rewards,
    ) -> Option<(HabitId, Vec<Event>)> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let habit = Habit::new(name, at);
        let id = habit.id.clone();
        self.habits.push(habit);
        tracing::debug!(%id, name, "habit added");

        let events = if self.habits.len() == 1 {
            rewards.add_achievement(FIRST_HABIT_TEXT, AchievementKind::Milestone, at)
        } else {
            Vec::new()
        };
        Some((id, events))
    }

    /// Returns `false` when the id is unknown or the new name is blank.
    pub fn rename_habit(&mut self, id: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.habits.iter_mut().find(|h| h.id == id) {
            Some(habit) => {
                habit.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn delete_habit(&mut self, id: &str) -> Option<Habit> {
        let index = self.habits.iter().position(|h| h.id == id)?;
        Some(self.habits.remove(index))
    }

    /// Log one completion of habit `id` at the clock's current instant.
    ///
    /// Unknown ids are ignored and produce no events.
    pub fn record_completion(
        &mut self,
        id: &str,
        clock: &dyn Clock,
        rewards: &mut dyn Rewards,
    ) -> Vec<Event> {
        let Some(habit) = self.habits.iter_mut().find(|h| h.id == id) else {
            tracing::debug!(id, "completion for unknown habit ignored");
            return Vec::new();
        };

        let now = clock.now();
        let today = clock.local_date(now);
        let previous = habit.last_completed.map(|at| clock.local_date(at));
        let streak_before = habit.streak;

        match previous {
            Some(day) if day == today => {}
            Some(day) if today.pred_opt() == Some(day) => habit.streak += 1,
            _ => habit.streak = 1,
        }
        habit.longest_streak = habit.longest_streak.max(habit.streak);
        habit.sessions += 1;
        habit.history.push(now);
        habit.last_completed = Some(now);

        let mut events = Vec::new();
        let streak = habit.streak;
        // Same-day repeats leave the streak where it was and must not re-fire.
        if streak != streak_before && STREAK_MILESTONES.contains(&streak) {
            tracing::info!(habit = %habit.name, streak, "streak milestone");
            events.push(Event::StreakMilestone {
                habit_id: habit.id.clone(),
                streak,
                at: now,
            });
            let text = format!("{streak}-day streak for {}!", habit.name);
            events.extend(rewards.add_achievement(&text, AchievementKind::Streak, now));
            if CELEBRATED_STREAKS.contains(&streak) {
                events.push(Event::CelebrationRequested { at: now });
            }
        }

        let bonus = habit.completion_bonus();
        events.extend(rewards.add_points(bonus, now));
        events
    }

    /// Fill an empty collection with the demo habits.
    pub fn seed_samples(&mut self, at: DateTime<Utc>, rewards: &mut dyn Rewards) -> Vec<Event> {
        if !self.habits.is_empty() {
            return Vec::new();
        }

        let mut events = Vec::new();
        for (name, _) in SAMPLE_HABITS {
            self.habits.push(Habit::new(name, at));
        }
        for (_, text) in SAMPLE_HABITS {
            events.extend(rewards.add_achievement(text, AchievementKind::Milestone, at));
        }
        events.extend(rewards.add_points(SAMPLE_POINTS, at));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::gamification::GamificationEngine;
    use chrono::{Duration, TimeZone};

    fn setup() -> (HabitStore, GamificationEngine, ManualClock, HabitId) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap());
        let mut rewards = GamificationEngine::new();
        let mut store = HabitStore::new();
        let (id, _) = store
            .add_habit("Reading", clock.now(), &mut rewards)
            .unwrap();
        (store, rewards, clock, id)
    }

    #[test]
    fn first_completion_starts_streak() {
        let (mut store, mut rewards, clock, id) = setup();
        store.record_completion(&id, &clock, &mut rewards);

        let habit = store.get(&id).unwrap();
        assert_eq!(habit.streak, 1);
        assert_eq!(habit.longest_streak, 1);
        assert_eq!(habit.sessions, 1);
        assert_eq!(habit.history.len(), 1);
        assert_eq!(habit.last_completed, Some(clock.now()));
    }

    #[test]
    fn same_day_counts_sessions_not_streak() {
        let (mut store, mut rewards, clock, id) = setup();
        store.record_completion(&id, &clock, &mut rewards);
        clock.advance(Duration::hours(3));
        store.record_completion(&id, &clock, &mut rewards);

        let habit = store.get(&id).unwrap();
        assert_eq!(habit.sessions, 2);
        assert_eq!(habit.streak, 1);
        assert_eq!(habit.history.len(), 2);
    }

    #[test]
    fn consecutive_days_extend_streak() {
        let (mut store, mut rewards, clock, id) = setup();
        store.record_completion(&id, &clock, &mut rewards);
        clock.advance(Duration::days(1));
        store.record_completion(&id, &clock, &mut rewards);
        assert_eq!(store.get(&id).unwrap().streak, 2);
    }

    #[test]
    fn calendar_day_not_24h_window() {
        let (mut store, mut rewards, clock, id) = setup();
        clock.set(Utc.with_ymd_and_hms(2026, 3, 2, 23, 30, 0).unwrap());
        store.record_completion(&id, &clock, &mut rewards);
        // Only 40 minutes later, but already the next calendar day.
        clock.advance(Duration::minutes(40));
        store.record_completion(&id, &clock, &mut rewards);
        assert_eq!(store.get(&id).unwrap().streak, 2);
    }

    #[test]
    fn two_day_gap_resets_streak() {
        let (mut store, mut rewards, clock, id) = setup();
        for _ in 0..3 {
            store.record_completion(&id, &clock, &mut rewards);
            clock.advance(Duration::days(1));
        }
        clock.advance(Duration::days(1));
        store.record_completion(&id, &clock, &mut rewards);

        let habit = store.get(&id).unwrap();
        assert_eq!(habit.streak, 1);
        assert_eq!(habit.longest_streak, 3);
    }

    #[test]
    fn unknown_id_is_a_no_op() {
        let (mut store, mut rewards, clock, _) = setup();
        let points = rewards.points();
        let events = store.record_completion("missing", &clock, &mut rewards);
        assert!(events.is_empty());
        assert_eq!(rewards.points(), points);
    }

    #[test]
    fn completion_awards_streak_bonus() {
        let (mut store, mut rewards, clock, id) = setup();
        let before = rewards.points();
        store.record_completion(&id, &clock, &mut rewards);
        assert_eq!(rewards.points(), before + 5);
    }

    /// Records requests without applying any level rules.
    #[derive(Default)]
    struct RecordingRewards {
        points: Vec<i64>,
        achievements: Vec<(String, AchievementKind)>,
    }

    impl Rewards for RecordingRewards {
        fn add_points(&mut self, amount: i64, _at: DateTime<Utc>) -> Vec<Event> {
            self.points.push(amount);
            Vec::new()
        }

        fn add_achievement(
            &mut self,
            text: &str,
            kind: AchievementKind,
            _at: DateTime<Utc>,
        ) -> Vec<Event> {
            self.achievements.push((text.to_string(), kind));
            Vec::new()
        }

        fn has_achievement(&self, text: &str) -> bool {
            self.achievements.iter().any(|(t, _)| t.contains(text))
        }
    }

    #[test]
    fn milestones_fire_once_per_threshold() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap());
        let mut rewards = RecordingRewards::default();
        let mut store = HabitStore::new();
        let (id, _) = store.add_habit("Reading", clock.now(), &mut rewards).unwrap();
        rewards.achievements.clear();

        let mut milestones = Vec::new();
        let mut celebrations = 0;
        for _ in 0..30 {
            let events = store.record_completion(&id, &clock, &mut rewards);
            // A second completion on the same day must not re-trigger anything.
            let repeat = store.record_completion(&id, &clock, &mut rewards);
            assert!(repeat.is_empty());
            for event in events {
                match event {
                    Event::StreakMilestone { streak, .. } => milestones.push(streak),
                    Event::CelebrationRequested { .. } => celebrations += 1,
                    _ => {}
                }
            }
            clock.advance(Duration::days(1));
        }

        assert_eq!(milestones, vec![3, 7, 30]);
        assert_eq!(celebrations, 2);
        let texts: Vec<&str> = rewards.achievements.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "3-day streak for Reading!",
                "7-day streak for Reading!",
                "30-day streak for Reading!",
            ]
        );
        assert!(rewards
            .achievements
            .iter()
            .all(|(_, kind)| *kind == AchievementKind::Streak));
        // 60 completions; the bonus grows from 5 towards the +5 cap.
        assert_eq!(rewards.points.len(), 60);
        assert_eq!(rewards.points.last(), Some(&10));
    }

    #[test]
    fn rebuilt_streak_fires_milestone_again_without_new_achievement() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap());
        let mut rewards = RecordingRewards::default();
        let mut store = HabitStore::new();
        let (id, _) = store.add_habit("Reading", clock.now(), &mut rewards).unwrap();
        rewards.achievements.clear();

        let mut milestones = Vec::new();
        for run in 0..2 {
            for _ in 0..3 {
                for event in store.record_completion(&id, &clock, &mut rewards) {
                    if let Event::StreakMilestone { streak, .. } = event {
                        milestones.push((run, streak));
                    }
                }
                clock.advance(Duration::days(1));
            }
            // Skip a day so the streak breaks.
            clock.advance(Duration::days(1));
        }

        assert_eq!(milestones, vec![(0, 3), (1, 3)]);
        // Requested again; the engine's dedup keeps a single ledger entry.
        let streak_texts = rewards
            .achievements
            .iter()
            .filter(|(t, _)| t == "3-day streak for Reading!")
            .count();
        assert_eq!(streak_texts, 2);

        let mut engine = GamificationEngine::new();
        engine.add_achievement("3-day streak for Reading!", AchievementKind::Streak, clock.now());
        assert!(engine
            .add_achievement("3-day streak for Reading!", AchievementKind::Streak, clock.now())
            .is_empty());
    }

    #[test]
    fn add_habit_ignores_blank_names() {
        let mut store = HabitStore::new();
        let mut rewards = GamificationEngine::new();
        assert!(store.add_habit("   ", Utc::now(), &mut rewards).is_none());
        assert!(store.is_empty());
        assert!(rewards.achievements().is_empty());
    }

    #[test]
    fn first_habit_earns_milestone() {
        let mut store = HabitStore::new();
        let mut rewards = GamificationEngine::new();
        store.add_habit("Reading", Utc::now(), &mut rewards);
        store.add_habit("Running", Utc::now(), &mut rewards);
        assert_eq!(rewards.achievements().len(), 1);
        assert!(rewards.has_achievement("First habit created!"));
    }

    #[test]
    fn rename_and_delete() {
        let (mut store, _, _, id) = setup();
        assert!(store.rename_habit(&id, " Deep Reading "));
        assert_eq!(store.get(&id).unwrap().name, "Deep Reading");
        assert!(!store.rename_habit(&id, ""));
        assert!(!store.rename_habit("missing", "x"));

        let removed = store.delete_habit(&id).unwrap();
        assert_eq!(removed.name, "Deep Reading");
        assert!(store.delete_habit(&id).is_none());
    }

    #[test]
    fn reminders_after_two_days() {
        let (mut store, mut rewards, clock, id) = setup();
        store.record_completion(&id, &clock, &mut rewards);
        clock.advance(Duration::days(1));
        assert!(store.reminders(&clock).is_empty());

        clock.advance(Duration::days(2));
        let reminders = store.reminders(&clock);
        assert_eq!(
            reminders,
            vec![Event::HabitReminder {
                habit_id: id,
                name: "Reading".into(),
                days_since: 3,
            }]
        );
    }

    #[test]
    fn seeding_only_fills_empty_store() {
        let mut store = HabitStore::new();
        let mut rewards = GamificationEngine::new();
        store.seed_samples(Utc::now(), &mut rewards);
        assert_eq!(store.len(), 3);
        assert_eq!(rewards.points(), 50);
        assert!(rewards.has_achievement("Started tracking Exercise!"));

        assert!(store.seed_samples(Utc::now(), &mut rewards).is_empty());
        assert_eq!(store.len(), 3);
    }
}
