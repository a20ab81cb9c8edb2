//! Application facade.
//!
//! [`Tracker`] owns the three engines, the persistence collaborator and the
//! clock. Each mutating call applies its rules in causal order
//! (completion, points, achievements) and writes the touched snapshots
//! before it returns.

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::error::Result;
use crate::events::Event;
use crate::gamification::{
    AchievementKind, GamificationEngine, GamificationState, WELCOME_TEXT,
};
use crate::habits::{Habit, HabitId, HabitStore};
use crate::storage::{
    load_snapshot, save_snapshot, Config, KeyValueStore, GAMIFICATION_KEY, HABITS_KEY, TIMER_KEY,
};
use crate::timer::{TimerEngine, TimerSettings, TimerState, WorkSessionObserver};

/// Points for finishing a work session.
pub const WORK_SESSION_POINTS: i64 = 10;

/// Routes a finished work session into points and the active habit's log.
struct SessionRewards<'a> {
    habits: &'a mut HabitStore,
    gamification: &'a mut GamificationEngine,
    clock: &'a dyn Clock,
}

impl WorkSessionObserver for SessionRewards<'_> {
    fn work_session_completed(
        &mut self,
        active_habit: Option<&str>,
        at: DateTime<Utc>,
    ) -> Vec<Event> {
        let mut events = self.gamification.add_points(WORK_SESSION_POINTS, at);
        if let Some(id) = active_habit {
            events.extend(
                self.habits
                    .record_completion(id, self.clock, &mut *self.gamification),
            );
        }
        events
    }
}

pub struct Tracker<S: KeyValueStore, C: Clock> {
    store: S,
    clock: C,
    config: Config,
    timer: TimerEngine,
    habits: HabitStore,
    gamification: GamificationEngine,
}

impl<S: KeyValueStore, C: Clock> Tracker<S, C> {
    /// Rehydrate every engine from `store`, falling back to defaults for any
    /// snapshot that is missing or malformed.
    ///
    /// A first run (no habit collection stored) seeds the demo habits when
    /// `config.seed_samples` is set, and every run without a welcome
    /// achievement receives one. Returns the events those steps produced.
    pub fn open(store: S, clock: C, config: Config) -> Result<(Self, Vec<Event>)> {
        let gamification = load_snapshot::<GamificationState>(&store, GAMIFICATION_KEY)
            .map(GamificationEngine::from_state)
            .unwrap_or_default();
        let stored_habits = load_snapshot::<Vec<Habit>>(&store, HABITS_KEY);
        let timer_state = load_snapshot::<TimerState>(&store, TIMER_KEY)
            .unwrap_or_else(|| TimerState::from_config(&config.timer, config.notifications_enabled));

        let first_run = stored_habits.is_none();
        let mut tracker = Self {
            timer: TimerEngine::new(timer_state).with_auto_advance(config.auto_advance),
            habits: HabitStore::from_habits(stored_habits.unwrap_or_default()),
            gamification,
            store,
            clock,
            config,
        };

        let now = tracker.clock.now();
        let mut events = Vec::new();
        if first_run && tracker.config.seed_samples {
            tracing::info!("first run, seeding sample habits");
            events.extend(
                tracker
                    .habits
                    .seed_samples(now, &mut tracker.gamification),
            );
        }
        if let Some(id) = tracker.timer.active_habit().map(str::to_string) {
            if tracker.habits.get(&id).is_none() {
                tracker.timer.forget_habit(&id);
            }
        }
        if !tracker.gamification.has_achievement("Welcome") {
            events.extend(tracker.gamification.add_achievement(
                WELCOME_TEXT,
                AchievementKind::Milestone,
                now,
            ));
        }

        tracker.persist_all()?;
        Ok((tracker, events))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn habits(&self) -> &HabitStore {
        &self.habits
    }

    pub fn gamification(&self) -> &GamificationEngine {
        &self.gamification
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Habits that have gone two or more calendar days without a completion.
    pub fn reminders(&self) -> Vec<Event> {
        self.habits.reminders(&self.clock)
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<Vec<Event>> {
        let events: Vec<Event> = self.timer.start(self.clock.now()).into_iter().collect();
        self.persist_timer()?;
        Ok(events)
    }

    pub fn pause(&mut self) -> Result<Vec<Event>> {
        let events: Vec<Event> = self.timer.pause(self.clock.now()).into_iter().collect();
        self.persist_timer()?;
        Ok(events)
    }

    pub fn reset(&mut self) -> Result<Vec<Event>> {
        let events = self.timer.reset(self.clock.now());
        self.persist_timer()?;
        Ok(events)
    }

    pub fn configure_timer(&mut self, settings: TimerSettings) -> Result<Vec<Event>> {
        let events = self.timer.configure(settings, self.clock.now());
        self.persist_timer()?;
        Ok(events)
    }

    /// Select the habit credited by finished work sessions. Unknown ids are
    /// ignored and reported as `false`.
    pub fn set_active_habit(&mut self, id: Option<&str>) -> Result<bool> {
        if let Some(id) = id {
            if self.habits.get(id).is_none() {
                return Ok(false);
            }
        }
        self.timer.set_active_habit(id.map(str::to_string));
        self.persist_timer()?;
        Ok(true)
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) -> Result<()> {
        self.timer.set_notifications_enabled(enabled);
        self.persist_timer()
    }

    /// One scheduler tick (one second).
    pub fn tick(&mut self) -> Result<Vec<Event>> {
        let now = self.clock.now();
        let mut rewards = SessionRewards {
            habits: &mut self.habits,
            gamification: &mut self.gamification,
            clock: &self.clock,
        };
        let events = self.timer.tick(now, &mut rewards);
        if !events.is_empty() {
            self.persist_all()?;
        }
        Ok(events)
    }

    // ── Habits ───────────────────────────────────────────────────────

    /// Returns `None` for blank names.
    pub fn add_habit(&mut self, name: &str) -> Result<Option<(HabitId, Vec<Event>)>> {
        let added = self
            .habits
            .add_habit(name, self.clock.now(), &mut self.gamification);
        if added.is_some() {
            self.persist_habits()?;
            self.persist_gamification()?;
        }
        Ok(added)
    }

    pub fn rename_habit(&mut self, id: &str, name: &str) -> Result<bool> {
        let renamed = self.habits.rename_habit(id, name);
        if renamed {
            self.persist_habits()?;
        }
        Ok(renamed)
    }

    pub fn delete_habit(&mut self, id: &str) -> Result<Option<Habit>> {
        let removed = self.habits.delete_habit(id);
        if removed.is_some() {
            self.persist_habits()?;
            if self.timer.forget_habit(id) {
                self.persist_timer()?;
            }
        }
        Ok(removed)
    }

    /// Log a completion by hand (outside of a timer session).
    pub fn log_habit(&mut self, id: &str) -> Result<Vec<Event>> {
        let events = self
            .habits
            .record_completion(id, &self.clock, &mut self.gamification);
        if !events.is_empty() {
            self.persist_habits()?;
            self.persist_gamification()?;
        }
        Ok(events)
    }

    // ── Gamification ─────────────────────────────────────────────────

    pub fn add_points(&mut self, amount: i64) -> Result<Vec<Event>> {
        let events = self.gamification.add_points(amount, self.clock.now());
        self.persist_gamification()?;
        Ok(events)
    }

    pub fn add_achievement(&mut self, text: &str, kind: AchievementKind) -> Result<Vec<Event>> {
        let events = self
            .gamification
            .add_achievement(text, kind, self.clock.now());
        self.persist_gamification()?;
        Ok(events)
    }

    /// Drop every snapshot and return to blank defaults. Samples are not
    /// reseeded until the next `open`.
    pub fn clear_all(&mut self) -> Result<Vec<Event>> {
        for key in [HABITS_KEY, GAMIFICATION_KEY, TIMER_KEY] {
            self.store.remove(key)?;
        }
        self.habits = HabitStore::new();
        self.gamification = GamificationEngine::new();
        self.timer = TimerEngine::new(TimerState::from_config(
            &self.config.timer,
            self.config.notifications_enabled,
        ))
        .with_auto_advance(self.config.auto_advance);
        tracing::info!("all data cleared");
        Ok(vec![Event::DataCleared {
            at: self.clock.now(),
        }])
    }

    // ── Persistence ──────────────────────────────────────────────────

    fn persist_timer(&mut self) -> Result<()> {
        save_snapshot(&mut self.store, TIMER_KEY, self.timer.state())
    }

    fn persist_habits(&mut self) -> Result<()> {
        save_snapshot(&mut self.store, HABITS_KEY, self.habits.habits())
    }

    fn persist_gamification(&mut self) -> Result<()> {
        save_snapshot(&mut self.store, GAMIFICATION_KEY, self.gamification.state())
    }

    fn persist_all(&mut self) -> Result<()> {
        self.persist_gamification()?;
        self.persist_habits()?;
        self.persist_timer()
    }
}
