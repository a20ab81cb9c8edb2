//! # PomodoHabit Core Library
//!
//! The state-and-rules engine behind PomodoHabit, a productivity tracker that
//! combines a Pomodoro timer with habit logging and a points/levels layer.
//! Rendering, animation and notification delivery live in the host; the core
//! only mutates state, persists it and reports what happened as [`Event`]s.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a one-second countdown state machine driven by the
//!   caller's `tick()`, alternating work and break sessions
//! - **Habit Store**: habit records and calendar-day streak rules
//! - **Gamification Engine**: points, single-step level-ups and a
//!   substring-deduplicated achievement ledger
//! - **Storage**: a string-keyed JSON snapshot store (SQLite or in-memory)
//!   and TOML configuration
//!
//! ## Key Components
//!
//! - [`Tracker`]: Facade wiring the engines to storage and a clock
//! - [`TimerEngine`]: Core timer state machine
//! - [`HabitStore`]: Habit collection and streak bookkeeping
//! - [`GamificationEngine`]: Points, levels and achievements
//! - [`KeyValueStore`]: Persistence collaborator

pub mod clock;
pub mod error;
pub mod events;
pub mod gamification;
pub mod habits;
pub mod storage;
pub mod timer;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use gamification::{Achievement, AchievementKind, GamificationEngine, GamificationState, Rewards};
pub use habits::{Habit, HabitId, HabitStore};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, TimerConfig};
pub use timer::{SessionKind, TimerEngine, TimerSettings, TimerState, WorkSessionObserver};
pub use tracker::Tracker;
