mod habit;
mod store;

pub use habit::{Habit, HabitId};
pub use store::{HabitStore, STREAK_MILESTONES};
