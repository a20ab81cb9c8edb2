mod engine;
mod state;

pub use engine::{TimerEngine, WorkSessionObserver};
pub use state::{SessionKind, TimerSettings, TimerState};
