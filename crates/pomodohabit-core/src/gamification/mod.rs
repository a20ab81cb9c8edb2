mod achievement;
mod engine;

pub use achievement::{Achievement, AchievementKind};
pub use engine::{
    GamificationEngine, GamificationState, Rewards, POINT_MILESTONES, WELCOME_TEXT,
};
