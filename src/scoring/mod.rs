pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod normalize;
pub mod validation;

pub use aggregate::{aggregate, Aggregate, Contribution};
pub use classify::{map_label, Category};
pub use config::*;
pub use engine::{apply_score, calculate_score, ScoreResult};
pub use normalize::NEUTRAL_SCORE;
pub use validation::validate_scoring;
