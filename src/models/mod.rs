//! Core data models for the league.

mod game;
mod ids;
mod player;
mod stats;
mod validation;

pub use game::*;
pub use ids::*;
pub use player::*;
pub use stats::*;
pub use validation::*;
