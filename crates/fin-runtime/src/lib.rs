#![deny(warnings)]

//! Game runtime for Finopoly: board construction, fixed catalogs, the
//! turn/round engine, end-game scoring, and the single-session quick-play
//! variant.
//!
//! The engine is UI-agnostic: every player decision enters as a method
//! argument and every effect comes back as an outcome value, so a console
//! front end and the test suite drive it the same way.

pub mod board;
pub mod catalog;
pub mod engine;
pub mod quick;

pub use engine::{GameConfig, GameState};
