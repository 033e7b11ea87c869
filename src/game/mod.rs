//! # Game Module
//!
//! Round-level state built on top of a committed map.
//!
//! This module contains everything the rest of the game changes while a round
//! is running:
//! - The hero's position and one-step-per-day movement
//! - Cards placed on map nodes and the rules for where they may go
//! - Node kind changes caused by card effects (ruined villages and dungeons)
//! - The session that regenerates and commits a new map each round

pub mod placement;
pub mod session;
pub mod state;

pub use placement::*;
pub use session::*;
pub use state::*;
