//! # Infernal Path
//!
//! Map core of a card-driven "dungeon keeper" game: the player lays traps and
//! events on a path that an AI hero walks one step per day.
//!
//! ## Architecture Overview
//!
//! Each round the path is rebuilt from scratch as a layered, forward-only graph
//! running from a single start node to a single castle node:
//!
//! - **Layout**: one column per layer, non-overlapping node heights per column
//! - **Edges**: built one layer pair at a time under a shared junction budget
//! - **Validation**: a pure predicate over the assembled graph
//! - **Generation**: retries until a candidate validates, otherwise falls back
//!   to a straight chain
//! - **Decoration**: a few interior nodes become villages or dungeons
//!
//! The committed graph is handed to the game layer as a [`MapState`], which
//! owns everything that may change during a round (hero position, placed
//! cards, ruined nodes) without touching the graph itself.

pub mod game;
pub mod map;

pub use game::*;
pub use map::*;

pub use game::{GameSession, HeroStep, MapState, PlacedCard, PlacementClass};
pub use map::{
    GenerationOutcome, GraphViolation, LayeredMapGenerator, Link, MapConfig, MapGraph, MapNode,
    NodeId, NodeKind,
};

/// Core error type for the Infernal Path map core.
#[derive(thiserror::Error, Debug)]
pub enum PathError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A node id does not exist in the current map
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// A card cannot be placed on the requested node
    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Infernal Path codebase.
pub type PathResult<T> = Result<T, PathError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game-level constants that are not part of map generation tuning.
pub mod config {
    /// Default RNG seed used by the command line when none is given
    pub const DEFAULT_SEED: u64 = 12345;

    /// Number of days the hero walks per round in the command line simulation
    pub const DEFAULT_DAYS_PER_ROUND: u32 = 10;

    /// Round number the game starts on
    pub const FIRST_ROUND: u32 = 1;
}
