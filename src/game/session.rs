//! # Game Session
//!
//! Owns the current [`MapState`] and replaces it at the start of every round.

use crate::{
    GenerationOutcome, HeroStep, LayeredMapGenerator, MapConfig, MapState, PathError, PathResult,
};
use log::info;
use rand::{rngs::StdRng, SeedableRng};

/// A running game: the map generator, its random source, and the committed
/// map of the current round.
#[derive(Debug, Clone)]
pub struct GameSession {
    generator: LayeredMapGenerator,
    rng: StdRng,
    round: u32,
    day: u32,
    map: MapState,
    used_fallback: bool,
}

impl GameSession {
    /// Starts a session on round 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use infernal_path::{GameSession, MapConfig};
    ///
    /// let session = GameSession::new(MapConfig::new(), 7).unwrap();
    /// assert_eq!(session.round(), 1);
    /// assert_eq!(session.map().hero_position(), session.map().graph().start_id);
    /// ```
    pub fn new(config: MapConfig, seed: u64) -> PathResult<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Starts a session on round 1 drawing from an existing random source.
    pub fn with_rng(config: MapConfig, mut rng: StdRng) -> PathResult<Self> {
        let generator = LayeredMapGenerator::new(config)?;
        let round = crate::config::FIRST_ROUND;
        let outcome = generator.generate(round, &mut rng);
        let used_fallback = outcome.is_fallback();

        Ok(Self {
            generator,
            rng,
            round,
            day: 0,
            map: MapState::new(outcome.into_graph()),
            used_fallback,
        })
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Days elapsed in the current round.
    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn map(&self) -> &MapState {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapState {
        &mut self.map
    }

    pub fn config(&self) -> &MapConfig {
        self.generator.config()
    }

    /// Whether the current map is the fallback chain.
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// Generates the map for `round` and commits it.
    ///
    /// The previous map, hero position, placed cards and kind changes are
    /// replaced in one assignment once generation has finished.
    pub fn start_round(&mut self, round: u32) -> PathResult<&MapState> {
        if round == 0 {
            return Err(PathError::InvalidState("rounds start at 1".to_string()));
        }

        let outcome = self.generator.generate(round, &mut self.rng);
        self.commit(round, outcome);
        Ok(&self.map)
    }

    /// Starts the round after the current one.
    pub fn next_round(&mut self) -> PathResult<&MapState> {
        let next = self
            .round
            .checked_add(1)
            .ok_or_else(|| PathError::InvalidState("round counter overflow".to_string()))?;
        self.start_round(next)
    }

    fn commit(&mut self, round: u32, outcome: GenerationOutcome) {
        self.used_fallback = outcome.is_fallback();
        self.map = MapState::new(outcome.into_graph());
        self.round = round;
        self.day = 0;
        info!(
            "round {round} committed: {} nodes{}",
            self.map.graph().nodes.len(),
            if self.used_fallback { " (fallback)" } else { "" }
        );
    }

    /// Ends a day: the hero takes one step.
    pub fn advance_day(&mut self) -> HeroStep {
        self.day = self.day.saturating_add(1);
        self.map.advance_hero()
    }
}
