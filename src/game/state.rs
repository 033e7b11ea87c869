//! # Map State Module
//!
//! The committed map of the current round together with everything that
//! changes while the round is played.
//!
//! The [`MapGraph`] inside a [`MapState`] is never modified after commit.
//! Hero position, placed cards and node kind changes are kept next to it, so
//! layer, coordinates and topology stay exactly as generated until the next
//! round replaces the whole state.

use crate::{
    can_place, MapGraph, MapNode, NodeId, NodeKind, PathError, PathResult, PlacedCard,
    PlacementClass,
};
use log::debug;
use std::collections::HashMap;

/// Outcome of moving the hero one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroStep {
    /// The hero moved to an interior node
    Moved(NodeId),
    /// The hero moved onto the castle
    ReachedCastle(NodeId),
    /// The hero was already standing on the castle
    AlreadyAtCastle,
    /// The hero's node has no forward link
    Stuck,
}

/// Committed map plus per-round mutable state.
#[derive(Debug, Clone)]
pub struct MapState {
    graph: MapGraph,
    hero_pos: NodeId,
    placed: HashMap<NodeId, Vec<PlacedCard>>,
    kind_overrides: HashMap<NodeId, NodeKind>,
}

impl MapState {
    /// Commits `graph`: hero on the start node, no cards, no kind changes.
    pub fn new(graph: MapGraph) -> Self {
        Self {
            hero_pos: graph.start_id,
            graph,
            placed: HashMap::new(),
            kind_overrides: HashMap::new(),
        }
    }

    pub fn graph(&self) -> &MapGraph {
        &self.graph
    }

    pub fn hero_position(&self) -> NodeId {
        self.hero_pos
    }

    pub fn castle_id(&self) -> NodeId {
        self.graph.castle_id
    }

    pub fn hero_at_castle(&self) -> bool {
        self.hero_pos == self.graph.castle_id
    }

    /// Looks up a node, failing on ids from another map.
    pub fn node(&self, id: NodeId) -> PathResult<&MapNode> {
        self.graph.node(id).ok_or(PathError::UnknownNode(id))
    }

    /// Nodes one layer ahead of `id` that it links to, in link order.
    ///
    /// Unknown ids have no neighbours.
    pub fn forward_neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(here) = self.graph.node(id) else {
            return Vec::new();
        };
        self.graph
            .successors(id)
            .into_iter()
            .filter(|&to| {
                self.graph
                    .node(to)
                    .is_some_and(|n| n.layer == here.layer + 1)
            })
            .collect()
    }

    /// Kind of a node with any card-effect changes applied.
    pub fn effective_kind(&self, id: NodeId) -> PathResult<NodeKind> {
        let node = self.node(id)?;
        Ok(self.kind_overrides.get(&id).copied().unwrap_or(node.kind))
    }

    /// Changes the kind a node shows for the rest of the round.
    pub fn override_kind(&mut self, id: NodeId, kind: NodeKind) -> PathResult<()> {
        self.node(id)?;
        self.kind_overrides.insert(id, kind);
        Ok(())
    }

    /// Ruins a village or dungeon. Returns whether anything changed.
    pub fn ruin(&mut self, id: NodeId) -> PathResult<bool> {
        match self.effective_kind(id)?.ruined() {
            Some(ruined) => {
                debug!("node {id} ruined to {ruined:?}");
                self.kind_overrides.insert(id, ruined);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Cards currently lying on a node.
    pub fn placements(&self, id: NodeId) -> &[PlacedCard] {
        self.placed.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a card of `class` may be placed on `id` right now.
    pub fn can_place(&self, id: NodeId, class: PlacementClass) -> PathResult<bool> {
        let kind = self.effective_kind(id)?;
        Ok(can_place(kind, class, !self.placements(id).is_empty()))
    }

    /// Places a card on a node.
    pub fn place_card(&mut self, id: NodeId, card: PlacedCard) -> PathResult<()> {
        if !self.can_place(id, card.class)? {
            return Err(PathError::InvalidPlacement(format!(
                "{:?} card '{}' cannot be placed on {id} ({:?})",
                card.class,
                card.template_id,
                self.effective_kind(id)?
            )));
        }
        debug!("placed '{}' on {id}", card.template_id);
        self.placed.entry(id).or_default().push(card);
        Ok(())
    }

    /// Moves the hero one layer forward, towards the castle.
    ///
    /// Among the forward neighbours the one closest to the castle (straight
    /// line) is taken; the first one wins ties.
    pub fn advance_hero(&mut self) -> HeroStep {
        if self.hero_at_castle() {
            return HeroStep::AlreadyAtCastle;
        }
        let Some(castle) = self.graph.castle() else {
            return HeroStep::Stuck;
        };

        let mut best: Option<(NodeId, f64)> = None;
        for id in self.forward_neighbors(self.hero_pos) {
            let Some(node) = self.graph.node(id) else {
                continue;
            };
            let distance = node.distance_to(castle);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((id, distance));
            }
        }

        match best {
            Some((next, _)) => {
                self.hero_pos = next;
                if next == self.graph.castle_id {
                    HeroStep::ReachedCastle(next)
                } else {
                    HeroStep::Moved(next)
                }
            }
            None => HeroStep::Stuck,
        }
    }
}
