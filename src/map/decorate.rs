//! # Special Nodes
//!
//! Marks a few interior nodes of an accepted map as villages or dungeons.

use crate::{MapConfig, MapGraph, NodeKind};
use rand::{rngs::StdRng, seq::SliceRandom, Rng};

/// Decorates interior layers of `graph` and returns how many nodes were marked.
///
/// Each interior layer gets one roll at `special_node_chance`; a hit turns
/// one plain node of that layer into a village or dungeon (even odds). Stops
/// once `special_node_cap` special nodes exist. Nodes that already carry a
/// kind other than [`NodeKind::Empty`] are never touched.
pub fn assign_special_nodes(graph: &mut MapGraph, config: &MapConfig, rng: &mut StdRng) -> usize {
    let layer_count = graph.layer_count();
    let mut specials = graph.special_count();
    let mut assigned = 0;

    for layer in 1..layer_count.saturating_sub(1) {
        if specials >= config.special_node_cap {
            break;
        }
        if !rng.gen_bool(config.special_node_chance) {
            continue;
        }

        let candidates: Vec<usize> = graph
            .nodes
            .iter()
            .filter(|n| n.layer == layer && n.kind == NodeKind::Empty)
            .map(|n| n.id.index())
            .collect();
        let Some(&index) = candidates.choose(rng) else {
            continue;
        };

        graph.nodes[index].kind = if rng.gen_bool(0.5) {
            NodeKind::Village
        } else {
            NodeKind::Dungeon
        };
        specials += 1;
        assigned += 1;
    }

    assigned
}
