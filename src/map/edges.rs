//! # Layer Edge Construction
//!
//! Builds the forward links between two adjacent layers.
//!
//! For a source layer `A` and target layer `B` the builder guarantees that
//! every `A` node gets at least one outgoing link and every `B` node at least
//! one incoming link, while no `A` node exceeds two outgoing links. Giving a
//! node its second outgoing link turns it into a junction and costs one unit
//! of the [`JunctionBudget`] shared by all layer pairs of a candidate map.

use crate::{Link, NodeId};
use log::trace;
use rand::{rngs::StdRng, seq::SliceRandom, Rng};

/// Outgoing-link cap for every node.
pub const MAX_OUT_DEGREE: usize = 2;

/// Remaining number of junctions a candidate map may still create.
///
/// Scoped to one generation attempt; a fresh budget is created per attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JunctionBudget {
    remaining: usize,
}

impl JunctionBudget {
    pub fn new(max_junctions: usize) -> Self {
        Self {
            remaining: max_junctions,
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn can_spend(&self) -> bool {
        self.remaining > 0
    }

    /// Records a new junction. Saturates at zero.
    pub fn spend(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

/// Link construction for one layer pair.
///
/// Degrees are tracked by position inside the two layer slices; links are
/// only translated to [`NodeId`]s once the pair is finished.
#[derive(Debug)]
pub struct EdgeBuilder<'a> {
    sources: &'a [NodeId],
    targets: &'a [NodeId],
    is_start_layer: bool,
    max_start_branches: usize,
    out_degree: Vec<usize>,
    in_degree: Vec<usize>,
    edges: Vec<(usize, usize)>,
}

impl<'a> EdgeBuilder<'a> {
    /// Creates a builder for links from `sources` to `targets`.
    ///
    /// On the start layer the first source is the start node, which may never
    /// end up with more than `max_start_branches` links.
    pub fn new(
        sources: &'a [NodeId],
        targets: &'a [NodeId],
        is_start_layer: bool,
        max_start_branches: usize,
    ) -> Self {
        Self {
            sources,
            targets,
            is_start_layer,
            max_start_branches,
            out_degree: vec![0; sources.len()],
            in_degree: vec![0; targets.len()],
            edges: Vec::new(),
        }
    }

    /// Runs all construction passes and returns the links of this layer pair.
    pub fn build(mut self, budget: &mut JunctionBudget, rng: &mut StdRng) -> Vec<Link> {
        if self.sources.is_empty() || self.targets.is_empty() {
            return Vec::new();
        }

        self.cover_sources(rng);
        self.cover_targets(budget);
        if self.is_start_layer {
            self.cap_start_branches();
        }
        self.repair_dead_ends(rng);

        self.edges
            .iter()
            .map(|&(a, b)| Link::new(self.sources[a], self.targets[b]))
            .collect()
    }

    fn connect(&mut self, a: usize, b: usize) {
        self.edges.push((a, b));
        self.out_degree[a] += 1;
        self.in_degree[b] += 1;
    }

    /// Gives every source one link, dealing targets round-robin in random order.
    fn cover_sources(&mut self, rng: &mut StdRng) {
        let mut order: Vec<usize> = (0..self.targets.len()).collect();
        order.shuffle(rng);

        for a in 0..self.sources.len() {
            let b = order[a % order.len()];
            self.connect(a, b);
        }
    }

    /// Gives every target without an incoming link one.
    ///
    /// Preference order: a source with spare capacity (spending budget if
    /// that makes it a junction), then rewiring a link away from a target that
    /// has other inputs, then forcing a link from the first source.
    fn cover_targets(&mut self, budget: &mut JunctionBudget) {
        for b in 0..self.targets.len() {
            if self.in_degree[b] > 0 {
                continue;
            }

            let spare = self
                .out_degree
                .iter()
                .position(|&d| d < MAX_OUT_DEGREE)
                .filter(|&a| self.out_degree[a] == 0 || budget.can_spend());

            if let Some(a) = spare {
                if self.out_degree[a] == 1 {
                    budget.spend();
                }
                self.connect(a, b);
                continue;
            }

            if self.rewire_into(b) {
                continue;
            }

            self.force_from_first_source(b, budget);
        }
    }

    /// Redirects a link of a saturated source to `b`, provided its current
    /// target keeps another incoming link.
    fn rewire_into(&mut self, b: usize) -> bool {
        let pick = self.edges.iter().position(|&(a, old)| {
            self.out_degree[a] == MAX_OUT_DEGREE && old != b && self.in_degree[old] > 1
        });

        match pick {
            Some(i) => {
                let (a, old) = self.edges[i];
                self.edges[i] = (a, b);
                self.in_degree[old] -= 1;
                self.in_degree[b] += 1;
                trace!(
                    "rewired {} from {} to {}",
                    self.sources[a],
                    self.targets[old],
                    self.targets[b]
                );
                true
            }
            None => false,
        }
    }

    /// Last resort: link `b` from the first source, unless that would push the
    /// start node past its branch cap. The validator rejects anything else this
    /// breaks.
    fn force_from_first_source(&mut self, b: usize, budget: &mut JunctionBudget) {
        if self.is_start_layer && self.out_degree[0] >= self.max_start_branches {
            trace!("start layer saturated; {} left without input", self.targets[b]);
            return;
        }
        if self.out_degree[0] == 1 {
            budget.spend();
        }
        trace!("forced link {} -> {}", self.sources[0], self.targets[b]);
        self.connect(0, b);
    }

    /// Drops start links beyond the cap, newest first, never orphaning a target.
    fn cap_start_branches(&mut self) {
        while self.out_degree[0] > self.max_start_branches {
            let removable = self
                .edges
                .iter()
                .rposition(|&(a, b)| a == 0 && self.in_degree[b] > 1);

            let Some(i) = removable else {
                break;
            };
            let (_, b) = self.edges.remove(i);
            self.out_degree[0] -= 1;
            self.in_degree[b] -= 1;
        }
    }

    fn repair_dead_ends(&mut self, rng: &mut StdRng) {
        for a in 0..self.sources.len() {
            if self.out_degree[a] == 0 {
                let b = rng.gen_range(0..self.targets.len());
                self.connect(a, b);
            }
        }
    }
}

/// Builds the links between two adjacent layers.
///
/// # Examples
///
/// ```
/// use infernal_path::{build_layer_edges, JunctionBudget, NodeId};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(3);
/// let mut budget = JunctionBudget::new(3);
/// let links = build_layer_edges(&[NodeId(0)], &[NodeId(1), NodeId(2)], true, 2, &mut budget, &mut rng);
/// assert_eq!(links.len(), 2);
/// assert_eq!(budget.remaining(), 2);
/// ```
pub fn build_layer_edges(
    sources: &[NodeId],
    targets: &[NodeId],
    is_start_layer: bool,
    max_start_branches: usize,
    budget: &mut JunctionBudget,
    rng: &mut StdRng,
) -> Vec<Link> {
    EdgeBuilder::new(sources, targets, is_start_layer, max_start_branches).build(budget, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn ids(range: std::ops::Range<usize>) -> Vec<NodeId> {
        range.map(NodeId).collect()
    }

    fn degrees(links: &[Link]) -> (HashMap<NodeId, usize>, HashMap<NodeId, usize>) {
        let mut out = HashMap::new();
        let mut inc = HashMap::new();
        for link in links {
            *out.entry(link.from).or_insert(0) += 1;
            *inc.entry(link.to).or_insert(0) += 1;
        }
        (out, inc)
    }

    #[test]
    fn test_budget_saturates() {
        let mut budget = JunctionBudget::new(1);
        assert!(budget.can_spend());
        budget.spend();
        budget.spend();
        assert_eq!(budget.remaining(), 0);
        assert!(!budget.can_spend());
    }

    #[test]
    fn test_single_to_single() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut budget = JunctionBudget::new(3);
        let links = build_layer_edges(&ids(0..1), &ids(1..2), false, 2, &mut budget, &mut rng);

        assert_eq!(links, vec![Link::new(NodeId(0), NodeId(1))]);
        assert_eq!(budget.remaining(), 3);
    }

    #[test]
    fn test_merging_layer_needs_no_budget() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut budget = JunctionBudget::new(0);
        let links = build_layer_edges(&ids(0..3), &ids(3..4), false, 2, &mut budget, &mut rng);

        assert_eq!(links.len(), 3);
        assert!(links.iter().all(|l| l.to == NodeId(3)));
    }

    #[test]
    fn test_every_node_covered_with_budget() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut budget = JunctionBudget::new(3);
            let sources = ids(0..2);
            let targets = ids(2..5);
            let links = build_layer_edges(&sources, &targets, false, 2, &mut budget, &mut rng);
            let (out, inc) = degrees(&links);

            for a in &sources {
                let d = out.get(a).copied().unwrap_or(0);
                assert!((1..=2).contains(&d), "seed {seed}: source {a} has {d} links");
            }
            for b in &targets {
                assert!(inc.get(b).copied().unwrap_or(0) >= 1, "seed {seed}: {b} orphaned");
            }
        }
    }

    #[test]
    fn test_start_layer_never_exceeds_cap() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut budget = JunctionBudget::new(3);
            let links = build_layer_edges(&ids(0..1), &ids(1..4), true, 2, &mut budget, &mut rng);
            let (out, _) = degrees(&links);

            assert_eq!(out.get(&NodeId(0)), Some(&2));
        }
    }

    #[test]
    fn test_exhausted_budget_rewires_instead_of_branching() {
        let sources = ids(0..2);
        let targets = ids(2..5);
        let mut builder = EdgeBuilder::new(&sources, &targets, false, 2);
        builder.connect(0, 0);
        builder.connect(0, 1);
        builder.connect(1, 1);

        let mut budget = JunctionBudget::new(0);
        builder.cover_targets(&mut budget);

        // Source 0 gave up its link to target 1, which is still fed by source 1.
        assert_eq!(builder.in_degree, vec![1, 1, 1]);
        assert_eq!(builder.out_degree, vec![2, 1]);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_spending_budget_on_second_link() {
        let sources = ids(0..1);
        let targets = ids(1..3);
        let mut builder = EdgeBuilder::new(&sources, &targets, false, 2);
        builder.connect(0, 0);

        let mut budget = JunctionBudget::new(2);
        builder.cover_targets(&mut budget);

        assert_eq!(builder.out_degree, vec![2]);
        assert_eq!(budget.remaining(), 1);
    }

    #[test]
    fn test_cap_start_branches_keeps_targets_fed() {
        let sources = ids(0..1);
        let targets = ids(1..4);
        let mut builder = EdgeBuilder::new(&sources, &targets, true, 2);
        builder.connect(0, 0);
        builder.connect(0, 1);
        builder.connect(0, 2);

        builder.cap_start_branches();

        // Every target has a single input, so nothing can be dropped.
        assert_eq!(builder.out_degree[0], 3);
    }

    #[test]
    fn test_empty_layers_yield_no_links() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut budget = JunctionBudget::new(3);
        assert!(build_layer_edges(&[], &ids(0..2), false, 2, &mut budget, &mut rng).is_empty());
        assert!(build_layer_edges(&ids(0..2), &[], false, 2, &mut budget, &mut rng).is_empty());
    }
}
