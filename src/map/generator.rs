//! # Map Generator
//!
//! Retry-until-valid generation of a round's map.
//!
//! Each attempt lays out fresh columns, builds links layer pair by layer pair
//! under a fresh junction budget, and runs the validator. The first accepted
//! candidate is decorated with special nodes and returned. If the attempt
//! budget runs out, a straight chain with one node per layer is returned
//! instead; it satisfies every rule by construction.

use crate::{
    assign_special_nodes, build_layer_edges, check_graph, JunctionBudget, LayoutPlanner, Link,
    MapConfig, MapGraph, MapNode, NodeId, NodeKind, PathResult, ValidationRules,
};
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;

/// Result of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// A random candidate passed validation
    Valid { graph: MapGraph, attempts: usize },
    /// Every attempt failed; the graph is the straight fallback chain
    Fallback(MapGraph),
}

impl GenerationOutcome {
    pub fn graph(&self) -> &MapGraph {
        match self {
            GenerationOutcome::Valid { graph, .. } => graph,
            GenerationOutcome::Fallback(graph) => graph,
        }
    }

    pub fn into_graph(self) -> MapGraph {
        match self {
            GenerationOutcome::Valid { graph, .. } => graph,
            GenerationOutcome::Fallback(graph) => graph,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, GenerationOutcome::Fallback(_))
    }

    /// Attempts spent before a candidate was accepted.
    pub fn attempts(&self) -> Option<usize> {
        match self {
            GenerationOutcome::Valid { attempts, .. } => Some(*attempts),
            GenerationOutcome::Fallback(_) => None,
        }
    }
}

/// Number of layers for `round`: the base count plus one per round, capped.
///
/// # Examples
///
/// ```
/// use infernal_path::{layer_count_for_round, MapConfig};
///
/// let config = MapConfig::new();
/// assert_eq!(layer_count_for_round(1, &config), 7);
/// assert_eq!(layer_count_for_round(12, &config), 10);
/// ```
pub fn layer_count_for_round(round: u32, config: &MapConfig) -> usize {
    let extra = usize::try_from(round).unwrap_or(usize::MAX);
    config.base_layers + extra.min(config.max_extra_layers)
}

/// Builds the straight start-to-castle chain used when generation gives up.
///
/// One node per entry of `column_xs`, all at height `y`.
pub fn fallback_chain(column_xs: &[i32], y: i32) -> MapGraph {
    let last = column_xs.len().saturating_sub(1);
    let nodes: Vec<MapNode> = column_xs
        .iter()
        .enumerate()
        .map(|(layer, &x)| {
            let kind = if layer == 0 {
                NodeKind::Start
            } else if layer == last {
                NodeKind::Castle
            } else {
                NodeKind::Empty
            };
            labelled_node(NodeId(layer), layer, x, y, kind)
        })
        .collect();
    let links = (1..nodes.len())
        .map(|i| Link::new(NodeId(i - 1), NodeId(i)))
        .collect();

    MapGraph::new(nodes, links, NodeId(0), NodeId(last))
}

fn labelled_node(id: NodeId, layer: usize, x: i32, y: i32, kind: NodeKind) -> MapNode {
    let mut node = MapNode::new(id, layer, x, y, kind);
    node.label = match kind {
        NodeKind::Start => "Start".to_string(),
        NodeKind::Castle => "Castle".to_string(),
        _ => String::new(),
    };
    node
}

/// Generates layered path maps under a fixed configuration.
#[derive(Debug, Clone)]
pub struct LayeredMapGenerator {
    config: MapConfig,
}

impl LayeredMapGenerator {
    /// Creates a generator after checking `config`.
    pub fn new(config: MapConfig) -> PathResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn layer_count(&self, round: u32) -> usize {
        layer_count_for_round(round, &self.config)
    }

    /// Generates the map for `round`.
    ///
    /// Never fails: if no candidate validates within the attempt budget the
    /// fallback chain is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use infernal_path::{is_valid_graph, LayeredMapGenerator, MapConfig, ValidationRules};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let config = MapConfig::new();
    /// let generator = LayeredMapGenerator::new(config.clone()).unwrap();
    /// let mut rng = StdRng::seed_from_u64(42);
    ///
    /// let outcome = generator.generate(1, &mut rng);
    /// assert_eq!(outcome.graph().layer_count(), 7);
    /// assert!(is_valid_graph(outcome.graph(), &ValidationRules::from(&config)));
    /// ```
    pub fn generate(&self, round: u32, rng: &mut StdRng) -> GenerationOutcome {
        let layer_count = self.layer_count(round);
        let rules = ValidationRules::from(&self.config);

        for attempt in 1..=self.config.attempt_budget {
            let mut graph = self.build_candidate(layer_count, rng);
            match check_graph(&graph, &rules) {
                Ok(()) => {
                    let specials = assign_special_nodes(&mut graph, &self.config, rng);
                    info!(
                        "round {round}: map with {layer_count} layers, {} nodes, {} links, \
                         {specials} special nodes after {attempt} attempt(s)",
                        graph.nodes.len(),
                        graph.links.len()
                    );
                    return GenerationOutcome::Valid {
                        graph,
                        attempts: attempt,
                    };
                }
                Err(violation) => {
                    debug!("round {round}, attempt {attempt}: candidate rejected: {violation}");
                }
            }
        }

        warn!(
            "round {round}: no valid map after {} attempts, using fallback chain",
            self.config.attempt_budget
        );
        GenerationOutcome::Fallback(self.fallback(layer_count))
    }

    /// Builds one unvalidated candidate with `layer_count` layers.
    pub fn build_candidate(&self, layer_count: usize, rng: &mut StdRng) -> MapGraph {
        let columns = LayoutPlanner::new(&self.config).plan(layer_count, rng);
        let last = layer_count.saturating_sub(1);

        let mut nodes = Vec::new();
        let mut layers: Vec<Vec<NodeId>> = Vec::with_capacity(columns.len());
        for column in &columns {
            let kind = if column.layer == 0 {
                NodeKind::Start
            } else if column.layer == last {
                NodeKind::Castle
            } else {
                NodeKind::Empty
            };
            let mut ids = Vec::with_capacity(column.ys.len());
            for &y in &column.ys {
                let id = NodeId(nodes.len());
                nodes.push(labelled_node(id, column.layer, column.x, y, kind));
                ids.push(id);
            }
            layers.push(ids);
        }

        let (links, budget) = self.link_layers(&layers, rng);
        trace!("candidate linked with {} junction(s) to spare", budget.remaining());

        let start_id = layers.first().and_then(|l| l.first()).copied().unwrap_or(NodeId(0));
        let castle_id = layers.last().and_then(|l| l.first()).copied().unwrap_or(NodeId(0));
        MapGraph::new(nodes, links, start_id, castle_id)
    }

    /// Links every pair of consecutive layers, the first layer holding the
    /// start node.
    ///
    /// Each call draws on a full junction budget; the budget left over is
    /// returned with the links.
    pub fn link_layers(
        &self,
        layers: &[Vec<NodeId>],
        rng: &mut StdRng,
    ) -> (Vec<Link>, JunctionBudget) {
        let mut budget = JunctionBudget::new(self.config.max_junctions);
        let mut links = Vec::new();
        for (k, pair) in layers.windows(2).enumerate() {
            links.extend(build_layer_edges(
                &pair[0],
                &pair[1],
                k == 0,
                self.config.max_start_branches,
                &mut budget,
                rng,
            ));
        }
        (links, budget)
    }

    /// The fallback chain for `layer_count` layers.
    pub fn fallback(&self, layer_count: usize) -> MapGraph {
        let xs = LayoutPlanner::new(&self.config).column_xs(layer_count);
        fallback_chain(&xs, self.config.start_y)
    }
}

impl Default for LayeredMapGenerator {
    fn default() -> Self {
        Self {
            config: MapConfig::default(),
        }
    }
}
