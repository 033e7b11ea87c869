//! # Map Module
//!
//! Procedural generation of the layered path map.
//!
//! A map is a directed acyclic graph whose nodes are arranged in layers
//! (columns). Every link leads from layer `k` to layer `k + 1`, so every path
//! from the start to the castle has the same length. This module holds the
//! graph data model and the generation configuration; the individual stages
//! live in their own submodules.

pub mod decorate;
pub mod edges;
pub mod generator;
pub mod layout;
pub mod validate;

pub use decorate::*;
pub use edges::*;
pub use generator::*;
pub use layout::*;
pub use validate::*;

use crate::{PathError, PathResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Index of a node inside [`MapGraph::nodes`].
///
/// Ids are dense: the node with id `n` is stored at `nodes[n]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Returns the index of this node in the node array.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Gameplay role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The single entry node on layer 0
    Start,
    /// Plain path node
    Empty,
    /// Village; accepts village cards
    Village,
    /// Dungeon; accepts dungeon cards
    Dungeon,
    /// The single goal node on the last layer
    Castle,
    /// Village destroyed by a card effect
    RuinedVillage,
    /// Dungeon destroyed by a card effect
    RuinedDungeon,
}

impl NodeKind {
    /// Whether this kind was assigned by the special-node pass.
    pub fn is_special(self) -> bool {
        matches!(self, NodeKind::Village | NodeKind::Dungeon)
    }

    /// Kind this node turns into when ruined, if it can be ruined.
    pub fn ruined(self) -> Option<NodeKind> {
        match self {
            NodeKind::Village => Some(NodeKind::RuinedVillage),
            NodeKind::Dungeon => Some(NodeKind::RuinedDungeon),
            _ => None,
        }
    }
}

/// A single node of the path map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapNode {
    pub id: NodeId,
    /// Depth from the start node; also selects the column
    pub layer: usize,
    pub x: i32,
    pub y: i32,
    pub kind: NodeKind,
    pub label: String,
}

impl MapNode {
    /// Creates an unlabelled node.
    pub fn new(id: NodeId, layer: usize, x: i32, y: i32, kind: NodeKind) -> Self {
        Self {
            id,
            layer,
            x,
            y,
            kind,
            label: String::new(),
        }
    }

    /// Euclidean distance between the two node centres.
    pub fn distance_to(&self, other: &MapNode) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Directed link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
}

impl Link {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }
}

/// A complete path map as handed to the rest of the game.
///
/// Graphs are never patched after generation; each round produces a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapGraph {
    pub nodes: Vec<MapNode>,
    pub links: Vec<Link>,
    pub start_id: NodeId,
    pub castle_id: NodeId,
}

impl MapGraph {
    /// Assembles a graph from its parts.
    ///
    /// No checks are made here; see [`validate::check_graph`].
    ///
    /// # Examples
    ///
    /// ```
    /// use infernal_path::{Link, MapGraph, MapNode, NodeId, NodeKind};
    ///
    /// let nodes = vec![
    ///     MapNode::new(NodeId(0), 0, 60, 130, NodeKind::Start),
    ///     MapNode::new(NodeId(1), 1, 400, 130, NodeKind::Castle),
    /// ];
    /// let graph = MapGraph::new(nodes, vec![Link::new(NodeId(0), NodeId(1))], NodeId(0), NodeId(1));
    /// assert_eq!(graph.layer_count(), 2);
    /// ```
    pub fn new(nodes: Vec<MapNode>, links: Vec<Link>, start_id: NodeId, castle_id: NodeId) -> Self {
        Self {
            nodes,
            links,
            start_id,
            castle_id,
        }
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&MapNode> {
        self.nodes.get(id.index())
    }

    pub fn start(&self) -> Option<&MapNode> {
        self.node(self.start_id)
    }

    pub fn castle(&self) -> Option<&MapNode> {
        self.node(self.castle_id)
    }

    /// Number of distinct layers, i.e. one past the deepest layer.
    pub fn layer_count(&self) -> usize {
        self.nodes.iter().map(|n| n.layer + 1).max().unwrap_or(0)
    }

    /// Ids of all nodes on `layer`, in node order.
    pub fn layer(&self, layer: usize) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.layer == layer)
            .map(|n| n.id)
            .collect()
    }

    /// Targets of all links leaving `id`, in link order.
    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        self.links
            .iter()
            .filter(|l| l.from == id)
            .map(|l| l.to)
            .collect()
    }

    /// Sources of all links entering `id`, in link order.
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        self.links
            .iter()
            .filter(|l| l.to == id)
            .map(|l| l.from)
            .collect()
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.links.iter().filter(|l| l.from == id).count()
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        self.links.iter().filter(|l| l.to == id).count()
    }

    /// Number of village and dungeon nodes.
    pub fn special_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.kind.is_special()).count()
    }
}

/// Largest absolute value any configured coordinate may take.
pub const MAX_COORDINATE: i32 = 1_000_000;

/// Upper bound on the number of layers of one map, start and castle included.
pub const MAX_LAYERS: usize = 64;

/// Upper bound on the number of nodes in one interior layer.
pub const MAX_NODES_PER_LAYER: usize = 16;

/// Configuration for map generation.
///
/// Every tuning constant of the generator lives here. Missing fields in a
/// JSON config fall back to the defaults of [`MapConfig::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Layer count before round scaling
    pub base_layers: usize,
    /// Upper bound on layers added by round scaling
    pub max_extra_layers: usize,
    /// Width of the drawing area
    pub canvas_width: i32,
    /// Horizontal margin on both sides of the drawing area
    pub margin_x: i32,
    /// Height of the start node
    pub start_y: i32,
    /// Lowest height the castle may be drawn at
    pub castle_y_min: i32,
    /// Highest height the castle may be drawn at
    pub castle_y_max: i32,
    /// Lowest height for interior nodes
    pub min_y: i32,
    /// Highest height for interior nodes
    pub max_y: i32,
    /// Minimum vertical distance between nodes of one column
    pub min_gap: i32,
    /// Minimum number of nodes per interior layer
    pub min_nodes_per_layer: usize,
    /// Maximum number of nodes per interior layer
    pub max_nodes_per_layer: usize,
    /// Rejection-sampling tries per column before spacing evenly
    pub placement_tries: usize,
    /// Maximum number of junction nodes, start included
    pub max_junctions: usize,
    /// Maximum number of links leaving the start node
    pub max_start_branches: usize,
    /// Candidate graphs built before falling back to a chain
    pub attempt_budget: usize,
    /// Maximum number of village/dungeon nodes
    pub special_node_cap: usize,
    /// Chance per interior layer of decorating one node (0.0 to 1.0)
    pub special_node_chance: f64,
}

impl MapConfig {
    /// Creates the default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use infernal_path::MapConfig;
    ///
    /// let config = MapConfig::new();
    /// assert_eq!(config.max_junctions, 3);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self {
            base_layers: 6,
            max_extra_layers: 4,
            canvas_width: 800,
            margin_x: 60,
            start_y: 130,
            castle_y_min: 90,
            castle_y_max: 170,
            min_y: 50,
            max_y: 210,
            min_gap: 26,
            min_nodes_per_layer: 1,
            max_nodes_per_layer: 3,
            placement_tries: 200,
            max_junctions: 3,
            max_start_branches: 2,
            attempt_budget: 40,
            special_node_cap: 3,
            special_node_chance: 0.65,
        }
    }

    /// Creates a configuration for tests: short maps and a small attempt budget.
    pub fn for_testing() -> Self {
        Self {
            base_layers: 3,
            max_extra_layers: 2,
            attempt_budget: 10,
            ..Self::new()
        }
    }

    /// Parses a configuration from JSON text.
    pub fn from_json_str(json: &str) -> PathResult<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> PathResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks that the values can drive generation.
    ///
    /// Coordinates are bounded by [`MAX_COORDINATE`] so layout arithmetic
    /// cannot overflow.
    pub fn validate(&self) -> PathResult<()> {
        if self.base_layers < 2 || self.base_layers > MAX_LAYERS {
            return Err(PathError::InvalidConfig(format!(
                "base_layers ({}) must be within 2..={MAX_LAYERS}",
                self.base_layers
            )));
        }
        if self.max_extra_layers > MAX_LAYERS - self.base_layers {
            return Err(PathError::InvalidConfig(format!(
                "base_layers + max_extra_layers must not exceed {MAX_LAYERS}"
            )));
        }
        for (name, value) in [
            ("canvas_width", self.canvas_width),
            ("margin_x", self.margin_x),
            ("start_y", self.start_y),
            ("castle_y_min", self.castle_y_min),
            ("castle_y_max", self.castle_y_max),
            ("min_y", self.min_y),
            ("max_y", self.max_y),
            ("min_gap", self.min_gap),
        ] {
            if !(-MAX_COORDINATE..=MAX_COORDINATE).contains(&value) {
                return Err(PathError::InvalidConfig(format!(
                    "{name} ({value}) must be within -{MAX_COORDINATE}..={MAX_COORDINATE}"
                )));
            }
        }
        if self.min_y >= self.max_y {
            return Err(PathError::InvalidConfig(format!(
                "min_y ({}) must be below max_y ({})",
                self.min_y, self.max_y
            )));
        }
        if self.castle_y_min > self.castle_y_max {
            return Err(PathError::InvalidConfig(format!(
                "castle_y_min ({}) must not exceed castle_y_max ({})",
                self.castle_y_min, self.castle_y_max
            )));
        }
        if self.min_nodes_per_layer == 0
            || self.min_nodes_per_layer > self.max_nodes_per_layer
            || self.max_nodes_per_layer > MAX_NODES_PER_LAYER
        {
            return Err(PathError::InvalidConfig(format!(
                "nodes per layer must satisfy 1 <= min ({}) <= max ({}) <= {MAX_NODES_PER_LAYER}",
                self.min_nodes_per_layer, self.max_nodes_per_layer
            )));
        }
        if self.min_gap < 0 {
            return Err(PathError::InvalidConfig("min_gap must not be negative".to_string()));
        }
        if self.placement_tries == 0 || self.attempt_budget == 0 {
            return Err(PathError::InvalidConfig(
                "placement_tries and attempt_budget must be positive".to_string(),
            ));
        }
        if self.max_start_branches == 0 || self.max_start_branches > MAX_OUT_DEGREE {
            return Err(PathError::InvalidConfig(format!(
                "max_start_branches ({}) must be within 1..={MAX_OUT_DEGREE}",
                self.max_start_branches
            )));
        }
        if !(0.0..=1.0).contains(&self.special_node_chance) {
            return Err(PathError::InvalidConfig(format!(
                "special_node_chance ({}) must be within 0.0..=1.0",
                self.special_node_chance
            )));
        }
        if self.margin_x < 0 || 2 * self.margin_x >= self.canvas_width {
            return Err(PathError::InvalidConfig(
                "margins leave no usable canvas width".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tiny_graph() -> MapGraph {
        let nodes = vec![
            MapNode::new(NodeId(0), 0, 60, 130, NodeKind::Start),
            MapNode::new(NodeId(1), 1, 400, 80, NodeKind::Empty),
            MapNode::new(NodeId(2), 1, 400, 180, NodeKind::Village),
            MapNode::new(NodeId(3), 2, 740, 130, NodeKind::Castle),
        ];
        let links = vec![
            Link::new(NodeId(0), NodeId(1)),
            Link::new(NodeId(0), NodeId(2)),
            Link::new(NodeId(1), NodeId(3)),
            Link::new(NodeId(2), NodeId(3)),
        ];
        MapGraph::new(nodes, links, NodeId(0), NodeId(3))
    }

    #[test]
    fn test_graph_queries() {
        let graph = tiny_graph();
        assert_eq!(graph.layer_count(), 3);
        assert_eq!(graph.layer(1), vec![NodeId(1), NodeId(2)]);
        assert_eq!(graph.successors(NodeId(0)), vec![NodeId(1), NodeId(2)]);
        assert_eq!(graph.predecessors(NodeId(3)), vec![NodeId(1), NodeId(2)]);
        assert_eq!(graph.out_degree(NodeId(0)), 2);
        assert_eq!(graph.in_degree(NodeId(3)), 2);
        assert_eq!(graph.special_count(), 1);
        assert!(graph.node(NodeId(9)).is_none());
    }

    #[test]
    fn test_node_kind_ruin() {
        assert_eq!(NodeKind::Village.ruined(), Some(NodeKind::RuinedVillage));
        assert_eq!(NodeKind::Dungeon.ruined(), Some(NodeKind::RuinedDungeon));
        assert_eq!(NodeKind::Castle.ruined(), None);
        assert!(!NodeKind::RuinedVillage.is_special());
    }

    #[test]
    fn test_node_kind_serializes_snake_case() {
        let json = serde_json::to_string(&NodeKind::RuinedVillage).unwrap();
        assert_eq!(json, "\"ruined_village\"");
    }

    #[test]
    fn test_config_defaults_are_valid() {
        assert!(MapConfig::new().validate().is_ok());
        assert!(MapConfig::for_testing().validate().is_ok());
        assert_eq!(MapConfig::default(), MapConfig::new());
    }

    #[test]
    fn test_config_rejects_inverted_heights() {
        let config = MapConfig {
            min_y: 200,
            max_y: 100,
            ..MapConfig::new()
        };
        assert!(matches!(config.validate(), Err(PathError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_rejects_huge_margin() {
        let result = MapConfig::from_json_str(r#"{ "margin_x": 2000000000 }"#);
        assert!(matches!(result, Err(PathError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_rejects_out_of_range_heights() {
        let result = MapConfig::from_json_str(r#"{ "min_y": -2000000000, "max_y": 2000000000 }"#);
        assert!(matches!(result, Err(PathError::InvalidConfig(_))));

        let edge = MapConfig {
            min_y: -MAX_COORDINATE,
            max_y: MAX_COORDINATE,
            ..MapConfig::new()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_start_branches_above_two() {
        let config = MapConfig {
            max_start_branches: 3,
            ..MapConfig::new()
        };
        assert!(matches!(config.validate(), Err(PathError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_rejects_oversized_layers() {
        let too_many_layers = MapConfig {
            base_layers: 60,
            max_extra_layers: 10,
            ..MapConfig::new()
        };
        assert!(too_many_layers.validate().is_err());

        let too_wide = MapConfig {
            max_nodes_per_layer: MAX_NODES_PER_LAYER + 1,
            ..MapConfig::new()
        };
        assert!(too_wide.validate().is_err());
    }

    #[test]
    fn test_config_allows_zero_junctions() {
        let config = MapConfig {
            max_junctions: 0,
            ..MapConfig::new()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let config = MapConfig::from_json_str(r#"{ "max_junctions": 5, "min_gap": 30 }"#).unwrap();
        assert_eq!(config.max_junctions, 5);
        assert_eq!(config.min_gap, 30);
        assert_eq!(config.attempt_budget, 40);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "attempt_budget": 7 }}"#).unwrap();

        let config = MapConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.attempt_budget, 7);
    }

    #[test]
    fn test_config_from_missing_file_is_io_error() {
        let result = MapConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(PathError::Io(_))));
    }

    #[test]
    fn test_config_bad_json_is_serde_error() {
        let result = MapConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(PathError::Serde(_))));
    }
}
