//! # Graph Validation
//!
//! Structural and reachability checks for a fully assembled map.
//!
//! [`check_graph`] reports the first rule a graph breaks; [`is_valid_graph`]
//! is the boolean form used by the generator. Both are pure: they read the
//! graph and the rules and nothing else.

use crate::{MapConfig, MapGraph, NodeId};
use pathfinding::prelude::bfs_reach;
use std::collections::HashSet;

/// Limits a graph has to respect on top of the fixed structural rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    /// Maximum number of nodes with two or more outgoing links, start included
    pub max_junctions: usize,
    /// Maximum number of links leaving the start node
    pub max_start_branches: usize,
}

impl ValidationRules {
    pub fn new(max_junctions: usize) -> Self {
        Self {
            max_junctions,
            max_start_branches: 2,
        }
    }
}

impl From<&MapConfig> for ValidationRules {
    fn from(config: &MapConfig) -> Self {
        Self {
            max_junctions: config.max_junctions,
            max_start_branches: config.max_start_branches,
        }
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Reason a candidate graph was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphViolation {
    #[error("node {0} does not exist")]
    MissingNode(NodeId),

    #[error("node stored at index {index} carries id {id}")]
    MisplacedNode { index: usize, id: NodeId },

    #[error("link {from} -> {to} does not advance exactly one layer")]
    NonForwardLink { from: NodeId, to: NodeId },

    #[error("start has {out_degree} branches, at most {max} allowed")]
    StartOverBranched { out_degree: usize, max: usize },

    #[error("{count} junctions exceed the maximum of {max}")]
    TooManyJunctions { count: usize, max: usize },

    #[error("node {0} has no incoming link")]
    Orphan(NodeId),

    #[error("node {0} has no outgoing link")]
    DeadEnd(NodeId),

    #[error("node {node} has {out_degree} outgoing links")]
    OverBranched { node: NodeId, out_degree: usize },

    #[error("castle is not reachable from start")]
    CastleUnreachable,

    #[error("node {0} is not on any start-to-castle path")]
    OffPath(NodeId),
}

/// Checks every structural rule, stopping at the first violation.
///
/// Order: link direction, start branching, junction count, per-node degrees,
/// castle reachability, and finally that every node lies on some
/// start-to-castle path.
pub fn check_graph(graph: &MapGraph, rules: &ValidationRules) -> Result<(), GraphViolation> {
    let count = graph.nodes.len();
    for (index, node) in graph.nodes.iter().enumerate() {
        if node.id.index() != index {
            return Err(GraphViolation::MisplacedNode { index, id: node.id });
        }
    }
    let start = graph.start_id;
    let castle = graph.castle_id;
    for id in [start, castle] {
        if id.index() >= count {
            return Err(GraphViolation::MissingNode(id));
        }
    }

    let mut out_degree = vec![0usize; count];
    let mut in_degree = vec![0usize; count];
    let mut forward: Vec<Vec<NodeId>> = vec![Vec::new(); count];
    let mut backward: Vec<Vec<NodeId>> = vec![Vec::new(); count];

    for link in &graph.links {
        let (Some(from), Some(to)) = (graph.node(link.from), graph.node(link.to)) else {
            let missing = if graph.node(link.from).is_none() {
                link.from
            } else {
                link.to
            };
            return Err(GraphViolation::MissingNode(missing));
        };
        if to.layer != from.layer + 1 {
            return Err(GraphViolation::NonForwardLink {
                from: link.from,
                to: link.to,
            });
        }
        out_degree[link.from.index()] += 1;
        in_degree[link.to.index()] += 1;
        forward[link.from.index()].push(link.to);
        backward[link.to.index()].push(link.from);
    }

    if out_degree[start.index()] > rules.max_start_branches {
        return Err(GraphViolation::StartOverBranched {
            out_degree: out_degree[start.index()],
            max: rules.max_start_branches,
        });
    }

    let junctions = out_degree.iter().filter(|&&d| d >= 2).count();
    if junctions > rules.max_junctions {
        return Err(GraphViolation::TooManyJunctions {
            count: junctions,
            max: rules.max_junctions,
        });
    }

    for node in &graph.nodes {
        let i = node.id.index();
        if node.id != start && in_degree[i] == 0 {
            return Err(GraphViolation::Orphan(node.id));
        }
        if node.id != castle && out_degree[i] == 0 {
            return Err(GraphViolation::DeadEnd(node.id));
        }
        if out_degree[i] > 2 {
            return Err(GraphViolation::OverBranched {
                node: node.id,
                out_degree: out_degree[i],
            });
        }
    }

    let reach_from_start: HashSet<NodeId> =
        bfs_reach(start, |n| forward[n.index()].iter().copied()).collect();
    if !reach_from_start.contains(&castle) {
        return Err(GraphViolation::CastleUnreachable);
    }

    let reaches_castle: HashSet<NodeId> =
        bfs_reach(castle, |n| backward[n.index()].iter().copied()).collect();
    for node in &graph.nodes {
        if !reach_from_start.contains(&node.id) || !reaches_castle.contains(&node.id) {
            return Err(GraphViolation::OffPath(node.id));
        }
    }

    Ok(())
}

/// Boolean form of [`check_graph`].
///
/// # Examples
///
/// ```
/// use infernal_path::{is_valid_graph, Link, MapGraph, MapNode, NodeId, NodeKind, ValidationRules};
///
/// let nodes = vec![
///     MapNode::new(NodeId(0), 0, 60, 130, NodeKind::Start),
///     MapNode::new(NodeId(1), 1, 400, 130, NodeKind::Empty),
///     MapNode::new(NodeId(2), 2, 740, 130, NodeKind::Castle),
/// ];
/// let links = vec![Link::new(NodeId(0), NodeId(1)), Link::new(NodeId(1), NodeId(2))];
/// let graph = MapGraph::new(nodes, links, NodeId(0), NodeId(2));
/// assert!(is_valid_graph(&graph, &ValidationRules::default()));
/// ```
pub fn is_valid_graph(graph: &MapGraph, rules: &ValidationRules) -> bool {
    check_graph(graph, rules).is_ok()
}
