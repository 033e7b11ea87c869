//! # Card Placement
//!
//! Which map nodes accept which kind of card.

use crate::NodeKind;
use serde::{Deserialize, Serialize};

/// Placement behaviour of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementClass {
    /// Trap for any path node except villages, dungeons and the castle
    Trap,
    /// Trap restricted to plain path nodes
    StrictTrap,
    /// Card that only fits on a village
    Village,
    /// Card that only fits on a dungeon
    Dungeon,
    /// Passive card; never placed on the map
    Passive,
}

/// A card lying on a map node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedCard {
    pub template_id: String,
    pub level: u32,
    pub class: PlacementClass,
}

impl PlacedCard {
    pub fn new(template_id: impl Into<String>, level: u32, class: PlacementClass) -> Self {
        Self {
            template_id: template_id.into(),
            level,
            class,
        }
    }
}

/// Whether a card of `class` may go on a node of `kind`.
///
/// `occupied` tells whether the node already holds at least one card;
/// villages and dungeons take a single card of any class.
///
/// # Examples
///
/// ```
/// use infernal_path::{can_place, NodeKind, PlacementClass};
///
/// assert!(can_place(NodeKind::Start, PlacementClass::Trap, false));
/// assert!(!can_place(NodeKind::Castle, PlacementClass::Trap, false));
/// assert!(can_place(NodeKind::Village, PlacementClass::Village, false));
/// assert!(!can_place(NodeKind::Village, PlacementClass::Village, true));
/// ```
pub fn can_place(kind: NodeKind, class: PlacementClass, occupied: bool) -> bool {
    if occupied && kind.is_special() {
        return false;
    }

    match class {
        PlacementClass::Passive => false,
        PlacementClass::Trap => !matches!(
            kind,
            NodeKind::Castle | NodeKind::Village | NodeKind::Dungeon
        ),
        PlacementClass::StrictTrap => kind == NodeKind::Empty,
        PlacementClass::Village => kind == NodeKind::Village,
        PlacementClass::Dungeon => kind == NodeKind::Dungeon,
    }
}
