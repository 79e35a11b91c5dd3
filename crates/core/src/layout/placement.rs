//! Placed layout: the result of the oracle call plus the bridge passes
//! (`spec.md` §3 "placed layout").

use crate::library::Point;
use crate::model::{ComponentId, PortRef};

/// A component's placed top-left grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub component: ComponentId,
    pub position: Point,
}

/// One routed edge: the source and sink ports it connects, and its bend
/// points. An empty `points` list marks a compact-mode teleport wire (no
/// routed polyline, see `spec.md` §4.4/§4.5).
#[derive(Debug, Clone)]
pub struct RoutedEdge {
    pub source: PortRef,
    pub sink: PortRef,
    pub points: Vec<Point>,
}

impl RoutedEdge {
    pub fn is_teleport(&self) -> bool {
        self.points.is_empty()
    }
}

/// The oracle's raw output plus whatever bridge passes have run so far.
#[derive(Debug, Clone, Default)]
pub struct PlacedLayout {
    pub placements: Vec<Placement>,
    pub edges: Vec<RoutedEdge>,
    pub compact: bool,
}

impl PlacedLayout {
    pub fn placement(&self, id: ComponentId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.component == id)
    }

    pub fn placement_mut(&mut self, id: ComponentId) -> Option<&mut Placement> {
        self.placements.iter_mut().find(|p| p.component == id)
    }
}
