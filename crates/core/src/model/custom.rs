//! Custom-component metadata (`spec.md` §3, §4.7): the bounding box and
//! exported port list a compiled submodule exposes to its parent so the
//! parent can treat the child as one opaque block.

use crate::library::Point;

/// One exported port on a compiled submodule: direction, bit width, and
/// an 8-unit-grid-relative position (already carrying the host's -16
/// origin offset, `spec.md` §9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomPort {
    pub name: String,
    pub is_input: bool,
    pub width: u32,
    pub position: Point,
}

/// A compiled submodule's exported shape: an 8-cell-unit bounding box
/// (`spec.md` §3) and its ordered port list, keyed by module name in the
/// hierarchy driver's child map.
#[derive(Debug, Clone, Default)]
pub struct CustomMetadata {
    pub width_units: i32,
    pub height_units: i32,
    pub ports: Vec<CustomPort>,
}

impl CustomMetadata {
    pub fn port(&self, name: &str) -> Option<&CustomPort> {
        self.ports.iter().find(|p| p.name == name)
    }
}
