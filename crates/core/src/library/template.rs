//! Static records describing one primitive: its ports and grid footprint.

use super::kind::{ComponentKind, Width};

/// Signal direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

/// A grid-relative point. Positive x is right, positive y is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Axis-aligned grid bounding box, `min` inclusive, `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }
}

/// One of the four discrete grid rotations, clockwise from the template's
/// default orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

/// A named port on a template: identifier, direction, and a grid-relative
/// position inside the template's bounding box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub id: &'static str,
    pub direction: PortDirection,
    pub position: Point,
}

impl PortSpec {
    pub const fn new(id: &'static str, direction: PortDirection, position: Point) -> Self {
        Self {
            id,
            direction,
            position,
        }
    }
}

/// A static, catalogued primitive: kind, default rotation, ports, bounds.
#[derive(Debug, Clone)]
pub struct ComponentTemplate {
    pub id: String,
    pub kind: ComponentKind,
    pub width: Width,
    pub default_rotation: Rotation,
    pub ports: Vec<PortSpec>,
    pub bounds: BoundingBox,
}

impl ComponentTemplate {
    /// Look up a port by id. Panics-free; returns `None` for unknown ports
    /// so callers can surface `LibraryError::UnknownPort`.
    pub fn port(&self, id: &str) -> Option<&PortSpec> {
        self.ports.iter().find(|p| p.id == id)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &PortSpec> {
        self.ports
            .iter()
            .filter(|p| p.direction == PortDirection::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &PortSpec> {
        self.ports
            .iter()
            .filter(|p| p.direction == PortDirection::Output)
    }
}
