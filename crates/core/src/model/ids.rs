//! Identifier newtypes for the netlist graph.
//!
//! Nets are keyed by string ids derived from the synthesizer's bit
//! numbering (or freshly minted for constants and internal wires);
//! components are keyed by an opaque, insertion-order-independent id.
//! Neither type carries a pointer — every cross-reference in the model is
//! indirected through these ids and resolved via `Netlist`'s maps, per the
//! "bit references as first-class identities" design note in `spec.md` §9.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a net (a bit-identified wire with one driver, many sinks).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetId(pub String);

impl NetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier for a component instance. Assigned sequentially by the
/// adapter as components are instantiated; component insertion order
/// (not this numeric value) is what determines permanent-id assignment
/// in the binary output (`spec.md` §5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u32);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// A reference to one port on one component instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub component: ComponentId,
    pub port: String,
}

impl PortRef {
    pub fn new(component: ComponentId, port: impl Into<String>) -> Self {
        Self {
            component,
            port: port.into(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.port)
    }
}
