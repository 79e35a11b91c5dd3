//! Nets: a signal shared by at most one driver and any number of sinks.

use serde::{Deserialize, Serialize};

use super::ids::PortRef;

/// A net: one optional source (the driver) and zero or more sinks.
///
/// A net without a source is allowed only transiently during lowering; by
/// the time the adapter hands the netlist to the layout bridge it must
/// either have been repaired (a constant driver attached) or deleted by
/// the cleanup pass (`spec.md` §3, §4.3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Net {
    pub source: Option<PortRef>,
    pub sinks: Vec<PortRef>,
}

impl Net {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_dangling(&self) -> bool {
        self.sinks.is_empty()
    }
}
