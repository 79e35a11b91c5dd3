//! Component instances: a concrete occurrence of a library template.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::library::ComponentKind;

use super::ids::{ComponentId, NetId};

/// Which module port (if any) this instance represents, for IO-alignment
/// and save-header bookkeeping. Populated only on `Input*`/`Output*`
/// instances created directly from a module port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePortDescriptor {
    pub name: String,
    pub is_input: bool,
    pub bit_index: Option<u32>,
}

/// Optional per-instance metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceMetadata {
    pub label: Option<String>,
    pub module_port: Option<ModulePortDescriptor>,
    /// Constant value / configured setting carried by this instance
    /// (e.g. the concatenated bit pattern of a per-width constant).
    pub setting: i64,
    /// The stable 63-bit id of the submodule this `Custom` instance
    /// hierarchically instantiates. Only set when `kind == Custom`.
    pub custom_id: Option<u64>,
    /// Per-port bit-width overrides, keyed by port id. Used on chunked
    /// maker/splitter instances (width >= 16) whose chunk pins carry 8
    /// bits rather than the library's blanket per-kind default, and on
    /// `Custom` instances whose port widths come from child metadata.
    pub port_width_overrides: HashMap<String, u32>,
    /// Stable order used for the save format's "ui-order" field.
    pub ui_order: i16,
}

/// A concrete occurrence of a [`ComponentTemplate`](crate::library::ComponentTemplate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentInstance {
    pub id: ComponentId,
    pub kind: ComponentKind,
    /// Port id -> net id. Only ports the adapter actually wired appear here.
    pub connections: HashMap<String, NetId>,
    pub metadata: InstanceMetadata,
}

impl ComponentInstance {
    pub fn new(id: ComponentId, kind: ComponentKind) -> Self {
        Self {
            id,
            kind,
            connections: HashMap::new(),
            metadata: InstanceMetadata::default(),
        }
    }

    pub fn net_of(&self, port: &str) -> Option<&NetId> {
        self.connections.get(port)
    }

    pub fn port_width_override(&self, port: &str) -> Option<u32> {
        self.metadata.port_width_overrides.get(port).copied()
    }
}
