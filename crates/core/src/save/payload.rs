//! In-memory payload model mirroring the binary format field-for-field
//! (`spec.md` §4.6): built by [`super::build::build_payload`], consumed by
//! [`super::writer::write_payload`].

use crate::wire::WireRecord;

/// Header fields a caller may override; everything else defaults to the
/// empty/zero value the format expects for a freshly-compiled module.
#[derive(Debug, Clone, Default)]
pub struct HeaderInfo {
    pub save_id: u64,
    pub hub_id: u32,
    pub delay: u64,
    pub menu_visible: bool,
    pub clock_speed: u32,
    pub dependency_ids: Vec<u64>,
    pub description: String,
    pub camera: (i16, i16),
    pub sync_status: u8,
    pub campaign_bound: bool,
    pub player_data: Vec<u8>,
    pub hub_description: String,
}

/// The payload header, gate count filled in from the compiled netlist.
#[derive(Debug, Clone)]
pub struct SaveHeader {
    pub save_id: u64,
    pub hub_id: u32,
    pub gate_count: u64,
    pub delay: u64,
    pub menu_visible: bool,
    pub clock_speed: u32,
    pub dependency_ids: Vec<u64>,
    pub description: String,
    pub camera: (i16, i16),
    pub sync_status: u8,
    pub campaign_bound: bool,
    pub player_data: Vec<u8>,
    pub hub_description: String,
}

/// A `Custom` instance's extra tail (`spec.md` §4.6).
#[derive(Debug, Clone)]
pub struct CustomTail {
    pub custom_id: u64,
    pub displacement: (i32, i32),
}

/// A selected-program tail entry. No catalog kind ever sets
/// [`crate::library::ComponentKind::is_program`], so this branch never
/// fires in practice; kept so the writer has a place to encode it if the
/// catalogue grows a program kind.
#[derive(Debug, Clone)]
pub struct ProgramEntry {
    pub program_id: u64,
    pub name: String,
}

/// One serialized component record (`spec.md` §4.6, §4.6 "Component
/// coordinate origin").
#[derive(Debug, Clone)]
pub struct ComponentRecord {
    pub kind: u16,
    pub position: (i32, i32),
    pub rotation: u8,
    pub permanent_id: u64,
    pub label: String,
    pub setting1: i64,
    pub setting2: i64,
    pub ui_order: i16,
    pub custom: Option<CustomTail>,
    pub programs: Vec<ProgramEntry>,
}

/// The full in-memory payload, ready for [`super::writer::write_payload`].
#[derive(Debug, Clone)]
pub struct SavePayload {
    pub header: SaveHeader,
    pub components: Vec<ComponentRecord>,
    pub wires: Vec<WireRecord>,
}
