//! The synthesis adapter: `spec.md` §4.3.
//!
//! Lowers a synthesizer-produced module (ports + cells) into the netlist
//! model: module ports become IO components, cells become gate/register/
//! arithmetic/comparison sub-circuits, and bus packing/unpacking goes
//! through [`pack::Pack`]/[`pack::Unpack`].

pub mod bits;
pub mod cells;
pub mod lower;
pub mod optimize;
pub mod pack;
pub mod synth_json;

pub use lower::{lower_module, ChildPort, LoweringContext};
pub use synth_json::{PortDirection, RawBit, SynthCell, SynthDocument, SynthModule, SynthPort};

use thiserror::Error;

use crate::model::{ModelError, NetId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("unknown cell type `{0}`")]
    UnknownCell(String),
    #[error("net `{0}` has conflicting drivers")]
    ConflictingDrivers(NetId),
    #[error("module output port `{0}` has no driver")]
    UndrivenOutput(String),
    #[error("bit width {0} exceeds the 64-bit library maximum")]
    UnsupportedWidth(u32),
    #[error("cell `{cell}` is missing required connection `{port}`")]
    MissingConnection { cell: String, port: String },
    #[error("unknown submodule `{0}` referenced by a custom cell")]
    UnknownSubmodule(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}
