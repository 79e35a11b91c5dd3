//! The wire routing encoder: `spec.md` §4.5.
//!
//! Computes exact port coordinates from placed components and encodes
//! orthogonal polylines as direction+length run tokens; classifies each
//! wire's width to a discrete wire kind.

pub mod encode;
pub mod width;

pub use encode::{
    build_wire_records, decode_runs, densify, encode_runs, port_point, Direction, WireRecord,
    TELEPORT_MARKER, TERMINATOR,
};
pub use width::{classify_width, WireKind};

use thiserror::Error;

use crate::model::ComponentId;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("component `{0}` has no placement")]
    MissingComponent(ComponentId),
    #[error("unknown port `{port}` on component `{component}`")]
    UnknownPort { component: ComponentId, port: String },
}
