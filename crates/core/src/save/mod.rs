//! The binary save writer: `spec.md` §4.6.
//!
//! Encodes a compiled module's header, component records, and wire
//! records into the host's little-endian payload layout, then wraps the
//! result in a versioned, Snappy-compressed container.

pub mod build;
pub mod container;
pub mod payload;
pub mod writer;

pub use build::build_payload;
pub use container::{compress, decompress, FORMAT_VERSION};
pub use payload::{ComponentRecord, CustomTail, HeaderInfo, ProgramEntry, SaveHeader, SavePayload};
pub use writer::write_payload;

use thiserror::Error;

use crate::model::ComponentId;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("string of {0} bytes exceeds the 65535-byte length-prefix limit")]
    StringTooLong(usize),
    #[error("signed value {0} does not fit in {1} bytes")]
    SignedOverflow(i64, u8),
    #[error("unsigned value {0} does not fit in {1} bytes")]
    UnsignedOverflow(u64, u8),
    #[error("component `{0}` has no placement or custom metadata")]
    MissingComponent(ComponentId),
    #[error("snappy codec failure: {0}")]
    Compression(String),
}
