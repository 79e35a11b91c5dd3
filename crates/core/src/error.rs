//! Unified error type for the gridsynth-core crate.
//!
//! All public-facing errors are collected here so callers can match on a
//! single enum (`spec.md` §7: every error kind is fatal at the top
//! level, so one aggregate type is all a caller ever needs).

use thiserror::Error;

use crate::adapter::AdapterError;
use crate::hierarchy::HierarchyError;
use crate::layout::LayoutError;
use crate::save::SaveError;
use crate::wire::WireError;
use crate::worker::CancelledError;

/// Top-level error type for the gridsynth-core crate.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An I/O error reading the source file or writing the output tree.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Synthesizer JSON failed to parse into the input contract
    /// (`spec.md` §6).
    #[error("synthesizer JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed input: unknown cell type, unsupported width, conflicting
    /// drivers, missing connection, unknown submodule.
    #[error("netlist lowering error: {0}")]
    Adapter(#[from] AdapterError),

    /// Internal invariant violation: the oracle returned no placement for
    /// a listed component, or a port lookup failed.
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Port-position lookup failure while encoding a routed wire.
    #[error("wire encoding error: {0}")]
    Wire(#[from] WireError),

    /// Encoding overflow: an oversized string, or a value outside its
    /// allocated byte width.
    #[error("save writer error: {0}")]
    Save(#[from] SaveError),

    /// Module scan, id assignment, or dependency-ordering failure.
    #[error("hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),

    /// A name in the compile plan has no corresponding entry in the
    /// synthesizer's output document.
    #[error("module `{0}` not found in synthesizer output")]
    ModuleNotFound(String),

    /// An operation was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled(#[from] CancelledError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
