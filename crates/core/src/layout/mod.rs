//! The layout bridge: `spec.md` §4.4.
//!
//! Builds a layered-graph [`request::LayoutRequest`] from a netlist, hands
//! it to a [`oracle::LayoutOracle`], then runs IO alignment, optional
//! compact packing, and centering over the result.

pub mod bridge;
pub mod oracle;
pub mod placement;
pub mod request;

pub use bridge::{center, compact_pack, io_alignment, run, CompileOptions};
pub use oracle::{LayoutOracle, SugiyamaOracle};
pub use placement::{PlacedLayout, Placement, RoutedEdge};
pub use request::{build_request, LayoutEdge, LayoutNode, LayoutRequest};

use thiserror::Error;

use crate::model::ComponentId;
use crate::worker::CancelledError;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout oracle returned no placement for component `{0}`")]
    MissingPlacement(ComponentId),
    #[error("unknown port `{port}` on component `{component}`")]
    MissingPort { component: ComponentId, port: String },
    #[error("layout cancelled")]
    Cancelled,
}

impl From<CancelledError> for LayoutError {
    fn from(_: CancelledError) -> Self {
        LayoutError::Cancelled
    }
}
