//! The in-memory netlist: component instances carrying metadata, plus
//! nets keyed by bit identifier with one driver and many sinks
//! (`spec.md` §3, §4.2).

pub mod component;
pub mod custom;
pub mod ids;
pub mod net;
pub mod netlist;

pub use component::{ComponentInstance, InstanceMetadata, ModulePortDescriptor};
pub use custom::{CustomMetadata, CustomPort};
pub use ids::{ComponentId, NetId, PortRef};
pub use net::Net;
pub use netlist::{ModelError, Netlist};
