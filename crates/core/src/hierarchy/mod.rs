//! The hierarchy driver: `spec.md` §4.7.
//!
//! Scans a source file for module declarations, assigns every submodule a
//! stable id, orders them bottom-up by textual containment, and exposes
//! the blackbox-injection pass a host runs before invoking its
//! synthesizer on the top module. The bottom-up compile loop itself lives
//! in [`crate::pipeline`], which calls back into this module only for the
//! structural steps (scan, id assignment, ordering, metadata extraction).

pub mod driver;
pub mod ids;
pub mod metadata;
pub mod scan;

pub use driver::{build_plan, inject_blackbox_attributes, CompilePlan};
pub use ids::assign_id;
pub use metadata::{extract_child_info, extract_custom_metadata};
pub use scan::{scan_modules, ModuleSource};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("top module `{0}` not found in source")]
    UnknownTopModule(String),
    #[error("cyclic module dependency through `{0}`")]
    CyclicDependency(String),
}
