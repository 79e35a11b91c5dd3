//! # gridsynth-core
//!
//! Netlist lowering, placement, routing and binary save encoding for a
//! grid logic sandbox (`spec.md` §1).
//!
//! A synthesizer hands this crate one JSON document per compile: a flat
//! gate/register/arithmetic netlist for the top module, or one such
//! netlist per hierarchy level when a caller injects `(* blackbox *)`
//! attributes to keep submodules from being inlined (`spec.md` §4.7).
//! From there the crate is a straight-line pipeline:
//!
//! 1. [`adapter`] lowers synthesizer JSON into the [`model`] netlist.
//! 2. [`layout`] places components on a grid and routes nets between them.
//! 3. [`wire`] turns each routed edge into a direction+run-length wire.
//! 4. [`save`] serializes the result into the game's binary save format.
//!
//! [`hierarchy`] supplies the structural steps a caller needs to compile
//! a multi-module design bottom-up (module scan, id assignment,
//! dependency ordering, blackbox injection), and [`pipeline`] sequences
//! the four stages above per module and drives the bottom-up loop.

pub mod adapter;
pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod library;
pub mod model;
pub mod pipeline;
pub mod save;
pub mod wire;
pub mod worker;

pub use error::{PipelineError, Result};
pub use pipeline::{compile_module, compile_top, ChildContext, CompiledTree, ModuleArtifacts};
pub use worker::{CancelledError, LoopReporter, NoopMonitor, ProgressMonitor};
