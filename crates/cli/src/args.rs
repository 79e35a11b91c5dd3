//! CLI argument definitions (`spec.md` §6).
//!
//! A single compile operation, so unlike a multi-command tool there is no
//! `Commands` enum here — just the one argument set `main.rs` parses.

use std::path::PathBuf;

use clap::Parser;

/// Compile a synthesizer JSON document into a placed-and-routed grid
/// logic save file.
#[derive(Parser, Debug)]
#[command(name = "gridsynth", version, about, long_about = None)]
pub struct Cli {
    /// Source file to scan for module declarations and feed to the
    /// synthesizer.
    pub input: PathBuf,

    /// Directory to write `circuit.data` (and `dependencies/<name>/circuit.data`
    /// for every submodule) into.
    pub output_directory: PathBuf,

    /// Top module name.
    #[arg(long)]
    pub top: String,

    /// Enable compact column packing and teleport wires.
    #[arg(long)]
    pub compact: bool,

    /// Disable the synthesizer's hierarchy-flattening pass (submodules
    /// are preserved by attribute injection regardless).
    #[arg(long)]
    pub no_flatten: bool,

    /// Suppress non-error output.
    #[arg(long, global = true)]
    pub quiet: bool,
}
