//! gridsynth CLI
//!
//! Thin shell over `gridsynth-core` (`spec.md` §6): scans a source file
//! for module declarations, synthesizes each module bottom-up through an
//! external synthesizer, compiles the result through the core pipeline,
//! and writes the binary save container tree.
//!
//! ```text
//! gridsynth <input> <output-directory> --top <name> [--compact] [--no-flatten]
//! ```

mod args;
mod synth;

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::Cli;
use gridsynth_core::adapter::synth_json::SynthDocument;
use gridsynth_core::hierarchy::{build_plan, inject_blackbox_attributes};
use gridsynth_core::layout::CompileOptions;
use gridsynth_core::save::{compress, write_payload};
use gridsynth_core::worker::NoopMonitor;
use gridsynth_core::{compile_top, PipelineError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_tracing(cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn install_tracing(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Synth(#[from] synth::SynthesizerError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Save(#[from] gridsynth_core::save::SaveError),
    #[error(transparent)]
    Hierarchy(#[from] gridsynth_core::hierarchy::HierarchyError),
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let source = fs::read_to_string(&cli.input)?;
    let modules = gridsynth_core::hierarchy::scan_modules(&source);
    let plan = build_plan(&modules, &cli.top)?;

    let mut merged: HashMap<String, gridsynth_core::adapter::synth_json::SynthModule> = HashMap::new();
    for name in &plan.compile_order {
        tracing::info!(module = name.as_str(), "synthesizing submodule");
        let document = synth::synthesize(name, &source)?;
        merge_module(&mut merged, document, name);
    }

    let submodule_names: std::collections::HashSet<String> = plan.compile_order.iter().cloned().collect();
    let blackboxed_source = inject_blackbox_attributes(&source, &submodule_names);
    tracing::info!(module = plan.top.as_str(), "synthesizing top module");
    let top_document = synth::synthesize(&plan.top, &blackboxed_source)?;
    merge_module(&mut merged, top_document, &plan.top);

    let document = SynthDocument { modules: merged };

    let options = CompileOptions {
        compact: cli.compact,
        no_flatten: cli.no_flatten,
        ..CompileOptions::default()
    };

    let tree = compile_top(&document, &plan, &options, &NoopMonitor)?;

    let top_bytes = compress(&write_payload(&tree.top)?)?;
    let mut dependency_bytes = Vec::with_capacity(tree.dependencies.len());
    for (name, payload) in &tree.dependencies {
        dependency_bytes.push((name.clone(), compress(&write_payload(payload)?)?));
    }

    write_output(&cli.output_directory, &top_bytes, &dependency_bytes)?;
    Ok(())
}

/// Keep only the module a synthesizer invocation was asked to produce;
/// a caller-side contract violation surfaces later as a clear
/// [`PipelineError::ModuleNotFound`] rather than silently taking
/// whichever module happened to come back.
fn merge_module(
    merged: &mut HashMap<String, gridsynth_core::adapter::synth_json::SynthModule>,
    mut document: SynthDocument,
    expected_name: &str,
) {
    if let Some(module) = document.modules.remove(expected_name) {
        merged.insert(expected_name.to_string(), module);
    }
}

fn write_output(
    output_directory: &Path,
    top_bytes: &[u8],
    dependency_bytes: &[(String, Vec<u8>)],
) -> std::io::Result<()> {
    fs::create_dir_all(output_directory)?;
    fs::write(output_directory.join("circuit.data"), top_bytes)?;
    for (name, bytes) in dependency_bytes {
        let dir = output_directory.join("dependencies").join(name);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("circuit.data"), bytes)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_output_creates_top_and_dependency_files() {
        let dir = tempfile::tempdir().unwrap();
        write_output(
            dir.path(),
            b"top-bytes",
            &[("adder".to_string(), b"adder-bytes".to_vec())],
        )
        .unwrap();

        assert_eq!(fs::read(dir.path().join("circuit.data")).unwrap(), b"top-bytes");
        assert_eq!(
            fs::read(dir.path().join("dependencies/adder/circuit.data")).unwrap(),
            b"adder-bytes"
        );
    }
}
