//! Invokes the external synthesizer the core crate deliberately does not
//! implement (`spec.md` §7 External failure: "synthesizer process error";
//! Non-Goals: no logic synthesis).
//!
//! The program is located via the `GRIDSYNTH_SYNTH` environment variable.
//! It is invoked once per module compile with the module name as its
//! sole argument and the module's (possibly blackbox-injected) source
//! text on stdin; it must print one synthesizer-JSON document
//! (`{"modules": {"<name>": {...}}}`) for that module on stdout.

use std::io::Write;
use std::process::{Command, ExitStatus, Stdio};

use gridsynth_core::adapter::synth_json::SynthDocument;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthesizerError {
    #[error("GRIDSYNTH_SYNTH is not set; no synthesizer is configured")]
    NotConfigured,
    #[error("failed to launch synthesizer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("synthesizer `{program}` gave no stdin pipe")]
    NoStdin { program: String },
    #[error("synthesizer exited with status {0}")]
    ExitStatus(ExitStatus),
    #[error("synthesizer output was not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Synthesize one module, reading the program path from `GRIDSYNTH_SYNTH`.
pub fn synthesize(module_name: &str, source: &str) -> Result<SynthDocument, SynthesizerError> {
    let program = std::env::var("GRIDSYNTH_SYNTH").map_err(|_| SynthesizerError::NotConfigured)?;
    run(&program, module_name, source)
}

fn run(program: &str, module_name: &str, source: &str) -> Result<SynthDocument, SynthesizerError> {
    let mut child = Command::new(program)
        .arg(module_name)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|source| SynthesizerError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let Some(mut stdin) = child.stdin.take() else {
        return Err(SynthesizerError::NoStdin {
            program: program.to_string(),
        });
    };
    stdin
        .write_all(source.as_bytes())
        .map_err(|source| SynthesizerError::Spawn {
            program: program.to_string(),
            source,
        })?;
    drop(stdin);

    let output = child.wait_with_output().map_err(|source| SynthesizerError::Spawn {
        program: program.to_string(),
        source,
    })?;
    if !output.status.success() {
        return Err(SynthesizerError::ExitStatus(output.status));
    }
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_yields_a_spawn_error() {
        let result = run("gridsynth-nonexistent-program", "top", "module top(); endmodule\n");
        assert!(matches!(result, Err(SynthesizerError::Spawn { .. })));
    }

    #[test]
    fn unconfigured_env_var_is_reported() {
        std::env::remove_var("GRIDSYNTH_SYNTH");
        let result = synthesize("top", "module top(); endmodule\n");
        assert!(matches!(result, Err(SynthesizerError::NotConfigured)));
    }
}
