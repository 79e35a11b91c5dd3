//! Pipeline glue (`spec.md` §1, §4.7, §5): the "slim bridge" that
//! sequences the synthesis adapter, layout bridge, wire encoder, and save
//! writer for one module, and the hierarchy driver's bottom-up
//! orchestration entry point.
//!
//! This module owns no algorithmic logic of its own; every stage it
//! calls lives in [`crate::adapter`], [`crate::layout`], [`crate::wire`],
//! [`crate::save`], or [`crate::hierarchy`].

use std::collections::HashMap;

use tracing::debug;

use crate::adapter::lower::{lower_module, ChildInfo};
use crate::adapter::synth_json::SynthDocument;
use crate::error::{PipelineError, Result};
use crate::hierarchy::{self, CompilePlan};
use crate::layout::{self, CompileOptions};
use crate::library::ComponentKind;
use crate::model::CustomMetadata;
use crate::save::{self, HeaderInfo, SavePayload};
use crate::wire;
use crate::worker::ProgressMonitor;

/// Id/port and geometry maps for every already-compiled submodule a
/// module may instantiate via a `Custom` cell.
#[derive(Debug, Clone, Default)]
pub struct ChildContext {
    pub child_info: HashMap<String, ChildInfo>,
    pub custom_metadata: HashMap<u64, CustomMetadata>,
}

/// Everything one module's compile produces: its save payload, the
/// custom-component metadata it exports to a parent, and the id/port
/// info a parent's adapter pass needs to lower `Custom` cells that
/// instantiate it.
#[derive(Debug, Clone)]
pub struct ModuleArtifacts {
    pub payload: SavePayload,
    pub custom_metadata: CustomMetadata,
    pub child_info: ChildInfo,
}

/// Compile one module (already present in `document`) through the full
/// pipeline: adapter -> layout bridge -> wire encoder -> save writer.
///
/// `module_id` is this module's own stable id (used to label the
/// [`ChildInfo`] it hands up to its parent; irrelevant for the top-level
/// module, which no one instantiates).
pub fn compile_module(
    document: &SynthDocument,
    module_name: &str,
    module_id: u64,
    children: &ChildContext,
    options: &CompileOptions,
    monitor: &dyn ProgressMonitor,
) -> Result<ModuleArtifacts> {
    let module = document
        .modules
        .get(module_name)
        .ok_or_else(|| PipelineError::ModuleNotFound(module_name.to_string()))?;

    let netlist = lower_module(module, &children.child_info)?;
    debug!(
        module = module_name,
        components = netlist.component_count(),
        nets = netlist.net_count(),
        "lowered module"
    );

    let request = layout::build_request(&netlist);
    let oracle = layout::SugiyamaOracle::new();
    let placed = layout::run(&request, &oracle, options, monitor)?;

    let records = wire::build_wire_records(&netlist, &placed, &children.custom_metadata)?;
    let custom_metadata = hierarchy::extract_custom_metadata(&netlist, &placed);
    let child_info = hierarchy::extract_child_info(&netlist, module_id);

    let mut dependency_ids: Vec<u64> = netlist
        .components()
        .filter(|c| c.kind == ComponentKind::Custom)
        .filter_map(|c| c.metadata.custom_id)
        .collect();
    dependency_ids.sort_unstable();
    dependency_ids.dedup();

    let header = HeaderInfo {
        dependency_ids,
        ..HeaderInfo::default()
    };

    let payload = save::build_payload(&netlist, &placed, records, &children.custom_metadata, header)?;

    Ok(ModuleArtifacts {
        payload,
        custom_metadata,
        child_info,
    })
}

/// The top module's payload plus every submodule's, keyed by module name
/// (`spec.md` §6: `circuit.data` for the top, `dependencies/<name>/circuit.data`
/// for each submodule).
#[derive(Debug, Clone)]
pub struct CompiledTree {
    pub top: SavePayload,
    pub dependencies: Vec<(String, SavePayload)>,
}

/// Compile every submodule `plan.compile_order` names bottom-up, then the
/// top module, threading each compiled child's id/port and geometry maps
/// into its parent (`spec.md` §4.7 step 4-5).
pub fn compile_top(
    document: &SynthDocument,
    plan: &CompilePlan,
    options: &CompileOptions,
    monitor: &dyn ProgressMonitor,
) -> Result<CompiledTree> {
    let mut child_info_map: HashMap<String, ChildInfo> = HashMap::new();
    let mut custom_metadata_map: HashMap<u64, CustomMetadata> = HashMap::new();
    let mut dependencies = Vec::with_capacity(plan.compile_order.len());

    for name in &plan.compile_order {
        let id = *plan.ids.get(name).ok_or_else(|| PipelineError::ModuleNotFound(name.clone()))?;
        let ctx = ChildContext {
            child_info: child_info_map.clone(),
            custom_metadata: custom_metadata_map.clone(),
        };
        let artifacts = compile_module(document, name, id, &ctx, options, monitor)?;
        child_info_map.insert(name.clone(), artifacts.child_info);
        custom_metadata_map.insert(id, artifacts.custom_metadata);
        dependencies.push((name.clone(), artifacts.payload));
    }

    let top_id = *plan.ids.get(&plan.top).unwrap_or(&0);
    let top_ctx = ChildContext {
        child_info: child_info_map,
        custom_metadata: custom_metadata_map,
    };
    let top_artifacts = compile_module(document, &plan.top, top_id, &top_ctx, options, monitor)?;

    Ok(CompiledTree {
        top: top_artifacts.payload,
        dependencies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::NoopMonitor;
    use serde_json::json;

    fn buffer_document() -> SynthDocument {
        let value = json!({
            "modules": {
                "top": {
                    "ports": {
                        "a": {"direction": "input", "bits": [2]},
                        "y": {"direction": "output", "bits": [2]}
                    },
                    "cells": {}
                }
            }
        });
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn compiles_a_single_module_with_no_children() {
        let document = buffer_document();
        let children = ChildContext::default();
        let options = CompileOptions::default();
        let artifacts = compile_module(&document, "top", 0, &children, &options, &NoopMonitor).unwrap();
        assert_eq!(artifacts.payload.components.len(), 2);
        assert!(artifacts.child_info.ports.contains_key("a"));
        assert!(artifacts.child_info.ports.contains_key("y"));
    }

    /// A 2-bit input port whose bits drive two separate single-bit gates
    /// (never re-packed in order) forces its splitter to survive lowering
    /// rather than being erased by rule 3. Compiling this module through
    /// to wires is the regression check for the splitter template's
    /// output port names (`library::catalog`).
    #[test]
    fn surviving_splitter_compiles_through_to_wires() {
        let value = json!({
            "modules": {
                "top": {
                    "ports": {
                        "a": {"direction": "input", "bits": [1, 2]},
                        "y": {"direction": "output", "bits": [3, 4]}
                    },
                    "cells": {
                        "not0": {"type": "$not", "connections": {"A": [1], "Y": [3]}},
                        "not1": {"type": "$not", "connections": {"A": [2], "Y": [4]}}
                    }
                }
            }
        });
        let document: SynthDocument = serde_json::from_value(value).unwrap();
        let children = ChildContext::default();
        let options = CompileOptions::default();
        let artifacts = compile_module(&document, "top", 0, &children, &options, &NoopMonitor).unwrap();

        assert!(
            artifacts
                .payload
                .components
                .iter()
                .any(|c| c.kind == ComponentKind::Splitter8 as u16),
            "the input splitter should survive lowering, not be erased"
        );
        assert!(
            !artifacts.payload.wires.is_empty(),
            "the splitter's output nets should route to both NOT gates"
        );
    }

    #[test]
    fn unknown_module_name_is_an_error() {
        let document = buffer_document();
        let children = ChildContext::default();
        let options = CompileOptions::default();
        let result = compile_module(&document, "missing", 0, &children, &options, &NoopMonitor);
        assert!(matches!(result, Err(PipelineError::ModuleNotFound(_))));
    }
}
