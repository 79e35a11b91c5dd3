//! The lowering driver: bit caching, module-port wiring, and the top-level
//! per-module entry point.

use std::collections::HashMap;

use tracing::debug;

use crate::library::{self, ComponentKind, Width};
use crate::model::{ComponentId, ModulePortDescriptor, NetId, Netlist};

use super::bits::resolve_width;
use super::synth_json::{ConstantBit, PortDirection, RawBit, SynthBit, SynthModule};
use super::AdapterError;

/// A submodule's exported port, as surfaced to a parent's `Custom` cell
/// lowering: direction and true (pre-width-resolution) bit count.
#[derive(Debug, Clone, Copy)]
pub struct ChildPort {
    pub is_input: bool,
    pub width: u32,
}

/// Per-submodule info a parent needs to lower `Custom` cells that
/// instantiate it: its stable id and its exported port list.
#[derive(Debug, Clone, Default)]
pub struct ChildInfo {
    pub id: u64,
    pub ports: HashMap<String, ChildPort>,
}

/// Mutable lowering state threaded through bit normalization, packing, and
/// cell lowering. One instance per module compile.
pub struct LoweringContext<'a> {
    pub netlist: Netlist,
    /// Numbered synthesizer bits -> net id (shared identity across references).
    numbered: HashMap<u64, NetId>,
    /// Named synthesizer bits -> net id (shared identity across references).
    named: HashMap<String, NetId>,
    /// Nets known (at lowering time) to be driven by a literal constant,
    /// and their value -- used by `Pack`'s all-constant short-circuit.
    const_values: HashMap<NetId, u64>,
    /// Nets marked zero by the optimizer (populated in `optimize.rs`,
    /// consulted by the AND-gate redundancy pass).
    pub zero_nets: std::collections::HashSet<NetId>,
    fresh_counter: u64,
    /// Submodule name -> id/port info, for `Custom` cell lowering.
    pub children: &'a HashMap<String, ChildInfo>,
}

impl<'a> LoweringContext<'a> {
    pub fn new(children: &'a HashMap<String, ChildInfo>) -> Self {
        Self {
            netlist: Netlist::new(),
            numbered: HashMap::new(),
            named: HashMap::new(),
            const_values: HashMap::new(),
            zero_nets: std::collections::HashSet::new(),
            fresh_counter: 0,
            children,
        }
    }

    /// A brand-new net id, used for constants and internal maker/splitter
    /// wiring. Never collides with a synthesizer-numbered or named id.
    pub fn fresh_net(&mut self) -> NetId {
        let id = NetId::new(format!("$fresh{}", self.fresh_counter));
        self.fresh_counter += 1;
        id
    }

    pub fn instantiate(&mut self, kind: ComponentKind) -> ComponentId {
        self.netlist.instantiate(kind)
    }

    /// Attach an `Off`/`On` constant driver to `net` if it has none yet,
    /// per `spec.md` §4.3 ("if already driven, skip").
    pub fn ensure_constant_driver(&mut self, net: &NetId, value: ConstantBit) {
        if let Some(existing) = self.netlist.net(net) {
            if existing.source.is_some() {
                return;
            }
        }
        let kind = match value {
            ConstantBit::Zero => ComponentKind::Off,
            ConstantBit::One => ComponentKind::On,
        };
        let id = self.netlist.instantiate(kind);
        self.netlist.register_source(net, id, "Y").expect("fresh net has no driver");
        self.const_values.insert(net.clone(), match value {
            ConstantBit::Zero => 0,
            ConstantBit::One => 1,
        });
    }

    /// A fresh constant-0 net, driver already attached.
    pub fn zero_bit(&mut self) -> NetId {
        let net = self.fresh_net();
        self.ensure_constant_driver(&net, ConstantBit::Zero);
        net
    }

    /// Normalize one raw synthesizer bit reference to an internal net id,
    /// attaching a constant driver immediately for literals.
    pub fn bit_net(&mut self, raw: &RawBit) -> NetId {
        match raw.classify() {
            SynthBit::Numbered(n) => self
                .numbered
                .entry(n)
                .or_insert_with(|| NetId::new(format!("n{n}")))
                .clone(),
            SynthBit::Named(name) => self
                .named
                .entry(name.clone())
                .or_insert_with(|| NetId::new(format!("named_{name}")))
                .clone(),
            SynthBit::Constant(c) => {
                let net = self.fresh_net();
                self.ensure_constant_driver(&net, c);
                net
            }
        }
    }

    pub fn bit_nets(&mut self, raws: &[RawBit]) -> Vec<NetId> {
        raws.iter().map(|b| self.bit_net(b)).collect()
    }

    /// Whether `net` is known (at lowering time) to be driven by a literal
    /// constant, and if so its value.
    pub fn const_value(&self, net: &NetId) -> Option<u64> {
        self.const_values.get(net).copied()
    }

    pub fn record_const_value(&mut self, net: NetId, value: u64) {
        self.const_values.insert(net, value);
    }
}

/// Lower one synthesizer module into a fresh [`Netlist`].
///
/// `children` carries id/port metadata for every submodule this module may
/// instantiate via a `Custom` cell (populated bottom-up by the hierarchy
/// driver).
pub fn lower_module(
    module: &SynthModule,
    children: &HashMap<String, ChildInfo>,
) -> Result<Netlist, AdapterError> {
    let mut ctx = LoweringContext::new(children);
    let mut output_targets: Vec<(String, Vec<NetId>)> = Vec::new();

    // Module ports: input ports instantiate an Input* component that
    // drives a fresh bus, then unpack it into the bit nets downstream
    // cells reference; output ports are recorded and wired (via pack)
    // once all cells -- and thus all drivers -- have been lowered.
    let mut port_names: Vec<&String> = module.ports.keys().collect();
    port_names.sort();
    for name in port_names {
        let port = &module.ports[name];
        let bits = ctx.bit_nets(&port.bits);
        let width = resolve_width(bits.len() as u32)?;
        match port.direction {
            PortDirection::Input | PortDirection::Inout => {
                let kind = library::input_kind(width);
                let id = ctx.instantiate(kind);
                ctx.netlist.component_mut(id).unwrap().metadata.module_port =
                    Some(ModulePortDescriptor {
                        name: name.clone(),
                        is_input: true,
                        bit_index: None,
                    });
                if width == Width::W1 {
                    ctx.netlist.register_source(&bits[0], id, "Y")?;
                } else {
                    let bus = ctx.fresh_net();
                    ctx.netlist.register_source(&bus, id, "Y")?;
                    pack::unpack(&mut ctx, bus, &bits, width)?;
                }
            }
            PortDirection::Output => {
                output_targets.push((name.clone(), bits));
            }
        }
    }

    // Cells are a `HashMap`, so iteration order is randomized per process;
    // sort names first so instantiation order -- and thus permanent_id
    // assignment in `save::build` -- is stable across runs (spec.md §8).
    let mut cell_names: Vec<&String> = module.cells.keys().collect();
    cell_names.sort();
    for name in cell_names {
        let cell = &module.cells[name];
        cells::lower_cell(&mut ctx, name, cell)?;
    }

    for (name, bits) in output_targets {
        let width = resolve_width(bits.len() as u32)?;
        for b in &bits {
            if ctx.netlist.net(b).map(|n| n.has_source()) != Some(true) {
                return Err(AdapterError::UndrivenOutput(name.clone()));
            }
        }
        let bus = pack::pack(&mut ctx, &bits, width)?;
        let kind = library::output_kind(width);
        let id = ctx.instantiate(kind);
        ctx.netlist.component_mut(id).unwrap().metadata.module_port =
            Some(ModulePortDescriptor {
                name: name.clone(),
                is_input: false,
                bit_index: None,
            });
        ctx.netlist.register_sink(&bus, id, "A")?;
    }

    optimize::run(&mut ctx.netlist, &mut ctx.zero_nets);
    debug!(
        components = ctx.netlist.component_count(),
        nets = ctx.netlist.net_count(),
        "lowered module"
    );
    Ok(ctx.netlist)
}

use super::{cells, optimize, pack};
