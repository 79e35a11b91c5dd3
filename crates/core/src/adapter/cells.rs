//! Cell lowering: the tabulated contract in `spec.md` §4.3.
//!
//! One function per cell family, each taking the already-bit-normalized
//! connections off a [`SynthCell`] and wiring up the library primitives
//! that realize it, packing/unpacking through [`pack`] at the boundary.

use crate::library::{self, ComponentKind, Width};
use crate::model::NetId;

use super::bits::resolve_width;
use super::lower::LoweringContext;
use super::pack;
use super::synth_json::{RawBit, SynthCell};
use super::AdapterError;

/// A connection that must be present on a cell, else `MissingConnection`.
fn required<'a>(cell: &'a SynthCell, cell_name: &str, port: &str) -> Result<&'a [RawBit], AdapterError> {
    cell.connections
        .get(port)
        .map(|v| v.as_slice())
        .ok_or_else(|| AdapterError::MissingConnection {
            cell: cell_name.to_string(),
            port: port.to_string(),
        })
}

/// A single-bit control connection (`S`, `EN`, `SRST`, ...): required to be
/// present, but only its first bit is meaningful.
fn control_bit(
    ctx: &mut LoweringContext,
    cell: &SynthCell,
    cell_name: &str,
    port: &str,
) -> Result<NetId, AdapterError> {
    let bits = ctx.bit_nets(required(cell, cell_name, port)?);
    Ok(bits.first().cloned().unwrap_or_else(|| ctx.zero_bit()))
}

fn maybe_invert(ctx: &mut LoweringContext, raw: NetId, invert: bool) -> Result<NetId, AdapterError> {
    if !invert {
        return Ok(raw);
    }
    let out = ctx.fresh_net();
    gate1_into(ctx, ComponentKind::Not1, raw, out.clone())?;
    Ok(out)
}

fn all_ones(width: Width) -> u64 {
    match width {
        Width::W1 => 1,
        Width::W8 => 0xFF,
        Width::W16 => 0xFFFF,
        Width::W32 => 0xFFFF_FFFF,
        Width::W64 => u64::MAX,
    }
}

/// Instantiate a one-input, one-output gate (`NOT`/`NEG`/per-width `NOT`)
/// and drive `target` directly from its `Y` port.
fn gate1_into(
    ctx: &mut LoweringContext,
    kind: ComponentKind,
    a: NetId,
    target: NetId,
) -> Result<(), AdapterError> {
    let id = ctx.instantiate(kind);
    ctx.netlist.register_sink(&a, id, "A")?;
    ctx.netlist.register_source(&target, id, "Y")?;
    Ok(())
}

/// Instantiate a two-input, one-output gate and drive `target` directly
/// from its `Y` port.
fn gate2_into(
    ctx: &mut LoweringContext,
    kind: ComponentKind,
    a: NetId,
    b: NetId,
    target: NetId,
) -> Result<(), AdapterError> {
    let id = ctx.instantiate(kind);
    ctx.netlist.register_sink(&a, id, "A")?;
    ctx.netlist.register_sink(&b, id, "B")?;
    ctx.netlist.register_source(&target, id, "Y")?;
    Ok(())
}

/// `(A & ¬S) | (B & S)`, with the constant-aware short-circuits from
/// `spec.md` §4.3's 1-bit multiplexer row. Drives `target` directly.
fn lower_mux1_into(
    ctx: &mut LoweringContext,
    a: NetId,
    b: NetId,
    s: NetId,
    target: NetId,
) -> Result<(), AdapterError> {
    let not_s = {
        let t = ctx.fresh_net();
        gate1_into(ctx, ComponentKind::Not1, s.clone(), t.clone())?;
        t
    };
    let term1 = match ctx.const_value(&a) {
        Some(0) => ctx.zero_bit(),
        Some(_) => not_s.clone(),
        None => {
            let t = ctx.fresh_net();
            gate2_into(ctx, ComponentKind::And1, a, not_s, t.clone())?;
            t
        }
    };
    let term2 = match ctx.const_value(&b) {
        Some(0) => ctx.zero_bit(),
        Some(_) => s.clone(),
        None => {
            let t = ctx.fresh_net();
            gate2_into(ctx, ComponentKind::And1, b, s, t.clone())?;
            t
        }
    };
    gate2_into(ctx, ComponentKind::Or1, term1, term2, target)
}

/// A mux of any width: the 1-bit decomposition below `W8`, a width-matched
/// `Mux*` template otherwise. `a` is selected when `sel` is 0, `b` when 1.
fn mux_bus(
    ctx: &mut LoweringContext,
    a: NetId,
    b: NetId,
    sel: NetId,
    width: Width,
) -> Result<NetId, AdapterError> {
    let out = ctx.fresh_net();
    if width == Width::W1 {
        lower_mux1_into(ctx, a, b, sel, out.clone())?;
    } else {
        let id = ctx.instantiate(library::mux_kind(width));
        ctx.netlist.register_sink(&a, id, "A")?;
        ctx.netlist.register_sink(&b, id, "B")?;
        ctx.netlist.register_sink(&sel, id, "S")?;
        ctx.netlist.register_source(&out, id, "Y")?;
    }
    Ok(out)
}

/// Reduce a bit vector to a single "is nonzero" flag: the bit itself at
/// width 1, else `NOT(Equal(A, 0))`.
fn nonzero_flag(ctx: &mut LoweringContext, bits: &[NetId]) -> Result<NetId, AdapterError> {
    let width = resolve_width(bits.len().max(1) as u32)?;
    if width == Width::W1 {
        return Ok(bits.first().cloned().unwrap_or_else(|| ctx.zero_bit()));
    }
    let a = pack::pack(ctx, bits, width)?;
    let zero = pack::pack_constant(ctx, 0, width)?;
    let eq_y = ctx.fresh_net();
    gate2_into(ctx, library::equal_kind(width), a, zero, eq_y.clone())?;
    let flag = ctx.fresh_net();
    gate1_into(ctx, ComponentKind::Not1, eq_y, flag.clone())?;
    Ok(flag)
}

fn register_kind_for(width: Width) -> ComponentKind {
    if width == Width::W1 {
        ComponentKind::FlipFlop1
    } else {
        library::reg_kind(width)
    }
}

/// The register's `save` input: CLK, inverted when `CLK_POLARITY` is 0.
fn clk_save_signal(
    ctx: &mut LoweringContext,
    cell: &SynthCell,
    cell_name: &str,
) -> Result<NetId, AdapterError> {
    let polarity = cell.param_bool("CLK_POLARITY", true);
    let clk = control_bit(ctx, cell, cell_name, "CLK")?;
    maybe_invert(ctx, clk, !polarity)
}

// ---------------------------------------------------------------------
// AND / OR / XOR / XNOR / NOT
// ---------------------------------------------------------------------

fn lower_gate(
    ctx: &mut LoweringContext,
    cell_name: &str,
    cell: &SynthCell,
    kind_fn: fn(Width) -> ComponentKind,
) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let b_bits = ctx.bit_nets(required(cell, cell_name, "B")?);
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    let width = resolve_width(y_bits.len() as u32)?;
    let a = pack::pack(ctx, &a_bits, width)?;
    let b = pack::pack(ctx, &b_bits, width)?;
    let y = ctx.fresh_net();
    gate2_into(ctx, kind_fn(width), a, b, y.clone())?;
    pack::unpack(ctx, y, &y_bits, width)
}

fn lower_not(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    let width = resolve_width(y_bits.len() as u32)?;
    let a = pack::pack(ctx, &a_bits, width)?;
    let y = ctx.fresh_net();
    gate1_into(ctx, library::not_kind(width), a, y.clone())?;
    pack::unpack(ctx, y, &y_bits, width)
}

// ---------------------------------------------------------------------
// Multiplexers
// ---------------------------------------------------------------------

fn lower_mux(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let b_bits = ctx.bit_nets(required(cell, cell_name, "B")?);
    let sel = control_bit(ctx, cell, cell_name, "S")?;
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    let width = resolve_width(y_bits.len() as u32)?;
    let a = pack::pack(ctx, &a_bits, width)?;
    let b = pack::pack(ctx, &b_bits, width)?;
    let y = mux_bus(ctx, a, b, sel, width)?;
    pack::unpack(ctx, y, &y_bits, width)
}

fn lower_pmux(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let b_bits = ctx.bit_nets(required(cell, cell_name, "B")?);
    let s_bits = ctx.bit_nets(required(cell, cell_name, "S")?);
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    let width = resolve_width(y_bits.len() as u32)?;
    let raw_n = y_bits.len().max(1);
    let mut acc = pack::pack(ctx, &a_bits, width)?;
    for (slot, sel) in b_bits.chunks(raw_n).zip(s_bits.iter()) {
        let slot_bus = pack::pack(ctx, slot, width)?;
        acc = mux_bus(ctx, acc, slot_bus, sel.clone(), width)?;
    }
    pack::unpack(ctx, acc, &y_bits, width)
}

// ---------------------------------------------------------------------
// Registers
// ---------------------------------------------------------------------

fn lower_dff(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let save = clk_save_signal(ctx, cell, cell_name)?;
    let d_bits = ctx.bit_nets(required(cell, cell_name, "D")?);
    let q_bits = ctx.bit_nets(required(cell, cell_name, "Q")?);
    let width = resolve_width(q_bits.len() as u32)?;
    let value = pack::pack(ctx, &d_bits, width)?;
    let id = ctx.instantiate(register_kind_for(width));
    ctx.netlist.register_sink(&save, id, "save")?;
    ctx.netlist.register_sink(&value, id, "value")?;
    if width != Width::W1 {
        let load = pack::pack_constant(ctx, 1, Width::W1)?;
        ctx.netlist.register_sink(&load, id, "load")?;
    }
    let out = ctx.fresh_net();
    ctx.netlist.register_source(&out, id, "out")?;
    pack::unpack(ctx, out, &q_bits, width)
}

fn lower_dffe(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let save = clk_save_signal(ctx, cell, cell_name)?;
    let en_polarity = cell.param_bool("EN_POLARITY", true);
    let en_raw = control_bit(ctx, cell, cell_name, "EN")?;
    let en = maybe_invert(ctx, en_raw, !en_polarity)?;
    let d_bits = ctx.bit_nets(required(cell, cell_name, "D")?);
    let q_bits = ctx.bit_nets(required(cell, cell_name, "Q")?);
    let width = resolve_width(q_bits.len() as u32)?;
    let id = ctx.instantiate(register_kind_for(width));
    ctx.netlist.register_sink(&save, id, "save")?;
    if width != Width::W1 {
        let load = pack::pack_constant(ctx, 1, Width::W1)?;
        ctx.netlist.register_sink(&load, id, "load")?;
    }
    let out = ctx.fresh_net();
    ctx.netlist.register_source(&out, id, "out")?;
    let d = pack::pack(ctx, &d_bits, width)?;
    let value = mux_bus(ctx, out.clone(), d, en, width)?;
    ctx.netlist.register_sink(&value, id, "value")?;
    pack::unpack(ctx, out, &q_bits, width)
}

fn lower_sdff(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let save = clk_save_signal(ctx, cell, cell_name)?;
    let srst_polarity = cell.param_bool("SRST_POLARITY", true);
    let srst_raw = control_bit(ctx, cell, cell_name, "SRST")?;
    let srst = maybe_invert(ctx, srst_raw, !srst_polarity)?;
    let d_bits = ctx.bit_nets(required(cell, cell_name, "D")?);
    let q_bits = ctx.bit_nets(required(cell, cell_name, "Q")?);
    let width = resolve_width(q_bits.len() as u32)?;
    let srst_value = cell.param_int("SRST_VALUE").unwrap_or(0) as u64;
    let id = ctx.instantiate(register_kind_for(width));
    ctx.netlist.register_sink(&save, id, "save")?;
    if width != Width::W1 {
        let load = pack::pack_constant(ctx, 1, Width::W1)?;
        ctx.netlist.register_sink(&load, id, "load")?;
    }
    let d = pack::pack(ctx, &d_bits, width)?;
    let const_bus = pack::pack_constant(ctx, srst_value, width)?;
    let value = mux_bus(ctx, d, const_bus, srst, width)?;
    ctx.netlist.register_sink(&value, id, "value")?;
    let out = ctx.fresh_net();
    ctx.netlist.register_source(&out, id, "out")?;
    pack::unpack(ctx, out, &q_bits, width)
}

fn lower_sdffe(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let save = clk_save_signal(ctx, cell, cell_name)?;
    let en_polarity = cell.param_bool("EN_POLARITY", true);
    let en_raw = control_bit(ctx, cell, cell_name, "EN")?;
    let en = maybe_invert(ctx, en_raw, !en_polarity)?;
    let srst_polarity = cell.param_bool("SRST_POLARITY", true);
    let srst_raw = control_bit(ctx, cell, cell_name, "SRST")?;
    let srst = maybe_invert(ctx, srst_raw, !srst_polarity)?;
    let d_bits = ctx.bit_nets(required(cell, cell_name, "D")?);
    let q_bits = ctx.bit_nets(required(cell, cell_name, "Q")?);
    let width = resolve_width(q_bits.len() as u32)?;
    let srst_value = cell.param_int("SRST_VALUE").unwrap_or(0) as u64;
    let id = ctx.instantiate(register_kind_for(width));
    ctx.netlist.register_sink(&save, id, "save")?;
    if width != Width::W1 {
        let load = pack::pack_constant(ctx, 1, Width::W1)?;
        ctx.netlist.register_sink(&load, id, "load")?;
    }
    let out = ctx.fresh_net();
    ctx.netlist.register_source(&out, id, "out")?;
    let d = pack::pack(ctx, &d_bits, width)?;
    let inner = mux_bus(ctx, out.clone(), d, en, width)?;
    let const_bus = pack::pack_constant(ctx, srst_value, width)?;
    let value = mux_bus(ctx, inner, const_bus, srst, width)?;
    ctx.netlist.register_sink(&value, id, "value")?;
    pack::unpack(ctx, out, &q_bits, width)
}

// ---------------------------------------------------------------------
// Comparisons / reductions / logic
// ---------------------------------------------------------------------

fn lower_eq_net(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<NetId, AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let b_bits = ctx.bit_nets(required(cell, cell_name, "B")?);
    let width = resolve_width(a_bits.len().max(b_bits.len()).max(1) as u32)?;
    let a = pack::pack(ctx, &a_bits, width)?;
    let b = pack::pack(ctx, &b_bits, width)?;
    let y = ctx.fresh_net();
    gate2_into(ctx, library::equal_kind(width), a, b, y.clone())?;
    Ok(y)
}

fn lower_eq(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let y = lower_eq_net(ctx, cell_name, cell)?;
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    pack::unpack(ctx, y, &y_bits, Width::W1)
}

fn lower_ne(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let eq_y = lower_eq_net(ctx, cell_name, cell)?;
    let not_y = ctx.fresh_net();
    gate1_into(ctx, ComponentKind::Not1, eq_y, not_y.clone())?;
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    pack::unpack(ctx, not_y, &y_bits, Width::W1)
}

fn lower_reduce_or(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let flag = nonzero_flag(ctx, &a_bits)?;
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    pack::unpack(ctx, flag, &y_bits, Width::W1)
}

fn lower_reduce_and(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let width = resolve_width(a_bits.len().max(1) as u32)?;
    let a = pack::pack(ctx, &a_bits, width)?;
    let ones = pack::pack_constant(ctx, all_ones(width), width)?;
    let y = ctx.fresh_net();
    gate2_into(ctx, library::equal_kind(width), a, ones, y.clone())?;
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    pack::unpack(ctx, y, &y_bits, Width::W1)
}

fn lower_logic_not(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let width = resolve_width(a_bits.len().max(1) as u32)?;
    let result = if width == Width::W1 {
        let a = a_bits.first().cloned().unwrap_or_else(|| ctx.zero_bit());
        let t = ctx.fresh_net();
        gate1_into(ctx, ComponentKind::Not1, a, t.clone())?;
        t
    } else {
        let a = pack::pack(ctx, &a_bits, width)?;
        let zero = pack::pack_constant(ctx, 0, width)?;
        let y = ctx.fresh_net();
        gate2_into(ctx, library::equal_kind(width), a, zero, y.clone())?;
        y
    };
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    pack::unpack(ctx, result, &y_bits, Width::W1)
}

fn lower_logic_and(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let b_bits = ctx.bit_nets(required(cell, cell_name, "B")?);
    let fa = nonzero_flag(ctx, &a_bits)?;
    let fb = nonzero_flag(ctx, &b_bits)?;
    let y = ctx.fresh_net();
    gate2_into(ctx, ComponentKind::And1, fa, fb, y.clone())?;
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    pack::unpack(ctx, y, &y_bits, Width::W1)
}

fn lower_logic_or(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let b_bits = ctx.bit_nets(required(cell, cell_name, "B")?);
    let fa = nonzero_flag(ctx, &a_bits)?;
    let fb = nonzero_flag(ctx, &b_bits)?;
    let y = ctx.fresh_net();
    gate2_into(ctx, ComponentKind::Or1, fa, fb, y.clone())?;
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    pack::unpack(ctx, y, &y_bits, Width::W1)
}

fn lower_compare(
    ctx: &mut LoweringContext,
    cell_name: &str,
    cell: &SynthCell,
    cell_type: &str,
) -> Result<(), AdapterError> {
    let signed = cell.param_bool("A_SIGNED", false);
    let mut a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let mut b_bits = ctx.bit_nets(required(cell, cell_name, "B")?);
    let width = resolve_width(a_bits.len().max(b_bits.len()).max(1) as u32)?;
    if matches!(cell_type, "$gt" | "$le") {
        std::mem::swap(&mut a_bits, &mut b_bits);
    }
    let a = pack::pack(ctx, &a_bits, width)?;
    let b = pack::pack(ctx, &b_bits, width)?;
    let kind = if signed {
        library::less_signed_kind(width)
    } else {
        library::less_unsigned_kind(width)
    };
    let raw = ctx.fresh_net();
    gate2_into(ctx, kind, a, b, raw.clone())?;
    let result = if matches!(cell_type, "$ge" | "$le") {
        let t = ctx.fresh_net();
        gate1_into(ctx, ComponentKind::Not1, raw, t.clone())?;
        t
    } else {
        raw
    };
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    pack::unpack(ctx, result, &y_bits, Width::W1)
}

// ---------------------------------------------------------------------
// Arithmetic / shifts
// ---------------------------------------------------------------------

fn lower_add(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let b_bits = ctx.bit_nets(required(cell, cell_name, "B")?);
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    let width = resolve_width(a_bits.len().max(b_bits.len()).max(y_bits.len()) as u32)?;
    let a = pack::pack(ctx, &a_bits, width)?;
    let b = pack::pack(ctx, &b_bits, width)?;
    let cin = if cell.connections.contains_key("CI") {
        let ci_bits = ctx.bit_nets(cell.port_bits("CI"));
        ci_bits.first().cloned().unwrap_or_else(|| ctx.zero_bit())
    } else {
        ctx.zero_bit()
    };
    let id = ctx.instantiate(library::add_kind(width));
    ctx.netlist.register_sink(&cin, id, "carry_in")?;
    ctx.netlist.register_sink(&a, id, "A")?;
    ctx.netlist.register_sink(&b, id, "B")?;
    let sum = ctx.fresh_net();
    ctx.netlist.register_source(&sum, id, "sum")?;
    let cout = ctx.fresh_net();
    ctx.netlist.register_source(&cout, id, "carry_out")?;
    pack::unpack(ctx, sum, &y_bits, width)?;
    if cell.connections.contains_key("CO") {
        let co_bits = ctx.bit_nets(cell.port_bits("CO"));
        pack::unpack(ctx, cout, &co_bits, Width::W1)?;
    }
    Ok(())
}

fn lower_sub(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let b_bits = ctx.bit_nets(required(cell, cell_name, "B")?);
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    let width = resolve_width(a_bits.len().max(b_bits.len()).max(y_bits.len()) as u32)?;
    let b = pack::pack(ctx, &b_bits, width)?;
    let neg_b = ctx.fresh_net();
    gate1_into(ctx, library::neg_kind(width), b, neg_b.clone())?;
    let a = pack::pack(ctx, &a_bits, width)?;
    let cin = ctx.zero_bit();
    let id = ctx.instantiate(library::add_kind(width));
    ctx.netlist.register_sink(&cin, id, "carry_in")?;
    ctx.netlist.register_sink(&a, id, "A")?;
    ctx.netlist.register_sink(&neg_b, id, "B")?;
    let sum = ctx.fresh_net();
    ctx.netlist.register_source(&sum, id, "sum")?;
    let cout = ctx.fresh_net();
    ctx.netlist.register_source(&cout, id, "carry_out")?;
    pack::unpack(ctx, sum, &y_bits, width)
}

fn lower_mul(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let b_bits = ctx.bit_nets(required(cell, cell_name, "B")?);
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    let width = resolve_width(a_bits.len().max(b_bits.len()).max(y_bits.len()) as u32)?;
    let a = pack::pack(ctx, &a_bits, width)?;
    let b = pack::pack(ctx, &b_bits, width)?;
    let y = ctx.fresh_net();
    gate2_into(ctx, library::mul_kind(width), a, b, y.clone())?;
    pack::unpack(ctx, y, &y_bits, width)
}

fn lower_shift(
    ctx: &mut LoweringContext,
    cell_name: &str,
    cell: &SynthCell,
    kind_fn: fn(Width) -> ComponentKind,
) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let b_bits = ctx.bit_nets(required(cell, cell_name, "B")?);
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    let width = resolve_width(a_bits.len().max(y_bits.len()) as u32)?;
    let shift_width = resolve_width(b_bits.len().max(1) as u32)?;
    let a = pack::pack(ctx, &a_bits, width)?;
    let shift = pack::pack(ctx, &b_bits, shift_width)?;
    let id = ctx.instantiate(kind_fn(width));
    ctx.netlist.register_sink(&a, id, "A")?;
    ctx.netlist.register_sink(&shift, id, "shift")?;
    let y = ctx.fresh_net();
    ctx.netlist.register_source(&y, id, "Y")?;
    pack::unpack(ctx, y, &y_bits, width)
}

fn lower_sshr(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let b_bits = ctx.bit_nets(required(cell, cell_name, "B")?);
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    let width = resolve_width(a_bits.len().max(y_bits.len()) as u32)?;
    let shift_width = resolve_width(b_bits.len().max(1) as u32)?;
    let a = pack::pack(ctx, &a_bits, width)?;
    let shift = pack::pack(ctx, &b_bits, shift_width)?;

    let shr_id = ctx.instantiate(library::shr_kind(width));
    ctx.netlist.register_sink(&a, shr_id, "A")?;
    ctx.netlist.register_sink(&shift, shr_id, "shift")?;
    let logical = ctx.fresh_net();
    ctx.netlist.register_source(&logical, shr_id, "Y")?;

    let ones = pack::pack_constant(ctx, all_ones(width), width)?;
    let shr2_id = ctx.instantiate(library::shr_kind(width));
    ctx.netlist.register_sink(&ones, shr2_id, "A")?;
    ctx.netlist.register_sink(&shift, shr2_id, "shift")?;
    let shifted_ones = ctx.fresh_net();
    ctx.netlist.register_source(&shifted_ones, shr2_id, "Y")?;

    let mask = ctx.fresh_net();
    gate1_into(ctx, library::not_kind(width), shifted_ones, mask.clone())?;

    // Sign bit of the unpadded operand: Pack zero-pads rather than sign
    // extends, so the bus's own top bit would read as 0 for a narrower A.
    let sign = a_bits.last().cloned().unwrap_or_else(|| ctx.zero_bit());
    let zero_bus = pack::pack_constant(ctx, 0, width)?;
    let selected_mask = mux_bus(ctx, zero_bus, mask, sign, width)?;

    let y = ctx.fresh_net();
    gate2_into(ctx, library::or_kind(width), logical, selected_mask, y.clone())?;
    pack::unpack(ctx, y, &y_bits, width)
}

fn lower_neg(ctx: &mut LoweringContext, cell_name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    let a_bits = ctx.bit_nets(required(cell, cell_name, "A")?);
    let y_bits = ctx.bit_nets(required(cell, cell_name, "Y")?);
    let width = resolve_width(a_bits.len().max(y_bits.len()) as u32)?;
    let a = pack::pack(ctx, &a_bits, width)?;
    let y = ctx.fresh_net();
    gate1_into(ctx, library::neg_kind(width), a, y.clone())?;
    pack::unpack(ctx, y, &y_bits, width)
}

// ---------------------------------------------------------------------
// Hierarchical instances
// ---------------------------------------------------------------------

fn lower_custom(
    ctx: &mut LoweringContext,
    cell_name: &str,
    cell: &SynthCell,
    module_name: &str,
) -> Result<(), AdapterError> {
    let child = ctx
        .children
        .get(module_name)
        .cloned()
        .ok_or_else(|| AdapterError::UnknownSubmodule(module_name.to_string()))?;
    let id = ctx.instantiate(ComponentKind::Custom);
    {
        let instance = ctx.netlist.component_mut(id).unwrap();
        instance.metadata.custom_id = Some(child.id);
        instance.metadata.label = Some(cell_name.to_string());
    }
    let mut port_names: Vec<&String> = child.ports.keys().collect();
    port_names.sort();
    for port_name in port_names {
        let info = child.ports[port_name];
        let Some(raw_bits) = cell.connections.get(port_name) else {
            continue;
        };
        let bits = ctx.bit_nets(raw_bits);
        let width = resolve_width(info.width.max(1))?;
        if info.is_input {
            let bus = pack::pack(ctx, &bits, width)?;
            ctx.netlist.register_sink(&bus, id, port_name)?;
        } else {
            let bus = ctx.fresh_net();
            ctx.netlist.register_source(&bus, id, port_name)?;
            pack::unpack(ctx, bus, &bits, width)?;
        }
        ctx.netlist
            .component_mut(id)
            .unwrap()
            .metadata
            .port_width_overrides
            .insert(port_name.clone(), info.width);
    }
    Ok(())
}

/// Lower one cell, dispatching on its type string. Types outside the fixed
/// synthesizer vocabulary are treated as submodule instantiations.
pub fn lower_cell(ctx: &mut LoweringContext, name: &str, cell: &SynthCell) -> Result<(), AdapterError> {
    match cell.cell_type.as_str() {
        "$and" => lower_gate(ctx, name, cell, library::and_kind),
        "$or" => lower_gate(ctx, name, cell, library::or_kind),
        "$xor" => lower_gate(ctx, name, cell, library::xor_kind),
        "$xnor" => lower_gate(ctx, name, cell, library::xnor_kind),
        "$not" => lower_not(ctx, name, cell),
        "$mux" => lower_mux(ctx, name, cell),
        "$pmux" => lower_pmux(ctx, name, cell),
        "$dff" => lower_dff(ctx, name, cell),
        "$dffe" => lower_dffe(ctx, name, cell),
        "$sdff" => lower_sdff(ctx, name, cell),
        "$sdffe" => lower_sdffe(ctx, name, cell),
        "$eq" => lower_eq(ctx, name, cell),
        "$ne" => lower_ne(ctx, name, cell),
        "$reduce_or" | "$reduce_bool" => lower_reduce_or(ctx, name, cell),
        "$reduce_and" => lower_reduce_and(ctx, name, cell),
        "$logic_not" => lower_logic_not(ctx, name, cell),
        "$logic_and" => lower_logic_and(ctx, name, cell),
        "$logic_or" => lower_logic_or(ctx, name, cell),
        "$add" => lower_add(ctx, name, cell),
        "$sub" => lower_sub(ctx, name, cell),
        "$mul" => lower_mul(ctx, name, cell),
        "$shl" => lower_shift(ctx, name, cell, library::shl_kind),
        "$shr" => lower_shift(ctx, name, cell, library::shr_kind),
        "$sshr" => lower_sshr(ctx, name, cell),
        "$neg" => lower_neg(ctx, name, cell),
        t @ ("$lt" | "$gt" | "$le" | "$ge") => lower_compare(ctx, name, cell, t),
        other if ctx.children.contains_key(other) => lower_custom(ctx, name, cell, other),
        other => Err(AdapterError::UnknownCell(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::lower::ChildInfo;
    use std::collections::HashMap;

    fn test_cell(cell_type: &str, conns: &[(&str, Vec<RawBit>)]) -> SynthCell {
        let mut connections = HashMap::new();
        for (k, v) in conns {
            connections.insert((*k).to_string(), v.clone());
        }
        SynthCell {
            cell_type: cell_type.to_string(),
            parameters: HashMap::new(),
            connections,
        }
    }

    #[test]
    fn and_gate_wires_packed_io() {
        let children: HashMap<String, ChildInfo> = HashMap::new();
        let mut ctx = LoweringContext::new(&children);
        let cell = test_cell(
            "$and",
            &[
                ("A", vec![RawBit::Number(1)]),
                ("B", vec![RawBit::Number(2)]),
                ("Y", vec![RawBit::Number(3)]),
            ],
        );
        lower_cell(&mut ctx, "g1", &cell).unwrap();
        assert_eq!(ctx.netlist.component_count(), 1);
        let and = ctx.netlist.components().next().unwrap();
        assert_eq!(and.kind, ComponentKind::And1);
        assert!(ctx.netlist.net(&NetId::new("n3")).unwrap().has_source());
    }

    #[test]
    fn mux1_with_constant_a_skips_and_gate_for_term1() {
        let children: HashMap<String, ChildInfo> = HashMap::new();
        let mut ctx = LoweringContext::new(&children);
        let cell = test_cell(
            "$mux",
            &[
                ("A", vec![RawBit::Label("0".into())]),
                ("B", vec![RawBit::Number(1)]),
                ("S", vec![RawBit::Number(2)]),
                ("Y", vec![RawBit::Number(3)]),
            ],
        );
        lower_cell(&mut ctx, "m1", &cell).unwrap();
        let and_count = ctx
            .netlist
            .components()
            .filter(|c| c.kind == ComponentKind::And1)
            .count();
        assert_eq!(and_count, 1, "term1 should forward ¬S, skipping its AND gate");
        let or_count = ctx
            .netlist
            .components()
            .filter(|c| c.kind == ComponentKind::Or1)
            .count();
        assert_eq!(or_count, 1);
    }

    #[test]
    fn add_cell_wires_carry_in_and_out_when_present() {
        let children: HashMap<String, ChildInfo> = HashMap::new();
        let mut ctx = LoweringContext::new(&children);
        let a_bits: Vec<RawBit> = (0..8).map(RawBit::Number).collect();
        let b_bits: Vec<RawBit> = (8..16).map(RawBit::Number).collect();
        let y_bits: Vec<RawBit> = (16..24).map(RawBit::Number).collect();
        let cell = test_cell(
            "$add",
            &[
                ("A", a_bits),
                ("B", b_bits),
                ("Y", y_bits),
                ("CI", vec![RawBit::Number(24)]),
                ("CO", vec![RawBit::Number(25)]),
            ],
        );
        lower_cell(&mut ctx, "add1", &cell).unwrap();
        let add = ctx
            .netlist
            .components()
            .find(|c| c.kind == ComponentKind::Add8)
            .unwrap();
        assert!(add.net_of("carry_in").is_some());
        assert!(add.net_of("carry_out").is_some());
    }

    #[test]
    fn unknown_cell_type_is_rejected() {
        let children: HashMap<String, ChildInfo> = HashMap::new();
        let mut ctx = LoweringContext::new(&children);
        let cell = test_cell("$frobnicate", &[]);
        let err = lower_cell(&mut ctx, "x1", &cell).unwrap_err();
        assert!(matches!(err, AdapterError::UnknownCell(_)));
    }
}
