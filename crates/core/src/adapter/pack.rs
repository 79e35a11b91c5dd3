//! `Pack`/`Unpack`: converting between a list of single-bit nets and one
//! bus net, per `spec.md` §4.3.

use crate::library::{self, ComponentKind, Width};
use crate::model::NetId;

use super::lower::LoweringContext;
use super::synth_json::ConstantBit;
use super::AdapterError;

/// Pad `bits` with fresh constant-0 nets up to `to` entries.
fn pad(ctx: &mut LoweringContext, bits: &[NetId], to: usize) -> Vec<NetId> {
    let mut out = bits.to_vec();
    while out.len() < to {
        out.push(ctx.zero_bit());
    }
    out
}

/// `size == 1`'s degenerate cases aside, detect rule 3: `bits` is, in
/// order, the full output set of some splitter of the same size whose
/// own input is a bus. Returns that splitter's input net id if so.
fn splitter_round_trip(ctx: &LoweringContext, bits: &[NetId], size: Width) -> Option<NetId> {
    let splitter_kind = library::splitter_kind(size)?;
    let pins = library::chunk_pin_count(size) as usize;
    if bits.len() != pins {
        return None;
    }
    let first_src = ctx.netlist.net(&bits[0])?.source.as_ref()?;
    let splitter_id = first_src.component;
    let component = ctx.netlist.component(splitter_id)?;
    if component.kind != splitter_kind {
        return None;
    }
    for (i, bit) in bits.iter().enumerate() {
        let src = ctx.netlist.net(bit)?.source.as_ref()?;
        if src.component != splitter_id || src.port != library::catalog::pin_name_output(i) {
            return None;
        }
    }
    component.net_of("A").cloned()
}

/// All of `bits` are known-constant at lowering time; returns the
/// concatenated value (bit `i` at position `i`, LSB-first) if so.
fn all_constant_value(ctx: &LoweringContext, bits: &[NetId]) -> Option<u64> {
    let mut value: u64 = 0;
    for (i, bit) in bits.iter().enumerate() {
        let v = ctx.const_value(bit)?;
        value |= (v & 1) << i;
    }
    Some(value)
}

fn const_template_kind(size: Width) -> ComponentKind {
    library::const_kind(size)
}

/// `Pack(bits, size)`: see `spec.md` §4.3 for the five-rule contract.
pub fn pack(ctx: &mut LoweringContext, bits: &[NetId], size: Width) -> Result<NetId, AdapterError> {
    // Rule 1: size == 1 forwards the single bit directly.
    if size == Width::W1 {
        return Ok(bits.first().cloned().unwrap_or_else(|| ctx.zero_bit()));
    }

    // Rule 2: all-constant short-circuit.
    let padded = pad(ctx, bits, size.bits() as usize);
    if let Some(value) = all_constant_value(ctx, &padded) {
        let out = ctx.fresh_net();
        let id = ctx.instantiate(const_template_kind(size));
        ctx.netlist.component_mut(id).unwrap().metadata.setting = value as i64;
        ctx.netlist.register_source(&out, id, "Y")?;
        ctx.record_const_value(out.clone(), value);
        return Ok(out);
    }

    // Rule 3: splitter round-trip erasure.
    if let Some(upstream) = splitter_round_trip(ctx, &padded, size) {
        return Ok(upstream);
    }

    let bits_per_pin = library::chunk_pin_width(size);
    let pins = library::chunk_pin_count(size) as usize;
    let maker_kind = library::maker_kind(size).expect("size != W1 always has a maker");
    let id = ctx.instantiate(maker_kind);
    let out = ctx.fresh_net();

    if size.bits() > 8 {
        // Rule 4: chunked maker, chunk inputs packed recursively.
        for (i, chunk) in padded.chunks(bits_per_pin as usize).enumerate() {
            let chunk_net = pack(ctx, chunk, Width::W8)?;
            ctx.netlist
                .register_sink(&chunk_net, id, library::catalog::pin_name_in(i))?;
        }
    } else {
        // Rule 5: flat maker, one pin per bit.
        for (i, bit) in padded.iter().enumerate().take(pins) {
            ctx.netlist
                .register_sink(bit, id, library::catalog::pin_name_in(i))?;
        }
    }
    ctx.netlist.register_source(&out, id, "Y")?;
    Ok(out)
}

/// `Unpack(bus, bits, size)`: drives each of `bits` from `bus`.
pub fn unpack(
    ctx: &mut LoweringContext,
    bus: NetId,
    bits: &[NetId],
    size: Width,
) -> Result<(), AdapterError> {
    if size == Width::W1 {
        if let Some(target) = bits.first() {
            let src = ctx
                .netlist
                .net(&bus)
                .and_then(|n| n.source.clone())
                .expect("bus net must be driven before unpacking");
            ctx.netlist.register_source(target, src.component, &src.port)?;
        }
        return Ok(());
    }

    let bits_per_pin = library::chunk_pin_width(size) as usize;
    let splitter_kind = library::splitter_kind(size).expect("size != W1 always has a splitter");
    let id = ctx.instantiate(splitter_kind);
    ctx.netlist.register_sink(&bus, id, "A")?;

    if size.bits() > 8 {
        for (i, chunk) in bits.chunks(bits_per_pin).enumerate() {
            let chunk_net = ctx.fresh_net();
            ctx.netlist
                .register_source(&chunk_net, id, library::catalog::pin_name_output(i))?;
            unpack(ctx, chunk_net, chunk, Width::W8)?;
        }
    } else {
        for (i, bit) in bits.iter().enumerate() {
            ctx.netlist
                .register_source(bit, id, library::catalog::pin_name_output(i))?;
        }
    }
    Ok(())
}

/// Convenience used by cell-lowering code that needs a same-width
/// constant-driven net for a literal value (e.g. SRST_VALUE, all-ones masks).
pub fn pack_constant(ctx: &mut LoweringContext, value: u64, size: Width) -> Result<NetId, AdapterError> {
    if size == Width::W1 {
        return Ok(if value & 1 == 1 {
            let net = ctx.fresh_net();
            ctx.ensure_constant_driver(&net, ConstantBit::One);
            net
        } else {
            ctx.zero_bit()
        });
    }
    let out = ctx.fresh_net();
    let id = ctx.instantiate(const_template_kind(size));
    ctx.netlist.component_mut(id).unwrap().metadata.setting = value as i64;
    ctx.netlist.register_source(&out, id, "Y")?;
    ctx.record_const_value(out.clone(), value);
    Ok(out)
}
