//! Post-lowering constant folding and dead-component cleanup, per
//! `spec.md` §4.3's optimization rules. Runs once per module, after every
//! cell has been lowered and every module output wired.

use std::collections::HashSet;

use crate::library::ComponentKind;
use crate::model::{ComponentId, NetId, Netlist};

/// Seed `zero_nets` with every net already driven by an `Off` constant
/// (literal 0 bits wired in during lowering), then fold away redundant
/// 1-bit AND gates and dead maker/splitter pairs to a fixpoint.
pub fn run(netlist: &mut Netlist, zero_nets: &mut HashSet<NetId>) {
    seed_zero_nets(netlist, zero_nets);
    loop {
        let mut changed = false;
        changed |= fold_redundant_and1_gates(netlist, zero_nets);
        changed |= merge_maker_after_splitter(netlist);
        changed |= prune_dead_makers_and_splitters(netlist);
        if !changed {
            break;
        }
    }
}

fn seed_zero_nets(netlist: &Netlist, zero_nets: &mut HashSet<NetId>) {
    for c in netlist.components() {
        if c.kind == ComponentKind::Off {
            if let Some(y) = c.net_of("Y") {
                zero_nets.insert(y.clone());
            }
        }
    }
}

/// A 1-bit `AND` with a known-zero operand always outputs zero: delete the
/// gate and re-drive its output net from a fresh `Off`, so later passes
/// (and other `AND` gates downstream of it) see the zero propagate.
fn fold_redundant_and1_gates(netlist: &mut Netlist, zero_nets: &mut HashSet<NetId>) -> bool {
    let candidates: Vec<ComponentId> = netlist
        .components()
        .filter(|c| c.kind == ComponentKind::And1)
        .filter(|c| {
            let a_zero = c.net_of("A").map(|n| zero_nets.contains(n)).unwrap_or(false);
            let b_zero = c.net_of("B").map(|n| zero_nets.contains(n)).unwrap_or(false);
            a_zero || b_zero
        })
        .map(|c| c.id)
        .collect();
    if candidates.is_empty() {
        return false;
    }
    for id in candidates {
        let Some(y) = netlist.component(id).and_then(|c| c.net_of("Y")).cloned() else {
            continue;
        };
        netlist.disconnect(id);
        if !zero_nets.contains(&y) {
            let off_id = netlist.instantiate(ComponentKind::Off);
            netlist
                .register_source(&y, off_id, "Y")
                .expect("just-disconnected net has no driver");
            zero_nets.insert(y);
        }
    }
    true
}

/// Whether a splitter's output pins feed, bit-for-bit (or chunk-for-chunk),
/// the matching input pins of a single maker of the same width -- undoing
/// it. Returns `(splitter's own bus net, the maker's id, the maker's bus
/// output net)` when the pattern matches exactly.
fn splitter_maker_merge_candidate(
    netlist: &Netlist,
    splitter_id: ComponentId,
    maker_kind: ComponentKind,
    pins: usize,
) -> Option<(NetId, ComponentId, NetId)> {
    let splitter = netlist.component(splitter_id)?;
    let bus = splitter.net_of("A")?.clone();
    let mut maker_id: Option<ComponentId> = None;
    for i in 0..pins {
        let pin = crate::library::catalog::pin_name_output(i);
        let out_net = splitter.net_of(pin)?.clone();
        let net_rec = netlist.net(&out_net)?;
        if net_rec.sinks.len() != 1 {
            return None;
        }
        let sink = &net_rec.sinks[0];
        let mc = netlist.component(sink.component)?;
        if mc.kind != maker_kind || sink.port != crate::library::catalog::pin_name_in(i) {
            return None;
        }
        match maker_id {
            None => maker_id = Some(sink.component),
            Some(existing) if existing == sink.component => {}
            _ => return None,
        }
    }
    let mid = maker_id?;
    let maker_y = netlist.component(mid)?.net_of("Y")?.clone();
    Some((bus, mid, maker_y))
}

fn merge_maker_after_splitter(netlist: &mut Netlist) -> bool {
    const GROUPS: [(ComponentKind, ComponentKind, usize); 4] = [
        (ComponentKind::Splitter8, ComponentKind::Maker8, 8),
        (ComponentKind::Splitter16, ComponentKind::Maker16, 2),
        (ComponentKind::Splitter32, ComponentKind::Maker32, 4),
        (ComponentKind::Splitter64, ComponentKind::Maker64, 8),
    ];
    let mut changed = false;
    for (splitter_kind, maker_kind, pins) in GROUPS {
        let splitter_ids: Vec<ComponentId> = netlist
            .components()
            .filter(|c| c.kind == splitter_kind)
            .map(|c| c.id)
            .collect();
        for sid in splitter_ids {
            if netlist.component(sid).is_none() {
                continue; // already removed by an earlier merge this pass
            }
            let Some((bus, mid, maker_y)) = splitter_maker_merge_candidate(netlist, sid, maker_kind, pins)
            else {
                continue;
            };
            let sinks = netlist.net(&maker_y).map(|n| n.sinks.clone()).unwrap_or_default();
            for s in &sinks {
                netlist
                    .register_sink(&bus, s.component, &s.port)
                    .expect("sink's component was just read from the live netlist");
            }
            netlist.disconnect(mid);
            netlist.disconnect(sid);
            netlist.remove_net(&maker_y);
            changed = true;
        }
    }
    changed
}

fn splitter_pin_count(kind: ComponentKind) -> u32 {
    match kind {
        ComponentKind::Splitter8 => 8,
        ComponentKind::Splitter16 => 2,
        ComponentKind::Splitter32 => 4,
        ComponentKind::Splitter64 => 8,
        _ => 0,
    }
}

/// Delete makers whose bus output has no sinks, and splitters all of whose
/// fan-out pins have no sinks -- the tail left behind once upstream passes
/// (here or in `pack`'s own round-trip erasure) stop using them.
fn prune_dead_makers_and_splitters(netlist: &mut Netlist) -> bool {
    let mut changed = false;

    let dead_makers: Vec<ComponentId> = netlist
        .components()
        .filter(|c| {
            matches!(
                c.kind,
                ComponentKind::Maker8 | ComponentKind::Maker16 | ComponentKind::Maker32 | ComponentKind::Maker64
            )
        })
        .filter(|c| {
            c.net_of("Y")
                .and_then(|y| netlist.net(y))
                .map(|n| n.sinks.is_empty())
                .unwrap_or(true)
        })
        .map(|c| c.id)
        .collect();
    for id in dead_makers {
        if let Some(y) = netlist.component(id).and_then(|c| c.net_of("Y")).cloned() {
            netlist.disconnect(id);
            netlist.remove_net(&y);
            changed = true;
        }
    }

    let dead_splitters: Vec<ComponentId> = netlist
        .components()
        .filter(|c| splitter_pin_count(c.kind) > 0)
        .filter(|c| {
            let pins = splitter_pin_count(c.kind);
            (0..pins).all(|i| {
                let pin = crate::library::catalog::pin_name_output(i as usize);
                c.net_of(pin)
                    .and_then(|n| netlist.net(n))
                    .map(|n| n.sinks.is_empty())
                    .unwrap_or(true)
            })
        })
        .map(|c| c.id)
        .collect();
    for id in dead_splitters {
        let incident: Vec<NetId> = netlist
            .component(id)
            .map(|c| c.connections.values().cloned().collect())
            .unwrap_or_default();
        netlist.disconnect(id);
        for net in incident {
            let now_empty = netlist
                .net(&net)
                .map(|n| n.sinks.is_empty() && n.source.is_none())
                .unwrap_or(false);
            if now_empty {
                netlist.remove_net(&net);
            }
        }
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::catalog;

    #[test]
    fn seed_zero_nets_finds_off_driven_nets() {
        let mut nl = Netlist::new();
        let off = nl.instantiate(ComponentKind::Off);
        let z = NetId::new("z");
        nl.register_source(&z, off, "Y").unwrap();
        let mut zero_nets = HashSet::new();
        seed_zero_nets(&nl, &mut zero_nets);
        assert!(zero_nets.contains(&z));
    }

    #[test]
    fn redundant_and1_chain_folds_and_cascades() {
        let mut nl = Netlist::new();
        let off = nl.instantiate(ComponentKind::Off);
        let z0 = NetId::new("z0");
        nl.register_source(&z0, off, "Y").unwrap();

        let x = NetId::new("x");
        let x_src = nl.instantiate(ComponentKind::On);
        nl.register_source(&x, x_src, "Y").unwrap();

        let and1 = nl.instantiate(ComponentKind::And1);
        nl.register_sink(&z0, and1, "A").unwrap();
        nl.register_sink(&x, and1, "B").unwrap();
        let y0 = NetId::new("y0");
        nl.register_source(&y0, and1, "Y").unwrap();

        let w = NetId::new("w");
        let w_src = nl.instantiate(ComponentKind::On);
        nl.register_source(&w, w_src, "Y").unwrap();

        let and2 = nl.instantiate(ComponentKind::And1);
        nl.register_sink(&y0, and2, "A").unwrap();
        nl.register_sink(&w, and2, "B").unwrap();
        let y1 = NetId::new("y1");
        nl.register_source(&y1, and2, "Y").unwrap();

        let mut zero_nets = HashSet::new();
        run(&mut nl, &mut zero_nets);

        assert!(nl.component(and1).is_none());
        assert!(nl.component(and2).is_none());
        assert!(zero_nets.contains(&y1));
        assert!(nl.net(&y1).unwrap().has_source());
    }

    #[test]
    fn splitter_immediately_followed_by_matching_maker_is_erased() {
        let mut nl = Netlist::new();
        let bus_in = NetId::new("bus_in");
        let driver = nl.instantiate(ComponentKind::Input8);
        nl.register_source(&bus_in, driver, "Y").unwrap();

        let splitter = nl.instantiate(ComponentKind::Splitter8);
        nl.register_sink(&bus_in, splitter, "A").unwrap();
        let maker = nl.instantiate(ComponentKind::Maker8);
        let mut pin_nets = Vec::new();
        for i in 0..8 {
            let pin_net = NetId::new(format!("pin{i}"));
            nl.register_source(&pin_net, splitter, catalog::pin_name_output(i))
                .unwrap();
            nl.register_sink(&pin_net, maker, catalog::pin_name_in(i)).unwrap();
            pin_nets.push(pin_net);
        }
        let bus_out = NetId::new("bus_out");
        nl.register_source(&bus_out, maker, "Y").unwrap();
        let consumer = nl.instantiate(ComponentKind::Output8);
        nl.register_sink(&bus_out, consumer, "A").unwrap();

        let mut zero_nets = HashSet::new();
        run(&mut nl, &mut zero_nets);

        assert!(nl.component(splitter).is_none());
        assert!(nl.component(maker).is_none());
        assert_eq!(nl.component(consumer).unwrap().net_of("A"), Some(&bus_in));
        for pin_net in &pin_nets {
            assert!(nl.net(pin_net).is_none());
        }
    }

    #[test]
    fn dead_splitter_with_unused_outputs_is_pruned() {
        let mut nl = Netlist::new();
        let bus = NetId::new("bus");
        let driver = nl.instantiate(ComponentKind::Input8);
        nl.register_source(&bus, driver, "Y").unwrap();
        let splitter = nl.instantiate(ComponentKind::Splitter8);
        nl.register_sink(&bus, splitter, "A").unwrap();
        for i in 0..8 {
            let pin_net = NetId::new(format!("dangling{i}"));
            nl.register_source(&pin_net, splitter, catalog::pin_name_output(i))
                .unwrap();
        }

        let mut zero_nets = HashSet::new();
        run(&mut nl, &mut zero_nets);

        assert!(nl.component(splitter).is_none());
    }
}
