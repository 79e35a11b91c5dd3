//! Builds a layered-graph layout request from a netlist (`spec.md` §4.4).
//!
//! Every component becomes a node carrying its template's bounding-box
//! dimensions and a layer-pinning hint; every net source→sink pair
//! becomes one edge. Port-level geometry is resolved later, once the
//! oracle has assigned integer positions (`wire::endpoint`).

use crate::library;
use crate::model::{ComponentId, Netlist, PortRef};

/// One node in the layout request.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub id: ComponentId,
    pub width: i32,
    pub height: i32,
    /// Pin to the first layer (an `Input*` component).
    pub pin_first_layer: bool,
    /// Pin to the last layer (an `Output*` component).
    pub pin_last_layer: bool,
}

/// One net source→sink pair, to become a routed edge.
#[derive(Debug, Clone)]
pub struct LayoutEdge {
    pub source: PortRef,
    pub sink: PortRef,
}

/// The full layered-graph request handed to a [`super::oracle::LayoutOracle`].
#[derive(Debug, Clone, Default)]
pub struct LayoutRequest {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

impl LayoutRequest {
    pub fn node(&self, id: ComponentId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Build a [`LayoutRequest`] from a lowered netlist: one node per
/// component (dimensions from its template's bounding box), one edge per
/// net source→sink pair.
pub fn build_request(netlist: &Netlist) -> LayoutRequest {
    let mut nodes = Vec::with_capacity(netlist.component_count());
    for c in netlist.components() {
        let template = library::template(c.kind);
        nodes.push(LayoutNode {
            id: c.id,
            width: template.bounds.width().max(1),
            height: template.bounds.height().max(1),
            pin_first_layer: c.kind.is_input(),
            pin_last_layer: c.kind.is_output(),
        });
    }

    // `nets()` iterates a `HashMap`, whose order is randomized per
    // process; sort by net id first so edge order -- and thus wire order
    // in the save payload -- is stable across runs (spec.md §8).
    let mut net_ids: Vec<_> = netlist.nets().map(|(id, _)| id).collect();
    net_ids.sort();

    let mut edges = Vec::new();
    for net_id in net_ids {
        let net = netlist.net(net_id).expect("id came from nets()");
        let Some(source) = &net.source else { continue };
        for sink in &net.sinks {
            edges.push(LayoutEdge {
                source: source.clone(),
                sink: sink.clone(),
            });
        }
    }

    LayoutRequest { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::ComponentKind;

    #[test]
    fn buffer_netlist_yields_two_nodes_one_edge() {
        let mut nl = Netlist::new();
        let input = nl.instantiate(ComponentKind::Input1);
        let output = nl.instantiate(ComponentKind::Output1);
        let net = crate::model::NetId::new("a");
        nl.register_source(&net, input, "Y").unwrap();
        nl.register_sink(&net, output, "A").unwrap();

        let req = build_request(&nl);
        assert_eq!(req.nodes.len(), 2);
        assert_eq!(req.edges.len(), 1);
        assert!(req.node(input).unwrap().pin_first_layer);
        assert!(req.node(output).unwrap().pin_last_layer);
    }
}
