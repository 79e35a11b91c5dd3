//! The seam to an external layered-graph layout engine.
//!
//! `spec.md` §1 names the layout oracle an out-of-scope external
//! collaborator — a real deployment shells out to a dedicated layered-graph
//! layout service. Since this repo has no such process to call, it ships
//! one concrete, swappable implementation: [`SugiyamaOracle`], a standard
//! longest-path layer assignment with a median-heuristic crossing pass and
//! naive orthogonal channel routing. It is a reference/default oracle, not
//! a polished layout engine — `spec.md` explicitly disclaims wire-crossing
//! minimization as a goal of the core.

use std::collections::HashMap;

use crate::library::Point;
use crate::model::ComponentId;
use crate::worker::ProgressMonitor;

use super::placement::{Placement, PlacedLayout, RoutedEdge};
use super::request::LayoutRequest;
use super::LayoutError;

/// Trait implemented by a layered-graph layout engine: assigns an integer
/// grid position to every node and routes an orthogonal polyline for
/// every edge. Swappable the way the teacher's `NetworkLayoutAlgorithm`
/// lets `DefaultEdgeLayout` stand in for `HierDAGLayout`/`WorldBankLayout`.
pub trait LayoutOracle {
    fn layout(
        &self,
        request: &LayoutRequest,
        monitor: &dyn ProgressMonitor,
    ) -> Result<PlacedLayout, LayoutError>;

    fn name(&self) -> &'static str;
}

const COLUMN_GAP: i32 = 4;
const ROW_GAP: i32 = 2;
const CROSSING_PASSES: usize = 4;

/// Longest-path layering + median-heuristic ordering + naive orthogonal
/// channel routing. The default, always-available [`LayoutOracle`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SugiyamaOracle;

impl SugiyamaOracle {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Drop back edges found by a DFS so the remaining graph is acyclic and
/// longest-path layering terminates. Registers close feedback loops
/// (value <- mux <- ... <- out), so a netlist is rarely itself a DAG.
fn acyclic_edges(
    nodes: &[ComponentId],
    adj: &HashMap<ComponentId, Vec<ComponentId>>,
) -> Vec<(ComponentId, ComponentId)> {
    let mut color: HashMap<ComponentId, Color> = nodes.iter().map(|&n| (n, Color::White)).collect();
    let mut keep = Vec::new();
    let mut stack: Vec<(ComponentId, usize)> = Vec::new();

    for &start in nodes {
        if color[&start] != Color::White {
            continue;
        }
        stack.push((start, 0));
        color.insert(start, Color::Gray);
        while let Some(&mut (n, ref mut idx)) = stack.last_mut() {
            let succs = adj.get(&n).map(Vec::as_slice).unwrap_or(&[]);
            if *idx < succs.len() {
                let s = succs[*idx];
                *idx += 1;
                match color.get(&s).copied().unwrap_or(Color::White) {
                    Color::White => {
                        keep.push((n, s));
                        color.insert(s, Color::Gray);
                        stack.push((s, 0));
                    }
                    Color::Gray => {} // back edge: drop
                    Color::Black => keep.push((n, s)), // forward/cross edge
                }
            } else {
                color.insert(n, Color::Black);
                stack.pop();
            }
        }
    }
    keep
}

/// Longest-path layer assignment over the acyclic edge set via Kahn's
/// algorithm, then clamp inputs to layer 0 and outputs to one past the
/// last non-output layer.
fn assign_layers(request: &LayoutRequest) -> HashMap<ComponentId, i32> {
    let ids: Vec<ComponentId> = request.nodes.iter().map(|n| n.id).collect();
    let mut adj: HashMap<ComponentId, Vec<ComponentId>> = HashMap::new();
    for e in &request.edges {
        adj.entry(e.source.component).or_default().push(e.sink.component);
    }
    let kept = acyclic_edges(&ids, &adj);

    let mut dag: HashMap<ComponentId, Vec<ComponentId>> = HashMap::new();
    let mut indegree: HashMap<ComponentId, u32> = ids.iter().map(|&n| (n, 0)).collect();
    for (a, b) in &kept {
        dag.entry(*a).or_default().push(*b);
        *indegree.entry(*b).or_insert(0) += 1;
    }

    let mut layer: HashMap<ComponentId, i32> = ids.iter().map(|&n| (n, 0)).collect();
    let mut queue: Vec<ComponentId> = ids.iter().copied().filter(|n| indegree[n] == 0).collect();
    let mut remaining = indegree.clone();
    let mut head = 0;
    while head < queue.len() {
        let n = queue[head];
        head += 1;
        let Some(succs) = dag.get(&n) else { continue };
        for &s in succs {
            let candidate = layer[&n] + 1;
            if candidate > layer[&s] {
                layer.insert(s, candidate);
            }
            let r = remaining.get_mut(&s).unwrap();
            *r -= 1;
            if *r == 0 {
                queue.push(s);
            }
        }
    }

    for node in &request.nodes {
        if node.pin_first_layer {
            layer.insert(node.id, 0);
        }
    }
    let last_non_output = request
        .nodes
        .iter()
        .filter(|n| !n.pin_last_layer)
        .map(|n| layer[&n.id])
        .max()
        .unwrap_or(0);
    for node in &request.nodes {
        if node.pin_last_layer {
            layer.insert(node.id, last_non_output + 1);
        }
    }
    layer
}

/// A handful of forward/backward median sweeps to reduce crossings within
/// each layer, without claiming to minimize them (`spec.md` §1 non-goal).
fn order_layers(
    request: &LayoutRequest,
    layer: &HashMap<ComponentId, i32>,
) -> HashMap<i32, Vec<ComponentId>> {
    let max_layer = layer.values().copied().max().unwrap_or(0);
    let mut layers: HashMap<i32, Vec<ComponentId>> = HashMap::new();
    for node in &request.nodes {
        layers.entry(layer[&node.id]).or_default().push(node.id);
    }
    let mut position: HashMap<ComponentId, usize> = HashMap::new();
    for l in 0..=max_layer {
        if let Some(nodes) = layers.get(&l) {
            for (i, n) in nodes.iter().enumerate() {
                position.insert(*n, i);
            }
        }
    }

    let mut neighbors: HashMap<ComponentId, Vec<ComponentId>> = HashMap::new();
    for e in &request.edges {
        neighbors.entry(e.source.component).or_default().push(e.sink.component);
        neighbors.entry(e.sink.component).or_default().push(e.source.component);
    }

    for _ in 0..CROSSING_PASSES {
        for l in 0..=max_layer {
            let Some(nodes) = layers.get(&l).cloned() else { continue };
            let mut scored: Vec<(f64, ComponentId)> = nodes
                .iter()
                .map(|&n| {
                    let mut ps: Vec<usize> = neighbors
                        .get(&n)
                        .into_iter()
                        .flatten()
                        .filter_map(|m| position.get(m).copied())
                        .collect();
                    let score = if ps.is_empty() {
                        position[&n] as f64
                    } else {
                        ps.sort_unstable();
                        ps[ps.len() / 2] as f64
                    };
                    (score, n)
                })
                .collect();
            scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
            let ordered: Vec<ComponentId> = scored.into_iter().map(|(_, n)| n).collect();
            for (i, n) in ordered.iter().enumerate() {
                position.insert(*n, i);
            }
            layers.insert(l, ordered);
        }
    }
    layers
}

impl LayoutOracle for SugiyamaOracle {
    fn layout(
        &self,
        request: &LayoutRequest,
        monitor: &dyn ProgressMonitor,
    ) -> Result<PlacedLayout, LayoutError> {
        if !monitor.keep_going() {
            return Err(LayoutError::Cancelled);
        }
        let layer = assign_layers(request);
        let ordered = order_layers(request, &layer);
        let max_layer = layer.values().copied().max().unwrap_or(0);

        let mut layer_width: HashMap<i32, i32> = HashMap::new();
        for node in &request.nodes {
            let w = layer_width.entry(layer[&node.id]).or_insert(0);
            *w = (*w).max(node.width);
        }
        let mut layer_x: HashMap<i32, i32> = HashMap::new();
        let mut x = 0;
        for l in 0..=max_layer {
            layer_x.insert(l, x);
            x += layer_width.get(&l).copied().unwrap_or(1) + COLUMN_GAP;
        }

        let mut placements = Vec::with_capacity(request.nodes.len());
        let mut position_of: HashMap<ComponentId, Point> = HashMap::new();
        for l in 0..=max_layer {
            let Some(nodes) = ordered.get(&l) else { continue };
            let total_height: i32 = nodes
                .iter()
                .map(|id| request.node(*id).map(|n| n.height).unwrap_or(1) + ROW_GAP)
                .sum();
            let mut y = -total_height / 2;
            for &id in nodes {
                let node = request.node(id).ok_or(LayoutError::MissingPlacement(id))?;
                let position = Point::new(layer_x[&l], y);
                position_of.insert(id, position);
                placements.push(Placement { component: id, position });
                y += node.height + ROW_GAP;
            }
        }

        let mut edges = Vec::with_capacity(request.edges.len());
        for e in &request.edges {
            let from = position_of
                .get(&e.source.component)
                .copied()
                .ok_or(LayoutError::MissingPlacement(e.source.component))?;
            let to = position_of
                .get(&e.sink.component)
                .copied()
                .ok_or(LayoutError::MissingPlacement(e.sink.component))?;
            let mid_x = (from.x + to.x) / 2;
            let points = vec![from, Point::new(mid_x, from.y), Point::new(mid_x, to.y), to];
            edges.push(RoutedEdge {
                source: e.source.clone(),
                sink: e.sink.clone(),
                points,
            });
        }

        Ok(PlacedLayout {
            placements,
            edges,
            compact: false,
        })
    }

    fn name(&self) -> &'static str {
        "Sugiyama Layered Layout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::ComponentKind;
    use crate::model::Netlist;
    use crate::worker::NoopMonitor;

    #[test]
    fn buffer_places_input_before_output() {
        let mut nl = Netlist::new();
        let input = nl.instantiate(ComponentKind::Input1);
        let output = nl.instantiate(ComponentKind::Output1);
        let net = crate::model::NetId::new("a");
        nl.register_source(&net, input, "Y").unwrap();
        nl.register_sink(&net, output, "A").unwrap();

        let request = super::super::request::build_request(&nl);
        let layout = SugiyamaOracle::new().layout(&request, &NoopMonitor).unwrap();
        let pin = layout.placement(input).unwrap().position;
        let pout = layout.placement(output).unwrap().position;
        assert!(pin.x < pout.x);
        assert_eq!(layout.edges.len(), 1);
    }

    #[test]
    fn feedback_loop_through_register_does_not_hang() {
        let mut nl = Netlist::new();
        let reg = nl.instantiate(ComponentKind::Reg8);
        let mux = nl.instantiate(ComponentKind::Mux8);
        let out_net = crate::model::NetId::new("q");
        nl.register_source(&out_net, reg, "out").unwrap();
        nl.register_sink(&out_net, mux, "A").unwrap();
        let fb_net = crate::model::NetId::new("fb");
        nl.register_source(&fb_net, mux, "Y").unwrap();
        nl.register_sink(&fb_net, reg, "value").unwrap();

        let request = super::super::request::build_request(&nl);
        let layout = SugiyamaOracle::new().layout(&request, &NoopMonitor).unwrap();
        assert_eq!(layout.placements.len(), 2);
    }
}
