//! The three post-oracle passes (`spec.md` §4.4): IO alignment, optional
//! compact packing, and centering. `run` composes the oracle call with all
//! three in order.

use crate::library::Point;
use crate::model::ComponentId;
use crate::worker::ProgressMonitor;

use super::oracle::LayoutOracle;
use super::placement::PlacedLayout;
use super::request::LayoutRequest;
use super::LayoutError;

const COLUMN_GAP: i32 = 4;
const ROW_GAP: i32 = 2;

/// Knobs tunable from the CLI, collected the way the teacher's
/// `LayoutParams` collects its own layout-call knobs.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Enable compact column packing and teleport wires.
    pub compact: bool,
    /// Disable the synthesizer's hierarchy-flattening pass (submodules
    /// are preserved by attribute injection regardless, `spec.md` §4.7).
    pub no_flatten: bool,
    /// Grid-cell margin beyond the leftmost input / rightmost output.
    pub io_margin: i32,
    /// Per-slot height (in grid cells) for IO nodes in compact mode.
    pub compact_io_slot_height: i32,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            compact: false,
            no_flatten: false,
            io_margin: 10,
            compact_io_slot_height: 10,
        }
    }
}

/// Inputs are shifted left by `margin` beyond the leftmost input, outputs
/// right of the rightmost by the same margin, so every input lands in one
/// vertical column on the left and every output in one on the right.
pub fn io_alignment(layout: &mut PlacedLayout, request: &LayoutRequest, margin: i32) {
    let leftmost_input = layout
        .placements
        .iter()
        .filter(|p| request.node(p.component).map(|n| n.pin_first_layer).unwrap_or(false))
        .map(|p| p.position.x)
        .min();
    if let Some(lx) = leftmost_input {
        let target = lx - margin;
        for p in layout.placements.iter_mut() {
            if request.node(p.component).map(|n| n.pin_first_layer).unwrap_or(false) {
                p.position.x = target;
            }
        }
    }

    let rightmost_output = layout
        .placements
        .iter()
        .filter(|p| request.node(p.component).map(|n| n.pin_last_layer).unwrap_or(false))
        .map(|p| p.position.x)
        .max();
    if let Some(rx) = rightmost_output {
        let target = rx + margin;
        for p in layout.placements.iter_mut() {
            if request.node(p.component).map(|n| n.pin_last_layer).unwrap_or(false) {
                p.position.x = target;
            }
        }
    }
}

/// Pack one ordered group of nodes into columns of (approximately)
/// `col_height`, returning the x coordinate the next group should start
/// at. `fixed_slot`, when set, gives every node in the group the same
/// height (used for IO columns so bus connections line up vertically).
fn pack_group(
    layout: &mut PlacedLayout,
    request: &LayoutRequest,
    ids: &[ComponentId],
    start_x: i32,
    col_height: i32,
    fixed_slot: Option<i32>,
) -> i32 {
    let mut x = start_x;
    let mut col_width = 0;
    let mut y = 0;
    for &id in ids {
        let Some(node) = request.node(id) else { continue };
        let h = fixed_slot.unwrap_or(node.height);
        if y > 0 && y + h > col_height {
            x += col_width + COLUMN_GAP;
            col_width = 0;
            y = 0;
        }
        if let Some(p) = layout.placement_mut(id) {
            p.position = Point::new(x, y);
        }
        col_width = col_width.max(node.width);
        y += h + ROW_GAP;
    }
    x + col_width + COLUMN_GAP
}

/// Re-linearize the oracle's placement in x order, then repack into
/// columns whose height is approximately √(total area), at least as tall
/// as the tallest single element. Inputs, logic, and outputs are packed
/// as three separate column groups in that order. Routed polylines are
/// discarded in favor of teleport wires (`spec.md` §4.4, §4.5).
pub fn compact_pack(layout: &mut PlacedLayout, request: &LayoutRequest, io_slot_height: i32) {
    let mut ordered: Vec<ComponentId> = layout.placements.iter().map(|p| p.component).collect();
    ordered.sort_by_key(|id| layout.placement(*id).map(|p| p.position.x).unwrap_or(0));

    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    let mut logic = Vec::new();
    for id in ordered {
        match request.node(id) {
            Some(n) if n.pin_first_layer => inputs.push(id),
            Some(n) if n.pin_last_layer => outputs.push(id),
            _ => logic.push(id),
        }
    }

    let total_area: i64 = request
        .nodes
        .iter()
        .map(|n| i64::from(n.width) * i64::from(n.height))
        .sum();
    let tallest = request.nodes.iter().map(|n| n.height).max().unwrap_or(1);
    let col_height = (total_area as f64).sqrt().ceil() as i32;
    let col_height = col_height.max(tallest);

    let mut x = 0;
    x = pack_group(layout, request, &inputs, x, col_height, Some(io_slot_height));
    x = pack_group(layout, request, &logic, x, col_height, None);
    pack_group(layout, request, &outputs, x, col_height, Some(io_slot_height));

    for e in layout.edges.iter_mut() {
        e.points.clear();
    }
    layout.compact = true;
}

/// Translate every placement and edge point by the integer negation of
/// the axis-aligned bounding box center. Running this twice gives the
/// same result as running it once, up to the rounding of integer
/// division (`spec.md` §8's centering-idempotence law).
pub fn center(layout: &mut PlacedLayout, request: &LayoutRequest) {
    let mut min = Point::new(i32::MAX, i32::MAX);
    let mut max = Point::new(i32::MIN, i32::MIN);
    let mut touched = false;

    for p in &layout.placements {
        touched = true;
        let (w, h) = request.node(p.component).map(|n| (n.width, n.height)).unwrap_or((0, 0));
        min.x = min.x.min(p.position.x);
        min.y = min.y.min(p.position.y);
        max.x = max.x.max(p.position.x + w);
        max.y = max.y.max(p.position.y + h);
    }
    for e in &layout.edges {
        for pt in &e.points {
            touched = true;
            min.x = min.x.min(pt.x);
            min.y = min.y.min(pt.y);
            max.x = max.x.max(pt.x);
            max.y = max.y.max(pt.y);
        }
    }
    if !touched {
        return;
    }

    let center = Point::new((min.x + max.x) / 2, (min.y + max.y) / 2);
    for p in layout.placements.iter_mut() {
        p.position = p.position - center;
    }
    for e in layout.edges.iter_mut() {
        for pt in e.points.iter_mut() {
            *pt = *pt - center;
        }
    }
}

/// Invoke the oracle, then run IO alignment, optional compact packing,
/// and centering in order.
pub fn run(
    request: &LayoutRequest,
    oracle: &dyn LayoutOracle,
    options: &CompileOptions,
    monitor: &dyn ProgressMonitor,
) -> Result<PlacedLayout, LayoutError> {
    let mut layout = oracle.layout(request, monitor)?;
    io_alignment(&mut layout, request, options.io_margin);
    if options.compact {
        compact_pack(&mut layout, request, options.compact_io_slot_height);
    }
    center(&mut layout, request);
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::oracle::SugiyamaOracle;
    use crate::layout::request::build_request;
    use crate::library::ComponentKind;
    use crate::model::Netlist;
    use crate::worker::NoopMonitor;

    fn buffer_netlist() -> Netlist {
        let mut nl = Netlist::new();
        let input = nl.instantiate(ComponentKind::Input1);
        let output = nl.instantiate(ComponentKind::Output1);
        let net = crate::model::NetId::new("a");
        nl.register_source(&net, input, "Y").unwrap();
        nl.register_sink(&net, output, "A").unwrap();
        nl
    }

    #[test]
    fn centering_is_idempotent() {
        let nl = buffer_netlist();
        let request = build_request(&nl);
        let mut layout = SugiyamaOracle::new().layout(&request, &NoopMonitor).unwrap();
        center(&mut layout, &request);
        let once: Vec<Point> = layout.placements.iter().map(|p| p.position).collect();
        center(&mut layout, &request);
        let twice: Vec<Point> = layout.placements.iter().map(|p| p.position).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn io_alignment_puts_inputs_in_one_column() {
        let mut nl = Netlist::new();
        let in1 = nl.instantiate(ComponentKind::Input1);
        let in2 = nl.instantiate(ComponentKind::Input1);
        let and = nl.instantiate(ComponentKind::And1);
        let out = nl.instantiate(ComponentKind::Output1);
        let a = crate::model::NetId::new("a");
        let b = crate::model::NetId::new("b");
        let y = crate::model::NetId::new("y");
        nl.register_source(&a, in1, "Y").unwrap();
        nl.register_source(&b, in2, "Y").unwrap();
        nl.register_sink(&a, and, "A").unwrap();
        nl.register_sink(&b, and, "B").unwrap();
        nl.register_source(&y, and, "Y").unwrap();
        nl.register_sink(&y, out, "A").unwrap();

        let request = build_request(&nl);
        let options = CompileOptions::default();
        let layout = run(&request, &SugiyamaOracle::new(), &options, &NoopMonitor).unwrap();
        assert_eq!(
            layout.placement(in1).unwrap().position.x,
            layout.placement(in2).unwrap().position.x
        );
    }

    #[test]
    fn compact_mode_clears_edge_points() {
        let nl = buffer_netlist();
        let request = build_request(&nl);
        let mut options = CompileOptions::default();
        options.compact = true;
        let layout = run(&request, &SugiyamaOracle::new(), &options, &NoopMonitor).unwrap();
        assert!(layout.compact);
        assert!(layout.edges.iter().all(|e| e.is_teleport()));
    }
}
