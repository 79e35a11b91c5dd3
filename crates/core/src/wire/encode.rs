//! Endpoint forcing, densification, and direction+run-length encoding of
//! routed polylines (`spec.md` §4.5).

use std::collections::HashMap;

use crate::library::{self, ComponentKind, Point};
use crate::model::{ComponentInstance, CustomMetadata, Netlist};

use super::width::{self, WireKind};
use super::WireError;

/// One compass direction, ordered to match the save format's 3-bit index
/// (`spec.md` §4.5: "0..7 for E, SE, S, SW, W, NW, N, NE").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    E,
    SE,
    S,
    SW,
    W,
    NW,
    N,
    NE,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
        Direction::N,
        Direction::NE,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    /// (dx, dy) in grid coordinates; positive y is down.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::E => (1, 0),
            Direction::SE => (1, 1),
            Direction::S => (0, 1),
            Direction::SW => (-1, 1),
            Direction::W => (-1, 0),
            Direction::NW => (-1, -1),
            Direction::N => (0, -1),
            Direction::NE => (1, -1),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.delta() == (dx, dy))
    }
}

/// The run-length stream's terminator.
pub const TERMINATOR: u8 = 0x00;

/// Compact-mode teleport marker: a byte whose low 5 bits are zero, which
/// no valid run (length 1..31) ever produces, so it can never collide
/// with a real run byte or the all-zero terminator.
pub const TELEPORT_MARKER: u8 = 0x20;

/// Maximum run length a single byte can encode (5 bits).
const MAX_RUN: u32 = 31;

fn push_unit_steps(dense: &mut Vec<Point>, from: Point, to: Point) {
    let dx = (to.x - from.x).signum();
    let dy = (to.y - from.y).signum();
    let mut cur = from;
    while cur != to {
        cur = Point::new(cur.x + dx, cur.y + dy);
        dense.push(cur);
    }
}

/// Break diagonal segments into a pair of orthogonal moves via the
/// horizontally-aligned midpoint, then expand every remaining segment
/// into unit-length steps.
pub fn densify(points: &[Point]) -> Vec<Point> {
    let mut dense = Vec::new();
    let Some(&first) = points.first() else { return dense };
    dense.push(first);
    let mut cur = first;
    for &next in &points[1..] {
        if cur == next {
            continue;
        }
        if cur.x != next.x && cur.y != next.y {
            let mid = Point::new(next.x, cur.y);
            push_unit_steps(&mut dense, cur, mid);
            cur = mid;
        }
        push_unit_steps(&mut dense, cur, next);
        cur = next;
    }
    dense
}

/// Walk a dense unit-move polyline and accumulate consecutive moves in
/// the same compass direction into run bytes, terminated by a zero byte.
pub fn encode_runs(dense: &[Point]) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut i = 1;
    while i < dense.len() {
        let step = (dense[i].x - dense[i - 1].x, dense[i].y - dense[i - 1].y);
        let dir = Direction::from_delta(step.0, step.1)
            .expect("densify only emits unit compass-direction steps");
        let mut run = 1u32;
        i += 1;
        while i < dense.len() && run < MAX_RUN {
            let next_step = (dense[i].x - dense[i - 1].x, dense[i].y - dense[i - 1].y);
            if next_step != step {
                break;
            }
            run += 1;
            i += 1;
        }
        bytes.push((dir.index() << 5) | run as u8);
    }
    bytes.push(TERMINATOR);
    bytes
}

/// Decode a run-length body back into a dense unit-move polyline
/// (relative to an origin of (0, 0)), stopping at the terminator or a
/// teleport marker. Used to verify the round-trip law in `spec.md` §8.
pub fn decode_runs(body: &[u8]) -> Vec<Point> {
    let mut pos = Point::new(0, 0);
    let mut points = vec![pos];
    for &b in body {
        if b == TERMINATOR || b == TELEPORT_MARKER {
            break;
        }
        let dir = Direction::ALL[(b >> 5) as usize];
        let len = b & 0x1F;
        let (dx, dy) = dir.delta();
        for _ in 0..len {
            pos = Point::new(pos.x + dx, pos.y + dy);
            points.push(pos);
        }
    }
    points
}

/// One encoded wire (`spec.md` §3, §4.6).
#[derive(Debug, Clone)]
pub struct WireRecord {
    pub kind: WireKind,
    pub color: u8,
    pub comment: String,
    pub start: Point,
    pub body: Vec<u8>,
    pub end: Option<Point>,
}

/// The exact grid coordinate of `port` on `component`, placed at
/// `placement`: the template's port offset corrected by the bounding-box
/// origin, or -- for a `Custom` instance -- the child's exported port
/// position from its custom-component metadata.
pub fn port_point(
    component: &ComponentInstance,
    placement: Point,
    port: &str,
    custom_metadata: &HashMap<u64, CustomMetadata>,
) -> Option<Point> {
    if component.kind == ComponentKind::Custom {
        let id = component.metadata.custom_id?;
        let meta = custom_metadata.get(&id)?;
        let exported = meta.port(port)?;
        return Some(placement + exported.position);
    }
    let template = library::template(component.kind);
    let spec = template.port(port)?;
    Some(placement + (spec.position - template.bounds.min))
}

/// Build one [`WireRecord`] per routed edge: force endpoints to exact
/// port coordinates, densify and run-length encode the body (or emit a
/// one-byte teleport body in compact mode), and classify the wire's
/// width.
pub fn build_wire_records(
    netlist: &Netlist,
    layout: &crate::layout::PlacedLayout,
    custom_metadata: &HashMap<u64, CustomMetadata>,
) -> Result<Vec<WireRecord>, WireError> {
    let mut records = Vec::with_capacity(layout.edges.len());
    for edge in &layout.edges {
        let source = netlist
            .component(edge.source.component)
            .ok_or(WireError::MissingComponent(edge.source.component))?;
        let sink = netlist
            .component(edge.sink.component)
            .ok_or(WireError::MissingComponent(edge.sink.component))?;
        let source_placement = layout
            .placement(edge.source.component)
            .ok_or(WireError::MissingComponent(edge.source.component))?;
        let sink_placement = layout
            .placement(edge.sink.component)
            .ok_or(WireError::MissingComponent(edge.sink.component))?;

        let start = port_point(source, source_placement.position, &edge.source.port, custom_metadata)
            .ok_or_else(|| WireError::UnknownPort {
                component: edge.source.component,
                port: edge.source.port.clone(),
            })?;
        let end = port_point(sink, sink_placement.position, &edge.sink.port, custom_metadata).ok_or_else(|| {
            WireError::UnknownPort {
                component: edge.sink.component,
                port: edge.sink.port.clone(),
            }
        })?;

        let kind = width::classify_width(source, &edge.source.port, custom_metadata);

        let (body, teleport_end) = if edge.is_teleport() {
            (vec![TELEPORT_MARKER], Some(end))
        } else {
            let mut points = edge.points.clone();
            if let Some(p) = points.first_mut() {
                *p = start;
            }
            if let Some(p) = points.last_mut() {
                *p = end;
            }
            let dense = densify(&points);
            (encode_runs(&dense), None)
        };

        records.push(WireRecord {
            kind,
            color: 0,
            comment: String::new(),
            start,
            body,
            end: teleport_end,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_segment_splits_horizontal_then_vertical() {
        let points = vec![Point::new(0, 0), Point::new(3, 3)];
        let dense = densify(&points);
        assert_eq!(dense.first().copied().unwrap(), Point::new(0, 0));
        assert_eq!(dense.last().copied().unwrap(), Point::new(3, 3));
        assert!(dense.contains(&Point::new(3, 0)));
        for w in dense.windows(2) {
            let dx = (w[1].x - w[0].x).abs();
            let dy = (w[1].y - w[0].y).abs();
            assert!(dx + dy == 1, "dense polyline must move in unit orthogonal steps");
        }
    }

    #[test]
    fn run_length_encoding_round_trips() {
        let points = vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 5)];
        let dense = densify(&points);
        let body = encode_runs(&dense);
        assert_eq!(*body.last().unwrap(), TERMINATOR);
        let decoded = decode_runs(&body);
        assert_eq!(decoded, dense);
    }

    #[test]
    fn runs_longer_than_31_split_across_bytes() {
        let points = vec![Point::new(0, 0), Point::new(40, 0)];
        let dense = densify(&points);
        let body = encode_runs(&dense);
        // 40 unit moves needs ceil(40/31) = 2 run bytes plus the terminator.
        assert_eq!(body.len(), 3);
        let decoded = decode_runs(&body);
        assert_eq!(decoded, dense);
    }

    #[test]
    fn teleport_marker_is_distinct_from_every_run_byte() {
        for dir in Direction::ALL {
            for len in 1..=31u8 {
                assert_ne!((dir.index() << 5) | len, TELEPORT_MARKER);
            }
        }
        assert_ne!(TELEPORT_MARKER, TERMINATOR);
    }
}
