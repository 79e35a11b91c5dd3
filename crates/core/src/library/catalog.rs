//! Template construction and the process-wide catalogue.
//!
//! Templates are built once, lazily, into a `HashMap<ComponentKind,
//! ComponentTemplate>` behind a `OnceLock` — process-wide, initialized once,
//! never mutated, exactly the lifecycle `spec.md` §3 assigns to the
//! library.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::kind::{ComponentKind, Width};
use super::template::{BoundingBox, ComponentTemplate, PortDirection, PortSpec, Point, Rotation};

fn port(id: &'static str, direction: PortDirection, x: i32, y: i32) -> PortSpec {
    PortSpec::new(id, direction, Point::new(x, y))
}

fn input(id: &'static str, x: i32, y: i32) -> PortSpec {
    port(id, PortDirection::Input, x, y)
}

fn output(id: &'static str, x: i32, y: i32) -> PortSpec {
    port(id, PortDirection::Output, x, y)
}

/// `AND`/`OR`/`XOR`/`XNOR`: two west inputs, one east output.
fn gate2(id: impl Into<String>, kind: ComponentKind, width: Width) -> ComponentTemplate {
    ComponentTemplate {
        id: id.into(),
        kind,
        width,
        default_rotation: Rotation::R0,
        ports: vec![input("A", 0, 0), input("B", 0, 2), output("Y", 2, 1)],
        bounds: BoundingBox::new(Point::new(0, 0), Point::new(2, 2)),
    }
}

/// `NOT`/`NEG`: one west input, one east output.
fn gate1(id: impl Into<String>, kind: ComponentKind, width: Width) -> ComponentTemplate {
    ComponentTemplate {
        id: id.into(),
        kind,
        width,
        default_rotation: Rotation::R0,
        ports: vec![input("A", 0, 0), output("Y", 2, 0)],
        bounds: BoundingBox::new(Point::new(0, 0), Point::new(2, 1)),
    }
}

/// Shift family: operand `A` and a `shift` amount, both west; `Y` east.
fn shifter(id: impl Into<String>, kind: ComponentKind, width: Width) -> ComponentTemplate {
    ComponentTemplate {
        id: id.into(),
        kind,
        width,
        default_rotation: Rotation::R0,
        ports: vec![
            input("A", 0, 0),
            input("shift", 0, 2),
            output("Y", 2, 1),
        ],
        bounds: BoundingBox::new(Point::new(0, 0), Point::new(2, 2)),
    }
}

fn io(id: impl Into<String>, kind: ComponentKind, width: Width, is_input: bool) -> ComponentTemplate {
    let ports = if is_input {
        vec![output("Y", 2, 0)]
    } else {
        vec![input("A", 0, 0)]
    };
    ComponentTemplate {
        id: id.into(),
        kind,
        width,
        default_rotation: Rotation::R0,
        ports,
        bounds: BoundingBox::new(Point::new(0, 0), Point::new(2, 0)),
    }
}

fn constant(id: impl Into<String>, kind: ComponentKind, width: Width) -> ComponentTemplate {
    ComponentTemplate {
        id: id.into(),
        kind,
        width,
        default_rotation: Rotation::R0,
        ports: vec![output("Y", 2, 0)],
        bounds: BoundingBox::new(Point::new(0, 0), Point::new(2, 0)),
    }
}

/// Multiplexer: `A` (top), `S` (middle), `B` (bottom), all west; `Y` east middle.
fn mux(id: impl Into<String>, kind: ComponentKind, width: Width) -> ComponentTemplate {
    ComponentTemplate {
        id: id.into(),
        kind,
        width,
        default_rotation: Rotation::R0,
        ports: vec![
            input("A", 0, 0),
            input("S", 0, 2),
            input("B", 0, 4),
            output("Y", 2, 2),
        ],
        bounds: BoundingBox::new(Point::new(0, 0), Point::new(2, 4)),
    }
}

/// Symmetric vertical pin spacing for `n` chunk/bit pins centered at y=0.
fn centered_ys(n: u32) -> Vec<i32> {
    let n = n as i32;
    (0..n).map(|i| 2 * i - (n - 1)).collect()
}

/// `n` singleton or chunk inputs (west, centered) driving one bus output `Y` (east).
fn maker(id: impl Into<String>, kind: ComponentKind, width: Width, pins: u32) -> ComponentTemplate {
    let ys = centered_ys(pins);
    let mut ports: Vec<PortSpec> = ys
        .iter()
        .enumerate()
        .map(|(i, &y)| input(pin_name(i), 0, y))
        .collect();
    ports.push(output("Y", 2, 0));
    let lo = *ys.first().unwrap_or(&0);
    let hi = *ys.last().unwrap_or(&0);
    ComponentTemplate {
        id: id.into(),
        kind,
        width,
        default_rotation: Rotation::R0,
        ports,
        bounds: BoundingBox::new(Point::new(0, lo), Point::new(2, hi)),
    }
}

/// One bus input `A` (west) driving `n` singleton or chunk outputs (east, centered).
fn splitter(id: impl Into<String>, kind: ComponentKind, width: Width, pins: u32) -> ComponentTemplate {
    let ys = centered_ys(pins);
    let mut ports = vec![input("A", 0, 0)];
    ports.extend(ys.iter().enumerate().map(|(i, &y)| output(pin_name_out(i), 2, y)));
    let lo = *ys.first().unwrap_or(&0);
    let hi = *ys.last().unwrap_or(&0);
    ComponentTemplate {
        id: id.into(),
        kind,
        width,
        default_rotation: Rotation::R0,
        ports,
        bounds: BoundingBox::new(Point::new(0, lo), Point::new(2, hi)),
    }
}

/// `in0`, `in1`, ... / `out0`, `out1`, ... — leaked once into a static table
/// indexed by bit position so maker/splitter pin names don't allocate per call.
fn pin_name(i: usize) -> &'static str {
    const NAMES: &[&str] = &[
        "in0", "in1", "in2", "in3", "in4", "in5", "in6", "in7",
    ];
    NAMES.get(i).copied().unwrap_or("inN")
}

fn pin_name_out(i: usize) -> &'static str {
    const NAMES: &[&str] = &[
        "out0", "out1", "out2", "out3", "out4", "out5", "out6", "out7",
    ];
    NAMES.get(i).copied().unwrap_or("outN")
}

/// Adder: `carry_in`/`A`/`B` west (top/middle/bottom), `sum`/`carry_out` east (top/middle).
fn adder(id: impl Into<String>, kind: ComponentKind, width: Width) -> ComponentTemplate {
    ComponentTemplate {
        id: id.into(),
        kind,
        width,
        default_rotation: Rotation::R0,
        ports: vec![
            input("carry_in", 0, 0),
            input("A", 0, 2),
            input("B", 0, 4),
            output("sum", 2, 0),
            output("carry_out", 2, 2),
        ],
        bounds: BoundingBox::new(Point::new(0, 0), Point::new(2, 4)),
    }
}

/// `load`/`save`/`value` west (top/middle/bottom), `out` east middle.
fn register(id: impl Into<String>, kind: ComponentKind, width: Width) -> ComponentTemplate {
    ComponentTemplate {
        id: id.into(),
        kind,
        width,
        default_rotation: Rotation::R0,
        ports: vec![
            input("load", 0, 0),
            input("save", 0, 2),
            input("value", 0, 4),
            output("out", 2, 2),
        ],
        bounds: BoundingBox::new(Point::new(0, 0), Point::new(2, 4)),
    }
}

/// The 1-bit flip-flop: no `load` port; `save` at y=-1, `value` at y=+1.
fn flip_flop1() -> ComponentTemplate {
    ComponentTemplate {
        id: "FLIPFLOP_1".into(),
        kind: ComponentKind::FlipFlop1,
        width: Width::W1,
        default_rotation: Rotation::R0,
        ports: vec![
            input("save", 0, -1),
            input("value", 0, 1),
            output("out", 2, 0),
        ],
        bounds: BoundingBox::new(Point::new(0, -1), Point::new(2, 1)),
    }
}

fn build_catalog() -> HashMap<ComponentKind, ComponentTemplate> {
    use ComponentKind as K;
    let mut map = HashMap::new();
    let mut put = |t: ComponentTemplate| {
        map.insert(t.kind, t);
    };

    // 1-bit gates.
    put(gate2("AND_1", K::And1, Width::W1));
    put(gate2("OR_1", K::Or1, Width::W1));
    put(gate2("XOR_1", K::Xor1, Width::W1));
    put(gate2("XNOR_1", K::Xnor1, Width::W1));
    put(gate1("NOT_1", K::Not1, Width::W1));

    // 1-bit constants.
    put(constant("OFF", K::Off, Width::W1));
    put(constant("ON", K::On, Width::W1));

    for w in [Width::W8, Width::W16, Width::W32, Width::W64] {
        let n = w.suffix();
        put(gate2(format!("AND_{n}"), and_kind(w), w));
        put(gate2(format!("OR_{n}"), or_kind(w), w));
        put(gate2(format!("XOR_{n}"), xor_kind(w), w));
        put(gate2(format!("XNOR_{n}"), xnor_kind(w), w));
        put(gate1(format!("NOT_{n}"), not_kind(w), w));
        put(constant(format!("CONST_{n}"), const_kind(w), w));
        put(adder(format!("ADD_{n}"), add_kind(w), w));
        put(gate2(format!("MUL_{n}"), mul_kind(w), w));
        put(shifter(format!("SHL_{n}"), shl_kind(w), w));
        put(shifter(format!("SHR_{n}"), shr_kind(w), w));
        put(shifter(format!("ASHR_{n}"), ashr_kind(w), w));
        put(gate1(format!("NEG_{n}"), neg_kind(w), w));
        put(gate2(format!("EQUAL_{n}"), equal_kind(w), w));
        put(gate2(format!("LESS_U_{n}"), less_unsigned_kind(w), w));
        put(gate2(format!("LESS_S_{n}"), less_signed_kind(w), w));
        put(register(format!("REG_{n}"), reg_kind(w), w));
    }
    put(flip_flop1());

    for w in [Width::W1, Width::W8, Width::W16, Width::W32, Width::W64] {
        let n = w.suffix();
        put(io(format!("INPUT_{n}"), input_kind(w), w, true));
        put(io(format!("OUTPUT_{n}"), output_kind(w), w, false));
        put(mux(format!("MUX_{n}"), mux_kind(w), w));
    }

    // Maker/splitter: per-bit pins at width 8, 8-bit-chunk pins above.
    put(maker("MAKER_8", K::Maker8, Width::W8, 8));
    put(maker("MAKER_16", K::Maker16, Width::W16, 2));
    put(maker("MAKER_32", K::Maker32, Width::W32, 4));
    put(maker("MAKER_64", K::Maker64, Width::W64, 8));
    put(splitter("SPLITTER_8", K::Splitter8, Width::W8, 8));
    put(splitter("SPLITTER_16", K::Splitter16, Width::W16, 2));
    put(splitter("SPLITTER_32", K::Splitter32, Width::W32, 4));
    put(splitter("SPLITTER_64", K::Splitter64, Width::W64, 8));

    // Custom: placeholder bounds; real instances carry their own bounding
    // box via the hierarchy driver's custom-component metadata.
    map.insert(
        K::Custom,
        ComponentTemplate {
            id: "CUSTOM".into(),
            kind: K::Custom,
            width: Width::W1,
            default_rotation: Rotation::R0,
            ports: vec![],
            bounds: BoundingBox::new(Point::new(0, 0), Point::new(0, 0)),
        },
    );

    map
}

static CATALOG: OnceLock<HashMap<ComponentKind, ComponentTemplate>> = OnceLock::new();

/// Look up a template by its kind. Every [`ComponentKind`] variant has an
/// entry; this never returns `None` for a kind produced by the `*_kind`
/// helpers below.
pub fn template(kind: ComponentKind) -> &'static ComponentTemplate {
    CATALOG
        .get_or_init(build_catalog)
        .get(&kind)
        .unwrap_or_else(|| panic!("component library missing template for {kind:?}"))
}

// ---------------------------------------------------------------------
// Typed `(family, width) -> ComponentKind` dispatch.
//
// Replaces the host's "AND_" + width string concatenation with a total
// function per family, per the REDESIGN FLAG in `spec.md` §9.
// ---------------------------------------------------------------------

macro_rules! width_dispatch {
    ($name:ident { W1 => $w1:expr, W8 => $w8:expr, W16 => $w16:expr, W32 => $w32:expr, W64 => $w64:expr $(,)? }) => {
        pub fn $name(w: Width) -> ComponentKind {
            match w {
                Width::W1 => $w1,
                Width::W8 => $w8,
                Width::W16 => $w16,
                Width::W32 => $w32,
                Width::W64 => $w64,
            }
        }
    };
}

width_dispatch!(and_kind { W1 => ComponentKind::And1, W8 => ComponentKind::And8, W16 => ComponentKind::And16, W32 => ComponentKind::And32, W64 => ComponentKind::And64 });
width_dispatch!(or_kind { W1 => ComponentKind::Or1, W8 => ComponentKind::Or8, W16 => ComponentKind::Or16, W32 => ComponentKind::Or32, W64 => ComponentKind::Or64 });
width_dispatch!(xor_kind { W1 => ComponentKind::Xor1, W8 => ComponentKind::Xor8, W16 => ComponentKind::Xor16, W32 => ComponentKind::Xor32, W64 => ComponentKind::Xor64 });
width_dispatch!(xnor_kind { W1 => ComponentKind::Xnor1, W8 => ComponentKind::Xnor8, W16 => ComponentKind::Xnor16, W32 => ComponentKind::Xnor32, W64 => ComponentKind::Xnor64 });
width_dispatch!(not_kind { W1 => ComponentKind::Not1, W8 => ComponentKind::Not8, W16 => ComponentKind::Not16, W32 => ComponentKind::Not32, W64 => ComponentKind::Not64 });
width_dispatch!(input_kind { W1 => ComponentKind::Input1, W8 => ComponentKind::Input8, W16 => ComponentKind::Input16, W32 => ComponentKind::Input32, W64 => ComponentKind::Input64 });
width_dispatch!(output_kind { W1 => ComponentKind::Output1, W8 => ComponentKind::Output8, W16 => ComponentKind::Output16, W32 => ComponentKind::Output32, W64 => ComponentKind::Output64 });
width_dispatch!(mux_kind { W1 => ComponentKind::Mux1, W8 => ComponentKind::Mux8, W16 => ComponentKind::Mux16, W32 => ComponentKind::Mux32, W64 => ComponentKind::Mux64 });
width_dispatch!(add_kind { W1 => ComponentKind::Add8, W8 => ComponentKind::Add8, W16 => ComponentKind::Add16, W32 => ComponentKind::Add32, W64 => ComponentKind::Add64 });
width_dispatch!(mul_kind { W1 => ComponentKind::Mul8, W8 => ComponentKind::Mul8, W16 => ComponentKind::Mul16, W32 => ComponentKind::Mul32, W64 => ComponentKind::Mul64 });
width_dispatch!(shl_kind { W1 => ComponentKind::Shl8, W8 => ComponentKind::Shl8, W16 => ComponentKind::Shl16, W32 => ComponentKind::Shl32, W64 => ComponentKind::Shl64 });
width_dispatch!(shr_kind { W1 => ComponentKind::Shr8, W8 => ComponentKind::Shr8, W16 => ComponentKind::Shr16, W32 => ComponentKind::Shr32, W64 => ComponentKind::Shr64 });
width_dispatch!(ashr_kind { W1 => ComponentKind::AshR8, W8 => ComponentKind::AshR8, W16 => ComponentKind::AshR16, W32 => ComponentKind::AshR32, W64 => ComponentKind::AshR64 });
width_dispatch!(neg_kind { W1 => ComponentKind::Neg8, W8 => ComponentKind::Neg8, W16 => ComponentKind::Neg16, W32 => ComponentKind::Neg32, W64 => ComponentKind::Neg64 });
width_dispatch!(equal_kind { W1 => ComponentKind::Equal8, W8 => ComponentKind::Equal8, W16 => ComponentKind::Equal16, W32 => ComponentKind::Equal32, W64 => ComponentKind::Equal64 });
width_dispatch!(less_unsigned_kind { W1 => ComponentKind::LessUnsigned8, W8 => ComponentKind::LessUnsigned8, W16 => ComponentKind::LessUnsigned16, W32 => ComponentKind::LessUnsigned32, W64 => ComponentKind::LessUnsigned64 });
width_dispatch!(less_signed_kind { W1 => ComponentKind::LessSigned8, W8 => ComponentKind::LessSigned8, W16 => ComponentKind::LessSigned16, W32 => ComponentKind::LessSigned32, W64 => ComponentKind::LessSigned64 });
width_dispatch!(const_kind { W1 => ComponentKind::Const8, W8 => ComponentKind::Const8, W16 => ComponentKind::Const16, W32 => ComponentKind::Const32, W64 => ComponentKind::Const64 });
width_dispatch!(reg_kind { W1 => ComponentKind::Reg8, W8 => ComponentKind::Reg8, W16 => ComponentKind::Reg16, W32 => ComponentKind::Reg32, W64 => ComponentKind::Reg64 });

/// Maker kind for a width; width 1 has no maker (a single bit needs no packing).
pub fn maker_kind(w: Width) -> Option<ComponentKind> {
    match w {
        Width::W1 => None,
        Width::W8 => Some(ComponentKind::Maker8),
        Width::W16 => Some(ComponentKind::Maker16),
        Width::W32 => Some(ComponentKind::Maker32),
        Width::W64 => Some(ComponentKind::Maker64),
    }
}

/// Splitter kind for a width; width 1 has no splitter.
pub fn splitter_kind(w: Width) -> Option<ComponentKind> {
    match w {
        Width::W1 => None,
        Width::W8 => Some(ComponentKind::Splitter8),
        Width::W16 => Some(ComponentKind::Splitter16),
        Width::W32 => Some(ComponentKind::Splitter32),
        Width::W64 => Some(ComponentKind::Splitter64),
    }
}

/// Number of pins (singleton bits below width 16, 8-bit chunks at/above it)
/// a maker/splitter of this width exposes on its fan side.
pub fn chunk_pin_count(w: Width) -> u32 {
    match w {
        Width::W1 => 0,
        Width::W8 => 8,
        Width::W16 => 2,
        Width::W32 => 4,
        Width::W64 => 8,
    }
}

/// Bit width carried by each pin of a maker/splitter of this width: 1 bit
/// at width 8 (per-bit pins), 8 bits above it (per-chunk pins).
pub fn chunk_pin_width(w: Width) -> u32 {
    match w {
        Width::W8 => 1,
        Width::W16 | Width::W32 | Width::W64 => 8,
        Width::W1 => 0,
    }
}

pub(crate) fn pin_name_in(i: usize) -> &'static str {
    pin_name(i)
}

pub(crate) fn pin_name_output(i: usize) -> &'static str {
    pin_name_out(i)
}
