//! The component library: `spec.md` §4.1.
//!
//! A closed catalogue of primitive kinds, their grid bounds, port
//! positions/directions, and default rotations. Lookup is a typed
//! `template(kind)` function backed by a process-wide, lazily-built,
//! read-only table — never a runtime string-concatenation dispatch.

pub mod catalog;
pub mod kind;
pub mod template;

pub use catalog::{
    and_kind, add_kind, ashr_kind, chunk_pin_count, chunk_pin_width, const_kind, equal_kind,
    less_signed_kind, less_unsigned_kind, maker_kind, mul_kind, mux_kind, neg_kind, not_kind,
    or_kind, output_kind, input_kind, reg_kind, shl_kind, shr_kind, splitter_kind, template,
    xnor_kind, xor_kind,
};
pub use kind::{ComponentKind, Width};
pub use template::{BoundingBox, ComponentTemplate, PortDirection, PortSpec, Point, Rotation};

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("unknown port `{port}` on template `{template}`")]
    UnknownPort { template: String, port: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_template() {
        // Sample one width per arithmetic family plus the fixed-width kinds.
        for w in Width::ALL {
            let _ = template(and_kind(w));
            let _ = template(or_kind(w));
            let _ = template(xor_kind(w));
            let _ = template(xnor_kind(w));
            let _ = template(not_kind(w));
            let _ = template(input_kind(w));
            let _ = template(output_kind(w));
            let _ = template(mux_kind(w));
        }
        for w in [Width::W8, Width::W16, Width::W32, Width::W64] {
            let _ = template(add_kind(w));
            let _ = template(mul_kind(w));
            let _ = template(shl_kind(w));
            let _ = template(shr_kind(w));
            let _ = template(ashr_kind(w));
            let _ = template(neg_kind(w));
            let _ = template(equal_kind(w));
            let _ = template(less_unsigned_kind(w));
            let _ = template(less_signed_kind(w));
            let _ = template(const_kind(w));
            let _ = template(reg_kind(w));
            assert!(maker_kind(w).is_some());
            assert!(splitter_kind(w).is_some());
            let _ = template(maker_kind(w).unwrap());
            let _ = template(splitter_kind(w).unwrap());
        }
        assert!(maker_kind(Width::W1).is_none());
        assert!(splitter_kind(Width::W1).is_none());
        let _ = template(ComponentKind::FlipFlop1);
        let _ = template(ComponentKind::Off);
        let _ = template(ComponentKind::On);
    }

    #[test]
    fn gate_ports_on_expected_sides() {
        let t = template(ComponentKind::And1);
        assert_eq!(t.inputs().count(), 2);
        assert_eq!(t.outputs().count(), 1);
        assert_eq!(t.port("Y").unwrap().position.x, t.bounds.max.x);
    }

    #[test]
    fn adder_exposes_five_ports() {
        let t = template(ComponentKind::Add8);
        assert_eq!(t.ports.len(), 5);
        assert!(t.port("carry_in").unwrap().position.y < t.port("B").unwrap().position.y);
    }

    #[test]
    fn flip_flop_has_no_load_port() {
        let t = template(ComponentKind::FlipFlop1);
        assert!(t.port("load").is_none());
        assert_eq!(t.port("save").unwrap().position.y, -1);
        assert_eq!(t.port("value").unwrap().position.y, 1);
    }

    #[test]
    fn maker_chunking_above_width_16() {
        assert_eq!(chunk_pin_count(Width::W8), 8);
        assert_eq!(chunk_pin_count(Width::W16), 2);
        assert_eq!(chunk_pin_width(Width::W8), 1);
        assert_eq!(chunk_pin_width(Width::W16), 8);

        let m16 = template(maker_kind(Width::W16).unwrap());
        assert_eq!(m16.inputs().count(), 2);
        let m8 = template(maker_kind(Width::W8).unwrap());
        assert_eq!(m8.inputs().count(), 8);
    }

    #[test]
    fn maker_pins_are_vertically_centered() {
        let t = template(maker_kind(Width::W8).unwrap());
        let sum: i32 = t.inputs().map(|p| p.position.y).sum();
        assert_eq!(sum, 0);
    }
}
