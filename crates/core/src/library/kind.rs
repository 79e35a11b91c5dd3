//! The closed set of primitive kinds the target grid sandbox understands.
//!
//! `ComponentKind` is the typed replacement for the "AND_" + width string
//! dispatch the host format actually uses on the wire: every kind still
//! carries a stable `u16` discriminant for serialization (`§4.6`), but
//! lookup into the library goes through [`crate::library::template`],
//! never through string concatenation.

use serde::{Deserialize, Serialize};

/// Bus width supported by the component library.
///
/// `W1` is the single-bit case; everything else is "a power-of-two wide
/// bus, rounded up to the smallest template that fits" per the width
/// resolution rule in the synthesis adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Width {
    W1,
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    /// All widths the library supports, narrowest first.
    pub const ALL: [Width; 5] = [Width::W1, Width::W8, Width::W16, Width::W32, Width::W64];

    /// Bit count represented by this width.
    pub fn bits(self) -> u32 {
        match self {
            Width::W1 => 1,
            Width::W8 => 8,
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }

    /// The smallest width whose bit count is >= `n`, or `None` if `n` exceeds 64.
    ///
    /// `n == 1` resolves to `W1`; every other size rounds up to the next
    /// power-of-two-ish bucket in `{8, 16, 32, 64}` per `spec.md` §4.3.
    pub fn smallest_fit(n: u32) -> Option<Width> {
        if n == 0 {
            return None;
        }
        if n == 1 {
            return Some(Width::W1);
        }
        Width::ALL
            .into_iter()
            .skip(1)
            .find(|w| w.bits() >= n)
    }

    /// The numeric suffix used in the template's `id()` string (`"AND_" + n`).
    pub fn suffix(self) -> u32 {
        self.bits()
    }
}

/// The closed set of primitive component kinds.
///
/// Serialized on the wire as a 16-bit integer (`spec.md` §4.6); the
/// discriminants below are the save format's actual kind codes and must
/// not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ComponentKind {
    // 1-bit gates
    And1 = 0,
    Or1 = 1,
    Xor1 = 2,
    Xnor1 = 3,
    Not1 = 4,

    // 1-bit constants
    Off = 5,
    On = 6,

    // Per-width gates
    And8 = 10,
    And16 = 11,
    And32 = 12,
    And64 = 13,
    Or8 = 14,
    Or16 = 15,
    Or32 = 16,
    Or64 = 17,
    Xor8 = 18,
    Xor16 = 19,
    Xor32 = 20,
    Xor64 = 21,
    Xnor8 = 22,
    Xnor16 = 23,
    Xnor32 = 24,
    Xnor64 = 25,
    Not8 = 26,
    Not16 = 27,
    Not32 = 28,
    Not64 = 29,

    // Per-width IO
    Input1 = 40,
    Input8 = 41,
    Input16 = 42,
    Input32 = 43,
    Input64 = 44,
    Output1 = 45,
    Output8 = 46,
    Output16 = 47,
    Output32 = 48,
    Output64 = 49,

    // Per-width constants
    Const8 = 55,
    Const16 = 56,
    Const32 = 57,
    Const64 = 58,

    // Per-width multiplexers
    Mux1 = 60,
    Mux8 = 61,
    Mux16 = 62,
    Mux32 = 63,
    Mux64 = 64,

    // Per-width makers
    Maker8 = 70,
    Maker16 = 71,
    Maker32 = 72,
    Maker64 = 73,

    // Per-width splitters
    Splitter8 = 80,
    Splitter16 = 81,
    Splitter32 = 82,
    Splitter64 = 83,

    // Per-width arithmetic
    Add8 = 90,
    Add16 = 91,
    Add32 = 92,
    Add64 = 93,
    Mul8 = 94,
    Mul16 = 95,
    Mul32 = 96,
    Mul64 = 97,
    Shl8 = 98,
    Shl16 = 99,
    Shl32 = 100,
    Shl64 = 101,
    Shr8 = 102,
    Shr16 = 103,
    Shr32 = 104,
    Shr64 = 105,
    AshR8 = 106,
    AshR16 = 107,
    AshR32 = 108,
    AshR64 = 109,
    Neg8 = 110,
    Neg16 = 111,
    Neg32 = 112,
    Neg64 = 113,

    // Per-width comparisons
    Equal8 = 120,
    Equal16 = 121,
    Equal32 = 122,
    Equal64 = 123,
    LessUnsigned8 = 124,
    LessUnsigned16 = 125,
    LessUnsigned32 = 126,
    LessUnsigned64 = 127,
    LessSigned8 = 128,
    LessSigned16 = 129,
    LessSigned32 = 130,
    LessSigned64 = 131,

    // Per-width registers + the 1-bit flip-flop
    Reg8 = 140,
    Reg16 = 141,
    Reg32 = 142,
    Reg64 = 143,
    FlipFlop1 = 144,

    // Hierarchical instance
    Custom = 200,
}

impl ComponentKind {
    /// Whether this kind is one of the IO kinds (drives layout layer pinning).
    pub fn is_input(self) -> bool {
        matches!(
            self,
            ComponentKind::Input1
                | ComponentKind::Input8
                | ComponentKind::Input16
                | ComponentKind::Input32
                | ComponentKind::Input64
        )
    }

    pub fn is_output(self) -> bool {
        matches!(
            self,
            ComponentKind::Output1
                | ComponentKind::Output8
                | ComponentKind::Output16
                | ComponentKind::Output32
                | ComponentKind::Output64
        )
    }

    /// Whether this kind carries a "selected program" tail in the save format.
    ///
    /// No program kind exists in this library; kept as an explicit `false`
    /// seam so the save writer's program-kind branch (`spec.md` §4.6) has a
    /// single place to flip on if the target host's program components are
    /// ever added to the catalogue.
    pub fn is_program(self) -> bool {
        false
    }

    /// The wire-format kind code (`spec.md` §4.6 "2 bytes kind").
    pub fn code(self) -> u16 {
        self as u16
    }
}
