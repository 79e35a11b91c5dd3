//! The input contract: synthesizer JSON (`spec.md` §4.3, §6).
//!
//! Consumed only as `modules[topName].ports` and `modules[topName].cells`;
//! every other top-level key in a real synthesizer dump is ignored.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// One bit reference as it appears in a connections/ports bit list: a
/// synthesizer net id, or a quoted literal/constant marker.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawBit {
    Number(u64),
    Label(String),
}

/// A bit reference after classification, still synthesizer-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthBit {
    /// A synthesizer-numbered net.
    Numbered(u64),
    /// A constant literal. `x`/`z` collapse to the same treatment as `0`.
    Constant(ConstantBit),
    /// An already-named bit (rare; emitted by some synthesizers for
    /// inlined constants or aliases).
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantBit {
    Zero,
    One,
}

impl RawBit {
    pub fn classify(&self) -> SynthBit {
        match self {
            RawBit::Number(n) => SynthBit::Numbered(*n),
            RawBit::Label(s) => match s.as_str() {
                "0" | "x" | "z" => SynthBit::Constant(ConstantBit::Zero),
                "1" => SynthBit::Constant(ConstantBit::One),
                other => SynthBit::Named(other.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
    Inout,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SynthPort {
    pub direction: PortDirection,
    pub bits: Vec<RawBit>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SynthCell {
    #[serde(rename = "type")]
    pub cell_type: String,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
    pub connections: HashMap<String, Vec<RawBit>>,
}

impl SynthCell {
    /// A string parameter, if present.
    pub fn param_str(&self, name: &str) -> Option<String> {
        self.parameters.get(name).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// An integer parameter, accepting both numeric and numeric-string JSON.
    pub fn param_int(&self, name: &str) -> Option<i64> {
        self.parameters.get(name).and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
    }

    /// A boolean-as-bit parameter (`"CLK_POLARITY"` etc.): non-zero is true.
    pub fn param_bool(&self, name: &str, default: bool) -> bool {
        self.param_int(name).map(|n| n != 0).unwrap_or(default)
    }

    pub fn port_bits(&self, name: &str) -> &[RawBit] {
        self.connections
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SynthModule {
    #[serde(default)]
    pub ports: HashMap<String, SynthPort>,
    #[serde(default)]
    pub cells: HashMap<String, SynthCell>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SynthDocument {
    pub modules: HashMap<String, SynthModule>,
}
