//! Width classification for a routed wire (`spec.md` §4.5).

use crate::library::{self, ComponentKind};
use crate::model::{ComponentInstance, CustomMetadata};

/// The discrete wire kinds the save format distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    Wk1,
    Wk8,
    Wk16,
    Wk32,
    Wk64,
}

impl WireKind {
    /// Map 1→Wk1, 8→Wk8, 16→Wk16, 32→Wk32, 64→Wk64; anything else
    /// defaults to Wk1.
    pub fn from_bits(bits: u32) -> Self {
        match bits {
            8 => WireKind::Wk8,
            16 => WireKind::Wk16,
            32 => WireKind::Wk32,
            64 => WireKind::Wk64,
            _ => WireKind::Wk1,
        }
    }

    /// The save format's one-byte wire-kind code (`spec.md` §4.6).
    pub fn code(self) -> u8 {
        match self {
            WireKind::Wk1 => 0,
            WireKind::Wk8 => 1,
            WireKind::Wk16 => 2,
            WireKind::Wk32 => 3,
            WireKind::Wk64 => 4,
        }
    }
}

fn is_splitter(kind: ComponentKind) -> bool {
    matches!(
        kind,
        ComponentKind::Splitter8 | ComponentKind::Splitter16 | ComponentKind::Splitter32 | ComponentKind::Splitter64
    )
}

/// Derive a wire's bit width from its source component's template id and
/// port id, or a per-port width override; splitter outputs are always
/// width 1 regardless of the chunk they carry (`spec.md` §4.5).
pub fn classify_width(
    source: &ComponentInstance,
    source_port: &str,
    custom_metadata: &std::collections::HashMap<u64, CustomMetadata>,
) -> WireKind {
    if is_splitter(source.kind) {
        return WireKind::Wk1;
    }
    if let Some(bits) = source.port_width_override(source_port) {
        return WireKind::from_bits(bits);
    }
    if source.kind == ComponentKind::Custom {
        let bits = source
            .metadata
            .custom_id
            .and_then(|id| custom_metadata.get(&id))
            .and_then(|meta| meta.port(source_port))
            .map(|p| p.width)
            .unwrap_or(1);
        return WireKind::from_bits(bits);
    }
    WireKind::from_bits(library::template(source.kind).width.bits())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentId, ComponentInstance};

    #[test]
    fn splitter_output_is_always_width_one() {
        let c = ComponentInstance::new(ComponentId(0), ComponentKind::Splitter16);
        assert_eq!(classify_width(&c, "out0", &Default::default()), WireKind::Wk1);
    }

    #[test]
    fn gate_width_follows_template() {
        let c = ComponentInstance::new(ComponentId(0), ComponentKind::And8);
        assert_eq!(classify_width(&c, "Y", &Default::default()), WireKind::Wk8);
    }

    #[test]
    fn override_wins_over_template_width() {
        let mut c = ComponentInstance::new(ComponentId(0), ComponentKind::Maker16);
        c.metadata.port_width_overrides.insert("in0".to_string(), 8);
        assert_eq!(classify_width(&c, "in0", &Default::default()), WireKind::Wk8);
    }
}
