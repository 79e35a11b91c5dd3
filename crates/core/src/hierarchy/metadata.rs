//! Extracts the two maps a compiled child module hands up to its parent
//! (`spec.md` §4.7 step 4): the adapter's lowering-time id/port info, and
//! the wire/save stages' exported port geometry.

use crate::adapter::lower::{ChildInfo, ChildPort};
use crate::layout::PlacedLayout;
use crate::library::{self, ComponentKind};
use crate::model::{CustomMetadata, CustomPort, Netlist};

const PORT_ORIGIN_OFFSET: i32 = 16;

/// Bit width and direction of every module port on `netlist`, for a
/// parent's `Custom` cell lowering.
pub fn extract_child_info(netlist: &Netlist, id: u64) -> ChildInfo {
    let mut ports = std::collections::HashMap::new();
    for component in netlist.components() {
        let Some(port) = &component.metadata.module_port else {
            continue;
        };
        let width = library::template(component.kind).width.bits();
        ports.insert(
            port.name.clone(),
            ChildPort {
                is_input: port.is_input,
                width,
            },
        );
    }
    ChildInfo { id, ports }
}

/// Grid-aligned bounding box (rounded up to whole 8-cell units) and
/// exported port positions (each offset by `-16` to match the host's
/// custom-component coordinate convention) for a compiled child.
pub fn extract_custom_metadata(netlist: &Netlist, layout: &PlacedLayout) -> CustomMetadata {
    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;
    for placement in &layout.placements {
        let Some(kind) = netlist.component(placement.component).map(|c| c.kind) else {
            continue;
        };
        let bounds = library::template(kind).bounds;
        min_x = min_x.min(placement.position.x + bounds.min.x);
        min_y = min_y.min(placement.position.y + bounds.min.y);
        max_x = max_x.max(placement.position.x + bounds.max.x);
        max_y = max_y.max(placement.position.y + bounds.max.y);
    }
    if layout.placements.is_empty() {
        min_x = 0;
        min_y = 0;
        max_x = 0;
        max_y = 0;
    }

    let width_units = div_ceil_8(max_x - min_x);
    let height_units = div_ceil_8(max_y - min_y);

    let mut ports = Vec::new();
    for component in netlist.components() {
        let Some(port) = &component.metadata.module_port else {
            continue;
        };
        let Some(placement) = layout.placement(component.id) else {
            continue;
        };
        let template = library::template(component.kind);
        let port_id = if port.is_input { "Y" } else { "A" };
        let Some(spec) = template.port(port_id) else {
            continue;
        };
        let absolute = placement.position + (spec.position - template.bounds.min);
        ports.push(CustomPort {
            name: port.name.clone(),
            is_input: port.is_input,
            width: template.width.bits(),
            position: absolute.translated(-PORT_ORIGIN_OFFSET, -PORT_ORIGIN_OFFSET),
        });
    }

    CustomMetadata {
        width_units,
        height_units,
        ports,
    }
}

fn div_ceil_8(n: i32) -> i32 {
    if n <= 0 {
        return 0;
    }
    (n + 7) / 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Placement;
    use crate::library::{Point, Width};
    use crate::model::ModulePortDescriptor;

    #[test]
    fn extracts_one_input_and_one_output_port() {
        let mut netlist = Netlist::new();
        let input = netlist.instantiate(ComponentKind::Input8);
        netlist.component_mut(input).unwrap().metadata.module_port = Some(ModulePortDescriptor {
            name: "a".to_string(),
            is_input: true,
            bit_index: None,
        });
        let output = netlist.instantiate(ComponentKind::Output8);
        netlist.component_mut(output).unwrap().metadata.module_port = Some(ModulePortDescriptor {
            name: "y".to_string(),
            is_input: false,
            bit_index: None,
        });

        let info = extract_child_info(&netlist, 99);
        assert_eq!(info.id, 99);
        assert_eq!(info.ports.len(), 2);
        assert!(info.ports["a"].is_input);
        assert_eq!(info.ports["a"].width, 8);
        assert!(!info.ports["y"].is_input);
    }

    #[test]
    fn custom_metadata_offsets_port_positions_by_16() {
        let mut netlist = Netlist::new();
        let input = netlist.instantiate(ComponentKind::Input8);
        netlist.component_mut(input).unwrap().metadata.module_port = Some(ModulePortDescriptor {
            name: "a".to_string(),
            is_input: true,
            bit_index: None,
        });

        let layout = PlacedLayout {
            placements: vec![Placement {
                component: input,
                position: Point::new(20, 20),
            }],
            edges: Vec::new(),
            compact: false,
        };

        let meta = extract_custom_metadata(&netlist, &layout);
        assert_eq!(meta.ports.len(), 1);
        let port = meta.port("a").unwrap();
        // Input8's "Y" output port sits at local (2, 0); bounds.min is (0, 0).
        assert_eq!(port.position, Point::new(20 + 2 - 16, 20 + 0 - 16));
        assert_eq!(port.width, Width::W8.bits());
    }

    #[test]
    fn empty_layout_yields_zero_bounding_box() {
        let netlist = Netlist::new();
        let layout = PlacedLayout::default();
        let meta = extract_custom_metadata(&netlist, &layout);
        assert_eq!(meta.width_units, 0);
        assert_eq!(meta.height_units, 0);
    }
}
