//! Assembles a [`SavePayload`] from a compiled netlist, its placed
//! layout, and its encoded wires (`spec.md` §4.6 "Component coordinate
//! origin").

use std::collections::HashMap;

use crate::layout::PlacedLayout;
use crate::library::{self, ComponentKind};
use crate::model::{ComponentId, CustomMetadata, Netlist};
use crate::wire::WireRecord;

use super::payload::{ComponentRecord, CustomTail, HeaderInfo, SaveHeader, SavePayload};
use super::SaveError;

/// A `Custom` instance's child-module bounding box, in 8-unit grid cells,
/// needed only for the −32 coordinate correction (`spec.md` §4.6).
const CUSTOM_ORIGIN_CORRECTION: i32 = 32;

fn component_position(
    netlist: &Netlist,
    layout: &PlacedLayout,
    id: ComponentId,
) -> Result<(i32, i32), SaveError> {
    let component = netlist
        .component(id)
        .ok_or(SaveError::MissingComponent(id))?;
    let placement = layout
        .placement(id)
        .ok_or(SaveError::MissingComponent(id))?;

    let origin = if component.kind == ComponentKind::Custom {
        (CUSTOM_ORIGIN_CORRECTION, CUSTOM_ORIGIN_CORRECTION)
    } else {
        let bounds = library::template(component.kind).bounds;
        (bounds.min.x, bounds.min.y)
    };

    Ok((placement.position.x - origin.0, placement.position.y - origin.1))
}

/// Build the full serializable payload for one compiled module.
///
/// `permanent_id` is the component's 1-based index in netlist insertion
/// order (`spec.md` §5, §8: stable across runs only insofar as cell
/// enumeration from the synthesizer is deterministic).
pub fn build_payload(
    netlist: &Netlist,
    layout: &PlacedLayout,
    wires: Vec<WireRecord>,
    custom_metadata: &HashMap<u64, CustomMetadata>,
    header: HeaderInfo,
) -> Result<SavePayload, SaveError> {
    let mut components = Vec::with_capacity(netlist.component_count());
    for (index, instance) in netlist.components().enumerate() {
        let position = component_position(netlist, layout, instance.id)?;

        let custom = if instance.kind == ComponentKind::Custom {
            let custom_id = instance
                .metadata
                .custom_id
                .ok_or(SaveError::MissingComponent(instance.id))?;
            let _ = custom_metadata
                .get(&custom_id)
                .ok_or(SaveError::MissingComponent(instance.id))?;
            Some(CustomTail {
                custom_id,
                displacement: (0, 0),
            })
        } else {
            None
        };

        components.push(ComponentRecord {
            kind: instance.kind.code(),
            position,
            rotation: 0,
            permanent_id: (index + 1) as u64,
            label: instance.metadata.label.clone().unwrap_or_default(),
            setting1: instance.metadata.setting,
            setting2: 0,
            ui_order: instance.metadata.ui_order,
            custom,
            programs: Vec::new(),
        });
    }

    let save_header = SaveHeader {
        save_id: header.save_id,
        hub_id: header.hub_id,
        gate_count: netlist.component_count() as u64,
        delay: header.delay,
        menu_visible: header.menu_visible,
        clock_speed: header.clock_speed,
        dependency_ids: header.dependency_ids,
        description: header.description,
        camera: header.camera,
        sync_status: header.sync_status,
        campaign_bound: header.campaign_bound,
        player_data: header.player_data,
        hub_description: header.hub_description,
    };

    Ok(SavePayload {
        header: save_header,
        components,
        wires,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Placement, RoutedEdge};
    use crate::library::Point;

    #[test]
    fn permanent_ids_follow_insertion_order() {
        let mut netlist = Netlist::new();
        let a = netlist.instantiate(ComponentKind::Input8);
        let b = netlist.instantiate(ComponentKind::Output8);

        let layout = PlacedLayout {
            placements: vec![
                Placement { component: a, position: Point::new(0, 0) },
                Placement { component: b, position: Point::new(10, 0) },
            ],
            edges: Vec::<RoutedEdge>::new(),
            compact: false,
        };

        let payload = build_payload(&netlist, &layout, Vec::new(), &HashMap::new(), HeaderInfo::default()).unwrap();
        assert_eq!(payload.components[0].permanent_id, 1);
        assert_eq!(payload.components[1].permanent_id, 2);
        assert_eq!(payload.header.gate_count, 2);
    }

    #[test]
    fn missing_placement_is_an_error() {
        let mut netlist = Netlist::new();
        netlist.instantiate(ComponentKind::Input8);
        let layout = PlacedLayout {
            placements: Vec::new(),
            edges: Vec::new(),
            compact: false,
        };
        let result = build_payload(&netlist, &layout, Vec::new(), &HashMap::new(), HeaderInfo::default());
        assert!(result.is_err());
    }
}
