//! The netlist graph: an ordered component arena plus a lazily-populated
//! net table, and the four operations the adapter uses to build it.

use indexmap::IndexMap;
use thiserror::Error;

use crate::library::ComponentKind;

use super::component::ComponentInstance;
use super::ids::{ComponentId, NetId, PortRef};
use super::net::Net;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("net `{0}` already has a driver")]
    AlreadyDriven(NetId),
    #[error("component `{0}` does not exist")]
    UnknownComponent(ComponentId),
}

/// The netlist graph.
///
/// Components are kept in an insertion-ordered map so iteration order is
/// stable across runs (`spec.md` §5: "component insertion order into the
/// netlist determines permanent-id assignment"). Nets are created lazily on
/// first reference, never pre-declared.
#[derive(Debug, Clone, Default)]
pub struct Netlist {
    components: IndexMap<ComponentId, ComponentInstance>,
    nets: IndexMap<NetId, Net>,
    next_id: u32,
}

impl Netlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// *Instantiate*: add a new component with the given kind, returning
    /// its freshly assigned id.
    pub fn instantiate(&mut self, kind: ComponentKind) -> ComponentId {
        let id = ComponentId(self.next_id);
        self.next_id += 1;
        self.components.insert(id, ComponentInstance::new(id, kind));
        id
    }

    pub fn component(&self, id: ComponentId) -> Option<&ComponentInstance> {
        self.components.get(&id)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut ComponentInstance> {
        self.components.get_mut(&id)
    }

    /// Components in stable insertion order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentInstance> {
        self.components.values()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    fn net_mut(&mut self, net: &NetId) -> &mut Net {
        self.nets.entry(net.clone()).or_default()
    }

    pub fn net(&self, net: &NetId) -> Option<&Net> {
        self.nets.get(net)
    }

    pub fn nets(&self) -> impl Iterator<Item = (&NetId, &Net)> {
        self.nets.iter()
    }

    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// Connect `port` on `component` to `net` (both sides of the edge:
    /// the instance's connection map and the net's port-reference list).
    fn bind(&mut self, component: ComponentId, port: &str, net: &NetId) -> Result<(), ModelError> {
        let instance = self
            .components
            .get_mut(&component)
            .ok_or(ModelError::UnknownComponent(component))?;
        instance
            .connections
            .insert(port.to_string(), net.clone());
        Ok(())
    }

    /// *Register source*: assign a port as the unique driver of a net.
    /// Fails if the net already has a driver.
    pub fn register_source(
        &mut self,
        net: &NetId,
        component: ComponentId,
        port: &str,
    ) -> Result<(), ModelError> {
        if let Some(existing) = self.nets.get(net) {
            if existing.source.is_some() {
                return Err(ModelError::AlreadyDriven(net.clone()));
            }
        }
        self.bind(component, port, net)?;
        self.net_mut(net).source = Some(PortRef::new(component, port));
        Ok(())
    }

    /// *Register sink*: append a port to a net's sinks.
    pub fn register_sink(
        &mut self,
        net: &NetId,
        component: ComponentId,
        port: &str,
    ) -> Result<(), ModelError> {
        self.bind(component, port, net)?;
        self.net_mut(net).sinks.push(PortRef::new(component, port));
        Ok(())
    }

    /// *Disconnect*: sever all incident net references when deleting a
    /// component, and remove the component itself.
    pub fn disconnect(&mut self, component: ComponentId) {
        let Some(instance) = self.components.shift_remove(&component) else {
            return;
        };
        for net_id in instance.connections.values() {
            if let Some(net) = self.nets.get_mut(net_id) {
                if net.source.as_ref().map(|p| p.component) == Some(component) {
                    net.source = None;
                }
                net.sinks.retain(|p| p.component != component);
            }
        }
    }

    /// Remove a net entirely (used by optimization passes once all its
    /// ports have been disconnected).
    pub fn remove_net(&mut self, net: &NetId) {
        self.nets.shift_remove(net);
    }

    /// Every net with at least one sink has exactly one source, and every
    /// port reference in the graph resolves to a component currently
    /// present (`spec.md` §8 invariants). Used by tests and as a
    /// pre-layout sanity check.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (id, net) in &self.nets {
            if !net.sinks.is_empty() && net.source.is_none() {
                return Err(format!("net {id} has sinks but no source"));
            }
            let mut refs = net.sinks.clone();
            if let Some(src) = &net.source {
                refs.push(src.clone());
            }
            for r in refs {
                if !self.components.contains_key(&r.component) {
                    return Err(format!("net {id} references missing component {}", r.component));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::ComponentKind;

    #[test]
    fn instantiate_assigns_sequential_ids() {
        let mut nl = Netlist::new();
        let a = nl.instantiate(ComponentKind::And1);
        let b = nl.instantiate(ComponentKind::Not1);
        assert_eq!(a.0, 0);
        assert_eq!(b.0, 1);
        assert_eq!(nl.component_count(), 2);
    }

    #[test]
    fn register_source_twice_fails() {
        let mut nl = Netlist::new();
        let a = nl.instantiate(ComponentKind::And1);
        let b = nl.instantiate(ComponentKind::Not1);
        let net = NetId::new("n0");
        nl.register_source(&net, a, "Y").unwrap();
        let err = nl.register_source(&net, b, "Y").unwrap_err();
        assert_eq!(err, ModelError::AlreadyDriven(net));
    }

    #[test]
    fn disconnect_severs_all_references() {
        let mut nl = Netlist::new();
        let a = nl.instantiate(ComponentKind::And1);
        let b = nl.instantiate(ComponentKind::Not1);
        let net = NetId::new("n0");
        nl.register_source(&net, a, "Y").unwrap();
        nl.register_sink(&net, b, "A").unwrap();
        nl.disconnect(a);
        assert!(nl.component(a).is_none());
        assert!(nl.net(&net).unwrap().source.is_none());
        assert_eq!(nl.net(&net).unwrap().sinks.len(), 1);
    }

    #[test]
    fn invariant_catches_sourceless_net_with_sinks() {
        let mut nl = Netlist::new();
        let b = nl.instantiate(ComponentKind::Not1);
        let net = NetId::new("n0");
        nl.register_sink(&net, b, "A").unwrap();
        assert!(nl.check_invariants().is_err());
    }
}
