//! Circuit graph structure.
//!
//! A [`Graph`] is one nesting level: the canvas, or the interior of a block.
//! Components live in an owned vector and are addressed by index; lines
//! reference connectors by [`ConnectorRef`] local to the same level.

use tracing::debug;

use super::types::{ComponentId, ConnectorRef, Direction, LineId};
use crate::components::{Component, Connector};
use crate::error::{GatesimError, Result};
use crate::solver::{Propagator, SimulatorConfig};

/// A directed wire from an `OUT` connector to an `IN` connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Line {
    pub source: ConnectorRef,
    pub dest: ConnectorRef,
}

/// Components and lines at one nesting level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    components: Vec<Component>,
    lines: Vec<Line>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from parts without checking it. See
    /// [`validate_graph`](super::validate_graph).
    pub fn from_parts(components: Vec<Component>, lines: Vec<Line>) -> Self {
        Self { components, lines }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Iterate components with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components
            .iter()
            .enumerate()
            .map(|(i, c)| (ComponentId(i), c))
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(id.0)
    }

    /// Look up a connector.
    pub fn connector(&self, r: ConnectorRef) -> Option<&Connector> {
        self.component(r.component)?
            .connectors(r.direction)
            .get(r.index)
    }

    pub fn connector_mut(&mut self, r: ConnectorRef) -> Option<&mut Connector> {
        self.component_mut(r.component)?
            .connectors_mut(r.direction)
            .get_mut(r.index)
    }

    /// Look up a connector, following a block boundary bypass one hop into
    /// the block's interior.
    pub fn resolve(&self, r: ConnectorRef) -> Option<&Connector> {
        match self.component(r.component)? {
            Component::Block(block) => block.resolve(r.direction, r.index),
            component => component.connectors(r.direction).get(r.index),
        }
    }

    /// Ids of every primitive source, in canvas order.
    pub fn sources(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.iter().filter(|(_, c)| c.is_source()).map(|(id, _)| id)
    }

    /// Ids of every primitive sink, in canvas order.
    pub fn sinks(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.iter().filter(|(_, c)| c.is_sink()).map(|(id, _)| id)
    }

    /// First component carrying `label`.
    pub fn find_label(&self, label: &str) -> Result<ComponentId> {
        self.iter()
            .find(|(_, c)| c.label() == label)
            .map(|(id, _)| id)
            .ok_or_else(|| GatesimError::LabelNotFound {
                label: label.to_string(),
            })
    }

    /// Add a component, returning its id.
    pub fn add_component(&mut self, component: Component) -> ComponentId {
        let id = ComponentId(self.components.len());
        debug!(
            component = %id,
            kind = component.kind_name(),
            label = component.label(),
            "add component"
        );
        self.components.push(component);
        id
    }

    /// Remove a component and every line touching it.
    ///
    /// Later components shift down by one and lines are re-indexed. Returns
    /// the removed component and the (re-indexed) inputs it used to drive,
    /// which the caller should release.
    pub fn remove_component(
        &mut self,
        id: ComponentId,
    ) -> Result<(Component, Vec<ConnectorRef>)> {
        if id.0 >= self.components.len() {
            return Err(GatesimError::component_not_found(id));
        }

        let mut orphaned = Vec::new();
        self.lines.retain(|line| {
            let touches = line.source.component == id || line.dest.component == id;
            if line.source.component == id && line.dest.component != id {
                orphaned.push(line.dest);
            }
            !touches
        });

        let component = self.components.remove(id.0);
        let shift = |r: &mut ConnectorRef| {
            if r.component.0 > id.0 {
                r.component.0 -= 1;
            }
        };
        for line in &mut self.lines {
            shift(&mut line.source);
            shift(&mut line.dest);
        }
        orphaned.iter_mut().for_each(shift);

        debug!(
            component = %id,
            kind = component.kind_name(),
            released = orphaned.len(),
            "remove component"
        );
        Ok((component, orphaned))
    }

    /// The line driving an input connector, if any.
    pub fn incoming(&self, dest: ConnectorRef) -> Option<(LineId, &Line)> {
        self.lines
            .iter()
            .enumerate()
            .find(|(_, l)| l.dest == dest)
            .map(|(i, l)| (LineId(i), l))
    }

    /// Destinations of every line leaving an output connector.
    pub fn fanout(&self, source: ConnectorRef) -> Vec<ConnectorRef> {
        self.lines
            .iter()
            .filter(|l| l.source == source)
            .map(|l| l.dest)
            .collect()
    }

    /// Wire two connectors together.
    ///
    /// Endpoints may be given in either order; the `OUT` end becomes the
    /// source. Rejected without mutation when both ends share a direction,
    /// when they belong to the same component, or when the `IN` end already
    /// has a driver.
    pub fn connect(&mut self, a: ConnectorRef, b: ConnectorRef) -> Result<LineId> {
        for r in [a, b] {
            if self.connector(r).is_none() {
                return Err(GatesimError::connector_not_found(r));
            }
        }
        if a.direction == b.direction {
            return Err(GatesimError::SameDirection {
                from: a,
                to: b,
                direction: a.direction,
            });
        }
        if a.component == b.component {
            return Err(GatesimError::SelfLoop {
                component: a.component,
            });
        }
        let (source, dest) = if a.direction == Direction::Out {
            (a, b)
        } else {
            (b, a)
        };
        if self.incoming(dest).is_some() {
            return Err(GatesimError::InputAlreadyConnected { dest });
        }

        let id = LineId(self.lines.len());
        self.lines.push(Line { source, dest });
        debug!(line = %id, %source, %dest, "connect");
        Ok(id)
    }

    /// Remove one line.
    pub fn remove_line(&mut self, id: LineId) -> Result<Line> {
        if id.0 >= self.lines.len() {
            return Err(GatesimError::LineNotFound { line: id.0 });
        }
        let line = self.lines.remove(id.0);
        debug!(line = %id, source = %line.source, dest = %line.dest, "remove line");
        Ok(line)
    }

    /// Remove every line attached to a connector.
    pub fn disconnect(&mut self, r: ConnectorRef) -> Result<Vec<Line>> {
        if self.connector(r).is_none() {
            return Err(GatesimError::connector_not_found(r));
        }
        let mut removed = Vec::new();
        self.lines.retain(|line| {
            let touches = line.source == r || line.dest == r;
            if touches {
                removed.push(*line);
            }
            !touches
        });
        debug!(connector = %r, removed = removed.len(), "disconnect");
        Ok(removed)
    }

    /// Remove all components and lines.
    pub fn clear(&mut self) {
        self.components.clear();
        self.lines.clear();
    }

    /// Copy a selection into a new graph.
    ///
    /// Components keep selection order; only lines with both ends inside the
    /// selection are carried over. Each component may be selected once.
    pub fn extract(&self, selection: &[ComponentId]) -> Result<Graph> {
        let mut graph = Graph::new();
        for (i, &id) in selection.iter().enumerate() {
            if selection[..i].contains(&id) {
                return Err(GatesimError::DuplicateSelection { component: id });
            }
            let component = self
                .component(id)
                .ok_or(GatesimError::ComponentNotFound { component: id })?;
            graph.components.push(component.clone());
        }
        let remap = |r: ConnectorRef| {
            selection
                .iter()
                .position(|&id| id == r.component)
                .map(|i| ConnectorRef {
                    component: ComponentId(i),
                    ..r
                })
        };
        for line in &self.lines {
            if let (Some(source), Some(dest)) = (remap(line.source), remap(line.dest)) {
                graph.lines.push(Line { source, dest });
            }
        }
        Ok(graph)
    }

    /// Run one settle pass from every primitive source.
    pub fn settle(&mut self, config: &SimulatorConfig) -> Result<()> {
        Propagator::new(config).settle(self)
    }

    /// Drive an input back to `false` and propagate onward.
    pub fn release(&mut self, dest: ConnectorRef, config: &SimulatorConfig) -> Result<()> {
        Propagator::new(config).drive(self, dest, false)
    }
}
