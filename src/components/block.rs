//! Composite components.
//!
//! A [`Block`] packages an interior [`Graph`] behind a fixed set of boundary
//! connectors. Each external `IN` connector mirrors the `OUT` connector of an
//! interior input pin, and each external `OUT` connector mirrors the `IN`
//! connector of an interior output pin. The mirrors are plain
//! [`ConnectorRef`]s into the block's own graph, so cloning a block (deriving
//! `Clone`) yields a fully independent instance with its boundary already
//! bound to the copy.

use crate::circuit::{Color, ConnectorRef, Direction, Graph, Point, Rect};
use crate::error::{GatesimError, Result};
use crate::solver::Propagator;

use super::{Component, Connector};

/// A reusable sub-circuit acting as a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub label: String,
    pub rect: Rect,
    pub color: Color,
    /// Interior components and lines, exclusively owned
    pub graph: Graph,
    /// External inputs, bypassing to interior source outputs
    pub inputs: Vec<Connector>,
    /// External outputs, bypassing to interior sink inputs
    pub outputs: Vec<Connector>,
}

impl Block {
    pub const WIDTH: f32 = 60.0;

    /// Package a graph as a block placed at `at`.
    ///
    /// Boundary connectors follow the order of the interior components, then
    /// bit order within a bus.
    pub fn new(label: impl Into<String>, color: Color, graph: Graph, at: Point) -> Result<Self> {
        if graph.is_empty() {
            return Err(GatesimError::EmptySelection);
        }

        let mut in_targets = Vec::new();
        let mut out_targets = Vec::new();
        for (id, component) in graph.iter() {
            match component {
                Component::Input(_) | Component::InputBus(_) => {
                    in_targets.extend(
                        (0..component.outputs().len()).map(|k| ConnectorRef::output(id, k)),
                    );
                }
                Component::Output(_) | Component::OutputBus(_) => {
                    out_targets.extend(
                        (0..component.inputs().len()).map(|k| ConnectorRef::input(id, k)),
                    );
                }
                _ => {}
            }
        }

        let rows = in_targets.len().max(out_targets.len()).max(1);
        let rect = Rect::new(at.x, at.y, Self::WIDTH, rows as f32 * 20.0 + 10.0);
        let pin = |k: usize, x: f32| Point::new(x, at.y + 15.0 + k as f32 * 20.0);

        let inputs = in_targets
            .into_iter()
            .enumerate()
            .map(|(k, target)| Connector::boundary(Direction::In, pin(k, at.x + 5.0), target))
            .collect();
        let outputs = out_targets
            .into_iter()
            .enumerate()
            .map(|(k, target)| {
                Connector::boundary(Direction::Out, pin(k, at.x + Self::WIDTH - 5.0), target)
            })
            .collect();

        let mut block = Self {
            label: label.into(),
            rect,
            color,
            graph,
            inputs,
            outputs,
        };
        block.sync_outputs();
        Ok(block)
    }

    /// Number of interior input bits exposed on the boundary.
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Number of interior output bits exposed on the boundary.
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Follow a boundary connector's bypass to the interior connector it
    /// mirrors. Connectors without a bypass resolve to themselves.
    pub fn resolve(&self, direction: Direction, index: usize) -> Option<&Connector> {
        let external = match direction {
            Direction::In => self.inputs.get(index)?,
            Direction::Out => self.outputs.get(index)?,
        };
        match external.bypass {
            Some(target) => self.graph.connector(target),
            None => Some(external),
        }
    }

    /// Push boundary inputs into the interior, settle it, and read the
    /// boundary outputs back.
    pub fn recompute(&mut self, propagator: &mut Propagator) -> Result<()> {
        self.load_inputs();
        propagator.settle(&mut self.graph)?;
        self.sync_outputs();
        Ok(())
    }

    /// Copy boundary input values onto the interior connectors they mirror.
    pub fn load_inputs(&mut self) {
        for external in &self.inputs {
            if let Some(inner) = external.bypass.and_then(|t| self.graph.connector_mut(t)) {
                inner.value = external.value;
            }
        }
    }

    /// Copy interior sink values onto the boundary outputs.
    pub fn sync_outputs(&mut self) {
        for external in &mut self.outputs {
            if let Some(inner) = external.bypass.and_then(|t| self.graph.connector(t)) {
                external.value = inner.value;
            }
        }
    }

    /// Move the block's outline and boundary. The interior keeps its layout.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.rect.translate(dx, dy);
        for c in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            c.translate(dx, dy);
        }
    }
}
