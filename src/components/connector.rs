//! Signal endpoints.

use crate::circuit::{ConnectorRef, Direction, Point};

/// A single signal endpoint on a component.
///
/// The owning component is implied by where the connector is stored: a
/// [`ConnectorRef`] names it by component index. Block boundary connectors
/// additionally carry a `bypass` reference into the block's interior graph,
/// exactly one hop deep.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub direction: Direction,
    /// Position on the canvas (rendering hint, persisted)
    pub position: Point,
    /// Current logic value
    pub value: bool,
    /// Interior connector mirrored by a block boundary connector
    pub bypass: Option<ConnectorRef>,
}

impl Connector {
    /// Create a connector with a `false` value and no bypass.
    pub fn new(direction: Direction, position: Point) -> Self {
        Self {
            direction,
            position,
            value: false,
            bypass: None,
        }
    }

    /// Create an input connector.
    pub fn input(position: Point) -> Self {
        Self::new(Direction::In, position)
    }

    /// Create an output connector.
    pub fn output(position: Point) -> Self {
        Self::new(Direction::Out, position)
    }

    /// Create a block boundary connector mirroring an interior connector.
    pub fn boundary(direction: Direction, position: Point, target: ConnectorRef) -> Self {
        Self {
            direction,
            position,
            value: false,
            bypass: Some(target),
        }
    }

    /// Store a value, returning whether it differs from the previous one.
    pub fn set_value(&mut self, value: bool) -> bool {
        let changed = self.value != value;
        self.value = value;
        changed
    }

    /// Whether this connector mirrors an interior connector.
    pub fn is_boundary(&self) -> bool {
        self.bypass.is_some()
    }

    /// Move the connector by a delta.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.position = self.position.offset(dx, dy);
    }
}
