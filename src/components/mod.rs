//! Component models for logic simulation.
//!
//! This module provides every node type that can appear in a circuit graph:
//! - Gates: NOT, AND, OR, XOR
//! - Sources: 1-bit input, 2/4/8-bit input bus
//! - Sinks: 1-bit output, 2/4/8-bit output bus
//! - Composite: [`Block`], a packaged sub-circuit
//!
//! The kind set is closed, so [`Component`] is an enum and every per-kind
//! operation is a `match`.

mod block;
mod connector;
mod gate;
mod io;

pub use block::Block;
pub use connector::Connector;
pub use gate::{Gate, GateKind};
pub use io::{bits_value, BusWidth, Input, InputBus, Output, OutputBus};

use crate::circuit::{Direction, Point, Rect};
use crate::error::Result;
use crate::solver::Propagator;

/// A circuit component.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Gate(Gate),
    Input(Input),
    InputBus(InputBus),
    Output(Output),
    OutputBus(OutputBus),
    Block(Block),
}

impl Component {
    /// Short name of the component kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Component::Gate(_) => "gate",
            Component::Input(_) => "input",
            Component::InputBus(_) => "input bus",
            Component::Output(_) => "output",
            Component::OutputBus(_) => "output bus",
            Component::Block(_) => "block",
        }
    }

    /// Get the display label.
    pub fn label(&self) -> &str {
        match self {
            Component::Gate(g) => &g.label,
            Component::Input(i) => &i.label,
            Component::InputBus(i) => &i.label,
            Component::Output(o) => &o.label,
            Component::OutputBus(o) => &o.label,
            Component::Block(b) => &b.label,
        }
    }

    /// Replace the display label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        match self {
            Component::Gate(g) => g.label = label,
            Component::Input(i) => i.label = label,
            Component::InputBus(i) => i.label = label,
            Component::Output(o) => o.label = label,
            Component::OutputBus(o) => o.label = label,
            Component::Block(b) => b.label = label,
        }
    }

    /// Get the bounding box.
    pub fn rect(&self) -> Rect {
        match self {
            Component::Gate(g) => g.rect,
            Component::Input(i) => i.rect,
            Component::InputBus(i) => i.rect,
            Component::Output(o) => o.rect,
            Component::OutputBus(o) => o.rect,
            Component::Block(b) => b.rect,
        }
    }

    /// Input connectors, in order.
    pub fn inputs(&self) -> &[Connector] {
        match self {
            Component::Gate(g) => &g.inputs,
            Component::Input(_) | Component::InputBus(_) => &[],
            Component::Output(o) => std::slice::from_ref(&o.input),
            Component::OutputBus(o) => &o.inputs,
            Component::Block(b) => &b.inputs,
        }
    }

    /// Output connectors, in order.
    pub fn outputs(&self) -> &[Connector] {
        match self {
            Component::Gate(g) => std::slice::from_ref(&g.output),
            Component::Input(i) => std::slice::from_ref(&i.output),
            Component::InputBus(i) => &i.outputs,
            Component::Output(_) | Component::OutputBus(_) => &[],
            Component::Block(b) => &b.outputs,
        }
    }

    pub fn inputs_mut(&mut self) -> &mut [Connector] {
        match self {
            Component::Gate(g) => &mut g.inputs,
            Component::Input(_) | Component::InputBus(_) => &mut [],
            Component::Output(o) => std::slice::from_mut(&mut o.input),
            Component::OutputBus(o) => &mut o.inputs,
            Component::Block(b) => &mut b.inputs,
        }
    }

    pub fn outputs_mut(&mut self) -> &mut [Connector] {
        match self {
            Component::Gate(g) => std::slice::from_mut(&mut g.output),
            Component::Input(i) => std::slice::from_mut(&mut i.output),
            Component::InputBus(i) => &mut i.outputs,
            Component::Output(_) | Component::OutputBus(_) => &mut [],
            Component::Block(b) => &mut b.outputs,
        }
    }

    /// Connectors of one direction.
    pub fn connectors(&self, direction: Direction) -> &[Connector] {
        match direction {
            Direction::In => self.inputs(),
            Direction::Out => self.outputs(),
        }
    }

    pub fn connectors_mut(&mut self, direction: Direction) -> &mut [Connector] {
        match direction {
            Direction::In => self.inputs_mut(),
            Direction::Out => self.outputs_mut(),
        }
    }

    /// Check if this is a primitive source (settle passes start here).
    pub fn is_source(&self) -> bool {
        matches!(self, Component::Input(_) | Component::InputBus(_))
    }

    /// Check if this is a primitive sink.
    pub fn is_sink(&self) -> bool {
        matches!(self, Component::Output(_) | Component::OutputBus(_))
    }

    /// Recompute output values from input values.
    ///
    /// Sources and sinks are passive. Blocks settle their interior graph
    /// through the same propagator, so nesting counts toward its depth bound.
    pub fn recompute(&mut self, propagator: &mut Propagator) -> Result<()> {
        match self {
            Component::Gate(g) => {
                g.recompute();
            }
            Component::Block(b) => b.recompute(propagator)?,
            Component::Input(_)
            | Component::InputBus(_)
            | Component::Output(_)
            | Component::OutputBus(_) => {}
        }
        Ok(())
    }

    /// Move the component and its connectors.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        let rect = match self {
            Component::Gate(g) => &mut g.rect,
            Component::Input(i) => &mut i.rect,
            Component::InputBus(i) => &mut i.rect,
            Component::Output(o) => &mut o.rect,
            Component::OutputBus(o) => &mut o.rect,
            // Interior layout stays put
            Component::Block(b) => {
                b.translate(dx, dy);
                return;
            }
        };
        rect.translate(dx, dy);
        for c in self.inputs_mut() {
            c.translate(dx, dy);
        }
        for c in self.outputs_mut() {
            c.translate(dx, dy);
        }
    }

    /// Move the component so its top-left corner sits at `at`.
    pub fn place_at(&mut self, at: Point) {
        let origin = self.rect().origin();
        self.translate(at.x - origin.x, at.y - origin.y);
    }
}

/// One template of every primitive, laid out as a palette row.
///
/// Placing a component clones a template and moves the copy.
pub fn primitives() -> Vec<Component> {
    let mut palette = Vec::new();
    let mut x = 5.0;
    for kind in GateKind::ALL {
        palette.push(Component::Gate(Gate::new(kind, Point::new(x, 5.0))));
        x += Gate::WIDTH + 20.0;
    }
    palette.push(Component::Input(Input::new(Point::new(x, 5.0))));
    x += io::PIN_WIDTH + 20.0;
    for width in BusWidth::ALL {
        palette.push(Component::InputBus(InputBus::new(width, Point::new(x, 5.0))));
        x += io::PIN_WIDTH + 20.0;
    }
    palette.push(Component::Output(Output::new(Point::new(x, 5.0))));
    x += io::PIN_WIDTH + 20.0;
    for width in BusWidth::ALL {
        palette.push(Component::OutputBus(OutputBus::new(width, Point::new(x, 5.0))));
        x += io::PIN_WIDTH + 20.0;
    }
    palette
}
