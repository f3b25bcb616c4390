//! Logic gates.

use std::fmt;

use crate::circuit::{Point, Rect};

use super::Connector;

/// Boolean function computed by a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    Not,
    And,
    Or,
    Xor,
}

impl GateKind {
    /// All gate kinds, in palette order.
    pub const ALL: [GateKind; 4] = [GateKind::And, GateKind::Or, GateKind::Xor, GateKind::Not];

    /// Number of input connectors.
    pub fn arity(self) -> usize {
        match self {
            GateKind::Not => 1,
            GateKind::And | GateKind::Or | GateKind::Xor => 2,
        }
    }

    /// Display symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            GateKind::Not => "NOT",
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Xor => "XOR",
        }
    }

    /// Wire encoding of the gate kind.
    pub fn code(self) -> u8 {
        match self {
            GateKind::Not => 0,
            GateKind::And => 1,
            GateKind::Or => 2,
            GateKind::Xor => 3,
        }
    }

    /// Decode a gate kind byte.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(GateKind::Not),
            1 => Some(GateKind::And),
            2 => Some(GateKind::Or),
            3 => Some(GateKind::Xor),
            _ => None,
        }
    }

    /// Evaluate the gate. `b` is ignored for NOT.
    pub fn eval(self, a: bool, b: bool) -> bool {
        match self {
            GateKind::Not => !a,
            GateKind::And => a && b,
            GateKind::Or => a || b,
            GateKind::Xor => a ^ b,
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A logic gate with one or two inputs and a single output.
///
/// Unconnected inputs read as `false`. That makes the output defined at all
/// times, though not necessarily meaningful until every input is driven.
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    pub label: String,
    pub rect: Rect,
    pub kind: GateKind,
    pub inputs: Vec<Connector>,
    pub output: Connector,
}

impl Gate {
    pub const WIDTH: f32 = 75.0;
    pub const HEIGHT: f32 = 30.0;

    /// Create a gate with its top-left corner at `at`.
    pub fn new(kind: GateKind, at: Point) -> Self {
        let (x, y) = (at.x, at.y);
        let inputs = if kind.arity() == 1 {
            vec![Connector::input(Point::new(x + 5.0, y + 15.0))]
        } else {
            vec![
                Connector::input(Point::new(x + 5.0, y + 5.0)),
                Connector::input(Point::new(x + 5.0, y + 25.0)),
            ]
        };
        Self {
            label: kind.symbol().to_string(),
            rect: Rect::new(x, y, Self::WIDTH, Self::HEIGHT),
            kind,
            inputs,
            output: Connector::output(Point::new(x + 70.0, y + 15.0)),
        }
    }

    /// Recompute the output from the current input values.
    pub fn recompute(&mut self) -> bool {
        let a = self.inputs.first().map(|c| c.value).unwrap_or(false);
        let b = self.inputs.get(1).map(|c| c.value).unwrap_or(false);
        self.output.value = self.kind.eval(a, b);
        self.output.value
    }
}
