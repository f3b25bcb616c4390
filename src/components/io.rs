//! Primitive sources and sinks: single-bit pins and multi-bit buses.
//!
//! Bus connectors are ordered most-significant bit first. The `signed` flag
//! only changes how the numeric value is read back; propagation never looks
//! at it.

use std::fmt;

use crate::circuit::{Point, Rect};

use super::Connector;

/// Width of a bus component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusWidth {
    Two,
    Four,
    Eight,
}

impl BusWidth {
    pub const ALL: [BusWidth; 3] = [BusWidth::Two, BusWidth::Four, BusWidth::Eight];

    /// Number of bits.
    pub fn bits(self) -> usize {
        match self {
            BusWidth::Two => 2,
            BusWidth::Four => 4,
            BusWidth::Eight => 8,
        }
    }

    /// Width from a bit count.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            2 => Some(BusWidth::Two),
            4 => Some(BusWidth::Four),
            8 => Some(BusWidth::Eight),
            _ => None,
        }
    }
}

impl fmt::Display for BusWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Single-bit pin size.
pub const PIN_WIDTH: f32 = 40.0;
pub const PIN_HEIGHT: f32 = 30.0;
/// Vertical pitch between bus bits.
pub const BIT_PITCH: f32 = 20.0;

fn bus_height(width: BusWidth) -> f32 {
    width.bits() as f32 * BIT_PITCH + 10.0
}

/// Read MSB-first bits as an integer, optionally two's complement.
pub fn bits_value(bits: &[Connector], signed: bool) -> i32 {
    let raw = bits
        .iter()
        .fold(0i32, |acc, c| (acc << 1) | i32::from(c.value));
    if signed && bits.first().map(|c| c.value).unwrap_or(false) {
        raw - (1 << bits.len())
    } else {
        raw
    }
}

/// A one-bit source toggled by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub label: String,
    pub rect: Rect,
    pub output: Connector,
}

impl Input {
    pub fn new(at: Point) -> Self {
        Self {
            label: "IN".to_string(),
            rect: Rect::new(at.x, at.y, PIN_WIDTH, PIN_HEIGHT),
            output: Connector::output(Point::new(at.x + 35.0, at.y + 15.0)),
        }
    }
}

/// A multi-bit source whose bits are toggled independently.
#[derive(Debug, Clone, PartialEq)]
pub struct InputBus {
    pub label: String,
    pub rect: Rect,
    pub width: BusWidth,
    pub signed: bool,
    pub outputs: Vec<Connector>,
}

impl InputBus {
    pub fn new(width: BusWidth, at: Point) -> Self {
        let outputs = (0..width.bits())
            .map(|k| {
                Connector::output(Point::new(
                    at.x + 35.0,
                    at.y + 15.0 + k as f32 * BIT_PITCH,
                ))
            })
            .collect();
        Self {
            label: format!("IN{}", width.bits()),
            rect: Rect::new(at.x, at.y, PIN_WIDTH, bus_height(width)),
            width,
            signed: false,
            outputs,
        }
    }

    /// Numeric value of the bus.
    pub fn value(&self) -> i32 {
        bits_value(&self.outputs, self.signed)
    }

    /// Set every bit from the low `width` bits of `value`.
    pub fn set_value(&mut self, value: i32) {
        let n = self.outputs.len();
        for (k, bit) in self.outputs.iter_mut().enumerate() {
            bit.value = (value >> (n - 1 - k)) & 1 == 1;
        }
    }
}

/// A one-bit sink displaying whatever is driven onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub label: String,
    pub rect: Rect,
    pub input: Connector,
}

impl Output {
    pub fn new(at: Point) -> Self {
        Self {
            label: "OUT".to_string(),
            rect: Rect::new(at.x, at.y, PIN_WIDTH, PIN_HEIGHT),
            input: Connector::input(Point::new(at.x + 5.0, at.y + 15.0)),
        }
    }

    pub fn value(&self) -> bool {
        self.input.value
    }
}

/// A multi-bit sink.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputBus {
    pub label: String,
    pub rect: Rect,
    pub width: BusWidth,
    pub signed: bool,
    pub inputs: Vec<Connector>,
}

impl OutputBus {
    pub fn new(width: BusWidth, at: Point) -> Self {
        let inputs = (0..width.bits())
            .map(|k| {
                Connector::input(Point::new(
                    at.x + 5.0,
                    at.y + 15.0 + k as f32 * BIT_PITCH,
                ))
            })
            .collect();
        Self {
            label: format!("OUT{}", width.bits()),
            rect: Rect::new(at.x, at.y, PIN_WIDTH, bus_height(width)),
            width,
            signed: false,
            inputs,
        }
    }

    /// Numeric value currently driven onto the bus.
    pub fn value(&self) -> i32 {
        bits_value(&self.inputs, self.signed)
    }
}
