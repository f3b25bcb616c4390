//! # Gatesim Core
//!
//! A digital logic circuit simulator with reusable composite blocks.
//!
//! This library provides:
//! - A circuit graph of components joined by directed lines
//! - Boolean gates (NOT, AND, OR, XOR), single-bit pins and 2/4/8-bit buses
//! - Blocks: sub-circuits packaged as single components, nestable to any depth
//! - Event-driven signal propagation with a bounded recursion depth
//! - A compact little-endian binary project format
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`circuit`] - Graph arena, identifiers, projects and validation
//! - [`components`] - Connector, gate, pin, bus and block models
//! - [`solver`] - Propagation engine, editing session and truth tables
//! - [`codec`] - Binary project serialization
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! gatesim demo adder.gsim
//! gatesim table adder.gsim
//! gatesim run adder.gsim --set A=1 --set B=1
//! ```
//!
//! ### Library
//!
//! ```
//! use gatesim_core::circuit::{ConnectorRef, Point};
//! use gatesim_core::components::{Component, Gate, GateKind, Input, Output};
//! use gatesim_core::Simulator;
//!
//! let mut sim = Simulator::default();
//! let a = sim.place(&Component::Input(Input::new(Point::default())), Point::new(0.0, 0.0))?;
//! let inverter = Component::Gate(Gate::new(GateKind::Not, Point::default()));
//! let not = sim.place(&inverter, Point::new(80.0, 0.0))?;
//! let out = sim.place(&Component::Output(Output::new(Point::default())), Point::new(200.0, 0.0))?;
//! sim.connect(ConnectorRef::output(a, 0), ConnectorRef::input(not, 0))?;
//! sim.connect(ConnectorRef::output(not, 0), ConnectorRef::input(out, 0))?;
//! assert_eq!(sim.read(out)?, vec![true]);
//! sim.toggle_input(a, 0)?;
//! assert_eq!(sim.read(out)?, vec![false]);
//! # Ok::<(), gatesim_core::GatesimError>(())
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmCircuitSim } from 'gatesim_core';
//!
//! const sim = new WasmCircuitSim(projectBytes);
//! sim.toggle(0, 0);
//! const bits = sim.read(3);
//! ```

pub mod circuit;
pub mod codec;
pub mod components;
pub mod error;
pub mod solver;

// Re-export main types for convenience
pub use circuit::{Graph, Project};
pub use error::{GatesimError, Result};
pub use solver::{Simulator, SimulatorConfig};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmCircuitSim;
