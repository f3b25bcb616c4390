//! WASM bindings for Gatesim Core.
//!
//! This module provides JavaScript-friendly bindings for driving a saved
//! project from a browser front end.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCircuitSim } from 'gatesim_core';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await (await fetch('adder.gsim')).arrayBuffer());
//! const sim = new WasmCircuitSim(bytes);
//!
//! sim.toggle(0, 0);
//! console.log(sim.read(3)); // Uint8Array of 0/1 bits
//! const saved = sim.save();
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{ComponentId, Project};
use crate::error::GatesimError;
use crate::solver::{Simulator, SimulatorConfig};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(e: GatesimError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible logic circuit simulator.
///
/// This struct wraps the native `Simulator` and exposes components by their
/// canvas index.
#[wasm_bindgen]
pub struct WasmCircuitSim {
    simulator: Simulator,
}

#[wasm_bindgen]
impl WasmCircuitSim {
    /// Create a simulator from encoded project bytes.
    ///
    /// # Example
    /// ```javascript
    /// const sim = new WasmCircuitSim(bytes);
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(bytes: &[u8]) -> Result<WasmCircuitSim, JsValue> {
        Self::with_config(bytes, crate::solver::DEFAULT_MAX_DEPTH)
    }

    /// Create a simulator with a custom propagation depth bound.
    #[wasm_bindgen]
    pub fn with_config(bytes: &[u8], max_depth: usize) -> Result<WasmCircuitSim, JsValue> {
        let project = Project::from_bytes(bytes).map_err(to_js)?;
        let config = SimulatorConfig::new().with_max_depth(max_depth);
        let mut simulator = Simulator::with_config(project, config);
        simulator.settle().map_err(to_js)?;
        Ok(WasmCircuitSim { simulator })
    }

    /// Create a simulator with an empty project.
    #[wasm_bindgen]
    pub fn empty() -> WasmCircuitSim {
        WasmCircuitSim {
            simulator: Simulator::default(),
        }
    }

    /// Replace the project. On failure the current project is kept.
    #[wasm_bindgen]
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.simulator.load(bytes).map_err(to_js)
    }

    /// Encode the current project.
    #[wasm_bindgen]
    pub fn save(&self) -> Vec<u8> {
        self.simulator.save()
    }

    /// Flip one bit of an input source, returning the new value.
    #[wasm_bindgen]
    pub fn toggle(&mut self, component: usize, bit: usize) -> Result<bool, JsValue> {
        self.simulator
            .toggle_input(ComponentId(component), bit)
            .map_err(to_js)
    }

    /// Set every bit of an input bus from an integer.
    #[wasm_bindgen]
    pub fn set_bus(&mut self, component: usize, value: i32) -> Result<(), JsValue> {
        self.simulator
            .set_bus_value(ComponentId(component), value)
            .map_err(to_js)
    }

    /// Current bits of a component as 0/1 bytes.
    #[wasm_bindgen]
    pub fn read(&self, component: usize) -> Result<Vec<u8>, JsValue> {
        let bits = self
            .simulator
            .read(ComponentId(component))
            .map_err(to_js)?;
        Ok(bits.into_iter().map(u8::from).collect())
    }

    /// Canvas index of the first component with `label`.
    #[wasm_bindgen]
    pub fn find(&self, label: &str) -> Result<usize, JsValue> {
        self.simulator
            .canvas()
            .find_label(label)
            .map(|id| id.0)
            .map_err(to_js)
    }

    /// Number of components on the canvas.
    #[wasm_bindgen(getter)]
    pub fn component_count(&self) -> usize {
        self.simulator.canvas().len()
    }

    /// Number of block templates in the palette.
    #[wasm_bindgen(getter)]
    pub fn palette_len(&self) -> usize {
        self.simulator.project().palette.len()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
