//! WASM bindings for Physarum Core.
//!
//! This module provides JavaScript-friendly bindings for running the solver
//! in a browser.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmPhysarum } from 'physarum_core';
//!
//! await init();
//!
//! const description = `
//!   .source food1
//!   .sink food2
//!   short food1 a 1 0.8
//!   short2 a food2 1 0.8
//!   long food1 food2 7 0.5
//! `;
//!
//! const sim = new WasmPhysarum(description);
//! const iterations = sim.solve();
//! console.log(sim.survived(), sim.report());
//! ```

use wasm_bindgen::prelude::*;

use crate::dsl;
use crate::error::PhysarumError;
use crate::report;
use crate::solver::{PhysarumSolver, SolverConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_MUE};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(e: PhysarumError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible Physarum solver.
///
/// Wraps the native [`PhysarumSolver`] with tracing switched on, so the
/// textual report is always available after a run.
#[wasm_bindgen]
pub struct WasmPhysarum {
    solver: PhysarumSolver,
}

#[wasm_bindgen]
impl WasmPhysarum {
    /// Create a new solver from a network description.
    ///
    /// # Arguments
    /// * `description` - The network in the description language
    ///
    /// # Returns
    /// A new `WasmPhysarum` instance or an error if the description is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(description: &str) -> Result<WasmPhysarum, JsValue> {
        Self::with_config(description, DEFAULT_MUE, DEFAULT_MAX_ITERATIONS)
    }

    /// Create a new solver with a custom flux exponent and iteration budget.
    ///
    /// `.param` directives in the description take precedence.
    #[wasm_bindgen]
    pub fn with_config(
        description: &str,
        mue: f64,
        max_iterations: usize,
    ) -> Result<WasmPhysarum, JsValue> {
        let ast = dsl::parse(description).map_err(to_js)?;

        let config = SolverConfig::new()
            .with_mue(mue)
            .with_max_iterations(max_iterations)
            .with_trace(true);
        let solver = PhysarumSolver::from_ast(&ast, config).map_err(to_js)?;

        Ok(WasmPhysarum { solver })
    }

    /// Run the solver and return the number of iterations performed.
    #[wasm_bindgen]
    pub fn solve(&mut self) -> Result<usize, JsValue> {
        self.solver
            .solve()
            .map(|report| report.iterations)
            .map_err(to_js)
    }

    /// Names of the connections above the survival threshold.
    #[wasm_bindgen]
    pub fn survived(&self) -> Vec<String> {
        self.solver
            .survived_connections()
            .into_iter()
            .map(|con| con.name.clone().unwrap_or_else(|| con.description()))
            .collect()
    }

    /// Current conductivity of every connection, in description order.
    #[wasm_bindgen]
    pub fn conductivities(&self) -> Vec<f64> {
        self.solver
            .connections()
            .iter()
            .map(|con| con.conductivity())
            .collect()
    }

    /// Textual report of every run so far.
    #[wasm_bindgen]
    pub fn report(&self) -> Result<String, JsValue> {
        self.solver
            .trace()
            .map(report::render)
            .ok_or_else(|| {
                to_js(PhysarumError::WasmError {
                    message: "no trace recorded".to_string(),
                })
            })
    }

    /// Re-arm sink grounding and clear the recorded trace.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.solver.reset();
    }

    #[wasm_bindgen(getter)]
    pub fn survival_threshold(&self) -> f64 {
        self.solver.survival_threshold()
    }

    #[wasm_bindgen(setter)]
    pub fn set_survival_threshold(&mut self, threshold: f64) {
        self.solver.set_survival_threshold(threshold);
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
