//! Solver configuration.

use crate::dsl::ParamDef;
use crate::error::{PhysarumError, Result};

use super::{
    DEFAULT_CONDUCTIVITY_MAX, DEFAULT_CONDUCTIVITY_MIN, DEFAULT_CONVERGENCE_EPSILON, DEFAULT_I0,
    DEFAULT_MAX_ITERATIONS, DEFAULT_MUE, DEFAULT_SURVIVAL_THRESHOLD,
};

/// Tunables of a Physarum run.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Flux exponent of the feedback laws.
    pub mue: f64,
    /// Current injected at each source and extracted at each sink.
    pub i0: f64,
    /// Conductivity above which a connection counts as surviving.
    pub survival_threshold: f64,
    /// Upper bound on iterations per `solve()` call.
    pub max_iterations: usize,
    /// A connection is stable when its conductivity moved less than this.
    pub convergence_epsilon: f64,
    /// Lower bound for randomly drawn initial conductivities.
    pub conductivity_min: f64,
    /// Upper bound for randomly drawn initial conductivities.
    pub conductivity_max: f64,
    /// Record a [`SolveTrace`](super::SolveTrace) while solving.
    pub trace: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            mue: DEFAULT_MUE,
            i0: DEFAULT_I0,
            survival_threshold: DEFAULT_SURVIVAL_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_epsilon: DEFAULT_CONVERGENCE_EPSILON,
            conductivity_min: DEFAULT_CONDUCTIVITY_MIN,
            conductivity_max: DEFAULT_CONDUCTIVITY_MAX,
            trace: false,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mue(mut self, mue: f64) -> Self {
        self.mue = mue;
        self
    }

    pub fn with_i0(mut self, i0: f64) -> Self {
        self.i0 = i0;
        self
    }

    pub fn with_survival_threshold(mut self, threshold: f64) -> Self {
        self.survival_threshold = threshold;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence epsilon.
    ///
    /// Smaller values keep the run going until conductivities have settled
    /// more tightly:
    /// - 1e-5 (default): settles well before the 50 iteration budget on small mazes
    /// - 1e-8: usually runs into the iteration budget
    pub fn with_convergence_epsilon(mut self, epsilon: f64) -> Self {
        self.convergence_epsilon = epsilon;
        self
    }

    /// Set the bounds initial conductivities are drawn from.
    pub fn with_conductivity_bounds(mut self, min: f64, max: f64) -> Self {
        self.conductivity_min = min;
        self.conductivity_max = max;
        self
    }

    /// Enable or disable the structured trace.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Reject values the update rule cannot work with.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("mue", self.mue),
            ("i0", self.i0),
            ("threshold", self.survival_threshold),
            ("epsilon", self.convergence_epsilon),
            ("conductivity min", self.conductivity_min),
            ("conductivity max", self.conductivity_max),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(PhysarumError::InvalidSolverParam {
                    message: format!("{} must be finite, got {}", name, value),
                });
            }
        }
        if self.convergence_epsilon < 0.0 {
            return Err(PhysarumError::InvalidSolverParam {
                message: format!("epsilon must not be negative, got {}", self.convergence_epsilon),
            });
        }
        if self.conductivity_min > self.conductivity_max {
            return Err(PhysarumError::InvalidSolverParam {
                message: format!(
                    "conductivity bounds are reversed: [{}, {}]",
                    self.conductivity_min, self.conductivity_max
                ),
            });
        }
        Ok(())
    }

    /// Apply `.param` directives from a network description.
    ///
    /// Recognised keys: `mue`, `i0`, `threshold`, `iterations`, `epsilon`.
    pub fn apply_params(&mut self, params: &[ParamDef]) -> Result<()> {
        for param in params {
            match param.name.as_str() {
                "mue" => self.mue = param.value,
                "i0" => self.i0 = param.value,
                "threshold" => self.survival_threshold = param.value,
                "epsilon" => self.convergence_epsilon = param.value,
                "iterations" => {
                    if param.value < 0.0 || param.value.fract() != 0.0 {
                        return Err(PhysarumError::InvalidSolverParam {
                            message: format!(
                                "iterations must be a non-negative integer, got {} (line {})",
                                param.value, param.line
                            ),
                        });
                    }
                    self.max_iterations = param.value as usize;
                }
                _ => {
                    return Err(PhysarumError::UnknownParameter {
                        param: param.name.clone(),
                        line: param.line,
                    })
                }
            }
        }
        self.validate()
    }
}
