//! Numeric constants shared by the planner, the evaluator and the simulator.

/// Constants for CHSH evaluation and amplitude amplification
pub mod qkit_constants {
    /// Highest CHSH value reachable by any local hidden-variable model.
    pub const CLASSICAL_LIMIT: f64 = 2.0;
    /// Tsirelson's bound, 2·√2.
    pub const QUANTUM_MAX: f64 = 2.0 * std::f64::consts::SQRT_2;
    /// Used for rotation angles
    pub const PI: f64 = std::f64::consts::PI;
    /// Hard upper bound on amplification iterations, whatever the collection size.
    pub const MAX_ITERATIONS: usize = 1 << 20;
}
