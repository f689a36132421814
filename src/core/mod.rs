// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod state;

pub use error::{QkitError, Result, status};
pub use state::AmplitudeRegister;

pub mod constants;
pub use constants::qkit_constants::{CLASSICAL_LIMIT, MAX_ITERATIONS, PI, QUANTUM_MAX};
