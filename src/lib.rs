// src/lib.rs

//! `qkit` - Quantum search planning and entanglement-based key distribution
//!
//! This library plans amplitude-amplification searches over in-memory
//! collections and evaluates E91 key exchanges by their CHSH value and error
//! rate. Quantum primitives run on a pluggable [`Backend`]; the crate ships an
//! in-process [`Simulator`].

pub mod core;
pub mod config;
pub mod validation;
pub mod backend;
pub mod search;
pub mod channel;
pub mod random;
pub mod context;
pub mod simulation;

// Re-export the most common types for easier top-level use
pub use core::{QkitError, Result, AmplitudeRegister};
pub use config::{BackendConfig, BackendKind, QkitConfig};
pub use backend::{Backend, CountMode};
pub use search::{IterationStrategy, SamplingStrategy, SearchMatch, SearchOptions, SearchPlan};
pub use channel::{
    ChannelReport,
    KeyDistributionOptions,
    KeyDistributionOutcome,
    evaluate_channel,
    security_margin, // Also export the free-standing margin calculator
};
pub use context::QuantumContext;
pub use simulation::Simulator;

// Example 1: Planning a search
// The planner needs only the collection size and a match estimate. With one
// match among eight items the rotation angle is asin(1/√8) and the optimal
// count is two rounds.
/// ```
/// use qkit::{IterationStrategy, SearchOptions, search};
///
/// let options = SearchOptions::default();
/// let plan = search::plan_with_estimate(8, 1, &options);
/// println!("\n--- Example 1: Search plan ---");
/// println!("{}", plan);
/// assert_eq!(plan.iterations, 2);
/// assert!(plan.requires_amplification());
///
/// // Half the optimum for the same collection
/// assert_eq!(search::compute_iterations(8, 1, IterationStrategy::HalfOptimal), 1);
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Searching and exchanging a key on the simulator
// A context owns its backend, so nothing has to be initialized globally.
/// ```
/// use qkit::{KeyDistributionOptions, QuantumContext, QkitError, security_margin};
///
/// fn run() -> Result<(), QkitError> {
///     let ctx = QuantumContext::simulator();
///     let items: Vec<u32> = (0..128).collect();
///     let found = ctx.search_one(&items, &|x: &u32| *x == 77)?;
///     assert_eq!(*found.item, 77);
///
///     let options = KeyDistributionOptions { key_length: 128, ..Default::default() };
///     let outcome = ctx.generate_key(&options)?;
///     println!("\n--- Example 2: Key exchange ---");
///     println!("{}", outcome);
///     assert_eq!(outcome.key.len(), 16);
///     assert!(security_margin(outcome.security_parameter) > 0.0);
///     Ok(())
/// }
///
/// run().expect("simulated search and key exchange");
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
