// src/backend/mod.rs

//! The interface to whatever executes the quantum primitives.
//!
//! Planning and evaluation in this crate are pure; every call that may block,
//! touch hardware or draw randomness goes through a [`Backend`]. The crate
//! ships [`crate::simulation::Simulator`] as an in-process implementation.

use crate::channel::{KeyDistributionOptions, KeyDistributionOutcome};
use crate::core::Result;

/// How [`Backend::count_matches`] should count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMode {
    /// Evaluate the predicate on every item.
    Full,
    /// Evaluate it on this many distinct items drawn uniformly at random.
    /// The count returned is the number of matches inside the sample.
    Sample(usize),
}

/// Synchronous operations a quantum backend provides.
///
/// Implementations must be reentrant or serialize access themselves, since
/// a context may be shared across threads. Sampling must use an independent
/// random draw per call.
pub trait Backend {
    /// Classical oracle counting over `items`.
    fn count_matches<T, P>(&self, items: &[T], predicate: &P, mode: CountMode) -> Result<usize>
    where
        P: Fn(&T) -> bool;

    /// Runs amplitude amplification with exactly `iterations` rounds and
    /// measures once. Returns the index of a verified hit, or `None` if the
    /// measured item does not satisfy the predicate.
    fn run_amplification<T, P>(&self, items: &[T], predicate: &P, iterations: usize) -> Result<Option<usize>>
    where
        P: Fn(&T) -> bool;

    /// Runs one key-exchange round trip.
    ///
    /// A protocol-level failure is reported through `success == false` on the
    /// outcome; `Err` is reserved for backend or transport faults.
    fn run_key_exchange(&self, options: &KeyDistributionOptions) -> Result<KeyDistributionOutcome>;

    /// Random integer in the inclusive range `[min, max]`. Callers guarantee `min < max`.
    fn random_int(&self, min: i64, max: i64) -> Result<i64>;

    /// `length` random bytes. Callers guarantee `length > 0`.
    fn random_bytes(&self, length: usize) -> Result<Vec<u8>>;
}
