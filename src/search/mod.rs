// src/search/mod.rs

//! Unstructured search by amplitude amplification.
//!
//! Searching happens in two steps. The planner estimates how many items
//! match, turns that estimate into a rotation angle and then into an
//! iteration count. The runner invokes the backend with that fixed plan
//! under a bounded number of attempts.

mod planner;
mod runner;

pub use planner::{
    compute_iterations, estimate_match_count, iteration_ceiling, plan, plan_with_estimate, rotation_angle,
};
pub use runner::{search, search_one};

use serde::{Deserialize, Serialize};
use std::fmt;

/// How many amplification rounds to run relative to the optimum.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum IterationStrategy {
    /// `round(π/(4θ) − 0.5)`, the count that maximizes hit probability.
    #[default]
    Optimal,
    /// Exactly one round. Suited to tiny collections or a match fraction near one half.
    SingleIteration,
    /// `round(π/(4θ))`, at or just past the optimum.
    Aggressive,
    /// `round(π/(4θ) − 1)`, one round short of the optimum.
    Conservative,
    /// `round(π/(8θ))`, roughly half the optimum.
    HalfOptimal,
    /// `round(optimal · factor + offset)`.
    Custom {
        /// Multiplier applied to the optimal count
        factor: f64,
        /// Added after scaling, may be negative
        offset: i64,
    },
}

/// How the number of matching items is estimated before planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SamplingStrategy {
    /// Full scan up to `full_scan_threshold` items, sampling above it.
    #[default]
    Auto,
    /// Evaluate the predicate on every item.
    FullScan,
    /// Evaluate it on this many random items and scale up.
    Sampling(usize),
    /// The caller asserts exactly one item matches.
    AssumeOne,
    /// The caller supplies the count. `None` is a configuration error.
    UserProvided(Option<usize>),
}

/// Options for a search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Backend invocations allowed before giving up, clamped to at least one
    pub max_attempts: u32,
    /// Iteration count policy
    pub iteration_strategy: IterationStrategy,
    /// Match-count estimation policy
    pub sampling_strategy: SamplingStrategy,
    /// Sample size used when `Auto` falls back to sampling
    pub sample_size: usize,
    /// Largest collection `Auto` will scan in full
    pub full_scan_threshold: usize,
    /// Known number of matches. When set and non-zero it replaces estimation entirely.
    pub known_match_count: Option<usize>,
    /// Stop once this many distinct matches have been collected
    pub max_targets: usize,
    /// Re-estimate and re-plan after a missed attempt instead of reusing the plan
    pub resample_on_retry: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            iteration_strategy: IterationStrategy::Optimal,
            sampling_strategy: SamplingStrategy::Auto,
            sample_size: 100,
            full_scan_threshold: 1000,
            known_match_count: None,
            max_targets: usize::MAX,
            resample_on_retry: false,
        }
    }
}

/// Resolved parameters for one search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchPlan {
    /// Size of the collection the plan was computed for
    pub collection_size: usize,
    /// Estimated number of matching items
    pub estimated_matches: usize,
    /// Amplification rounds per attempt
    pub iterations: usize,
    /// Attempts allowed, never zero
    pub max_attempts: u32,
}

impl SearchPlan {
    /// No matches are expected, so amplification cannot help.
    pub fn is_empty(&self) -> bool {
        self.estimated_matches == 0
    }

    /// Every item is expected to match; amplification should be skipped.
    pub fn is_saturated(&self) -> bool {
        self.collection_size > 0 && self.estimated_matches >= self.collection_size
    }

    /// True when the backend should actually be asked to amplify.
    pub fn requires_amplification(&self) -> bool {
        !self.is_empty() && !self.is_saturated()
    }
}

impl fmt::Display for SearchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SearchPlan(N={}, M~{}, iterations={}, attempts={})",
            self.collection_size, self.estimated_matches, self.iterations, self.max_attempts
        )
    }
}

/// An item found by a search, with its position in the collection.
#[derive(Debug, PartialEq, Eq)]
pub struct SearchMatch<'a, T> {
    /// Index of the item in the searched slice
    pub index: usize,
    /// The matching item
    pub item: &'a T,
}

impl<T> Clone for SearchMatch<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SearchMatch<'_, T> {}
