// src/search/planner.rs

use super::{IterationStrategy, SamplingStrategy, SearchOptions, SearchPlan};
use crate::backend::{Backend, CountMode};
use crate::core::{MAX_ITERATIONS, PI, QkitError, Result};
use crate::validation;

/// Estimates how many items of `items` satisfy `predicate`.
///
/// A non-zero `known_match_count` is returned as is. Otherwise an empty
/// collection gives 0 and the sampling strategy decides how the backend
/// is asked to count.
///
/// # Errors
/// * `QkitError::InvalidConfiguration` for `UserProvided(None)` or a zero sample size.
/// * Any error raised by the backend while counting.
pub fn estimate_match_count<T, P, B>(backend: &B, items: &[T], predicate: &P, options: &SearchOptions) -> Result<usize>
where
    B: Backend,
    P: Fn(&T) -> bool,
{
    if let Some(known) = options.known_match_count.filter(|&count| count > 0) {
        return Ok(known);
    }

    let n = items.len();
    if n == 0 {
        return Ok(0);
    }

    match options.sampling_strategy {
        SamplingStrategy::UserProvided(Some(count)) => Ok(count),
        SamplingStrategy::UserProvided(None) => Err(QkitError::InvalidConfiguration(
            "UserProvided sampling requires a match count".to_string(),
        )),
        SamplingStrategy::FullScan => backend.count_matches(items, predicate, CountMode::Full),
        SamplingStrategy::Sampling(sample_size) => sampled_estimate(backend, items, predicate, sample_size),
        SamplingStrategy::AssumeOne => Ok(1),
        SamplingStrategy::Auto => {
            if n <= options.full_scan_threshold {
                backend.count_matches(items, predicate, CountMode::Full)
            } else {
                sampled_estimate(backend, items, predicate, options.sample_size)
            }
        }
    }
}

/// Counts matches in a random sample and scales the count to the whole collection.
fn sampled_estimate<T, P, B>(backend: &B, items: &[T], predicate: &P, sample_size: usize) -> Result<usize>
where
    B: Backend,
    P: Fn(&T) -> bool,
{
    if sample_size == 0 {
        return Err(QkitError::InvalidConfiguration("sample size must be greater than zero".to_string()));
    }
    let n = items.len();
    let drawn = sample_size.min(n);
    let hits = backend.count_matches(items, predicate, CountMode::Sample(drawn))?;
    if drawn == n {
        return Ok(hits.min(n));
    }
    let scaled = (hits as f64 * n as f64 / drawn as f64).round();
    Ok((scaled.max(0.0) as usize).min(n))
}

/// Grover rotation angle `asin(sqrt(M/N))`.
///
/// Returns `None` when no rotation is defined: no items, no matches, or
/// every item matching.
pub fn rotation_angle(collection_size: usize, estimated_matches: usize) -> Option<f64> {
    if collection_size == 0 || estimated_matches == 0 || estimated_matches >= collection_size {
        return None;
    }
    Some((estimated_matches as f64 / collection_size as f64).sqrt().asin())
}

/// Number of amplification rounds for `estimated_matches` out of `collection_size`.
///
/// Returns 0 whenever [`rotation_angle`] is undefined. For the zero-match
/// case the caller should report "no match"; for the saturated case it
/// should skip amplification and take every item.
pub fn compute_iterations(collection_size: usize, estimated_matches: usize, strategy: IterationStrategy) -> usize {
    let Some(angle) = rotation_angle(collection_size, estimated_matches) else {
        return 0;
    };

    let quarter_turn = PI / (4.0 * angle);
    let optimal = (quarter_turn - 0.5).round().max(0.0);

    let iterations = match strategy {
        IterationStrategy::Optimal => optimal,
        IterationStrategy::SingleIteration => 1.0,
        IterationStrategy::Aggressive => quarter_turn.round(),
        IterationStrategy::Conservative => (quarter_turn - 1.0).round().max(0.0),
        IterationStrategy::HalfOptimal => (PI / (8.0 * angle)).round(),
        IterationStrategy::Custom { factor, offset } => (optimal * factor + offset as f64).round().max(0.0),
    };

    // NaN from a non-finite custom factor saturates to 0.
    iterations as usize
}

/// Largest iteration count any plan may carry for a collection of this size.
///
/// One round past the single-match optimum `π/4·√N`, itself capped by
/// [`MAX_ITERATIONS`].
pub fn iteration_ceiling(collection_size: usize) -> usize {
    let single_match_optimum = (PI / 4.0 * (collection_size as f64).sqrt()).ceil() as usize;
    single_match_optimum.saturating_add(1).min(MAX_ITERATIONS)
}

/// Builds a plan from an already known estimate. Pure.
pub fn plan_with_estimate(collection_size: usize, estimated_matches: usize, options: &SearchOptions) -> SearchPlan {
    let iterations = compute_iterations(collection_size, estimated_matches, options.iteration_strategy)
        .min(iteration_ceiling(collection_size));

    let plan = SearchPlan {
        collection_size,
        estimated_matches,
        iterations,
        max_attempts: options.max_attempts.max(1),
    };
    tracing::debug!(
        collection_size,
        estimated_matches,
        angle = rotation_angle(collection_size, estimated_matches).unwrap_or(0.0),
        iterations,
        strategy = ?options.iteration_strategy,
        "Search plan computed"
    );
    plan
}

/// Validates `options`, estimates the match count and builds a plan.
pub fn plan<T, P, B>(backend: &B, items: &[T], predicate: &P, options: &SearchOptions) -> Result<SearchPlan>
where
    B: Backend,
    P: Fn(&T) -> bool,
{
    validation::validate_search_options(options)?;
    let estimated = estimate_match_count(backend, items, predicate, options)?;
    Ok(plan_with_estimate(items.len(), estimated, options))
}
