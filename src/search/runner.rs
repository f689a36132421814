// src/search/runner.rs

use super::{SamplingStrategy, SearchMatch, SearchOptions, SearchPlan, planner};
use crate::backend::Backend;
use crate::core::{QkitError, Result, status};
use std::collections::HashSet;

/// Attempts allowed by [`search_one`].
const SEARCH_ONE_ATTEMPTS: u32 = 3;

/// Searches `items` for entries satisfying `predicate`.
///
/// The plan is computed once and every attempt reuses it, unless
/// `resample_on_retry` is set, in which case a missed attempt triggers a
/// fresh estimate before the next one. A fresh estimate covering the whole
/// collection switches to a classical scan. Distinct verified hits are collected
/// until `min(estimated_matches, max_targets)` are found or attempts run out.
///
/// # Errors
/// * `QkitError::NoMatches` if no attempt produced a verified hit, or the
///   estimate says nothing matches.
/// * Configuration and backend errors are propagated unchanged.
pub fn search<'a, T, P, B>(
    backend: &B,
    items: &'a [T],
    predicate: &P,
    options: &SearchOptions,
) -> Result<Vec<SearchMatch<'a, T>>>
where
    B: Backend,
    P: Fn(&T) -> bool,
{
    let mut plan = planner::plan(backend, items, predicate, options)?;

    if plan.is_empty() {
        tracing::info!(collection_size = items.len(), "Search skipped: no matches estimated");
        return Err(QkitError::NoMatches);
    }
    if plan.is_saturated() {
        return collect_all(items, predicate, options.max_targets);
    }

    let mut target = plan.estimated_matches.min(options.max_targets).max(1);
    let mut seen = HashSet::new();
    let mut matches = Vec::new();

    for attempt in 1..=plan.max_attempts {
        let hit = if plan.requires_amplification() {
            backend.run_amplification(items, predicate, plan.iterations)?
        } else {
            None
        };

        match hit {
            Some(index) => {
                let item = items.get(index).ok_or_else(|| {
                    QkitError::backend(
                        status::RUNTIME,
                        format!("backend returned index {} for a collection of {}", index, items.len()),
                    )
                })?;
                if !predicate(item) {
                    return Err(QkitError::backend(
                        status::RUNTIME,
                        format!("backend reported a hit at index {} that fails the predicate", index),
                    ));
                }
                if seen.insert(index) {
                    matches.push(SearchMatch { index, item });
                }
            }
            None => {
                tracing::warn!(attempt, max_attempts = plan.max_attempts, "Search attempt returned no match");
                if options.resample_on_retry && attempt < plan.max_attempts {
                    plan = replan(backend, items, predicate, options, plan)?;
                    if plan.is_saturated() {
                        return collect_all(items, predicate, options.max_targets);
                    }
                    if plan.is_empty() {
                        break;
                    }
                    target = plan.estimated_matches.min(options.max_targets).max(1);
                }
            }
        }

        if matches.len() >= target {
            break;
        }
    }

    if matches.is_empty() {
        return Err(QkitError::NoMatches);
    }
    tracing::info!(
        collection_size = items.len(),
        found = matches.len(),
        iterations = plan.iterations,
        "Search completed"
    );
    Ok(matches)
}

/// Searches for a single match, assuming exactly one item matches.
///
/// Uses `AssumeOne` sampling, three attempts and a target of one match;
/// every other option is taken from `options`.
pub fn search_one<'a, T, P, B>(
    backend: &B,
    items: &'a [T],
    predicate: &P,
    options: &SearchOptions,
) -> Result<SearchMatch<'a, T>>
where
    B: Backend,
    P: Fn(&T) -> bool,
{
    let single = SearchOptions {
        sampling_strategy: SamplingStrategy::AssumeOne,
        max_attempts: SEARCH_ONE_ATTEMPTS,
        max_targets: 1,
        ..options.clone()
    };
    search(backend, items, predicate, &single)?
        .into_iter()
        .next()
        .ok_or(QkitError::NoMatches)
}

/// Re-estimates after a miss. The attempt budget of the first plan is kept.
fn replan<T, P, B>(
    backend: &B,
    items: &[T],
    predicate: &P,
    options: &SearchOptions,
    previous: SearchPlan,
) -> Result<SearchPlan>
where
    B: Backend,
    P: Fn(&T) -> bool,
{
    let estimated = planner::estimate_match_count(backend, items, predicate, options)?;
    let fresh = planner::plan_with_estimate(items.len(), estimated, options);
    Ok(SearchPlan { max_attempts: previous.max_attempts, ..fresh })
}

/// Saturated case: every item is expected to match, so scan classically.
fn collect_all<'a, T, P>(items: &'a [T], predicate: &P, max_targets: usize) -> Result<Vec<SearchMatch<'a, T>>>
where
    P: Fn(&T) -> bool,
{
    let matches: Vec<_> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| predicate(*item))
        .take(max_targets)
        .map(|(index, item)| SearchMatch { index, item })
        .collect();
    if matches.is_empty() {
        return Err(QkitError::NoMatches);
    }
    tracing::info!(collection_size = items.len(), found = matches.len(), "Search saturated, amplification skipped");
    Ok(matches)
}
