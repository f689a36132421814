// tests/search_tests.rs

use qkit::backend::{Backend, CountMode};
use qkit::search::{self, estimate_match_count};
use qkit::{
    IterationStrategy, KeyDistributionOptions, KeyDistributionOutcome, QkitError, SamplingStrategy, SearchOptions,
    Simulator,
};
use std::cell::{Cell, RefCell};

// Backend that answers every amplification request with a fixed index and
// counts how often it was asked.
struct ScriptedBackend {
    answer: Option<usize>,
    amplifications: Cell<u32>,
}

impl ScriptedBackend {
    fn new(answer: Option<usize>) -> Self {
        Self { answer, amplifications: Cell::new(0) }
    }
}

impl Backend for ScriptedBackend {
    fn count_matches<T, P>(&self, items: &[T], predicate: &P, _mode: CountMode) -> Result<usize, QkitError>
    where
        P: Fn(&T) -> bool,
    {
        Ok(items.iter().filter(|item| predicate(*item)).count())
    }

    fn run_amplification<T, P>(&self, _items: &[T], _predicate: &P, _iterations: usize) -> Result<Option<usize>, QkitError>
    where
        P: Fn(&T) -> bool,
    {
        self.amplifications.set(self.amplifications.get() + 1);
        Ok(self.answer)
    }

    fn run_key_exchange(&self, _options: &KeyDistributionOptions) -> Result<KeyDistributionOutcome, QkitError> {
        Ok(KeyDistributionOutcome::default())
    }

    fn random_int(&self, min: i64, _max: i64) -> Result<i64, QkitError> {
        Ok(min)
    }

    fn random_bytes(&self, length: usize) -> Result<Vec<u8>, QkitError> {
        Ok(vec![0; length])
    }
}

// Backend whose counts follow a script (the last entry repeats) and whose
// amplifier always misses.
struct ShiftingCountBackend {
    counts: RefCell<Vec<usize>>,
    count_calls: Cell<u32>,
    amplifications: Cell<u32>,
}

impl ShiftingCountBackend {
    fn new(counts: Vec<usize>) -> Self {
        Self { counts: RefCell::new(counts), count_calls: Cell::new(0), amplifications: Cell::new(0) }
    }
}

impl Backend for ShiftingCountBackend {
    fn count_matches<T, P>(&self, _items: &[T], _predicate: &P, _mode: CountMode) -> Result<usize, QkitError>
    where
        P: Fn(&T) -> bool,
    {
        self.count_calls.set(self.count_calls.get() + 1);
        let mut counts = self.counts.borrow_mut();
        Ok(if counts.len() > 1 { counts.remove(0) } else { counts[0] })
    }

    fn run_amplification<T, P>(&self, _items: &[T], _predicate: &P, _iterations: usize) -> Result<Option<usize>, QkitError>
    where
        P: Fn(&T) -> bool,
    {
        self.amplifications.set(self.amplifications.get() + 1);
        Ok(None)
    }

    fn run_key_exchange(&self, _options: &KeyDistributionOptions) -> Result<KeyDistributionOutcome, QkitError> {
        Ok(KeyDistributionOutcome::default())
    }

    fn random_int(&self, min: i64, _max: i64) -> Result<i64, QkitError> {
        Ok(min)
    }

    fn random_bytes(&self, length: usize) -> Result<Vec<u8>, QkitError> {
        Ok(vec![0; length])
    }
}

#[test]
fn test_sampling_estimate_is_unbiased() -> Result<(), QkitError> {
    let items: Vec<u32> = (0..1000).collect();
    let predicate = |x: &u32| x % 10 == 0;
    let options = SearchOptions { sampling_strategy: SamplingStrategy::Sampling(100), ..SearchOptions::default() };
    let sim = Simulator::new();

    let runs = 200;
    let mut total = 0usize;
    for _ in 0..runs {
        let estimate = estimate_match_count(&sim, &items, &predicate, &options)?;
        assert!(estimate <= items.len());
        total += estimate;
    }
    let mean = total as f64 / runs as f64;
    assert!((mean - 100.0).abs() < 10.0, "mean estimate {} too far from 100", mean);
    Ok(())
}

#[test]
fn test_assume_one_ignores_collection() -> Result<(), QkitError> {
    let items: Vec<u32> = (0..500).collect();
    let options = SearchOptions { sampling_strategy: SamplingStrategy::AssumeOne, ..SearchOptions::default() };
    assert_eq!(estimate_match_count(&Simulator::new(), &items, &|_: &u32| true, &options)?, 1);
    Ok(())
}

#[test]
fn test_plan_for_eight_items() -> Result<(), QkitError> {
    let items: Vec<u8> = (0..8).collect();
    let options = SearchOptions { sampling_strategy: SamplingStrategy::FullScan, ..SearchOptions::default() };
    let plan = search::plan(&Simulator::new(), &items, &|x: &u8| *x == 3, &options)?;
    assert_eq!(plan.collection_size, 8);
    assert_eq!(plan.estimated_matches, 1);
    assert_eq!(plan.iterations, 2);
    assert_eq!(plan.max_attempts, 5);
    Ok(())
}

#[test]
fn test_search_finds_all_targets() -> Result<(), QkitError> {
    let items: Vec<u32> = (0..512).collect();
    let options = SearchOptions {
        sampling_strategy: SamplingStrategy::FullScan,
        max_attempts: 20,
        ..SearchOptions::default()
    };
    let found = search::search(&Simulator::new().with_seed(8), &items, &|x: &u32| *x == 9 || *x == 400, &options)?;
    let mut indices: Vec<usize> = found.iter().map(|m| m.index).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![9, 400]);
    Ok(())
}

#[test]
fn test_max_targets_caps_results() -> Result<(), QkitError> {
    let items: Vec<u32> = (0..256).collect();
    let options = SearchOptions {
        sampling_strategy: SamplingStrategy::FullScan,
        max_targets: 1,
        ..SearchOptions::default()
    };
    let found = search::search(&Simulator::new(), &items, &|x: &u32| x % 64 == 0, &options)?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].item % 64, 0);
    Ok(())
}

#[test]
fn test_search_one_end_to_end() -> Result<(), QkitError> {
    let words = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel"];
    let found = search::search_one(&Simulator::new(), &words, &|w: &&str| *w == "golf", &SearchOptions::default())?;
    assert_eq!(found.index, 6);
    assert_eq!(*found.item, "golf");
    Ok(())
}

#[test]
fn test_no_matching_item() {
    let items: Vec<u32> = (0..100).collect();
    let options = SearchOptions { sampling_strategy: SamplingStrategy::FullScan, ..SearchOptions::default() };
    let backend = ScriptedBackend::new(None);
    let result = search::search(&backend, &items, &|x: &u32| *x > 1000, &options);
    assert!(matches!(result, Err(QkitError::NoMatches)));
    // An estimate of zero never reaches the amplifier.
    assert_eq!(backend.amplifications.get(), 0);
}

#[test]
fn test_attempts_exhausted() {
    let items: Vec<u32> = (0..100).collect();
    let options = SearchOptions { max_attempts: 4, ..SearchOptions::default() };
    let backend = ScriptedBackend::new(None);
    let result = search::search(&backend, &items, &|x: &u32| *x == 50, &options);
    assert!(matches!(result, Err(QkitError::NoMatches)));
    assert_eq!(backend.amplifications.get(), 4);
}

#[test]
fn test_zero_attempts_still_tries_once() {
    let items: Vec<u32> = (0..100).collect();
    let options = SearchOptions { max_attempts: 0, ..SearchOptions::default() };
    let backend = ScriptedBackend::new(None);
    let _ = search::search(&backend, &items, &|x: &u32| *x == 50, &options);
    assert_eq!(backend.amplifications.get(), 1);
}

#[test]
fn test_bogus_backend_hit_is_a_backend_error() {
    let items: Vec<u32> = (0..100).collect();
    let predicate = |x: &u32| *x == 50;

    let wrong_item = ScriptedBackend::new(Some(3));
    let result = search::search(&wrong_item, &items, &predicate, &SearchOptions::default());
    assert!(matches!(result, Err(QkitError::Backend { .. })));

    let out_of_range = ScriptedBackend::new(Some(100));
    let result = search::search(&out_of_range, &items, &predicate, &SearchOptions::default());
    assert!(matches!(result, Err(QkitError::Backend { .. })));
}

#[test]
fn test_saturated_collection_skips_amplification() -> Result<(), QkitError> {
    let items = vec![2u32, 4, 6, 8];
    let backend = ScriptedBackend::new(None);
    let found = search::search(&backend, &items, &|x: &u32| x % 2 == 0, &SearchOptions::default())?;
    assert_eq!(found.len(), 4);
    assert_eq!(backend.amplifications.get(), 0);
    Ok(())
}

#[test]
fn test_empty_collection() {
    let items: Vec<u32> = Vec::new();
    let options = SearchOptions { sampling_strategy: SamplingStrategy::AssumeOne, ..SearchOptions::default() };
    let result = search::search(&Simulator::new(), &items, &|_: &u32| true, &options);
    assert!(matches!(result, Err(QkitError::NoMatches)));
}

#[test]
fn test_invalid_options_fail_before_backend() {
    let items: Vec<u32> = (0..10).collect();
    let options = SearchOptions {
        sampling_strategy: SamplingStrategy::UserProvided(None),
        iteration_strategy: IterationStrategy::Aggressive,
        ..SearchOptions::default()
    };
    let backend = ScriptedBackend::new(Some(0));
    let result = search::search(&backend, &items, &|x: &u32| *x == 0, &options);
    assert!(matches!(result, Err(QkitError::InvalidConfiguration(_))));
    assert_eq!(backend.amplifications.get(), 0);
}

#[test]
fn test_replan_to_saturated_returns_every_match() -> Result<(), QkitError> {
    let items: Vec<u32> = (0..10).collect();
    let options = SearchOptions {
        sampling_strategy: SamplingStrategy::FullScan,
        resample_on_retry: true,
        ..SearchOptions::default()
    };
    let backend = ShiftingCountBackend::new(vec![5, 10]);
    let found = search::search(&backend, &items, &|_: &u32| true, &options)?;
    assert_eq!(found.len(), 10);
    assert_eq!(backend.amplifications.get(), 1);
    assert_eq!(backend.count_calls.get(), 2);
    Ok(())
}

#[test]
fn test_replan_keeps_attempt_budget() {
    let items: Vec<u32> = (0..100).collect();
    let options = SearchOptions {
        sampling_strategy: SamplingStrategy::FullScan,
        resample_on_retry: true,
        max_attempts: 3,
        ..SearchOptions::default()
    };
    let backend = ShiftingCountBackend::new(vec![1, 4, 2]);
    let result = search::search(&backend, &items, &|x: &u32| *x == 7, &options);
    assert!(matches!(result, Err(QkitError::NoMatches)));
    assert_eq!(backend.amplifications.get(), 3);
    // One estimate up front, then one after each miss except the last.
    assert_eq!(backend.count_calls.get(), 3);
}

#[test]
fn test_plan_reused_without_resampling() {
    let items: Vec<u32> = (0..100).collect();
    let options = SearchOptions { sampling_strategy: SamplingStrategy::FullScan, max_attempts: 3, ..SearchOptions::default() };
    let backend = ShiftingCountBackend::new(vec![1, 100]);
    let result = search::search(&backend, &items, &|x: &u32| *x == 7, &options);
    assert!(matches!(result, Err(QkitError::NoMatches)));
    assert_eq!(backend.amplifications.get(), 3);
    assert_eq!(backend.count_calls.get(), 1);
}
