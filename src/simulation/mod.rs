// src/simulation/mod.rs

//! In-process backend simulating the quantum primitives classically.
//!
//! Amplitude amplification runs on a full amplitude register, one complex
//! amplitude per collection item. Key exchange samples E91 measurement
//! statistics under a configurable noise and eavesdropping model.

pub(crate) mod e91;
pub(crate) mod engine;

use crate::backend::{Backend, CountMode};
use crate::channel::{KeyDistributionOptions, KeyDistributionOutcome};
use crate::core::{QkitError, Result, status};
use e91::ChannelModel;
use engine::AmplificationEngine;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};

/// Largest collection the simulator will hold in its amplitude register by default.
pub const DEFAULT_MAX_REGISTER_SIZE: usize = 1 << 20;
/// Longest key, in bits, the simulated exchange will produce.
pub const MAX_KEY_LENGTH: usize = 1 << 20;

/// The built-in simulator backend.
///
/// Stateless apart from an optional seed. Without a seed every call draws
/// from a fresh thread-local generator. With a seed, every call derives its
/// own generator from the seed and a call counter, so runs are reproducible
/// while successive calls still see independent draws.
#[derive(Debug)]
pub struct Simulator {
    noise: f64,
    eavesdrop_ratio: f64,
    max_register_size: usize,
    seed: Option<u64>,
    calls: AtomicU64,
}

impl Default for Simulator {
    fn default() -> Self {
        Self {
            noise: 0.0,
            eavesdrop_ratio: 0.0,
            max_register_size: DEFAULT_MAX_REGISTER_SIZE,
            seed: None,
            calls: AtomicU64::new(0),
        }
    }
}

impl Clone for Simulator {
    fn clone(&self) -> Self {
        Self {
            noise: self.noise,
            eavesdrop_ratio: self.eavesdrop_ratio,
            max_register_size: self.max_register_size,
            seed: self.seed,
            calls: AtomicU64::new(self.calls.load(Ordering::Relaxed)),
        }
    }
}

impl Simulator {
    /// Creates a noise-free simulator with no eavesdropper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the probability that a transmitted outcome is flipped, clamped to [0, 1].
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = clamp_probability(noise);
        self
    }

    /// Sets the fraction of pairs an intercept-resend eavesdropper measures, clamped to [0, 1].
    pub fn with_eavesdropper(mut self, ratio: f64) -> Self {
        self.eavesdrop_ratio = clamp_probability(ratio);
        self
    }

    /// Makes every call reproducible from `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Caps the collection size accepted by [`Backend::run_amplification`].
    pub fn with_max_register_size(mut self, size: usize) -> Self {
        self.max_register_size = size;
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => {
                let call = self.calls.fetch_add(1, Ordering::Relaxed);
                StdRng::seed_from_u64(seed ^ call.wrapping_mul(0x9E37_79B9_7F4A_7C15))
            }
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

impl Backend for Simulator {
    fn count_matches<T, P>(&self, items: &[T], predicate: &P, mode: CountMode) -> Result<usize>
    where
        P: Fn(&T) -> bool,
    {
        match mode {
            CountMode::Full => Ok(items.iter().filter(|item| predicate(*item)).count()),
            CountMode::Sample(size) => {
                let drawn = size.min(items.len());
                let mut rng = self.rng();
                let indices = rand::seq::index::sample(&mut rng, items.len(), drawn);
                Ok(indices.iter().filter(|&i| predicate(&items[i])).count())
            }
        }
    }

    fn run_amplification<T, P>(&self, items: &[T], predicate: &P, iterations: usize) -> Result<Option<usize>>
    where
        P: Fn(&T) -> bool,
    {
        if items.is_empty() {
            return Ok(None);
        }
        if items.len() > self.max_register_size {
            return Err(QkitError::InvalidInput(format!(
                "collection of {} items exceeds the simulator register limit of {}",
                items.len(),
                self.max_register_size
            )));
        }

        let marked: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| predicate(*item))
            .map(|(i, _)| i)
            .collect();

        let mut engine = AmplificationEngine::init(items.len(), marked)?;
        engine.amplify(iterations)?;
        let index = engine.measure(&mut self.rng())?;
        tracing::debug!(
            collection_size = items.len(),
            iterations,
            success_probability = engine.success_probability(),
            index,
            "Amplification measured"
        );

        Ok(predicate(&items[index]).then_some(index))
    }

    fn run_key_exchange(&self, options: &KeyDistributionOptions) -> Result<KeyDistributionOutcome> {
        if options.key_length > MAX_KEY_LENGTH {
            return Err(QkitError::InvalidInput(format!(
                "key length of {} bits exceeds the simulator limit of {}",
                options.key_length, MAX_KEY_LENGTH
            )));
        }
        let model = ChannelModel { noise: self.noise, eavesdrop_ratio: self.eavesdrop_ratio };
        Ok(e91::run(options, model, &mut self.rng()))
    }

    fn random_int(&self, min: i64, max: i64) -> Result<i64> {
        if min > max {
            return Err(QkitError::backend(status::INVALID_ARGUMENT, "min exceeds max"));
        }
        Ok(self.rng().random_range(min..=max))
    }

    fn random_bytes(&self, length: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; length];
        self.rng().fill(&mut bytes[..]);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_count() -> Result<()> {
        let items: Vec<u32> = (0..100).collect();
        let count = Simulator::new().count_matches(&items, &|x: &u32| x % 3 == 0, CountMode::Full)?;
        assert_eq!(count, 34);
        Ok(())
    }

    #[test]
    fn test_sample_count_is_bounded_by_sample() -> Result<()> {
        let items: Vec<u32> = (0..1000).collect();
        let sim = Simulator::new();
        for _ in 0..20 {
            let count = sim.count_matches(&items, &|_: &u32| true, CountMode::Sample(37))?;
            assert_eq!(count, 37);
        }
        assert_eq!(sim.count_matches(&items, &|_: &u32| true, CountMode::Sample(5000))?, 1000);
        Ok(())
    }

    #[test]
    fn test_seeded_calls_differ_but_replay() -> Result<()> {
        let a = Simulator::new().with_seed(11);
        let b = Simulator::new().with_seed(11);
        let first = a.random_bytes(16)?;
        let second = a.random_bytes(16)?;
        assert_ne!(first, second, "successive calls must not reuse a draw");
        assert_eq!(first, b.random_bytes(16)?);
        assert_eq!(second, b.random_bytes(16)?);
        Ok(())
    }

    #[test]
    fn test_amplification_finds_single_match() -> Result<()> {
        let items: Vec<u32> = (0..256).collect();
        let sim = Simulator::new().with_seed(3);
        // Optimal for N=256, M=1 is 12 rounds, success probability above 0.99.
        let mut hits = 0;
        for _ in 0..20 {
            if sim.run_amplification(&items, &|x: &u32| *x == 200, 12)? == Some(200) {
                hits += 1;
            }
        }
        assert!(hits >= 18, "only {} hits out of 20", hits);
        Ok(())
    }

    #[test]
    fn test_register_limit() {
        let items = vec![0u8; 64];
        let sim = Simulator::new().with_max_register_size(32);
        let result = sim.run_amplification(&items, &|x: &u8| *x == 1, 1);
        assert!(matches!(result, Err(QkitError::InvalidInput(_))));
    }

    #[test]
    fn test_oversized_key_is_rejected() {
        let sim = Simulator::new();
        for key_length in [MAX_KEY_LENGTH + 1, usize::MAX] {
            let options = KeyDistributionOptions { key_length, ..KeyDistributionOptions::default() };
            let result = crate::channel::generate_key(&sim, &options);
            assert!(matches!(result, Err(QkitError::InvalidInput(_))), "accepted {} bits", key_length);
        }
    }

    #[test]
    fn test_probabilities_are_clamped() {
        let sim = Simulator::new().with_noise(3.0).with_eavesdropper(f64::NAN);
        assert_eq!(sim.noise, 1.0);
        assert_eq!(sim.eavesdrop_ratio, 0.0);
    }
}
