// src/simulation/engine.rs
use crate::core::{AmplitudeRegister, QkitError, Result, status};
use crate::validation::check_normalization;
use rand::Rng;

/// Amplitudes below this are treated as zero when sampling.
const AMPLITUDE_TOLERANCE: f64 = 1e-12;
/// Accumulated rounding allowed after many oracle/diffusion rounds.
const NORM_TOLERANCE: f64 = 1e-6;

/// Runs amplitude amplification over one collection.
/// (Internal visibility)
pub(crate) struct AmplificationEngine {
    /// One amplitude per collection item.
    register: AmplitudeRegister,
    /// Indices the oracle marks.
    marked: Vec<usize>,
}

impl AmplificationEngine {
    /// Initializes the engine in equal superposition over `dim` items.
    pub(crate) fn init(dim: usize, marked: Vec<usize>) -> Result<Self> {
        if dim == 0 {
            return Err(QkitError::InvalidInput("Cannot amplify over an empty collection".to_string()));
        }
        if let Some(&out_of_range) = marked.iter().find(|&&i| i >= dim) {
            return Err(QkitError::InvalidInput(format!(
                "Marked index {} outside a collection of {}",
                out_of_range, dim
            )));
        }
        Ok(Self { register: AmplitudeRegister::uniform(dim), marked })
    }

    #[cfg(test)]
    pub(crate) fn register(&self) -> &AmplitudeRegister {
        &self.register
    }

    /// Applies `iterations` rounds of oracle followed by diffusion, then
    /// checks the register is still normalized.
    pub(crate) fn amplify(&mut self, iterations: usize) -> Result<()> {
        for _ in 0..iterations {
            self.register.apply_oracle(&self.marked);
            self.register.apply_diffusion();
        }
        check_normalization(&self.register, Some(NORM_TOLERANCE))
    }

    /// Probability that a measurement lands on a marked index.
    pub(crate) fn success_probability(&self) -> f64 {
        self.register.probability_of(&self.marked)
    }

    /// Samples one index with probability `|a_i|^2`.
    pub(crate) fn measure<R: Rng>(&self, rng: &mut R) -> Result<usize> {
        let amplitudes = self.register.vector();
        let total: f64 = amplitudes.iter().map(|c| c.norm_sqr()).sum();
        if !total.is_finite() || total < AMPLITUDE_TOLERANCE {
            return Err(QkitError::backend(
                status::RUNTIME,
                "Amplitude register has negligible norm, nothing to measure",
            ));
        }

        let p_sample: f64 = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        let mut last_candidate = None;
        for (index, amp) in amplitudes.iter().enumerate() {
            let p = amp.norm_sqr();
            if p <= AMPLITUDE_TOLERANCE {
                continue;
            }
            cumulative += p;
            last_candidate = Some(index);
            if p_sample < cumulative {
                return Ok(index);
            }
        }
        // p_sample can reach the total through rounding; fall back to the last candidate.
        last_candidate.ok_or_else(|| {
            QkitError::backend(status::RUNTIME, "No index carried measurable amplitude")
        })
    }
}
