// src/core/state.rs

use num_complex::Complex;
use num_traits::Zero;
use std::fmt;

/// Amplitudes over the items of a collection, one complex entry per index.
///
/// The simulator starts from an equal superposition, applies oracle and
/// diffusion steps, then samples an index with probability `|a_i|^2`.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeRegister {
    amplitudes: Vec<Complex<f64>>,
}

impl AmplitudeRegister {
    /// Creates a register from raw amplitudes. No normalization is enforced here.
    pub(crate) fn new(amplitudes: Vec<Complex<f64>>) -> Self {
        Self { amplitudes }
    }

    /// Equal superposition over `dim` items. Empty for `dim == 0`.
    pub fn uniform(dim: usize) -> Self {
        if dim == 0 {
            return Self::new(Vec::new());
        }
        let amp = Complex::new(1.0 / (dim as f64).sqrt(), 0.0);
        Self::new(vec![amp; dim])
    }

    /// Read-only view of the amplitudes.
    pub fn vector(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    /// Number of items covered by the register.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Probability of observing `index`.
    pub fn probability(&self, index: usize) -> f64 {
        self.amplitudes.get(index).map(|c| c.norm_sqr()).unwrap_or(0.0)
    }

    /// Total probability mass on the given indices.
    pub fn probability_of(&self, indices: &[usize]) -> f64 {
        indices.iter().map(|&i| self.probability(i)).sum()
    }

    /// Flips the phase of every marked index.
    pub(crate) fn apply_oracle(&mut self, marked: &[usize]) {
        for &i in marked {
            if let Some(amp) = self.amplitudes.get_mut(i) {
                *amp = -*amp;
            }
        }
    }

    /// Inversion about the mean: `a_i -> 2·mean - a_i`.
    pub(crate) fn apply_diffusion(&mut self) {
        let dim = self.dim();
        if dim == 0 {
            return;
        }
        let sum = self.amplitudes.iter().fold(Complex::<f64>::zero(), |acc, c| acc + c);
        let twice_mean = sum * (2.0 / dim as f64);
        for amp in self.amplitudes.iter_mut() {
            *amp = twice_mean - *amp;
        }
    }
}

impl fmt::Display for AmplitudeRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amplitudes[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}
