// src/channel/mod.rs

//! Trust evaluation for entanglement-based key distribution.
//!
//! A key-exchange run reports a CHSH value and an error rate. This module
//! maps the CHSH value to a 0-100 security margin and decides whether the
//! channel can be trusted. Both checks are needed because they catch
//! different failures: a low CHSH value points to an eavesdropper, a high
//! error rate to a noisy channel.

mod keydist;

pub use keydist::{
    VERIFY_KEY_LENGTH, VERIFY_MAX_ATTEMPTS, ChannelReport, generate_key, generate_key_with_retries,
    verify_channel_security,
};

use crate::core::{CLASSICAL_LIMIT, QUANTUM_MAX};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Options for one key distribution request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyDistributionOptions {
    /// Requested key length in bits, must be non-zero
    pub key_length: usize,
    /// Security level from 1 (fastest) to 5 (most CHSH samples)
    pub security_level: u8,
    /// Minimum accepted CHSH value, in (2.0, 2√2]
    pub security_threshold: f64,
    /// Key-exchange attempts allowed by the retry wrapper
    pub max_attempts: u32,
    /// Whether the backend may reconcile a non-zero error rate
    pub error_correction: bool,
    /// Highest accepted error rate, in [0, 1]
    pub max_acceptable_error_rate: f64,
}

impl Default for KeyDistributionOptions {
    fn default() -> Self {
        Self {
            key_length: 256,
            security_level: 3,
            security_threshold: 2.2,
            max_attempts: 5,
            error_correction: true,
            max_acceptable_error_rate: 0.12,
        }
    }
}

impl KeyDistributionOptions {
    /// Number of bytes a key of `key_length` bits occupies.
    pub fn key_bytes(&self) -> usize {
        self.key_length.div_ceil(8)
    }
}

/// What one key-exchange run produced.
///
/// Immutable once built. The key is only meaningful when `success` is set
/// and is wiped from memory on drop.
#[derive(Clone, Default, PartialEq)]
pub struct KeyDistributionOutcome {
    /// Whether the backend produced a usable key
    pub success: bool,
    /// Shared key material
    pub key: Zeroizing<Vec<u8>>,
    /// Opaque authentication tag, passed through from the backend
    pub authentication_tag: Vec<u8>,
    /// Measured CHSH value
    pub security_parameter: f64,
    /// Observed quantum bit error rate in [0, 1]
    pub error_rate: f64,
    /// Entangled pairs consumed by the run
    pub entangled_pairs_created: u64,
    /// Why the run failed, when it did
    pub failure_reason: Option<String>,
}

impl KeyDistributionOutcome {
    /// Security margin of this run's CHSH value. See [`security_margin`].
    pub fn security_margin(&self) -> f64 {
        security_margin(self.security_parameter)
    }
}

// Key bytes are never printed.
impl fmt::Debug for KeyDistributionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDistributionOutcome")
            .field("success", &self.success)
            .field("key", &format_args!("<{} bytes redacted>", self.key.len()))
            .field("authentication_tag_len", &self.authentication_tag.len())
            .field("security_parameter", &self.security_parameter)
            .field("error_rate", &self.error_rate)
            .field("entangled_pairs_created", &self.entangled_pairs_created)
            .field("failure_reason", &self.failure_reason)
            .finish()
    }
}

impl fmt::Display for KeyDistributionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            write!(f, "Key({} bytes", self.key.len())?;
        } else {
            write!(f, "Failed({}", self.failure_reason.as_deref().unwrap_or("Unknown failure"))?;
        }
        write!(
            f,
            ", S={:.4}, margin={:.1}%, QBER={:.4}, pairs={})",
            self.security_parameter,
            self.security_margin(),
            self.error_rate,
            self.entangled_pairs_created
        )
    }
}

/// Maps a CHSH value onto a 0-100 margin above the classical limit.
///
/// 2.0 or below gives 0, Tsirelson's bound 2√2 or above gives 100, and
/// values in between are interpolated linearly. Inputs outside the physical
/// range (measurement noise can overshoot 2√2) are clamped, never rejected.
/// NaN maps to 0.
pub fn security_margin(security_parameter: f64) -> f64 {
    let margin = security_parameter - CLASSICAL_LIMIT;
    let max_margin = QUANTUM_MAX - CLASSICAL_LIMIT;

    if margin.is_nan() || margin <= 0.0 {
        return 0.0;
    }
    if margin >= max_margin {
        return 100.0;
    }
    100.0 * margin / max_margin
}

/// Decides whether a run's channel can be trusted.
///
/// Requires a successful run, a CHSH value of at least `threshold` and an
/// error rate of at most `max_error_rate`. None of the three compensates
/// for another.
pub fn evaluate_channel(outcome: &KeyDistributionOutcome, threshold: f64, max_error_rate: f64) -> bool {
    outcome.success && outcome.security_parameter >= threshold && outcome.error_rate <= max_error_rate
}
