// src/channel/keydist.rs

use super::{KeyDistributionOptions, KeyDistributionOutcome, evaluate_channel};
use crate::backend::Backend;
use crate::core::{QkitError, Result};
use crate::validation;
use zeroize::Zeroize;

/// Key length, in bits, of the probe run by [`verify_channel_security`].
pub const VERIFY_KEY_LENGTH: usize = 32;
/// Attempts allowed to the probe run by [`verify_channel_security`].
pub const VERIFY_MAX_ATTEMPTS: u32 = 2;

const UNKNOWN_FAILURE: &str = "Unknown failure";

/// Diagnostic readings of a channel probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelReport {
    /// Verdict of [`evaluate_channel`] for the probe
    pub is_secure: bool,
    /// Measured CHSH value
    pub security_parameter: f64,
    /// Observed error rate
    pub error_rate: f64,
}

/// Runs the backend key exchange once and classifies the result.
///
/// # Errors
/// * `QkitError::InvalidConfiguration` if the options are invalid; the backend is not called.
/// * `QkitError::KeyGenerationFailed` carrying the partial outcome when the backend reports
///   failure. A missing failure reason is replaced with `"Unknown failure"`.
/// * Backend errors are propagated unchanged.
pub fn generate_key<B: Backend>(backend: &B, options: &KeyDistributionOptions) -> Result<KeyDistributionOutcome> {
    validation::validate_key_options(options)?;

    let mut outcome = backend.run_key_exchange(options)?;
    if outcome.success {
        tracing::info!(
            key_bytes = outcome.key.len(),
            security_parameter = outcome.security_parameter,
            error_rate = outcome.error_rate,
            pairs = outcome.entangled_pairs_created,
            "Key distribution succeeded"
        );
        return Ok(outcome);
    }

    if outcome.failure_reason.as_deref().is_none_or(str::is_empty) {
        outcome.failure_reason = Some(UNKNOWN_FAILURE.to_string());
    }
    // A failed run carries no usable key.
    outcome.key.zeroize();
    tracing::warn!(
        security_parameter = outcome.security_parameter,
        error_rate = outcome.error_rate,
        reason = outcome.failure_reason.as_deref().unwrap_or(UNKNOWN_FAILURE),
        "Key distribution failed"
    );
    Err(QkitError::KeyGenerationFailed(Box::new(outcome)))
}

/// Repeats [`generate_key`] with identical options until one run succeeds.
///
/// At most `max_attempts` runs (at least one) are made. If every run fails,
/// the last `KeyGenerationFailed` is returned. Any other error stops the
/// loop immediately.
pub fn generate_key_with_retries<B: Backend>(
    backend: &B,
    options: &KeyDistributionOptions,
) -> Result<KeyDistributionOutcome> {
    let max_attempts = options.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match generate_key(backend, options) {
            Err(QkitError::KeyGenerationFailed(outcome)) if attempt < max_attempts => {
                tracing::warn!(attempt, max_attempts, reason = ?outcome.failure_reason, "Retrying key distribution");
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Probes the channel with a short key and reports whether it is secure.
///
/// The probe uses `options` with the key length forced to
/// [`VERIFY_KEY_LENGTH`] bits and at most [`VERIFY_MAX_ATTEMPTS`] attempts.
/// A failed key generation still yields a report built from its readings;
/// every other error is propagated.
pub fn verify_channel_security<B: Backend>(backend: &B, options: &KeyDistributionOptions) -> Result<ChannelReport> {
    let probe = KeyDistributionOptions {
        key_length: VERIFY_KEY_LENGTH,
        max_attempts: options.max_attempts.clamp(1, VERIFY_MAX_ATTEMPTS),
        ..options.clone()
    };

    let outcome = match generate_key_with_retries(backend, &probe) {
        Ok(outcome) => outcome,
        Err(QkitError::KeyGenerationFailed(outcome)) => *outcome,
        Err(e) => return Err(e),
    };

    let report = ChannelReport {
        is_secure: evaluate_channel(&outcome, probe.security_threshold, probe.max_acceptable_error_rate),
        security_parameter: outcome.security_parameter,
        error_rate: outcome.error_rate,
    };
    tracing::info!(
        is_secure = report.is_secure,
        security_parameter = report.security_parameter,
        error_rate = report.error_rate,
        "Channel verified"
    );
    Ok(report)
}
