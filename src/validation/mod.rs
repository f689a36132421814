// src/validation/mod.rs

//! Pure validation of option structures and simulator registers.
//!
//! Every check here runs before the backend is contacted and reports
//! `QkitError::InvalidConfiguration` (or `InvalidInput` for registers).

use crate::channel::KeyDistributionOptions;
use crate::config::{BackendConfig, BackendKind};
use crate::core::{AmplitudeRegister, CLASSICAL_LIMIT, QUANTUM_MAX, QkitError, Result};
use crate::search::{SamplingStrategy, SearchOptions};

// Default tolerance values (can be overridden by caller)
const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;

/// Lowest accepted security level.
pub const MIN_SECURITY_LEVEL: u8 = 1;
/// Highest accepted security level.
pub const MAX_SECURITY_LEVEL: u8 = 5;

fn invalid(message: impl Into<String>) -> QkitError {
    QkitError::InvalidConfiguration(message.into())
}

/// Checks that the register is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `register` - The `AmplitudeRegister` to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to 1e-9.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(QkitError::InvalidInput)` if normalization fails.
pub fn check_normalization(register: &AmplitudeRegister, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq: f64 = register.vector().iter().map(|c| c.norm_sqr()).sum();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(QkitError::InvalidInput(format!(
            "Amplitude register normalization failed. Sum(|a_i|^2) = {} (Deviation > {})",
            norm_sq, effective_tolerance
        )))
    } else {
        Ok(())
    }
}

/// Validates search options.
///
/// Rejects `UserProvided(None)` unless a known match count overrides it,
/// and zero sample sizes for strategies that sample.
pub fn validate_search_options(options: &SearchOptions) -> Result<()> {
    let overridden = options.known_match_count.is_some_and(|count| count > 0);
    let sampling = match options.sampling_strategy {
        SamplingStrategy::UserProvided(None) if !overridden => {
            Err(invalid("UserProvided sampling requires a match count"))
        }
        SamplingStrategy::Sampling(0) if !overridden => Err(invalid("Sampling strategy requires a non-zero sample size")),
        SamplingStrategy::Auto if !overridden && options.sample_size == 0 => {
            Err(invalid("Auto sampling requires a non-zero sample_size"))
        }
        _ => Ok(()),
    };
    sampling?;

    if options.max_targets == 0 {
        return Err(invalid("max_targets must be at least 1"));
    }
    Ok(())
}

/// Validates key distribution options.
pub fn validate_key_options(options: &KeyDistributionOptions) -> Result<()> {
    if options.key_length == 0 {
        return Err(invalid("key length must be greater than zero"));
    }
    if !(MIN_SECURITY_LEVEL..=MAX_SECURITY_LEVEL).contains(&options.security_level) {
        return Err(invalid(format!(
            "security level must be {}-{}, got {}",
            MIN_SECURITY_LEVEL, MAX_SECURITY_LEVEL, options.security_level
        )));
    }
    let threshold = options.security_threshold;
    if !(threshold > CLASSICAL_LIMIT && threshold <= QUANTUM_MAX) {
        return Err(invalid(format!(
            "security threshold must be in ({}, {:.4}], got {}",
            CLASSICAL_LIMIT, QUANTUM_MAX, threshold
        )));
    }
    if !(0.0..=1.0).contains(&options.max_acceptable_error_rate) {
        return Err(invalid(format!(
            "max acceptable error rate must be in [0, 1], got {}",
            options.max_acceptable_error_rate
        )));
    }
    Ok(())
}

/// Validates a backend description.
pub fn validate_backend_config(config: &BackendConfig) -> Result<()> {
    match config.kind {
        BackendKind::Simulator => Ok(()),
        BackendKind::LocalDevice => match config.endpoint.as_deref() {
            Some(endpoint) if !endpoint.is_empty() => Ok(()),
            _ => Err(invalid("missing endpoint for local device")),
        },
        BackendKind::Custom => match config.provider_name() {
            Some(_) => Ok(()),
            None => Err(invalid("missing provider information for custom backend")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    #[test]
    fn test_uniform_register_is_normalized() -> Result<()> {
        check_normalization(&AmplitudeRegister::uniform(37), None)
    }

    #[test]
    fn test_unnormalized_register_is_rejected() {
        let register = AmplitudeRegister::new(vec![Complex::new(1.0, 0.0), Complex::new(1.0, 0.0)]);
        assert!(matches!(check_normalization(&register, None), Err(QkitError::InvalidInput(_))));
        assert!(check_normalization(&register, Some(1.5)).is_ok());
    }

    #[test]
    fn test_key_options_bounds() {
        assert!(validate_key_options(&KeyDistributionOptions::default()).is_ok());

        let cases = [
            KeyDistributionOptions { key_length: 0, ..Default::default() },
            KeyDistributionOptions { security_level: 0, ..Default::default() },
            KeyDistributionOptions { security_level: 6, ..Default::default() },
            KeyDistributionOptions { security_threshold: 2.0, ..Default::default() },
            KeyDistributionOptions { security_threshold: 2.9, ..Default::default() },
            KeyDistributionOptions { security_threshold: f64::NAN, ..Default::default() },
            KeyDistributionOptions { max_acceptable_error_rate: -0.1, ..Default::default() },
            KeyDistributionOptions { max_acceptable_error_rate: 1.5, ..Default::default() },
        ];
        for options in cases {
            assert!(
                matches!(validate_key_options(&options), Err(QkitError::InvalidConfiguration(_))),
                "accepted {:?}",
                options
            );
        }
    }

    #[test]
    fn test_search_options_rules() {
        assert!(validate_search_options(&SearchOptions::default()).is_ok());

        let missing_count = SearchOptions {
            sampling_strategy: SamplingStrategy::UserProvided(None),
            ..SearchOptions::default()
        };
        assert!(validate_search_options(&missing_count).is_err());

        let overridden = SearchOptions { known_match_count: Some(3), ..missing_count.clone() };
        assert!(validate_search_options(&overridden).is_ok());

        // Zero does not count as a known match count.
        let zero_known = SearchOptions { known_match_count: Some(0), ..missing_count };
        assert!(validate_search_options(&zero_known).is_err());

        let empty_sample = SearchOptions {
            sampling_strategy: SamplingStrategy::Sampling(0),
            ..SearchOptions::default()
        };
        assert!(validate_search_options(&empty_sample).is_err());

        let no_targets = SearchOptions { max_targets: 0, ..SearchOptions::default() };
        assert!(validate_search_options(&no_targets).is_err());
    }
}
