//! Random numbers drawn from a backend's measurement source.

use crate::backend::Backend;
use crate::core::{QkitError, Result, status};

/// Random integer in the inclusive range `[min, max]`.
///
/// # Errors
/// * `QkitError::InvalidRange` if `min >= max`; the backend is not called.
pub fn random_int<B: Backend>(backend: &B, min: i64, max: i64) -> Result<i64> {
    if min >= max {
        return Err(QkitError::InvalidRange { min, max });
    }
    let value = backend.random_int(min, max)?;
    if !(min..=max).contains(&value) {
        return Err(QkitError::backend(
            status::RUNTIME,
            format!("backend returned {} outside [{}, {}]", value, min, max),
        ));
    }
    Ok(value)
}

/// `length` random bytes.
///
/// # Errors
/// * `QkitError::InvalidLength` if `length == 0`; the backend is not called.
pub fn random_bytes<B: Backend>(backend: &B, length: usize) -> Result<Vec<u8>> {
    if length == 0 {
        return Err(QkitError::InvalidLength);
    }
    let bytes = backend.random_bytes(length)?;
    if bytes.len() != length {
        return Err(QkitError::backend(
            status::RUNTIME,
            format!("backend returned {} bytes, expected {}", bytes.len(), length),
        ));
    }
    Ok(bytes)
}
