//! Shared parameter checks used by the `validate()` methods.

use crate::{OpsError, OpsResult};

/// Rejects NaN and infinities.
pub(crate) fn finite(name: &str, v: f32) -> OpsResult<()> {
    if !v.is_finite() {
        return Err(OpsError::invalid_param(name, format!("must be finite, got {v}")));
    }
    Ok(())
}

/// Requires a finite value strictly above zero.
pub(crate) fn positive(name: &str, v: f32) -> OpsResult<()> {
    finite(name, v)?;
    if v <= 0.0 {
        return Err(OpsError::invalid_param(name, format!("must be > 0, got {v}")));
    }
    Ok(())
}

/// Requires a finite value at or above zero.
pub(crate) fn non_negative(name: &str, v: f32) -> OpsResult<()> {
    finite(name, v)?;
    if v < 0.0 {
        return Err(OpsError::invalid_param(name, format!("must be >= 0, got {v}")));
    }
    Ok(())
}

/// Requires `lo <= v <= hi`.
pub(crate) fn in_range(name: &str, v: f32, lo: f32, hi: f32) -> OpsResult<()> {
    finite(name, v)?;
    if v < lo || v > hi {
        return Err(OpsError::invalid_param(
            name,
            format!("must be in [{lo}, {hi}], got {v}"),
        ));
    }
    Ok(())
}

/// Requires an integer of at least `min`.
pub(crate) fn at_least(name: &str, v: usize, min: usize) -> OpsResult<()> {
    if v < min {
        return Err(OpsError::invalid_param(name, format!("must be >= {min}, got {v}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checks() {
        assert!(finite("a", 1.0).is_ok());
        assert!(finite("a", f32::NAN).is_err());
        assert!(positive("a", 0.0).is_err());
        assert!(non_negative("a", 0.0).is_ok());
        assert!(in_range("p", 1.5, 0.0, 1.0).is_err());
        assert!(at_least("n", 1, 2).is_err());
    }

    #[test]
    fn test_message_names_parameter() {
        let err = positive("scale", -1.0).unwrap_err();
        assert!(err.to_string().contains("scale"));
    }
}
