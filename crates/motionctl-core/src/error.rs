//! Error types
//!
//! A tick either runs to completion or is rejected before any controller
//! state is touched.

use thiserror::Error;

/// Motion control errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    #[error("Invalid time step {0}: must be finite and strictly positive")]
    InvalidTimeStep(f64),
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ControlError>;

/// Reject zero, negative and non-finite time steps
pub fn validate_dt(dt: f64) -> Result<f64> {
    if dt.is_finite() && dt > 0.0 {
        Ok(dt)
    } else {
        Err(ControlError::InvalidTimeStep(dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_dt() {
        assert_eq!(validate_dt(0.02), Ok(0.02));
        assert_eq!(validate_dt(0.0), Err(ControlError::InvalidTimeStep(0.0)));
        assert!(validate_dt(-0.01).is_err());
        assert!(validate_dt(f64::NAN).is_err());
        assert!(validate_dt(f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = ControlError::MissingCollaborator("telemetry source");
        assert_eq!(err.to_string(), "Missing collaborator: telemetry source");
    }
}
