//! Piecewise-linear response curves
//!
//! Used for the ground vehicle's steer-by-speed limit: speed in, fraction of
//! the steering range out. Inputs outside the key range clamp to the first or
//! last value.

use serde::{Deserialize, Serialize};

use super::angle::inverse_lerp;
use crate::error::{ControlError, Result};

/// Curve keyframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub input: f64,
    pub value: f64,
}

/// Piecewise-linear curve through sorted keyframes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCurve {
    keys: Vec<CurveKey>,
}

impl ResponseCurve {
    /// Build from keyframes (sorted by input on construction)
    ///
    /// An empty key list is rejected.
    pub fn new(mut keys: Vec<CurveKey>) -> Result<Self> {
        if keys.is_empty() {
            return Err(ControlError::InvalidConfig(
                "response curve needs at least one key".to_string(),
            ));
        }
        keys.sort_by(|a, b| a.input.total_cmp(&b.input));
        Ok(Self { keys })
    }

    /// Two-key straight line
    pub fn linear(input_start: f64, value_start: f64, input_end: f64, value_end: f64) -> Self {
        let mut keys = vec![
            CurveKey { input: input_start, value: value_start },
            CurveKey { input: input_end, value: value_end },
        ];
        keys.sort_by(|a, b| a.input.total_cmp(&b.input));
        Self { keys }
    }

    /// Flat curve
    pub fn constant(value: f64) -> Self {
        Self {
            keys: vec![CurveKey { input: 0.0, value }],
        }
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluate at `input`
    pub fn evaluate(&self, input: f64) -> f64 {
        // Deserialized curves bypass `new`, so an empty list is still possible
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return 0.0,
        };
        if input <= first.input {
            return first.value;
        }
        if input >= last.input {
            return last.value;
        }
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if input <= b.input {
                let t = inverse_lerp(a.input, b.input, input);
                return a.value + (b.value - a.value) * t;
            }
        }
        last.value
    }
}

impl Default for ResponseCurve {
    /// Full steering at rest, 30% at 50 m/s
    fn default() -> Self {
        Self::linear(0.0, 1.0, 50.0, 0.3)
    }
}
