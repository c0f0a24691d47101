//! Discrete PID primitives
//!
//! ```text
//! u = Kp·e + Ki·Σ(e·dt) + Kd·(e - e_prev)/dt
//! ```
//!
//! There is no output clamping and no integral limit. Windup is managed by
//! the owning controller calling [`ScalarPid::reset`] once its error falls
//! inside the error margin.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{validate_dt, Result};

/// PID gains
///
/// No sign constraint: negative gains invert an axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    pub ki: f64,
    /// Derivative gain
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// Individual contributions of one PID evaluation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PidTerms {
    pub proportional: f64,
    pub integral: f64,
    pub derivative: f64,
}

impl PidTerms {
    /// Sum of the three terms
    pub fn output(&self) -> f64 {
        self.proportional + self.integral + self.derivative
    }
}

/// Single-axis PID state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarPid {
    /// Error passed to the most recent `compute`
    previous_error: f64,
    /// Integral error accumulator
    integral: f64,
}

impl ScalarPid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate and return the separate terms
    ///
    /// `dt` is validated before any state changes. The previous error is
    /// updated after the terms are computed, on every successful call.
    pub fn compute_terms(&mut self, error: f64, gains: PidGains, dt: f64) -> Result<PidTerms> {
        let dt = validate_dt(dt)?;

        self.integral += error * dt;
        let terms = PidTerms {
            proportional: gains.kp * error,
            integral: gains.ki * self.integral,
            derivative: gains.kd * (error - self.previous_error) / dt,
        };

        self.previous_error = error;
        Ok(terms)
    }

    /// Evaluate and return the summed output
    pub fn compute(&mut self, error: f64, gains: PidGains, dt: f64) -> Result<f64> {
        self.compute_terms(error, gains, dt).map(|t| t.output())
    }

    /// Zero the integral accumulator
    ///
    /// The previous error is kept, so the first derivative after a reset is
    /// still taken against the last error seen before it.
    pub fn reset(&mut self) {
        self.integral = 0.0;
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn previous_error(&self) -> f64 {
        self.previous_error
    }
}

/// Three independent PID loops sharing one set of gains
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorPid {
    pub x: ScalarPid,
    pub y: ScalarPid,
    pub z: ScalarPid,
}

impl VectorPid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run each axis with the same gains
    pub fn compute(
        &mut self,
        error: &Vector3<f64>,
        gains: PidGains,
        dt: f64,
    ) -> Result<Vector3<f64>> {
        // Validate once so a bad dt cannot leave the axes half-updated
        let dt = validate_dt(dt)?;
        Ok(Vector3::new(
            self.x.compute(error.x, gains, dt)?,
            self.y.compute(error.y, gains, dt)?,
            self.z.compute(error.z, gains, dt)?,
        ))
    }

    /// Reset all three integrators
    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.z.reset();
    }

    /// Integral accumulators as a vector
    pub fn integral(&self) -> Vector3<f64> {
        Vector3::new(self.x.integral(), self.y.integral(), self.z.integral())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControlError;
    use approx::assert_relative_eq;

    #[test]
    fn test_proportional_only() {
        let mut pid = ScalarPid::new();
        let out = pid.compute(2.0, PidGains::new(3.0, 0.0, 0.0), 0.02).unwrap();
        assert_relative_eq!(out, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_first_call_derivative_from_zero() {
        let mut pid = ScalarPid::new();
        let terms = pid.compute_terms(1.0, PidGains::new(0.0, 0.0, 0.5), 0.1).unwrap();
        assert_relative_eq!(terms.derivative, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_integral_accumulates() {
        let mut pid = ScalarPid::new();
        let gains = PidGains::new(0.0, 2.0, 0.0);
        for _ in 0..10 {
            pid.compute(0.5, gains, 0.1).unwrap();
        }
        assert_relative_eq!(pid.integral(), 0.5, epsilon = 1e-12);
        let out = pid.compute(0.5, gains, 0.1).unwrap();
        assert_relative_eq!(out, 2.0 * 0.55, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_gains_invert() {
        let mut pid = ScalarPid::new();
        let out = pid.compute(1.0, PidGains::new(-1.0, 0.0, 0.0), 0.02).unwrap();
        assert!(out < 0.0);
    }

    #[test]
    fn test_reset_keeps_previous_error() {
        let mut pid = ScalarPid::new();
        let gains = PidGains::new(1.0, 1.0, 1.0);
        pid.compute(4.0, gains, 0.5).unwrap();
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.previous_error(), 4.0);
    }

    #[test]
    fn test_zero_dt_rejected_without_mutation() {
        let mut pid = ScalarPid::new();
        let gains = PidGains::new(1.0, 1.0, 1.0);
        pid.compute(1.0, gains, 0.1).unwrap();
        let before = pid.clone();

        assert_eq!(pid.compute(3.0, gains, 0.0), Err(ControlError::InvalidTimeStep(0.0)));
        assert!(pid.compute(3.0, gains, -0.1).is_err());
        assert_eq!(pid, before);
    }

    #[test]
    fn test_vector_axes_independent() {
        let mut pid = VectorPid::new();
        let gains = PidGains::new(1.0, 0.0, 0.0);
        let out = pid.compute(&Vector3::new(1.0, -2.0, 0.0), gains, 0.02).unwrap();
        assert_relative_eq!(out, Vector3::new(1.0, -2.0, 0.0), epsilon = 1e-12);

        // Only x carries integral after an x-only error
        let mut pid = VectorPid::new();
        pid.compute(&Vector3::new(1.0, 0.0, 0.0), PidGains::new(0.0, 1.0, 0.0), 0.5).unwrap();
        assert_relative_eq!(pid.integral(), Vector3::new(0.5, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_vector_reset_all_axes() {
        let mut pid = VectorPid::new();
        pid.compute(&Vector3::new(1.0, 2.0, 3.0), PidGains::new(0.0, 1.0, 0.0), 0.1).unwrap();
        pid.reset();
        assert_eq!(pid.integral(), Vector3::zeros());
        assert_eq!(pid.z.previous_error(), 3.0);
    }

    #[test]
    fn test_vector_rejects_bad_dt() {
        let mut pid = VectorPid::new();
        let before = pid.clone();
        let gains = PidGains::new(1.0, 1.0, 1.0);
        assert!(pid.compute(&Vector3::new(1.0, 1.0, 1.0), gains, 0.0).is_err());
        assert_eq!(pid, before);
    }
}
