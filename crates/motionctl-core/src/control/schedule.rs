//! Gain scheduling
//!
//! Gains slide linearly between configured bounds as a runtime magnitude
//! grows:
//!
//! ```text
//! f = clamp01(|m| / scale)
//! K = K_min + (K_max - K_min)·f
//! ```
//!
//! The scheduler does not care where a magnitude comes from; each controller
//! picks the source per term (e.g. velocity for Kp/Kd, position error for Ki).
//! Bounds may be decreasing (`min > max`).

use serde::{Deserialize, Serialize};

use super::pid::PidGains;
use crate::math::{clamp01, lerp};

/// Gain bounds for one axis
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidGainRange {
    pub kp_min: f64,
    pub kp_max: f64,
    pub ki_min: f64,
    pub ki_max: f64,
    pub kd_min: f64,
    pub kd_max: f64,
}

impl PidGainRange {
    pub fn new(kp: (f64, f64), ki: (f64, f64), kd: (f64, f64)) -> Self {
        Self {
            kp_min: kp.0,
            kp_max: kp.1,
            ki_min: ki.0,
            ki_max: ki.1,
            kd_min: kd.0,
            kd_max: kd.1,
        }
    }

    /// Degenerate range that always yields `gains`
    pub fn fixed(gains: PidGains) -> Self {
        Self::new((gains.kp, gains.kp), (gains.ki, gains.ki), (gains.kd, gains.kd))
    }

    /// Gains at the lower bound
    pub fn min_gains(&self) -> PidGains {
        PidGains::new(self.kp_min, self.ki_min, self.kd_min)
    }

    /// Gains at the upper bound
    pub fn max_gains(&self) -> PidGains {
        PidGains::new(self.kp_max, self.ki_max, self.kd_max)
    }

    /// Interpolate every term with one fraction (clamped to [0, 1])
    pub fn at_fraction(&self, fraction: f64) -> PidGains {
        self.at_fractions(fraction, fraction, fraction)
    }

    /// Interpolate each term with its own fraction (each clamped to [0, 1])
    pub fn at_fractions(&self, kp: f64, ki: f64, kd: f64) -> PidGains {
        PidGains {
            kp: lerp(self.kp_min, self.kp_max, kp),
            ki: lerp(self.ki_min, self.ki_max, ki),
            kd: lerp(self.kd_min, self.kd_max, kd),
        }
    }
}

/// Raw magnitudes feeding each term's schedule
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScheduleInputs {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl ScheduleInputs {
    /// Same magnitude for all three terms
    pub fn uniform(magnitude: f64) -> Self {
        Self { kp: magnitude, ki: magnitude, kd: magnitude }
    }
}

/// Normalizes magnitudes by an adjustment scale and schedules gains
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainScheduler {
    /// Magnitude at which gains reach their upper bound
    pub adjustment_scale: f64,
}

impl Default for GainScheduler {
    fn default() -> Self {
        Self { adjustment_scale: 20.0 }
    }
}

impl GainScheduler {
    pub fn new(adjustment_scale: f64) -> Self {
        Self { adjustment_scale }
    }

    /// `clamp01(|magnitude| / scale)`
    ///
    /// A non-positive scale saturates immediately: any non-zero magnitude
    /// maps to 1.
    pub fn fraction(&self, magnitude: f64) -> f64 {
        let magnitude = magnitude.abs();
        if self.adjustment_scale > 0.0 {
            clamp01(magnitude / self.adjustment_scale)
        } else if magnitude > 0.0 {
            1.0
        } else {
            0.0
        }
    }

    /// Schedule all terms from a single magnitude
    pub fn schedule(&self, range: &PidGainRange, magnitude: f64) -> PidGains {
        range.at_fraction(self.fraction(magnitude))
    }

    /// Schedule each term from its own magnitude
    pub fn schedule_terms(&self, range: &PidGainRange, inputs: ScheduleInputs) -> PidGains {
        range.at_fractions(
            self.fraction(inputs.kp),
            self.fraction(inputs.ki),
            self.fraction(inputs.kd),
        )
    }
}

/// Schedule gains from a magnitude and adjustment scale
pub fn schedule(range: &PidGainRange, magnitude: f64, adjustment_scale: f64) -> PidGains {
    GainScheduler::new(adjustment_scale).schedule(range, magnitude)
}
