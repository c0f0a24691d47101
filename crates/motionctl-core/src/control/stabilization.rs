//! Attitude stabilization
//!
//! Drives pitch and roll back to level while leaving yaw alone:
//!
//! ```text
//! target = (0, yaw, 0)
//! e      = wrap(target - attitude)   per axis
//! K      = schedule(|e| / scale)     one schedule for all axes
//! τ_body = VectorPID(e)
//! ```
//!
//! The body-frame torque is added on top of the aerial force model's own
//! torque.

use log::trace;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::pid::VectorPid;
use super::schedule::{GainScheduler, PidGainRange};
use crate::error::{validate_dt, Result};
use crate::math::Attitude;

/// Stabilization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilizationConfig {
    /// Error magnitude [deg] under which the integrals reset
    pub error_margin: f64,
    /// Normalizes the error magnitude
    pub scheduler: GainScheduler,
    /// Gains shared by all three axes
    pub gains: PidGainRange,
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self {
            error_margin: 0.1,
            scheduler: GainScheduler::new(20.0),
            gains: PidGainRange::new((3.0, 3.0), (0.0, 0.0), (0.2, 0.4)),
        }
    }
}

/// Stabilization output for a tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StabilizationOutput {
    /// Wrapped attitude error (pitch, yaw, roll) [deg]
    pub error: Vector3<f64>,
    /// Corrective torque about body (right, up, forward)
    pub torque: Vector3<f64>,
}

/// Level-attitude controller
#[derive(Debug, Clone, Default)]
pub struct StabilizationController {
    /// Controller configuration
    pub config: StabilizationConfig,
    pid: VectorPid,
}

impl StabilizationController {
    pub fn new(config: StabilizationConfig) -> Self {
        Self {
            config,
            pid: VectorPid::new(),
        }
    }

    pub fn pid(&self) -> &VectorPid {
        &self.pid
    }

    /// Compute the corrective body torque for the current attitude
    pub fn update(&mut self, attitude: &Attitude, dt: f64) -> Result<StabilizationOutput> {
        let dt = validate_dt(dt)?;

        let level = Attitude::from_yaw(attitude.yaw);
        let error = attitude.error_to(&level);
        let magnitude = error.norm();

        let gains = self.config.scheduler.schedule(&self.config.gains, magnitude);
        let torque = self.pid.compute(&error, gains, dt)?;

        if magnitude < self.config.error_margin {
            self.pid.reset();
        }

        trace!("stabilization error {:?} torque {:?}", error, torque);
        Ok(StabilizationOutput { error, torque })
    }
}
