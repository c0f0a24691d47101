//! Aerial vehicle controller
//!
//! Four continuously active PID loops for a multirotor:
//!
//! | Loop | Error | Kp/Kd schedule | Ki schedule |
//! |---|---|---|---|
//! | throttle | target.y - y | \|v_y\| | \|y error\| |
//! | pitch | target.z - z | \|v_z\| | \|z error\| |
//! | roll | target.x - x | \|v_x\| | \|x error\| |
//! | yaw | wrap(target yaw - yaw) | \|yaw error\| | \|yaw error\| |
//!
//! Position errors are taken along world axes. Each loop resets its own
//! integral once its error is inside the error margin.

use log::trace;
use serde::{Deserialize, Serialize};

use super::pid::ScalarPid;
use super::schedule::{GainScheduler, PidGainRange, ScheduleInputs};
use crate::error::{validate_dt, Result};
use crate::math::normalize_angle_deg;
use crate::vehicle::{Target, VehicleTelemetry};

/// Aerial controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AerialControllerConfig {
    /// Error under which a loop's integral is reset
    pub error_margin: f64,
    /// Normalizes scheduling magnitudes
    pub scheduler: GainScheduler,
    /// Altitude loop gains
    pub throttle_gains: PidGainRange,
    /// Longitudinal (world Z) loop gains
    pub pitch_gains: PidGainRange,
    /// Lateral (world X) loop gains
    pub roll_gains: PidGainRange,
    /// Heading loop gains
    pub yaw_gains: PidGainRange,
}

impl Default for AerialControllerConfig {
    fn default() -> Self {
        Self {
            error_margin: 0.1,
            scheduler: GainScheduler::new(20.0),
            throttle_gains: PidGainRange::new((1.5, 2.0), (0.0, 0.1), (1.5, 3.5)),
            pitch_gains: PidGainRange::new((1.0, 4.0), (0.0, 0.1), (1.0, 2.0)),
            roll_gains: PidGainRange::new((1.0, 4.0), (0.0, 0.1), (1.0, 2.0)),
            yaw_gains: PidGainRange::new((3.0, 3.0), (0.0, 0.0), (0.2, 2.0)),
        }
    }
}

/// Per-loop errors of a tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisErrors {
    /// Vertical position error [m]
    pub altitude: f64,
    /// World Z position error [m]
    pub longitudinal: f64,
    /// World X position error [m]
    pub lateral: f64,
    /// Wrapped heading error [deg]
    pub yaw: f64,
}

/// Raw loop outputs of a tick
///
/// Not clamped here; the force model saturates them on entry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AerialCommand {
    pub throttle: f64,
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
    pub errors: AxisErrors,
}

/// Multirotor position/heading controller
#[derive(Debug, Clone, Default)]
pub struct AerialVehicleController {
    /// Controller configuration
    pub config: AerialControllerConfig,
    throttle_pid: ScalarPid,
    pitch_pid: ScalarPid,
    roll_pid: ScalarPid,
    yaw_pid: ScalarPid,
}

impl AerialVehicleController {
    pub fn new(config: AerialControllerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn throttle_pid(&self) -> &ScalarPid {
        &self.throttle_pid
    }

    pub fn pitch_pid(&self) -> &ScalarPid {
        &self.pitch_pid
    }

    pub fn roll_pid(&self) -> &ScalarPid {
        &self.roll_pid
    }

    pub fn yaw_pid(&self) -> &ScalarPid {
        &self.yaw_pid
    }

    /// Run one tick of all four loops (yaw, altitude, then pitch/roll)
    pub fn update(
        &mut self,
        telemetry: &VehicleTelemetry,
        target: &Target,
        dt: f64,
    ) -> Result<AerialCommand> {
        let dt = validate_dt(dt)?;
        let cfg = &self.config;
        let velocity = &telemetry.linear_velocity;

        let errors = AxisErrors {
            altitude: target.position.y - telemetry.position.y,
            longitudinal: target.position.z - telemetry.position.z,
            lateral: target.position.x - telemetry.position.x,
            yaw: normalize_angle_deg(target.yaw - telemetry.attitude.yaw),
        };

        let yaw = run_loop(
            &mut self.yaw_pid,
            &cfg.scheduler,
            &cfg.yaw_gains,
            errors.yaw,
            ScheduleInputs::uniform(errors.yaw),
            cfg.error_margin,
            dt,
        )?;

        let throttle = run_loop(
            &mut self.throttle_pid,
            &cfg.scheduler,
            &cfg.throttle_gains,
            errors.altitude,
            velocity_schedule(velocity.y, errors.altitude),
            cfg.error_margin,
            dt,
        )?;

        let pitch = run_loop(
            &mut self.pitch_pid,
            &cfg.scheduler,
            &cfg.pitch_gains,
            errors.longitudinal,
            velocity_schedule(velocity.z, errors.longitudinal),
            cfg.error_margin,
            dt,
        )?;

        let roll = run_loop(
            &mut self.roll_pid,
            &cfg.scheduler,
            &cfg.roll_gains,
            errors.lateral,
            velocity_schedule(velocity.x, errors.lateral),
            cfg.error_margin,
            dt,
        )?;

        let command = AerialCommand { throttle, pitch, roll, yaw, errors };
        trace!("aerial tick {:?}", command);
        Ok(command)
    }
}

/// Kp and Kd follow the axis velocity, Ki follows the position error
fn velocity_schedule(velocity: f64, error: f64) -> ScheduleInputs {
    ScheduleInputs {
        kp: velocity,
        ki: error,
        kd: velocity,
    }
}

fn run_loop(
    pid: &mut ScalarPid,
    scheduler: &GainScheduler,
    range: &PidGainRange,
    error: f64,
    inputs: ScheduleInputs,
    margin: f64,
    dt: f64,
) -> Result<f64> {
    let gains = scheduler.schedule_terms(range, inputs);
    let output = pid.compute(error, gains, dt)?;
    if error.abs() < margin {
        pid.reset();
    }
    Ok(output)
}
