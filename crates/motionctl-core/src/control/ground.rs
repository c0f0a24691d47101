//! Ground vehicle controller
//!
//! Drives a wheeled vehicle to a target position on the ground plane.
//!
//! Drive state machine:
//!
//! ```text
//!            distance < stop_distance
//! Driving ─────────────────────────────▶ Braking
//!    ▲                                      │
//!    └──────────────────────────────────────┘
//!      speed < min_speed_to_release_brake
//!      (speed PID integral reset)
//! ```
//!
//! While `Driving`, target speed and the torque ceiling both ramp linearly
//! from full at `braking_onset_distance` to zero at the target. An extra
//! brake engages inside `brake_distance` whenever the vehicle is faster than
//! its target speed.
//!
//! Steering picks exactly one [`SteeringMode`] per tick, checked in order:
//! brake hold, oscillation guard, deadzone, active.

use log::{debug, trace};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::pid::{PidGains, ScalarPid};
use super::schedule::{GainScheduler, PidGainRange};
use crate::actuation::GroundVehicleParams;
use crate::error::{validate_dt, Result};
use crate::math::{
    clamp01, ground_projection, inverse_lerp, lerp, local_heading_deg, normalize_angle_deg,
    world_to_local,
};
use crate::vehicle::{Target, VehicleTelemetry};

/// Ground controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundControllerConfig {
    /// Speed/yaw error under which a loop's integral is reset
    pub error_margin: f64,
    /// Normalizes scheduling magnitudes
    pub scheduler: GainScheduler,
    /// Throttle gains, scheduled by planar speed
    pub throttle_gains: PidGainRange,
    /// Steering gains, scheduled by |yaw error|
    pub steer_gains: PidGainRange,
    /// Distance [m] at which target speed and torque start ramping down
    pub braking_onset_distance: f64,
    /// Distance [m] inside which overspeed engages the brake
    pub brake_distance: f64,
    /// Distance [m] that latches the braking state
    pub stop_distance: f64,
    /// Speed [m/s] under which the braking latch releases
    pub min_speed_to_release_brake: f64,
    /// Yaw error band [deg] with no corrective steering
    pub steering_deadzone: f64,
    /// Speed [m/s] under which the vehicle counts as stopped
    pub stopped_speed: f64,
    /// Band [deg] around 0° and 180° where steering is left untouched
    pub oscillation_guard: f64,
    /// Exponent of the sign-preserving power-law smoothing
    pub steering_smoothing_exponent: f64,
    /// Steering interpolation rate [1/s]
    pub steering_rate: f64,
}

impl Default for GroundControllerConfig {
    fn default() -> Self {
        Self {
            error_margin: 0.5,
            scheduler: GainScheduler::default(),
            throttle_gains: PidGainRange::fixed(PidGains::new(0.5, 0.05, 0.2)),
            steer_gains: PidGainRange::fixed(PidGains::new(1.0, 0.1, 0.5)),
            braking_onset_distance: 5.0,
            brake_distance: 2.0,
            stop_distance: 0.5,
            min_speed_to_release_brake: 0.1,
            steering_deadzone: 10.0,
            stopped_speed: 0.1,
            oscillation_guard: 10.0,
            steering_smoothing_exponent: 1.5,
            steering_rate: 20.0,
        }
    }
}

/// Longitudinal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DriveState {
    #[default]
    Driving,
    /// Throttle cut, full brake, until nearly stationary
    Braking,
}

/// Steering branch taken on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SteeringMode {
    /// Brake engaged: wheels straight, PID reset
    BrakeHold,
    /// Yaw error near 0° or 180°: steering unchanged, PID untouched
    #[default]
    OscillationGuard,
    /// Inside the deadzone: wheels straight, PID reset unless stopped
    Deadzone,
    /// Closed-loop steering
    Active,
}

/// Controller output for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroundCommand {
    /// Normalized motor command [-1, 1], negative reverses
    pub throttle: f64,
    /// Normalized steering [-1, 1], positive to the right
    pub steering: f64,
    /// Full brake requested
    pub brake: bool,
    /// Drive state after this tick
    pub drive_state: DriveState,
    /// Steering branch taken
    pub steering_mode: SteeringMode,
    /// Planar distance to target [m]
    pub distance: f64,
    /// Planar speed [m/s]
    pub speed: f64,
    /// Speed the throttle loop aimed for [m/s]
    pub target_speed: f64,
    /// target_speed - speed [m/s]
    pub speed_error: f64,
    /// Heading to target relative to the nose [deg]
    pub yaw_error: f64,
    /// Target lies in front of the vehicle
    pub moving_forward: bool,
}

/// Longitudinal half of a tick
#[derive(Debug, Clone, Copy)]
struct DriveOutput {
    throttle: f64,
    brake: bool,
    distance: f64,
    speed: f64,
    target_speed: f64,
    speed_error: f64,
    moving_forward: bool,
}

/// Ground vehicle controller
#[derive(Debug, Clone)]
pub struct GroundVehicleController {
    /// Controller configuration
    pub config: GroundControllerConfig,
    /// Cruise speed far from the target [m/s]
    max_speed: f64,
    /// Yaw error [deg] at which the steering factor saturates
    max_steer_angle: f64,
    throttle_pid: ScalarPid,
    steer_pid: ScalarPid,
    state: DriveState,
    steering: f64,
    steering_mode: SteeringMode,
}

impl GroundVehicleController {
    /// Build for a vehicle; speed and steering limits come from its parameters
    pub fn new(config: GroundControllerConfig, vehicle: &GroundVehicleParams) -> Self {
        Self {
            config,
            max_speed: vehicle.max_speed,
            max_steer_angle: vehicle.max_steer_angle,
            throttle_pid: ScalarPid::new(),
            steer_pid: ScalarPid::new(),
            state: DriveState::Driving,
            steering: 0.0,
            steering_mode: SteeringMode::default(),
        }
    }

    pub fn state(&self) -> DriveState {
        self.state
    }

    /// Current (smoothed) steering command
    pub fn steering(&self) -> f64 {
        self.steering
    }

    pub fn throttle_pid(&self) -> &ScalarPid {
        &self.throttle_pid
    }

    pub fn steer_pid(&self) -> &ScalarPid {
        &self.steer_pid
    }

    /// Run one tick
    pub fn update(
        &mut self,
        telemetry: &VehicleTelemetry,
        target: &Target,
        dt: f64,
    ) -> Result<GroundCommand> {
        let dt = validate_dt(dt)?;

        let drive = self.drive(telemetry, &target.position, dt)?;
        let yaw_error = Self::yaw_error(telemetry, &target.position);
        let mode = self.steer(yaw_error, drive.brake, telemetry.speed(), dt)?;

        if mode != self.steering_mode {
            debug!(
                "steering mode {:?} -> {:?} (yaw error {:.1}°)",
                self.steering_mode, mode, yaw_error
            );
            self.steering_mode = mode;
        }

        let command = GroundCommand {
            throttle: drive.throttle,
            steering: self.steering,
            brake: drive.brake,
            drive_state: self.state,
            steering_mode: mode,
            distance: drive.distance,
            speed: drive.speed,
            target_speed: drive.target_speed,
            speed_error: drive.speed_error,
            yaw_error,
            moving_forward: drive.moving_forward,
        };
        trace!("ground tick {:?}", command);
        Ok(command)
    }

    /// Heading to the target in the vehicle frame, wrapped to [-180, 180]
    pub fn yaw_error(telemetry: &VehicleTelemetry, target: &Vector3<f64>) -> f64 {
        let local = world_to_local(&telemetry.position, &telemetry.attitude.rotation(), target);
        normalize_angle_deg(local_heading_deg(&local))
    }

    fn drive(
        &mut self,
        telemetry: &VehicleTelemetry,
        target: &Vector3<f64>,
        dt: f64,
    ) -> Result<DriveOutput> {
        let distance = (ground_projection(target) - ground_projection(&telemetry.position)).norm();
        let speed = telemetry.planar_speed();

        let direction = (target - telemetry.position)
            .try_normalize(1e-9)
            .unwrap_or_else(Vector3::zeros);
        let moving_forward = telemetry.attitude.forward().dot(&direction) > 0.0;

        if distance < self.config.stop_distance && self.state == DriveState::Driving {
            debug!("braking latched at {:.2} m", distance);
            self.state = DriveState::Braking;
        }

        if self.state == DriveState::Braking {
            if speed < self.config.min_speed_to_release_brake {
                debug!("braking released at {:.3} m/s", speed);
                self.state = DriveState::Driving;
                self.throttle_pid.reset();
            }
            return Ok(DriveOutput {
                throttle: 0.0,
                brake: true,
                distance,
                speed,
                target_speed: 0.0,
                speed_error: -speed,
                moving_forward,
            });
        }

        // 1 beyond the onset distance, falling linearly to 0 at the target
        let ramp = if distance > self.config.braking_onset_distance {
            1.0
        } else {
            inverse_lerp(0.0, self.config.braking_onset_distance, distance)
        };

        let target_speed = lerp(0.0, self.max_speed, ramp);
        let speed_error = target_speed - speed;

        let gains = self.config.scheduler.schedule(&self.config.throttle_gains, speed);
        let raw = self.throttle_pid.compute(speed_error, gains, dt)?;

        // Torque ceiling ramps with distance independently of the PID output
        let mut throttle = raw.clamp(-1.0, 1.0) * ramp;
        if !moving_forward {
            throttle = -throttle;
        }

        let brake = distance < self.config.brake_distance && speed > target_speed;

        if speed_error.abs() < self.config.error_margin {
            self.throttle_pid.reset();
        }

        Ok(DriveOutput {
            throttle,
            brake,
            distance,
            speed,
            target_speed,
            speed_error,
            moving_forward,
        })
    }

    fn steer(
        &mut self,
        yaw_error: f64,
        braking: bool,
        speed: f64,
        dt: f64,
    ) -> Result<SteeringMode> {
        let cfg = &self.config;
        let abs_error = yaw_error.abs();

        if braking {
            self.steering = 0.0;
            self.steer_pid.reset();
            return Ok(SteeringMode::BrakeHold);
        }

        if abs_error < cfg.oscillation_guard || abs_error > 180.0 - cfg.oscillation_guard {
            return Ok(SteeringMode::OscillationGuard);
        }

        if abs_error <= cfg.steering_deadzone {
            self.steering = 0.0;
            if speed >= cfg.stopped_speed {
                self.steer_pid.reset();
            }
            return Ok(SteeringMode::Deadzone);
        }

        let gains = cfg.scheduler.schedule(&cfg.steer_gains, yaw_error);
        let raw = self.steer_pid.compute(yaw_error, gains, dt)?;

        let span = self.max_steer_angle - cfg.steering_deadzone;
        let factor = if span > 0.0 {
            clamp01((abs_error - cfg.steering_deadzone) / span)
        } else {
            1.0
        };

        let smoothed = raw.signum() * raw.abs().powf(cfg.steering_smoothing_exponent) * factor;
        let target_steering = smoothed.clamp(-1.0, 1.0);
        self.steering = lerp(self.steering, target_steering, dt * cfg.steering_rate);

        if abs_error < cfg.error_margin {
            self.steer_pid.reset();
        }

        Ok(SteeringMode::Active)
    }
}
