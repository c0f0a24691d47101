//! Multirotor force model
//!
//! Forces, with body axes taken from the current attitude:
//!
//! ```text
//! F = up·throttle·T_max + forward·pitch·T_max·u_pr + right·roll·T_max·u_pr
//! F ← F·T_max/|F|            if |F| > T_max
//! F ← 0                      if throttle < throttle_cutoff
//! ```
//!
//! Torques are summed unclamped:
//!
//! ```text
//! τ = right·pitch - forward·roll + up·yaw·T_max·u_yaw + R·τ_stab
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::limit_velocity;
use crate::control::AerialCommand;
use crate::math::{clamp01, Attitude};

/// Multirotor physical parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AerialVehicleParams {
    /// Maximum total thrust [N]
    pub max_thrust: f64,
    /// Share of max thrust spent on pitch/roll translation
    pub pitch_roll_thrust_usage: f64,
    /// Share of max thrust spent on yaw torque
    pub yaw_thrust_usage: f64,
    /// Throttle below which all force is cut
    pub min_throttle_to_stop: f64,
    /// Manufacturer speed limit [m/s]
    pub max_speed: f64,
}

impl Default for AerialVehicleParams {
    fn default() -> Self {
        Self {
            // Twice the weight of a 10 kg airframe
            max_thrust: 196.0,
            pitch_roll_thrust_usage: 0.2,
            yaw_thrust_usage: 0.02,
            min_throttle_to_stop: 0.1,
            max_speed: 50.0,
        }
    }
}

/// Synthesized force and torque (world frame)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AerialWrench {
    /// Total force [N]
    pub force: Vector3<f64>,
    /// Total torque [N·m]
    pub torque: Vector3<f64>,
    /// Speed limit [m/s] for the physics collaborator to enforce
    pub max_speed: f64,
}

/// Command after input saturation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SaturatedCommand {
    pub throttle: f64,
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

impl SaturatedCommand {
    /// Throttle to [0, 1]; pitch, roll and yaw to [-1, 1]
    pub fn from_command(command: &AerialCommand) -> Self {
        Self {
            throttle: clamp01(command.throttle),
            pitch: command.pitch.clamp(-1.0, 1.0),
            roll: command.roll.clamp(-1.0, 1.0),
            yaw: command.yaw.clamp(-1.0, 1.0),
        }
    }

    /// Drop attitude commands while resting on the ground
    pub fn grounded(self) -> Self {
        Self {
            throttle: self.throttle,
            ..Self::default()
        }
    }
}

/// Multirotor force model
#[derive(Debug, Clone, Default)]
pub struct AerialForceModel {
    pub params: AerialVehicleParams,
}

impl AerialForceModel {
    pub fn new(params: AerialVehicleParams) -> Self {
        Self { params }
    }

    /// Total force for a saturated command
    pub fn force(&self, cmd: &SaturatedCommand, attitude: &Attitude) -> Vector3<f64> {
        let p = &self.params;

        if cmd.throttle < p.min_throttle_to_stop {
            return Vector3::zeros();
        }

        let lift = attitude.up() * cmd.throttle * p.max_thrust;
        let forward = attitude.forward() * cmd.pitch * p.max_thrust * p.pitch_roll_thrust_usage;
        let lateral = attitude.right() * cmd.roll * p.max_thrust * p.pitch_roll_thrust_usage;

        let total = lift + forward + lateral;
        let magnitude = total.norm();
        if magnitude > p.max_thrust {
            total * (p.max_thrust / magnitude)
        } else {
            total
        }
    }

    /// Total torque for a saturated command plus an optional body-frame
    /// stabilization torque
    pub fn torque(
        &self,
        cmd: &SaturatedCommand,
        attitude: &Attitude,
        stabilization: Option<&Vector3<f64>>,
    ) -> Vector3<f64> {
        let p = &self.params;

        let pitch_torque = attitude.right() * cmd.pitch;
        let roll_torque = -attitude.forward() * cmd.roll;
        let yaw_torque = attitude.up() * cmd.yaw * p.max_thrust * p.yaw_thrust_usage;

        let mut torque = pitch_torque + roll_torque + yaw_torque;
        if let Some(body_torque) = stabilization {
            torque += attitude.rotation() * body_torque;
        }
        torque
    }

    /// Map a controller command to a force/torque pair
    pub fn synthesize(
        &self,
        command: &AerialCommand,
        attitude: &Attitude,
        stabilization: Option<&Vector3<f64>>,
        ground_contact: bool,
    ) -> AerialWrench {
        let mut cmd = SaturatedCommand::from_command(command);
        if ground_contact {
            cmd = cmd.grounded();
        }

        AerialWrench {
            force: self.force(&cmd, attitude),
            torque: self.torque(&cmd, attitude, stabilization),
            max_speed: self.params.max_speed,
        }
    }

    /// Clamp a velocity to the manufacturer speed limit
    pub fn limit_velocity(&self, velocity: &Vector3<f64>) -> Vector3<f64> {
        limit_velocity(velocity, self.params.max_speed)
    }
}
