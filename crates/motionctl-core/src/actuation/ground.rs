//! Ground vehicle force model
//!
//! ```text
//! motor torque = throttle · motor_torque          (driven wheels)
//! brake torque = brake ? brake_force : 0           (all wheels)
//! steer angle  = steering · curve(speed) · max_steer_angle   (steered wheels)
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::limit_velocity;
use crate::control::GroundCommand;
use crate::math::ResponseCurve;

/// Ground vehicle physical parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundVehicleParams {
    /// Motor torque at full throttle [N·m]
    pub motor_torque: f64,
    /// Brake torque when braking [N·m]
    pub brake_force: f64,
    /// Steer angle at full steering [deg]
    pub max_steer_angle: f64,
    /// Manufacturer speed limit [m/s]
    pub max_speed: f64,
    /// Fraction of the steering range allowed at a given speed
    pub steer_by_speed: ResponseCurve,
}

impl Default for GroundVehicleParams {
    fn default() -> Self {
        Self {
            motor_torque: 1500.0,
            brake_force: 2000.0,
            max_steer_angle: 30.0,
            max_speed: 50.0,
            steer_by_speed: ResponseCurve::default(),
        }
    }
}

/// Wheel slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelPosition {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl WheelPosition {
    pub const ALL: [WheelPosition; 4] = [
        WheelPosition::FrontLeft,
        WheelPosition::FrontRight,
        WheelPosition::RearLeft,
        WheelPosition::RearRight,
    ];

    /// Rear-wheel drive
    pub fn is_driven(self) -> bool {
        matches!(self, WheelPosition::RearLeft | WheelPosition::RearRight)
    }

    /// Front-wheel steering
    pub fn is_steered(self) -> bool {
        matches!(self, WheelPosition::FrontLeft | WheelPosition::FrontRight)
    }
}

/// Command for one wheel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelCommand {
    pub position: WheelPosition,
    /// Drive torque [N·m]
    pub motor_torque: f64,
    /// Brake torque [N·m]
    pub brake_torque: f64,
    /// Steer angle [deg]
    pub steer_angle: f64,
}

/// Commands for all four wheels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelCommands {
    pub wheels: [WheelCommand; 4],
    /// Speed limit [m/s] for the physics collaborator to enforce
    pub max_speed: f64,
}

impl WheelCommands {
    pub fn wheel(&self, position: WheelPosition) -> &WheelCommand {
        // ALL order matches construction order
        &self.wheels[position as usize]
    }

    /// Sum of drive torque over all wheels
    pub fn total_motor_torque(&self) -> f64 {
        self.wheels.iter().map(|w| w.motor_torque).sum()
    }

    /// Any wheel braking
    pub fn is_braking(&self) -> bool {
        self.wheels.iter().any(|w| w.brake_torque > 0.0)
    }
}

/// Ground vehicle force model
#[derive(Debug, Clone, Default)]
pub struct GroundForceModel {
    pub params: GroundVehicleParams,
}

impl GroundForceModel {
    pub fn new(params: GroundVehicleParams) -> Self {
        Self { params }
    }

    /// Maximum steer angle [deg] allowed at `speed`
    pub fn allowed_steer_angle(&self, speed: f64) -> f64 {
        self.params.steer_by_speed.evaluate(speed) * self.params.max_steer_angle
    }

    /// Map a controller command to wheel commands at the current speed
    pub fn synthesize(&self, command: &GroundCommand, speed: f64) -> WheelCommands {
        let throttle = command.throttle.clamp(-1.0, 1.0);
        let steering = command.steering.clamp(-1.0, 1.0);

        let motor_torque = throttle * self.params.motor_torque;
        let brake_torque = if command.brake { self.params.brake_force } else { 0.0 };
        let steer_angle = steering * self.allowed_steer_angle(speed);

        let wheels = WheelPosition::ALL.map(|position| WheelCommand {
            position,
            motor_torque: if position.is_driven() { motor_torque } else { 0.0 },
            brake_torque,
            steer_angle: if position.is_steered() { steer_angle } else { 0.0 },
        });

        WheelCommands {
            wheels,
            max_speed: self.params.max_speed,
        }
    }

    /// Clamp a velocity to the manufacturer speed limit
    pub fn limit_velocity(&self, velocity: &Vector3<f64>) -> Vector3<f64> {
        limit_velocity(velocity, self.params.max_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn command(throttle: f64, steering: f64, brake: bool) -> GroundCommand {
        GroundCommand {
            throttle,
            steering,
            brake,
            ..GroundCommand::default()
        }
    }

    #[test]
    fn test_rear_drive_only() {
        let model = GroundForceModel::default();
        let out = model.synthesize(&command(0.5, 0.0, false), 0.0);

        assert_relative_eq!(out.wheel(WheelPosition::RearLeft).motor_torque, 750.0);
        assert_relative_eq!(out.wheel(WheelPosition::RearRight).motor_torque, 750.0);
        assert_eq!(out.wheel(WheelPosition::FrontLeft).motor_torque, 0.0);
        assert_relative_eq!(out.total_motor_torque(), 1500.0);
        assert!(!out.is_braking());
    }

    #[test]
    fn test_brake_all_wheels() {
        let model = GroundForceModel::default();
        let out = model.synthesize(&command(0.0, 0.0, true), 3.0);
        for w in &out.wheels {
            assert_eq!(w.brake_torque, 2000.0);
        }
    }

    #[test]
    fn test_front_steering_attenuated_by_speed() {
        let model = GroundForceModel::default();

        let slow = model.synthesize(&command(0.0, 1.0, false), 0.0);
        assert_relative_eq!(slow.wheel(WheelPosition::FrontLeft).steer_angle, 30.0);
        assert_eq!(slow.wheel(WheelPosition::RearLeft).steer_angle, 0.0);

        let fast = model.synthesize(&command(0.0, -1.0, false), 50.0);
        assert_relative_eq!(
            fast.wheel(WheelPosition::FrontRight).steer_angle,
            -9.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_allowed_steer_decreases_with_speed() {
        let model = GroundForceModel::default();
        let mut prev = model.allowed_steer_angle(0.0);
        for s in [5.0, 10.0, 25.0, 50.0, 80.0] {
            let a = model.allowed_steer_angle(s);
            assert!(a <= prev);
            prev = a;
        }
    }

    #[test]
    fn test_wheel_lookup_matches_slot() {
        let out = GroundForceModel::default().synthesize(&command(1.0, 1.0, false), 0.0);
        for pos in WheelPosition::ALL {
            assert_eq!(out.wheel(pos).position, pos);
        }
    }

    #[test]
    fn test_speed_limit() {
        let model = GroundForceModel::default();
        let v = model.limit_velocity(&Vector3::new(0.0, 0.0, 80.0));
        assert_relative_eq!(v.z, 50.0);
    }
}
