//! Per-tick collaborator records

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::math::Attitude;

/// Pose and velocity snapshot supplied by the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleTelemetry {
    /// Position [m] (world frame)
    pub position: Vector3<f64>,
    /// Orientation [deg]
    pub attitude: Attitude,
    /// Linear velocity [m/s] (world frame)
    pub linear_velocity: Vector3<f64>,
    /// Angular velocity [deg/s] (world frame)
    pub angular_velocity: Vector3<f64>,
    /// Touching the ground or a landing pad
    #[serde(default)]
    pub ground_contact: bool,
}

impl VehicleTelemetry {
    /// At rest at `position` with the given attitude
    pub fn at_rest(position: Vector3<f64>, attitude: Attitude) -> Self {
        Self {
            position,
            attitude,
            ..Self::default()
        }
    }

    /// Speed in the ground plane [m/s]
    pub fn planar_speed(&self) -> f64 {
        Vector3::new(self.linear_velocity.x, 0.0, self.linear_velocity.z).norm()
    }

    /// Full 3D speed [m/s]
    pub fn speed(&self) -> f64 {
        self.linear_velocity.norm()
    }
}

/// Position and heading to drive toward
///
/// May change arbitrarily between ticks; changes feed straight into the
/// next tick's error.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Target {
    /// Position [m] (world frame)
    pub position: Vector3<f64>,
    /// Heading/yaw [deg]
    pub yaw: f64,
}

impl Target {
    pub fn new(position: Vector3<f64>, yaw: f64) -> Self {
        Self { position, yaw }
    }

    /// Hold the current pose of a vehicle
    pub fn hold(telemetry: &VehicleTelemetry) -> Self {
        Self {
            position: telemetry.position,
            yaw: telemetry.attitude.yaw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_planar_speed_ignores_vertical() {
        let t = VehicleTelemetry {
            linear_velocity: Vector3::new(3.0, 100.0, 4.0),
            ..VehicleTelemetry::default()
        };
        assert_relative_eq!(t.planar_speed(), 5.0, epsilon = 1e-12);
        assert!(t.speed() > 100.0);
    }

    #[test]
    fn test_hold_target() {
        let t = VehicleTelemetry::at_rest(Vector3::new(1.0, 2.0, 3.0), Attitude::from_yaw(45.0));
        let target = Target::hold(&t);
        assert_eq!(target.position, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(target.yaw, 45.0);
    }
}
