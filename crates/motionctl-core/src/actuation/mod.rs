//! Force and torque synthesis
//!
//! Maps normalized controller commands to the physical quantities the
//! physics collaborator applies: per-wheel torques and steer angles for the
//! ground vehicle, a force/torque pair for the multirotor.

pub mod ground;
pub mod aerial;

pub use ground::*;
pub use aerial::*;

use nalgebra::Vector3;

/// Clamp a velocity's magnitude to `max_speed`, keeping its direction
pub fn limit_velocity(velocity: &Vector3<f64>, max_speed: f64) -> Vector3<f64> {
    let speed = velocity.norm();
    if speed > max_speed && speed > 0.0 {
        velocity * (max_speed.max(0.0) / speed)
    } else {
        *velocity
    }
}
