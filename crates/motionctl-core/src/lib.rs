//! # motionctl Core
//!
//! Real-time motion control for two vehicle archetypes: a wheeled ground
//! vehicle and a multirotor.
//!
//! Each fixed tick a physics collaborator supplies a pose/velocity snapshot,
//! the controllers turn position and heading errors into normalized commands,
//! and the force models turn those commands into wheel torques, steer angles,
//! forces and torques for the physics collaborator to apply.
//!
//! ## Modules
//!
//! - [`math`]: Angle wrapping, interpolation, Euler attitude frames, response curves
//! - [`control`]: PID primitives, gain scheduling, ground/aerial/stabilization controllers
//! - [`actuation`]: Force and torque synthesis for both vehicles
//! - [`vehicle`]: Telemetry/target records and the collaborator-injected vehicle assemblies
//! - [`config`]: Serializable per-vehicle configuration records
//!
//! ## Frame convention
//!
//! World frame is Y-up with +Z forward and +X right. Angles crossing the
//! public API are in degrees.

pub mod error;
pub mod math;
pub mod control;
pub mod actuation;
pub mod vehicle;
pub mod config;

pub use error::{ControlError, Result};

use nalgebra::Vector3;

/// World up axis (Y-up)
pub fn world_up() -> Vector3<f64> {
    Vector3::new(0.0, 1.0, 0.0)
}

/// World forward axis
pub fn world_forward() -> Vector3<f64> {
    Vector3::new(0.0, 0.0, 1.0)
}

/// World right axis
pub fn world_right() -> Vector3<f64> {
    Vector3::new(1.0, 0.0, 0.0)
}
