//! Attitude frames
//!
//! Orientation crosses the collaborator boundary as Euler angles in degrees.
//! The body rotation is composed yaw · pitch · roll:
//!
//! ```text
//! R = Ry(yaw) · Rx(pitch) · Rz(roll)
//! ```
//!
//! so with the Y-up, Z-forward world frame a positive yaw turns the nose
//! toward +X and a positive pitch lowers the nose.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::angle::normalize_angle_deg;
use crate::{world_forward, world_right, world_up};

/// Euler attitude [deg]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attitude {
    /// Rotation about body-right (X)
    pub pitch: f64,
    /// Rotation about body-up (Y)
    pub yaw: f64,
    /// Rotation about body-forward (Z)
    pub roll: f64,
}

impl Attitude {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Level attitude with the given heading
    pub fn from_yaw(yaw: f64) -> Self {
        Self { pitch: 0.0, yaw, roll: 0.0 }
    }

    /// Angles as an (x, y, z) = (pitch, yaw, roll) vector
    ///
    /// Components line up with body torque axes (right, up, forward).
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.pitch, self.yaw, self.roll)
    }

    /// Body-to-world rotation
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw.to_radians());
        let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch.to_radians());
        let roll = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.roll.to_radians());
        yaw * pitch * roll
    }

    /// Body forward axis in world frame
    pub fn forward(&self) -> Vector3<f64> {
        self.rotation() * world_forward()
    }

    /// Body right axis in world frame
    pub fn right(&self) -> Vector3<f64> {
        self.rotation() * world_right()
    }

    /// Body up axis in world frame
    pub fn up(&self) -> Vector3<f64> {
        self.rotation() * world_up()
    }

    /// Per-axis wrapped difference `target - self`
    pub fn error_to(&self, target: &Attitude) -> Vector3<f64> {
        let diff = target.as_vector() - self.as_vector();
        diff.map(normalize_angle_deg)
    }
}

/// Project a world point onto the ground plane (drop the height)
pub fn ground_projection(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v.x, 0.0, v.z)
}

/// Express a world point in the body frame of a pose
///
/// p_local = R(q)ᵀ · (p_world - origin)
pub fn world_to_local(
    origin: &Vector3<f64>,
    rotation: &UnitQuaternion<f64>,
    point: &Vector3<f64>,
) -> Vector3<f64> {
    rotation.inverse_transform_vector(&(point - origin))
}

/// Heading of a body-frame point [deg], zero straight ahead, positive to the right
pub fn local_heading_deg(local: &Vector3<f64>) -> f64 {
    local.x.atan2(local.z).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_axes() {
        let att = Attitude::default();
        assert_relative_eq!(att.forward(), world_forward(), epsilon = 1e-12);
        assert_relative_eq!(att.right(), world_right(), epsilon = 1e-12);
        assert_relative_eq!(att.up(), world_up(), epsilon = 1e-12);
    }

    #[test]
    fn test_yaw_turns_nose_right() {
        let att = Attitude::from_yaw(90.0);
        assert_relative_eq!(att.forward(), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(att.right(), Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_positive_pitch_lowers_nose() {
        let att = Attitude::new(30.0, 0.0, 0.0);
        assert!(att.forward().y < 0.0);
        assert_relative_eq!(att.forward().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_error_to_wraps_each_axis() {
        let current = Attitude::new(350.0, 10.0, 5.0);
        let target = Attitude::new(0.0, 350.0, 0.0);
        let e = current.error_to(&target);
        assert_relative_eq!(e.x, 10.0, epsilon = 1e-12);
        assert_relative_eq!(e.y, -20.0, epsilon = 1e-12);
        assert_relative_eq!(e.z, -5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_local_heading() {
        let origin = Vector3::zeros();
        let rot = Attitude::default().rotation();

        let ahead_right = world_to_local(&origin, &rot, &Vector3::new(1.0, 0.0, 1.0));
        assert_relative_eq!(local_heading_deg(&ahead_right), 45.0, epsilon = 1e-10);

        let behind = world_to_local(&origin, &rot, &Vector3::new(0.0, 0.0, -3.0));
        assert_relative_eq!(local_heading_deg(&behind).abs(), 180.0, epsilon = 1e-10);
    }

    #[test]
    fn test_local_heading_follows_yaw() {
        // Facing +X, a target at +X is straight ahead
        let origin = Vector3::new(2.0, 0.0, 2.0);
        let rot = Attitude::from_yaw(90.0).rotation();
        let local = world_to_local(&origin, &rot, &Vector3::new(7.0, 0.0, 2.0));
        assert_relative_eq!(local_heading_deg(&local), 0.0, epsilon = 1e-10);
    }
}
