//! Control algorithms
//!
//! - Scalar and vector PID primitives
//! - Gain scheduling between configured bounds
//! - Ground vehicle controller (drive/brake state machine + steering)
//! - Aerial vehicle controller (altitude, longitudinal, lateral, yaw loops)
//! - Attitude stabilization (level pitch/roll, hold yaw)

pub mod pid;
pub mod schedule;
pub mod ground;
pub mod aerial;
pub mod stabilization;

pub use pid::*;
pub use schedule::*;
pub use ground::*;
pub use aerial::*;
pub use stabilization::*;
