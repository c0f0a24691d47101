//! Mathematical utilities
//!
//! Implements degree-based angle wrapping, clamped interpolation,
//! Euler attitude frames and piecewise-linear response curves.

pub mod angle;
pub mod frame;
pub mod curve;

pub use angle::*;
pub use frame::*;
pub use curve::*;
