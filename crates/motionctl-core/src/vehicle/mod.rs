//! Vehicle assemblies
//!
//! Telemetry and target records exchanged with collaborators, and the
//! ground/aerial assemblies that wire controllers and force models to an
//! injected telemetry source and actuator.

pub mod state;
pub mod assembly;

pub use state::*;
pub use assembly::*;
