//! Vehicle configuration
//!
//! Plain records set once per vehicle. Every record round-trips through
//! serde unchanged.

use serde::{Deserialize, Serialize};

use crate::actuation::{AerialVehicleParams, GroundVehicleParams};
use crate::control::{AerialControllerConfig, GroundControllerConfig, StabilizationConfig};

/// Ground vehicle configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroundVehicleConfig {
    /// Controller tuning
    pub controller: GroundControllerConfig,
    /// Physical parameters
    pub vehicle: GroundVehicleParams,
}

/// Multirotor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AerialVehicleConfig {
    /// Position/heading controller tuning
    pub controller: AerialControllerConfig,
    /// Level-attitude controller tuning
    pub stabilization: StabilizationConfig,
    /// Run the stabilization loop and add its torque
    pub stabilization_enabled: bool,
    /// Physical parameters
    pub vehicle: AerialVehicleParams,
}

impl Default for AerialVehicleConfig {
    fn default() -> Self {
        Self {
            controller: AerialControllerConfig::default(),
            stabilization: StabilizationConfig::default(),
            stabilization_enabled: true,
            vehicle: AerialVehicleParams::default(),
        }
    }
}
