//! Vehicle assemblies
//!
//! Each assembly owns its controllers and force model and is handed its
//! collaborators once, at build time:
//!
//! - a [`TelemetrySource`] that reports the body's pose and velocity
//! - an actuator ([`GroundActuator`] / [`AerialActuator`]) that receives the
//!   synthesized commands
//!
//! A tick with no telemetry available is skipped without touching any
//! controller state.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use super::state::{Target, VehicleTelemetry};
use crate::actuation::{AerialForceModel, AerialWrench, GroundForceModel, WheelCommands};
use crate::config::{AerialVehicleConfig, GroundVehicleConfig};
use crate::control::{
    AerialCommand, AerialVehicleController, GroundCommand, GroundVehicleController,
    StabilizationController, StabilizationOutput,
};
use crate::error::{validate_dt, ControlError, Result};

/// Provides the pose/velocity snapshot for a tick
pub trait TelemetrySource {
    /// Current snapshot, or `None` when the body is unavailable
    fn telemetry(&self) -> Option<VehicleTelemetry>;
}

/// Receives per-wheel commands
pub trait GroundActuator {
    fn apply(&mut self, commands: &WheelCommands);
}

/// Receives force/torque
pub trait AerialActuator {
    fn apply(&mut self, wrench: &AerialWrench);
}

// A single simulated body usually plays both roles
impl<T: TelemetrySource> TelemetrySource for Rc<RefCell<T>> {
    fn telemetry(&self) -> Option<VehicleTelemetry> {
        self.borrow().telemetry()
    }
}

impl<T: GroundActuator> GroundActuator for Rc<RefCell<T>> {
    fn apply(&mut self, commands: &WheelCommands) {
        self.borrow_mut().apply(commands)
    }
}

impl<T: AerialActuator> AerialActuator for Rc<RefCell<T>> {
    fn apply(&mut self, wrench: &AerialWrench) {
        self.borrow_mut().apply(wrench)
    }
}

/// Record of one ground tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundTick {
    pub telemetry: VehicleTelemetry,
    pub target: Target,
    pub command: GroundCommand,
    pub wheels: WheelCommands,
}

/// Record of one aerial tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AerialTick {
    pub telemetry: VehicleTelemetry,
    pub target: Target,
    pub command: AerialCommand,
    pub stabilization: Option<StabilizationOutput>,
    pub wrench: AerialWrench,
}

/// Builder for [`GroundVehicle`]
pub struct GroundVehicleBuilder<S, A> {
    config: GroundVehicleConfig,
    telemetry: Option<S>,
    actuator: Option<A>,
    target: Option<Target>,
}

impl<S: TelemetrySource, A: GroundActuator> GroundVehicleBuilder<S, A> {
    pub fn new(config: GroundVehicleConfig) -> Self {
        Self {
            config,
            telemetry: None,
            actuator: None,
            target: None,
        }
    }

    pub fn telemetry(mut self, source: S) -> Self {
        self.telemetry = Some(source);
        self
    }

    pub fn actuator(mut self, actuator: A) -> Self {
        self.actuator = Some(actuator);
        self
    }

    /// Initial target; without one the first tick holds the current pose
    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn build(self) -> Result<GroundVehicle<S, A>> {
        let telemetry = self
            .telemetry
            .ok_or(ControlError::MissingCollaborator("telemetry source"))?;
        let actuator = self
            .actuator
            .ok_or(ControlError::MissingCollaborator("ground actuator"))?;

        Ok(GroundVehicle {
            controller: GroundVehicleController::new(self.config.controller, &self.config.vehicle),
            force_model: GroundForceModel::new(self.config.vehicle),
            telemetry,
            actuator,
            target: self.target,
        })
    }
}

/// Ground vehicle wired to its collaborators
pub struct GroundVehicle<S, A> {
    controller: GroundVehicleController,
    force_model: GroundForceModel,
    telemetry: S,
    actuator: A,
    target: Option<Target>,
}

impl<S: TelemetrySource, A: GroundActuator> GroundVehicle<S, A> {
    /// Run controller and force model for one tick and hand the result to
    /// the actuator
    ///
    /// Returns `Ok(None)` when the tick was skipped for lack of telemetry.
    pub fn step(&mut self, dt: f64) -> Result<Option<GroundTick>> {
        let dt = validate_dt(dt)?;

        let Some(telemetry) = self.telemetry.telemetry() else {
            warn!("ground vehicle: no telemetry, tick skipped");
            return Ok(None);
        };

        let target = *self.target.get_or_insert_with(|| {
            debug!("ground vehicle: holding start position {:?}", telemetry.position);
            Target::hold(&telemetry)
        });

        let command = self.controller.update(&telemetry, &target, dt)?;
        let wheels = self.force_model.synthesize(&command, telemetry.speed());
        self.actuator.apply(&wheels);

        Ok(Some(GroundTick {
            telemetry,
            target,
            command,
            wheels,
        }))
    }

    pub fn set_target(&mut self, target: Target) {
        self.target = Some(target);
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn controller(&self) -> &GroundVehicleController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut GroundVehicleController {
        &mut self.controller
    }

    pub fn force_model(&self) -> &GroundForceModel {
        &self.force_model
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }
}

/// Builder for [`AerialVehicle`]
pub struct AerialVehicleBuilder<S, A> {
    config: AerialVehicleConfig,
    telemetry: Option<S>,
    actuator: Option<A>,
    target: Option<Target>,
}

impl<S: TelemetrySource, A: AerialActuator> AerialVehicleBuilder<S, A> {
    pub fn new(config: AerialVehicleConfig) -> Self {
        Self {
            config,
            telemetry: None,
            actuator: None,
            target: None,
        }
    }

    pub fn telemetry(mut self, source: S) -> Self {
        self.telemetry = Some(source);
        self
    }

    pub fn actuator(mut self, actuator: A) -> Self {
        self.actuator = Some(actuator);
        self
    }

    /// Initial target; without one the first tick holds the current pose
    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn build(self) -> Result<AerialVehicle<S, A>> {
        let telemetry = self
            .telemetry
            .ok_or(ControlError::MissingCollaborator("telemetry source"))?;
        let actuator = self
            .actuator
            .ok_or(ControlError::MissingCollaborator("aerial actuator"))?;

        let stabilizer = if self.config.stabilization_enabled {
            Some(StabilizationController::new(self.config.stabilization))
        } else {
            None
        };

        Ok(AerialVehicle {
            controller: AerialVehicleController::new(self.config.controller),
            stabilizer,
            force_model: AerialForceModel::new(self.config.vehicle),
            telemetry,
            actuator,
            target: self.target,
        })
    }
}

/// Multirotor wired to its collaborators
pub struct AerialVehicle<S, A> {
    controller: AerialVehicleController,
    stabilizer: Option<StabilizationController>,
    force_model: AerialForceModel,
    telemetry: S,
    actuator: A,
    target: Option<Target>,
}

impl<S: TelemetrySource, A: AerialActuator> AerialVehicle<S, A> {
    /// Run all loops and the force model for one tick and hand the wrench
    /// to the actuator
    ///
    /// Returns `Ok(None)` when the tick was skipped for lack of telemetry.
    pub fn step(&mut self, dt: f64) -> Result<Option<AerialTick>> {
        let dt = validate_dt(dt)?;

        let Some(telemetry) = self.telemetry.telemetry() else {
            warn!("aerial vehicle: no telemetry, tick skipped");
            return Ok(None);
        };

        let target = *self.target.get_or_insert_with(|| {
            debug!("aerial vehicle: holding start pose {:?}", telemetry.position);
            Target::hold(&telemetry)
        });

        let command = self.controller.update(&telemetry, &target, dt)?;
        let stabilization = match self.stabilizer.as_mut() {
            Some(stabilizer) => Some(stabilizer.update(&telemetry.attitude, dt)?),
            None => None,
        };

        let wrench = self.force_model.synthesize(
            &command,
            &telemetry.attitude,
            stabilization.as_ref().map(|s| &s.torque),
            telemetry.ground_contact,
        );
        self.actuator.apply(&wrench);

        Ok(Some(AerialTick {
            telemetry,
            target,
            command,
            stabilization,
            wrench,
        }))
    }

    pub fn set_target(&mut self, target: Target) {
        self.target = Some(target);
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn controller(&self) -> &AerialVehicleController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut AerialVehicleController {
        &mut self.controller
    }

    pub fn stabilizer(&self) -> Option<&StabilizationController> {
        self.stabilizer.as_ref()
    }

    pub fn force_model(&self) -> &AerialForceModel {
        &self.force_model
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Attitude;
    use nalgebra::Vector3;

    #[derive(Default)]
    struct FixedTelemetry(Option<VehicleTelemetry>);

    impl TelemetrySource for FixedTelemetry {
        fn telemetry(&self) -> Option<VehicleTelemetry> {
            self.0
        }
    }

    #[derive(Default)]
    struct Recorder {
        wheels: Vec<WheelCommands>,
        wrenches: Vec<AerialWrench>,
    }

    impl GroundActuator for Recorder {
        fn apply(&mut self, commands: &WheelCommands) {
            self.wheels.push(*commands);
        }
    }

    impl AerialActuator for Recorder {
        fn apply(&mut self, wrench: &AerialWrench) {
            self.wrenches.push(*wrench);
        }
    }

    #[test]
    fn test_build_requires_collaborators() {
        let missing_sink =
            GroundVehicleBuilder::<FixedTelemetry, Recorder>::new(GroundVehicleConfig::default())
                .telemetry(FixedTelemetry::default())
                .build();
        assert!(matches!(missing_sink, Err(ControlError::MissingCollaborator(_))));

        let missing_source =
            AerialVehicleBuilder::<FixedTelemetry, Recorder>::new(AerialVehicleConfig::default())
                .actuator(Recorder::default())
                .build();
        assert_eq!(
            missing_source.err(),
            Some(ControlError::MissingCollaborator("telemetry source"))
        );
    }

    #[test]
    fn test_tick_skipped_without_telemetry() {
        let mut vehicle = AerialVehicleBuilder::new(AerialVehicleConfig::default())
            .telemetry(FixedTelemetry(None))
            .actuator(Recorder::default())
            .build()
            .unwrap();

        assert_eq!(vehicle.step(0.02), Ok(None));
        assert!(vehicle.actuator().wrenches.is_empty());
        assert!(vehicle.target().is_none());
    }

    #[test]
    fn test_zero_dt_is_an_error() {
        let mut vehicle = GroundVehicleBuilder::new(GroundVehicleConfig::default())
            .telemetry(FixedTelemetry(Some(VehicleTelemetry::default())))
            .actuator(Recorder::default())
            .build()
            .unwrap();

        assert_eq!(vehicle.step(0.0), Err(ControlError::InvalidTimeStep(0.0)));
        assert!(vehicle.actuator().wheels.is_empty());
    }

    #[test]
    fn test_first_tick_holds_pose() {
        let pose =
            VehicleTelemetry::at_rest(Vector3::new(3.0, 7.0, -1.0), Attitude::from_yaw(80.0));
        let mut vehicle = AerialVehicleBuilder::new(AerialVehicleConfig::default())
            .telemetry(FixedTelemetry(Some(pose)))
            .actuator(Recorder::default())
            .build()
            .unwrap();

        let tick = vehicle.step(0.02).unwrap().unwrap();
        assert_eq!(tick.target, Target::hold(&pose));
        assert_eq!(vehicle.actuator().wrenches.len(), 1);
        assert!(tick.stabilization.is_some());
    }

    #[test]
    fn test_stabilization_disabled() {
        let mut config = AerialVehicleConfig::default();
        config.stabilization_enabled = false;
        let mut vehicle = AerialVehicleBuilder::new(config)
            .telemetry(FixedTelemetry(Some(VehicleTelemetry::default())))
            .actuator(Recorder::default())
            .build()
            .unwrap();

        let tick = vehicle.step(0.02).unwrap().unwrap();
        assert!(tick.stabilization.is_none());
        assert!(vehicle.stabilizer().is_none());
    }

    #[test]
    fn test_ground_step_applies_wheels() {
        let mut vehicle = GroundVehicleBuilder::new(GroundVehicleConfig::default())
            .telemetry(FixedTelemetry(Some(VehicleTelemetry::default())))
            .actuator(Recorder::default())
            .target(Target::new(Vector3::new(0.0, 0.0, 40.0), 0.0))
            .build()
            .unwrap();

        let tick = vehicle.step(0.02).unwrap().unwrap();
        assert!(tick.command.throttle > 0.0);
        assert_eq!(vehicle.actuator().wheels.len(), 1);
        assert!(vehicle.actuator().wheels[0].total_motor_torque() > 0.0);
    }

    #[test]
    fn test_shared_body_handle() {
        struct Body {
            telemetry: VehicleTelemetry,
            applied: usize,
        }
        impl TelemetrySource for Body {
            fn telemetry(&self) -> Option<VehicleTelemetry> {
                Some(self.telemetry)
            }
        }
        impl AerialActuator for Body {
            fn apply(&mut self, _wrench: &AerialWrench) {
                self.applied += 1;
            }
        }

        let body = Rc::new(RefCell::new(Body {
            telemetry: VehicleTelemetry::default(),
            applied: 0,
        }));
        let mut vehicle = AerialVehicleBuilder::new(AerialVehicleConfig::default())
            .telemetry(Rc::clone(&body))
            .actuator(Rc::clone(&body))
            .build()
            .unwrap();

        vehicle.step(0.02).unwrap();
        vehicle.step(0.02).unwrap();
        assert_eq!(body.borrow().applied, 2);
    }
}
