//! Car component definitions.

use avian3d::prelude::*;
use bevy::prelude::*;
use burglar_chase_core::raycast_vehicle::{ChassisState, RaycastVehicle};
use burglar_chase_core::steering::{DriveInput, VehicleTuning};

/// The police car.
#[derive(Component, Default)]
#[require(CarInput)]
pub struct Car {
    /// Tuning constants.
    pub tuning: VehicleTuning,
    /// Wheel mounts plus suspension and spin state.
    pub wheels: RaycastVehicle,
}

/// Input state for the car (latched per frame, consumed per fixed tick).
#[derive(Component, Default)]
pub struct CarInput {
    /// Held directions and the latched jump press.
    pub drive: DriveInput,
}

/// Visual wheel of the car.
#[derive(Component)]
pub struct CarWheel {
    /// Wheel index: front left, front right, rear left, rear right.
    pub index: usize,
}

/// Chassis state as seen by the wheel model.
pub fn chassis_state(
    position: &Position,
    rotation: &Rotation,
    linear_velocity: &LinearVelocity,
    angular_velocity: &AngularVelocity,
) -> ChassisState {
    ChassisState {
        position: position.0,
        rotation: rotation.0,
        linear_velocity: linear_velocity.0,
        angular_velocity: angular_velocity.0,
    }
}
