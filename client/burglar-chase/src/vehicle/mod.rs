//! Police car.
//!
//! A dynamic box body carried by four raycast wheels. Steering and throttle
//! come from the drive actions; wheel meshes follow the suspension.

mod components;
mod physics;

use avian3d::prelude::*;
use bevy::prelude::*;
use burglar_chase_core::raycast_vehicle::WHEEL_COUNT;
use components::{CarInput, CarWheel};

pub use components::Car;

use crate::assets::GameAssets;
use crate::input::default_drive_input_map;
use crate::session::{GameRestarted, SessionSystems, is_running};

/// Plugin for the police car.
pub struct VehiclePlugin;

impl Plugin for VehiclePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_car)
            .add_systems(
                FixedPreUpdate,
                physics::car_physics_system.run_if(is_running),
            )
            .add_systems(
                Update,
                (
                    physics::car_input_system.after(SessionSystems),
                    physics::sync_wheel_visuals,
                    reset_car_on_restart.after(SessionSystems),
                ),
            );
    }
}

/// Spawn the car body and its four wheels.
fn spawn_car(mut commands: Commands, assets: Res<GameAssets>) {
    let car = Car::default();
    let spawn = car.tuning.spawn_position;
    let size = car.tuning.half_extents * 2.0;
    let mass = car.tuning.mass;

    commands.spawn((
        Name::new("Police car"),
        RigidBody::Dynamic,
        Collider::cuboid(size.x, size.y, size.z),
        Mass(mass),
        Transform::from_translation(spawn),
        default_drive_input_map(),
        car,
        children![(
            SceneRoot(assets.police.clone()),
            Transform::from_xyz(0.0, -0.25, 0.0),
        )],
    ));

    for index in 0..WHEEL_COUNT {
        commands.spawn((
            Name::new(format!("Wheel {index}")),
            CarWheel { index },
            SceneRoot(assets.wheel.clone()),
            Transform::from_translation(spawn),
        ));
    }

    tracing::info!("Spawned police car at {spawn}");
}

/// Put the car back on its spawn point at rest.
#[allow(clippy::type_complexity)]
fn reset_car_on_restart(
    mut restarted: MessageReader<GameRestarted>,
    mut query: Query<(
        &mut Car,
        &mut CarInput,
        &mut Transform,
        &mut Position,
        &mut Rotation,
        &mut LinearVelocity,
        &mut AngularVelocity,
    )>,
) {
    if restarted.read().count() == 0 {
        return;
    }

    for (
        mut car,
        mut input,
        mut transform,
        mut position,
        mut rotation,
        mut linear_velocity,
        mut angular_velocity,
    ) in &mut query
    {
        let spawn = car.tuning.spawn_position;
        car.wheels.reset();
        *input = CarInput::default();
        *transform = Transform::from_translation(spawn);
        position.0 = spawn;
        *rotation = Rotation::IDENTITY;
        linear_velocity.0 = Vec3::ZERO;
        angular_velocity.0 = Vec3::ZERO;
    }
}
