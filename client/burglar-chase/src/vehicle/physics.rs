//! Car physics: raycast wheels, steering and jumps.

use avian3d::prelude::*;
use bevy::prelude::*;
use burglar_chase_core::raycast_vehicle::{WHEEL_COUNT, WheelContact};
use burglar_chase_core::steering::{DriveInput, SteeringState, try_jump, wheel_command};
use leafwing_input_manager::prelude::*;

use super::components::{Car, CarInput, CarWheel, chassis_state};
use crate::input::{DriveAction, sample_drive_input};
use crate::session::Session;

/// Capture driving input.
///
/// Held directions are overwritten every frame; a jump press is latched until
/// the next fixed tick consumes it. Outside a running game the input is
/// cleared, so nothing latched before a pause fires on resume.
pub fn car_input_system(
    session: Res<Session>,
    mut query: Query<(&ActionState<DriveAction>, &mut CarInput), With<Car>>,
) {
    for (action_state, mut input) in &mut query {
        if !session.is_simulating() {
            input.drive = DriveInput::default();
            continue;
        }
        let sampled = sample_drive_input(action_state);
        let jump = input.drive.jump || sampled.jump;
        input.drive = sampled;
        input.drive.jump = jump;
    }
}

/// Apply suspension, engine, brake and grip impulses to the car.
///
/// Each wheel casts a ray down from its mount; the wheel model turns the hits
/// into a velocity change on the chassis.
#[allow(clippy::type_complexity)]
pub fn car_physics_system(
    time: Res<Time<Fixed>>,
    spatial_query: Res<SpatialQueryPipeline>,
    mut query: Query<(
        Entity,
        &mut Car,
        &mut CarInput,
        &Position,
        &Rotation,
        &mut LinearVelocity,
        &mut AngularVelocity,
    )>,
) {
    let dt = time.delta_secs();

    for (entity, mut car, mut input, position, rotation, mut linear_velocity, mut angular_velocity) in
        &mut query
    {
        let car = &mut *car;
        let chassis = chassis_state(position, rotation, &linear_velocity, &angular_velocity);

        // Raycast filter excludes self.
        let filter = SpatialQueryFilter::default().with_excluded_entities([entity]);
        let contacts: [Option<WheelContact>; WHEEL_COUNT] = std::array::from_fn(|index| {
            let ray = car.wheels.ray(index, &chassis);
            let direction = Dir3::new(ray.direction).ok()?;
            spatial_query
                .cast_ray(ray.origin, direction, ray.max_distance, true, &filter)
                .map(|hit| WheelContact {
                    distance: hit.distance,
                    normal: hit.normal,
                })
        });

        let steering = SteeringState::from_input(&input.drive, &car.tuning);
        let speed_kmh = chassis.speed_kmh();
        let commands = car.wheels.mounts.map(|mount| {
            wheel_command(
                mount.driven,
                mount.steerable,
                &steering,
                speed_kmh,
                &car.tuning,
            )
        });

        let change = car
            .wheels
            .step(&chassis, &contacts, &commands, &car.tuning, dt);
        linear_velocity.0 += change.linear;
        angular_velocity.0 += change.angular;

        if std::mem::take(&mut input.drive.jump)
            && try_jump(
                position.0.y,
                &mut linear_velocity.0,
                &mut angular_velocity.0,
                &car.tuning,
            )
        {
            tracing::debug!("Jump at height {:.2}", position.0.y);
        }
    }
}

/// Move the wheel meshes to their hubs.
pub fn sync_wheel_visuals(
    car_query: Query<(&Car, &Position, &Rotation, &LinearVelocity, &AngularVelocity)>,
    mut wheel_query: Query<(&CarWheel, &mut Transform), Without<Car>>,
) {
    let Ok((car, position, rotation, linear_velocity, angular_velocity)) = car_query.single()
    else {
        return;
    };
    let chassis = chassis_state(position, rotation, linear_velocity, angular_velocity);

    for (wheel, mut transform) in &mut wheel_query {
        if wheel.index >= WHEEL_COUNT {
            continue;
        }
        let (translation, rotation) = car.wheels.wheel_transform(wheel.index, &chassis);
        transform.translation = translation;
        transform.rotation = rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::running_session;

    fn car_app(session: Session) -> (App, Entity) {
        let mut app = App::new();
        app.insert_resource(session)
            .add_systems(Update, car_input_system);
        let mut action_state = ActionState::<DriveAction>::default();
        action_state.press(&DriveAction::Jump);
        action_state.press(&DriveAction::Forward);
        let car = app.world_mut().spawn((Car::default(), action_state)).id();
        (app, car)
    }

    fn drive(app: &App, car: Entity) -> DriveInput {
        app.world().get::<CarInput>(car).unwrap().drive
    }

    #[test]
    fn test_jump_latches_while_running() {
        let (mut app, car) = car_app(running_session());
        app.update();
        assert!(drive(&app, car).jump);
        assert!(drive(&app, car).forward);

        // Released before the fixed tick: the press is still pending.
        let mut action_state = app.world_mut().get_mut::<ActionState<DriveAction>>(car).unwrap();
        action_state.release(&DriveAction::Jump);
        app.update();
        assert!(drive(&app, car).jump);
    }

    #[test]
    fn test_pause_clears_latched_jump() {
        let (mut app, car) = car_app(running_session());
        app.update();
        assert!(drive(&app, car).jump);

        app.world_mut().resource_mut::<Session>().pause();
        app.update();
        assert_eq!(drive(&app, car), DriveInput::default());

        app.world_mut().resource_mut::<Session>().start();
        let mut action_state = app.world_mut().get_mut::<ActionState<DriveAction>>(car).unwrap();
        action_state.release(&DriveAction::Jump);
        app.update();
        assert!(!drive(&app, car).jump);
    }
}
