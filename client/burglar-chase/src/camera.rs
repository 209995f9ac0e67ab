//! Chase camera and scene lighting.
//!
//! Third-person camera that trails the car, plus a sun that follows the car
//! so its shadows stay in view.

use bevy::light::GlobalAmbientLight;
use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;
use burglar_chase_core::chase_camera::{ChaseCameraConfig, chase_step};

use crate::session::{GameRestarted, SessionSystems, is_running};
use crate::vehicle::Car;

// ============================================================================
// Plugin
// ============================================================================

/// Plugin for the chase camera and sun.
pub struct ChaseCameraPlugin;

impl Plugin for ChaseCameraPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(SKY_COLOR))
            .add_systems(Startup, setup_camera_and_lights)
            .add_systems(
                Update,
                (
                    reset_camera_on_restart.after(SessionSystems),
                    chase_camera_system.run_if(is_running),
                    sun_follow_system,
                )
                    .chain(),
            );
    }
}

const SKY_COLOR: Color = Color::srgb_u8(0xbf, 0xd1, 0xe5);
const FOG_COLOR: Color = Color::srgb_u8(0xef, 0xd1, 0xb5);
const FOG_DENSITY: f32 = 0.003;
const AMBIENT_COLOR: Color = Color::srgb_u8(0xaa, 0xaa, 0xaa);

/// Sun position relative to the car.
const SUN_OFFSET: Vec3 = Vec3::new(-50.0, 50.0, 50.0);

// ============================================================================
// Components
// ============================================================================

/// Camera that chases the car.
#[derive(Component, Default)]
pub struct ChaseCamera {
    pub config: ChaseCameraConfig,
}

/// Directional light kept at a fixed offset from the car.
#[derive(Component)]
struct Sun;

/// Spawn the camera, the sun and ambient light.
fn setup_camera_and_lights(mut commands: Commands) {
    let chase = ChaseCamera::default();
    let start = chase.config.start_position;

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 45.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_translation(start).looking_at(Vec3::new(start.x, 0.0, 0.0), Vec3::Y),
        DistanceFog {
            color: FOG_COLOR,
            falloff: FogFalloff::ExponentialSquared {
                density: FOG_DENSITY,
            },
            ..default()
        },
        chase,
    ));

    commands.spawn((
        Sun,
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(SUN_OFFSET).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.insert_resource(GlobalAmbientLight {
        color: AMBIENT_COLOR,
        brightness: 400.0,
        ..default()
    });

    tracing::info!("Scene setup complete - click to start, arrows to drive");
}

// ============================================================================
// Systems
// ============================================================================

/// Trail the car: blend the height, clamp the distance, look at it.
fn chase_camera_system(
    car_query: Query<&Transform, (With<Car>, Without<ChaseCamera>)>,
    mut camera_query: Query<(&ChaseCamera, &mut Transform)>,
) {
    let Ok(car) = car_query.single() else {
        return;
    };
    let target = car.translation;

    for (chase, mut transform) in &mut camera_query {
        transform.translation = chase_step(transform.translation, target, &chase.config);
        transform.look_at(target, Vec3::Y);
    }
}

/// Move the sun along with the car.
fn sun_follow_system(
    car_query: Query<&Transform, (With<Car>, Without<Sun>)>,
    mut sun_query: Query<&mut Transform, With<Sun>>,
) {
    let Ok(car) = car_query.single() else {
        return;
    };
    for mut transform in &mut sun_query {
        *transform = Transform::from_translation(car.translation + SUN_OFFSET)
            .looking_at(car.translation, Vec3::Y);
    }
}

/// Put the camera back at its start position.
fn reset_camera_on_restart(
    mut restarted: MessageReader<GameRestarted>,
    car_query: Query<&Car>,
    mut camera_query: Query<(&ChaseCamera, &mut Transform)>,
) {
    if restarted.read().count() == 0 {
        return;
    }
    let target = car_query
        .single()
        .map_or(Vec3::ZERO, |car| car.tuning.spawn_position);
    for (chase, mut transform) in &mut camera_query {
        *transform = Transform::from_translation(chase.config.start_position)
            .looking_at(target, Vec3::Y);
    }
}
