//! Physics integration using Avian 3D.
//!
//! The car, the ground slabs, the walls and the props are Avian bodies.
//! Physics time is paused by the session whenever the game is not running.

use avian3d::debug_render::{PhysicsDebugPlugin, PhysicsGizmos};
use avian3d::prelude::*;
use bevy::color::palettes::css::LIME;
use bevy::gizmos::config::{GizmoConfig, GizmoConfigStore};
use bevy::prelude::*;

use crate::launch_params::LaunchParams;

/// Gravity along -Y (m/s²).
const GRAVITY: f32 = 9.8;

/// Plugin for physics integration.
pub struct PhysicsIntegrationPlugin;

impl Plugin for PhysicsIntegrationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PhysicsPlugins::default())
            // Collider gizmos, enabled with --physics-debug.
            .add_plugins(PhysicsDebugPlugin)
            .insert_resource(Gravity(Vec3::NEG_Y * GRAVITY))
            .add_systems(Startup, configure_physics_debug_on_startup);
    }
}

/// Configure collider gizmos from the launch parameters.
fn configure_physics_debug_on_startup(
    params: Res<LaunchParams>,
    mut config_store: ResMut<GizmoConfigStore>,
) {
    let physics_gizmos = PhysicsGizmos {
        collider_color: Some(LIME.into()),
        ..Default::default()
    };

    // Use negative depth_bias to render gizmos on top of geometry.
    let gizmo_config = GizmoConfig {
        enabled: params.physics_debug,
        depth_bias: -1.0,
        ..Default::default()
    };

    config_store.insert(gizmo_config, physics_gizmos);
    tracing::info!("Physics debug visualization: {}", params.physics_debug);
}
