//! Input action definitions.
//!
//! Driving and session control use `leafwing-input-manager` action maps. The
//! driving actions are sampled into a [`DriveInput`] snapshot once per fixed
//! tick and passed to the steering logic.

use bevy::prelude::*;
use burglar_chase_core::steering::DriveInput;
use leafwing_input_manager::{plugin::InputManagerSystem, prelude::*};

use crate::session::Session;

// ============================================================================
// Action enums
// ============================================================================

/// Actions for driving the car.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum DriveAction {
    /// Accelerate (Up arrow).
    Forward,
    /// Brake and reverse (Down arrow).
    Reverse,
    /// Steer left (Left arrow).
    Left,
    /// Steer right (Right arrow).
    Right,
    /// Hop (Space).
    Jump,
}

/// Actions for starting, pausing and restarting the game.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum SessionAction {
    /// Start or resume (left click).
    Start,
    /// Pause (ESC).
    Pause,
    /// Start over (R).
    Restart,
}

// ============================================================================
// Input maps
// ============================================================================

/// Create the default input map for driving.
pub fn default_drive_input_map() -> InputMap<DriveAction> {
    InputMap::default()
        .with(DriveAction::Forward, KeyCode::ArrowUp)
        .with(DriveAction::Reverse, KeyCode::ArrowDown)
        .with(DriveAction::Left, KeyCode::ArrowLeft)
        .with(DriveAction::Right, KeyCode::ArrowRight)
        .with(DriveAction::Jump, KeyCode::Space)
}

/// Create the default input map for session control.
pub fn default_session_input_map() -> InputMap<SessionAction> {
    InputMap::default()
        .with(SessionAction::Start, MouseButton::Left)
        .with(SessionAction::Pause, KeyCode::Escape)
        .with(SessionAction::Restart, KeyCode::KeyR)
}

/// Snapshot the driving actions.
///
/// Jump fires on the press only, so holding Space does not chain hops.
pub fn sample_drive_input(action_state: &ActionState<DriveAction>) -> DriveInput {
    DriveInput {
        forward: action_state.pressed(&DriveAction::Forward),
        reverse: action_state.pressed(&DriveAction::Reverse),
        left: action_state.pressed(&DriveAction::Left),
        right: action_state.pressed(&DriveAction::Right),
        jump: action_state.just_pressed(&DriveAction::Jump),
    }
}

// ============================================================================
// Plugin
// ============================================================================

/// Plugin that registers input action types and input focus management.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<DriveAction>::default())
            .add_plugins(InputManagerPlugin::<SessionAction>::default())
            .add_systems(Startup, spawn_input_maps)
            .add_systems(
                PreUpdate,
                manage_input_focus.after(InputManagerSystem::Update),
            );
    }
}

/// Spawn the entity holding the session action map.
///
/// The drive action map lives on the car itself.
fn spawn_input_maps(mut commands: Commands) {
    commands.spawn((Name::new("Session input"), default_session_input_map()));
}

// ============================================================================
// Input focus management
// ============================================================================

/// Disable driving outside a running game.
fn manage_input_focus(
    session: Res<Session>,
    mut drive_query: Query<&mut ActionState<DriveAction>>,
) {
    for mut action_state in &mut drive_query {
        if session.is_simulating() {
            action_state.enable_all_actions();
        } else {
            action_state.disable_all_actions();
        }
    }
}
