//! Game session: state transitions, timer, physics pause and sound cues.

use avian3d::prelude::*;
use bevy::prelude::*;
use burglar_chase_core::session::{GameSession, GameState, SessionCue};
use leafwing_input_manager::prelude::*;

use crate::assets::{GameAssets, LoadTracker};
use crate::input::SessionAction;

/// Plugin for the game session.
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Session>()
            .add_message::<RestartRequested>()
            .add_message::<GameRestarted>()
            .add_systems(
                Update,
                (
                    observe_loading,
                    handle_session_actions,
                    apply_restart_requests,
                    tick_session,
                    sync_physics_pause,
                    play_session_cues,
                )
                    .chain()
                    .in_set(SessionSystems),
            );
    }
}

/// Systems that drive session transitions. World resets run after these.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionSystems;

/// The running game session.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct Session(pub GameSession);

/// Asks for a restart from outside [`SessionSystems`], such as the HUD.
///
/// Applied in `Update` so the world resets in the same frame the session
/// starts running again, before any fixed tick sees the old world.
#[derive(Message, Debug, Clone, Copy)]
pub struct RestartRequested;

/// Sent when the game restarts; burglars, the car and the camera reset on it.
#[derive(Message, Debug, Clone, Copy)]
pub struct GameRestarted;

/// Marker for the looping siren.
#[derive(Component)]
struct SirenSound;

/// Run condition: the game is running.
pub fn is_running(session: Res<Session>) -> bool {
    session.is_simulating()
}

/// Restart the session and tell the world to reset.
///
/// Ignored while assets are still loading.
fn restart(session: &mut Session, restarted: &mut MessageWriter<GameRestarted>) {
    if session.state() == GameState::Loading {
        return;
    }
    session.restart();
    restarted.write(GameRestarted);
}

/// Leave the loading screen once every asset has settled.
fn observe_loading(tracker: Res<LoadTracker>, mut session: ResMut<Session>) {
    if session.state() == GameState::Loading {
        session.observe_loading(tracker.progress());
    }
}

/// Start, pause or restart from the session actions.
fn handle_session_actions(
    action_query: Query<&ActionState<SessionAction>>,
    mut session: ResMut<Session>,
    mut restarted: MessageWriter<GameRestarted>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    if action_state.just_pressed(&SessionAction::Start) {
        session.start();
    }
    if action_state.just_pressed(&SessionAction::Pause) {
        session.pause();
    }
    if action_state.just_pressed(&SessionAction::Restart) {
        restart(&mut session, &mut restarted);
    }
}

/// Apply restarts requested since the last frame.
fn apply_restart_requests(
    mut requests: MessageReader<RestartRequested>,
    mut session: ResMut<Session>,
    mut restarted: MessageWriter<GameRestarted>,
) {
    if requests.read().count() > 0 {
        restart(&mut session, &mut restarted);
    }
}

fn tick_session(time: Res<Time>, mut session: ResMut<Session>) {
    session.tick(time.delta_secs());
}

/// Physics only advances while the game is running.
fn sync_physics_pause(session: Res<Session>, mut physics_time: ResMut<Time<Physics>>) {
    let simulating = session.is_simulating();
    if simulating && physics_time.is_paused() {
        physics_time.unpause();
    } else if !simulating && !physics_time.is_paused() {
        physics_time.pause();
    }
}

/// Play the sounds the session asked for.
fn play_session_cues(
    mut commands: Commands,
    mut session: ResMut<Session>,
    assets: Option<Res<GameAssets>>,
    siren_query: Query<Entity, With<SirenSound>>,
) {
    let cues = session.drain_cues();
    let Some(assets) = assets else {
        return;
    };

    for cue in cues {
        match cue {
            SessionCue::StartSiren => {
                commands.spawn((
                    SirenSound,
                    AudioPlayer::new(assets.sounds.siren.clone()),
                    PlaybackSettings::LOOP,
                ));
            }
            SessionCue::StopSiren => {
                for entity in &siren_query {
                    commands.entity(entity).despawn();
                }
            }
            SessionCue::Point => {
                commands.spawn((
                    AudioPlayer::new(assets.sounds.point.clone()),
                    PlaybackSettings::DESPAWN,
                ));
            }
            SessionCue::Finish => {
                commands.spawn((
                    AudioPlayer::new(assets.sounds.finish.clone()),
                    PlaybackSettings::DESPAWN,
                ));
            }
        }
    }
}

/// A session that has finished loading and is running.
#[cfg(test)]
pub(crate) fn running_session() -> Session {
    use burglar_chase_core::loading::LoadProgress;

    let mut progress = LoadProgress::default();
    progress.register(1);
    progress.complete();

    let mut session = GameSession::new();
    session.observe_loading(&progress);
    session.start();
    session.drain_cues();
    Session(session)
}

/// App with the session systems and the resources they read, no window.
#[cfg(test)]
pub(crate) fn session_test_app() -> App {
    let mut app = App::new();
    app.init_resource::<Time>()
        .init_resource::<Time<Physics>>()
        .init_resource::<LoadTracker>()
        .add_plugins(SessionPlugin);
    app
}
