//! Burglars wandering the streets.
//!
//! The walking logic lives in [`CatchItems`]; this module owns the sprites,
//! advances the set on the fixed tick while the game runs and reports
//! progress to the session.

use avian3d::prelude::*;
use bevy::prelude::*;
use burglar_chase_core::catch_items::{CatchConfig, CatchItems, ItemSpin};
use rand::rngs::StdRng;

use crate::assets::GameAssets;
use crate::city::City;
use crate::session::{GameRestarted, Session, SessionSystems, is_running};
use crate::vehicle::Car;

/// Edge length of a burglar sprite.
const SPRITE_SIZE: f32 = 2.6;

/// Plugin for the burglars.
pub struct BurglarsPlugin;

impl Plugin for BurglarsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_burglar_sprites)
            .add_systems(FixedUpdate, advance_burglars.run_if(is_running))
            .add_systems(
                Update,
                (
                    reset_burglars_on_restart.after(SessionSystems),
                    sync_burglar_sprites,
                )
                    .chain(),
            );
    }
}

/// Every burglar plus the shared tuning.
#[derive(Resource)]
pub struct Burglars {
    pub items: CatchItems,
    pub config: CatchConfig,
    pub spin: ItemSpin,
}

/// Random source for heading choices.
#[derive(Resource)]
pub struct CatchRng(pub StdRng);

/// Sprite of the burglar at `index` in [`CatchItems::items`].
#[derive(Component)]
struct BurglarSprite {
    index: usize,
}

/// Spawn one double-sided sprite per burglar.
fn spawn_burglar_sprites(
    mut commands: Commands,
    burglars: Res<Burglars>,
    assets: Res<GameAssets>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = meshes.add(Rectangle::new(SPRITE_SIZE, SPRITE_SIZE));
    let material = materials.add(StandardMaterial {
        base_color_texture: Some(assets.burglar.clone()),
        alpha_mode: AlphaMode::Mask(0.5),
        double_sided: true,
        cull_mode: None,
        ..default()
    });

    for (index, item) in burglars.items.items().iter().enumerate() {
        commands.spawn((
            Name::new(format!("Burglar {index}")),
            BurglarSprite { index },
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(item.position()),
        ));
    }

    tracing::info!("{} burglars on the loose", burglars.items.len());
}

/// Walk every burglar one tick and catch those near the car.
///
/// A configuration error here is fatal: it is logged and the app exits.
fn advance_burglars(
    city: Res<City>,
    mut burglars: ResMut<Burglars>,
    mut rng: ResMut<CatchRng>,
    mut session: ResMut<Session>,
    car_query: Query<&Position, With<Car>>,
    mut exit: MessageWriter<AppExit>,
) {
    let Ok(car) = car_query.single() else {
        return;
    };
    let car = car.0;

    let burglars = &mut *burglars;
    let config = &burglars.config;
    let result = burglars.items.advance_all(
        &city.grid,
        config,
        |position| config.is_within_capture(position, car),
        &mut rng.0,
    );

    match result {
        Ok(progress) => session.observe_progress(progress),
        Err(err) => {
            tracing::error!("Burglar movement failed: {err}");
            exit.write(AppExit::error());
        }
    }
}

/// Send every burglar back to its entry point.
fn reset_burglars_on_restart(
    mut restarted: MessageReader<GameRestarted>,
    city: Res<City>,
    mut burglars: ResMut<Burglars>,
) {
    if restarted.read().count() == 0 {
        return;
    }
    let burglars = &mut *burglars;
    burglars.items.reset(&city.grid, &burglars.config);
}

/// Place, spin and hide the sprites.
fn sync_burglar_sprites(
    time: Res<Time>,
    mut burglars: ResMut<Burglars>,
    mut query: Query<(&BurglarSprite, &mut Transform, &mut Visibility)>,
) {
    let burglars = &mut *burglars;
    let angle = burglars.spin.tick(&burglars.config, time.delta_secs());
    let items = burglars.items.items();

    for (sprite, mut transform, mut visibility) in &mut query {
        let Some(item) = items.get(sprite.index) else {
            continue;
        };
        transform.translation = item.position();
        transform.rotation = Quat::from_rotation_y(angle);
        *visibility = if item.is_visible() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

#[cfg(test)]
mod tests {
    use burglar_chase_core::catch_items::WanderingItem;
    use burglar_chase_core::grid::CityGrid;
    use burglar_chase_core::session::GameState;
    use rand::SeedableRng;

    use super::*;
    use crate::session::{RestartRequested, running_session, session_test_app};

    /// Session, burglars and a car parked far outside the city.
    fn chase_app() -> App {
        let grid = CityGrid::default_city().unwrap();
        let config = CatchConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let items = CatchItems::spawn_at_edges(&grid, &config, &mut rng).unwrap();

        let mut app = session_test_app();
        app.insert_resource(running_session())
            .insert_resource(City {
                grid,
                is_default: true,
            })
            .insert_resource(Burglars {
                items,
                config,
                spin: ItemSpin::default(),
            })
            .insert_resource(CatchRng(rng))
            .add_systems(FixedUpdate, advance_burglars.run_if(is_running))
            .add_systems(Update, reset_burglars_on_restart.after(SessionSystems));
        app.world_mut()
            .spawn((Car::default(), Position(Vec3::new(1.0e4, 0.0, 1.0e4))));
        app
    }

    fn state(app: &App) -> GameState {
        app.world().resource::<Session>().state()
    }

    fn visible_count(app: &App) -> usize {
        let burglars = app.world().resource::<Burglars>();
        burglars.items.items().iter().filter(|item| item.is_visible()).count()
    }

    /// Catch every burglar at once and let the session see it.
    fn catch_everyone(app: &mut App) {
        let world = app.world_mut();
        let grid = world.resource::<City>().grid.clone();
        let progress = world.resource_scope(|world, mut burglars: Mut<Burglars>| {
            let burglars = &mut *burglars;
            let mut rng = world.resource_mut::<CatchRng>();
            burglars
                .items
                .advance_all(&grid, &burglars.config, |_| true, &mut rng.0)
                .unwrap()
        });
        world.resource_mut::<Session>().observe_progress(progress);
    }

    #[test]
    fn test_fixed_tick_moves_burglars_only_while_running() {
        let mut app = chase_app();
        let before: Vec<_> = app
            .world()
            .resource::<Burglars>()
            .items
            .items()
            .iter()
            .map(WanderingItem::position)
            .collect();

        app.world_mut().resource_mut::<Session>().pause();
        app.world_mut().run_schedule(FixedUpdate);
        let paused: Vec<_> = app
            .world()
            .resource::<Burglars>()
            .items
            .items()
            .iter()
            .map(WanderingItem::position)
            .collect();
        assert_eq!(before, paused);

        app.world_mut().resource_mut::<Session>().start();
        app.world_mut().run_schedule(FixedUpdate);
        let running: Vec<_> = app
            .world()
            .resource::<Burglars>()
            .items
            .items()
            .iter()
            .map(WanderingItem::position)
            .collect();
        assert_ne!(before, running);
    }

    #[test]
    fn test_restart_from_game_over_panel_keeps_running() {
        let mut app = chase_app();
        catch_everyone(&mut app);
        assert_eq!(state(&app), GameState::GameOver);
        assert_eq!(visible_count(&app), 0);

        // The panel writes its request during PostUpdate. The next frame runs
        // its fixed ticks before Update applies the request.
        app.world_mut().write_message(RestartRequested);
        app.world_mut().run_schedule(FixedUpdate);
        assert_eq!(state(&app), GameState::GameOver);

        app.world_mut().run_schedule(Update);
        assert_eq!(state(&app), GameState::Running);
        let total = app.world().resource::<Burglars>().items.len();
        assert_eq!(visible_count(&app), total);

        app.world_mut().run_schedule(FixedUpdate);
        assert_eq!(state(&app), GameState::Running);
        assert_eq!(app.world().resource::<Session>().progress().resolved, 0);
    }
}
