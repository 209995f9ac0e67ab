//! Burglar Chase: drive a police car through a grid city and catch every
//! burglar roaming its streets.
//!
//! The city layout, burglar movement, wheel model and session rules live in
//! `burglar-chase-core`; this binary wires them into Bevy and Avian.

mod assets;
mod burglars;
mod camera;
mod city;
mod hud;
mod input;
mod launch_params;
mod physics;
mod session;
mod vehicle;

use assets::AssetsPlugin;
use bevy::prelude::*;
use burglar_chase_core::catch_items::{CatchConfig, CatchItems, ItemSpin};
use burglar_chase_core::grid::{CityGrid, DEFAULT_PAGE_SIZE};
use burglars::{Burglars, BurglarsPlugin, CatchRng};
use camera::ChaseCameraPlugin;
use city::{City, CityPlugin};
use hud::HudPlugin;
use input::InputPlugin;
use launch_params::LaunchParams;
use physics::PhysicsIntegrationPlugin;
use rand::SeedableRng;
use rand::rngs::StdRng;
use session::SessionPlugin;
use vehicle::VehiclePlugin;

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            AssetsPlugin,
            InputPlugin,
            SessionPlugin,
            PhysicsIntegrationPlugin,
            CityPlugin,
            VehiclePlugin,
            BurglarsPlugin,
            ChaseCameraPlugin,
            HudPlugin,
        ));
    }
}

/// Load the city grid: the `--map` file if given, else the built-in city.
fn load_city(params: &LaunchParams) -> Result<City, String> {
    let Some(path) = &params.map else {
        let grid = CityGrid::default_city().map_err(|e| e.to_string())?;
        return Ok(City {
            grid,
            is_default: true,
        });
    };

    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read map {}: {e}", path.display()))?;
    let grid = CityGrid::from_text(&text, DEFAULT_PAGE_SIZE)
        .map_err(|e| format!("invalid map {}: {e}", path.display()))?;
    tracing::info!("Loaded map {}", path.display());
    Ok(City {
        grid,
        is_default: false,
    })
}

/// Place the burglars at the city edges.
fn spawn_burglars(params: &LaunchParams, city: &City) -> Result<(Burglars, CatchRng), String> {
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let config = CatchConfig {
        per_side: params.burglars_per_side,
        ..Default::default()
    };
    let items = CatchItems::spawn_at_edges(&city.grid, &config, &mut rng)
        .map_err(|e| format!("failed to place burglars: {e}"))?;

    Ok((
        Burglars {
            items,
            config,
            spin: ItemSpin::default(),
        },
        CatchRng(rng),
    ))
}

fn main() -> AppExit {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();

    // Configuration errors are fatal before a window ever opens.
    let world = load_city(&params).and_then(|city| {
        let (burglars, rng) = spawn_burglars(&params, &city)?;
        Ok((city, burglars, rng))
    });
    let (city, burglars, rng) = match world {
        Ok(world) => world,
        Err(err) => {
            tracing::error!("{err}");
            return AppExit::error();
        }
    };

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "Burglar Chase".to_string(),
        resolution: (1280, 720).into(),
        position: WindowPosition::Centered(MonitorSelection::Primary),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    app.insert_resource(params)
        .insert_resource(city)
        .insert_resource(burglars)
        .insert_resource(rng)
        .add_plugins(AppPlugin)
        .run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_city_places_seeded_burglars() {
        let params = LaunchParams {
            seed: Some(7),
            burglars_per_side: 3,
            ..Default::default()
        };
        let city = load_city(&params).expect("built-in city is valid");
        assert!(city.is_default);

        let (burglars, _) = spawn_burglars(&params, &city).expect("burglars fit the city");
        assert_eq!(burglars.items.len(), 6);

        // Same seed, same placement.
        let (again, _) = spawn_burglars(&params, &city).expect("burglars fit the city");
        let origins: Vec<_> = burglars.items.items().iter().map(|i| i.origin()).collect();
        let again: Vec<_> = again.items.items().iter().map(|i| i.origin()).collect();
        assert_eq!(origins, again);
    }

    #[test]
    fn test_missing_map_is_an_error() {
        let params = LaunchParams {
            map: Some("does/not/exist.txt".into()),
            ..Default::default()
        };
        let Err(err) = load_city(&params) else {
            panic!("missing map should fail");
        };
        assert!(err.contains("does/not/exist.txt"));
    }
}
