//! Launch parameter parsing for the game.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use std::path::PathBuf;

use bevy::prelude::*;

/// Default number of burglars entering from each side of the city.
const DEFAULT_BURGLARS_PER_SIDE: usize = 5;

/// Launch parameters for the game.
#[derive(Resource, Debug)]
pub struct LaunchParams {
    /// Seed for burglar placement and speeds; random when `None`.
    pub seed: Option<u64>,
    /// Burglars spawned on each of the left and right edges.
    pub burglars_per_side: usize,
    /// Text grid replacing the built-in city.
    pub map: Option<PathBuf>,
    /// Show collider gizmos from the start.
    pub physics_debug: bool,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            seed: None,
            burglars_per_side: DEFAULT_BURGLARS_PER_SIDE,
            map: None,
            physics_debug: false,
        }
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    #[command(about = "Drive a police car through the city and catch every burglar")]
    struct CliArgs {
        /// Seed for burglar placement and speeds.
        #[arg(long)]
        seed: Option<u64>,

        /// Burglars entering from each side of the city.
        #[arg(long, default_value_t = DEFAULT_BURGLARS_PER_SIDE)]
        burglars_per_side: usize,

        /// Text grid file (0 = block, 1 = street, 2 = grass) replacing the built-in city.
        #[arg(long)]
        map: Option<PathBuf>,

        /// Draw physics colliders.
        #[arg(long)]
        physics_debug: bool,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        LaunchParams {
            seed: args.seed,
            burglars_per_side: args.burglars_per_side,
            map: args.map,
            physics_debug: args.physics_debug,
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}
