//! Engine-free game logic for Burglar Chase.
//!
//! The city grid, the wandering burglars, the car's steering and raycast wheel
//! model, the chase camera and the session state machine all live here as
//! plain data and functions over `glam` types. The Bevy client wires them into
//! its schedules.
//!
//! ```text
//! grid ──► city (ground, margins, walls, props)
//!   │
//!   └────► catch_items (burglars walking the streets)
//!
//! steering ──► raycast_vehicle (suspension and tire impulses)
//!
//! loading ──► session ◄── catch_items progress
//! ```

pub mod catch_items;
pub mod chase_camera;
pub mod city;
mod error;
pub mod grid;
pub mod loading;
pub mod raycast_vehicle;
pub mod session;
pub mod steering;

pub use error::{ConfigError, Result};
