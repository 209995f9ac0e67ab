//! Heads-up display.
//!
//! Loading bar, title screen, caught counter with timer, and the game-over
//! panel with a restart button.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use burglar_chase_core::session::GameState;

use crate::assets::LoadTracker;
use crate::session::{RestartRequested, Session};

/// Plugin for the HUD overlay.
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .add_systems(EguiPrimaryContextPass, hud_system);
    }
}

/// Resources the HUD reads and writes.
#[derive(SystemParam)]
struct HudParams<'w> {
    session: Res<'w, Session>,
    tracker: Res<'w, LoadTracker>,
    restart: MessageWriter<'w, RestartRequested>,
}

const TITLE: &str = "Burglar Chase";

/// Render whichever panel belongs to the current state.
fn hud_system(mut contexts: EguiContexts, mut params: HudParams) -> Result {
    let ctx = contexts.ctx_mut()?;

    match params.session.state() {
        GameState::Loading => render_loading(ctx, &params),
        GameState::Paused => render_title(ctx),
        GameState::Running => render_counter(ctx, &params),
        GameState::GameOver => {
            render_counter(ctx, &params);
            if render_game_over(ctx, &params) {
                params.restart.write(RestartRequested);
            }
        }
    }

    Ok(())
}

/// Centered window without decorations.
fn centered(title: &'static str) -> egui::Window<'static> {
    egui::Window::new(title)
        .title_bar(false)
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
}

#[allow(clippy::cast_precision_loss)]
fn render_loading(ctx: &egui::Context, params: &HudParams) {
    let progress = params.tracker.progress();
    centered("Loading").show(ctx, |ui| {
        ui.heading(TITLE);
        ui.add(
            egui::ProgressBar::new(progress.percent() as f32 / 100.0)
                .text(format!("Loading {}%", progress.percent()))
                .desired_width(240.0),
        );
    });
}

fn render_title(ctx: &egui::Context) {
    // Clicks pass through to the start action.
    centered("Title").interactable(false).show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading(TITLE);
            ui.label("Click to play");
            ui.separator();
            ui.label("Arrows: drive");
            ui.label("Space: jump");
            ui.label("ESC: pause");
            ui.label("R: restart");
        });
    });
}

fn render_counter(ctx: &egui::Context, params: &HudParams) {
    let progress = params.session.progress();
    egui::Area::new(egui::Id::new("counter"))
        .anchor(egui::Align2::LEFT_TOP, [16.0, 16.0])
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!(
                    "Burglars caught: {}/{}",
                    progress.resolved, progress.total
                ))
                .size(20.0)
                .strong(),
            );
            ui.label(
                egui::RichText::new(params.session.timer().format())
                    .size(20.0)
                    .monospace(),
            );
        });
}

/// Returns true when the restart button was clicked.
fn render_game_over(ctx: &egui::Context, params: &HudParams) -> bool {
    let mut restart = false;
    centered("Game over").show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("All burglars caught!");
            ui.label(format!("Time: {}", params.session.timer().format()));
            restart = ui.button("Restart").clicked();
        });
    });
    restart
}
