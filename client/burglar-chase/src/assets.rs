//! Asset handles, custom loaders and load progress.
//!
//! Every model, texture and sound is requested at startup and registered with
//! a [`LoadTracker`]. The tracker is polled once per frame; the session leaves
//! the loading screen once every handle has settled.

use bevy::asset::io::Reader;
use bevy::asset::{AssetLoader, LoadContext, LoadState, UntypedAssetId};
use bevy::image::{ImageAddressMode, ImageLoaderSettings, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::reflect::TypePath;
use burglar_chase_core::city::{PropInstance, PropModel, StreetPiece, parse_props};
use burglar_chase_core::loading::LoadProgress;

/// Plugin for asset loading and progress tracking.
pub struct AssetsPlugin;

impl Plugin for AssetsPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<PropTable>()
            .register_asset_loader(PropTableLoader)
            .init_resource::<LoadTracker>()
            .add_systems(PreStartup, load_game_assets)
            .add_systems(Update, track_load_progress);
    }
}

// ============================================================================
// Prop table asset
// ============================================================================

/// Static city props parsed from a `.props` file.
#[derive(Asset, TypePath, Debug, Default)]
pub struct PropTable {
    pub props: Vec<PropInstance>,
}

/// Loader for `.props` files.
#[derive(Default, TypePath)]
struct PropTableLoader;

impl AssetLoader for PropTableLoader {
    type Asset = PropTable;
    type Settings = ();
    type Error = std::io::Error;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let text = String::from_utf8(bytes).map_err(std::io::Error::other)?;
        let props = parse_props(&text).map_err(std::io::Error::other)?;
        Ok(PropTable { props })
    }

    fn extensions(&self) -> &[&str] {
        &["props"]
    }
}

// ============================================================================
// Handles
// ============================================================================

/// Ground textures, one per surface kind.
pub struct GroundTextures {
    pub block: Handle<Image>,
    pub grass: Handle<Image>,
    pub margin: Handle<Image>,
    pub plain_street: Handle<Image>,
    pub straight: Handle<Image>,
    pub t_junction: Handle<Image>,
    pub cross: Handle<Image>,
    pub curve: Handle<Image>,
}

impl GroundTextures {
    /// Texture for a street piece.
    pub fn street(&self, piece: StreetPiece) -> Handle<Image> {
        match piece {
            StreetPiece::Cross => self.cross.clone(),
            StreetPiece::Straight => self.straight.clone(),
            StreetPiece::TJunction => self.t_junction.clone(),
            StreetPiece::Curve => self.curve.clone(),
            StreetPiece::Plain => self.plain_street.clone(),
        }
    }
}

/// Sound effects.
pub struct Sounds {
    pub siren: Handle<AudioSource>,
    pub point: Handle<AudioSource>,
    pub finish: Handle<AudioSource>,
}

/// Every asset the game needs, requested at startup.
#[derive(Resource)]
pub struct GameAssets {
    pub ground: GroundTextures,
    pub burglar: Handle<Image>,
    pub police: Handle<Scene>,
    pub wheel: Handle<Scene>,
    pub props: Handle<PropTable>,
    /// Prop models in [`PropModel::all`] order.
    pub prop_models: Vec<(PropModel, Handle<Scene>)>,
    pub sounds: Sounds,
}

impl GameAssets {
    /// Scene for a prop model.
    pub fn prop_model(&self, model: PropModel) -> Option<Handle<Scene>> {
        self.prop_models
            .iter()
            .find(|(candidate, _)| *candidate == model)
            .map(|(_, handle)| handle.clone())
    }
}

/// Ground surfaces with their own texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GroundSurface {
    Block,
    Grass,
    Margin,
    Street(StreetPiece),
}

impl GroundSurface {
    fn texture_path(self) -> &'static str {
        match self {
            Self::Block => "textures/cement.jpg",
            Self::Grass => "textures/grass.jpg",
            Self::Margin => "textures/grass0.jpg",
            Self::Street(StreetPiece::Plain) => "textures/asphalt.jpg",
            Self::Street(StreetPiece::Straight) => "textures/asphalt0.jpg",
            Self::Street(StreetPiece::TJunction) => "textures/asphaltT.jpg",
            Self::Street(StreetPiece::Cross) => "textures/asphaltX.jpg",
            Self::Street(StreetPiece::Curve) => "textures/asphaltC.jpg",
        }
    }

    /// Street pieces keep the default clamp so their markings stop at the
    /// tile edge. Everything else repeats so it can be tiled via UVs.
    fn sampler(self) -> ImageSampler {
        match self {
            Self::Street(_) => ImageSampler::Default,
            Self::Block | Self::Grass | Self::Margin => {
                ImageSampler::Descriptor(ImageSamplerDescriptor {
                    address_mode_u: ImageAddressMode::Repeat,
                    address_mode_v: ImageAddressMode::Repeat,
                    ..default()
                })
            }
        }
    }
}

fn load_ground(asset_server: &AssetServer, surface: GroundSurface) -> Handle<Image> {
    asset_server.load_with_settings(
        surface.texture_path(),
        move |settings: &mut ImageLoaderSettings| {
            settings.sampler = surface.sampler();
        },
    )
}

/// Request every asset and register it with the tracker.
fn load_game_assets(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut tracker: ResMut<LoadTracker>,
) {
    let ground = GroundTextures {
        block: load_ground(&asset_server, GroundSurface::Block),
        grass: load_ground(&asset_server, GroundSurface::Grass),
        margin: load_ground(&asset_server, GroundSurface::Margin),
        plain_street: load_ground(&asset_server, GroundSurface::Street(StreetPiece::Plain)),
        straight: load_ground(&asset_server, GroundSurface::Street(StreetPiece::Straight)),
        t_junction: load_ground(&asset_server, GroundSurface::Street(StreetPiece::TJunction)),
        cross: load_ground(&asset_server, GroundSurface::Street(StreetPiece::Cross)),
        curve: load_ground(&asset_server, GroundSurface::Street(StreetPiece::Curve)),
    };
    for handle in [
        &ground.block,
        &ground.grass,
        &ground.margin,
        &ground.plain_street,
        &ground.straight,
        &ground.t_junction,
        &ground.cross,
        &ground.curve,
    ] {
        tracker.track(handle);
    }

    let burglar: Handle<Image> = asset_server.load("textures/burglar.png");
    tracker.track(&burglar);

    let police: Handle<Scene> =
        asset_server.load(GltfAssetLabel::Scene(0).from_asset("models/police.glb"));
    let wheel: Handle<Scene> =
        asset_server.load(GltfAssetLabel::Scene(0).from_asset("models/wheel.glb"));
    tracker.track(&police);
    tracker.track(&wheel);

    let props: Handle<PropTable> = asset_server.load("city/default.props");
    tracker.track(&props);

    let prop_models: Vec<(PropModel, Handle<Scene>)> = PropModel::all()
        .map(|model| (model, asset_server.load(model.asset_path())))
        .collect();
    for (_, handle) in &prop_models {
        tracker.track(handle);
    }

    let sounds = Sounds {
        siren: asset_server.load("audio/siren.ogg"),
        point: asset_server.load("audio/point.ogg"),
        finish: asset_server.load("audio/finish.ogg"),
    };
    tracker.track(&sounds.siren);
    tracker.track(&sounds.point);
    tracker.track(&sounds.finish);

    tracing::info!("Requested {} assets", tracker.progress.total());

    commands.insert_resource(GameAssets {
        ground,
        burglar,
        police,
        wheel,
        props,
        prop_models,
        sounds,
    });
}

// ============================================================================
// Load progress
// ============================================================================

/// Pending asset loads and overall progress.
#[derive(Resource, Default)]
pub struct LoadTracker {
    pending: Vec<UntypedAssetId>,
    progress: LoadProgress,
}

impl LoadTracker {
    /// Register a handle whose load should gate the start of the game.
    pub fn track<A: Asset>(&mut self, handle: &Handle<A>) {
        self.pending.push(handle.id().untyped());
        self.progress.register(1);
    }

    pub fn progress(&self) -> &LoadProgress {
        &self.progress
    }
}

/// Settle finished and failed loads.
///
/// A failed load is logged and counted as settled so a missing file never
/// blocks the game.
fn track_load_progress(asset_server: Res<AssetServer>, mut tracker: ResMut<LoadTracker>) {
    if tracker.pending.is_empty() {
        return;
    }

    let tracker = &mut *tracker;
    tracker.pending.retain(|&id| match asset_server.get_load_state(id) {
        Some(LoadState::Loaded) => {
            tracker.progress.complete();
            false
        }
        Some(LoadState::Failed(err)) => {
            tracing::warn!("Asset failed to load: {err}");
            tracker.progress.fail();
            false
        }
        _ => true,
    });

    if tracker.pending.is_empty() {
        tracing::info!("All assets settled ({} failed)", tracker.progress.failed());
    }
}
