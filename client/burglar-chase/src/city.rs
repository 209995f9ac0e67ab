//! City scene: ground slabs, margins, walls and props.
//!
//! The layout comes from [`CityLayout::build`]; this module turns it into
//! textured meshes with static colliders.

use avian3d::prelude::*;
use bevy::math::Affine2;
use bevy::prelude::*;
use burglar_chase_core::city::{CityLayout, Slab, StreetPiece, Surface};
use burglar_chase_core::grid::CityGrid;

use crate::assets::{GameAssets, PropTable};

/// Plugin for the static city.
pub struct CityPlugin;

impl Plugin for CityPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_city).add_systems(
            Update,
            spawn_props.run_if(not(resource_exists::<PropsSpawned>)),
        );
    }
}

/// The city grid the game runs on.
#[derive(Resource)]
pub struct City {
    pub grid: CityGrid,
    /// Whether the built-in city is in use. Props are only placed there.
    pub is_default: bool,
}

/// Inserted once the prop table has been turned into entities.
#[derive(Resource)]
struct PropsSpawned;

/// Colour of the plane under the city.
const UNDERGROUND_COLOR: Color = Color::srgb(0.25, 0.22, 0.18);

/// Textured material whose texture repeats `repeat` times across the surface.
fn tiled_material(texture: Handle<Image>, repeat: Vec2) -> StandardMaterial {
    StandardMaterial {
        base_color_texture: Some(texture),
        perceptual_roughness: 0.95,
        uv_transform: Affine2::from_scale(repeat),
        ..default()
    }
}

/// Spawn a static box for `slab`, optionally with a visible mesh.
fn spawn_slab(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    slab: &Slab,
    yaw: f32,
    material: Option<Handle<StandardMaterial>>,
    name: &'static str,
) {
    let size = slab.half_extents * 2.0;
    let mut entity = commands.spawn((
        Name::new(name),
        RigidBody::Static,
        Collider::cuboid(size.x, size.y, size.z),
        Transform::from_translation(slab.center).with_rotation(Quat::from_rotation_y(yaw)),
    ));
    if let Some(material) = material {
        entity.insert((
            Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
            MeshMaterial3d(material),
        ));
    }
}

/// Spawn ground tiles, margins, walls and the underground plane.
fn spawn_city(
    mut commands: Commands,
    city: Res<City>,
    assets: Res<GameAssets>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let layout = CityLayout::build(&city.grid);
    let page = city.grid.page_size();
    let textures = &assets.ground;

    let block = materials.add(tiled_material(textures.block.clone(), Vec2::ONE));
    let grass = materials.add(tiled_material(textures.grass.clone(), Vec2::ONE));
    let mut street_materials: Vec<(StreetPiece, Handle<StandardMaterial>)> = Vec::new();

    for ground in &layout.ground {
        let material = match ground.surface {
            Surface::Block => block.clone(),
            Surface::Grass => grass.clone(),
            Surface::Street(piece) => {
                if let Some((_, handle)) = street_materials.iter().find(|(p, _)| *p == piece) {
                    handle.clone()
                } else {
                    let handle =
                        materials.add(tiled_material(textures.street(piece), Vec2::ONE));
                    street_materials.push((piece, handle.clone()));
                    handle
                }
            }
        };
        spawn_slab(
            &mut commands,
            &mut meshes,
            &ground.slab,
            ground.yaw,
            Some(material),
            "Ground",
        );
    }

    for margin in &layout.margins {
        let repeat = Vec2::new(
            margin.half_extents.x * 2.0 / page,
            margin.half_extents.z * 2.0 / page,
        );
        let material = materials.add(tiled_material(textures.margin.clone(), repeat));
        spawn_slab(&mut commands, &mut meshes, margin, 0.0, Some(material), "Margin");
    }

    // Walls only stop the car; they are not drawn.
    for wall in &layout.walls {
        spawn_slab(&mut commands, &mut meshes, wall, 0.0, None, "Wall");
    }

    let underground = layout.underground;
    commands.spawn((
        Name::new("Underground"),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(
            underground.half_extents.x * 2.0,
            underground.half_extents.z * 2.0,
        ))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: UNDERGROUND_COLOR,
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::from_translation(underground.center),
    ));

    tracing::info!(
        "City built: {}x{} tiles, {} ground slabs",
        city.grid.columns(),
        city.grid.rows(),
        layout.ground.len()
    );
}

/// Place buildings and trees once the prop table has loaded.
///
/// A prop table that fails to load leaves the city bare.
fn spawn_props(
    mut commands: Commands,
    city: Res<City>,
    assets: Res<GameAssets>,
    tables: Res<Assets<PropTable>>,
    asset_server: Res<AssetServer>,
) {
    if !city.is_default {
        commands.insert_resource(PropsSpawned);
        return;
    }

    let Some(table) = tables.get(&assets.props) else {
        if asset_server.load_state(&assets.props).is_failed() {
            tracing::warn!("Prop table unavailable; city has no props");
            commands.insert_resource(PropsSpawned);
        }
        return;
    };

    for prop in &table.props {
        let half_extents = prop.collider_half_extents();
        let size = half_extents * 2.0;
        let mut entity = commands.spawn((
            Name::new("Prop"),
            RigidBody::Static,
            Transform::from_translation(prop.position)
                .with_rotation(Quat::from_rotation_y(prop.yaw)),
        ));
        // The collider stands on the ground rather than straddling it.
        entity.with_child((
            Collider::cuboid(size.x, size.y, size.z),
            Transform::from_xyz(0.0, half_extents.y, 0.0),
        ));
        if let Some(scene) = assets.prop_model(prop.model) {
            entity.with_child((
                SceneRoot(scene),
                Transform::from_scale(Vec3::splat(prop.scale)),
            ));
        }
    }

    tracing::info!("Placed {} props", table.props.len());
    commands.insert_resource(PropsSpawned);
}
