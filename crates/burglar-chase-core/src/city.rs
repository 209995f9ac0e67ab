//! Translating the grid into ground slabs, margins, walls and props.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;

use crate::error::{ConfigError, Result};
use crate::grid::{Cell, CityGrid, StreetNeighbours, Tile};

/// Thickness of every ground slab.
pub const BLOCK_HEIGHT: f32 = 2.0;
/// How far streets sit below blocks and grass.
pub const STREET_SHIFT: f32 = -0.3;
/// Width of the grass margin around the city, in pages.
pub const MARGIN_PAGES: f32 = 2.0;
pub const WALL_HEIGHT: f32 = 14.0;
pub const WALL_THICKNESS: f32 = 2.0;
/// Height of the visual-only plane under the city.
pub const UNDERGROUND_HEIGHT: f32 = -0.5;

/// Street texture chosen from the neighbour pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreetPiece {
    /// Four-way crossing.
    Cross,
    /// Straight road.
    Straight,
    /// Three-way junction.
    TJunction,
    /// Ninety degree bend.
    Curve,
    /// Anything else: plain asphalt.
    Plain,
}

/// Street piece and yaw for a street tile with the given neighbours.
pub fn street_piece(n: StreetNeighbours) -> (StreetPiece, f32) {
    match (n.up, n.down, n.left, n.right) {
        (true, true, true, true) => (StreetPiece::Cross, 0.0),
        (false, false, true, true) => (StreetPiece::Straight, FRAC_PI_2),
        (true, true, false, false) => (StreetPiece::Straight, 0.0),
        (false, true, true, true) => (StreetPiece::TJunction, 0.0),
        (true, false, true, true) => (StreetPiece::TJunction, PI),
        (true, true, true, false) => (StreetPiece::TJunction, -FRAC_PI_2),
        (true, true, false, true) => (StreetPiece::TJunction, FRAC_PI_2),
        (false, true, false, true) => (StreetPiece::Curve, 0.0),
        (false, true, true, false) => (StreetPiece::Curve, -FRAC_PI_2),
        (true, false, false, true) => (StreetPiece::Curve, FRAC_PI_2),
        (true, false, true, false) => (StreetPiece::Curve, PI),
        _ => (StreetPiece::Plain, 0.0),
    }
}

/// Surface of a ground slab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Surface {
    Block,
    Grass,
    Street(StreetPiece),
}

/// Axis-aligned static box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slab {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Slab {
    /// Height of the top face.
    pub fn top(&self) -> f32 {
        self.center.y + self.half_extents.y
    }
}

/// One tile of ground.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundTile {
    pub tile: Tile,
    pub surface: Surface,
    /// Texture yaw about the vertical axis.
    pub yaw: f32,
    pub slab: Slab,
}

/// Everything static the grid turns into.
#[derive(Clone, Debug)]
pub struct CityLayout {
    pub ground: Vec<GroundTile>,
    /// Grass strips around the city.
    pub margins: [Slab; 4],
    /// Perimeter walls outside the margins.
    pub walls: [Slab; 4],
    /// Visual plane under everything.
    pub underground: Slab,
}

impl CityLayout {
    /// Lay out ground, margins and walls for `grid`.
    pub fn build(grid: &CityGrid) -> Self {
        let page = grid.page_size();
        let half_page = page * 0.5;
        let half_block = BLOCK_HEIGHT * 0.5;

        let ground = grid
            .tiles()
            .map(|(tile, cell)| {
                let (surface, yaw, shift) = match cell {
                    Cell::Block => (Surface::Block, 0.0, 0.0),
                    Cell::Grass => (Surface::Grass, 0.0, 0.0),
                    Cell::Street => {
                        let (piece, yaw) = street_piece(grid.street_neighbours(tile));
                        (Surface::Street(piece), yaw, STREET_SHIFT)
                    }
                };
                let center = grid.tile_center(tile, -half_block + shift);
                GroundTile {
                    tile,
                    surface,
                    yaw,
                    slab: Slab {
                        center,
                        half_extents: Vec3::new(half_page, half_block, half_page),
                    },
                }
            })
            .collect();

        let width = grid.width();
        let depth = grid.depth();
        let margin = page * MARGIN_PAGES;

        // Four strips in a pinwheel so each corner is covered exactly once.
        let slab = |min_x: f32, max_x: f32, min_z: f32, max_z: f32, y: f32, half_y: f32| Slab {
            center: Vec3::new((min_x + max_x) * 0.5, y, (min_z + max_z) * 0.5),
            half_extents: Vec3::new((max_x - min_x) * 0.5, half_y, (max_z - min_z) * 0.5),
        };
        let margins = [
            slab(-margin, 0.0, 0.0, depth + margin, -half_block, half_block),
            slab(width, width + margin, -margin, depth, -half_block, half_block),
            slab(-margin, width, -margin, 0.0, -half_block, half_block),
            slab(0.0, width + margin, depth, depth + margin, -half_block, half_block),
        ];

        let half_wall = WALL_HEIGHT * 0.5;
        let half_thickness = WALL_THICKNESS * 0.5;
        let (x0, x1) = (-margin, width + margin);
        let (z0, z1) = (-margin, depth + margin);
        let walls = [
            slab(x0, x1, z0 - half_thickness, z0 + half_thickness, half_wall, half_wall),
            slab(x0, x1, z1 - half_thickness, z1 + half_thickness, half_wall, half_wall),
            slab(x0 - half_thickness, x0 + half_thickness, z0, z1, half_wall, half_wall),
            slab(x1 - half_thickness, x1 + half_thickness, z0, z1, half_wall, half_wall),
        ];

        let underground = slab(x0, x1, z0, z1, UNDERGROUND_HEIGHT, 0.0);

        Self {
            ground,
            margins,
            walls,
            underground,
        }
    }
}

/// Static prop models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropModel {
    /// Low-poly building 1 to 7.
    Building(u8),
    TreeLarge,
    TreeSmall,
    Plant,
}

impl PropModel {
    /// Parse a prop table key.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '1'..='7' => key.to_digit(10).and_then(|d| u8::try_from(d).ok()).map(Self::Building),
            '0' => Some(Self::TreeLarge),
            '9' => Some(Self::TreeSmall),
            '8' => Some(Self::Plant),
            _ => None,
        }
    }

    /// Collider half extents at scale 1.
    pub fn collider_half_extents(self) -> Vec3 {
        match self {
            Self::Building(1) => Vec3::new(6.0, 10.0, 6.0),
            Self::Building(2 | 7) => Vec3::new(4.6, 10.0, 4.6),
            Self::Building(3) => Vec3::new(4.7, 10.0, 4.7),
            Self::Building(5) => Vec3::new(4.5, 10.0, 4.5),
            Self::Building(_) => Vec3::new(5.0, 10.0, 5.0),
            Self::TreeLarge | Self::TreeSmall => Vec3::new(0.5, 10.0, 0.5),
            Self::Plant => Vec3::splat(0.1),
        }
    }

    /// Asset path of the model's glTF scene.
    pub fn asset_path(self) -> String {
        match self {
            Self::Building(n) => format!("models/building/buildingLP{n}.glb#Scene0"),
            Self::TreeLarge => "models/vegetation/treeLP1.glb#Scene0".to_owned(),
            Self::TreeSmall => "models/vegetation/treeLP2.glb#Scene0".to_owned(),
            Self::Plant => "models/vegetation/plant1.glb#Scene0".to_owned(),
        }
    }

    /// Every model, for preloading.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=7)
            .map(Self::Building)
            .chain([Self::TreeLarge, Self::TreeSmall, Self::Plant])
    }
}

/// A placed prop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropInstance {
    pub model: PropModel,
    pub position: Vec3,
    /// Rotation about the vertical axis (radians).
    pub yaw: f32,
    /// Uniform scale.
    pub scale: f32,
}

impl PropInstance {
    /// Collider half extents with the instance scale applied.
    pub fn collider_half_extents(&self) -> Vec3 {
        self.model.collider_half_extents() * self.scale
    }
}

/// Parse a prop table.
///
/// One prop per line: `key x z yaw scale`. Blank lines and lines starting
/// with `#` are ignored. Props stand on the ground (`y = 0`).
pub fn parse_props(text: &str) -> Result<Vec<PropInstance>> {
    let mut props = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let malformed = |reason: String| ConfigError::MalformedProp {
            line: index + 1,
            reason,
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [key, x, z, yaw, scale] = fields.as_slice() else {
            return Err(malformed(format!("expected 5 fields, found {}", fields.len())));
        };

        let mut chars = key.chars();
        let model = match (chars.next(), chars.next()) {
            (Some(c), None) => PropModel::from_key(c),
            _ => None,
        }
        .ok_or_else(|| malformed(format!("unknown model key '{key}'")))?;

        let number = |name: &str, value: &str| {
            value
                .parse::<f32>()
                .map_err(|e| malformed(format!("bad {name} '{value}': {e}")))
        };
        let scale = number("scale", scale)?;
        if scale <= 0.0 {
            return Err(malformed(format!("scale must be positive, got {scale}")));
        }

        props.push(PropInstance {
            model,
            position: Vec3::new(number("x", x)?, 0.0, number("z", z)?),
            yaw: number("yaw", yaw)?,
            scale,
        });
    }
    Ok(props)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(up: bool, down: bool, left: bool, right: bool) -> StreetNeighbours {
        StreetNeighbours {
            up,
            down,
            left,
            right,
        }
    }

    #[test]
    fn test_street_pieces() {
        assert_eq!(street_piece(n(true, true, true, true)), (StreetPiece::Cross, 0.0));
        assert_eq!(
            street_piece(n(false, false, true, true)),
            (StreetPiece::Straight, FRAC_PI_2)
        );
        assert_eq!(street_piece(n(true, true, false, false)), (StreetPiece::Straight, 0.0));
        assert_eq!(street_piece(n(true, false, true, true)), (StreetPiece::TJunction, PI));
        assert_eq!(
            street_piece(n(true, true, true, false)),
            (StreetPiece::TJunction, -FRAC_PI_2)
        );
        assert_eq!(street_piece(n(true, false, true, false)), (StreetPiece::Curve, PI));
        assert_eq!(street_piece(n(false, false, false, true)), (StreetPiece::Plain, 0.0));
    }

    #[test]
    fn test_layout_heights() {
        let grid = CityGrid::default_city().unwrap();
        let layout = CityLayout::build(&grid);
        assert_eq!(layout.ground.len(), 24 * 24);

        for tile in &layout.ground {
            let expected = match tile.surface {
                Surface::Street(_) => STREET_SHIFT,
                Surface::Block | Surface::Grass => 0.0,
            };
            assert!((tile.slab.top() - expected).abs() < 1e-5);
        }

        let corner = layout.ground[0];
        assert_eq!(corner.surface, Surface::Block);
        assert_eq!(corner.slab.center, Vec3::new(8.0, -1.0, 8.0));

        // (1, 1) is the top-left bend of the outer ring road.
        let bend = layout.ground[25];
        assert_eq!(bend.surface, Surface::Street(StreetPiece::Curve));
    }

    #[test]
    fn test_margins_and_walls_enclose_city() {
        let grid = CityGrid::default_city().unwrap();
        let layout = CityLayout::build(&grid);
        let margin = 32.0;

        let area: f32 = layout
            .margins
            .iter()
            .map(|m| 4.0 * m.half_extents.x * m.half_extents.z)
            .sum();
        let outer = (384.0 + 2.0 * margin) * (384.0 + 2.0 * margin);
        assert!((area - (outer - 384.0 * 384.0)).abs() < 1e-1);

        for wall in &layout.walls {
            assert!((wall.center.y - 7.0).abs() < f32::EPSILON);
            assert!((wall.top() - 14.0).abs() < f32::EPSILON);
        }
        assert!((layout.walls[0].center.z + margin).abs() < f32::EPSILON);
        assert!((layout.walls[3].center.x - (384.0 + margin)).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_props() {
        let text = "# comment\n1 40.00 40.00 -1.571 1\n\n8 134.57 117.94 2.356 0.81\n";
        let props = parse_props(text).unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].model, PropModel::Building(1));
        assert_eq!(props[0].position, Vec3::new(40.0, 0.0, 40.0));
        assert_eq!(props[1].model, PropModel::Plant);
        assert!((props[1].collider_half_extents().x - 0.081).abs() < 1e-6);
    }

    #[test]
    fn test_parse_props_errors() {
        let err = parse_props("1 2 3").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedProp { line: 1, .. }));

        let err = parse_props("\nx 1 2 0 1").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedProp { line: 2, .. }));

        let err = parse_props("1 1 2 zero 1").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedProp { line: 1, .. }));

        let err = parse_props("1 1 2 0 0").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedProp { line: 1, .. }));
    }

    #[test]
    fn test_model_keys() {
        assert_eq!(PropModel::from_key('4'), Some(PropModel::Building(4)));
        assert_eq!(PropModel::from_key('0'), Some(PropModel::TreeLarge));
        assert_eq!(PropModel::from_key('a'), None);
        assert_eq!(PropModel::all().count(), 10);
        assert_eq!(
            PropModel::Building(6).collider_half_extents(),
            Vec3::new(5.0, 10.0, 5.0)
        );
    }
}
