// World coordinates

use glam::Vec3;
use std::fmt;

/// Tile column/row pair used to key map cells
pub type TileCoord = (u16, u16);

/// A world position: tile x/y and signed altitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: u16,
    pub y: u16,
    pub z: i8,
}

impl Position {
    pub const fn new(x: u16, y: u16, z: i8) -> Self {
        Self { x, y, z }
    }

    /// The map cell this position falls in
    pub const fn tile(&self) -> TileCoord {
        (self.x, self.y)
    }

    /// Position as a float vector, used for interpolation
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Truncate a float vector back onto the tile grid
    pub fn from_vec3(v: Vec3) -> Self {
        Self {
            x: v.x.max(0.0) as u16,
            y: v.y.max(0.0) as u16,
            z: v.z.clamp(i8::MIN as f32, i8::MAX as f32) as i8,
        }
    }

    /// Straight-line distance in tile units, altitude included
    pub fn distance_3d(&self, other: &Position) -> f32 {
        self.as_vec3().distance(other.as_vec3())
    }

    /// Chebyshev distance on the ground plane
    pub fn tile_distance(&self, other: &Position) -> u16 {
        let dx = (self.x as i32 - other.x as i32).unsigned_abs();
        let dy = (self.y as i32 - other.y as i32).unsigned_abs();
        dx.max(dy) as u16
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
