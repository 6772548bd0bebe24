// Map art: static tiles and terrain

use super::game_object::{GameObject, View, ViewKind, WorldObject};
use crate::core::Position;

/// Immovable art placed by the map files
#[derive(Debug, Clone)]
pub struct Static {
    pub object: GameObject,
    /// Tile data flags of the graphic
    pub flags: u64,
}

impl Static {
    pub fn new(graphic: u16, hue: u16, position: Position) -> Self {
        let mut object = GameObject::new(0);
        object.set_graphic(graphic);
        object.set_hue(hue);
        object.set_position(position);
        Self { object, flags: 0 }
    }
}

impl WorldObject for Static {
    fn object(&self) -> &GameObject {
        &self.object
    }

    fn object_mut(&mut self) -> &mut GameObject {
        &mut self.object
    }

    fn create_view(&self) -> View {
        View {
            kind: ViewKind::Static,
            graphic: self.object.graphic(),
            hue: self.object.hue(),
        }
    }
}

/// Terrain tile with its corner altitudes resolved
#[derive(Debug, Clone)]
pub struct Land {
    pub object: GameObject,
    pub min_z: i8,
    pub average_z: i8,
    /// Corners differ in height, the tile is drawn stretched
    pub stretched: bool,
}

impl Land {
    pub fn new(graphic: u16, position: Position) -> Self {
        let mut object = GameObject::new(0);
        object.set_graphic(graphic);
        object.set_position(position);
        Self {
            object,
            min_z: position.z,
            average_z: position.z,
            stretched: false,
        }
    }

    /// Resolve height from the four corner altitudes
    pub fn update_z(&mut self, top: i8, right: i8, bottom: i8, left: i8) {
        self.stretched = !(top == right && right == bottom && bottom == left);
        self.min_z = top.min(right).min(bottom).min(left);

        let (top, right, bottom, left) = (top as i32, right as i32, bottom as i32, left as i32);
        self.average_z = if (top - bottom).abs() <= (left - right).abs() {
            ((left + right) >> 1) as i8
        } else {
            ((top + bottom) >> 1) as i8
        };
    }
}

impl WorldObject for Land {
    fn object(&self) -> &GameObject {
        &self.object
    }

    fn object_mut(&mut self) -> &mut GameObject {
        &mut self.object
    }

    fn create_view(&self) -> View {
        View {
            kind: ViewKind::Land,
            graphic: self.object.graphic(),
            hue: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_land() {
        let mut land = Land::new(0x0003, Position::new(5, 5, 10));
        land.update_z(10, 10, 10, 10);
        assert!(!land.stretched);
        assert_eq!(land.min_z, 10);
        assert_eq!(land.average_z, 10);
    }

    #[test]
    fn test_sloped_land() {
        let mut land = Land::new(0x0003, Position::new(5, 5, 0));
        land.update_z(0, 10, 20, 4);
        assert!(land.stretched);
        assert_eq!(land.min_z, 0);
        // |top - bottom| = 20 > |left - right| = 6, so the top/bottom pair wins
        assert_eq!(land.average_z, 10);

        land.update_z(0, 20, 2, -10);
        assert_eq!(land.average_z, 5);
        assert_eq!(land.min_z, -10);
    }

    #[test]
    fn test_static_view() {
        let mut stone = Static::new(0x0750, 0x0455, Position::new(1, 1, 0));
        let view = stone.view();
        assert_eq!(view.kind, ViewKind::Static);
        assert_eq!(view.hue, 0x0455);
    }
}
