// Sparse tile map: terrain, statics and the entities standing on each cell

use crate::core::{Position, Serial, TileCoord};
use crate::game::objects::{Land, Static};
use std::collections::HashMap;

/// Contents of one map cell
#[derive(Debug, Clone, Default)]
pub struct Tile {
    pub land: Option<Land>,
    pub statics: Vec<Static>,
    entities: Vec<Serial>,
}

impl Tile {
    /// Items and mobiles standing here, in arrival order
    pub fn entities(&self) -> &[Serial] {
        &self.entities
    }

    pub fn is_empty(&self) -> bool {
        self.land.is_none() && self.statics.is_empty() && self.entities.is_empty()
    }
}

/// Cells of one facet, created on first use
#[derive(Debug, Default)]
pub struct TileMap {
    index: u8,
    tiles: HashMap<TileCoord, Tile>,
}

impl TileMap {
    pub fn new(index: u8) -> Self {
        Self {
            index,
            tiles: HashMap::new(),
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Serials standing on a cell
    pub fn entities_at(&self, coord: TileCoord) -> &[Serial] {
        self.tiles
            .get(&coord)
            .map(|tile| tile.entities.as_slice())
            .unwrap_or(&[])
    }

    /// Put an entity on a cell, false when it is already there
    pub fn insert_entity(&mut self, coord: TileCoord, serial: Serial) -> bool {
        let tile = self.tiles.entry(coord).or_default();
        if tile.entities.contains(&serial) {
            return false;
        }
        tile.entities.push(serial);
        true
    }

    /// Take an entity off a cell, dropping the cell once it is empty
    pub fn remove_entity(&mut self, coord: TileCoord, serial: Serial) -> bool {
        let Some(tile) = self.tiles.get_mut(&coord) else {
            return false;
        };

        let before = tile.entities.len();
        tile.entities.retain(|&s| s != serial);
        let removed = tile.entities.len() != before;

        if tile.is_empty() {
            self.tiles.remove(&coord);
        }
        removed
    }

    /// Place terrain and re-stretch the cells whose corners it forms
    pub fn set_land(&mut self, graphic: u16, position: Position) {
        let (x, y) = position.tile();
        let mut land = Land::new(graphic, position);
        land.object.set_map_index(self.index);
        self.tiles.entry((x, y)).or_default().land = Some(land);

        let neighbours = [
            Some((x, y)),
            x.checked_sub(1).map(|x| (x, y)),
            y.checked_sub(1).map(|y| (x, y)),
            x.checked_sub(1).zip(y.checked_sub(1)),
        ];
        for coord in neighbours.into_iter().flatten() {
            self.stretch_land(coord);
        }
    }

    pub fn add_static(&mut self, mut art: Static) {
        art.object.set_map_index(self.index);
        let coord = art.object.position().tile();
        self.tiles.entry(coord).or_default().statics.push(art);
    }

    fn land_z(&self, coord: TileCoord) -> Option<i8> {
        self.tiles
            .get(&coord)
            .and_then(|tile| tile.land.as_ref())
            .map(|land| land.object.position().z)
    }

    /// Resolve corner heights from the east, south-east and south neighbours
    fn stretch_land(&mut self, (x, y): TileCoord) {
        let Some(top) = self.land_z((x, y)) else {
            return;
        };

        let corner = |coord: Option<TileCoord>| coord.and_then(|c| self.land_z(c)).unwrap_or(top);
        let right = corner(x.checked_add(1).map(|x| (x, y)));
        let bottom = corner(x.checked_add(1).zip(y.checked_add(1)));
        let left = corner(y.checked_add(1).map(|y| (x, y)));

        if let Some(land) = self.tiles.get_mut(&(x, y)).and_then(|tile| tile.land.as_mut()) {
            land.update_z(top, right, bottom, left);
        }
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities_move_between_cells() {
        let mut map = TileMap::new(0);
        assert!(map.insert_entity((1, 1), Serial(5)));
        assert!(!map.insert_entity((1, 1), Serial(5)));
        assert_eq!(map.entities_at((1, 1)), &[Serial(5)]);

        assert!(map.remove_entity((1, 1), Serial(5)));
        assert!(map.insert_entity((2, 1), Serial(5)));
        assert!(map.entities_at((1, 1)).is_empty());
        assert_eq!(map.tile_count(), 1);
        assert!(!map.remove_entity((9, 9), Serial(5)));
    }

    #[test]
    fn test_flat_land_is_not_stretched() {
        let mut map = TileMap::new(0);
        map.set_land(3, Position::new(0, 0, 5));
        map.set_land(3, Position::new(1, 0, 5));
        map.set_land(3, Position::new(0, 1, 5));
        map.set_land(3, Position::new(1, 1, 5));

        let land = map.tile((0, 0)).and_then(|t| t.land.as_ref()).unwrap();
        assert!(!land.stretched);
        assert_eq!(land.average_z, 5);
    }

    #[test]
    fn test_neighbour_restretches_land() {
        let mut map = TileMap::new(0);
        map.set_land(3, Position::new(10, 10, 0));
        assert!(!map.tile((10, 10)).and_then(|t| t.land.as_ref()).unwrap().stretched);

        // South-east neighbour raises the bottom corner
        map.set_land(3, Position::new(11, 11, 20));
        let land = map.tile((10, 10)).and_then(|t| t.land.as_ref()).unwrap();
        assert!(land.stretched);
        assert_eq!(land.min_z, 0);
    }

    #[test]
    fn test_statics_share_cell() {
        let mut map = TileMap::new(1);
        map.add_static(Static::new(0x0E31, 0, Position::new(4, 4, 0)));
        map.add_static(Static::new(0x0E32, 0, Position::new(4, 4, 0)));
        let tile = map.tile((4, 4)).unwrap();
        assert_eq!(tile.statics.len(), 2);
        assert_eq!(tile.statics[0].object.map_index(), 1);
    }
}
