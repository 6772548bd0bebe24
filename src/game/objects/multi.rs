// Multi-tile structures: component layout and houses

use crate::core::{Position, Serial};
use crate::engine::assets::MultiBlock;

/// One placed tile of a multi
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiComponent {
    pub graphic: u16,
    pub position: Position,
    pub flags: u32,
}

/// Component layout of a multi, anchored at its item position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multi {
    pub min_x: i16,
    pub min_y: i16,
    pub max_x: i16,
    pub max_y: i16,
    pub components: Vec<MultiComponent>,
}

fn offset_coord(base: u16, delta: i16) -> u16 {
    (base as i32 + delta as i32).clamp(0, u16::MAX as i32) as u16
}

fn offset_z(base: i8, delta: i16) -> i8 {
    (base as i32 + delta as i32).clamp(i8::MIN as i32, i8::MAX as i32) as i8
}

impl Multi {
    /// Place every block relative to `anchor` and record the bounds
    pub fn build(anchor: Position, blocks: &[MultiBlock]) -> Self {
        let mut multi = Multi::default();

        for block in blocks {
            multi.min_x = multi.min_x.min(block.x);
            multi.min_y = multi.min_y.min(block.y);
            multi.max_x = multi.max_x.max(block.x);
            multi.max_y = multi.max_y.max(block.y);

            multi.components.push(MultiComponent {
                graphic: block.graphic,
                position: Position::new(
                    offset_coord(anchor.x, block.x),
                    offset_coord(anchor.y, block.y),
                    offset_z(anchor.z, block.z),
                ),
                flags: block.flags,
            });
        }

        multi
    }

    /// Whether a tile falls inside the bounding box around `anchor`
    pub fn covers(&self, anchor: Position, x: u16, y: u16) -> bool {
        let dx = x as i32 - anchor.x as i32;
        let dy = y as i32 - anchor.y as i32;
        (self.min_x as i32..=self.max_x as i32).contains(&dx)
            && (self.min_y as i32..=self.max_y as i32).contains(&dy)
    }
}

/// A house registered for a multi item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct House {
    pub serial: Serial,
    pub anchor: Position,
    pub components: Vec<MultiComponent>,
}

impl House {
    pub fn from_multi(serial: Serial, anchor: Position, multi: &Multi) -> Self {
        Self {
            serial,
            anchor,
            components: multi.components.clone(),
        }
    }

    /// Components standing on a tile
    pub fn components_at(&self, x: u16, y: u16) -> impl Iterator<Item = &MultiComponent> {
        self.components
            .iter()
            .filter(move |c| c.position.x == x && c.position.y == y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(x: i16, y: i16, z: i16) -> MultiBlock {
        MultiBlock {
            graphic: 0x0064,
            x,
            y,
            z,
            flags: 0,
        }
    }

    #[test]
    fn test_bounds_include_origin() {
        let multi = Multi::build(Position::new(50, 50, 0), &[block(2, 3, 0)]);
        assert_eq!((multi.min_x, multi.min_y, multi.max_x, multi.max_y), (0, 0, 2, 3));
        assert!(multi.covers(Position::new(50, 50, 0), 52, 53));
        assert!(!multi.covers(Position::new(50, 50, 0), 49, 50));
    }

    #[test]
    fn test_components_clamp_to_map() {
        let multi = Multi::build(Position::new(1, 1, 120), &[block(-5, 0, 20)]);
        assert_eq!(multi.components[0].position, Position::new(0, 1, 127));
    }

    #[test]
    fn test_house_components_at() {
        let multi = Multi::build(
            Position::new(10, 10, 0),
            &[block(0, 0, 0), block(0, 0, 20), block(1, 0, 0)],
        );
        let house = House::from_multi(Serial(0x4000_0001), Position::new(10, 10, 0), &multi);
        assert_eq!(house.components_at(10, 10).count(), 2);
        assert_eq!(house.components_at(11, 10).count(), 1);
    }
}
