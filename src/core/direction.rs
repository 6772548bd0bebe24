// Eight-way facing plus the running bit

use std::fmt;

/// Facing of a world object.
///
/// The low three bits hold the compass facing (0 = north, clockwise up to
/// 7 = north-west). Bit 7 marks a running step. `NONE` is the sentinel used
/// when no movement is implied.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Direction(u8);

impl Direction {
    pub const NORTH: Direction = Direction(0);
    pub const NORTH_EAST: Direction = Direction(1);
    pub const EAST: Direction = Direction(2);
    pub const SOUTH_EAST: Direction = Direction(3);
    pub const SOUTH: Direction = Direction(4);
    pub const SOUTH_WEST: Direction = Direction(5);
    pub const WEST: Direction = Direction(6);
    pub const NORTH_WEST: Direction = Direction(7);
    pub const NONE: Direction = Direction(0xED);

    /// Running flag as stored in the high bit
    pub const RUNNING_BIT: u8 = 0x80;
    /// Mask for the compass part
    pub const MASK: u8 = 0x07;

    /// Wrap a raw byte as received from the server
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw byte, running bit included
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Compass facing with the running bit stripped
    pub const fn facing(self) -> Direction {
        Direction(self.0 & Self::MASK)
    }

    /// Compass index 0..=7
    pub const fn index(self) -> u8 {
        self.0 & Self::MASK
    }

    pub const fn is_running(self) -> bool {
        self.0 & Self::RUNNING_BIT != 0
    }

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    /// Diagonal facings sit on odd indices
    pub const fn is_diagonal(self) -> bool {
        self.index() % 2 == 1
    }

    /// Same facing with the running bit set or cleared
    pub const fn with_running(self, run: bool) -> Direction {
        if run {
            Direction(self.0 | Self::RUNNING_BIT)
        } else {
            Direction(self.0 & !Self::RUNNING_BIT)
        }
    }

    /// Tile delta of one step in this facing
    pub const fn offset(self) -> (i32, i32) {
        match self.index() {
            0 => (0, -1),
            1 => (1, -1),
            2 => (1, 0),
            3 => (1, 1),
            4 => (0, 1),
            5 => (-1, 1),
            6 => (-1, 0),
            _ => (-1, -1),
        }
    }

    /// Facing implied by moving from one tile to another, `NONE` when stationary
    pub fn between(from_x: i32, from_y: i32, to_x: i32, to_y: i32) -> Direction {
        let dx = to_x - from_x;
        let dy = to_y - from_y;

        match (dx.signum(), dy.signum()) {
            (1, 1) => Self::SOUTH_EAST,
            (1, 0) => Self::EAST,
            (1, _) => Self::NORTH_EAST,
            (0, 1) => Self::SOUTH,
            (0, 0) => Self::NONE,
            (0, _) => Self::NORTH,
            (_, 1) => Self::SOUTH_WEST,
            (_, 0) => Self::WEST,
            _ => Self::NORTH_WEST,
        }
    }

    /// Map a facing onto the five directions stored in animation data.
    ///
    /// Returns the stored direction index and whether the frames must be
    /// mirrored horizontally.
    pub const fn animation_direction(self) -> (u8, bool) {
        match self.index() {
            2 => (1, true),
            4 => (1, false),
            1 => (2, true),
            5 => (2, false),
            0 => (3, true),
            6 => (3, false),
            3 => (0, false),
            _ => (4, false),
        }
    }
}

impl fmt::Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "Direction::NONE");
        }

        let name = match self.index() {
            0 => "North",
            1 => "NorthEast",
            2 => "East",
            3 => "SouthEast",
            4 => "South",
            5 => "SouthWest",
            6 => "West",
            _ => "NorthWest",
        };

        if self.is_running() {
            write!(f, "Direction::{}(running)", name)
        } else {
            write!(f, "Direction::{}", name)
        }
    }
}
