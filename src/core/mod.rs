// Core value types shared by every world object
//
// - Serial identifiers (mobile / item / virtual ranges)
// - Tile positions
// - 8-way facing with the running bit
// - Small numeric helpers

pub mod direction;
pub mod math;
pub mod position;
pub mod serial;

pub use direction::Direction;
pub use position::{Position, TileCoord};
pub use serial::Serial;
