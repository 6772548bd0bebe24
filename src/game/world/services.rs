// Collaborators the simulation calls out to

use crate::core::{Direction, Position, Serial};
use crate::engine::assets::EntityHandle;
use crate::game::mobiles::Mobile;

/// Proposed destination of a player step, adjusted in place by the pathfinder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkTarget {
    pub x: u16,
    pub y: u16,
    pub z: i8,
    pub direction: Direction,
}

impl WalkTarget {
    pub fn new(position: Position, direction: Direction) -> Self {
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            direction,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }
}

/// Decides whether a step is legal.
///
/// On entry `target` holds the current tile and the requested direction.
/// On success it holds the destination; the direction may be changed to
/// slide around an obstacle.
pub trait Pathfinder: Send + Sync {
    fn can_walk(&self, mobile: &Mobile, target: &mut WalkTarget) -> bool;
}

/// Pathfinder for a map without obstacles
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenTerrain;

impl Pathfinder for OpenTerrain {
    fn can_walk(&self, _mobile: &Mobile, target: &mut WalkTarget) -> bool {
        let (dx, dy) = target.direction.offset();
        let x = target.x as i32 + dx;
        let y = target.y as i32 + dy;

        if !(0..=u16::MAX as i32).contains(&x) || !(0..=u16::MAX as i32).contains(&y) {
            return false;
        }

        target.x = x as u16;
        target.y = y as u16;
        true
    }
}

/// Outgoing walk protocol messages
pub trait WalkRequestSender: Send {
    /// Ask the server to move the player one step
    fn send_walk_request(&mut self, direction: Direction, sequence: u8);

    /// Ask the server to resend the authoritative player position
    fn request_resync(&mut self);
}

/// Resolves tracked entities for effects
pub trait EntityLocator {
    /// Current handle of a serial, `None` when nothing has it
    fn handle_of(&self, serial: Serial) -> Option<EntityHandle>;

    /// Position of a still-live entity
    fn locate(&self, handle: EntityHandle) -> Option<Position>;
}

/// Container relationship of items
pub trait ContainerLookup {
    /// Holder of an item, `None` when the item is unknown
    fn container_of(&self, item: Serial) -> Option<Serial>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_terrain_steps_in_direction() {
        let mobile = Mobile::new(Serial(1));
        let mut target = WalkTarget::new(Position::new(10, 10, 5), Direction::SOUTH_WEST);
        assert!(OpenTerrain.can_walk(&mobile, &mut target));
        assert_eq!(target.position(), Position::new(9, 11, 5));
        assert_eq!(target.direction, Direction::SOUTH_WEST);
    }

    #[test]
    fn test_open_terrain_stops_at_map_edge() {
        let mobile = Mobile::new(Serial(1));
        let mut target = WalkTarget::new(Position::new(0, 0, 0), Direction::NORTH);
        assert!(!OpenTerrain.can_walk(&mobile, &mut target));
        assert_eq!(target.position(), Position::new(0, 0, 0));
    }
}
