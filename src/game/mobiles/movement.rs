// Movement timing constants, step speed and sub-tile offsets

use crate::core::math::clamp_pixel_offset;
use glam::Vec3;

/// Time spent on a turn-only player step
pub const TURN_DELAY: u64 = 100;

/// Window after the last step in which a mobile still counts as walking
pub const WALKING_DELAY: u64 = 750;

/// Walking window for the local player
pub const PLAYER_WALKING_DELAY: u64 = 150;

/// Time between animation frames
pub const CHARACTER_ANIMATION_DELAY: u64 = 80;

pub const STEP_DELAY_MOUNT_RUN: u64 = 100;
pub const STEP_DELAY_MOUNT_WALK: u64 = 200;
pub const STEP_DELAY_RUN: u64 = 200;
pub const STEP_DELAY_WALK: u64 = 400;

/// Half a tile width in pixels
const HALF_TILE: f32 = 22.0;
/// Full tile width in pixels
const FULL_TILE: f32 = 44.0;
/// Altitude pixels per z unit
const Z_PIXELS: f32 = 4.0;

/// Time budget of one step
pub trait MovementSpeed: Send + Sync {
    fn step_delay(&self, run: bool, mounted: bool) -> u64;
}

/// Stock step timings
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMovementSpeed;

impl MovementSpeed for StandardMovementSpeed {
    fn step_delay(&self, run: bool, mounted: bool) -> u64 {
        match (mounted, run) {
            (true, true) => STEP_DELAY_MOUNT_RUN,
            (true, false) => STEP_DELAY_MOUNT_WALK,
            (false, true) => STEP_DELAY_RUN,
            (false, false) => STEP_DELAY_WALK,
        }
    }
}

/// Pixel offset of a mobile partway through a step.
///
/// `facing` is the compass index of the step, `frame_offset` the elapsed
/// animation frames out of `frames_per_tile`. `dz` is the altitude still
/// to cover.
pub fn pixel_offset(facing: u8, frame_offset: f32, frames_per_tile: f32, dz: i32) -> Vec3 {
    let frames_per_tile = frames_per_tile.max(1.0);
    let step = HALF_TILE / frames_per_tile;
    let diagonal = FULL_TILE / frames_per_tile;

    let (x, y, check_x, check_y) = match facing & 7 {
        0 => (step, -step, 22, 22),
        1 => (diagonal, 0.0, 44, 22),
        2 => (step, step, 22, 22),
        3 => (0.0, diagonal, 22, 44),
        4 => (-step, step, 22, 22),
        5 => (-diagonal, 0.0, 44, 22),
        6 => (-step, -step, 22, 22),
        _ => (0.0, -diagonal, 22, 44),
    };

    Vec3::new(
        clamp_pixel_offset(x * frame_offset, check_x),
        clamp_pixel_offset(y * frame_offset, check_y),
        dz as f32 * frame_offset * (Z_PIXELS / frames_per_tile),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_delays() {
        let speed = StandardMovementSpeed;
        assert_eq!(speed.step_delay(false, false), 400);
        assert_eq!(speed.step_delay(true, false), 200);
        assert_eq!(speed.step_delay(false, true), 200);
        assert_eq!(speed.step_delay(true, true), 100);
    }

    #[test]
    fn test_offset_halfway_east() {
        let offset = pixel_offset(2, 2.0, 4.0, 0);
        assert_relative_eq!(offset.x, 11.0);
        assert_relative_eq!(offset.y, 11.0);
        assert_relative_eq!(offset.z, 0.0);
    }

    #[test]
    fn test_offset_clamps_to_tile() {
        let offset = pixel_offset(1, 10.0, 2.0, 0);
        assert_relative_eq!(offset.x, 44.0);
        assert_relative_eq!(offset.y, 0.0);

        let offset = pixel_offset(6, 10.0, 1.0, 0);
        assert_relative_eq!(offset.x, -22.0);
        assert_relative_eq!(offset.y, -22.0);
    }

    #[test]
    fn test_offset_altitude() {
        let offset = pixel_offset(4, 1.0, 4.0, 8);
        assert_relative_eq!(offset.z, 8.0);
    }
}
