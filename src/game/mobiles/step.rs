// Queued movement steps

use crate::core::{Direction, Position};
use std::collections::VecDeque;

/// Maximum number of steps a mobile buffers
pub const MAX_STEP_COUNT: usize = 5;

/// One queued tile move or turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub x: u16,
    pub y: u16,
    pub z: i8,
    /// Facing with the running bit
    pub direction: Direction,
    /// Walk sequence for player requests
    pub seq: u8,
    /// Already animated ahead of server confirmation
    pub anim: bool,
}

impl Step {
    pub fn new(position: Position, direction: Direction) -> Self {
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            direction,
            seq: 0,
            anim: false,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }

    pub fn is_running(&self) -> bool {
        self.direction.is_running()
    }
}

/// Bounded FIFO of steps
#[derive(Debug, Clone, Default)]
pub struct StepQueue {
    steps: VecDeque<Step>,
}

impl StepQueue {
    pub fn new() -> Self {
        Self {
            steps: VecDeque::with_capacity(MAX_STEP_COUNT),
        }
    }

    /// Append a step, false when the queue is full
    pub fn push(&mut self, step: Step) -> bool {
        if self.is_full() {
            return false;
        }
        self.steps.push_back(step);
        true
    }

    pub fn pop(&mut self) -> Option<Step> {
        self.steps.pop_front()
    }

    pub fn front(&self) -> Option<&Step> {
        self.steps.front()
    }

    pub fn back(&self) -> Option<&Step> {
        self.steps.back()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.steps.len() >= MAX_STEP_COUNT
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Step> {
        self.steps.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_bounded() {
        let mut queue = StepQueue::new();
        for i in 0..MAX_STEP_COUNT {
            assert!(queue.push(Step::new(Position::new(i as u16, 0, 0), Direction::EAST)));
        }
        assert!(queue.is_full());
        assert!(!queue.push(Step::new(Position::default(), Direction::EAST)));
        assert_eq!(queue.len(), MAX_STEP_COUNT);
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = StepQueue::new();
        queue.push(Step::new(Position::new(1, 0, 0), Direction::EAST));
        queue.push(Step::new(Position::new(2, 0, 0), Direction::EAST));
        assert_eq!(queue.front().map(|s| s.x), Some(1));
        assert_eq!(queue.back().map(|s| s.x), Some(2));
        assert_eq!(queue.pop().map(|s| s.x), Some(1));
        assert_eq!(queue.len(), 1);
    }
}
