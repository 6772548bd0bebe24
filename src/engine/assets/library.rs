// In-memory animation, effect and multi tables

use super::{
    AnimationData, AnimationGroupsType, EffectAnimation, EffectData, MultiBlock, MultiData,
};
use std::collections::HashMap;

/// Animation data of one body graphic
#[derive(Debug, Clone, Default)]
struct BodyAnimations {
    group_type: AnimationGroupsType,
    flags: u32,
    /// Frame count per (group, direction)
    frames: HashMap<(u8, u8), u8>,
}

/// Resource tables held in memory
///
/// Bodies are registered with their group type and the groups they
/// provide. Every group registered with `with_group` gets the same frame
/// count in all five stored directions.
#[derive(Debug, Default)]
pub struct AnimationLibrary {
    bodies: HashMap<u16, BodyAnimations>,
    effects: HashMap<u16, EffectAnimation>,
    multis: HashMap<u16, Vec<MultiBlock>>,
}

impl AnimationLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body graphic
    pub fn with_body(mut self, graphic: u16, group_type: AnimationGroupsType) -> Self {
        self.bodies.entry(graphic).or_default().group_type = group_type;
        self
    }

    /// Set the raw animation flags of a body
    pub fn with_flags(mut self, graphic: u16, flags: u32) -> Self {
        self.bodies.entry(graphic).or_default().flags = flags;
        self
    }

    /// Register a group with `frame_count` frames in every direction
    pub fn with_group(mut self, graphic: u16, group: u8, frame_count: u8) -> Self {
        let body = self.bodies.entry(graphic).or_default();
        for direction in 0..5 {
            body.frames.insert((group, direction), frame_count);
        }
        self
    }

    /// Register several groups sharing a frame count
    pub fn with_groups(mut self, graphic: u16, groups: &[u8], frame_count: u8) -> Self {
        for &group in groups {
            self = self.with_group(graphic, group, frame_count);
        }
        self
    }

    /// Register an animated effect graphic
    pub fn with_effect(mut self, graphic: u16, frames: Vec<i8>, interval_ms: u64) -> Self {
        self.effects.insert(graphic, EffectAnimation { frames, interval_ms });
        self
    }

    /// Register a multi layout
    pub fn with_multi(mut self, graphic: u16, blocks: Vec<MultiBlock>) -> Self {
        self.multis.insert(graphic, blocks);
        self
    }

    /// Number of registered bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl AnimationData for AnimationLibrary {
    fn group_type(&self, graphic: u16) -> AnimationGroupsType {
        self.bodies
            .get(&graphic)
            .map(|body| body.group_type)
            .unwrap_or(AnimationGroupsType::Unknown)
    }

    fn animation_flags(&self, graphic: u16) -> u32 {
        self.bodies.get(&graphic).map(|body| body.flags).unwrap_or(0)
    }

    fn animation_exists(&self, graphic: u16, group: u8) -> bool {
        self.bodies
            .get(&graphic)
            .map(|body| body.frames.keys().any(|&(g, _)| g == group))
            .unwrap_or(false)
    }

    fn frame_count(&self, graphic: u16, group: u8, direction: u8) -> Option<u8> {
        self.bodies
            .get(&graphic)
            .and_then(|body| body.frames.get(&(group, direction)))
            .copied()
    }
}

impl EffectData for AnimationLibrary {
    fn effect_animation(&self, graphic: u16) -> Option<EffectAnimation> {
        self.effects.get(&graphic).cloned()
    }
}

impl MultiData for AnimationLibrary {
    fn multi_blocks(&self, graphic: u16) -> Vec<MultiBlock> {
        self.multis.get(&graphic).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_registration() {
        let library = AnimationLibrary::new()
            .with_body(0x0190, AnimationGroupsType::Human)
            .with_groups(0x0190, &[0, 4], 10);

        assert!(library.animation_exists(0x0190, 0));
        assert!(library.animation_exists(0x0190, 4));
        assert!(!library.animation_exists(0x0190, 5));
        assert_eq!(library.frame_count(0x0190, 4, 3), Some(10));
        assert_eq!(library.frame_count(0x0190, 4, 5), None);
        assert_eq!(library.body_count(), 1);
    }

    #[test]
    fn test_unknown_body() {
        let library = AnimationLibrary::new();
        assert_eq!(library.group_type(0x0001), AnimationGroupsType::Unknown);
        assert_eq!(library.animation_flags(0x0001), 0);
        assert!(!library.animation_exists(0x0001, 0));
    }

    #[test]
    fn test_effect_and_multi_tables() {
        let library = AnimationLibrary::new()
            .with_effect(0x36CB, vec![0, 1, 2, 3], 50)
            .with_multi(
                0x0064,
                vec![MultiBlock { graphic: 0x0080, x: -1, y: 0, z: 0, flags: 1 }],
            );

        let effect = library.effect_animation(0x36CB).unwrap();
        assert_eq!(effect.frames.len(), 4);
        assert_eq!(effect.interval_ms, 50);
        assert!(library.effect_animation(0x0001).is_none());
        assert_eq!(library.multi_blocks(0x0064).len(), 1);
        assert!(library.multi_blocks(0x0065).is_empty());
    }
}
