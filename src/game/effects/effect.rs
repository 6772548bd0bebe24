// Transient visual effects: animated art, projectiles and lightning

use crate::core::{Position, Serial};
use crate::engine::assets::{EffectAnimation, EffectData, EntityHandle};
use crate::game::objects::{GameObject, View, ViewKind, WorldObject};
use crate::game::world::EntityLocator;
use glam::Vec3;
use std::f32::consts::FRAC_PI_4;

/// Travel time of a projectile per tile of distance
pub const MOVING_TIME_PER_TILE: f32 = 75.0;

/// Graphic of the blast left by an exploding projectile
pub const EXPLOSION_GRAPHIC: u16 = 0x36CB;
pub const EXPLOSION_DURATION: i64 = 400;

/// First frame of the lightning bolt art
pub const LIGHTNING_GRAPHIC: u16 = 0x4E20;
pub const LIGHTNING_FRAME_COUNT: u16 = 10;
pub const LIGHTNING_FRAME_DELAY: u64 = 50;

/// Where an effect starts or ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectEndpoint {
    /// Follows a live entity, remembering where it was last seen
    Entity {
        handle: EntityHandle,
        last_known: Position,
    },
    /// A frozen map position
    Fixed(Position),
}

impl EffectEndpoint {
    pub fn entity(handle: EntityHandle, position: Position) -> Self {
        EffectEndpoint::Entity {
            handle,
            last_known: position,
        }
    }

    /// Endpoint for a serial: tracks the entity when it exists, else the fallback position
    pub fn resolve(serial: Serial, fallback: Position, locator: &dyn EntityLocator) -> Self {
        locator
            .handle_of(serial)
            .and_then(|handle| {
                locator
                    .locate(handle)
                    .map(|position| EffectEndpoint::entity(handle, position))
            })
            .unwrap_or(EffectEndpoint::Fixed(fallback))
    }

    pub fn position(&self) -> Position {
        match *self {
            EffectEndpoint::Entity { last_known, .. } => last_known,
            EffectEndpoint::Fixed(position) => position,
        }
    }

    pub fn handle(&self) -> Option<EntityHandle> {
        match *self {
            EffectEndpoint::Entity { handle, .. } => Some(handle),
            EffectEndpoint::Fixed(_) => None,
        }
    }

    /// Re-read a tracked entity's position, false once it is gone
    fn refresh(&mut self, locator: &dyn EntityLocator) -> bool {
        match self {
            EffectEndpoint::Fixed(_) => true,
            EffectEndpoint::Entity { handle, last_known } => match locator.locate(*handle) {
                Some(position) => {
                    *last_known = position;
                    true
                }
                None => false,
            },
        }
    }
}

/// Collaborators an effect reads during an update
pub struct EffectContext<'a> {
    pub locator: &'a dyn EntityLocator,
    pub data: &'a dyn EffectData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    /// Art cycling through its frame table in place
    Animated,
    /// Projectile flying from source to target
    Moving {
        time_active: f32,
        time_until_hit: f32,
        angle: f32,
        explode: bool,
        fixed_direction: bool,
    },
    /// Bolt striking its source
    Lightning { frame: u16 },
}

/// A visual effect
#[derive(Debug, Clone)]
pub struct GameEffect {
    pub object: GameObject,
    kind: EffectKind,
    base_graphic: u16,
    source: EffectEndpoint,
    target: Option<EffectEndpoint>,
    /// Absolute time of self-disposal, `None` for infinite effects
    deadline: Option<u64>,
    animation: Option<EffectAnimation>,
    animation_loaded: bool,
    frame_cursor: usize,
    next_frame_time: u64,
    children: Vec<GameEffect>,
}

impl GameEffect {
    fn with_kind(
        kind: EffectKind,
        graphic: u16,
        hue: u16,
        source: EffectEndpoint,
        target: Option<EffectEndpoint>,
        duration: i64,
        now: u64,
    ) -> Self {
        let mut object = GameObject::new(0);
        object.set_graphic(graphic);
        object.set_hue(hue);
        object.set_position(source.position());

        Self {
            object,
            kind,
            base_graphic: graphic,
            source,
            target,
            deadline: u64::try_from(duration).ok().map(|duration| now + duration),
            animation: None,
            animation_loaded: false,
            frame_cursor: 0,
            next_frame_time: 0,
            children: Vec::new(),
        }
    }

    /// Animated art at the source; a negative duration never expires
    pub fn animated(graphic: u16, hue: u16, source: EffectEndpoint, duration: i64, now: u64) -> Self {
        Self::with_kind(EffectKind::Animated, graphic, hue, source, None, duration, now)
    }

    /// Projectile whose flight time is fixed by the distance at launch
    pub fn moving(
        graphic: u16,
        hue: u16,
        source: EffectEndpoint,
        target: EffectEndpoint,
        explode: bool,
        fixed_direction: bool,
        now: u64,
    ) -> Self {
        let from = source.position();
        let to = target.position();
        let kind = EffectKind::Moving {
            time_active: 0.0,
            time_until_hit: from.distance_3d(&to) * MOVING_TIME_PER_TILE,
            angle: angle_between(from, to),
            explode,
            fixed_direction,
        };

        Self::with_kind(kind, graphic, hue, source, Some(target), -1, now)
    }

    /// Lightning bolt on the source, gone after its last frame
    pub fn lightning(hue: u16, source: EffectEndpoint, now: u64) -> Self {
        Self::with_kind(
            EffectKind::Lightning { frame: 0 },
            LIGHTNING_GRAPHIC,
            hue,
            source,
            None,
            -1,
            now,
        )
    }

    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    pub fn graphic(&self) -> u16 {
        self.object.graphic()
    }

    pub fn base_graphic(&self) -> u16 {
        self.base_graphic
    }

    pub fn position(&self) -> Position {
        self.object.position()
    }

    pub fn source(&self) -> &EffectEndpoint {
        &self.source
    }

    pub fn target(&self) -> Option<&EffectEndpoint> {
        self.target.as_ref()
    }

    pub fn set_source(&mut self, source: EffectEndpoint) {
        self.source = source;
        self.object.set_position(source.position());
    }

    pub fn set_target(&mut self, target: Option<EffectEndpoint>) {
        self.target = target;
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Facing of a projectile in radians
    pub fn angle(&self) -> Option<f32> {
        match self.kind {
            EffectKind::Moving { angle, .. } => Some(angle),
            _ => None,
        }
    }

    /// Fractional map position of a projectile along its path
    pub fn interpolated_position(&self) -> Option<Vec3> {
        let EffectKind::Moving {
            time_active,
            time_until_hit,
            ..
        } = self.kind
        else {
            return None;
        };

        let from = self.source.position().as_vec3();
        let to = self.target.map(|t| t.position()).unwrap_or(self.source.position()).as_vec3();
        let t = if time_until_hit > 0.0 {
            (time_active / time_until_hit).min(1.0)
        } else {
            1.0
        };

        Some(from.lerp(to, t))
    }

    /// Queue an effect to start once this one is gone
    pub fn add_child(&mut self, child: GameEffect) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[GameEffect] {
        &self.children
    }

    pub(crate) fn take_children(&mut self) -> Vec<GameEffect> {
        std::mem::take(&mut self.children)
    }

    pub fn update(&mut self, total_ms: u64, frame_ms: u64, ctx: &EffectContext<'_>) {
        if self.object.is_disposed() {
            return;
        }

        self.object.update(total_ms, frame_ms);

        if self.deadline.is_some_and(|deadline| total_ms >= deadline) {
            log::debug!("effect {:#06x} expired", self.base_graphic);
            self.dispose();
            return;
        }

        match self.kind {
            EffectKind::Animated => {
                self.track_source(ctx.locator);
                self.object.set_position(self.source.position());
                self.advance_frame(total_ms, ctx.data);
            }
            EffectKind::Moving { .. } => {
                self.advance_frame(total_ms, ctx.data);
                self.update_flight(total_ms, frame_ms, ctx.locator);
            }
            EffectKind::Lightning { .. } => self.update_lightning(total_ms, ctx.locator),
        }
    }

    /// Follow the source entity; once it is gone stay where it was last seen
    fn track_source(&mut self, locator: &dyn EntityLocator) {
        if !self.source.refresh(locator) {
            log::debug!("effect {:#06x} source gone, pinning in place", self.base_graphic);
            self.source = EffectEndpoint::Fixed(self.source.position());
        }
    }

    /// Step through the frame table of the base graphic
    fn advance_frame(&mut self, total_ms: u64, data: &dyn EffectData) {
        if !self.animation_loaded {
            self.animation = data.effect_animation(self.base_graphic);
            self.animation_loaded = true;
        }

        let Some(animation) = self.animation.as_ref() else {
            return;
        };
        if animation.frames.is_empty() || self.next_frame_time > total_ms {
            return;
        }

        let offset = animation.frames[self.frame_cursor % animation.frames.len()];
        let graphic = (self.base_graphic as i32 + offset as i32).clamp(0, u16::MAX as i32) as u16;
        self.frame_cursor = (self.frame_cursor + 1) % animation.frames.len();
        self.next_frame_time = total_ms + animation.interval_ms;

        self.object.anim_index = offset;
        self.object.set_graphic(graphic);
    }

    fn update_flight(&mut self, total_ms: u64, frame_ms: u64, locator: &dyn EntityLocator) {
        self.track_source(locator);
        let target_alive = match self.target.as_mut() {
            Some(target) => target.refresh(locator),
            None => false,
        };

        if !target_alive {
            log::debug!("effect {:#06x} lost its target", self.base_graphic);
            self.dispose();
            return;
        }

        let EffectKind::Moving {
            time_active,
            time_until_hit,
            angle,
            explode,
            fixed_direction,
        } = &mut self.kind
        else {
            return;
        };

        *time_active += frame_ms as f32;
        let hit = *time_active >= *time_until_hit;
        let explode = *explode;

        let from = self.source.position();
        let to = self.target.map(|t| t.position()).unwrap_or(from);
        if !*fixed_direction {
            *angle = angle_between(from, to);
        }

        if hit {
            if explode {
                let blast = GameEffect::animated(
                    EXPLOSION_GRAPHIC,
                    self.object.hue(),
                    EffectEndpoint::Fixed(to),
                    EXPLOSION_DURATION,
                    total_ms,
                );
                self.add_child(blast);
            }
            self.dispose();
            return;
        }

        if let Some(position) = self.interpolated_position() {
            let tile = position.floor();
            self.object.set_position(Position::from_vec3(tile));
            self.object.offset = position - tile;
        }
    }

    fn update_lightning(&mut self, total_ms: u64, locator: &dyn EntityLocator) {
        self.track_source(locator);
        self.object.set_position(self.source.position());

        if self.next_frame_time > total_ms {
            return;
        }

        let EffectKind::Lightning { frame } = &mut self.kind else {
            return;
        };

        if *frame >= LIGHTNING_FRAME_COUNT {
            self.dispose();
            return;
        }

        let graphic = LIGHTNING_GRAPHIC + *frame;
        *frame += 1;
        self.object.set_graphic(graphic);
        self.next_frame_time = total_ms + LIGHTNING_FRAME_DELAY;
    }

    pub fn is_disposed(&self) -> bool {
        self.object.is_disposed()
    }

    pub fn dispose(&mut self) -> bool {
        self.object.dispose()
    }
}

/// Screen facing from one tile to another
fn angle_between(from: Position, to: Position) -> f32 {
    let dx = to.x as f32 - from.x as f32;
    let dy = to.y as f32 - from.y as f32;
    -(dy.atan2(dx) + FRAC_PI_4)
}

impl WorldObject for GameEffect {
    fn object(&self) -> &GameObject {
        &self.object
    }

    fn object_mut(&mut self) -> &mut GameObject {
        &mut self.object
    }

    fn create_view(&self) -> View {
        View {
            kind: ViewKind::Effect,
            graphic: self.object.graphic(),
            hue: self.object.hue(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::AnimationLibrary;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    /// Entities at fixed positions, removable mid-test
    #[derive(Default)]
    struct Positions {
        entities: HashMap<Serial, Position>,
    }

    impl EntityLocator for Positions {
        fn handle_of(&self, serial: Serial) -> Option<EntityHandle> {
            self.entities.contains_key(&serial).then_some(EntityHandle {
                serial,
                generation: 1,
            })
        }

        fn locate(&self, handle: EntityHandle) -> Option<Position> {
            self.entities.get(&handle.serial).copied()
        }
    }

    fn fixed(x: u16, y: u16) -> EffectEndpoint {
        EffectEndpoint::Fixed(Position::new(x, y, 0))
    }

    #[test]
    fn test_duration_disposes_at_deadline() {
        let locator = Positions::default();
        let library = AnimationLibrary::new();
        let ctx = EffectContext {
            locator: &locator,
            data: &library,
        };

        let mut effect = GameEffect::animated(0x3709, 0, fixed(1, 1), 500, 0);
        effect.update(499, 50, &ctx);
        assert!(!effect.is_disposed());
        effect.update(500, 1, &ctx);
        assert!(effect.is_disposed());
    }

    #[test]
    fn test_negative_duration_never_expires() {
        let locator = Positions::default();
        let library = AnimationLibrary::new();
        let ctx = EffectContext {
            locator: &locator,
            data: &library,
        };

        let mut effect = GameEffect::animated(0x3709, 0, fixed(1, 1), -1, 0);
        assert_eq!(effect.deadline(), None);
        effect.update(u64::MAX / 2, 50, &ctx);
        assert!(!effect.is_disposed());
    }

    #[test]
    fn test_frames_cycle_through_table() {
        let locator = Positions::default();
        let library = AnimationLibrary::new().with_effect(0x3709, vec![0, 1, 2], 100);
        let ctx = EffectContext {
            locator: &locator,
            data: &library,
        };

        let mut effect = GameEffect::animated(0x3709, 0, fixed(1, 1), -1, 0);
        let mut graphics = Vec::new();
        for t in [0, 50, 100, 200, 300] {
            effect.update(t, 50, &ctx);
            graphics.push(effect.graphic());
        }
        assert_eq!(graphics, vec![0x3709, 0x3709, 0x370A, 0x370B, 0x3709]);
    }

    #[test]
    fn test_animated_follows_entity() {
        let mut locator = Positions::default();
        locator.entities.insert(Serial(5), Position::new(3, 3, 0));
        let library = AnimationLibrary::new();

        let source = EffectEndpoint::resolve(Serial(5), Position::default(), &locator);
        let mut effect = GameEffect::animated(0x3709, 0, source, -1, 0);
        assert_eq!(effect.position(), Position::new(3, 3, 0));

        locator.entities.insert(Serial(5), Position::new(4, 3, 0));
        let ctx = EffectContext {
            locator: &locator,
            data: &library,
        };
        effect.update(10, 10, &ctx);
        assert_eq!(effect.position(), Position::new(4, 3, 0));
    }

    #[test]
    fn test_resolve_falls_back_to_position() {
        let locator = Positions::default();
        let endpoint = EffectEndpoint::resolve(Serial(9), Position::new(7, 8, 1), &locator);
        assert_eq!(endpoint, EffectEndpoint::Fixed(Position::new(7, 8, 1)));
        assert_eq!(endpoint.handle(), None);
    }

    #[test]
    fn test_moving_starts_at_source_and_hits() {
        let locator = Positions::default();
        let library = AnimationLibrary::new();
        let ctx = EffectContext {
            locator: &locator,
            data: &library,
        };

        let mut effect = GameEffect::moving(0x36D4, 0, fixed(0, 0), fixed(4, 0), false, false, 0);
        let start = effect.interpolated_position().unwrap();
        assert_relative_eq!(start.x, 0.0);
        assert_relative_eq!(start.y, 0.0);

        // Four tiles at 75 ms each
        effect.update(150, 150, &ctx);
        let halfway = effect.interpolated_position().unwrap();
        assert_relative_eq!(halfway.x, 2.0);
        assert_eq!(effect.position(), Position::new(2, 0, 0));

        effect.update(300, 150, &ctx);
        assert!(effect.is_disposed());
        assert!(effect.children().is_empty());
    }

    #[test]
    fn test_exploding_projectile_leaves_blast() {
        let locator = Positions::default();
        let library = AnimationLibrary::new();
        let ctx = EffectContext {
            locator: &locator,
            data: &library,
        };

        let mut effect = GameEffect::moving(0x36D4, 0x21, fixed(0, 0), fixed(1, 0), true, false, 0);
        effect.update(100, 100, &ctx);
        assert!(effect.is_disposed());

        let blast = &effect.children()[0];
        assert_eq!(blast.graphic(), EXPLOSION_GRAPHIC);
        assert_eq!(blast.position(), Position::new(1, 0, 0));
        assert_eq!(blast.deadline(), Some(100 + EXPLOSION_DURATION as u64));
        assert_eq!(blast.object.hue(), 0x21);
    }

    #[test]
    fn test_moving_disposes_when_target_gone() {
        let mut locator = Positions::default();
        locator.entities.insert(Serial(2), Position::new(10, 0, 0));
        let library = AnimationLibrary::new();

        let target = EffectEndpoint::resolve(Serial(2), Position::default(), &locator);
        let mut effect = GameEffect::moving(0x36D4, 0, fixed(0, 0), target, true, false, 0);

        locator.entities.clear();
        let ctx = EffectContext {
            locator: &locator,
            data: &library,
        };
        effect.update(50, 50, &ctx);
        assert!(effect.is_disposed());
        assert!(effect.children().is_empty());
    }

    #[test]
    fn test_moving_angle() {
        let effect = GameEffect::moving(0x36D4, 0, fixed(0, 0), fixed(5, 0), false, false, 0);
        assert_relative_eq!(effect.angle().unwrap(), -FRAC_PI_4);
        assert_eq!(GameEffect::animated(1, 0, fixed(0, 0), -1, 0).angle(), None);
    }

    #[test]
    fn test_lightning_runs_ten_frames() {
        let locator = Positions::default();
        let library = AnimationLibrary::new();
        let ctx = EffectContext {
            locator: &locator,
            data: &library,
        };

        let mut effect = GameEffect::lightning(0, fixed(2, 2), 0);
        let mut t = 0;
        let mut graphics = Vec::new();
        while !effect.is_disposed() {
            effect.update(t, LIGHTNING_FRAME_DELAY, &ctx);
            if !effect.is_disposed() {
                graphics.push(effect.graphic());
            }
            t += LIGHTNING_FRAME_DELAY;
        }

        assert_eq!(graphics.len(), LIGHTNING_FRAME_COUNT as usize);
        assert_eq!(graphics[0], LIGHTNING_GRAPHIC);
        assert_eq!(graphics[9], LIGHTNING_GRAPHIC + 9);
        assert_eq!(t, 11 * LIGHTNING_FRAME_DELAY);
    }
}
