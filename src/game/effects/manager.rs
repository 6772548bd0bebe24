// Owner of every live effect

use super::effect::{EffectContext, EffectEndpoint, GameEffect};
use crate::core::{Position, Serial};
use crate::game::world::EntityLocator;

/// Effect kinds the server can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GraphicEffectType {
    Moving = 0,
    Lightning = 1,
    FixedXYZ = 2,
    FixedFrom = 3,
    ScreenFade = 4,
    Nothing = 5,
}

impl GraphicEffectType {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(GraphicEffectType::Moving),
            1 => Some(GraphicEffectType::Lightning),
            2 => Some(GraphicEffectType::FixedXYZ),
            3 => Some(GraphicEffectType::FixedFrom),
            4 => Some(GraphicEffectType::ScreenFade),
            5 => Some(GraphicEffectType::Nothing),
            _ => None,
        }
    }
}

/// Server description of an effect to play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectRequest {
    pub kind: GraphicEffectType,
    pub source: Serial,
    pub target: Serial,
    pub graphic: u16,
    pub hue: u16,
    pub source_position: Position,
    pub target_position: Position,
    /// Lifetime in milliseconds, negative for infinite
    pub duration: i64,
    pub fixed_direction: bool,
    pub explode: bool,
}

/// Flat list of live effects.
///
/// Children of a finished effect join the list after the update that
/// finished it, so their first update happens on the next tick.
#[derive(Debug, Default)]
pub struct EffectManager {
    effects: Vec<GameEffect>,
}

impl EffectManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEffect> {
        self.effects.iter()
    }

    pub fn add(&mut self, effect: GameEffect) {
        self.effects.push(effect);
    }

    /// Build and add the effect a server request describes.
    ///
    /// Returns false for kinds that have no world effect.
    pub fn spawn(&mut self, request: &EffectRequest, now: u64, locator: &dyn EntityLocator) -> bool {
        let effect = match request.kind {
            GraphicEffectType::Moving => {
                let source = EffectEndpoint::resolve(request.source, request.source_position, locator);
                let target = EffectEndpoint::resolve(request.target, request.target_position, locator);
                // Projectiles launch from where the source stands now
                GameEffect::moving(
                    request.graphic,
                    request.hue,
                    EffectEndpoint::Fixed(source.position()),
                    target,
                    request.explode,
                    request.fixed_direction,
                    now,
                )
            }
            GraphicEffectType::Lightning => {
                let source = EffectEndpoint::resolve(request.source, request.source_position, locator);
                GameEffect::lightning(request.hue, source, now)
            }
            GraphicEffectType::FixedXYZ => GameEffect::animated(
                request.graphic,
                request.hue,
                EffectEndpoint::Fixed(request.source_position),
                request.duration,
                now,
            ),
            GraphicEffectType::FixedFrom => {
                let source = EffectEndpoint::resolve(request.source, request.source_position, locator);
                GameEffect::animated(request.graphic, request.hue, source, request.duration, now)
            }
            GraphicEffectType::ScreenFade | GraphicEffectType::Nothing => {
                log::debug!("ignoring {:?} effect", request.kind);
                return false;
            }
        };

        log::debug!("spawned {:?} effect {:#06x}", request.kind, request.graphic);
        self.effects.push(effect);
        true
    }

    /// Advance every effect, reap the finished ones and adopt their children
    pub fn update(&mut self, total_ms: u64, frame_ms: u64, ctx: &EffectContext<'_>) {
        let mut promoted = Vec::new();

        self.effects.retain_mut(|effect| {
            effect.update(total_ms, frame_ms, ctx);
            if effect.is_disposed() {
                promoted.append(&mut effect.take_children());
                false
            } else {
                true
            }
        });

        if !promoted.is_empty() {
            log::debug!("promoting {} child effects", promoted.len());
            self.effects.append(&mut promoted);
        }
    }

    /// Dispose and drop every effect
    pub fn clear(&mut self) {
        for effect in &mut self.effects {
            effect.dispose();
        }
        self.effects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::{AnimationLibrary, EntityHandle};
    use crate::game::effects::effect::{EffectKind, EXPLOSION_GRAPHIC};

    struct Nobody;

    impl EntityLocator for Nobody {
        fn handle_of(&self, _serial: Serial) -> Option<EntityHandle> {
            None
        }

        fn locate(&self, _handle: EntityHandle) -> Option<Position> {
            None
        }
    }

    fn request(kind: GraphicEffectType) -> EffectRequest {
        EffectRequest {
            kind,
            source: Serial::INVALID,
            target: Serial::INVALID,
            graphic: 0x36D4,
            hue: 0,
            source_position: Position::new(0, 0, 0),
            target_position: Position::new(2, 0, 0),
            duration: 1000,
            fixed_direction: false,
            explode: true,
        }
    }

    #[test]
    fn test_spawn_maps_kinds() {
        let mut manager = EffectManager::new();
        assert!(manager.spawn(&request(GraphicEffectType::Moving), 0, &Nobody));
        assert!(manager.spawn(&request(GraphicEffectType::Lightning), 0, &Nobody));
        assert!(manager.spawn(&request(GraphicEffectType::FixedXYZ), 0, &Nobody));
        assert!(manager.spawn(&request(GraphicEffectType::FixedFrom), 0, &Nobody));
        assert!(!manager.spawn(&request(GraphicEffectType::ScreenFade), 0, &Nobody));
        assert!(!manager.spawn(&request(GraphicEffectType::Nothing), 0, &Nobody));
        assert_eq!(manager.len(), 4);

        let kinds: Vec<_> = manager.iter().map(|e| e.kind().clone()).collect();
        assert!(matches!(kinds[0], EffectKind::Moving { .. }));
        assert!(matches!(kinds[1], EffectKind::Lightning { .. }));
        assert_eq!(kinds[2], EffectKind::Animated);
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(GraphicEffectType::from_raw(3), Some(GraphicEffectType::FixedFrom));
        assert_eq!(GraphicEffectType::from_raw(9), None);
    }

    #[test]
    fn test_children_start_next_tick() {
        let library = AnimationLibrary::new();
        let ctx = EffectContext {
            locator: &Nobody,
            data: &library,
        };
        let mut manager = EffectManager::new();
        manager.spawn(&request(GraphicEffectType::Moving), 0, &Nobody);

        // Two tiles take 150 ms
        manager.update(100, 100, &ctx);
        assert_eq!(manager.len(), 1);

        manager.update(200, 100, &ctx);
        assert_eq!(manager.len(), 1);
        let blast = manager.iter().next().unwrap();
        assert_eq!(blast.graphic(), EXPLOSION_GRAPHIC);
        assert!(!blast.is_disposed());

        // Blast lives 400 ms from the hit
        manager.update(599, 50, &ctx);
        assert_eq!(manager.len(), 1);
        manager.update(600, 1, &ctx);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_disposed_effects_are_reaped() {
        let library = AnimationLibrary::new();
        let ctx = EffectContext {
            locator: &Nobody,
            data: &library,
        };
        let mut manager = EffectManager::new();
        manager.add(GameEffect::animated(1, 0, EffectEndpoint::Fixed(Position::default()), 100, 0));
        manager.add(GameEffect::animated(2, 0, EffectEndpoint::Fixed(Position::default()), -1, 0));

        manager.update(100, 100, &ctx);
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.iter().next().map(|e| e.base_graphic()), Some(2));

        manager.clear();
        assert!(manager.is_empty());
    }
}
