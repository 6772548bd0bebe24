// Visual effects and their manager

pub mod effect;
pub mod manager;

pub use effect::{EffectContext, EffectEndpoint, EffectKind, GameEffect};
pub use manager::{EffectManager, EffectRequest, GraphicEffectType};
