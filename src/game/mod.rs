// Game model
//
// - objects: positioned world objects, entities and items
// - mobiles: animated actors, step queues and the local player
// - effects: transient visual effects and their manager
// - world: entity registries, the tile map and the world context

pub mod effects;
pub mod error;
pub mod mobiles;
pub mod objects;
pub mod world;

pub use error::WorldError;
