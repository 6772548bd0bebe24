// World state: entity registries, the tile map and the world context

pub mod collection;
pub mod map;
pub mod services;
pub mod world;

pub use collection::{CollectionChange, EntityCollection, HasSerial, Shared};
pub use map::{Tile, TileMap};
pub use services::{
    ContainerLookup, EntityLocator, OpenTerrain, Pathfinder, WalkRequestSender, WalkTarget,
};
pub use world::{World, WorldEvent};
