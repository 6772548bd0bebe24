// World objects: the positional base, entities, items, multis and map art

pub mod entity;
pub mod game_object;
pub mod item;
pub mod multi;
pub mod statics;

pub use entity::{Delta, Entity, EntityChange, EntityFlags, Property};
pub use game_object::{GameObject, TextOverhead, View, ViewKind, WorldObject};
pub use item::{mount_body, Item, Layer, SpellBookType, SpellCircle, LAYER_COUNT};
pub use multi::{House, Multi, MultiComponent};
pub use statics::{Land, Static};
