// Client-side world model: game objects, movement, animation and effects

pub mod core;
pub mod engine;
pub mod game;
