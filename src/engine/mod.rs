// Engine modules: simulation clock, settings, resource providers

pub mod assets;
pub mod config;
pub mod game_loop;
