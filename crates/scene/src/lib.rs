pub mod components;
pub mod data;
pub mod entity;
pub mod palette;
pub mod prefabs;
pub mod texture;
pub mod world;

pub use world::*;
