pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod locomotion;
pub mod player;
pub mod scene;
pub mod types;
