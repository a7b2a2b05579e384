use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/playground.json";
pub const CONFIG_PATH_ENV: &str = "PLAYGROUND_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top level config file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub locomotion: LocomotionConfig,
    pub level: LevelConfig,
    pub debug: DebugConfig,
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Reads the file named by `PLAYGROUND_CONFIG`, or the default path.
    /// Falls back to built-in values when the file is missing or malformed.
    pub fn load_or_default() -> Self {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match Self::load(&path) {
            Ok(config) => {
                info!("loaded config from {path}");
                config
            }
            Err(err) => {
                warn!("using default config, could not read {path}: {err}");
                Self::default()
            }
        }
    }
}

/// Tuning for the player controller. Impulses are in engine units applied at
/// the body's centre.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub step_impulse: f32,
    pub flap_horizontal_impulse: f32,
    pub flap_vertical_impulse: f32,
    pub reversing_boost: f32,
    /// Horizontal speed above which walking stops adding impulses.
    pub speed_cap: f32,
    /// Contacts at a vertical speed at or above this are treated as bounces.
    pub grounding_speed: f32,
    pub sliding_friction: f32,
    pub resting_friction: f32,
    pub repeat_period_ms: u64,
    pub egg_launch_offset: f32,
    pub egg_launch_impulse: f32,
}

impl LocomotionConfig {
    pub fn repeat_period(&self) -> Duration {
        Duration::from_millis(self.repeat_period_ms)
    }
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        LocomotionConfig {
            step_impulse: 1.0,
            flap_horizontal_impulse: 0.7,
            flap_vertical_impulse: 1.0,
            reversing_boost: 2.0,
            speed_cap: 7.0,
            grounding_speed: 4.0,
            sliding_friction: 0.1,
            resting_friction: 1.0,
            repeat_period_ms: 200,
            egg_launch_offset: 5.0,
            egg_launch_impulse: 20.0,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub platform_width: f32,
    pub platform_height: f32,
    pub player_spawn: [f32; 3],
    pub player_diameter: f32,
    pub player_mass: f32,
    pub egg_spawn: [f32; 3],
    pub egg_diameter: f32,
    pub egg_mass: f32,
    /// glTF scene for the character, e.g. `models/bird.glb#Scene0`.
    pub player_model: Option<String>,
    /// Back wall images. The roughness map follows the glTF layout, roughness
    /// in green and metallic in blue.
    pub back_wall_texture: Option<String>,
    pub back_wall_normal_map: Option<String>,
    pub back_wall_roughness_map: Option<String>,
    /// World size of one repeat of the back wall textures.
    pub back_wall_tile_size: f32,
    pub camera_distance: f32,
    pub camera_fov: f32,
    pub camera_easing: f32,
}

impl LevelConfig {
    /// Local offset of a carried egg from the player's centre.
    pub fn egg_carry_offset(&self) -> Vec3 {
        Vec3::X * (self.player_diameter + self.egg_diameter) / 2.0
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        LevelConfig {
            width: 150.0,
            height: 40.0,
            depth: 4.0,
            platform_width: 20.0,
            platform_height: 10.0,
            player_spawn: [0.0, 2.0, 0.0],
            player_diameter: 2.0,
            player_mass: 0.2,
            egg_spawn: [0.0, 12.0, 0.0],
            egg_diameter: 1.5,
            egg_mass: 1.0,
            player_model: None,
            back_wall_texture: None,
            back_wall_normal_map: None,
            back_wall_roughness_map: None,
            back_wall_tile_size: 20.0,
            camera_distance: 60.0,
            camera_fov: 0.6,
            camera_easing: 4.0,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub inspector: bool,
    pub physics_wireframes: bool,
    pub show_world_axis: bool,
    pub world_axis_size: f32,
}

impl Default for DebugConfig {
    fn default() -> Self {
        DebugConfig {
            inspector: false,
            physics_wireframes: false,
            show_world_axis: false,
            world_axis_size: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "locomotion": { "speed_cap": 9.5 } }"#).unwrap();
        assert_eq!(config.locomotion.speed_cap, 9.5);
        assert_eq!(config.locomotion.repeat_period(), Duration::from_millis(200));
        assert_eq!(config.level, LevelConfig::default());
    }

    #[test]
    fn back_wall_maps_are_optional() {
        let config: GameConfig = serde_json::from_str(
            r#"{ "level": {
                "back_wall_texture": "textures/bricks_albedo.png",
                "back_wall_normal_map": "textures/bricks_normal.png"
            } }"#,
        )
        .unwrap();
        assert_eq!(
            config.level.back_wall_normal_map.as_deref(),
            Some("textures/bricks_normal.png")
        );
        assert_eq!(config.level.back_wall_roughness_map, None);
        assert_eq!(config.level.back_wall_tile_size, 20.0);
    }

    #[test]
    fn egg_rides_beside_the_player() {
        let level = LevelConfig::default();
        assert_eq!(level.egg_carry_offset(), Vec3::new(1.75, 0.0, 0.0));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GameConfig::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn shipped_config_parses() {
        let config = GameConfig::load(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/config/playground.json"
        ))
        .unwrap();
        assert_eq!(config.locomotion, LocomotionConfig::default());
    }
}
