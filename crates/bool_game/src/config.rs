//! Game settings from `assets/game.json`. Every field has a default, so a
//! partial file only overrides what it names.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use bool_core::time::DEFAULT_TICK_RATE_HZ;
use glam::{IVec2, UVec2};

pub const DEFAULT_CONFIG_PATH: &str = "assets/game.json";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub title: String,
    pub tick_rate_hz: u32,
    /// Visible area in tiles.
    pub viewport_tiles: [u32; 2],
    /// Integer upscale from world pixels to screen pixels.
    pub scale: u32,
    pub clamp_camera: bool,
    /// Start with the debug overlay visible.
    pub debug: bool,
    pub start_tile: [i32; 2],
    pub level: PathBuf,
    pub actor_sheet: Option<PathBuf>,
    pub door_sheet: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Bool".to_string(),
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            viewport_tiles: [13, 10],
            scale: 2,
            clamp_camera: false,
            debug: false,
            start_tile: [0, 0],
            level: PathBuf::from("assets/levels/demo.json"),
            actor_sheet: None,
            door_sheet: None,
        }
    }
}

impl GameConfig {
    pub fn viewport_tiles(&self) -> UVec2 {
        UVec2::from(self.viewport_tiles)
    }

    pub fn start_tile(&self) -> IVec2 {
        IVec2::from(self.start_tile)
    }
}

/// Load settings, falling back to defaults when the file does not exist.
/// A file that exists but does not parse or validate is an error.
pub fn load_config_or_default(path: &Path) -> Result<GameConfig, String> {
    if !path.exists() {
        log::warn!(
            "Config file {} not found; using defaults",
            path.display()
        );
        return Ok(GameConfig::default());
    }
    load_config_from_path(path)
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.tick_rate_hz == 0 {
        return Err("Config validation failed: tick_rate_hz must be > 0".to_string());
    }
    if config.scale == 0 {
        return Err("Config validation failed: scale must be >= 1".to_string());
    }
    if config.viewport_tiles.contains(&0) {
        return Err(format!(
            "Config validation failed: viewport_tiles must be non-zero, got {:?}",
            config.viewport_tiles
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "bool_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_file_path("partial");
        fs::write(&path, r#"{ "scale": 3, "clamp_camera": true }"#).expect("write config");

        let config = load_config_from_path(&path).expect("config should parse");
        assert_eq!(config.scale, 3);
        assert!(config.clamp_camera);
        assert_eq!(config.title, "Bool");
        assert_eq!(config.tick_rate_hz, 30);
        assert_eq!(config.viewport_tiles(), UVec2::new(13, 10));
        assert!(config.actor_sheet.is_none());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let path = temp_file_path("missing");
        let config = load_config_or_default(&path).expect("defaults");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_file_path("malformed");
        fs::write(&path, "{ scale: ").expect("write config");
        let err = load_config_or_default(&path).expect_err("malformed config should fail");
        assert!(err.contains("Failed to parse config JSON"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_zero_scale_and_tick_rate() {
        let path = temp_file_path("zero");
        fs::write(&path, r#"{ "scale": 0 }"#).expect("write config");
        let err = load_config_from_path(&path).expect_err("zero scale should fail");
        assert!(err.contains("scale"));

        fs::write(&path, r#"{ "tick_rate_hz": 0 }"#).expect("write config");
        let err = load_config_from_path(&path).expect_err("zero tick rate should fail");
        assert!(err.contains("tick_rate_hz"));

        fs::write(&path, r#"{ "viewport_tiles": [0, 4] }"#).expect("write config");
        let err = load_config_from_path(&path).expect_err("empty viewport should fail");
        assert!(err.contains("viewport_tiles"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn default_start_and_viewport() {
        let config = GameConfig::default();
        assert_eq!(config.viewport_tiles(), UVec2::new(13, 10));
        assert_eq!(config.start_tile(), IVec2::ZERO);
    }
}
