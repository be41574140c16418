//! Map provider: JSON level files describing the tile layers, door spawns and
//! tileset of one map.
//!
//! Door spawns are authored in pixel coordinates (the way map editors place
//! objects) and converted to tiles by dividing by `tile_size`.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use glam::IVec2;

use crate::world::{Layer, LayerSet, TileGrid};

pub const GROUND_LAYER: &str = "Ground";
pub const FOREGROUND_LAYER: &str = "Foreground";
pub const OBJECTS_LAYER: &str = "Objects";

const REQUIRED_LAYERS: [&str; 3] = [GROUND_LAYER, FOREGROUND_LAYER, OBJECTS_LAYER];

#[derive(Debug, Deserialize, Clone)]
pub struct LevelFile {
    pub width: i32,
    pub height: i32,
    pub tile_size: i32,
    pub layers: Vec<LevelLayer>,
    #[serde(default)]
    pub doors: Vec<DoorSpawn>,
    #[serde(default)]
    pub tileset: Option<TilesetRef>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LevelLayer {
    pub name: String,
    pub data: Vec<u32>,
}

/// Door position in pixels.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct DoorSpawn {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TilesetRef {
    /// Image path, relative to the level file.
    pub image: String,
    pub columns: u32,
}

impl LevelFile {
    pub fn layer(&self, name: &str) -> Option<&LevelLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub fn door_tiles(&self) -> Vec<IVec2> {
        let tile_size = self.tile_size.max(1);
        self.doors
            .iter()
            .map(|door| IVec2::new(door.x, door.y).div_euclid(IVec2::splat(tile_size)))
            .collect()
    }

    /// Highest tile id referenced by any layer.
    pub fn max_tile_id(&self) -> u32 {
        self.layers
            .iter()
            .flat_map(|layer| layer.data.iter().copied())
            .max()
            .unwrap_or(0)
    }

    pub fn layer_set(&self) -> Result<LayerSet, String> {
        let take = |name: &str| {
            self.layer(name)
                .map(|layer| Layer::new(self.width, layer.data.clone()))
                .ok_or_else(|| format!("Level is missing layer '{name}'"))
        };
        Ok(LayerSet {
            ground: take(GROUND_LAYER)?,
            foreground: take(FOREGROUND_LAYER)?,
            objects: take(OBJECTS_LAYER)?,
        })
    }

    pub fn build_grid(&self, door_frame_count: usize) -> Result<TileGrid, String> {
        TileGrid::new(
            self.width,
            self.height,
            self.tile_size,
            self.layer_set()?,
            &self.door_tiles(),
            door_frame_count,
        )
    }
}

/// Resolve a tileset image path against the directory holding the level file.
pub fn tileset_path(level_path: &Path, tileset: &TilesetRef) -> PathBuf {
    match level_path.parent() {
        Some(dir) => dir.join(&tileset.image),
        None => PathBuf::from(&tileset.image),
    }
}

/// Polls a level file's modification time so edits can be picked up live.
pub struct LevelWatcher {
    level_path: PathBuf,
    last_seen_modified: Option<SystemTime>,
}

impl LevelWatcher {
    pub fn new(level_path: PathBuf) -> Self {
        let last_seen_modified = modified_time(&level_path);
        Self {
            level_path,
            last_seen_modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.level_path
    }

    pub fn should_reload(&mut self) -> bool {
        let current = modified_time(&self.level_path);
        match (self.last_seen_modified, current) {
            (Some(old), Some(now)) if now > old => {
                self.last_seen_modified = Some(now);
                true
            }
            (None, Some(now)) => {
                self.last_seen_modified = Some(now);
                true
            }
            _ => false,
        }
    }
}

pub fn load_level_from_path(level_path: &Path) -> Result<LevelFile, String> {
    let raw = fs::read_to_string(level_path)
        .map_err(|e| format!("Failed to read level file {}: {e}", level_path.display()))?;
    let level: LevelFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse level JSON {}: {e}", level_path.display()))?;
    validate_level(&level)?;
    Ok(level)
}

fn validate_level(level: &LevelFile) -> Result<(), String> {
    if level.width <= 0 || level.height <= 0 {
        return Err(format!(
            "Level validation failed: size must be non-zero, got {}x{}",
            level.width, level.height
        ));
    }
    if level.tile_size <= 0 {
        return Err(format!(
            "Level validation failed: tile_size must be > 0, got {}",
            level.tile_size
        ));
    }

    let too_large = || {
        format!(
            "Level validation failed: {}x{} tiles of {}px is too large",
            level.width, level.height, level.tile_size
        )
    };
    let expected = level
        .width
        .checked_mul(level.height)
        .ok_or_else(too_large)? as usize;
    if level.width.checked_mul(level.tile_size).is_none()
        || level.height.checked_mul(level.tile_size).is_none()
    {
        return Err(too_large());
    }

    let mut names = HashSet::new();
    for layer in &level.layers {
        if !names.insert(layer.name.as_str()) {
            return Err(format!(
                "Level validation failed: duplicate layer name '{}'",
                layer.name
            ));
        }
        if layer.data.len() != expected {
            return Err(format!(
                "Level validation failed: layer '{}' has {} tiles, expected {}",
                layer.name,
                layer.data.len(),
                expected
            ));
        }
        if !REQUIRED_LAYERS.contains(&layer.name.as_str()) {
            log::warn!("Level layer '{}' is not drawn and will be ignored", layer.name);
        }
    }
    for required in REQUIRED_LAYERS {
        if !names.contains(required) {
            return Err(format!(
                "Level validation failed: missing layer '{required}'"
            ));
        }
    }

    let mut door_tiles = HashSet::new();
    for (spawn, tile) in level.doors.iter().zip(level.door_tiles()) {
        if tile.x < 0 || tile.y < 0 || tile.x >= level.width || tile.y >= level.height {
            return Err(format!(
                "Level validation failed: door at ({}, {}) px is outside the map",
                spawn.x, spawn.y
            ));
        }
        if !door_tiles.insert(tile) {
            return Err(format!(
                "Level validation failed: two doors on tile ({}, {})",
                tile.x, tile.y
            ));
        }
    }

    if let Some(tileset) = &level.tileset {
        if tileset.columns == 0 {
            return Err("Level validation failed: tileset columns must be > 0".to_string());
        }
    }

    Ok(())
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}
