//! Tile grid world model: three tile-id layers plus the doors, and the single
//! authority on whether a tile blocks movement.
//!
//! Doors live in a dense arena (`Vec<Door>`) addressed through a tile -> slot
//! map, so the per-tick advance pass is a linear walk and lookups stay O(1).

use std::collections::HashMap;

use glam::IVec2;

use crate::door::{Door, InvalidTransition};

/// Tile id meaning "nothing here".
pub const EMPTY_TILE: u32 = 0;

/// One row-major layer of tile ids covering the whole grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    width: i32,
    data: Vec<u32>,
}

impl Layer {
    pub fn new(width: i32, data: Vec<u32>) -> Self {
        Self { width, data }
    }

    /// A layer with every tile empty.
    pub fn empty(width: i32, height: i32) -> Self {
        Self::new(width, vec![EMPTY_TILE; width.max(0) as usize * height.max(0) as usize])
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Tile id at `(x, y)`; callers must stay in bounds.
    pub fn get(&self, x: i32, y: i32) -> u32 {
        self.data[(y * self.width + x) as usize]
    }

    /// Non-empty tiles as `(tile, id)`, row by row.
    pub fn occupied(&self) -> impl Iterator<Item = (IVec2, u32)> + '_ {
        let width = self.width.max(1);
        self.data
            .iter()
            .enumerate()
            .filter(|(_, id)| **id != EMPTY_TILE)
            .map(move |(i, id)| {
                let i = i as i32;
                (IVec2::new(i % width, i / width), *id)
            })
    }
}

/// The three named layers every level provides.
#[derive(Debug, Clone)]
pub struct LayerSet {
    pub ground: Layer,
    pub foreground: Layer,
    pub objects: Layer,
}

#[derive(Debug, Clone)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tile_size: i32,
    layers: LayerSet,
    doors: Vec<Door>,
    door_slots: HashMap<IVec2, usize>,
}

impl TileGrid {
    pub fn new(
        width: i32,
        height: i32,
        tile_size: i32,
        layers: LayerSet,
        door_tiles: &[IVec2],
        door_frame_count: usize,
    ) -> Result<Self, String> {
        if width <= 0 || height <= 0 {
            return Err(format!("Tile grid must be non-empty, got {width}x{height}"));
        }
        if tile_size <= 0 {
            return Err(format!("Tile size must be > 0, got {tile_size}"));
        }
        let expected = width
            .checked_mul(height)
            .filter(|_| width.checked_mul(tile_size).is_some())
            .filter(|_| height.checked_mul(tile_size).is_some())
            .ok_or_else(|| {
                format!("Tile grid {width}x{height} of {tile_size}px tiles is too large")
            })? as usize;
        for (name, layer) in [
            ("Ground", &layers.ground),
            ("Foreground", &layers.foreground),
            ("Objects", &layers.objects),
        ] {
            if layer.len() != expected || layer.width != width {
                return Err(format!(
                    "Layer '{}' has {} tiles, expected {} ({}x{})",
                    name,
                    layer.len(),
                    expected,
                    width,
                    height
                ));
            }
        }

        let mut grid = Self {
            width,
            height,
            tile_size,
            layers,
            doors: Vec::with_capacity(door_tiles.len()),
            door_slots: HashMap::with_capacity(door_tiles.len()),
        };
        for &tile in door_tiles {
            if !grid.in_bounds(tile) {
                return Err(format!(
                    "Door at ({}, {}) is outside the {}x{} grid",
                    tile.x, tile.y, width, height
                ));
            }
            if grid.door_slots.contains_key(&tile) {
                return Err(format!("Duplicate door at ({}, {})", tile.x, tile.y));
            }
            grid.door_slots.insert(tile, grid.doors.len());
            grid.doors.push(Door::new(tile, door_frame_count));
        }
        Ok(grid)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    /// World size in pixels.
    pub fn pixel_size(&self) -> IVec2 {
        IVec2::new(self.width, self.height) * self.tile_size
    }

    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    pub fn in_bounds(&self, tile: IVec2) -> bool {
        tile.x >= 0 && tile.x < self.width && tile.y >= 0 && tile.y < self.height
    }

    /// Whether moving onto `tile` is blocked: off the grid, an occupied object
    /// tile, or a door that is not fully open.
    pub fn would_collide(&self, tile: IVec2) -> bool {
        if !self.in_bounds(tile) {
            return true;
        }
        if self.layers.objects.get(tile.x, tile.y) != EMPTY_TILE {
            return true;
        }
        match self.door_at(tile) {
            Some(door) => !door.is_passable(),
            None => false,
        }
    }

    pub fn door_at(&self, tile: IVec2) -> Option<&Door> {
        self.door_slots.get(&tile).map(|&slot| &self.doors[slot])
    }

    pub fn has_door(&self, tile: IVec2) -> bool {
        self.door_slots.contains_key(&tile)
    }

    /// Toggle the door on `tile`. Returns `None` when there is no door there.
    pub fn toggle_door(&mut self, tile: IVec2) -> Option<Result<(), InvalidTransition>> {
        let slot = *self.door_slots.get(&tile)?;
        let door = &mut self.doors[slot];
        let result = door.toggle();
        match &result {
            Ok(()) => log::debug!(
                "Door ({}, {}) toggled -> {}",
                tile.x,
                tile.y,
                door.state()
            ),
            Err(err) => log::debug!("Door ({}, {}): {}", tile.x, tile.y, err),
        }
        Some(result)
    }

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    /// Advance every door by one animation tick.
    pub fn advance(&mut self) {
        for door in &mut self.doors {
            let before = door.state();
            door.advance();
            if door.state() != before {
                log::debug!(
                    "Door ({}, {}) {} -> {}",
                    door.position().x,
                    door.position().y,
                    before,
                    door.state()
                );
            }
        }
    }
}
