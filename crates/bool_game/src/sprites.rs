//! Sprite provider: slices PNG sheets into the immutable tables the actor,
//! doors and tile layers draw from, or generates placeholder art of the same
//! shapes when no sheet is configured.

use std::path::Path;

use bool_core::sprites::{ActorSprites, Frames};
use bool_render::image::{Image, Rgba, TRANSPARENT};
use glam::IVec2;

/// Sheet background colour that becomes transparent when slicing.
pub const COLORKEY: Rgba = [0, 128, 255, 255];

const ACTOR_SHEET_GRID: (u32, u32) = (3, 4);
const DOOR_SHEET_GRID: (u32, u32) = (7, 4);
const DOOR_SHEET_ROW: usize = 4;
const PLACEHOLDER_WALK_FRAMES: usize = 4;
const PLACEHOLDER_DOOR_FRAMES: usize = 4;

/// Everything the scene renderer draws with.
#[derive(Debug, Clone)]
pub struct SpriteSet {
    pub actor: ActorSprites<Image>,
    pub door: Frames<Image>,
    pub tileset: Tileset,
}

/// Tile images indexed by tile id; id `g >= 1` maps to cell `g - 1`.
#[derive(Debug, Clone, Default)]
pub struct Tileset {
    tiles: Vec<Image>,
}

impl Tileset {
    pub fn new(tiles: Vec<Image>) -> Self {
        Self { tiles }
    }

    /// Cut `sheet` into `tile_size` cells, `columns` per row, row-major.
    pub fn from_sheet(sheet: &Image, tile_size: u32, columns: u32) -> Result<Self, String> {
        if tile_size == 0 || columns == 0 {
            return Err("Tileset needs a non-zero tile size and column count".to_string());
        }
        if columns * tile_size > sheet.width() {
            return Err(format!(
                "Tileset has {} columns of {}px but the image is only {}px wide",
                columns,
                tile_size,
                sheet.width()
            ));
        }
        let rows = sheet.height() / tile_size;
        let cell = IVec2::splat(tile_size as i32);
        let mut tiles = Vec::with_capacity((rows * columns) as usize);
        for row in 0..rows {
            for col in 0..columns {
                let origin = IVec2::new(col as i32, row as i32) * cell;
                tiles.push(crop(sheet, origin, cell));
            }
        }
        Ok(Self { tiles })
    }

    /// Solid-colour tiles for ids `1..=count`.
    pub fn placeholder(tile_size: u32, count: u32) -> Self {
        let tiles = (1..=count)
            .map(|gid| {
                let mut tile = Image::filled(tile_size, tile_size, palette(gid));
                tile.outline_rect(IVec2::ZERO, tile.size(), shade(palette(gid), 0.75));
                tile
            })
            .collect();
        Self { tiles }
    }

    pub fn get(&self, gid: u32) -> Option<&Image> {
        let index = gid.checked_sub(1)?;
        self.tiles.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

pub fn load_sheet(path: &Path) -> Result<Image, String> {
    let rgba = image::open(path)
        .map_err(|e| format!("Failed to load sprite sheet {}: {e}", path.display()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba.pixels().map(|p| p.0).collect();
    Image::from_pixels(width, height, pixels)
        .map_err(|e| format!("Invalid sprite sheet {}: {e}", path.display()))
}

/// Split `sheet` into `rows` x `cols` equal cells. Pixels matching `colorkey`
/// become transparent.
pub fn grid_split(
    sheet: &Image,
    rows: u32,
    cols: u32,
    colorkey: Option<Rgba>,
) -> Result<Vec<Vec<Image>>, String> {
    if rows == 0 || cols == 0 {
        return Err(format!("Cannot split a sheet into {rows}x{cols} cells"));
    }
    let cell = IVec2::new((sheet.width() / cols) as i32, (sheet.height() / rows) as i32);
    if cell.x == 0 || cell.y == 0 {
        return Err(format!(
            "Sheet {}x{} is too small for {}x{} cells",
            sheet.width(),
            sheet.height(),
            rows,
            cols
        ));
    }

    let mut grid = Vec::with_capacity(rows as usize);
    for row in 0..rows as i32 {
        let mut frames = Vec::with_capacity(cols as usize);
        for col in 0..cols as i32 {
            let mut frame = crop(sheet, IVec2::new(col, row) * cell, cell);
            if let Some(key) = colorkey {
                apply_colorkey(&mut frame, key);
            }
            frames.push(frame);
        }
        grid.push(frames);
    }
    Ok(grid)
}

/// Actor sheet layout: 3 rows x 4 columns, rows DOWN, RIGHT, UP. LEFT is the
/// RIGHT row mirrored.
pub fn actor_sprites_from_sheet(sheet: &Image) -> Result<ActorSprites<Image>, String> {
    let (rows, cols) = ACTOR_SHEET_GRID;
    let mut grid = grid_split(sheet, rows, cols, Some(COLORKEY))?.into_iter();
    let (Some(down), Some(right), Some(up)) = (grid.next(), grid.next(), grid.next()) else {
        return Err("Actor sheet is missing a direction row".to_string());
    };
    let left = right.iter().map(Image::flipped_horizontal).collect();
    ActorSprites::new(
        Frames::new(up)?,
        Frames::new(down)?,
        Frames::new(left)?,
        Frames::new(right)?,
    )
}

/// Door sheet layout: 7 rows x 4 columns; the door animation is row 4.
pub fn door_frames_from_sheet(sheet: &Image) -> Result<Frames<Image>, String> {
    let (rows, cols) = DOOR_SHEET_GRID;
    let row = grid_split(sheet, rows, cols, Some(COLORKEY))?
        .into_iter()
        .nth(DOOR_SHEET_ROW)
        .ok_or_else(|| "Door sheet has no door row".to_string())?;
    Frames::door(row)
}

/// Box-shaped walker, one tile wide and a tile and a half tall, with a marker
/// on the side it faces. Odd frames are shaded to show the walk cycle.
pub fn placeholder_actor(tile_size: u32) -> Result<ActorSprites<Image>, String> {
    let size = IVec2::new(tile_size as i32, (tile_size + tile_size / 2) as i32);
    let body: Rgba = [224, 196, 120, 255];
    let marker: Rgba = [40, 40, 60, 255];

    let cycle = |dir_marker: IVec2| -> Result<Frames<Image>, String> {
        let frames = (0..PLACEHOLDER_WALK_FRAMES)
            .map(|frame| {
                let color = if frame % 2 == 0 { body } else { shade(body, 0.85) };
                let mut img = Image::new(size.x as u32, size.y as u32);
                let inset = IVec2::new(2, 1);
                for y in inset.y..size.y - inset.y {
                    for x in inset.x..size.x - inset.x {
                        img.set_pixel(x, y, color);
                    }
                }
                let mark = size / 2 + dir_marker * (size.x / 4);
                for y in -1..=1 {
                    for x in -1..=1 {
                        img.set_pixel(mark.x + x, mark.y + y, marker);
                    }
                }
                img
            })
            .collect();
        Frames::new(frames)
    };

    ActorSprites::new(
        cycle(IVec2::new(0, -1))?,
        cycle(IVec2::new(0, 1))?,
        cycle(IVec2::new(-1, 0))?,
        cycle(IVec2::new(1, 0))?,
    )
}

/// Brown door panel that slides up as the frame index grows; the last frame
/// leaves only the frame outline.
pub fn placeholder_door(tile_size: u32) -> Result<Frames<Image>, String> {
    let wood: Rgba = [130, 82, 45, 255];
    let frame_color: Rgba = [70, 45, 25, 255];
    let last = (PLACEHOLDER_DOOR_FRAMES - 1) as u32;
    let frames = (0..=last)
        .map(|frame| {
            let mut img = Image::new(tile_size, tile_size);
            let panel_height = tile_size * (last - frame) / last;
            for y in 0..panel_height as i32 {
                for x in 0..tile_size as i32 {
                    img.set_pixel(x, y, wood);
                }
            }
            img.outline_rect(IVec2::ZERO, img.size(), frame_color);
            img
        })
        .collect();
    Frames::door(frames)
}

fn crop(src: &Image, origin: IVec2, size: IVec2) -> Image {
    let mut out = Image::new(size.x as u32, size.y as u32);
    out.copy_window(src, origin, TRANSPARENT);
    out
}

fn apply_colorkey(image: &mut Image, key: Rgba) {
    for y in 0..image.height() as i32 {
        for x in 0..image.width() as i32 {
            if image.pixel(x, y) == Some(key) {
                image.set_pixel(x, y, TRANSPARENT);
            }
        }
    }
}

fn palette(gid: u32) -> Rgba {
    const COLORS: [Rgba; 8] = [
        [86, 156, 72, 255],
        [120, 184, 96, 255],
        [150, 130, 90, 255],
        [96, 96, 110, 255],
        [60, 110, 170, 255],
        [40, 100, 50, 255],
        [180, 170, 140, 255],
        [130, 60, 60, 255],
    ];
    COLORS[(gid.saturating_sub(1) as usize) % COLORS.len()]
}

fn shade(color: Rgba, factor: f32) -> Rgba {
    let scale = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
    [scale(color[0]), scale(color[1]), scale(color[2]), color[3]]
}
