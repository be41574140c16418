//! Scene composition. The whole world is drawn back to front into an offscreen
//! world-sized buffer, then the camera cuts the viewport out of it and scales
//! that into the framebuffer:
//!
//!   ground -> objects -> doors -> actor -> foreground
//!
//! Debug outlines are drawn into the world buffer so they scroll and scale
//! with everything else.

use std::collections::HashSet;

use bool_render::image::{Image, Rgba, BLACK};
use bool_render::Camera;
use glam::IVec2;

use crate::actor::Actor;
use crate::sprites::{SpriteSet, Tileset};
use crate::world::{Layer, TileGrid};

pub const OBJECT_OUTLINE: Rgba = [255, 0, 0, 255];
pub const ACTOR_BOUNDS: Rgba = [255, 0, 255, 255];
pub const ACTOR_TILE: Rgba = [255, 0, 0, 255];

pub struct SceneRenderer {
    world: Image,
    view: Image,
    screen: Image,
    /// Tile ids already reported as having no image.
    missing_tiles: HashSet<u32>,
}

impl SceneRenderer {
    pub fn new(world_px: IVec2, camera: &Camera) -> Self {
        let view = camera.viewport_px();
        let screen = camera.screen_px();
        Self {
            world: Image::filled(world_px.x.max(0) as u32, world_px.y.max(0) as u32, BLACK),
            view: Image::filled(view.x as u32, view.y as u32, BLACK),
            screen: Image::filled(screen.x, screen.y, BLACK),
            missing_tiles: HashSet::new(),
        }
    }

    pub fn world(&self) -> &Image {
        &self.world
    }

    /// Fill the framebuffer with one colour, skipping the world entirely.
    pub fn clear_screen(&mut self, color: Rgba) -> &Image {
        self.screen.fill(color);
        &self.screen
    }

    /// Compose one frame and return the scaled framebuffer.
    pub fn render(
        &mut self,
        grid: &TileGrid,
        actor: &Actor,
        camera: &Camera,
        sprites: &SpriteSet,
        debug: bool,
    ) -> &Image {
        self.compose_world(grid, actor, sprites, debug);
        camera.present(&self.world, &mut self.view, &mut self.screen);
        &self.screen
    }

    fn compose_world(
        &mut self,
        grid: &TileGrid,
        actor: &Actor,
        sprites: &SpriteSet,
        debug: bool,
    ) {
        let tile_size = grid.tile_size();
        let layers = grid.layers();
        self.world.fill(BLACK);

        self.draw_layer(&layers.ground, &sprites.tileset, tile_size, None);
        let outline = debug.then_some(OBJECT_OUTLINE);
        self.draw_layer(&layers.objects, &sprites.tileset, tile_size, outline);

        for door in grid.doors() {
            let frame = sprites.door.get(door.current_frame());
            self.world.blit(frame, door.position() * tile_size);
        }

        let sprite = actor.view(&sprites.actor);
        let origin = actor_sprite_origin(actor.pixel_pos(), tile_size, sprite.height() as i32);
        self.world.blit(sprite, origin);

        self.draw_layer(&layers.foreground, &sprites.tileset, tile_size, None);

        if debug {
            self.world.outline_rect(origin, sprite.size(), ACTOR_BOUNDS);
            self.world.outline_rect(
                actor.tile_pos() * tile_size,
                IVec2::splat(tile_size),
                ACTOR_TILE,
            );
        }
    }

    fn draw_layer(
        &mut self,
        layer: &Layer,
        tileset: &Tileset,
        tile_size: i32,
        outline: Option<Rgba>,
    ) {
        for (tile, gid) in layer.occupied() {
            let pos = tile * tile_size;
            match tileset.get(gid) {
                Some(image) => self.world.blit(image, pos),
                None => {
                    if self.missing_tiles.insert(gid) {
                        log::warn!("No image for tile id {gid}; skipping");
                    }
                }
            }
            if let Some(color) = outline {
                self.world.outline_rect(pos, IVec2::splat(tile_size), color);
            }
        }
    }
}

/// Top-left for an actor sprite so its bottom edge sits on the bottom of the
/// actor's tile cell. Taller sprites overhang the tile above.
pub fn actor_sprite_origin(actor_px: IVec2, tile_size: i32, sprite_height: i32) -> IVec2 {
    IVec2::new(actor_px.x, actor_px.y + tile_size - sprite_height)
}
