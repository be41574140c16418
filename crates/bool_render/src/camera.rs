use glam::{IVec2, UVec2};

use crate::image::{Image, Rgba, BLACK};

/// Pixel-space window into the world, recentred on a target every tick.
///
/// `position` is the top-left of the visible region in world pixels. The view
/// is `viewport_tiles * tile_size` world pixels, scaled by `scale` on screen.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: IVec2,
    pub viewport_tiles: UVec2,
    pub tile_size: u32,
    pub scale: u32,
    pub clamp_to_world: bool,
}

impl Camera {
    pub fn new(viewport_tiles: UVec2, tile_size: u32, scale: u32) -> Self {
        Self {
            position: IVec2::ZERO,
            viewport_tiles,
            tile_size,
            scale: scale.max(1),
            clamp_to_world: false,
        }
    }

    /// Visible region size in world pixels.
    pub fn viewport_px(&self) -> IVec2 {
        (self.viewport_tiles * self.tile_size).as_ivec2()
    }

    /// Final framebuffer size in screen pixels.
    pub fn screen_px(&self) -> UVec2 {
        self.viewport_tiles * self.tile_size * self.scale
    }

    /// Centre the view on `target` (world pixels). With clamping on, the view is
    /// kept inside `world_px`; a world smaller than the view pins to the origin.
    pub fn follow(&mut self, target: IVec2, world_px: IVec2) {
        let mut position = target - self.viewport_px() / 2;
        if self.clamp_to_world {
            let max = (world_px - self.viewport_px()).max(IVec2::ZERO);
            position = position.clamp(IVec2::ZERO, max);
        }
        self.position = position;
    }

    /// Copy the visible region of `world` into `view` (viewport sized).
    pub fn extract(&self, world: &Image, view: &mut Image) {
        self.extract_with(world, view, BLACK);
    }

    pub fn extract_with(&self, world: &Image, view: &mut Image, outside: Rgba) {
        view.copy_window(world, self.position, outside);
    }

    /// Extract the visible region and scale it into the screen framebuffer.
    pub fn present(&self, world: &Image, view: &mut Image, screen: &mut Image) {
        self.extract(world, view);
        view.scale_into(self.scale, screen);
    }

    /// World pixel under a framebuffer pixel.
    pub fn screen_to_world(&self, screen: IVec2) -> IVec2 {
        screen.div_euclid(IVec2::splat(self.scale as i32)) + self.position
    }

    /// Tile coordinate under a framebuffer pixel.
    pub fn screen_to_tile(&self, screen: IVec2) -> IVec2 {
        self.screen_to_world(screen)
            .div_euclid(IVec2::splat(self.tile_size.max(1) as i32))
    }
}
