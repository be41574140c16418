//! CPU-side RGBA pixel buffers.
//!
//! Every sprite, tile, the offscreen world buffer and the final framebuffer are
//! an [`Image`]. Blits treat a texel with alpha 0 as transparent; everything
//! else is copied opaque. All drawing clips against the destination bounds, so
//! callers may pass positions partially or fully outside the buffer.

use glam::IVec2;

pub type Rgba = [u8; 4];

pub const BLACK: Rgba = [0, 0, 0, 255];
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Image {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width as usize) * (height as usize)],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Result<Self, String> {
        let expected = (width as usize) * (height as usize);
        if pixels.len() != expected {
            return Err(format!(
                "Image {}x{} needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            ));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width as i32, self.height as i32)
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA8 bytes, row-major, ready for a texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index_of(x, y).map(|i| self.pixels[i])
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = self.index_of(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Draw all of `src` with its top-left corner at `pos`.
    pub fn blit(&mut self, src: &Image, pos: IVec2) {
        self.blit_region(src, IVec2::ZERO, src.size(), pos);
    }

    /// Draw the `size` region of `src` starting at `src_origin` so that it lands
    /// at `dest`. Transparent source texels leave the destination untouched.
    pub fn blit_region(&mut self, src: &Image, src_origin: IVec2, size: IVec2, dest: IVec2) {
        for dy in 0..size.y {
            for dx in 0..size.x {
                let Some(color) = src.pixel(src_origin.x + dx, src_origin.y + dy) else {
                    continue;
                };
                if color[3] == 0 {
                    continue;
                }
                self.set_pixel(dest.x + dx, dest.y + dy, color);
            }
        }
    }

    /// Copy a `size` window of `src` starting at `src_origin` into the top-left
    /// of `self`, replacing every pixel. Texels outside `src` become `outside`.
    pub fn copy_window(&mut self, src: &Image, src_origin: IVec2, outside: Rgba) {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let color = src
                    .pixel(src_origin.x + x, src_origin.y + y)
                    .unwrap_or(outside);
                self.set_pixel(x, y, color);
            }
        }
    }

    /// One-pixel rectangle outline.
    pub fn outline_rect(&mut self, pos: IVec2, size: IVec2, color: Rgba) {
        if size.x <= 0 || size.y <= 0 {
            return;
        }
        let right = pos.x + size.x - 1;
        let bottom = pos.y + size.y - 1;
        for x in pos.x..=right {
            self.set_pixel(x, pos.y, color);
            self.set_pixel(x, bottom, color);
        }
        for y in pos.y..=bottom {
            self.set_pixel(pos.x, y, color);
            self.set_pixel(right, y, color);
        }
    }

    pub fn flipped_horizontal(&self) -> Image {
        let mut out = Image::new(self.width, self.height);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if let Some(color) = self.pixel(x, y) {
                    out.set_pixel(self.width as i32 - 1 - x, y, color);
                }
            }
        }
        out
    }

    /// Nearest-neighbour upscale of `self` by `factor` into `dest`, which must be
    /// exactly `factor` times larger on both axes.
    pub fn scale_into(&self, factor: u32, dest: &mut Image) {
        debug_assert_eq!(dest.width, self.width * factor);
        debug_assert_eq!(dest.height, self.height * factor);
        let factor = factor.max(1) as usize;
        let src_w = self.width as usize;
        let dest_w = dest.width as usize;
        for (sy, row) in self.pixels.chunks_exact(src_w.max(1)).enumerate() {
            for ry in 0..factor {
                let dest_row = (sy * factor + ry) * dest_w;
                let Some(line) = dest.pixels.get_mut(dest_row..dest_row + dest_w) else {
                    continue;
                };
                for (sx, color) in row.iter().enumerate() {
                    let start = sx * factor;
                    line[start..start + factor].fill(*color);
                }
            }
        }
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [255, 0, 0, 255];
    const GREEN: Rgba = [0, 255, 0, 255];

    #[test]
    fn from_pixels_checks_length() {
        let err = Image::from_pixels(2, 2, vec![RED; 3]).expect_err("short buffer should fail");
        assert!(err.contains("needs 4 pixels"));
    }

    #[test]
    fn blit_skips_transparent_texels() {
        let mut dest = Image::filled(3, 1, GREEN);
        let src = Image::from_pixels(2, 1, vec![RED, TRANSPARENT]).expect("valid image");
        dest.blit(&src, IVec2::new(1, 0));
        assert_eq!(dest.pixels(), &[GREEN, RED, GREEN]);
    }

    #[test]
    fn blit_clips_at_edges() {
        let mut dest = Image::filled(2, 2, GREEN);
        let src = Image::filled(2, 2, RED);
        dest.blit(&src, IVec2::new(-1, 1));
        assert_eq!(dest.pixel(0, 0), Some(GREEN));
        assert_eq!(dest.pixel(0, 1), Some(RED));
        assert_eq!(dest.pixel(1, 1), Some(GREEN));
    }

    #[test]
    fn copy_window_fills_outside_area() {
        let src = Image::filled(2, 2, RED);
        let mut dest = Image::new(2, 2);
        dest.copy_window(&src, IVec2::new(1, -1), BLACK);
        assert_eq!(dest.pixel(0, 0), Some(BLACK));
        assert_eq!(dest.pixel(0, 1), Some(RED));
        assert_eq!(dest.pixel(1, 1), Some(BLACK));
    }

    #[test]
    fn outline_leaves_interior() {
        let mut img = Image::filled(3, 3, GREEN);
        img.outline_rect(IVec2::ZERO, IVec2::new(3, 3), RED);
        assert_eq!(img.pixel(1, 1), Some(GREEN));
        assert_eq!(img.pixel(0, 0), Some(RED));
        assert_eq!(img.pixel(2, 1), Some(RED));
        assert_eq!(img.pixel(1, 2), Some(RED));
    }

    #[test]
    fn flip_mirrors_columns() {
        let img = Image::from_pixels(2, 1, vec![RED, GREEN]).expect("valid image");
        assert_eq!(img.flipped_horizontal().pixels(), &[GREEN, RED]);
    }

    #[test]
    fn scale_into_repeats_texels() {
        let img = Image::from_pixels(2, 1, vec![RED, GREEN]).expect("valid image");
        let mut out = Image::new(4, 2);
        img.scale_into(2, &mut out);
        assert_eq!(out.pixels(), &[RED, RED, GREEN, GREEN, RED, RED, GREEN, GREEN]);
    }

    #[test]
    fn as_bytes_is_rgba_row_major() {
        let img = Image::from_pixels(2, 1, vec![RED, GREEN]).expect("valid image");
        assert_eq!(img.as_bytes(), &[255, 0, 0, 255, 0, 255, 0, 255]);
    }
}
