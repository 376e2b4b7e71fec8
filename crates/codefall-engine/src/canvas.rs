//! Software framebuffer the scene is drawn into.
//!
//! [`Canvas`] is an opaque RGBA8 image the size of the scene. Sprites are
//! stamped onto it with [`Canvas::draw_sprite`], which walks the rotated
//! bounding box of the sprite, maps each destination pixel centre back into
//! sprite space, and blends the nearest texel source-over. Keeping this on the
//! CPU means frames can be inspected in tests and written to PNG in headless
//! runs; the windowed presenter just uploads the finished buffer.

use std::path::Path;

use crate::config::Rgba;
use crate::sprite::Sprite;
use crate::EngineError;

/// Opaque RGBA8 framebuffer.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    background: Rgba,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Canvas cleared to `background` (forced opaque).
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        let [r, g, b, _] = background.0;
        let mut canvas = Self {
            width,
            height,
            background: Rgba([r, g, b, 255]),
            pixels: vec![0; width as usize * height as usize * 4],
        };
        canvas.clear();
        canvas
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reset every pixel to the background colour.
    pub fn clear(&mut self) {
        let bg = self.background.0;
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bg);
        }
    }

    /// Raw RGBA bytes, row-major, top row first.
    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    /// Colour at `(x, y)`; `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some(Rgba([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]))
    }

    /// Stamp `sprite` centred on `(cx, cy)` and rotated by `angle` radians
    /// (clockwise on screen).
    pub fn draw_sprite(&mut self, sprite: &Sprite, cx: f64, cy: f64, angle: f64) {
        let half_w = sprite.width() as f64 / 2.0;
        let half_h = sprite.height() as f64 / 2.0;
        self.for_each_covered(cx, cy, half_w, half_h, angle, |canvas, x, y, lx, ly| {
            let sx = (lx + half_w).floor();
            let sy = (ly + half_h).floor();
            if sx < 0.0 || sy < 0.0 {
                return;
            }
            let texel = sprite.pixel(sx as u32, sy as u32);
            canvas.blend(x, y, texel);
        });
    }

    /// Fill a `width` x `height` rectangle centred on `(cx, cy)` and rotated by
    /// `angle` radians.
    pub fn fill_rect(&mut self, cx: f64, cy: f64, width: f64, height: f64, angle: f64, color: Rgba) {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        self.for_each_covered(cx, cy, half_w, half_h, angle, |canvas, x, y, _, _| {
            canvas.blend(x, y, color);
        });
    }

    /// Write the canvas to `path` as a PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let path = path.as_ref();
        image::save_buffer_with_format(
            path,
            &self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|source| EngineError::FrameExport {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "frame written");
        Ok(())
    }

    /// Visit every canvas pixel whose centre may fall inside a rotated box,
    /// passing the pixel and its centre in the box's local frame.
    fn for_each_covered(
        &mut self,
        cx: f64,
        cy: f64,
        half_w: f64,
        half_h: f64,
        angle: f64,
        mut visit: impl FnMut(&mut Self, u32, u32, f64, f64),
    ) {
        let (sin, cos) = angle.sin_cos();
        let extent_x = half_w * cos.abs() + half_h * sin.abs();
        let extent_y = half_w * sin.abs() + half_h * cos.abs();

        let x0 = (cx - extent_x).floor().max(0.0) as i64;
        let y0 = (cy - extent_y).floor().max(0.0) as i64;
        let x1 = ((cx + extent_x).ceil() as i64).min(self.width as i64);
        let y1 = ((cy + extent_y).ceil() as i64).min(self.height as i64);

        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                // Inverse rotation: screen offset back into the local frame.
                let lx = dx * cos + dy * sin;
                let ly = -dx * sin + dy * cos;
                if lx < -half_w || lx >= half_w || ly < -half_h || ly >= half_h {
                    continue;
                }
                visit(self, x as u32, y as u32, lx, ly);
            }
        }
    }

    fn blend(&mut self, x: u32, y: u32, src: Rgba) {
        let alpha = src.alpha() as u32;
        if alpha == 0 {
            return;
        }
        let i = self.index(x, y);
        let dst = &mut self.pixels[i..i + 4];
        if alpha == 255 {
            dst.copy_from_slice(&src.0);
            return;
        }
        for c in 0..3 {
            let blended = (src.0[c] as u32 * alpha + dst[c] as u32 * (255 - alpha) + 127) / 255;
            dst[c] = blended as u8;
        }
        dst[3] = 255;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn solid(w: u32, h: u32, color: Rgba) -> Sprite {
        let mut s = Sprite::new(w, h);
        s.fill(color);
        s
    }

    #[test]
    fn new_canvas_is_background() {
        let c = Canvas::new(4, 3, Rgba([10, 20, 30, 0]));
        assert_eq!(c.as_rgba().len(), 48);
        assert_eq!(c.pixel(3, 2), Some(Rgba([10, 20, 30, 255])));
        assert_eq!(c.pixel(4, 0), None);
    }

    #[test]
    fn unrotated_sprite_lands_on_exact_pixels() {
        let mut c = Canvas::new(20, 20, Rgba::WHITE);
        c.draw_sprite(&solid(4, 2, Rgba::BLACK), 10.0, 10.0, 0.0);
        let black: Vec<_> = (0..20)
            .flat_map(|y| (0..20).map(move |x| (x, y)))
            .filter(|&(x, y)| c.pixel(x, y) == Some(Rgba::BLACK))
            .collect();
        assert_eq!(
            black,
            vec![(8, 9), (9, 9), (10, 9), (11, 9), (8, 10), (9, 10), (10, 10), (11, 10)]
        );
    }

    #[test]
    fn quarter_turn_swaps_extents() {
        let mut c = Canvas::new(40, 40, Rgba::WHITE);
        c.draw_sprite(&solid(20, 4, Rgba::BLACK), 20.0, 20.0, FRAC_PI_2);
        assert_eq!(c.pixel(20, 12), Some(Rgba::BLACK));
        assert_eq!(c.pixel(20, 27), Some(Rgba::BLACK));
        assert_eq!(c.pixel(12, 20), Some(Rgba::WHITE));
        assert_eq!(c.pixel(27, 20), Some(Rgba::WHITE));
    }

    #[test]
    fn transparent_texels_keep_background() {
        let mut c = Canvas::new(10, 10, Rgba::WHITE);
        c.draw_sprite(&Sprite::new(6, 6), 5.0, 5.0, 0.3);
        assert!(c.as_rgba().iter().all(|&b| b == 255));
    }

    #[test]
    fn half_alpha_blends() {
        let mut c = Canvas::new(2, 2, Rgba::WHITE);
        c.draw_sprite(&solid(2, 2, Rgba([0, 0, 0, 128])), 1.0, 1.0, 0.0);
        let Rgba([r, g, b, a]) = c.pixel(0, 0).unwrap();
        assert_eq!(a, 255);
        assert!((126..=128).contains(&r) && r == g && g == b);
    }

    #[test]
    fn sprite_partly_off_canvas_is_clipped() {
        let mut c = Canvas::new(10, 10, Rgba::WHITE);
        c.draw_sprite(&solid(6, 6, Rgba::BLACK), 0.0, 0.0, 0.7);
        c.draw_sprite(&solid(6, 6, Rgba::BLACK), 10.0, 10.0, 0.0);
        c.draw_sprite(&solid(6, 6, Rgba::BLACK), -100.0, 500.0, 0.0);
        assert_eq!(c.pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(c.pixel(9, 9), Some(Rgba::BLACK));
        assert_eq!(c.pixel(5, 5), Some(Rgba::WHITE));
    }

    #[test]
    fn fill_rect_and_clear() {
        let mut c = Canvas::new(10, 10, Rgba::WHITE);
        c.fill_rect(5.0, 5.0, 2.0, 10.0, 0.0, Rgba::BLACK);
        assert_eq!(c.pixel(4, 0), Some(Rgba::BLACK));
        assert_eq!(c.pixel(5, 9), Some(Rgba::BLACK));
        assert_eq!(c.pixel(3, 5), Some(Rgba::WHITE));
        c.clear();
        assert_eq!(c.pixel(4, 0), Some(Rgba::WHITE));
    }

    #[test]
    fn save_png_writes_file() {
        let mut c = Canvas::new(8, 8, Rgba::WHITE);
        c.fill_rect(4.0, 4.0, 4.0, 4.0, 0.0, Rgba::BLACK);
        let path = std::env::temp_dir().join(format!("codefall-canvas-{}.png", std::process::id()));
        c.save_png(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let _ = std::fs::remove_file(&path);
    }
}
