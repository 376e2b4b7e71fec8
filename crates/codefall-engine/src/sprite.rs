//! Offscreen RGBA textures used as body skins.
//!
//! A [`Sprite`] is a small straight-alpha RGBA8 image, drawn once when the
//! scene starts and then stamped onto the [`Canvas`](crate::canvas::Canvas)
//! every frame at its body's position and angle. The two label builders mirror
//! the look of the animation:
//!
//! - [`label_rectangle`] -- a bordered box with a centred keyword, used for
//!   the control blocks.
//! - [`label_circle`] -- a white disc with a black ring and a centred token,
//!   used for the falling variables.
//!
//! [`SpriteAtlas`] renders every label the scene can show up front so the
//! frame loop never rasterizes text.

use std::collections::HashMap;

use crate::config::{Rgba, SceneConfig};
use crate::controls::ControlKind;
use crate::font;
use crate::variables::VariableKind;

// ---------------------------------------------------------------------------
// Sprite
// ---------------------------------------------------------------------------

/// RGBA8 image, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Sprite {
    /// Fully transparent sprite.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Colour at `(x, y)`. Out-of-range reads are transparent.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.width || y >= self.height {
            return Rgba::TRANSPARENT;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Rgba([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Overwrite the pixel at `(x, y)`; out-of-range writes are clipped.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&color.0);
    }

    /// Paint every pixel with `color`.
    pub fn fill(&mut self, color: Rgba) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color.0);
        }
    }

    /// Paint an axis-aligned rectangle, clipped to the sprite.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba) {
        for py in y..y + height as i64 {
            for px in x..x + width as i64 {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Stroke the sprite's own outline with a line `line_width` wide.
    ///
    /// The line is centred on the edge, so only its inner half lands on the
    /// sprite.
    pub fn stroke_border(&mut self, line_width: f64, color: Rgba) {
        let inset = (line_width / 2.0).round() as u32;
        if inset == 0 {
            return;
        }
        let (w, h) = (self.width, self.height);
        let inset_x = inset.min(w);
        let inset_y = inset.min(h);
        self.fill_rect(0, 0, w, inset_y, color);
        self.fill_rect(0, (h - inset_y) as i64, w, inset_y, color);
        self.fill_rect(0, 0, inset_x, h, color);
        self.fill_rect((w - inset_x) as i64, 0, inset_x, h, color);
    }

    /// Paint pixels whose centres lie within `radius` of `(cx, cy)`.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        self.paint_where(color, |x, y| {
            let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
            d <= radius
        });
    }

    /// Paint a ring of width `line_width` just inside a circle of `radius`.
    pub fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, line_width: f64, color: Rgba) {
        self.paint_where(color, |x, y| {
            let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
            d <= radius && d >= radius - line_width
        });
    }

    /// Count pixels matching `pred`.
    pub fn count_pixels(&self, pred: impl Fn(Rgba) -> bool) -> usize {
        self.pixels
            .chunks_exact(4)
            .filter(|px| pred(Rgba([px[0], px[1], px[2], px[3]])))
            .count()
    }

    fn paint_where(&mut self, color: Rgba, inside: impl Fn(f64, f64) -> bool) {
        for y in 0..self.height {
            for x in 0..self.width {
                if inside(x as f64 + 0.5, y as f64 + 0.5) {
                    self.set_pixel(x as i64, y as i64, color);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Label builders
// ---------------------------------------------------------------------------

/// Look of a rectangular label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub background: Option<Rgba>,
    pub border_width: f64,
    pub ink: Rgba,
    pub scale: u32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            background: None,
            border_width: 6.0,
            ink: Rgba::BLACK,
            scale: 2,
        }
    }
}

/// Offset of the text baseline below the vertical centre.
const BASELINE_DROP: f64 = 5.0;

/// Bordered box of `width` x `height` with `text` centred on it.
pub fn label_rectangle(text: &str, width: f64, height: f64, style: &LabelStyle) -> Sprite {
    let mut sprite = Sprite::new(
        width.round().max(1.0) as u32,
        height.round().max(1.0) as u32,
    );
    if let Some(bg) = style.background {
        sprite.fill(bg);
    }
    sprite.stroke_border(style.border_width, style.ink);
    font::draw_text(
        &mut sprite,
        text,
        width / 2.0,
        height / 2.0 + BASELINE_DROP,
        style.scale,
        style.ink,
    );
    sprite
}

/// White disc of `radius` with a black ring and `text` centred on it.
pub fn label_circle(text: &str, radius: f64, ring_width: f64, scale: u32) -> Sprite {
    let size = (radius * 2.0).round().max(1.0) as u32;
    let c = size as f64 / 2.0;
    let mut sprite = Sprite::new(size, size);
    sprite.fill_circle(c, c, radius, Rgba::WHITE);
    sprite.stroke_circle(c, c, radius, ring_width, Rgba::BLACK);
    let (_, text_height) = font::measure(text, scale);
    font::draw_text(
        &mut sprite,
        text,
        c,
        c + text_height as f64 / 2.0,
        scale,
        Rgba::BLACK,
    );
    sprite
}

// ---------------------------------------------------------------------------
// SpriteAtlas
// ---------------------------------------------------------------------------

/// Which label a body wears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Control(ControlKind),
    Variable(VariableKind),
}

/// Pre-rendered sprites for every label in a scene.
#[derive(Debug, Clone, Default)]
pub struct SpriteAtlas {
    sprites: HashMap<SpriteKey, Sprite>,
}

impl SpriteAtlas {
    /// Render all control and variable labels for `config`.
    pub fn build(config: &SceneConfig) -> Self {
        let c = &config.controls;
        let style = LabelStyle {
            background: c.label_background,
            border_width: c.border_width,
            ink: Rgba::BLACK,
            scale: c.label_scale,
        };
        let v = &config.variables;

        let mut sprites = HashMap::new();
        for kind in ControlKind::ALL {
            let sprite = label_rectangle(kind.label(), kind.width(&c.widths), c.height, &style);
            sprites.insert(SpriteKey::Control(kind), sprite);
        }
        for kind in [VariableKind::Braces, VariableKind::Var] {
            let sprite = label_circle(kind.label(), v.radius, v.ring_width, v.label_scale);
            sprites.insert(SpriteKey::Variable(kind), sprite);
        }
        Self { sprites }
    }

    pub fn get(&self, key: SpriteKey) -> Option<&Sprite> {
        self.sprites.get(&key)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}
