//! 5x7 bitmap font for sprite labels.
//!
//! Each glyph row is a `u8` whose low five bits are the pixels, bit 4 being
//! the leftmost column. Labels are drawn centred on a point with their last
//! row sitting on the baseline, the way a canvas draws with
//! `textAlign = "center"`. Letters with tails (`g j p q y`) are lowered by
//! [`DESCENT`] rows so the tail hangs below the baseline. Uppercase letters
//! reuse the lowercase shapes.

use crate::config::Rgba;
use crate::sprite::Sprite;

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal distance between glyph origins, one blank column included.
pub const ADVANCE: u32 = GLYPH_WIDTH + 1;
/// Rows a descender glyph is shifted down past the baseline.
pub const DESCENT: u32 = 2;

// Sorted by char for binary search.
const GLYPHS: &[(char, [u8; 7])] = &[
    ('!', [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100]),
    ('(', [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010]),
    (')', [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000]),
    ('+', [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000]),
    (',', [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000]),
    ('-', [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000]),
    ('.', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100]),
    ('0', [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
    ('1', [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('2', [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111]),
    ('3', [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110]),
    ('4', [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
    ('5', [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
    ('6', [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
    ('7', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
    ('8', [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
    ('9', [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
    (':', [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000]),
    (';', [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b00100, 0b01000]),
    ('=', [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000]),
    ('?', [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100]),
    ('_', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111]),
    ('a', [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111]),
    ('b', [0b10000, 0b10000, 0b11110, 0b10001, 0b10001, 0b10001, 0b11110]),
    ('c', [0b00000, 0b00000, 0b01111, 0b10000, 0b10000, 0b10000, 0b01111]),
    ('d', [0b00001, 0b00001, 0b01111, 0b10001, 0b10001, 0b10001, 0b01111]),
    ('e', [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01111]),
    ('f', [0b00110, 0b01000, 0b11110, 0b01000, 0b01000, 0b01000, 0b01000]),
    ('g', [0b00000, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110]),
    ('h', [0b10000, 0b10000, 0b11110, 0b10001, 0b10001, 0b10001, 0b10001]),
    ('i', [0b00100, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('j', [0b00010, 0b00000, 0b00110, 0b00010, 0b00010, 0b10010, 0b01100]),
    ('k', [0b10000, 0b10000, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010]),
    ('l', [0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('m', [0b00000, 0b00000, 0b11010, 0b10101, 0b10101, 0b10101, 0b10101]),
    ('n', [0b00000, 0b00000, 0b11110, 0b10001, 0b10001, 0b10001, 0b10001]),
    ('o', [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('p', [0b00000, 0b00000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000]),
    ('q', [0b00000, 0b00000, 0b01111, 0b10001, 0b01111, 0b00001, 0b00001]),
    ('r', [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000]),
    ('s', [0b00000, 0b00000, 0b01111, 0b10000, 0b01110, 0b00001, 0b11110]),
    ('t', [0b01000, 0b01000, 0b11110, 0b01000, 0b01000, 0b01001, 0b00110]),
    ('u', [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101]),
    ('v', [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100]),
    ('w', [0b00000, 0b00000, 0b10001, 0b10001, 0b10101, 0b10101, 0b01010]),
    ('x', [0b00000, 0b00000, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001]),
    ('y', [0b00000, 0b00000, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110]),
    ('z', [0b00000, 0b00000, 0b11111, 0b00010, 0b00100, 0b01000, 0b11111]),
    ('{', [0b00011, 0b00100, 0b00100, 0b01000, 0b00100, 0b00100, 0b00011]),
    ('}', [0b11000, 0b00100, 0b00100, 0b00010, 0b00100, 0b00100, 0b11000]),
];

/// Rows of the glyph for `ch`, or `None` for characters drawn as blanks.
pub fn glyph(ch: char) -> Option<&'static [u8; 7]> {
    let ch = ch.to_ascii_lowercase();
    GLYPHS
        .binary_search_by_key(&ch, |(c, _)| *c)
        .ok()
        .map(|i| &GLYPHS[i].1)
}

fn descends(ch: char) -> bool {
    matches!(ch.to_ascii_lowercase(), 'g' | 'j' | 'p' | 'q' | 'y')
}

/// Pixel size of `text` at integer `scale`, descenders excluded.
pub fn measure(text: &str, scale: u32) -> (u32, u32) {
    let n = text.chars().count() as u32;
    if n == 0 {
        return (0, 0);
    }
    ((n * ADVANCE - 1) * scale, GLYPH_HEIGHT * scale)
}

/// Draw `text` into `sprite`, horizontally centred on `center_x` with the
/// bottom glyph row ending at `baseline_y`.
pub fn draw_text(
    sprite: &mut Sprite,
    text: &str,
    center_x: f64,
    baseline_y: f64,
    scale: u32,
    color: Rgba,
) {
    let (width, height) = measure(text, scale);
    let left = (center_x - width as f64 / 2.0).round() as i64;
    let top = (baseline_y - height as f64).round() as i64;
    let s = scale as i64;

    for (i, ch) in text.chars().enumerate() {
        let Some(rows) = glyph(ch) else {
            continue;
        };
        let origin_x = left + i as i64 * ADVANCE as i64 * s;
        let origin_y = if descends(ch) {
            top + DESCENT as i64 * s
        } else {
            top
        };
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                    continue;
                }
                sprite.fill_rect(
                    origin_x + col as i64 * s,
                    origin_y + row as i64 * s,
                    scale,
                    scale,
                    color,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_for_binary_search() {
        assert!(GLYPHS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn label_characters_are_present() {
        for ch in "ifwhileforvar{}".chars() {
            assert!(glyph(ch).is_some(), "missing glyph for {ch:?}");
        }
    }

    #[test]
    fn uppercase_falls_back_to_lowercase() {
        assert_eq!(glyph('W'), glyph('w'));
        assert!(glyph(' ').is_none());
        assert!(glyph('é').is_none());
    }

    #[test]
    fn rows_fit_in_five_bits() {
        for (ch, rows) in GLYPHS {
            assert!(rows.iter().all(|r| *r < 32), "glyph {ch:?} is too wide");
        }
    }

    #[test]
    fn measure_accounts_for_spacing() {
        assert_eq!(measure("", 2), (0, 0));
        assert_eq!(measure("if", 1), (11, 7));
        assert_eq!(measure("while", 2), (58, 14));
    }

    #[test]
    fn draw_text_lights_pixels_inside_bounds() {
        let mut sprite = Sprite::new(40, 20);
        draw_text(&mut sprite, "if", 20.0, 15.0, 1, Rgba::BLACK);
        let lit = sprite.count_pixels(|p| p == Rgba::BLACK);
        assert!(lit > 0);
        // Glyphs occupy rows 8..15.
        for y in 0..8 {
            for x in 0..40 {
                assert_eq!(sprite.pixel(x, y), Rgba::TRANSPARENT);
            }
        }
    }

    #[test]
    fn descenders_hang_below_the_baseline() {
        let lowest_lit_row = |text: &str| {
            let mut sprite = Sprite::new(20, 20);
            draw_text(&mut sprite, text, 10.0, 10.0, 1, Rgba::BLACK);
            (0..20u32)
                .filter(|&y| (0..20u32).any(|x| sprite.pixel(x, y) == Rgba::BLACK))
                .max()
                .unwrap()
        };
        // Baseline at row 10: plain glyphs end on row 9, tails reach row 11.
        assert_eq!(lowest_lit_row("o"), 9);
        assert_eq!(lowest_lit_row("p"), 11);
        assert_eq!(lowest_lit_row("g"), 11);
        assert_eq!(lowest_lit_row("Y"), 11);
    }

    #[test]
    fn unknown_characters_leave_a_blank() {
        let mut a = Sprite::new(40, 10);
        let mut b = Sprite::new(40, 10);
        draw_text(&mut a, "i i", 20.0, 8.0, 1, Rgba::BLACK);
        draw_text(&mut b, "i#i", 20.0, 8.0, 1, Rgba::BLACK);
        assert_eq!(a, b);
    }
}
