//! Static "control" blocks and their scattered layout.
//!
//! Controls are labelled boxes (`if`, `while`, `for`) pinned in place at a
//! steep tilt. [`layout_controls`] walks a cursor across the scene row by row:
//! each step moves right by a spacing plus jitter, wrapping to a new, lower row
//! when it runs past the right margin. A small share of steps is left empty so
//! the grid never looks regular.

use serde::{Deserialize, Serialize};

use crate::config::{ControlConfig, ControlWidths};
use crate::physics::BodySpec;
use crate::rng::SceneRng;

/// Keyword printed on a control block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    If,
    While,
    For,
}

impl ControlKind {
    pub const ALL: [ControlKind; 3] = [ControlKind::If, ControlKind::While, ControlKind::For];

    /// Text drawn on the block.
    pub fn label(self) -> &'static str {
        match self {
            ControlKind::If => "if",
            ControlKind::While => "while",
            ControlKind::For => "for",
        }
    }

    /// Block width for this keyword.
    pub fn width(self, widths: &ControlWidths) -> f64 {
        match self {
            ControlKind::If => widths.if_,
            ControlKind::While => widths.while_,
            ControlKind::For => widths.for_,
        }
    }

    /// Pick a keyword: the low third of a unit draw is `while`, the high
    /// third `for`, the middle `if`.
    pub fn pick(rng: &mut SceneRng) -> Self {
        Self::from_unit(rng.unit())
    }

    fn from_unit(r: f64) -> Self {
        if r < 0.333 {
            ControlKind::While
        } else if r > 0.666 {
            ControlKind::For
        } else {
            ControlKind::If
        }
    }
}

/// Where one control goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPlacement {
    pub kind: ControlKind,
    pub x: f64,
    pub y: f64,
    /// Rotation in radians.
    pub rotation: f64,
}

impl ControlPlacement {
    /// Full size of the block.
    pub fn size(&self, config: &ControlConfig) -> (f64, f64) {
        (self.kind.width(&config.widths), config.height)
    }

    /// Static physics body for this placement.
    pub fn body_spec(&self, config: &ControlConfig) -> BodySpec {
        let (width, height) = self.size(config);
        BodySpec {
            rotation: self.rotation,
            ..BodySpec::static_box(self.x, self.y, width, height)
        }
    }
}

/// Scatter controls across a scene `scene_width` pixels wide.
///
/// Makes exactly `config.count` placement attempts. The draw order per
/// attempt is fixed (x jitter, row wrap jitters, gap, keyword, tilt sign) so
/// a seed always yields the same layout.
pub fn layout_controls(
    config: &ControlConfig,
    scene_width: f64,
    rng: &mut SceneRng,
) -> Vec<ControlPlacement> {
    let mut placements = Vec::new();
    let mut x = config.margin;
    let mut y = config.start_y;
    let right_edge = scene_width - config.margin;

    for _ in 0..config.count {
        x += config.x_spacing + rng.random_int(0, config.jitter) as f64;
        if x > right_edge {
            x = config.margin + rng.random_int(0, config.jitter) as f64;
            y += config.y_spacing + rng.random_int(0, config.jitter) as f64;
        }

        if rng.chance(config.gap_probability) {
            continue;
        }

        let kind = ControlKind::pick(rng);
        let rotation = if rng.coin() {
            config.rotation
        } else {
            -config.rotation
        };
        placements.push(ControlPlacement { kind, x, y, rotation });
    }

    tracing::debug!(
        attempts = config.count,
        placed = placements.len(),
        "laid out controls"
    );
    placements
}
