//! Scene configuration.
//!
//! Every tunable of the animation lives in [`SceneConfig`]. The defaults
//! reproduce the classic layout: a 600x1200 white playfield, fifty control
//! placement attempts, and a new variable every half second. Configurations
//! can be loaded from JSON; missing fields fall back to their defaults.
//!
//! ```
//! use codefall_engine::config::SceneConfig;
//!
//! let config = SceneConfig::from_json(r#"{ "seed": 3, "controls": { "count": 10 } }"#).unwrap();
//! assert_eq!(config.seed, Some(3));
//! assert_eq!(config.controls.count, 10);
//! assert_eq!(config.width, 600.0);
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Largest scene side in pixels. Matches wgpu's default 2-D texture limit,
/// so any valid scene can be presented in a window.
pub const MAX_DIMENSION: u32 = 8192;

/// Errors produced while loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON or has the wrong shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the scene cannot work with.
    #[error("invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    /// A colour string is not `#rrggbb` or `#rrggbbaa`.
    #[error("invalid colour '{0}', expected #rrggbb or #rrggbbaa")]
    Colour(String),
}

// ---------------------------------------------------------------------------
// Rgba
// ---------------------------------------------------------------------------

/// An 8-bit RGBA colour, serialized as a `#rrggbb[aa]` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0]);

    /// Parse `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self, ConfigError> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(ConfigError::Colour(s.to_owned()));
        }
        let mut out = [0u8, 0, 0, 255];
        for (i, slot) in out.iter_mut().enumerate().take(hex.len() / 2) {
            *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| ConfigError::Colour(s.to_owned()))?;
        }
        Ok(Rgba(out))
    }

    /// Alpha channel.
    pub fn alpha(self) -> u8 {
        self.0[3]
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Physics world parameters. Units are pixels and seconds, y grows downward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration in px/s^2.
    pub gravity: f64,
    /// Fixed simulation step in seconds.
    pub fixed_dt: f64,
    /// Typical object size in pixels; rapier scales its tolerances by it.
    pub length_unit: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 980.0,
            fixed_dt: 1.0 / 60.0,
            length_unit: 50.0,
        }
    }
}

/// The two static side walls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BumperConfig {
    /// Distance of each wall's centre line from the scene edge.
    pub inset: f64,
    /// Full wall thickness.
    pub thickness: f64,
    pub color: Rgba,
}

impl Default for BumperConfig {
    fn default() -> Self {
        Self {
            inset: 10.0,
            thickness: 1.0,
            color: Rgba([0x88, 0x88, 0x88, 255]),
        }
    }
}

/// Sprite widths per control keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlWidths {
    #[serde(rename = "if")]
    pub if_: f64,
    #[serde(rename = "for")]
    pub for_: f64,
    #[serde(rename = "while")]
    pub while_: f64,
}

impl Default for ControlWidths {
    fn default() -> Self {
        Self {
            if_: 40.0,
            for_: 50.0,
            while_: 80.0,
        }
    }
}

/// Grid walk and look of the static control blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Number of placement attempts (gaps included).
    pub count: u32,
    /// Horizontal margin; also the x where each new row starts.
    pub margin: f64,
    /// y of the first row.
    pub start_y: f64,
    pub x_spacing: f64,
    pub y_spacing: f64,
    /// Upper bound of the random integer added to spacings.
    pub jitter: i64,
    /// Probability that a placement is left empty.
    pub gap_probability: f64,
    pub height: f64,
    pub widths: ControlWidths,
    /// Rotation magnitude in radians; the sign is picked per control.
    pub rotation: f64,
    pub border_width: f64,
    /// Fill behind the label; `None` leaves the sprite transparent.
    pub label_background: Option<Rgba>,
    pub label_scale: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            count: 50,
            margin: 50.0,
            start_y: 150.0,
            x_spacing: 180.0,
            y_spacing: 80.0,
            jitter: 80,
            gap_probability: 0.1,
            height: 40.0,
            widths: ControlWidths::default(),
            rotation: 45.0,
            border_width: 6.0,
            label_background: None,
            label_scale: 2,
        }
    }
}

/// Spawning and physical properties of the falling variable tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableConfig {
    pub spawn_x: f64,
    pub spawn_y: f64,
    pub radius: f64,
    pub mass: f64,
    pub restitution: f64,
    pub ring_width: f64,
    /// Seconds of simulated time between spawns.
    pub spawn_interval: f64,
    /// Variables further than this below the scene are removed. `None` keeps
    /// them forever.
    pub cull_margin: Option<f64>,
    pub label_scale: u32,
}

impl Default for VariableConfig {
    fn default() -> Self {
        Self {
            spawn_x: 300.0,
            spawn_y: 0.0,
            radius: 30.0,
            mass: 30.0,
            restitution: 1.0,
            ring_width: 5.0,
            spawn_interval: 0.5,
            cull_margin: Some(200.0),
            label_scale: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// SceneConfig
// ---------------------------------------------------------------------------

/// Complete scene configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: f64,
    pub height: f64,
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub background: Rgba,
    pub physics: PhysicsConfig,
    pub bumpers: BumperConfig,
    pub controls: ControlConfig,
    pub variables: VariableConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 1200.0,
            seed: None,
            background: Rgba::WHITE,
            physics: PhysicsConfig::default(),
            bumpers: BumperConfig::default(),
            controls: ControlConfig::default(),
            variables: VariableConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "loaded scene config");
        Ok(config)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        dimension("width", self.width)?;
        dimension("height", self.height)?;
        finite("physics.gravity", self.physics.gravity)?;
        positive("physics.fixed_dt", self.physics.fixed_dt)?;
        positive("physics.length_unit", self.physics.length_unit)?;
        non_negative("bumpers.inset", self.bumpers.inset)?;
        positive("bumpers.thickness", self.bumpers.thickness)?;

        let c = &self.controls;
        non_negative("controls.margin", c.margin)?;
        finite("controls.start_y", c.start_y)?;
        positive("controls.x_spacing", c.x_spacing)?;
        non_negative("controls.y_spacing", c.y_spacing)?;
        if c.jitter < 0 {
            return Err(invalid("controls.jitter", "must not be negative"));
        }
        probability("controls.gap_probability", c.gap_probability)?;
        positive("controls.height", c.height)?;
        positive("controls.widths.if", c.widths.if_)?;
        positive("controls.widths.for", c.widths.for_)?;
        positive("controls.widths.while", c.widths.while_)?;
        finite("controls.rotation", c.rotation)?;
        non_negative("controls.border_width", c.border_width)?;
        if c.label_scale == 0 {
            return Err(invalid("controls.label_scale", "must be at least 1"));
        }
        if c.margin * 2.0 >= self.width {
            return Err(invalid(
                "controls.margin",
                format!("twice the margin must be less than the width ({})", self.width),
            ));
        }

        let v = &self.variables;
        finite("variables.spawn_x", v.spawn_x)?;
        finite("variables.spawn_y", v.spawn_y)?;
        positive("variables.radius", v.radius)?;
        positive("variables.mass", v.mass)?;
        non_negative("variables.restitution", v.restitution)?;
        non_negative("variables.ring_width", v.ring_width)?;
        positive("variables.spawn_interval", v.spawn_interval)?;
        if let Some(margin) = v.cull_margin {
            non_negative("variables.cull_margin", margin)?;
        }
        if v.label_scale == 0 {
            return Err(invalid("variables.label_scale", "must be at least 1"));
        }
        Ok(())
    }

    /// Canvas size in whole pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width.round() as u32, self.height.round() as u32)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("must be finite, got {value}")))
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must not be negative, got {value}")))
    }
}

/// A scene side must round to between 1 and [`MAX_DIMENSION`] pixels.
fn dimension(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    let pixels = value.round();
    if pixels < 1.0 || pixels > MAX_DIMENSION as f64 {
        return Err(invalid(
            field,
            format!("must round to 1..={MAX_DIMENSION} pixels, got {value}"),
        ));
    }
    Ok(())
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("must be within [0, 1], got {value}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SceneConfig::default().validate().unwrap();
    }

    #[test]
    fn defaults_match_classic_layout() {
        let c = SceneConfig::default();
        assert_eq!((c.width, c.height), (600.0, 1200.0));
        assert_eq!(c.pixel_size(), (600, 1200));
        assert_eq!(c.controls.count, 50);
        assert_eq!(c.controls.widths.while_, 80.0);
        assert_eq!(c.variables.spawn_interval, 0.5);
        assert_eq!(c.background, Rgba::WHITE);
    }

    #[test]
    fn empty_json_gives_defaults() {
        let c = SceneConfig::from_json("{}").unwrap();
        assert_eq!(c, SceneConfig::default());
    }

    #[test]
    fn partial_json_overrides_nested_fields() {
        let c = SceneConfig::from_json(
            r##"{ "background": "#e5e5e5", "controls": { "widths": { "while": 90 } } }"##,
        )
        .unwrap();
        assert_eq!(c.background, Rgba([0xe5, 0xe5, 0xe5, 255]));
        assert_eq!(c.controls.widths.while_, 90.0);
        assert_eq!(c.controls.widths.if_, 40.0);
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut c = SceneConfig::default();
        c.seed = Some(99);
        c.controls.label_background = Some(Rgba([1, 2, 3, 4]));
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"#01020304\""));
        assert_eq!(SceneConfig::from_json(&json).unwrap(), c);
    }

    #[test]
    fn rejects_bad_probability() {
        let err = SceneConfig::from_json(r#"{ "controls": { "gap_probability": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "controls.gap_probability",
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_positive_interval() {
        let mut c = SceneConfig::default();
        c.variables.spawn_interval = 0.0;
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("variables.spawn_interval"));
    }

    #[test]
    fn scene_size_is_bounded() {
        let mut c = SceneConfig::default();
        c.width = 20_000.0;
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("width"), "{err}");

        c.width = 0.4;
        assert!(c.validate().is_err(), "rounds to zero pixels");

        c.width = 600.0;
        c.height = MAX_DIMENSION as f64;
        c.validate().unwrap();
        assert_eq!(c.pixel_size(), (600, MAX_DIMENSION));
        c.height = MAX_DIMENSION as f64 + 1.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_margin_wider_than_scene() {
        let mut c = SceneConfig::default();
        c.controls.margin = 300.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            SceneConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SceneConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn hex_colours() {
        assert_eq!(Rgba::from_hex("#000000").unwrap(), Rgba::BLACK);
        assert_eq!(Rgba::from_hex("ffffff").unwrap(), Rgba::WHITE);
        assert_eq!(Rgba::from_hex("#00000000").unwrap(), Rgba::TRANSPARENT);
        assert!(Rgba::from_hex("#fff").is_err());
        assert!(Rgba::from_hex("#gggggg").is_err());
        assert_eq!(Rgba([0xe5, 0xe5, 0xe5, 255]).to_string(), "#e5e5e5");
    }
}
