//! Codefall Engine -- falling code tokens on a rapier2d playfield.
//!
//! A decorative scene: static "control" blocks (`if`, `while`, `for`) are
//! scattered over a jittered grid, and round "variable" tokens (`{}`, `var`)
//! drop from the top at a fixed interval, bouncing off the controls until they
//! leave through the open bottom. Physics is delegated to rapier2d; this crate
//! only generates bodies, rasterizes their label sprites, and draws the scene
//! into a software [`Canvas`](canvas::Canvas). The optional `renderer` feature
//! presents that canvas in a window through wgpu.
//!
//! # Quick Start
//!
//! ```
//! use codefall_engine::prelude::*;
//!
//! let config = SceneConfig { seed: Some(7), ..Default::default() };
//! let mut scene = Scene::new(config).unwrap();
//! assert_eq!(scene.variable_count(), 1);
//!
//! scene.run_ticks(60);
//! assert_eq!(scene.tick_count(), 60);
//!
//! let mut canvas = scene.new_canvas();
//! scene.render(&mut canvas);
//! ```

#![deny(unsafe_code)]

pub mod canvas;
pub mod config;
pub mod controls;
pub mod font;
pub mod physics;
pub mod render;
pub mod rng;
pub mod scene;
pub mod snapshot;
pub mod sprite;
pub mod variables;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while building or exporting a scene.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The scene configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    /// A snapshot could not be serialized or parsed.
    #[error(transparent)]
    Snapshot(#[from] snapshot::SnapshotError),

    /// Writing a rendered frame to disk failed.
    #[error("failed to export frame to '{path}': {source}")]
    FrameExport {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::canvas::Canvas;
    pub use crate::config::{
        BumperConfig, ConfigError, ControlConfig, ControlWidths, PhysicsConfig, Rgba,
        SceneConfig, VariableConfig,
    };
    pub use crate::controls::{layout_controls, ControlKind, ControlPlacement};
    pub use crate::physics::{
        BodyId, BodyKind, BodySpec, BodyTransform, ColliderShape, ContactPair, PhysicsWorld,
    };
    pub use crate::rng::SceneRng;
    pub use crate::scene::{BodyRole, DrawItem, Scene, TickReport, Visual};
    pub use crate::snapshot::{BodySnapshot, SceneSnapshot, SnapshotError};
    pub use crate::sprite::{Sprite, SpriteAtlas, SpriteKey};
    pub use crate::variables::{SpawnTimer, VariableKind};
    pub use crate::EngineError;
}
