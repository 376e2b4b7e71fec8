//! Windowed presentation of the software canvas.
//!
//! Feature-gated behind `renderer`. Without the feature this module compiles
//! to nothing and scenes can still be rendered to PNG through
//! [`Canvas::save_png`](crate::canvas::Canvas::save_png).
//!
//! All drawing happens on the CPU in [`Canvas`](crate::canvas::Canvas); the
//! GPU side only uploads the finished frame as a texture and draws one
//! letterboxed quad with it.

#[cfg(feature = "renderer")]
pub mod app;
#[cfg(feature = "renderer")]
pub mod presenter;

#[cfg(feature = "renderer")]
pub use app::run_windowed;
#[cfg(feature = "renderer")]
pub use presenter::{letterbox, FramePresenter};
