//! # Shoalviz Renderer
//!
//! Immediate-mode 2D rendering for agent-based simulation frames.
//! Each step the driver hands a [`SimpleContinuousModule`] an ordered frame
//! of agent records; the module clears its surface and draws every agent as
//! a rectangle, circle, or triangle scaled to the surface, with optional
//! vision-range rings, heading arrows, and id labels.
//!
//! Drawing goes through the [`DrawingContext`] trait. [`RecordingContext`]
//! implements it headlessly; with the `web` feature, `web::CanvasContext`
//! implements it over an HTML canvas.

use thiserror::Error;

pub mod config;
pub mod context;
pub mod module;
pub mod recording;
pub mod surface;
pub mod visualization;
#[cfg(feature = "web")]
pub mod web;

pub use config::VisualizationConfig;
pub use context::{DrawingContext, TextAlign};
pub use module::{RecordingSurfaceFactory, SimpleContinuousModule, SurfaceFactory};
pub use recording::{DrawCall, RecordingContext};
pub use surface::SurfaceSize;
pub use visualization::ContinuousVisualization;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create drawing surface: {0}")]
    Surface(String),

    #[error(transparent)]
    Frame(#[from] shoalviz_core::FrameError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
