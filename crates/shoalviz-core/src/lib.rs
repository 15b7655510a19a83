//! # Shoalviz Core
//!
//! Data model for the continuous canvas: per-step agent records as sent by a
//! simulation, the ordered frame they travel in, and the portrayal layer that
//! maps model-space agents into normalized canvas coordinates.
//!
//! This crate has no notion of a drawing surface; see `shoalviz-renderer`.

pub mod agent;
pub mod geometry;
pub mod portrayal;

pub use agent::{AgentId, AgentRecord, Frame, FrameError, Shape, ShapeTag};
pub use geometry::{BBox, Point};
pub use portrayal::{Positioned, SimpleCanvas, SpaceBounds};
