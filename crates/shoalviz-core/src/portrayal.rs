use serde::{Deserialize, Serialize};

use crate::agent::{AgentRecord, Frame};
use crate::geometry::Point;

/// Anything that lives at a position in a continuous model space.
pub trait Positioned {
    fn position(&self) -> Point;
}

impl Positioned for Point {
    fn position(&self) -> Point {
        *self
    }
}

/// Extent of a continuous model space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpaceBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl SpaceBounds {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// A space spanning `[0, width] × [0, height]`.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, width, 0.0, height)
    }

    /// Map a model position into `[0, 1]²`. Positions outside the space map
    /// outside the unit square; a zero-width space yields non-finite values.
    pub fn normalize(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.x_min) / (self.x_max - self.x_min),
            (p.y - self.y_min) / (self.y_max - self.y_min),
        )
    }
}

/// Server-side half of the continuous canvas: turns model agents into the
/// frame the renderer consumes, one portrayal per agent.
pub struct SimpleCanvas<F> {
    portrayal: F,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub bounds: SpaceBounds,
}

impl<F> SimpleCanvas<F> {
    pub const DEFAULT_SIZE: u32 = 500;

    pub fn new(portrayal: F, bounds: SpaceBounds) -> Self {
        Self {
            portrayal,
            canvas_width: Self::DEFAULT_SIZE,
            canvas_height: Self::DEFAULT_SIZE,
            bounds,
        }
    }

    pub fn with_size(mut self, canvas_width: u32, canvas_height: u32) -> Self {
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
        self
    }

    /// Portray every agent and place it at its normalized position. Whatever
    /// `x`/`y` the portrayal method set is overwritten.
    pub fn render<'a, A>(&self, agents: impl IntoIterator<Item = &'a A>) -> Frame
    where
        A: Positioned + 'a,
        F: Fn(&A) -> AgentRecord,
    {
        let frame: Frame = agents
            .into_iter()
            .map(|agent| {
                let mut record = (self.portrayal)(agent);
                let pos = self.bounds.normalize(agent.position());
                record.x = pos.x;
                record.y = pos.y;
                record
            })
            .collect();
        log::trace!("Portrayed {} agents", frame.len());
        frame
    }
}
