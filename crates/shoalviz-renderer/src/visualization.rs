use std::f64::consts::TAU;

use shoalviz_core::{AgentRecord, Shape};

use crate::config::VisualizationConfig;
use crate::context::{DrawingContext, TextAlign};
use crate::surface::SurfaceSize;

/// Draws frames of agents onto a drawing context, scaling normalized
/// positions to the surface's pixel size.
///
/// Every primitive sets the styles it uses before drawing. A primitive given
/// no colour draws with whatever style the context already holds.
pub struct ContinuousVisualization<C> {
    context: C,
    size: SurfaceSize,
    config: VisualizationConfig,
}

impl<C: DrawingContext> ContinuousVisualization<C> {
    pub fn new(context: C, width: f64, height: f64) -> Self {
        Self::with_config(context, width, height, VisualizationConfig::default())
    }

    pub fn with_config(context: C, width: f64, height: f64, config: VisualizationConfig) -> Self {
        Self {
            context,
            size: SurfaceSize::new(width, height),
            config,
        }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Draw every agent in order; later agents paint over earlier ones.
    pub fn draw(&mut self, agents: &[AgentRecord]) {
        log::debug!("Drawing frame of {} agents", agents.len());
        for agent in agents {
            self.draw_agent(agent);
        }
    }

    /// Draw one agent's shape, then its overlays and label.
    pub fn draw_agent(&mut self, agent: &AgentRecord) {
        let color = agent.color.as_deref();
        match agent.geometry() {
            Shape::Rectangle { w, h } => {
                self.draw_rectangle(agent.x, agent.y, w, h, color, agent.filled)
            }
            Shape::Circle { r } => self.draw_circle(agent.x, agent.y, r, color, agent.filled),
            Shape::Triangle { w, h, heading } => {
                self.draw_triangle(agent.x, agent.y, w, h, heading, color, agent.filled)
            }
            Shape::Unknown => {
                log::trace!("Skipping shape of agent {:?}: unrecognized tag", agent.id);
            }
        }

        if let Some(vision) = agent.vision_range() {
            self.draw_circle(agent.x, agent.y, vision, None, false);
        }

        if let Some((heading_x, heading_y)) = agent.heading_vector() {
            self.draw_heading_arrow(agent.x, agent.y, heading_x, heading_y);
        }

        if let Some(id) = &agent.id {
            self.add_text(&id.to_string(), agent.x, agent.y);
        }
    }

    /// Centered label above a normalized position.
    pub fn add_text(&mut self, text: &str, x: f64, y: f64) {
        let anchor = self
            .size
            .to_pixels(x, y)
            .translate(0.0, -self.config.label_offset);
        self.context.set_text_align(TextAlign::Center);
        self.context.set_fill_style(&self.config.label_color);
        self.context.fill_text(text, anchor.x, anchor.y);
    }

    /// Full circle centered on a normalized position. `radius` is in pixels.
    /// The outline is always stroked; `fill` also fills it.
    pub fn draw_circle(&mut self, x: f64, y: f64, radius: f64, color: Option<&str>, fill: bool) {
        let center = self.size.to_pixels(x, y);

        self.context.begin_path();
        self.context.arc(center.x, center.y, radius, 0.0, TAU);
        self.context.close_path();

        if let Some(color) = color {
            self.context.set_stroke_style(color);
        }
        self.context.stroke();

        if fill {
            if let Some(color) = color {
                self.context.set_fill_style(color);
            }
            self.context.fill();
        }
    }

    /// Rectangle centered on a normalized position, sized as a fraction of
    /// the surface.
    pub fn draw_rectangle(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Option<&str>,
        fill: bool,
    ) {
        self.context.begin_path();
        let (dx, dy) = self.size.scale_size(w, h);
        let center = self.size.to_pixels(x, y);
        let x0 = center.x - 0.5 * dx;
        let y0 = center.y - 0.5 * dy;

        self.set_colors(color);

        if fill {
            self.context.fill_rect(x0, y0, dx, dy);
        } else {
            self.context.stroke_rect(x0, y0, dx, dy);
        }
    }

    /// Triangle rotated by `heading` radians about the agent's position.
    ///
    /// The vertices are offset from the position *after* translating to it,
    /// so the shape is not centered on the agent the way rectangles and
    /// circles are. Rendered output depends on this exact placement.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_triangle(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        heading: f64,
        color: Option<&str>,
        fill: bool,
    ) {
        let w = w * self.config.triangle_scale;
        let h = h * self.config.triangle_scale;
        let center = self.size.to_pixels(x, y);

        self.context.save();
        self.context.translate(center.x, center.y);
        self.context.rotate(heading);

        self.context.begin_path();
        self.context.move_to(center.x + w, center.y + h);
        self.context.line_to(center.x + w * 1.5, center.y - h);
        self.context.line_to(center.x + w * 2.0, center.y + h);
        self.context.close_path();

        self.set_colors(color);

        if fill {
            self.context.fill();
        } else {
            self.context.stroke();
        }

        self.context.restore();
    }

    /// Line from a normalized position along a unit heading vector.
    pub fn draw_heading_arrow(&mut self, x: f64, y: f64, heading_x: f64, heading_y: f64) {
        let center = self.size.to_pixels(x, y);
        let length = self.config.arrow_length;

        self.context.begin_path();
        self.context.move_to(center.x, center.y);
        self.context.line_to(center.x + heading_x * length, center.y + heading_y * length);
        self.context.stroke();
    }

    /// Clear the whole surface and drop any path in progress.
    pub fn reset_canvas(&mut self) {
        self.context.clear_rect(0.0, 0.0, self.size.width, self.size.height);
        self.context.begin_path();
    }

    fn set_colors(&mut self, color: Option<&str>) {
        if let Some(color) = color {
            self.context.set_stroke_style(color);
            self.context.set_fill_style(color);
        }
    }
}
