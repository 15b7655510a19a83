use shoalviz_core::{AgentRecord, Frame};

use crate::config::VisualizationConfig;
use crate::context::DrawingContext;
use crate::recording::RecordingContext;
use crate::visualization::ContinuousVisualization;
use crate::RenderError;

/// Creates a drawing surface and hands back its 2D context.
///
/// Placing the surface in a host page (or not having a page at all) is the
/// factory's business; the renderer only ever sees the context.
pub trait SurfaceFactory {
    type Context: DrawingContext;

    fn create_surface(
        &mut self,
        width: u32,
        height: u32,
        config: &VisualizationConfig,
    ) -> Result<Self::Context, RenderError>;
}

/// Produces headless [`RecordingContext`] surfaces.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordingSurfaceFactory;

impl SurfaceFactory for RecordingSurfaceFactory {
    type Context = RecordingContext;

    fn create_surface(
        &mut self,
        width: u32,
        height: u32,
        _config: &VisualizationConfig,
    ) -> Result<RecordingContext, RenderError> {
        Ok(RecordingContext::new(f64::from(width), f64::from(height)))
    }
}

/// Owns one drawing surface and redraws it once per simulation step.
pub struct SimpleContinuousModule<C> {
    canvas: ContinuousVisualization<C>,
    width: u32,
    height: u32,
}

impl<C: DrawingContext> SimpleContinuousModule<C> {
    pub fn new<F>(factory: &mut F, width: u32, height: u32) -> Result<Self, RenderError>
    where
        F: SurfaceFactory<Context = C>,
    {
        Self::with_config(factory, width, height, VisualizationConfig::default())
    }

    pub fn with_config<F>(
        factory: &mut F,
        width: u32,
        height: u32,
        config: VisualizationConfig,
    ) -> Result<Self, RenderError>
    where
        F: SurfaceFactory<Context = C>,
    {
        let context = factory.create_surface(width, height, &config)?;
        log::info!("Created {}x{} continuous canvas", width, height);
        Ok(Self {
            canvas: ContinuousVisualization::with_config(
                context,
                f64::from(width),
                f64::from(height),
                config,
            ),
            width,
            height,
        })
    }

    /// Clear the surface, then draw `frame`.
    pub fn render(&mut self, frame: &[AgentRecord]) {
        self.canvas.reset_canvas();
        self.canvas.draw(frame);
    }

    /// Parse a JSON frame payload and render it. The surface is left
    /// untouched when the payload does not parse.
    pub fn render_json(&mut self, json: &str) -> Result<(), RenderError> {
        let frame = Frame::from_json(json)?;
        self.render(frame.as_slice());
        Ok(())
    }

    /// Clear the surface without drawing.
    pub fn reset(&mut self) {
        self.canvas.reset_canvas();
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn visualization(&self) -> &ContinuousVisualization<C> {
        &self.canvas
    }

    pub fn context(&self) -> &C {
        self.canvas.context()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoalviz_core::{Point, SimpleCanvas, SpaceBounds};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn module(width: u32, height: u32) -> SimpleContinuousModule<RecordingContext> {
        SimpleContinuousModule::new(&mut RecordingSurfaceFactory, width, height).unwrap()
    }

    struct FailingFactory;

    impl SurfaceFactory for FailingFactory {
        type Context = RecordingContext;

        fn create_surface(
            &mut self,
            _width: u32,
            _height: u32,
            config: &VisualizationConfig,
        ) -> Result<RecordingContext, RenderError> {
            Err(RenderError::Surface(format!(
                "no element with id '{}'",
                config.container_id
            )))
        }
    }

    #[test]
    fn test_construction_sizes_surface() {
        init_logger();
        let m = module(640, 480);
        assert_eq!(m.width(), 640);
        assert_eq!(m.height(), 480);
        assert_eq!(m.context().size().width, 640.0);
        assert_eq!(m.visualization().size().height, 480.0);
    }

    #[test]
    fn test_factory_failure_propagates() {
        let err = SimpleContinuousModule::new(&mut FailingFactory, 10, 10)
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "Failed to create drawing surface: no element with id 'elements'"
        );
    }

    #[test]
    fn test_render_clears_before_drawing() {
        init_logger();
        let mut m = module(100, 100);
        m.render(&[AgentRecord::rectangle(0.5, 0.5, 0.2, 0.1).with_filled(true)]);
        m.render(&[AgentRecord::circle(0.5, 0.5, 5.0)]);
        let ctx = m.context();
        assert!(ctx.filled_rects().is_empty());
        assert_eq!(ctx.arcs().len(), 1);
    }

    #[test]
    fn test_render_is_idempotent() {
        init_logger();
        let frame = vec![
            AgentRecord::triangle(0.3, 0.3, 1.0, 1.0, 1.0)
                .with_id("T")
                .with_color("teal"),
            AgentRecord::circle(0.7, 0.2, 6.0)
                .with_filled(true)
                .with_vision(15.0)
                .with_heading_vector(0.6, 0.8),
        ];
        let mut m = module(300, 200);
        m.render(&frame);
        let once = m.context().visible_calls().to_vec();
        m.render(&frame);
        assert_eq!(m.context().visible_calls(), once.as_slice());
    }

    #[test]
    fn test_reset_leaves_blank_surface() {
        let mut m = module(50, 50);
        m.render(&[AgentRecord::circle(0.5, 0.5, 5.0).with_id("x")]);
        assert!(!m.context().is_blank());
        m.reset();
        assert!(m.context().is_blank());
    }

    #[test]
    fn test_render_json_payload() {
        init_logger();
        let mut m = module(100, 100);
        m.render_json(r#"[{"id": 1, "x": 0.5, "y": 0.5, "shape": "rect", "w": 0.2, "h": 0.1, "color": "red", "filled": true}]"#)
            .unwrap();
        assert_eq!(m.context().filled_rects().len(), 1);
        assert_eq!(m.context().texts(), vec![("1", Point::new(50.0, 35.0))]);

        let before = m.context().calls().len();
        assert!(m.render_json("not json").is_err());
        assert_eq!(m.context().calls().len(), before);
    }

    #[test]
    fn test_bad_agent_does_not_block_frame() {
        init_logger();
        let good = r#"{"id": "B", "x": 0.2, "y": 0.8, "shape": "circle", "r": 5}"#;
        for bad in [
            r#"{"x": 0.5, "y": 0.5, "shape": "circle", "r": "abc"}"#,
            r#"{"x": null, "y": 0.5, "shape": "circle", "r": 5}"#,
            r#"{"x": 0.5, "y": 0.5, "shape": null, "r": 5}"#,
            r#"{"x": 0.5, "y": 0.5, "shape": "rect", "Shape": "circle", "w": 0.1, "h": 0.1}"#,
        ] {
            let mut m = module(100, 100);
            m.render_json(&format!("[{bad}, {good}]")).unwrap();

            let ctx = m.context();
            let (center, radius) = *ctx.arcs().last().unwrap();
            assert!((center.x - 20.0).abs() < 1e-9);
            assert!((center.y - 80.0).abs() < 1e-9);
            assert_eq!(radius, 5.0);
            assert_eq!(ctx.texts().last().map(|t| t.0), Some("B"));
        }
    }

    #[test]
    fn test_portrayed_frame_renders() {
        let canvas = SimpleCanvas::new(
            |_: &Point| AgentRecord::circle(0.0, 0.0, 3.0).with_color("Blue").with_filled(true),
            SpaceBounds::from_size(50.0, 50.0),
        );
        let frame = canvas.render(&[Point::new(25.0, 25.0), Point::new(50.0, 0.0)]);

        let mut m = module(canvas.canvas_width, canvas.canvas_height);
        m.render(frame.as_slice());
        let arcs = m.context().arcs();
        assert_eq!(arcs[0].0, Point::new(250.0, 250.0));
        assert_eq!(arcs[1].0, Point::new(500.0, 0.0));
    }
}
