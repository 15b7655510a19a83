//! HTML canvas binding, compiled with the `web` feature.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::config::VisualizationConfig;
use crate::context::{DrawingContext, TextAlign};
use crate::module::SurfaceFactory;
use crate::RenderError;

/// Creates `<canvas>` elements inside the configured page container.
#[derive(Debug, Default, Clone, Copy)]
pub struct CanvasSurfaceFactory;

impl SurfaceFactory for CanvasSurfaceFactory {
    type Context = CanvasContext;

    fn create_surface(
        &mut self,
        width: u32,
        height: u32,
        config: &VisualizationConfig,
    ) -> Result<CanvasContext, RenderError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| RenderError::Surface("no document available".to_string()))?;

        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| RenderError::Surface("created element is not a canvas".to_string()))?;
        canvas.set_width(width);
        canvas.set_height(height);
        canvas
            .set_attribute("style", &config.surface_style)
            .map_err(js_error)?;

        let container = document
            .get_element_by_id(&config.container_id)
            .ok_or_else(|| {
                RenderError::Surface(format!("no element with id '{}'", config.container_id))
            })?;
        container.append_child(&canvas).map_err(js_error)?;

        let context = canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or_else(|| RenderError::Surface("canvas has no 2d context".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::Surface("unexpected 2d context type".to_string()))?;

        log::info!(
            "Appended {}x{} canvas to #{}",
            width,
            height,
            config.container_id
        );
        Ok(CanvasContext { canvas, context })
    }
}

fn js_error(err: JsValue) -> RenderError {
    RenderError::Surface(format!("{err:?}"))
}

/// Draw calls never fail the frame; a rejected call is only logged.
fn report(op: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::warn!("canvas {} failed: {:?}", op, err);
    }
}

/// [`DrawingContext`] over a page canvas.
pub struct CanvasContext {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasContext {
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl DrawingContext for CanvasContext {
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.context.clear_rect(x, y, width, height);
    }

    fn begin_path(&mut self) {
        self.context.begin_path();
    }

    fn close_path(&mut self) {
        self.context.close_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.context.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.context.line_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        report(
            "arc",
            self.context.arc(x, y, radius, start_angle, end_angle),
        );
    }

    fn fill(&mut self) {
        self.context.fill();
    }

    fn stroke(&mut self) {
        self.context.stroke();
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.context.fill_rect(x, y, width, height);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.context.stroke_rect(x, y, width, height);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        report("fill_text", self.context.fill_text(text, x, y));
    }

    fn save(&mut self) {
        self.context.save();
    }

    fn restore(&mut self) {
        self.context.restore();
    }

    fn translate(&mut self, x: f64, y: f64) {
        report("translate", self.context.translate(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        report("rotate", self.context.rotate(angle));
    }

    #[allow(deprecated)]
    fn set_fill_style(&mut self, color: &str) {
        self.context.set_fill_style(&JsValue::from_str(color));
    }

    #[allow(deprecated)]
    fn set_stroke_style(&mut self, color: &str) {
        self.context.set_stroke_style(&JsValue::from_str(color));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.context.set_text_align(align.as_str());
    }
}
