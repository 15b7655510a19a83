use serde::{Deserialize, Serialize};
use shoalviz_core::{BBox, Point};

use crate::context::{DrawingContext, TextAlign};
use crate::surface::SurfaceSize;
use crate::RenderError;

/// One drawing-context operation, in a form the frontend or a test can replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCall {
    ClearRect { x: f64, y: f64, width: f64, height: f64 },
    BeginPath,
    ClosePath,
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    Arc { x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64 },
    Fill,
    Stroke,
    FillRect { x: f64, y: f64, width: f64, height: f64 },
    StrokeRect { x: f64, y: f64, width: f64, height: f64 },
    FillText { text: String, x: f64, y: f64 },
    Save,
    Restore,
    Translate { x: f64, y: f64 },
    Rotate { angle: f64 },
    SetFillStyle { color: String },
    SetStrokeStyle { color: String },
    SetTextAlign { align: TextAlign },
}

/// Styles that `save`/`restore` push and pop.
#[derive(Debug, Clone, PartialEq)]
struct StyleState {
    fill: String,
    stroke: String,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            fill: "#000000".to_string(),
            stroke: "#000000".to_string(),
        }
    }
}

/// A headless drawing context that logs every call instead of painting.
#[derive(Debug, Clone)]
pub struct RecordingContext {
    size: SurfaceSize,
    calls: Vec<DrawCall>,
    style: StyleState,
    saved: Vec<StyleState>,
}

impl RecordingContext {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: SurfaceSize::new(width, height),
            calls: Vec::new(),
            style: StyleState::default(),
            saved: Vec::new(),
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    /// Calls issued since the last `clear_rect` that covered the whole
    /// surface. Nothing before that point can still be visible.
    pub fn visible_calls(&self) -> &[DrawCall] {
        let bounds = self.size.bounds();
        let start = self
            .calls
            .iter()
            .rposition(|call| match call {
                DrawCall::ClearRect {
                    x,
                    y,
                    width,
                    height,
                } => BBox::from_origin_size(*x, *y, *width, *height).covers(&bounds),
                _ => false,
            })
            .map_or(0, |i| i + 1);
        &self.calls[start..]
    }

    /// True when no painting operation survives the last full clear.
    pub fn is_blank(&self) -> bool {
        !self.visible_calls().iter().any(|call| {
            matches!(
                call,
                DrawCall::Fill
                    | DrawCall::Stroke
                    | DrawCall::FillRect { .. }
                    | DrawCall::StrokeRect { .. }
                    | DrawCall::FillText { .. }
            )
        })
    }

    pub fn fill_style(&self) -> &str {
        &self.style.fill
    }

    pub fn stroke_style(&self) -> &str {
        &self.style.stroke
    }

    /// Number of `save` calls not yet matched by a `restore`.
    pub fn save_depth(&self) -> usize {
        self.saved.len()
    }

    /// Visible `fill_rect` regions.
    pub fn filled_rects(&self) -> Vec<BBox> {
        self.visible_calls()
            .iter()
            .filter_map(|call| match call {
                DrawCall::FillRect {
                    x,
                    y,
                    width,
                    height,
                } => Some(BBox::from_origin_size(*x, *y, *width, *height)),
                _ => None,
            })
            .collect()
    }

    /// Visible `stroke_rect` outlines.
    pub fn stroked_rects(&self) -> Vec<BBox> {
        self.visible_calls()
            .iter()
            .filter_map(|call| match call {
                DrawCall::StrokeRect {
                    x,
                    y,
                    width,
                    height,
                } => Some(BBox::from_origin_size(*x, *y, *width, *height)),
                _ => None,
            })
            .collect()
    }

    /// Visible arcs as `(center, radius)`.
    pub fn arcs(&self) -> Vec<(Point, f64)> {
        self.visible_calls()
            .iter()
            .filter_map(|call| match call {
                DrawCall::Arc { x, y, radius, .. } => Some((Point::new(*x, *y), *radius)),
                _ => None,
            })
            .collect()
    }

    /// Visible labels with their anchor points.
    pub fn texts(&self) -> Vec<(&str, Point)> {
        self.visible_calls()
            .iter()
            .filter_map(|call| match call {
                DrawCall::FillText { text, x, y } => Some((text.as_str(), Point::new(*x, *y))),
                _ => None,
            })
            .collect()
    }

    /// Visible straight segments: every `line_to` paired with the point the
    /// pen was at.
    pub fn lines(&self) -> Vec<(Point, Point)> {
        let mut pen: Option<Point> = None;
        let mut segments = Vec::new();
        for call in self.visible_calls() {
            match call {
                DrawCall::BeginPath => pen = None,
                DrawCall::MoveTo { x, y } => pen = Some(Point::new(*x, *y)),
                DrawCall::LineTo { x, y } => {
                    let to = Point::new(*x, *y);
                    if let Some(from) = pen {
                        segments.push((from, to));
                    }
                    pen = Some(to);
                }
                _ => {}
            }
        }
        segments
    }

    pub fn to_json(&self) -> Result<String, RenderError> {
        Ok(serde_json::to_string(&self.calls)?)
    }
}

impl DrawingContext for RecordingContext {
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.calls.push(DrawCall::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn begin_path(&mut self) {
        self.calls.push(DrawCall::BeginPath);
    }

    fn close_path(&mut self) {
        self.calls.push(DrawCall::ClosePath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.calls.push(DrawCall::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.calls.push(DrawCall::LineTo { x, y });
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        self.calls.push(DrawCall::Arc {
            x,
            y,
            radius,
            start_angle,
            end_angle,
        });
    }

    fn fill(&mut self) {
        self.calls.push(DrawCall::Fill);
    }

    fn stroke(&mut self) {
        self.calls.push(DrawCall::Stroke);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.calls.push(DrawCall::FillRect {
            x,
            y,
            width,
            height,
        });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.calls.push(DrawCall::StrokeRect {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.calls.push(DrawCall::FillText {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn save(&mut self) {
        self.saved.push(self.style.clone());
        self.calls.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        // Unbalanced restores are ignored, as on a canvas.
        if let Some(style) = self.saved.pop() {
            self.style = style;
        }
        self.calls.push(DrawCall::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.calls.push(DrawCall::Translate { x, y });
    }

    fn rotate(&mut self, angle: f64) {
        self.calls.push(DrawCall::Rotate { angle });
    }

    fn set_fill_style(&mut self, color: &str) {
        self.style.fill = color.to_string();
        self.calls.push(DrawCall::SetFillStyle {
            color: color.to_string(),
        });
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.style.stroke = color.to_string();
        self.calls.push(DrawCall::SetStrokeStyle {
            color: color.to_string(),
        });
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.calls.push(DrawCall::SetTextAlign { align });
    }
}
