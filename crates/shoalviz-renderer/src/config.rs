use serde::{Deserialize, Serialize};

use crate::RenderError;

/// Drawing constants and page-placement settings for a continuous canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    /// Length in pixels of a unit heading vector.
    pub arrow_length: f64,
    /// Distance in pixels between an agent's position and its label baseline.
    pub label_offset: f64,
    pub label_color: String,
    /// Enlargement applied to triangle `w`/`h` before drawing.
    pub triangle_scale: f64,
    /// Id of the page element the canvas is appended to.
    pub container_id: String,
    /// Inline style applied to a freshly created canvas element.
    pub surface_style: String,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            arrow_length: 30.0,
            label_offset: 15.0,
            label_color: "red".to_string(),
            triangle_scale: 3.0,
            container_id: "elements".to_string(),
            surface_style: "grid-row: 1 / span 2;border:1px dotted".to_string(),
        }
    }
}

impl VisualizationConfig {
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, RenderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
