use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Malformed frame payload: {0}")]
    Json(#[from] serde_json::Error),
}

// ── Agent label ───────────────────────────────────────────────────────

/// Label drawn above an agent. Simulations send either integers or strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AgentId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Integral floats print without a fraction, as JS does.
            AgentId::Number(n) => match n.as_f64() {
                Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 1e15 => {
                    write!(f, "{}", v as i64)
                }
                _ => write!(f, "{n}"),
            },
            AgentId::Text(s) => f.write_str(s),
        }
    }
}

impl AgentId {
    /// `null` means no label. Booleans and other scalars are labelled with
    /// their JSON text.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => Some(AgentId::Number(n.clone())),
            Value::String(s) => Some(AgentId::Text(s.clone())),
            other => Some(AgentId::Text(other.to_string())),
        }
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        AgentId::Text(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        AgentId::Text(s)
    }
}

impl From<u64> for AgentId {
    fn from(n: u64) -> Self {
        AgentId::Number(n.into())
    }
}

// ── Shapes ────────────────────────────────────────────────────────────

/// The `shape` tag as it appears on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeTag {
    #[serde(rename = "rect")]
    Rectangle,
    Circle,
    Triangle,
    /// Any tag this renderer does not draw. Such agents still get overlays.
    #[default]
    Unknown,
}

impl ShapeTag {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "rect" | "rectangle" => ShapeTag::Rectangle,
            "circle" => ShapeTag::Circle,
            "triangle" => ShapeTag::Triangle,
            _ => ShapeTag::Unknown,
        }
    }
}

/// A record's shape resolved together with its shape-specific sizes.
///
/// Sizes missing from the record come through as `NaN`, which draws as
/// nothing on a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// `w`/`h` are fractions of the surface size.
    Rectangle { w: f64, h: f64 },
    /// `r` is in pixels.
    Circle { r: f64 },
    /// `w`/`h` are pixel offsets, `heading` is in radians.
    Triangle { w: f64, h: f64, heading: f64 },
    Unknown,
}

// ── Agent record ──────────────────────────────────────────────────────

/// One agent's portrayal for a single step, exactly as the simulation sends it.
///
/// Deserialization never fails on a bad field: see [`AgentRecord::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<AgentId>,
    /// Normalized position, expected in `[0, 1]` but never clamped.
    pub x: f64,
    pub y: f64,
    pub shape: ShapeTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
    /// Any CSS colour string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub filled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision: Option<f64>,
    pub show_vision_range: bool,
    pub show_heading_vector: bool,
}

impl<'de> Deserialize<'de> for AgentRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// First of `keys` present in `map`. The camelCase key wins over its alias.
fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| map.get(*key))
}

/// `null` counts as absent. Strings are parsed; anything unparseable is `NaN`.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(s.trim().parse().unwrap_or(f64::NAN)),
        _ => Some(f64::NAN),
    }
}

/// Accepts JSON booleans as well as the `"true"`/`"false"` strings that
/// portrayal dictionaries commonly carry. Anything else counts as unset.
fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

impl AgentRecord {
    /// Read one agent from a JSON value without ever rejecting it.
    ///
    /// Each bad field degrades on its own: a malformed number becomes `NaN`,
    /// a non-string shape becomes [`ShapeTag::Unknown`], a non-string colour
    /// is dropped. A value that is not an object yields an empty record.
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let map = value.as_object().unwrap_or(&empty);
        let num = |keys: &[&str]| field(map, keys).and_then(number);
        let on = |keys: &[&str]| field(map, keys).is_some_and(flag);

        Self {
            id: field(map, &["id"]).and_then(AgentId::from_value),
            x: num(&["x"]).unwrap_or(f64::NAN),
            y: num(&["y"]).unwrap_or(f64::NAN),
            shape: field(map, &["shape", "Shape"])
                .and_then(Value::as_str)
                .map_or(ShapeTag::Unknown, ShapeTag::from_tag),
            w: num(&["w"]),
            h: num(&["h"]),
            r: num(&["r"]),
            color: field(map, &["color", "Color"])
                .and_then(Value::as_str)
                .map(str::to_string),
            filled: on(&["filled", "Filled"]),
            heading: num(&["heading"]),
            heading_x: num(&["headingX"]),
            heading_y: num(&["headingY"]),
            vision: num(&["vision"]),
            show_vision_range: on(&["showVisionRange"]),
            show_heading_vector: on(&["showHeadingVector"]),
        }
    }

    pub fn new(shape: ShapeTag, x: f64, y: f64) -> Self {
        Self {
            id: None,
            x,
            y,
            shape,
            w: None,
            h: None,
            r: None,
            color: None,
            filled: false,
            heading: None,
            heading_x: None,
            heading_y: None,
            vision: None,
            show_vision_range: false,
            show_heading_vector: false,
        }
    }

    pub fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            w: Some(w),
            h: Some(h),
            ..Self::new(ShapeTag::Rectangle, x, y)
        }
    }

    pub fn circle(x: f64, y: f64, r: f64) -> Self {
        Self {
            r: Some(r),
            ..Self::new(ShapeTag::Circle, x, y)
        }
    }

    pub fn triangle(x: f64, y: f64, w: f64, h: f64, heading: f64) -> Self {
        Self {
            w: Some(w),
            h: Some(h),
            heading: Some(heading),
            ..Self::new(ShapeTag::Triangle, x, y)
        }
    }

    pub fn with_id(mut self, id: impl Into<AgentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_filled(mut self, filled: bool) -> Self {
        self.filled = filled;
        self
    }

    /// Set the vision radius (pixels) and turn on the vision-range ring.
    pub fn with_vision(mut self, radius: f64) -> Self {
        self.vision = Some(radius);
        self.show_vision_range = true;
        self
    }

    /// Set the unit heading vector and turn on the heading arrow.
    pub fn with_heading_vector(mut self, heading_x: f64, heading_y: f64) -> Self {
        self.heading_x = Some(heading_x);
        self.heading_y = Some(heading_y);
        self.show_heading_vector = true;
        self
    }

    /// Resolve the shape tag into its payload.
    pub fn geometry(&self) -> Shape {
        let or_nan = |v: Option<f64>| v.unwrap_or(f64::NAN);
        match self.shape {
            ShapeTag::Rectangle => Shape::Rectangle {
                w: or_nan(self.w),
                h: or_nan(self.h),
            },
            ShapeTag::Circle => Shape::Circle { r: or_nan(self.r) },
            ShapeTag::Triangle => Shape::Triangle {
                w: or_nan(self.w),
                h: or_nan(self.h),
                heading: or_nan(self.heading),
            },
            ShapeTag::Unknown => Shape::Unknown,
        }
    }

    /// Vision radius to outline, if the ring is switched on.
    pub fn vision_range(&self) -> Option<f64> {
        self.show_vision_range.then(|| self.vision.unwrap_or(f64::NAN))
    }

    /// Heading direction to draw, if the arrow is switched on.
    pub fn heading_vector(&self) -> Option<(f64, f64)> {
        self.show_heading_vector.then(|| {
            (
                self.heading_x.unwrap_or(f64::NAN),
                self.heading_y.unwrap_or(f64::NAN),
            )
        })
    }
}

// ── Frame ─────────────────────────────────────────────────────────────

/// Every agent for one render call. Order is paint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame {
    pub agents: Vec<AgentRecord>,
}

impl Frame {
    pub fn new() -> Self {
        Self { agents: Vec::new() }
    }

    pub fn push(&mut self, agent: AgentRecord) {
        self.agents.push(agent);
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn as_slice(&self) -> &[AgentRecord] {
        &self.agents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AgentRecord> {
        self.agents.iter()
    }

    pub fn from_json(json: &str) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, FrameError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl FromIterator<AgentRecord> for Frame {
    fn from_iter<I: IntoIterator<Item = AgentRecord>>(iter: I) -> Self {
        Self {
            agents: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Frame {
    type Item = &'a AgentRecord;
    type IntoIter = std::slice::Iter<'a, AgentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.agents.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let json = r#"[{
            "id": "A1", "x": 0.25, "y": 0.75, "shape": "triangle",
            "w": 2, "h": 3, "color": "blue", "filled": true,
            "heading": 1.5, "headingX": 0.0, "headingY": 1.0,
            "vision": 10, "showVisionRange": true, "showHeadingVector": false
        }]"#;
        let frame = Frame::from_json(json).unwrap();
        assert_eq!(frame.len(), 1);
        let a = &frame.agents[0];
        assert_eq!(a.id, Some(AgentId::from("A1")));
        assert_eq!(a.shape, ShapeTag::Triangle);
        assert_eq!(a.color.as_deref(), Some("blue"));
        assert!(a.filled);
        assert_eq!(
            a.geometry(),
            Shape::Triangle {
                w: 2.0,
                h: 3.0,
                heading: 1.5
            }
        );
        assert_eq!(a.vision_range(), Some(10.0));
        assert_eq!(a.heading_vector(), None);
    }

    #[test]
    fn test_shape_tags() {
        let frame = Frame::from_json(
            r#"[{"x":0,"y":0,"shape":"rect"},
                {"x":0,"y":0,"shape":"rectangle"},
                {"x":0,"y":0,"shape":"circle"},
                {"x":0,"y":0,"shape":"hexagon"},
                {"x":0,"y":0}]"#,
        )
        .unwrap();
        let tags: Vec<ShapeTag> = frame.iter().map(|a| a.shape).collect();
        assert_eq!(
            tags,
            vec![
                ShapeTag::Rectangle,
                ShapeTag::Rectangle,
                ShapeTag::Circle,
                ShapeTag::Unknown,
                ShapeTag::Unknown,
            ]
        );
        assert_eq!(frame.agents[3].geometry(), Shape::Unknown);
    }

    #[test]
    fn test_portrayal_style_keys() {
        let json = r#"[{"Shape": "circle", "r": 3, "Filled": "true", "Color": "Blue", "x": 0.1, "y": 0.2, "id": 7}]"#;
        let frame = Frame::from_json(json).unwrap();
        let a = &frame.agents[0];
        assert_eq!(a.shape, ShapeTag::Circle);
        assert!(a.filled);
        assert_eq!(a.color.as_deref(), Some("Blue"));
        assert_eq!(a.id.as_ref().map(|id| id.to_string()), Some("7".to_string()));
    }

    #[test]
    fn test_missing_sizes_become_nan() {
        let frame = Frame::from_json(r#"[{"shape":"rect"}]"#).unwrap();
        let a = &frame.agents[0];
        assert!(a.x.is_nan());
        assert!(a.id.is_none());
        match a.geometry() {
            Shape::Rectangle { w, h } => assert!(w.is_nan() && h.is_nan()),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_flag_strings() {
        let frame = Frame::from_json(
            r#"[{"x":0,"y":0,"filled":"false","showHeadingVector":"true","headingX":1,"headingY":0},
                {"x":0,"y":0,"filled":null}]"#,
        )
        .unwrap();
        assert!(!frame.agents[0].filled);
        assert_eq!(frame.agents[0].heading_vector(), Some((1.0, 0.0)));
        assert!(!frame.agents[1].filled);
    }

    #[test]
    fn test_builders_round_trip_through_json() {
        let frame: Frame = vec![
            AgentRecord::circle(0.5, 0.5, 10.0)
                .with_id(3u64)
                .with_color("red")
                .with_filled(true)
                .with_vision(25.0),
            AgentRecord::rectangle(0.1, 0.9, 0.2, 0.1).with_heading_vector(0.0, -1.0),
        ]
        .into_iter()
        .collect();
        let json = frame.to_json().unwrap();
        assert!(json.contains("\"showVisionRange\":true"));
        assert!(json.contains("\"shape\":\"rect\""));
        assert_eq!(Frame::from_json(&json).unwrap(), frame);
    }

    #[test]
    fn test_malformed_payload() {
        let err = Frame::from_json("{\"not\": \"a list\"}").unwrap_err();
        assert!(err.to_string().starts_with("Malformed frame payload"));
    }

    #[test]
    fn test_bad_fields_degrade_per_agent() {
        let frame = Frame::from_json(
            r#"[{"x": 0.5, "y": 0.5, "shape": "circle", "r": "abc"},
                {"x": null, "y": 0.5, "shape": "circle", "r": 4},
                {"x": 0.5, "y": 0.5, "shape": null, "r": 4},
                {"x": 0.5, "y": 0.5, "shape": 5, "color": 12, "w": true},
                {"x": 0.5, "y": 0.5, "shape": "circle", "r": 6}]"#,
        )
        .unwrap();
        assert_eq!(frame.len(), 5);

        match frame.agents[0].geometry() {
            Shape::Circle { r } => assert!(r.is_nan()),
            other => panic!("unexpected shape {other:?}"),
        }
        assert!(frame.agents[1].x.is_nan());
        assert_eq!(frame.agents[1].geometry(), Shape::Circle { r: 4.0 });
        assert_eq!(frame.agents[2].shape, ShapeTag::Unknown);
        assert_eq!(frame.agents[3].shape, ShapeTag::Unknown);
        assert!(frame.agents[3].color.is_none());
        assert!(frame.agents[3].w.unwrap().is_nan());
        assert_eq!(frame.agents[4].geometry(), Shape::Circle { r: 6.0 });
    }

    #[test]
    fn test_key_and_alias_together() {
        let frame = Frame::from_json(
            r#"[{"x": 0, "y": 0, "shape": "triangle", "Shape": "circle",
                 "Color": "Blue", "color": "red", "filled": false, "Filled": "true"}]"#,
        )
        .unwrap();
        let a = &frame.agents[0];
        assert_eq!(a.shape, ShapeTag::Triangle);
        assert_eq!(a.color.as_deref(), Some("red"));
        assert!(!a.filled);
    }

    #[test]
    fn test_numeric_strings_and_non_objects() {
        let frame = Frame::from_json(r#"[{"x": "0.25", "y": " 1 ", "vision": null}, 5]"#).unwrap();
        assert_eq!(frame.agents[0].x, 0.25);
        assert_eq!(frame.agents[0].y, 1.0);
        assert!(frame.agents[0].vision.is_none());
        let empty = &frame.agents[1];
        assert!(empty.x.is_nan());
        assert!(empty.id.is_none());
        assert_eq!(empty.shape, ShapeTag::Unknown);
    }

    #[test]
    fn test_id_text() {
        let frame =
            Frame::from_json(r#"[{"id": 1.0}, {"id": 2.5}, {"id": null}, {"id": true}, {"id": "B"}]"#)
                .unwrap();
        let ids: Vec<Option<String>> = frame
            .iter()
            .map(|a| a.id.as_ref().map(|id| id.to_string()))
            .collect();
        assert_eq!(
            ids,
            vec![
                Some("1".to_string()),
                Some("2.5".to_string()),
                None,
                Some("true".to_string()),
                Some("B".to_string()),
            ]
        );
    }
}
