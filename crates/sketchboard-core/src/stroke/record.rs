//! Persisted stroke records as exchanged with the store.
//!
//! The wire shape is flat: variant-specific fields are optional and only
//! present for the variant named by `type`. Decoding is per record so that a
//! single malformed entry can be dropped without failing a whole push.

use super::{Color, ColorError, Stroke, StrokeError, StrokeId, StrokeKind, StrokeStyle};
use crate::board::BoardId;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Font size assumed for text records that omit one.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Variant tag carried in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeType {
    Path,
    Rectangle,
    Circle,
    Line,
    Text,
}

impl StrokeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrokeType::Path => "path",
            StrokeType::Rectangle => "rectangle",
            StrokeType::Circle => "circle",
            StrokeType::Line => "line",
            StrokeType::Text => "text",
        }
    }
}

impl fmt::Display for StrokeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrokeType {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(StrokeType::Path),
            "rectangle" => Ok(StrokeType::Rectangle),
            "circle" => Ok(StrokeType::Circle),
            "line" => Ok(StrokeType::Line),
            "text" => Ok(StrokeType::Text),
            other => Err(DecodeError::UnknownType(other.to_string())),
        }
    }
}

/// Why a persisted record could not be turned into a [`Stroke`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unknown stroke type {0:?}")]
    UnknownType(String),
    #[error("{stroke_type} record is missing `{field}`")]
    MissingField {
        stroke_type: StrokeType,
        field: &'static str,
    },
    #[error("line record needs exactly 4 coordinates, got {0}")]
    LineArity(usize),
    #[error("bad color: {0}")]
    Color(#[from] ColorError),
    #[error("invalid stroke: {0}")]
    Invalid(#[from] StrokeError),
}

/// Fields of a stroke as sent to `addStroke`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStroke {
    pub board_id: BoardId,
    #[serde(rename = "type")]
    pub stroke_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<f64>>,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    pub stroke_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    pub stroke_width: f64,
    pub opacity: f64,
    pub order: u32,
}

impl NewStroke {
    /// Encode a stroke for persistence on `board_id`.
    pub fn from_stroke(board_id: &BoardId, stroke: &Stroke) -> Self {
        let mut record = Self {
            board_id: board_id.clone(),
            stroke_type: stroke.stroke_type().as_str().to_string(),
            points: None,
            x: stroke.origin.x,
            y: stroke.origin.y,
            width: None,
            height: None,
            radius: None,
            text: None,
            font_size: None,
            stroke_color: stroke.style.stroke_color.to_string(),
            fill_color: stroke.style.fill_color.map(|c| c.to_string()),
            stroke_width: stroke.style.stroke_width,
            opacity: stroke.style.opacity,
            order: stroke.order,
        };
        match &stroke.kind {
            StrokeKind::Path { points } => record.points = Some(points.clone()),
            StrokeKind::Line { points } => record.points = Some(points.to_vec()),
            StrokeKind::Rectangle { width, height } => {
                record.width = Some(*width);
                record.height = Some(*height);
            }
            StrokeKind::Circle { radius } => record.radius = Some(*radius),
            StrokeKind::Text { text, font_size } => {
                record.text = Some(text.clone());
                record.font_size = Some(*font_size);
            }
        }
        record
    }
}

/// A stroke as stored: the store's id plus the submitted fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeRecord {
    pub id: StrokeId,
    #[serde(flatten)]
    pub fields: NewStroke,
}

impl StrokeRecord {
    pub fn new(id: StrokeId, fields: NewStroke) -> Self {
        Self { id, fields }
    }

    pub fn from_stroke(board_id: &BoardId, stroke: &Stroke) -> Self {
        Self::new(stroke.id.clone(), NewStroke::from_stroke(board_id, stroke))
    }

    /// Decode into the local representation.
    pub fn decode(&self) -> Result<Stroke, DecodeError> {
        Stroke::try_from(self)
    }
}

impl TryFrom<&StrokeRecord> for Stroke {
    type Error = DecodeError;

    fn try_from(record: &StrokeRecord) -> Result<Self, Self::Error> {
        let fields = &record.fields;
        let stroke_type: StrokeType = fields.stroke_type.parse()?;
        let missing = |field| DecodeError::MissingField { stroke_type, field };

        let kind = match stroke_type {
            StrokeType::Path => StrokeKind::Path {
                points: fields.points.clone().ok_or_else(|| missing("points"))?,
            },
            StrokeType::Rectangle => StrokeKind::Rectangle {
                width: fields.width.ok_or_else(|| missing("width"))?,
                height: fields.height.ok_or_else(|| missing("height"))?,
            },
            StrokeType::Circle => StrokeKind::Circle {
                radius: fields.radius.ok_or_else(|| missing("radius"))?,
            },
            StrokeType::Line => {
                let points = fields.points.as_deref().ok_or_else(|| missing("points"))?;
                let points: [f64; 4] = points
                    .try_into()
                    .map_err(|_| DecodeError::LineArity(points.len()))?;
                StrokeKind::Line { points }
            }
            StrokeType::Text => StrokeKind::Text {
                text: fields.text.clone().unwrap_or_default(),
                font_size: fields.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            },
        };

        let style = StrokeStyle {
            stroke_color: Color::parse_hex(&fields.stroke_color)?,
            fill_color: fields.fill_color.as_deref().map(Color::parse_hex).transpose()?,
            stroke_width: fields.stroke_width,
            opacity: fields.opacity,
        };

        let stroke = Stroke::new(
            record.id.clone(),
            Point::new(fields.x, fields.y),
            style,
            fields.order,
            kind,
        );
        stroke.validate()?;
        Ok(stroke)
    }
}
