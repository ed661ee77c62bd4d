//! Stroke definitions for a board.

mod builder;
mod color;
mod record;

pub use builder::{CandidateBuilder, DEFAULT_ERASER_WIDTH_FACTOR};
pub use color::{Color, ColorError};
pub use record::{DEFAULT_FONT_SIZE, DecodeError, NewStroke, StrokeRecord, StrokeType};

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Opaque stroke identifier.
///
/// Client-generated until the store acknowledges the stroke, after which the
/// store's identifier replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeId(String);

impl StrokeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh client-side identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation failures for a stroke.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrokeError {
    #[error("stroke width must be positive, got {0}")]
    NonPositiveWidth(f64),
    #[error("opacity must be within [0, 1], got {0}")]
    OpacityOutOfRange(f64),
    #[error("path needs an even number of at least 2 coordinates, got {0}")]
    BadPointCount(usize),
    #[error("negative extent {0}")]
    NegativeExtent(f64),
    #[error("non-finite coordinate")]
    NonFinite,
}

/// Paint properties shared by all variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub stroke_color: Color,
    pub fill_color: Option<Color>,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            stroke_color: Color::BLACK,
            fill_color: None,
            stroke_width: 2.0,
            opacity: 1.0,
        }
    }
}

/// Variant payload of a stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrokeKind {
    /// Freehand path as flat `[x1, y1, x2, y2, ...]` coordinates.
    Path { points: Vec<f64> },
    Rectangle { width: f64, height: f64 },
    Circle { radius: f64 },
    /// Straight segment `[x1, y1, x2, y2]`.
    Line { points: [f64; 4] },
    Text { text: String, font_size: f64 },
}

impl StrokeKind {
    pub fn stroke_type(&self) -> StrokeType {
        match self {
            StrokeKind::Path { .. } => StrokeType::Path,
            StrokeKind::Rectangle { .. } => StrokeType::Rectangle,
            StrokeKind::Circle { .. } => StrokeType::Circle,
            StrokeKind::Line { .. } => StrokeType::Line,
            StrokeKind::Text { .. } => StrokeType::Text,
        }
    }
}

/// A committed or candidate vector shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: StrokeId,
    /// Origin of the shape: top-left for rectangles, center for circles,
    /// (0, 0) for point-based variants.
    pub origin: Point,
    pub style: StrokeStyle,
    /// Paint order, ascending.
    pub order: u32,
    pub kind: StrokeKind,
}

impl Stroke {
    pub fn new(
        id: StrokeId,
        origin: Point,
        style: StrokeStyle,
        order: u32,
        kind: StrokeKind,
    ) -> Self {
        Self {
            id,
            origin,
            style,
            order,
            kind,
        }
    }

    pub fn stroke_type(&self) -> StrokeType {
        self.kind.stroke_type()
    }

    /// Check the numeric invariants of the stroke.
    pub fn validate(&self) -> Result<(), StrokeError> {
        let width = self.style.stroke_width;
        if !width.is_finite() || width <= 0.0 {
            return Err(StrokeError::NonPositiveWidth(width));
        }
        let opacity = self.style.opacity;
        if !(0.0..=1.0).contains(&opacity) {
            return Err(StrokeError::OpacityOutOfRange(opacity));
        }
        if !self.origin.is_finite() {
            return Err(StrokeError::NonFinite);
        }
        let extents = match &self.kind {
            StrokeKind::Path { points } => {
                if points.len() < 2 || points.len() % 2 != 0 {
                    return Err(StrokeError::BadPointCount(points.len()));
                }
                if points.iter().any(|v| !v.is_finite()) {
                    return Err(StrokeError::NonFinite);
                }
                vec![]
            }
            StrokeKind::Line { points } => {
                if points.iter().any(|v| !v.is_finite()) {
                    return Err(StrokeError::NonFinite);
                }
                vec![]
            }
            StrokeKind::Rectangle { width, height } => vec![*width, *height],
            StrokeKind::Circle { radius } => vec![*radius],
            StrokeKind::Text { font_size, .. } => vec![*font_size],
        };
        for extent in extents {
            if !extent.is_finite() {
                return Err(StrokeError::NonFinite);
            }
            if extent < 0.0 {
                return Err(StrokeError::NegativeExtent(extent));
            }
        }
        Ok(())
    }

    /// Axis-aligned bounds in board coordinates, ignoring stroke width.
    pub fn bounds(&self) -> Rect {
        match &self.kind {
            StrokeKind::Path { points } => points_bounds(points),
            StrokeKind::Line { points } => points_bounds(points),
            StrokeKind::Rectangle { width, height } => {
                Rect::new(
                    self.origin.x,
                    self.origin.y,
                    self.origin.x + width,
                    self.origin.y + height,
                )
            }
            StrokeKind::Circle { radius } => {
                Rect::from_center_size(self.origin, (radius * 2.0, radius * 2.0))
            }
            StrokeKind::Text { .. } => Rect::from_origin_size(self.origin, (0.0, 0.0)),
        }
    }
}

fn points_bounds(points: &[f64]) -> Rect {
    let mut pairs = points.chunks_exact(2).map(|p| Point::new(p[0], p[1]));
    let Some(first) = pairs.next() else {
        return Rect::ZERO;
    };
    pairs.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p))
}

/// Ordered strokes of one board in paint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeCollection {
    strokes: Vec<Stroke>,
}

impl StrokeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stroke> {
        self.strokes.iter()
    }

    pub fn get(&self, id: &StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &StrokeId) -> bool {
        self.get(id).is_some()
    }

    /// Order value for the next appended stroke.
    pub fn next_order(&self) -> u32 {
        self.strokes.len() as u32
    }

    /// Append a stroke on top of the paint order.
    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Swap a stroke id for another. Returns true if a stroke was renamed.
    pub fn rename(&mut self, from: &StrokeId, to: &StrokeId) -> bool {
        match self.strokes.iter_mut().find(|s| &s.id == from) {
            Some(stroke) => {
                stroke.id = to.clone();
                true
            }
            None => false,
        }
    }

    /// Union of all stroke bounds.
    pub fn bounds(&self) -> Option<Rect> {
        self.strokes
            .iter()
            .map(Stroke::bounds)
            .reduce(|acc, r| acc.union(r))
    }
}

impl From<Vec<Stroke>> for StrokeCollection {
    fn from(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }
}

impl FromIterator<Stroke> for StrokeCollection {
    fn from_iter<I: IntoIterator<Item = Stroke>>(iter: I) -> Self {
        Self {
            strokes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a StrokeCollection {
    type Item = &'a Stroke;
    type IntoIter = std::slice::Iter<'a, Stroke>;

    fn into_iter(self) -> Self::IntoIter {
        self.strokes.iter()
    }
}

#[cfg(test)]
pub(crate) fn test_stroke(id: &str, order: u32) -> Stroke {
    Stroke::new(
        StrokeId::new(id),
        Point::ZERO,
        StrokeStyle::default(),
        order,
        StrokeKind::Path {
            points: vec![0.0, 0.0, 1.0, 1.0],
        },
    )
}
