//! Candidate stroke construction from pointer input.

use super::{Color, Stroke, StrokeId, StrokeKind, StrokeStyle};
use crate::tools::{ToolKind, ToolSettings};
use kurbo::{Point, Rect};

/// Default width multiplier applied to eraser strokes.
pub const DEFAULT_ERASER_WIDTH_FACTOR: f64 = 3.0;

/// Builds candidate strokes for a tool from an anchor and the current point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateBuilder {
    eraser_width_factor: f64,
}

impl Default for CandidateBuilder {
    fn default() -> Self {
        Self {
            eraser_width_factor: DEFAULT_ERASER_WIDTH_FACTOR,
        }
    }
}

impl CandidateBuilder {
    pub fn new(eraser_width_factor: f64) -> Self {
        Self { eraser_width_factor }
    }

    /// Style a new stroke gets for `tool` under the current settings.
    ///
    /// The eraser paints solid white at a wider width; it occludes, it does
    /// not delete.
    pub fn style_for(&self, tool: ToolKind, settings: &ToolSettings) -> StrokeStyle {
        match tool {
            ToolKind::Eraser => StrokeStyle {
                stroke_color: Color::WHITE,
                fill_color: None,
                stroke_width: settings.stroke_width * self.eraser_width_factor,
                opacity: 1.0,
            },
            ToolKind::Pencil | ToolKind::Line => StrokeStyle {
                stroke_color: settings.stroke_color,
                fill_color: None,
                stroke_width: settings.stroke_width,
                opacity: settings.opacity,
            },
            ToolKind::Rectangle | ToolKind::Circle => StrokeStyle {
                stroke_color: settings.stroke_color,
                fill_color: settings.fill_color,
                stroke_width: settings.stroke_width,
                opacity: settings.opacity,
            },
        }
    }

    /// Start an accumulating path for freehand tools. Returns `None` for
    /// tools whose candidate only exists once the pointer moves.
    pub fn start_path(
        &self,
        tool: ToolKind,
        anchor: Point,
        settings: &ToolSettings,
        id: StrokeId,
        order: u32,
    ) -> Option<Stroke> {
        if !tool.is_freehand() {
            return None;
        }
        Some(Stroke::new(
            id,
            Point::ZERO,
            self.style_for(tool, settings),
            order,
            StrokeKind::Path {
                points: vec![anchor.x, anchor.y],
            },
        ))
    }

    /// Derive a shape candidate from scratch out of anchor and current point.
    /// Returns `None` for freehand tools.
    pub fn shape(
        &self,
        tool: ToolKind,
        anchor: Point,
        current: Point,
        settings: &ToolSettings,
        id: StrokeId,
        order: u32,
    ) -> Option<Stroke> {
        let (origin, kind) = match tool {
            ToolKind::Pencil | ToolKind::Eraser => return None,
            ToolKind::Rectangle => {
                let rect = Rect::from_points(anchor, current);
                (
                    rect.origin(),
                    StrokeKind::Rectangle {
                        width: rect.width(),
                        height: rect.height(),
                    },
                )
            }
            ToolKind::Circle => (
                anchor,
                StrokeKind::Circle {
                    radius: anchor.distance(current),
                },
            ),
            ToolKind::Line => (
                Point::ZERO,
                StrokeKind::Line {
                    points: [anchor.x, anchor.y, current.x, current.y],
                },
            ),
        };
        Some(Stroke::new(id, origin, self.style_for(tool, settings), order, kind))
    }

    /// Append a point to a path candidate. Other variants are left alone.
    pub fn extend_path(stroke: &mut Stroke, point: Point) {
        if let StrokeKind::Path { points } = &mut stroke.kind {
            points.push(point.x);
            points.push(point.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(tool: ToolKind, anchor: (f64, f64), current: (f64, f64)) -> Stroke {
        CandidateBuilder::default()
            .shape(
                tool,
                anchor.into(),
                current.into(),
                &ToolSettings::default(),
                StrokeId::new("c"),
                0,
            )
            .unwrap()
    }

    #[test]
    fn test_rectangle_normalized_for_any_drag_direction() {
        let stroke = build(ToolKind::Rectangle, (50.0, 50.0), (10.0, 30.0));
        assert_eq!(stroke.origin, Point::new(10.0, 30.0));
        assert_eq!(
            stroke.kind,
            StrokeKind::Rectangle {
                width: 40.0,
                height: 20.0
            }
        );

        let forward = build(ToolKind::Rectangle, (10.0, 30.0), (50.0, 50.0));
        assert_eq!(forward.origin, stroke.origin);
        assert_eq!(forward.kind, stroke.kind);
    }

    #[test]
    fn test_circle_radius_is_euclidean() {
        let stroke = build(ToolKind::Circle, (0.0, 0.0), (3.0, 4.0));
        assert_eq!(stroke.origin, Point::ZERO);
        assert_eq!(stroke.kind, StrokeKind::Circle { radius: 5.0 });
    }

    #[test]
    fn test_line_uses_both_endpoints() {
        let stroke = build(ToolKind::Line, (1.0, 2.0), (3.0, 4.0));
        assert_eq!(
            stroke.kind,
            StrokeKind::Line {
                points: [1.0, 2.0, 3.0, 4.0]
            }
        );
        assert_eq!(stroke.style.fill_color, None);
    }

    #[test]
    fn test_zero_length_drag_is_degenerate_not_rejected() {
        let stroke = build(ToolKind::Circle, (7.0, 7.0), (7.0, 7.0));
        assert_eq!(stroke.kind, StrokeKind::Circle { radius: 0.0 });
        assert!(stroke.validate().is_ok());
    }

    #[test]
    fn test_eraser_style() {
        let settings = ToolSettings {
            stroke_width: 4.0,
            opacity: 0.5,
            ..ToolSettings::default()
        };
        let stroke = CandidateBuilder::default()
            .start_path(ToolKind::Eraser, Point::new(1.0, 1.0), &settings, StrokeId::new("e"), 2)
            .unwrap();
        assert_eq!(stroke.style.stroke_color, Color::WHITE);
        assert_eq!(stroke.style.stroke_width, 12.0);
        assert_eq!(stroke.style.opacity, 1.0);
        assert_eq!(stroke.order, 2);
    }

    #[test]
    fn test_path_accumulates() {
        let builder = CandidateBuilder::default();
        let settings = ToolSettings::default();
        let mut stroke = builder
            .start_path(
                ToolKind::Pencil,
                Point::new(0.0, 0.0),
                &settings,
                StrokeId::new("p"),
                0,
            )
            .unwrap();
        CandidateBuilder::extend_path(&mut stroke, Point::new(1.0, 2.0));
        assert_eq!(
            stroke.kind,
            StrokeKind::Path {
                points: vec![0.0, 0.0, 1.0, 2.0]
            }
        );
        let id = StrokeId::new("x");
        assert!(
            builder
                .shape(ToolKind::Pencil, Point::ZERO, Point::ZERO, &settings, id.clone(), 0)
                .is_none()
        );
        assert!(
            builder
                .start_path(ToolKind::Line, Point::ZERO, &settings, id, 0)
                .is_none()
        );
    }
}
