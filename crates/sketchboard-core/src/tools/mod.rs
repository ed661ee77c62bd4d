//! Drawing tools and the pointer-driven stroke state machine.

use crate::stroke::{CandidateBuilder, Color, Stroke, StrokeId};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Tools that produce strokes from pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Pencil,
    Eraser,
    Rectangle,
    Circle,
    Line,
}

impl ToolKind {
    /// Freehand tools accumulate points instead of re-deriving the shape.
    pub fn is_freehand(self) -> bool {
        matches!(self, ToolKind::Pencil | ToolKind::Eraser)
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Pencil => "Pencil",
            ToolKind::Eraser => "Eraser",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Line => "Line",
        }
    }
}

/// User-chosen paint settings applied to new strokes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub stroke_color: Color,
    pub fill_color: Option<Color>,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            stroke_color: Color::BLACK,
            fill_color: Some(Color::BLACK),
            stroke_width: 2.0,
            opacity: 1.0,
        }
    }
}

/// State of the pointer interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DrawState {
    /// Waiting for a pointer-down.
    #[default]
    Idle,
    /// Pointer is down; `candidate` is `None` until a shape tool first moves.
    Tracking {
        anchor: Point,
        candidate: Option<Stroke>,
    },
}

/// The in-progress drawing interaction for one board.
#[derive(Debug, Clone)]
pub struct DrawingSession {
    pub tool: ToolKind,
    pub settings: ToolSettings,
    state: DrawState,
    builder: CandidateBuilder,
}

impl DrawingSession {
    pub fn new(tool: ToolKind, settings: ToolSettings, builder: CandidateBuilder) -> Self {
        Self {
            tool,
            settings,
            state: DrawState::Idle,
            builder,
        }
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    /// Switch tools, discarding any uncommitted candidate.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.cancel() {
            log::debug!("Discarded candidate on switch to {:?}", tool);
        }
        self.tool = tool;
    }

    /// Begin an interaction at `anchor` (board coordinates).
    pub fn begin(&mut self, anchor: Point, order: u32) {
        let candidate = self.builder.start_path(
            self.tool,
            anchor,
            &self.settings,
            StrokeId::generate(),
            order,
        );
        self.state = DrawState::Tracking { anchor, candidate };
    }

    /// Feed a pointer move. Ignored unless tracking.
    pub fn update(&mut self, point: Point, order: u32) {
        let DrawState::Tracking { anchor, candidate } = &mut self.state else {
            return;
        };
        if self.tool.is_freehand() {
            if let Some(stroke) = candidate {
                CandidateBuilder::extend_path(stroke, point);
            }
            return;
        }
        // Keep the id stable while the shape is re-derived.
        let id = candidate
            .as_ref()
            .map(|s| s.id.clone())
            .unwrap_or_else(StrokeId::generate);
        *candidate = self
            .builder
            .shape(self.tool, *anchor, point, &self.settings, id, order);
    }

    /// Finish the interaction, handing back the candidate if one was built.
    pub fn end(&mut self) -> Option<Stroke> {
        match std::mem::take(&mut self.state) {
            DrawState::Tracking { candidate, .. } => candidate,
            DrawState::Idle => None,
        }
    }

    /// Drop the interaction. Returns true if a candidate was discarded.
    pub fn cancel(&mut self) -> bool {
        matches!(
            std::mem::take(&mut self.state),
            DrawState::Tracking {
                candidate: Some(_),
                ..
            }
        )
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, DrawState::Tracking { .. })
    }

    /// The uncommitted stroke, if any.
    pub fn candidate(&self) -> Option<&Stroke> {
        match &self.state {
            DrawState::Tracking { candidate, .. } => candidate.as_ref(),
            DrawState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::StrokeKind;

    fn session(tool: ToolKind) -> DrawingSession {
        DrawingSession::new(tool, ToolSettings::default(), CandidateBuilder::default())
    }

    #[test]
    fn test_pencil_starts_candidate_on_begin() {
        let mut ds = session(ToolKind::Pencil);
        ds.begin(Point::new(1.0, 1.0), 0);
        assert!(ds.is_tracking());
        assert!(ds.candidate().is_some());
    }

    #[test]
    fn test_shape_candidate_appears_on_move() {
        let mut ds = session(ToolKind::Rectangle);
        ds.begin(Point::new(0.0, 0.0), 0);
        assert!(ds.candidate().is_none());

        ds.update(Point::new(10.0, 10.0), 0);
        let first_id = ds.candidate().unwrap().id.clone();
        ds.update(Point::new(20.0, 5.0), 0);
        let candidate = ds.candidate().unwrap();
        assert_eq!(candidate.id, first_id);
        assert_eq!(
            candidate.kind,
            StrokeKind::Rectangle {
                width: 20.0,
                height: 5.0
            }
        );
    }

    #[test]
    fn test_line_replaces_endpoint() {
        let mut ds = session(ToolKind::Line);
        ds.begin(Point::new(0.0, 0.0), 0);
        ds.update(Point::new(5.0, 5.0), 0);
        ds.update(Point::new(8.0, 1.0), 0);
        assert_eq!(
            ds.end().unwrap().kind,
            StrokeKind::Line {
                points: [0.0, 0.0, 8.0, 1.0]
            }
        );
        assert!(!ds.is_tracking());
    }

    #[test]
    fn test_move_without_begin_is_ignored() {
        let mut ds = session(ToolKind::Pencil);
        ds.update(Point::new(3.0, 3.0), 0);
        assert_eq!(ds.state(), &DrawState::Idle);
        assert!(ds.end().is_none());
    }

    #[test]
    fn test_tool_switch_discards_candidate() {
        let mut ds = session(ToolKind::Pencil);
        ds.begin(Point::ZERO, 0);
        ds.update(Point::new(1.0, 1.0), 0);
        ds.set_tool(ToolKind::Circle);
        assert!(!ds.is_tracking());
        assert!(ds.end().is_none());
        assert_eq!(ds.tool, ToolKind::Circle);
    }
}
