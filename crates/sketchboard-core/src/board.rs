//! One open board: live strokes, undo history, pointer interaction and the
//! queue of store requests those produce.

use crate::camera::Camera;
use crate::config::SessionConfig;
use crate::history::History;
use crate::input::{Command, PointerEvent};
use crate::reconcile::{self, SyncOutcome};
use crate::store::{BoardPatch, StoreError};
use crate::stroke::{Color, NewStroke, Stroke, StrokeCollection, StrokeId, StrokeRecord};
use crate::tools::{DrawingSession, ToolKind, ToolSettings};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque board identifier assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardId(String);

impl BoardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Distinguishes one opened session from the next, so that responses to
/// requests made by a previous session can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionTag(u64);

impl SessionTag {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SessionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Work the session wants done against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreRequest {
    /// Persist a committed stroke under its client-side id.
    AddStroke { client_id: StrokeId, stroke: NewStroke },
    ClearStrokes,
    UpdateBoard(BoardPatch),
    /// Render the current strokes and store them as the board thumbnail.
    CaptureThumbnail,
}

impl StoreRequest {
    pub fn name(&self) -> &'static str {
        match self {
            StoreRequest::AddStroke { .. } => "add_stroke",
            StoreRequest::ClearStrokes => "clear_strokes",
            StoreRequest::UpdateBoard(_) => "update_board",
            StoreRequest::CaptureThumbnail => "capture_thumbnail",
        }
    }
}

/// A request tagged with the session that issued it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRequest {
    pub tag: SessionTag,
    pub board_id: BoardId,
    pub request: StoreRequest,
}

/// Outcome of an executed request, fed back through
/// [`BoardSession::acknowledge`].
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    StrokeAdded { client_id: StrokeId, store_id: StrokeId },
    Failed { request: &'static str, error: StoreError },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
}

/// Client-side state of one open board.
pub struct BoardSession {
    board_id: BoardId,
    tag: SessionTag,
    live: StrokeCollection,
    history: History,
    drawing: DrawingSession,
    camera: Camera,
    max_stroke_width: f64,
    loaded: bool,
    outgoing: Vec<StoreRequest>,
}

impl BoardSession {
    pub fn new(board_id: BoardId, tag: SessionTag, config: &SessionConfig) -> Self {
        log::info!("Opening session {} for board {}", tag, board_id);
        Self {
            board_id,
            tag,
            live: StrokeCollection::new(),
            history: History::new(),
            drawing: DrawingSession::new(
                config.default_tool,
                config.default_settings,
                config.candidate_builder(),
            ),
            camera: Camera::new(),
            max_stroke_width: config.max_stroke_width,
            loaded: false,
            outgoing: Vec::new(),
        }
    }

    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    pub fn tag(&self) -> SessionTag {
        self.tag
    }

    /// True once the first authoritative stroke list has arrived.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The collection currently shown.
    pub fn strokes(&self) -> &StrokeCollection {
        &self.live
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn drawing(&self) -> &DrawingSession {
        &self.drawing
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn tool(&self) -> ToolKind {
        self.drawing.tool
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.drawing.settings
    }

    // --- Pointer interaction ---

    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<StrokeId> {
        match event {
            PointerEvent::Down { position } => {
                self.pointer_down(position);
                None
            }
            PointerEvent::Move { position } => {
                self.pointer_move(position);
                None
            }
            PointerEvent::Up => self.pointer_up(),
        }
    }

    /// Start a stroke at a screen position. Ignored until the board is loaded.
    pub fn pointer_down(&mut self, screen: Point) {
        if !self.loaded {
            log::debug!("Ignoring pointer down, board {} not loaded", self.board_id);
            return;
        }
        let anchor = self.camera.screen_to_board(screen);
        self.drawing.begin(anchor, self.live.next_order());
    }

    pub fn pointer_move(&mut self, screen: Point) {
        if !self.drawing.is_tracking() {
            return;
        }
        let point = self.camera.screen_to_board(screen);
        self.drawing.update(point, self.live.next_order());
    }

    /// Finish the interaction. Returns the id of the committed stroke, if any.
    pub fn pointer_up(&mut self) -> Option<StrokeId> {
        let mut stroke = self.drawing.end()?;
        stroke.order = self.live.next_order();
        if let Err(err) = stroke.validate() {
            log::warn!(
                "Discarding invalid {} stroke {}: {}",
                stroke.stroke_type(),
                stroke.id,
                err
            );
            return None;
        }
        let id = stroke.id.clone();
        self.commit_stroke(stroke);
        Some(id)
    }

    fn commit_stroke(&mut self, stroke: Stroke) {
        log::debug!(
            "Committing {} stroke {} at order {}",
            stroke.stroke_type(),
            stroke.id,
            stroke.order
        );
        self.outgoing.push(StoreRequest::AddStroke {
            client_id: stroke.id.clone(),
            stroke: NewStroke::from_stroke(&self.board_id, &stroke),
        });
        self.live.push(stroke);
        self.history.commit(self.live.clone());
        self.outgoing.push(StoreRequest::CaptureThumbnail);
    }

    /// Strokes to render: the live collection, then the candidate on top.
    pub fn preview(&self) -> impl Iterator<Item = &Stroke> {
        self.live.iter().chain(self.drawing.candidate())
    }

    // --- Tools and settings ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.drawing.set_tool(tool);
    }

    /// Drop the in-flight stroke. Returns true if one was discarded.
    pub fn cancel_stroke(&mut self) -> bool {
        self.drawing.cancel()
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.drawing.settings.stroke_color = color;
    }

    pub fn set_fill_color(&mut self, color: Option<Color>) {
        self.drawing.settings.fill_color = color;
    }

    pub fn set_stroke_width(&mut self, width: f64) -> Result<(), SessionError> {
        if !width.is_finite() || width <= 0.0 || width > self.max_stroke_width {
            return Err(SessionError::InvalidSetting(format!(
                "stroke width {} outside (0, {}]",
                width, self.max_stroke_width
            )));
        }
        self.drawing.settings.stroke_width = width;
        Ok(())
    }

    /// Set the opacity, clamped to [0, 1].
    pub fn set_opacity(&mut self, opacity: f64) -> Result<(), SessionError> {
        if opacity.is_nan() {
            return Err(SessionError::InvalidSetting("opacity is NaN".into()));
        }
        self.drawing.settings.opacity = opacity.clamp(0.0, 1.0);
        Ok(())
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        if !self.history.undo() {
            return false;
        }
        self.live = self.history.current().clone();
        log::debug!("Undo to step {}", self.history.step());
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo() {
            return false;
        }
        self.live = self.history.current().clone();
        log::debug!("Redo to step {}", self.history.step());
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Remove every stroke from the board. Undoable locally.
    pub fn clear(&mut self) {
        self.drawing.cancel();
        self.outgoing.push(StoreRequest::ClearStrokes);
        self.outgoing
            .push(StoreRequest::UpdateBoard(BoardPatch::clear_thumbnail()));
        self.live = StrokeCollection::new();
        self.history.commit(StrokeCollection::new());
        log::debug!("Cleared board {}", self.board_id);
    }

    pub fn apply_command(&mut self, command: Command) -> Result<(), SessionError> {
        match command {
            Command::SelectTool(tool) => self.set_tool(tool),
            Command::SetStrokeColor(color) => self.set_stroke_color(color),
            Command::SetFillColor(color) => self.set_fill_color(color),
            Command::SetStrokeWidth(width) => self.set_stroke_width(width)?,
            Command::SetOpacity(opacity) => self.set_opacity(opacity)?,
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::Clear => self.clear(),
            Command::CancelStroke => {
                self.cancel_stroke();
            }
        }
        Ok(())
    }

    // --- Store traffic ---

    /// Fold an authoritative stroke list from the store into local state.
    pub fn apply_remote_strokes(&mut self, records: &[StrokeRecord]) -> SyncOutcome {
        let outcome = reconcile::reconcile(&mut self.live, &mut self.history, records);
        if !self.loaded {
            log::debug!("Board {} loaded with {} strokes", self.board_id, self.live.len());
            self.loaded = true;
        }
        outcome
    }

    /// Drain queued store requests.
    pub fn take_requests(&mut self) -> Vec<TaggedRequest> {
        std::mem::take(&mut self.outgoing)
            .into_iter()
            .map(|request| TaggedRequest {
                tag: self.tag,
                board_id: self.board_id.clone(),
                request,
            })
            .collect()
    }

    pub fn has_pending_requests(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Apply the result of an executed request. Returns false if it belongs
    /// to another session and was ignored.
    pub fn acknowledge(&mut self, tag: SessionTag, completion: Completion) -> bool {
        if tag != self.tag {
            log::debug!("Ignoring completion for session {} in {}", tag, self.tag);
            return false;
        }
        match completion {
            Completion::StrokeAdded { client_id, store_id } => {
                self.live.rename(&client_id, &store_id);
                let renamed = self.history.rename(&client_id, &store_id);
                log::debug!(
                    "Stroke {} stored as {} ({} snapshots)",
                    client_id,
                    store_id,
                    renamed
                );
            }
            Completion::Failed { request, error } => {
                log::warn!("{} failed on board {}: {}", request, self.board_id, error);
            }
        }
        true
    }
}
