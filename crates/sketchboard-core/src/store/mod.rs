//! Contracts of the external store that holds boards, strokes and presence.
//!
//! The store is the source of truth. Its subscription mechanism is modelled
//! by re-reading the full lists ([`StrokeStore::strokes`],
//! [`PresenceStore::list_presence`]) and handing them to the session.

mod memory;

pub use memory::MemoryStore;

use crate::board::BoardId;
use crate::clock::Timestamp;
use crate::presence::{PresenceRecord, PresenceUpdate};
use crate::stroke::{Color, NewStroke, StrokeId, StrokeRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Store error: {0}")]
    Other(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Identifier of a presence record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Board metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub background_color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub last_modified: Timestamp,
}

/// What to do with the stored thumbnail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThumbnailPatch {
    #[default]
    Keep,
    Set(String),
    Clear,
}

/// Partial board update; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardPatch {
    pub title: Option<String>,
    pub background_color: Option<Color>,
    pub thumbnail: ThumbnailPatch,
}

impl BoardPatch {
    pub fn thumbnail(data: impl Into<String>) -> Self {
        Self {
            thumbnail: ThumbnailPatch::Set(data.into()),
            ..Self::default()
        }
    }

    pub fn clear_thumbnail() -> Self {
        Self {
            thumbnail: ThumbnailPatch::Clear,
            ..Self::default()
        }
    }

    pub fn apply(self, board: &mut Board) {
        if let Some(title) = self.title {
            board.title = title;
        }
        if let Some(color) = self.background_color {
            board.background_color = color;
        }
        match self.thumbnail {
            ThumbnailPatch::Keep => {}
            ThumbnailPatch::Set(data) => board.thumbnail = Some(data),
            ThumbnailPatch::Clear => board.thumbnail = None,
        }
    }
}

/// Persisted strokes of boards.
pub trait StrokeStore {
    /// Full stroke list of a board, ascending by order.
    fn strokes(&self, board: &BoardId) -> BoxFuture<'_, StoreResult<Vec<StrokeRecord>>>;

    /// Append a stroke. Returns the id the store assigned.
    fn add_stroke(
        &self,
        board: &BoardId,
        stroke: NewStroke,
    ) -> BoxFuture<'_, StoreResult<StrokeId>>;

    /// Delete every stroke of a board.
    fn clear_strokes(&self, board: &BoardId) -> BoxFuture<'_, StoreResult<()>>;
}

/// Board metadata.
pub trait BoardStore {
    fn create_board(&self, title: &str, background: Color) -> BoxFuture<'_, StoreResult<BoardId>>;

    fn board(&self, id: &BoardId) -> BoxFuture<'_, StoreResult<Option<Board>>>;

    fn update_board(&self, id: &BoardId, patch: BoardPatch) -> BoxFuture<'_, StoreResult<()>>;
}

/// Live user presence.
pub trait PresenceStore {
    /// Upsert the caller's presence, stamping it with the store's clock.
    fn update_presence(
        &self,
        board: &BoardId,
        update: PresenceUpdate,
    ) -> BoxFuture<'_, StoreResult<RecordId>>;

    fn remove_presence(&self, board: &BoardId, user_id: &str) -> BoxFuture<'_, StoreResult<()>>;

    /// Presence records of a board that are not yet stale.
    fn list_presence(&self, board: &BoardId) -> BoxFuture<'_, StoreResult<Vec<PresenceRecord>>>;
}

/// Everything a board client needs from a store.
pub trait Store: StrokeStore + BoardStore + PresenceStore {}

impl<T: StrokeStore + BoardStore + PresenceStore> Store for T {}

// Shared handles, so several clients can talk to one store.

impl<T: StrokeStore + ?Sized> StrokeStore for Arc<T> {
    fn strokes(&self, board: &BoardId) -> BoxFuture<'_, StoreResult<Vec<StrokeRecord>>> {
        (**self).strokes(board)
    }

    fn add_stroke(
        &self,
        board: &BoardId,
        stroke: NewStroke,
    ) -> BoxFuture<'_, StoreResult<StrokeId>> {
        (**self).add_stroke(board, stroke)
    }

    fn clear_strokes(&self, board: &BoardId) -> BoxFuture<'_, StoreResult<()>> {
        (**self).clear_strokes(board)
    }
}

impl<T: BoardStore + ?Sized> BoardStore for Arc<T> {
    fn create_board(&self, title: &str, background: Color) -> BoxFuture<'_, StoreResult<BoardId>> {
        (**self).create_board(title, background)
    }

    fn board(&self, id: &BoardId) -> BoxFuture<'_, StoreResult<Option<Board>>> {
        (**self).board(id)
    }

    fn update_board(&self, id: &BoardId, patch: BoardPatch) -> BoxFuture<'_, StoreResult<()>> {
        (**self).update_board(id, patch)
    }
}

impl<T: PresenceStore + ?Sized> PresenceStore for Arc<T> {
    fn update_presence(
        &self,
        board: &BoardId,
        update: PresenceUpdate,
    ) -> BoxFuture<'_, StoreResult<RecordId>> {
        (**self).update_presence(board, update)
    }

    fn remove_presence(&self, board: &BoardId, user_id: &str) -> BoxFuture<'_, StoreResult<()>> {
        (**self).remove_presence(board, user_id)
    }

    fn list_presence(&self, board: &BoardId) -> BoxFuture<'_, StoreResult<Vec<PresenceRecord>>> {
        (**self).list_presence(board)
    }
}
