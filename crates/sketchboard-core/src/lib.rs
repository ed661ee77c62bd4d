//! Sketchboard Core Library
//!
//! Client-side state of the Sketchboard collaborative drawing board: the
//! stroke model, local undo/redo, reconciliation with the store's stroke
//! list and live cursor presence. Storage, transport and rendering are
//! reached through the traits in [`store`] and [`client`].

pub mod board;
pub mod camera;
pub mod client;
pub mod clock;
pub mod config;
pub mod history;
pub mod input;
pub mod presence;
pub mod reconcile;
pub mod store;
pub mod stroke;
pub mod tools;

pub use board::{
    BoardId, BoardSession, Completion, SessionError, SessionTag, StoreRequest, TaggedRequest,
};
pub use camera::Camera;
pub use client::{BoardClient, ClientError, RenderError, ThumbnailRenderer};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock, Timestamp};
pub use config::{ConfigError, SessionConfig};
pub use history::History;
pub use input::{Command, Modifiers, PointerEvent, command_for_key};
pub use presence::{LocalUser, PresenceRecord, PresenceTracker, PresenceUpdate, Throttle};
pub use reconcile::SyncOutcome;
pub use store::{Board, BoardPatch, MemoryStore, Store, StoreError, ThumbnailPatch};
pub use stroke::{Color, Stroke, StrokeCollection, StrokeId, StrokeKind, StrokeRecord, StrokeStyle};
pub use tools::{DrawingSession, ToolKind, ToolSettings};
