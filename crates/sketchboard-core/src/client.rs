//! Driver that connects a [`BoardSession`] to a store.
//!
//! The session only queues requests; the client executes them, feeds the
//! results back and pulls fresh stroke and presence lists on `refresh`.

use crate::board::{BoardId, BoardSession, Completion, SessionTag, StoreRequest, TaggedRequest};
use crate::clock::SharedClock;
use crate::config::SessionConfig;
use crate::input::PointerEvent;
use crate::presence::{LocalUser, PresenceTracker, PresenceUpdate};
use crate::reconcile::SyncOutcome;
use crate::store::{BoardPatch, Store, StoreError};
use crate::stroke::{StrokeCollection, StrokeId};
use kurbo::Point;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("failed to initialize board: {0}")]
    BoardInitialization(StoreError),
    #[error("no board is open")]
    NoSession,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("thumbnail rendering failed: {0}")]
pub struct RenderError(pub String);

/// Turns a stroke collection into a thumbnail string (for example a data
/// URL). Rasterization lives outside the core.
pub trait ThumbnailRenderer {
    fn render(&self, strokes: &StrokeCollection) -> Result<String, RenderError>;
}

/// Owns the store handle and the session of the currently open board.
pub struct BoardClient<S> {
    store: S,
    config: SessionConfig,
    clock: SharedClock,
    user: LocalUser,
    renderer: Option<Box<dyn ThumbnailRenderer>>,
    tag: SessionTag,
    session: Option<BoardSession>,
    presence: Option<PresenceTracker>,
}

impl<S: Store> BoardClient<S> {
    pub fn new(store: S, user: LocalUser, config: SessionConfig, clock: SharedClock) -> Self {
        Self {
            store,
            config,
            clock,
            user,
            renderer: None,
            tag: SessionTag::new(0),
            session: None,
            presence: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn ThumbnailRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&BoardSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut BoardSession> {
        self.session.as_mut()
    }

    pub fn presence(&self) -> Option<&PresenceTracker> {
        self.presence.as_ref()
    }

    /// Open a board, creating a fresh one if `board` is `None` or unknown.
    ///
    /// Any previously open board is closed first. On failure no board is
    /// open.
    pub async fn open(&mut self, board: Option<&BoardId>) -> Result<BoardId, ClientError> {
        self.close().await;

        let existing = match board {
            Some(id) => self
                .store
                .board(id)
                .await
                .map_err(ClientError::BoardInitialization)?,
            None => None,
        };
        let board_id = match existing {
            Some(found) => found.id,
            None => {
                if let Some(id) = board {
                    log::info!("Board {} not found, creating a new one", id);
                }
                let title = format!("Board {}", self.clock.now().as_millis());
                self.store
                    .create_board(&title, self.config.board_background)
                    .await
                    .map_err(ClientError::BoardInitialization)?
            }
        };

        self.tag = self.tag.next();
        self.session = Some(BoardSession::new(board_id.clone(), self.tag, &self.config));
        self.presence = Some(PresenceTracker::new(
            board_id.clone(),
            self.user.clone(),
            self.config.presence_interval(),
            self.config.presence_stale_after(),
            self.clock.clone(),
        ));
        Ok(board_id)
    }

    /// Tear down the current board and open another.
    pub async fn switch_board(&mut self, board: &BoardId) -> Result<BoardId, ClientError> {
        log::info!("Switching to board {}", board);
        self.open(Some(board)).await
    }

    /// Execute queued store requests. Returns how many ran.
    pub async fn flush(&mut self) -> Result<usize, ClientError> {
        let session = self.session.as_mut().ok_or(ClientError::NoSession)?;
        let requests = session.take_requests();
        let count = requests.len();
        for request in requests {
            let tag = request.tag;
            let completion =
                execute(&self.store, self.renderer.as_deref(), session.strokes(), request).await;
            if let Some(completion) = completion {
                session.acknowledge(tag, completion);
            }
        }
        Ok(count)
    }

    /// Pull the authoritative stroke and presence lists into the session.
    pub async fn refresh(&mut self) -> Result<SyncOutcome, ClientError> {
        let session = self.session.as_mut().ok_or(ClientError::NoSession)?;
        let records = self.store.strokes(session.board_id()).await?;
        let outcome = session.apply_remote_strokes(&records);

        if let Some(tracker) = self.presence.as_mut() {
            match self.store.list_presence(tracker.board_id()).await {
                Ok(peers) => tracker.replace_peers(peers),
                Err(err) => log::debug!("Presence refresh failed: {}", err),
            }
        }
        Ok(outcome)
    }

    /// Forward a pointer event to the session and publish the cursor.
    pub async fn handle_pointer(&mut self, event: PointerEvent) -> Option<StrokeId> {
        let session = self.session.as_mut()?;
        let committed = session.handle_pointer(event);
        match event {
            PointerEvent::Down { position } | PointerEvent::Move { position } => {
                self.cursor_moved(position).await;
            }
            PointerEvent::Up => {}
        }
        committed
    }

    /// Report the cursor at a screen position. Returns true if an update
    /// was published.
    pub async fn cursor_moved(&mut self, screen: Point) -> bool {
        let (Some(session), Some(tracker)) = (self.session.as_ref(), self.presence.as_mut()) else {
            return false;
        };
        let point = session.camera().screen_to_board(screen);
        match tracker.cursor_moved(point) {
            Some(update) => {
                let board = tracker.board_id().clone();
                self.publish(&board, update).await;
                true
            }
            None => false,
        }
    }

    /// Publish a held-back cursor update if its interval has passed.
    pub async fn tick(&mut self) -> bool {
        let Some(tracker) = self.presence.as_mut() else {
            return false;
        };
        match tracker.poll() {
            Some(update) => {
                let board = tracker.board_id().clone();
                self.publish(&board, update).await;
                true
            }
            None => false,
        }
    }

    async fn publish(&self, board: &BoardId, update: PresenceUpdate) {
        if let Err(err) = self.store.update_presence(board, update).await {
            log::debug!("Presence update failed: {}", err);
        }
    }

    /// Send what is still queued, remove our presence and drop the session.
    pub async fn close(&mut self) {
        if self.session.is_some() {
            if let Err(err) = self.flush().await {
                log::debug!("Final flush failed: {}", err);
            }
        }
        if let Some(mut tracker) = self.presence.take() {
            let leave = tracker.leave();
            if let Err(err) = self
                .store
                .remove_presence(&leave.board_id, &leave.user_id)
                .await
            {
                log::debug!("Presence removal failed: {}", err);
            }
        }
        if let Some(session) = self.session.take() {
            log::info!("Closed board {}", session.board_id());
        }
    }
}

async fn execute<S: Store>(
    store: &S,
    renderer: Option<&dyn ThumbnailRenderer>,
    strokes: &StrokeCollection,
    tagged: TaggedRequest,
) -> Option<Completion> {
    let TaggedRequest {
        board_id, request, ..
    } = tagged;
    let name = request.name();
    let failed = |error| Some(Completion::Failed { request: name, error });

    match request {
        StoreRequest::AddStroke { client_id, stroke } => {
            match store.add_stroke(&board_id, stroke).await {
                Ok(store_id) => Some(Completion::StrokeAdded { client_id, store_id }),
                Err(err) => failed(err),
            }
        }
        StoreRequest::ClearStrokes => store.clear_strokes(&board_id).await.err().and_then(failed),
        StoreRequest::UpdateBoard(patch) => store
            .update_board(&board_id, patch)
            .await
            .err()
            .and_then(failed),
        StoreRequest::CaptureThumbnail => {
            let Some(renderer) = renderer else {
                log::debug!("No thumbnail renderer, skipping capture");
                return None;
            };
            match renderer.render(strokes) {
                Ok(data) => store
                    .update_board(&board_id, BoardPatch::thumbnail(data))
                    .await
                    .err()
                    .and_then(failed),
                Err(err) => {
                    log::warn!("{}", err);
                    None
                }
            }
        }
    }
}
