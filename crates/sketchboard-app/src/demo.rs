//! Scripted two-user session against an in-memory store.

use crate::thumbnail::SvgThumbnail;
use serde::Serialize;
use sketchboard_core::store::{BoardStore, StrokeStore};
use sketchboard_core::{
    BoardClient, ClientError, Color, Command, LocalUser, MemoryStore, Modifiers, PointerEvent,
    SessionConfig, SessionError, SharedClock, SyncOutcome, ToolKind, command_for_key,
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] sketchboard_core::ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Summary of what the scripted session produced.
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub board_id: String,
    pub title: String,
    pub stored_strokes: usize,
    pub host_visible: usize,
    pub guest_visible: usize,
    pub guest_initial_load: bool,
    pub host_can_redo: bool,
    pub host_sees_cursors: usize,
    pub thumbnail_bytes: usize,
}

type Client = BoardClient<Arc<MemoryStore>>;

fn user(id: &str, name: &str, color: Color) -> LocalUser {
    LocalUser {
        id: id.to_string(),
        name: name.to_string(),
        color,
    }
}

async fn drag(client: &mut Client, tool: ToolKind, points: &[(f64, f64)]) -> Result<(), AppError> {
    let session = client.session_mut().ok_or(ClientError::NoSession)?;
    session.apply_command(Command::SelectTool(tool))?;
    let Some((first, rest)) = points.split_first() else {
        return Ok(());
    };
    client
        .handle_pointer(PointerEvent::Down {
            position: (*first).into(),
        })
        .await;
    for p in rest {
        client
            .handle_pointer(PointerEvent::Move {
                position: (*p).into(),
            })
            .await;
    }
    if client.handle_pointer(PointerEvent::Up).await.is_none() {
        log::warn!("{} drag produced no stroke", tool.label());
    }
    Ok(())
}

/// Run the script: the host draws, a guest joins and draws, the host
/// catches up and undoes its last stroke.
pub async fn run(config: SessionConfig, clock: SharedClock) -> Result<DemoReport, AppError> {
    let store = Arc::new(
        MemoryStore::new(clock.clone()).with_stale_after(config.presence_stale_after()),
    );
    let renderer = SvgThumbnail {
        background: config.board_background,
        ..SvgThumbnail::default()
    };

    let mut host = Client::new(
        store.clone(),
        user("host", "Host", Color::rgb(0x3b, 0x82, 0xf6)),
        config.clone(),
        clock.clone(),
    )
    .with_renderer(Box::new(renderer));
    let board = host.open(None).await?;
    host.refresh().await?;

    drag(&mut host, ToolKind::Pencil, &[(10.0, 10.0), (20.0, 14.0), (30.0, 22.0)]).await?;
    if let Some(session) = host.session_mut() {
        session.set_fill_color(Some(Color::rgb(0xfd, 0xe6, 0x8a)));
    }
    drag(&mut host, ToolKind::Rectangle, &[(60.0, 60.0), (20.0, 40.0)]).await?;
    host.flush().await?;

    let mut guest = Client::new(
        store.clone(),
        user("guest", "Guest", Color::rgb(0x22, 0xc5, 0x5e)),
        config.clone(),
        clock.clone(),
    );
    guest.switch_board(&board).await?;
    let guest_initial_load = guest.refresh().await? == SyncOutcome::InitialLoad;
    drag(&mut guest, ToolKind::Circle, &[(100.0, 100.0), (112.0, 105.0)]).await?;
    guest.flush().await?;

    host.refresh().await?;
    if let Some(undo) = command_for_key("z", Modifiers::CTRL) {
        if let Some(session) = host.session_mut() {
            session.apply_command(undo)?;
        }
    }

    let meta = store.board(&board).await.map_err(ClientError::from)?;
    let stored_strokes = store.strokes(&board).await.map_err(ClientError::from)?.len();
    let report = DemoReport {
        board_id: board.to_string(),
        title: meta.as_ref().map(|b| b.title.clone()).unwrap_or_default(),
        stored_strokes,
        host_visible: host.session().map(|s| s.strokes().len()).unwrap_or(0),
        guest_visible: guest.session().map(|s| s.strokes().len()).unwrap_or(0),
        guest_initial_load,
        host_can_redo: host.session().is_some_and(|s| s.can_redo()),
        host_sees_cursors: host.presence().map(|p| p.remote_cursors().len()).unwrap_or(0),
        thumbnail_bytes: meta.and_then(|b| b.thumbnail).map(|t| t.len()).unwrap_or(0),
    };

    guest.close().await;
    host.close().await;
    Ok(report)
}
