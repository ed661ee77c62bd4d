//! In-memory store implementation.

use super::{
    Board, BoardPatch, BoardStore, BoxFuture, PresenceStore, RecordId, StoreError, StoreResult,
    StrokeStore,
};
use crate::board::BoardId;
use crate::clock::{SharedClock, Timestamp};
use crate::config::DEFAULT_PRESENCE_STALE_AFTER_MS;
use crate::presence::{PresenceRecord, PresenceUpdate};
use crate::stroke::{Color, NewStroke, StrokeId, StrokeRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

#[derive(Default)]
struct Tables {
    boards: HashMap<BoardId, Board>,
    strokes: HashMap<BoardId, Vec<StrokeRecord>>,
    presence: HashMap<(BoardId, String), (RecordId, PresenceRecord)>,
    next_id: u64,
}

impl Tables {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn touch(&mut self, board: &BoardId, now: Timestamp) {
        if let Some(b) = self.boards.get_mut(board) {
            b.last_modified = now;
        }
    }
}

/// In-memory store for tests, demos and single-process use.
pub struct MemoryStore {
    clock: SharedClock,
    stale_after: Duration,
    tables: RwLock<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            stale_after: Duration::from_millis(DEFAULT_PRESENCE_STALE_AFTER_MS),
            tables: RwLock::new(Tables::default()),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Make every mutating call fail with [`StoreError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        self.tables
            .write()
            .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))
    }

    /// All boards, most recently modified first.
    pub fn list_boards(&self) -> BoxFuture<'_, StoreResult<Vec<Board>>> {
        Box::pin(async move {
            let tables = self.read()?;
            let mut boards: Vec<Board> = tables.boards.values().cloned().collect();
            boards.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
            Ok(boards)
        })
    }

    /// Delete a board together with its strokes and presence.
    pub fn remove_board(&self, id: &BoardId) -> BoxFuture<'_, StoreResult<()>> {
        let id = id.clone();
        Box::pin(async move {
            let mut tables = self.write()?;
            if tables.boards.remove(&id).is_none() {
                return Err(StoreError::NotFound(id.to_string()));
            }
            tables.strokes.remove(&id);
            tables.presence.retain(|(board, _), _| board != &id);
            Ok(())
        })
    }

    /// Delete stale presence records. Returns how many were removed.
    pub fn cleanup_presence(&self) -> BoxFuture<'_, StoreResult<usize>> {
        Box::pin(async move {
            let now = self.clock.now();
            let mut tables = self.write()?;
            let before = tables.presence.len();
            tables
                .presence
                .retain(|_, (_, record)| record.is_live(now, self.stale_after));
            Ok(before - tables.presence.len())
        })
    }
}

impl StrokeStore for MemoryStore {
    fn strokes(&self, board: &BoardId) -> BoxFuture<'_, StoreResult<Vec<StrokeRecord>>> {
        let board = board.clone();
        Box::pin(async move {
            let tables = self.read()?;
            let mut records = tables.strokes.get(&board).cloned().unwrap_or_default();
            records.sort_by_key(|r| r.fields.order);
            Ok(records)
        })
    }

    fn add_stroke(
        &self,
        board: &BoardId,
        stroke: NewStroke,
    ) -> BoxFuture<'_, StoreResult<StrokeId>> {
        let board = board.clone();
        Box::pin(async move {
            let now = self.clock.now();
            let mut tables = self.write()?;
            if !tables.boards.contains_key(&board) {
                return Err(StoreError::NotFound(board.to_string()));
            }
            if stroke.board_id != board {
                return Err(StoreError::Rejected(format!(
                    "stroke for board {} sent to {}",
                    stroke.board_id, board
                )));
            }
            let id = StrokeId::new(tables.next_id("stroke"));
            tables
                .strokes
                .entry(board.clone())
                .or_default()
                .push(StrokeRecord::new(id.clone(), stroke));
            tables.touch(&board, now);
            Ok(id)
        })
    }

    fn clear_strokes(&self, board: &BoardId) -> BoxFuture<'_, StoreResult<()>> {
        let board = board.clone();
        Box::pin(async move {
            let now = self.clock.now();
            let mut tables = self.write()?;
            tables.strokes.remove(&board);
            tables.touch(&board, now);
            Ok(())
        })
    }
}

impl BoardStore for MemoryStore {
    fn create_board(&self, title: &str, background: Color) -> BoxFuture<'_, StoreResult<BoardId>> {
        let title = title.to_string();
        Box::pin(async move {
            let now = self.clock.now();
            let mut tables = self.write()?;
            let id = BoardId::new(tables.next_id("board"));
            tables.boards.insert(
                id.clone(),
                Board {
                    id: id.clone(),
                    title,
                    background_color: background,
                    thumbnail: None,
                    last_modified: now,
                },
            );
            Ok(id)
        })
    }

    fn board(&self, id: &BoardId) -> BoxFuture<'_, StoreResult<Option<Board>>> {
        let id = id.clone();
        Box::pin(async move {
            let tables = self.read()?;
            Ok(tables.boards.get(&id).cloned())
        })
    }

    fn update_board(&self, id: &BoardId, patch: BoardPatch) -> BoxFuture<'_, StoreResult<()>> {
        let id = id.clone();
        Box::pin(async move {
            let now = self.clock.now();
            let mut tables = self.write()?;
            let board = tables
                .boards
                .get_mut(&id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            patch.apply(board);
            board.last_modified = now;
            Ok(())
        })
    }
}

impl PresenceStore for MemoryStore {
    fn update_presence(
        &self,
        board: &BoardId,
        update: PresenceUpdate,
    ) -> BoxFuture<'_, StoreResult<RecordId>> {
        let board = board.clone();
        Box::pin(async move {
            let now = self.clock.now();
            let mut tables = self.write()?;
            let key = (board, update.user_id.clone());
            let record = PresenceRecord::from_update(update, now);
            let existing = tables.presence.get(&key).map(|(id, _)| id.clone());
            let id = match existing {
                Some(id) => id,
                None => RecordId::new(tables.next_id("presence")),
            };
            tables.presence.insert(key, (id.clone(), record));
            Ok(id)
        })
    }

    fn remove_presence(&self, board: &BoardId, user_id: &str) -> BoxFuture<'_, StoreResult<()>> {
        let key = (board.clone(), user_id.to_string());
        Box::pin(async move {
            let mut tables = self.write()?;
            tables.presence.remove(&key);
            Ok(())
        })
    }

    fn list_presence(&self, board: &BoardId) -> BoxFuture<'_, StoreResult<Vec<PresenceRecord>>> {
        let board = board.clone();
        Box::pin(async move {
            let now = self.clock.now();
            let tables = self.read()?;
            let mut records: Vec<PresenceRecord> = tables
                .presence
                .iter()
                .filter(|((b, _), (_, record))| {
                    b == &board && record.is_live(now, self.stale_after)
                })
                .map(|(_, (_, record))| record.clone())
                .collect();
            records.sort_by(|a, b| a.user_id.cmp(&b.user_id));
            Ok(records)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::stroke::{Stroke, StrokeKind, StrokeStyle};
    use kurbo::Point;
    use pollster::block_on;
    use std::sync::Arc;

    fn store() -> (MemoryStore, ManualClock) {
        let clock = ManualClock::new(Timestamp::from_millis(1_000_000));
        (MemoryStore::new(Arc::new(clock.clone())), clock)
    }

    fn new_stroke(board: &BoardId, order: u32) -> NewStroke {
        let stroke = Stroke::new(
            StrokeId::generate(),
            Point::ZERO,
            StrokeStyle::default(),
            order,
            StrokeKind::Circle { radius: 3.0 },
        );
        NewStroke::from_stroke(board, &stroke)
    }

    fn update(user: &str) -> PresenceUpdate {
        PresenceUpdate {
            user_id: user.to_string(),
            display_name: user.to_string(),
            color: Color::BLACK,
            cursor_x: 0.0,
            cursor_y: 0.0,
        }
    }

    #[test]
    fn test_create_and_fetch_board() {
        let (store, _) = store();
        let id = block_on(store.create_board("Board 1", Color::WHITE)).unwrap();
        let board = block_on(store.board(&id)).unwrap().unwrap();
        assert_eq!(board.title, "Board 1");
        assert_eq!(board.background_color, Color::WHITE);
        assert!(block_on(store.board(&BoardId::new("missing"))).unwrap().is_none());
    }

    #[test]
    fn test_strokes_come_back_in_order() {
        let (store, _) = store();
        let board = block_on(store.create_board("b", Color::WHITE)).unwrap();
        block_on(store.add_stroke(&board, new_stroke(&board, 1))).unwrap();
        let first = block_on(store.add_stroke(&board, new_stroke(&board, 0))).unwrap();

        let records = block_on(store.strokes(&board)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, first);
    }

    #[test]
    fn test_add_to_unknown_board() {
        let (store, _) = store();
        let board = BoardId::new("nope");
        let result = block_on(store.add_stroke(&board, new_stroke(&board, 0)));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_clear_strokes() {
        let (store, _) = store();
        let board = block_on(store.create_board("b", Color::WHITE)).unwrap();
        block_on(store.add_stroke(&board, new_stroke(&board, 0))).unwrap();
        block_on(store.clear_strokes(&board)).unwrap();
        assert!(block_on(store.strokes(&board)).unwrap().is_empty());
    }

    #[test]
    fn test_list_boards_newest_first() {
        let (store, clock) = store();
        let older = block_on(store.create_board("older", Color::WHITE)).unwrap();
        clock.advance(Duration::from_secs(1));
        let newer = block_on(store.create_board("newer", Color::WHITE)).unwrap();

        let ids: Vec<BoardId> = block_on(store.list_boards())
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![newer, older.clone()]);

        clock.advance(Duration::from_secs(1));
        block_on(store.add_stroke(&older, new_stroke(&older, 0))).unwrap();
        let first = &block_on(store.list_boards()).unwrap()[0];
        assert_eq!(first.id, older);
    }

    #[test]
    fn test_remove_board_drops_strokes() {
        let (store, _) = store();
        let board = block_on(store.create_board("b", Color::WHITE)).unwrap();
        block_on(store.add_stroke(&board, new_stroke(&board, 0))).unwrap();
        block_on(store.remove_board(&board)).unwrap();
        assert!(block_on(store.board(&board)).unwrap().is_none());
        assert!(block_on(store.strokes(&board)).unwrap().is_empty());
    }

    #[test]
    fn test_presence_upsert_keeps_record_id() {
        let (store, clock) = store();
        let board = BoardId::new("b");
        let first = block_on(store.update_presence(&board, update("u1"))).unwrap();
        clock.advance(Duration::from_secs(1));
        let second = block_on(store.update_presence(&board, update("u1"))).unwrap();
        assert_eq!(first, second);

        let records = block_on(store.list_presence(&board)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].last_seen_at, clock.now());
    }

    #[test]
    fn test_stale_presence_hidden_then_cleaned() {
        let (store, clock) = store();
        let board = BoardId::new("b");
        block_on(store.update_presence(&board, update("old"))).unwrap();
        clock.advance(Duration::from_secs(6 * 60));
        block_on(store.update_presence(&board, update("new"))).unwrap();

        let users: Vec<String> = block_on(store.list_presence(&board))
            .unwrap()
            .into_iter()
            .map(|r| r.user_id)
            .collect();
        assert_eq!(users, vec!["new".to_string()]);
        assert_eq!(block_on(store.cleanup_presence()).unwrap(), 1);
    }

    #[test]
    fn test_remove_presence() {
        let (store, _) = store();
        let board = BoardId::new("b");
        block_on(store.update_presence(&board, update("u1"))).unwrap();
        block_on(store.remove_presence(&board, "u1")).unwrap();
        assert!(block_on(store.list_presence(&board)).unwrap().is_empty());
    }

    #[test]
    fn test_failing_writes() {
        let (store, _) = store();
        store.set_fail_writes(true);
        let result = block_on(store.create_board("b", Color::WHITE));
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
