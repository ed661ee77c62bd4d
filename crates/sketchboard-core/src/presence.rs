//! Live cursors of the users on a board.
//!
//! Outgoing cursor updates go through a [`Throttle`]; incoming presence
//! records are kept as a read replica and filtered for staleness whenever
//! they are read. Nothing sweeps old records, a record simply stops being
//! visible once it is older than the staleness window.

use crate::board::BoardId;
use crate::clock::{SharedClock, Timestamp};
use crate::stroke::Color;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identity of the local user, supplied by the embedding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUser {
    pub id: String,
    pub name: String,
    pub color: Color,
}

/// A cursor sample to publish for the local user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUpdate {
    pub user_id: String,
    #[serde(rename = "userName")]
    pub display_name: String,
    #[serde(rename = "userColor")]
    pub color: Color,
    pub cursor_x: f64,
    pub cursor_y: f64,
}

/// One user's presence on a board, as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    pub user_id: String,
    #[serde(rename = "userName")]
    pub display_name: String,
    #[serde(rename = "userColor")]
    pub color: Color,
    pub cursor_x: f64,
    pub cursor_y: f64,
    #[serde(rename = "lastSeen")]
    pub last_seen_at: Timestamp,
}

impl PresenceRecord {
    pub fn from_update(update: PresenceUpdate, seen_at: Timestamp) -> Self {
        Self {
            user_id: update.user_id,
            display_name: update.display_name,
            color: update.color,
            cursor_x: update.cursor_x,
            cursor_y: update.cursor_y,
            last_seen_at: seen_at,
        }
    }

    pub fn cursor(&self) -> Point {
        Point::new(self.cursor_x, self.cursor_y)
    }

    /// Seen strictly within `stale_after` of `now`.
    pub fn is_live(&self, now: Timestamp, stale_after: Duration) -> bool {
        self.last_seen_at > now - stale_after
    }
}

/// Rate limiter that lets through at most one sample per interval.
///
/// Samples offered inside the window are not queued; only the most recent
/// one is held and released by [`Throttle::poll`] once the window closes.
pub struct Throttle<T> {
    interval: Duration,
    clock: SharedClock,
    last_emit: Option<Timestamp>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration, clock: SharedClock) -> Self {
        Self {
            interval,
            clock,
            last_emit: None,
            pending: None,
        }
    }

    fn window_open(&self, now: Timestamp) -> bool {
        match self.last_emit {
            Some(last) => now.duration_since(last) >= self.interval,
            None => true,
        }
    }

    /// Offer a sample. Returns it if it may go out now, otherwise keeps it
    /// as the pending sample (replacing any older one).
    pub fn offer(&mut self, sample: T) -> Option<T> {
        let now = self.clock.now();
        if self.window_open(now) {
            self.last_emit = Some(now);
            self.pending = None;
            Some(sample)
        } else {
            self.pending = Some(sample);
            None
        }
    }

    /// Release the pending sample if the window has closed.
    pub fn poll(&mut self) -> Option<T> {
        let now = self.clock.now();
        if self.pending.is_some() && self.window_open(now) {
            self.last_emit = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Forget the pending sample and the last emission time.
    pub fn reset(&mut self) {
        self.last_emit = None;
        self.pending = None;
    }
}

/// Removal request issued when the local user leaves a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceLeave {
    pub board_id: BoardId,
    pub user_id: String,
}

/// Presence for the local user on one board.
pub struct PresenceTracker {
    board_id: BoardId,
    user: LocalUser,
    throttle: Throttle<Point>,
    stale_after: Duration,
    clock: SharedClock,
    peers: Vec<PresenceRecord>,
}

impl PresenceTracker {
    pub fn new(
        board_id: BoardId,
        user: LocalUser,
        interval: Duration,
        stale_after: Duration,
        clock: SharedClock,
    ) -> Self {
        Self {
            board_id,
            user,
            throttle: Throttle::new(interval, clock.clone()),
            stale_after,
            clock,
            peers: Vec::new(),
        }
    }

    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    pub fn user(&self) -> &LocalUser {
        &self.user
    }

    fn update_for(&self, cursor: Point) -> PresenceUpdate {
        PresenceUpdate {
            user_id: self.user.id.clone(),
            display_name: self.user.name.clone(),
            color: self.user.color,
            cursor_x: cursor.x,
            cursor_y: cursor.y,
        }
    }

    /// Record a cursor move. Returns an update when one may be published now.
    pub fn cursor_moved(&mut self, cursor: Point) -> Option<PresenceUpdate> {
        self.throttle.offer(cursor).map(|c| self.update_for(c))
    }

    /// Publish the held-back latest cursor once the interval has passed.
    pub fn poll(&mut self) -> Option<PresenceUpdate> {
        self.throttle.poll().map(|c| self.update_for(c))
    }

    /// Replace the replica with the store's latest list.
    pub fn replace_peers(&mut self, records: Vec<PresenceRecord>) {
        self.peers = records;
    }

    /// Records seen within the staleness window, including our own.
    pub fn active(&self) -> Vec<&PresenceRecord> {
        let now = self.clock.now();
        self.peers
            .iter()
            .filter(|r| r.is_live(now, self.stale_after))
            .collect()
    }

    /// Live records of other users, for drawing their cursors.
    pub fn remote_cursors(&self) -> Vec<&PresenceRecord> {
        self.active()
            .into_iter()
            .filter(|r| r.user_id != self.user.id)
            .collect()
    }

    /// Stop publishing and produce the removal request for the store.
    pub fn leave(&mut self) -> PresenceLeave {
        self.throttle.reset();
        self.peers.clear();
        PresenceLeave {
            board_id: self.board_id.clone(),
            user_id: self.user.id.clone(),
        }
    }
}
