//! Folding authoritative stroke lists into local state.
//!
//! The store pushes the full ordered stroke list of a board whenever it
//! changes. A push that matches what is already shown changes nothing. The
//! first non-empty push into an untouched history becomes the history's
//! base; any later push only replaces the shown collection and leaves the
//! undo timeline alone.
//!
//! A push that arrives between an optimistic local commit and the store's
//! acknowledgement may briefly hide the local stroke. The next push, which
//! includes it, brings it back.

use crate::history::History;
use crate::stroke::{StrokeCollection, StrokeRecord};

/// What a push did to local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Same strokes as already shown.
    Unchanged,
    /// History was pristine and now starts from the pushed strokes.
    InitialLoad,
    /// The shown strokes were replaced; history untouched.
    LiveUpdated,
}

/// Decode records, dropping the ones that do not form a valid stroke.
pub fn decode_records(records: &[StrokeRecord]) -> StrokeCollection {
    records
        .iter()
        .filter_map(|record| match record.decode() {
            Ok(stroke) => Some(stroke),
            Err(err) => {
                log::warn!("Dropping stroke record {}: {}", record.id, err);
                None
            }
        })
        .collect()
}

/// Apply a pushed stroke list to the shown collection and history.
pub fn reconcile(
    live: &mut StrokeCollection,
    history: &mut History,
    records: &[StrokeRecord],
) -> SyncOutcome {
    let remote = decode_records(records);
    if &remote == live {
        return SyncOutcome::Unchanged;
    }
    if history.is_pristine() {
        log::debug!("Initial load of {} strokes", remote.len());
        history.reset_to(remote.clone());
        *live = remote;
        SyncOutcome::InitialLoad
    } else {
        log::debug!("Remote update to {} strokes", remote.len());
        *live = remote;
        SyncOutcome::LiveUpdated
    }
}
