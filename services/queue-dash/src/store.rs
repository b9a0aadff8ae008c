// services/queue-dash/src/store.rs
//
// Polled read model of the clinic queue
//
// Holds the last applied server list plus pending overlays for mutations
// that were submitted but not yet seen in a poll. Every fetch is numbered;
// a response older than the applied one is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::RwLock;
use svckit::{ClinicError, QueueEntry, QueueStatus, Room};
use tracing::{debug, warn};

use crate::api::{QueueSource, QueueView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// A newer fetch was already applied, or the view changed meanwhile.
    Stale,
}

/// A mutation shown before the server confirms it through a poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingChange {
    Status(QueueStatus),
    Assignment {
        veterinarian_id: i64,
        room: Option<Room>,
    },
}

#[derive(Debug, Clone)]
struct PendingOverlay {
    change: PendingChange,
    /// Last fetch number issued when the server accepted the mutation.
    confirmed_at: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueRow {
    pub entry: QueueEntry,
    pub pending: bool,
}

/// Read-only copy of the store handed to the UI.
#[derive(Debug, Clone)]
pub struct QueueSnapshot {
    pub view: QueueView,
    pub phase: LoadPhase,
    pub rows: Vec<QueueRow>,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
}

struct StoreState {
    view: QueueView,
    phase: LoadPhase,
    entries: Vec<QueueEntry>,
    error: Option<String>,
    last_updated: Option<DateTime<Local>>,
    applied_seq: u64,
    pending: HashMap<i64, PendingOverlay>,
}

pub struct QueueStore {
    source: Arc<dyn QueueSource>,
    issued: AtomicU64,
    state: RwLock<StoreState>,
}

impl QueueStore {
    pub fn new(source: Arc<dyn QueueSource>, view: QueueView) -> Self {
        Self {
            source,
            issued: AtomicU64::new(0),
            state: RwLock::new(StoreState {
                view,
                phase: LoadPhase::Idle,
                entries: Vec::new(),
                error: None,
                last_updated: None,
                applied_seq: 0,
                pending: HashMap::new(),
            }),
        }
    }

    pub fn view(&self) -> QueueView {
        self.state.read().view
    }

    /// Switches list and forgets everything fetched for the previous one.
    /// Fetches still in flight for the old view come back stale.
    pub fn set_view(&self, view: QueueView) {
        let mut state = self.state.write();
        state.view = view;
        state.phase = LoadPhase::Idle;
        state.entries.clear();
        state.error = None;
        state.last_updated = None;
        state.pending.clear();
        state.applied_seq = self.issued.load(Ordering::SeqCst);
    }

    /// Fetches the current view and applies it unless a newer fetch won.
    pub async fn refresh(&self) -> RefreshOutcome {
        let (seq, view) = self.begin();
        let result = self.source.list(view).await;
        self.complete(seq, result)
    }

    fn begin(&self) -> (u64, QueueView) {
        let mut state = self.state.write();
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        state.phase = LoadPhase::Loading;
        (seq, state.view)
    }

    fn complete(&self, seq: u64, result: Result<Vec<QueueEntry>, ClinicError>) -> RefreshOutcome {
        let mut state = self.state.write();
        if seq <= state.applied_seq {
            debug!("Discarding fetch #{} (applied #{})", seq, state.applied_seq);
            return RefreshOutcome::Stale;
        }
        state.applied_seq = seq;

        match result {
            Ok(entries) => {
                debug!("Fetch #{} applied: {} entries", seq, entries.len());
                state.entries = entries;
                state.error = None;
                state.phase = LoadPhase::Loaded;
                state.last_updated = Some(Local::now());
                state
                    .pending
                    .retain(|_, overlay| overlay.confirmed_at.map_or(true, |c| seq <= c));
            }
            Err(e) => {
                warn!("Fetch #{} failed: {}", seq, e);
                state.error = Some(e.to_string());
                state.phase = LoadPhase::Error;
            }
        }
        RefreshOutcome::Applied
    }

    pub fn mark_pending(&self, id: i64, change: PendingChange) {
        self.state.write().pending.insert(
            id,
            PendingOverlay {
                change,
                confirmed_at: None,
            },
        );
    }

    /// The server accepted the mutation; the next fetch issued from now on
    /// reflects it and retires the overlay.
    pub fn confirm_pending(&self, id: i64) {
        let issued = self.issued.load(Ordering::SeqCst);
        if let Some(overlay) = self.state.write().pending.get_mut(&id) {
            overlay.confirmed_at = Some(issued);
        }
    }

    pub fn discard_pending(&self, id: i64) {
        self.state.write().pending.remove(&id);
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let state = self.state.read();
        let rows = state
            .entries
            .iter()
            .map(|entry| match state.pending.get(&entry.id) {
                Some(overlay) => QueueRow {
                    entry: overlaid(entry, &overlay.change),
                    pending: true,
                },
                None => QueueRow {
                    entry: entry.clone(),
                    pending: false,
                },
            })
            .collect();

        QueueSnapshot {
            view: state.view,
            phase: state.phase,
            rows,
            error: state.error.clone(),
            last_updated: state.last_updated,
        }
    }
}

fn overlaid(entry: &QueueEntry, change: &PendingChange) -> QueueEntry {
    let mut entry = entry.clone();
    match change {
        PendingChange::Status(status) => entry.status = *status,
        PendingChange::Assignment {
            veterinarian_id,
            room,
        } => {
            if entry.veterinarian_id != Some(*veterinarian_id) {
                entry.veterinarian_name = None;
            }
            entry.veterinarian_id = Some(*veterinarian_id);
            entry.room = room.map(|r| r.label().to_string());
        }
    }
    entry
}
