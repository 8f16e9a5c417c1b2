//! Per-client signaling registry
//!
//! Two independent maps, one per direction: client ID to signal slot
//! (broker wakes the client's long poll) and client ID to value slot (client
//! delivers its reply). The maps deliberately do not share a lock; check-in
//! and command issuance run concurrently and must not serialize on each
//! other's unrelated IDs. Entries are created lazily from whichever path
//! touches an ID first and live for the rest of the process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::timefmt::WireTime;

/// Single-slot handoff channel.
///
/// A capacity-1 channel where the sending side never blocks: an offer made
/// while the slot already holds an undelivered element is dropped. This is
/// what lets a command be issued without the issuer waiting for a receiver,
/// and a reply be submitted without the submitter waiting for a reader.
pub struct Slot<T> {
    tx: mpsc::Sender<T>,
    rx: tokio::sync::Mutex<mpsc::Receiver<T>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            tx,
            rx: tokio::sync::Mutex::new(rx),
        }
    }

    /// Hand off a value without blocking. Returns false if the slot already
    /// holds an undelivered element; the new value is dropped in that case.
    pub fn offer(&self, value: T) -> bool {
        self.tx.try_send(value).is_ok()
    }

    /// Wait cooperatively for an element, up to `ceiling`. None on timeout.
    pub async fn take(&self, ceiling: Duration) -> Option<T> {
        timeout(ceiling, async { self.rx.lock().await.recv().await })
            .await
            .ok()
            .flatten()
    }

    /// Discard a buffered element left over from an earlier cycle, if any.
    /// A no-op while a taker holds the receiving side.
    pub fn clear(&self) {
        if let Ok(mut rx) = self.rx.try_lock() {
            while rx.try_recv().is_ok() {}
        }
    }
}

type SlotMap<T> = Mutex<HashMap<String, Arc<Slot<T>>>>;

/// Registry of per-client handoff slots.
///
/// Lookups are get-or-create and idempotent: concurrent callers for the same
/// ID always land on the same slot. No operation removes an entry.
pub struct ClientRegistry {
    signals: SlotMap<()>,
    values: SlotMap<WireTime>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            signals: Mutex::new(HashMap::new()),
            values: Mutex::new(HashMap::new()),
        }
    }

    /// Signal slot for `id`, created if absent.
    pub fn signal_slot(&self, id: &str) -> Arc<Slot<()>> {
        Self::get_or_create(&self.signals, id)
    }

    /// Value slot for `id`, created if absent.
    pub fn value_slot(&self, id: &str) -> Arc<Slot<WireTime>> {
        Self::get_or_create(&self.values, id)
    }

    /// Signal slot for `id` only if one already exists. Absence means the
    /// client has never checked in.
    pub fn known_signal_slot(&self, id: &str) -> Option<Arc<Slot<()>>> {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    // The lock is held only across the map lookup/insert, never across a
    // wait on the slot itself.
    fn get_or_create<T>(map: &SlotMap<T>, id: &str) -> Arc<Slot<T>> {
        map.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Slot::new()))
            .clone()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
