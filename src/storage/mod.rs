//! Replicated log storage substrate.
//!
//! A storage module is a directory of append-only logs keyed by [`LogId`].
//! Each log hands out dense, monotonically increasing entry IDs and notifies
//! a completion when an append is durable. The consensus layer sits on top
//! of these traits; this crate ships the in-memory implementation in
//! [`memory`], the durable one lives with the server.
//!
//! Completion notifications use the [`Completion`] capability rather than a
//! callback base type: pass a closure for fire-and-forget, or adapt a
//! [`tokio::sync::oneshot::Sender`] with [`send_to`] to await the result.

pub mod entry;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{EntryId, LogId};

use self::entry::LogEntry;

/// Something that can receive exactly one completion value.
///
/// Implemented for any `FnOnce(T)`; [`send_to`] adapts a oneshot sender.
/// Storage operations consume the box and invoke it exactly once, on an
/// unspecified task, before the operation is considered externally complete.
pub trait Completion<T>: Send {
    fn complete(self: Box<Self>, value: T);
}

impl<T, F> Completion<T> for F
where
    F: FnOnce(T) + Send,
{
    fn complete(self: Box<Self>, value: T) {
        (*self)(value)
    }
}

/// Adapt a oneshot sender into a completion, for callers that want to await
/// the result. The receiver may have gone away by completion time; delivery
/// is best-effort then.
pub fn send_to<T: Send + 'static>(tx: tokio::sync::oneshot::Sender<T>) -> Box<dyn Completion<T>> {
    Box::new(move |value| {
        let _ = tx.send(value);
    })
}

/// One append-only sequence of entries.
#[async_trait]
pub trait Log: Send + Sync {
    fn log_id(&self) -> LogId;

    /// The highest assigned entry ID, or [`EntryId::NONE`] while empty.
    fn last_id(&self) -> EntryId;

    /// Append a copy of `entry`, assigning its log ID and the next dense
    /// entry ID. `done` receives the entry with its assigned IDs once the
    /// append is durable.
    async fn append(&self, entry: LogEntry, done: Box<dyn Completion<LogEntry>>);

    /// Snapshot of all entries with `entry_id >= first`, in ascending order.
    /// Empty when `first` is past the end. Never fails.
    fn read_from(&self, first: EntryId) -> Vec<LogEntry>;
}

/// A directory of logs keyed by log ID.
#[async_trait]
pub trait StorageModule: Send + Sync {
    /// Create the log with the given ID, or return the existing handle:
    /// creation is idempotent.
    async fn create_log(&self, id: LogId) -> Arc<dyn Log>;

    /// Snapshot of all logs, in unspecified order.
    fn get_logs(&self) -> Vec<Arc<dyn Log>>;

    /// Remove the log if present. `done` receives `id` once the removal is
    /// durable; deleting an absent ID is legal and still completes. After
    /// `done` fires, `get_logs` no longer returns the log, but entries stay
    /// readable through handles obtained earlier.
    async fn delete_log(&self, id: LogId, done: Box<dyn Completion<LogId>>);
}
