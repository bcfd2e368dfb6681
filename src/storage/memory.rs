//! In-memory storage module.
//!
//! Nothing here survives a restart; this variant backs tests and
//! single-process deployments. Appends are durable the moment they land in
//! the entry vector, so completions fire before the call returns. Callers
//! must not rely on that, the durable variant completes from an I/O task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;

use crate::types::{EntryId, LogId};

use super::entry::LogEntry;
use super::{Completion, Log, StorageModule};

/// One in-memory append-only log.
pub struct MemoryLog {
    log_id: LogId,
    entries: RwLock<Vec<LogEntry>>,
}

impl MemoryLog {
    pub fn new(log_id: LogId) -> Self {
        MemoryLog {
            log_id,
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Log for MemoryLog {
    fn log_id(&self) -> LogId {
        self.log_id
    }

    fn last_id(&self) -> EntryId {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.len() {
            0 => EntryId::NONE,
            n => EntryId::new(n as u64 - 1),
        }
    }

    async fn append(&self, mut entry: LogEntry, done: Box<dyn Completion<LogEntry>>) {
        let assigned = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            entry.log_id = self.log_id;
            entry.entry_id = EntryId::new(entries.len() as u64);
            entries.push(entry.clone());
            entry
        };

        tracing::trace!(log_id = %self.log_id, entry_id = %assigned.entry_id, "entry appended");
        done.complete(assigned);
    }

    fn read_from(&self, first: EntryId) -> Vec<LogEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let start = first.value().min(entries.len() as u64) as usize;
        entries[start..].to_vec()
    }
}

/// Directory of in-memory logs.
///
/// The directory holds the one strong handle to each log; callers get
/// shared handles, so a deleted log stays readable until the last handle
/// drops.
pub struct MemoryStorage {
    logs: Mutex<HashMap<LogId, Arc<MemoryLog>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage {
            logs: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageModule for MemoryStorage {
    async fn create_log(&self, id: LogId) -> Arc<dyn Log> {
        let mut logs = self.logs.lock().unwrap_or_else(PoisonError::into_inner);
        let log = logs
            .entry(id)
            .or_insert_with(|| {
                tracing::debug!(log_id = %id, "log created");
                Arc::new(MemoryLog::new(id))
            })
            .clone();
        log
    }

    fn get_logs(&self) -> Vec<Arc<dyn Log>> {
        let logs = self.logs.lock().unwrap_or_else(PoisonError::into_inner);
        logs.values()
            .map(|log| log.clone() as Arc<dyn Log>)
            .collect()
    }

    async fn delete_log(&self, id: LogId, done: Box<dyn Completion<LogId>>) {
        let removed = {
            let mut logs = self.logs.lock().unwrap_or_else(PoisonError::into_inner);
            logs.remove(&id)
        };
        if removed.is_some() {
            tracing::debug!(log_id = %id, "log deleted");
        }
        done.complete(id);
    }
}
