//! The unit of log storage.

use std::fmt;

use bytes::Bytes;

use crate::types::{EntryId, LogId};

/// One immutable record in a log.
///
/// The log assigns `log_id` and `entry_id` on append; until then both hold
/// their `NONE` sentinels. The three 32-bit fields are caller-supplied tags
/// the log preserves verbatim; it never interprets them. `invalidations`
/// names earlier entries this one supersedes, for the compaction machinery
/// above the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub log_id: LogId,
    pub entry_id: EntryId,
    pub create_time: u32,
    pub term: u32,
    pub tag: u32,
    pub payload: Bytes,
    pub invalidations: Vec<EntryId>,
}

impl LogEntry {
    /// A fresh entry, not yet appended anywhere.
    pub fn new(create_time: u32, term: u32, tag: u32, payload: Bytes) -> Self {
        LogEntry {
            log_id: LogId::NONE,
            entry_id: EntryId::NONE,
            create_time,
            term,
            tag,
            payload,
            invalidations: Vec::new(),
        }
    }

    /// Attach the list of entry IDs this entry supersedes.
    pub fn with_invalidations(mut self, invalidations: Vec<EntryId>) -> Self {
        self.invalidations = invalidations;
        self
    }
}

/// Renders `(log_id, entry_id) 'payload'` with an ` [inv a, b]` suffix when
/// the invalidation list is nonempty. For operator eyes only; nothing
/// round-trips through this.
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = String::from_utf8_lossy(&self.payload);
        write!(
            f,
            "({}, {}) '{}'",
            self.log_id,
            self.entry_id,
            payload.trim_end_matches('\0')
        )?;
        if !self.invalidations.is_empty() {
            write!(f, " [inv ")?;
            for (i, id) in self.invalidations.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{id}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_has_no_identity() {
        let entry = LogEntry::new(1, 2, 3, Bytes::from_static(b"hello"));
        assert_eq!(entry.log_id, LogId::NONE);
        assert!(entry.entry_id.is_none());
        assert_eq!(entry.create_time, 1);
        assert_eq!(entry.term, 2);
        assert_eq!(entry.tag, 3);
        assert!(entry.invalidations.is_empty());
    }

    #[test]
    fn test_display_plain() {
        let mut entry = LogEntry::new(1, 2, 3, Bytes::from_static(b"hello"));
        entry.log_id = LogId::new(92);
        entry.entry_id = EntryId::new(0);
        assert_eq!(entry.to_string(), "(92, 0) 'hello'");
    }

    #[test]
    fn test_display_with_invalidations() {
        let mut entry = LogEntry::new(1, 2, 3, Bytes::from_static(b"hello"))
            .with_invalidations(vec![EntryId::new(4), EntryId::new(5)]);
        entry.log_id = LogId::new(92);
        entry.entry_id = EntryId::new(0);
        assert_eq!(entry.to_string(), "(92, 0) 'hello' [inv 4, 5]");
    }

    #[test]
    fn test_display_trims_trailing_nul() {
        let mut entry = LogEntry::new(0, 0, 0, Bytes::from_static(b"world!\0"));
        entry.log_id = LogId::new(92);
        entry.entry_id = EntryId::new(1);
        assert_eq!(entry.to_string(), "(92, 1) 'world!'");
    }

    #[test]
    fn test_payload_shares_storage_on_clone() {
        let payload = Bytes::from(vec![7u8; 1024]);
        let entry = LogEntry::new(0, 0, 0, payload.clone());
        let copy = entry.clone();
        // Bytes clones are reference-counted views, not copies.
        assert_eq!(copy.payload.as_ptr(), payload.as_ptr());
    }
}
