//! Type-safe wrappers for protocol primitives.
//!
//! These newtypes keep the two 64-bit identifier spaces of the storage layer
//! from being mixed up: which log an entry lives in, and where in that log
//! it sits.

use bytes::BufMut;
use std::fmt;

use crate::encode::ToByte;
use crate::error::Result;

/// Identifier of one log within a storage module.
///
/// Log IDs are 64-bit unsigned integers assigned by whoever creates the log;
/// the storage module only requires them to be unique within the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LogId(pub u64);

impl LogId {
    /// Sentinel for an entry that has not yet been appended to any log.
    pub const NONE: Self = LogId(u64::MAX);

    #[inline]
    pub const fn new(value: u64) -> Self {
        LogId(value)
    }

    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for LogId {
    fn from(value: u64) -> Self {
        LogId(value)
    }
}

impl From<LogId> for u64 {
    fn from(id: LogId) -> Self {
        id.0
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToByte for LogId {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        self.0.encode(buffer)
    }
}

/// Position of an entry within its log.
///
/// Entry IDs are dense and monotonically increasing starting at 0. They are
/// assigned by the log on append and never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EntryId(pub u64);

impl EntryId {
    /// Sentinel meaning "no entry": the last ID of an empty log, or the ID
    /// of an entry that has not been appended yet.
    pub const NONE: Self = EntryId(u64::MAX);

    #[inline]
    pub const fn new(value: u64) -> Self {
        EntryId(value)
    }

    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl From<u64> for EntryId {
    fn from(value: u64) -> Self {
        EntryId(value)
    }
}

impl From<EntryId> for u64 {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToByte for EntryId {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        self.0.encode(buffer)
    }
}
