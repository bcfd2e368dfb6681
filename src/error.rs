//! Crate & protocol level errors.
//!
//! Two kinds of failure live here:
//!
//! - [`Error`]: things that go wrong on this side of the wire: connection
//!   loss, frames that cannot be decoded, addresses that cannot be parsed.
//! - [`Status`]: the cluster's verdict on a request, carried as the first
//!   byte of every response. The set is closed; a byte outside it means the
//!   two sides do not speak the same protocol and the caller must treat the
//!   response as unintelligible.
//!
//! Routing-level statuses (`NotLeader`) and transient connection errors are
//! consumed internally by [`crate::client::LeaderRpc`] and never reach its
//! callers. `SessionExpired` is the one status that surfaces as an [`Error`]:
//! the layer that owns the session decides whether to open a new one.

use bytes::Bytes;
use num_derive::FromPrimitive;
use std::{io, result};
use thiserror::Error as ThisError;

pub type Result<T> = result::Result<T, Error>;

/// Connection and protocol level errors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum Error {
    /// An error in the network.
    #[error("IO error: {0:?}")]
    Io(io::ErrorKind),

    /// The peer closed the connection before a reply arrived.
    #[error("connection closed by peer")]
    Disconnected,

    /// A frame shorter than its fixed-layout header.
    #[error("malformed frame: need {needed} header bytes, have {have}")]
    MalformedFrame { needed: usize, have: usize },

    /// A frame larger than the maximum this client will buffer.
    #[error("frame of {0} bytes exceeds the maximum frame size")]
    OversizedFrame(usize),

    /// Could not parse the data.
    #[error("parsing error: invalid data ({} bytes)", .0.len())]
    Parsing(Bytes),

    /// A cluster address that does not have the form `host:port`.
    #[error("invalid cluster address: {0}")]
    InvalidAddress(String),

    /// The cluster discarded this client's exactly-once session.
    #[error("session expired on the cluster")]
    SessionExpired,
}

impl Error {
    /// Whether this error is worth retrying against the same endpoint.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Disconnected)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e.kind())
    }
}

/// Status byte carried in every response header.
///
/// The set is exhaustive for wire version 1. Decode with [`Status::from_wire`];
/// `None` means the server sent a byte this client does not know, which is a
/// fatal protocol violation (see [`crate::client::LeaderRpc`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum Status {
    /// The request was executed; the response body is a valid serialized
    /// response message.
    Ok = 0,
    /// The server does not support the client's wire version. The client is
    /// too old to talk to this cluster.
    InvalidVersion = 1,
    /// The server rejected the request as malformed. The two sides disagree
    /// about what a field means; this is a programming error, not a
    /// condition to retry.
    InvalidRequest = 2,
    /// The receiving server is not the cluster leader. The response body may
    /// carry a `host:port` hint naming a better candidate.
    NotLeader = 3,
    /// The exactly-once session named by the request has been discarded.
    SessionExpired = 4,
}

impl Status {
    /// Decode a raw status byte. Returns `None` for bytes outside the
    /// version-1 set; never coerces.
    pub fn from_wire(byte: u8) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(byte)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::InvalidVersion => "INVALID_VERSION",
            Status::InvalidRequest => "INVALID_REQUEST",
            Status::NotLeader => "NOT_LEADER",
            Status::SessionExpired => "SESSION_EXPIRED",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
