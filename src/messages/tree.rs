//! Wire shapes for operations on the replicated key-value tree.
//!
//! The tree itself lives behind the consensus layer; this module only
//! defines how its operations travel. Read-only operations go through
//! `READ_ONLY_TREE` without exactly-once metadata; mutations go through
//! `READ_WRITE_TREE` and carry [`ExactlyOnceRpcInfo`] so retries are
//! deduplicated.

use bytes::{BufMut, Bytes};
use nom::{IResult, number::complete::be_u8};
use nombytes::NomBytes;
use num_derive::FromPrimitive;

use crate::encode::{ToByte, encode_as_array};
use crate::error::Result;
use crate::parser::{
    parse_array, parse_chunk, parse_optional_chunk, parse_optional_string, parse_string_utf8,
};
use crate::protocol::FromWire;

use super::session::{ExactlyOnceRpcInfo, parse_exactly_once};

/// Outcome of a tree operation, distinct from the RPC-level status byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum TreeStatus {
    Ok = 0,
    /// The path or contents were not acceptable to the operation.
    InvalidArgument = 1,
    /// A component of the path does not exist.
    LookupError = 2,
    /// A component of the path is a file where a directory was expected, or
    /// vice versa.
    TypeError = 3,
    /// The operation's precondition did not hold.
    ConditionNotMet = 4,
}

impl TreeStatus {
    pub fn from_wire(byte: u8) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(byte)
    }
}

fn parse_tree_status(s: NomBytes) -> IResult<NomBytes, TreeStatus> {
    let (s, byte) = be_u8(s)?;
    match TreeStatus::from_wire(byte) {
        Some(status) => Ok((s, status)),
        None => Err(nom::Err::Failure(nom::error::Error::new(
            s,
            nom::error::ErrorKind::Verify,
        ))),
    }
}

/// Read-only tree operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum TreeReadOp {
    ListDirectory = 0,
    Read = 1,
}

/// Mutating tree operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum TreeWriteOp {
    MakeDirectory = 0,
    RemoveDirectory = 1,
    Write = 2,
    RemoveFile = 3,
}

/// A read against the tree at `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOnlyTreeRequest {
    pub op: TreeReadOp,
    pub path: String,
}

impl ToByte for ReadOnlyTreeRequest {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        (self.op as u8).encode(buffer)?;
        self.path.encode(buffer)
    }
}

/// Result of a read: one chunk for `Read`, one chunk per name for
/// `ListDirectory`, empty on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOnlyTreeResponse {
    pub status: TreeStatus,
    pub contents: Vec<Bytes>,
    pub error: Option<String>,
}

impl ToByte for ReadOnlyTreeResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        (self.status as u8).encode(buffer)?;
        encode_as_array(buffer, &self.contents, |buffer, chunk| {
            chunk.encode(buffer)
        })?;
        self.error.encode(buffer)
    }
}

fn parse_read_only_tree_response(s: NomBytes) -> IResult<NomBytes, ReadOnlyTreeResponse> {
    let (s, status) = parse_tree_status(s)?;
    let (s, contents) = parse_array(parse_chunk)(s)?;
    let (s, error) = parse_optional_string(s)?;
    Ok((
        s,
        ReadOnlyTreeResponse {
            status,
            contents,
            error,
        },
    ))
}

impl FromWire for ReadOnlyTreeResponse {
    fn from_wire(data: Bytes) -> Result<Self> {
        super::decode_with(data, parse_read_only_tree_response)
    }
}

/// A mutation of the tree at `path`, deduplicated via `exactly_once`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadWriteTreeRequest {
    pub exactly_once: ExactlyOnceRpcInfo,
    pub op: TreeWriteOp,
    pub path: String,
    /// File contents for `Write`; absent for the other operations.
    pub contents: Option<Bytes>,
}

impl ToByte for ReadWriteTreeRequest {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.exactly_once.encode(buffer)?;
        (self.op as u8).encode(buffer)?;
        self.path.encode(buffer)?;
        self.contents.encode(buffer)
    }
}

fn parse_read_write_tree_request(s: NomBytes) -> IResult<NomBytes, ReadWriteTreeRequest> {
    let (s, exactly_once) = parse_exactly_once(s)?;
    let (s, op_byte) = be_u8(s)?;
    let op = match num_traits::FromPrimitive::from_u8(op_byte) {
        Some(op) => op,
        None => {
            return Err(nom::Err::Failure(nom::error::Error::new(
                s,
                nom::error::ErrorKind::Verify,
            )));
        }
    };
    let (s, path) = parse_string_utf8(s)?;
    let (s, contents) = parse_optional_chunk(s)?;
    Ok((
        s,
        ReadWriteTreeRequest {
            exactly_once,
            op,
            path,
            contents,
        },
    ))
}

impl FromWire for ReadWriteTreeRequest {
    fn from_wire(data: Bytes) -> Result<Self> {
        super::decode_with(data, parse_read_write_tree_request)
    }
}

/// Result of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadWriteTreeResponse {
    pub status: TreeStatus,
    pub error: Option<String>,
}

impl ToByte for ReadWriteTreeResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        (self.status as u8).encode(buffer)?;
        self.error.encode(buffer)
    }
}

fn parse_read_write_tree_response(s: NomBytes) -> IResult<NomBytes, ReadWriteTreeResponse> {
    let (s, status) = parse_tree_status(s)?;
    let (s, error) = parse_optional_string(s)?;
    Ok((s, ReadWriteTreeResponse { status, error }))
}

impl FromWire for ReadWriteTreeResponse {
    fn from_wire(data: Bytes) -> Result<Self> {
        super::decode_with(data, parse_read_write_tree_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_request_layout() {
        let req = ReadOnlyTreeRequest {
            op: TreeReadOp::Read,
            path: "/etc".to_string(),
        };
        let mut buf = Vec::new();
        req.encode(&mut buf).unwrap();
        assert_eq!(buf, vec![1, 0x00, 0x04, b'/', b'e', b't', b'c']);
    }

    #[test]
    fn test_read_only_response_roundtrip() {
        let resp = ReadOnlyTreeResponse {
            status: TreeStatus::Ok,
            contents: vec![Bytes::from_static(b"a"), Bytes::from_static(b"b")],
            error: None,
        };
        let mut buf = Vec::new();
        resp.encode(&mut buf).unwrap();
        assert_eq!(ReadOnlyTreeResponse::from_wire(Bytes::from(buf)).unwrap(), resp);
    }

    #[test]
    fn test_read_write_request_roundtrip() {
        let req = ReadWriteTreeRequest {
            exactly_once: ExactlyOnceRpcInfo {
                client_id: 9,
                first_outstanding_rpc: 1,
                rpc_number: 4,
            },
            op: TreeWriteOp::Write,
            path: "/var/x".to_string(),
            contents: Some(Bytes::from_static(b"value")),
        };
        let mut buf = Vec::new();
        req.encode(&mut buf).unwrap();
        assert_eq!(ReadWriteTreeRequest::from_wire(Bytes::from(buf)).unwrap(), req);
    }

    #[test]
    fn test_failed_mutation_carries_error_text() {
        let resp = ReadWriteTreeResponse {
            status: TreeStatus::LookupError,
            error: Some("/var does not exist".to_string()),
        };
        let mut buf = Vec::new();
        resp.encode(&mut buf).unwrap();
        let decoded = ReadWriteTreeResponse::from_wire(Bytes::from(buf)).unwrap();
        assert_eq!(decoded.status, TreeStatus::LookupError);
        assert_eq!(decoded.error.as_deref(), Some("/var does not exist"));
    }

    #[test]
    fn test_unknown_tree_status_fails_decode() {
        // status byte 9 is outside the closed set
        assert!(ReadWriteTreeResponse::from_wire(Bytes::from_static(&[9, 0])).is_err());
    }
}
