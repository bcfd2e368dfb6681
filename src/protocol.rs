//! Wire envelope for client↔cluster RPCs.
//!
//! Every RPC travels inside a length-delimited frame (the transport's
//! concern; see [`crate::client::session`]). Inside the frame, version 1
//! lays out:
//!
//! ```text
//! Request:  [ version:u8 ][ op_code:u8 ]  [ payload ]
//! Response: [ status:u8 ]                 [ payload ]
//! ```
//!
//! All multi-byte integers inside payloads are big-endian. The meaning of a
//! response payload depends on the status byte: on `OK` it is the serialized
//! response message, on `NOT_LEADER` it is an optional NUL-terminated
//! `host:port` hint, and on every other status it is empty.

use bytes::Bytes;
use nom::{
    IResult,
    number::complete::be_u8,
};
use nombytes::NomBytes;

use crate::constants::RESPONSE_HEADER_SIZE;
use crate::encode::ToByte;
use crate::error::{Error, Result};

/// The only wire version this client speaks.
pub const RPC_VERSION: u8 = 1;

/// Operation codes for the version-1 RPC set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    GetSupportedRpcVersions = 0,
    OpenSession = 1,
    GetConfiguration = 2,
    SetConfiguration = 3,
    ReadOnlyTree = 4,
    ReadWriteTree = 5,
    OpenLog = 6,
    DeleteLog = 7,
    ListLogs = 8,
}

impl OpCode {
    /// Returns a static string name for this op code.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            OpCode::GetSupportedRpcVersions => "GetSupportedRpcVersions",
            OpCode::OpenSession => "OpenSession",
            OpCode::GetConfiguration => "GetConfiguration",
            OpCode::SetConfiguration => "SetConfiguration",
            OpCode::ReadOnlyTree => "ReadOnlyTree",
            OpCode::ReadWriteTree => "ReadWriteTree",
            OpCode::OpenLog => "OpenLog",
            OpCode::DeleteLog => "DeleteLog",
            OpCode::ListLogs => "ListLogs",
        }
    }

    /// Decode an op code byte. Returns `None` for codes outside the
    /// version-1 set.
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(OpCode::GetSupportedRpcVersions),
            1 => Some(OpCode::OpenSession),
            2 => Some(OpCode::GetConfiguration),
            3 => Some(OpCode::SetConfiguration),
            4 => Some(OpCode::ReadOnlyTree),
            5 => Some(OpCode::ReadWriteTree),
            6 => Some(OpCode::OpenLog),
            7 => Some(OpCode::DeleteLog),
            8 => Some(OpCode::ListLogs),
            _ => None,
        }
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as u8
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-layout header preceding every request payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub version: u8,
    pub op_code: u8,
}

impl ToByte for RequestHeader {
    fn encode<W: bytes::BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.version.encode(buffer)?;
        self.op_code.encode(buffer)
    }
}

/// Parse a request header from the front of a frame.
pub fn parse_request_header(s: NomBytes) -> IResult<NomBytes, RequestHeader> {
    let (s, version) = be_u8(s)?;
    let (s, op_code) = be_u8(s)?;
    Ok((s, RequestHeader { version, op_code }))
}

/// Decoding contract for response payloads.
///
/// Implementations parse the payload that followed an `OK` status byte. A
/// payload that does not parse is a protocol violation; the routing engine
/// treats it as fatal.
pub trait FromWire: Sized {
    fn from_wire(data: Bytes) -> Result<Self>;
}

/// Encode a request into a single contiguous buffer: the two header bytes
/// followed by the serialized payload.
pub fn encode_request<T: ToByte>(version: u8, op: OpCode, payload: &T) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    RequestHeader {
        version,
        op_code: op.into(),
    }
    .encode(&mut buffer)?;
    payload.encode(&mut buffer)?;
    Ok(buffer)
}

/// Split a response frame into its raw status byte and trailing payload.
///
/// The status byte is returned undecoded: the caller classifies unknown
/// values (they are fatal, see [`crate::client::LeaderRpc`]).
pub fn decode_response(data: Bytes) -> Result<(u8, Bytes)> {
    if data.len() < RESPONSE_HEADER_SIZE {
        return Err(Error::MalformedFrame {
            needed: RESPONSE_HEADER_SIZE,
            have: data.len(),
        });
    }
    let status = data[0];
    Ok((status, data.slice(RESPONSE_HEADER_SIZE..)))
}

/// Extract the leader hint from a `NOT_LEADER` payload, if one is present.
///
/// The payload is a NUL-terminated UTF-8 `host:port` string, or empty when
/// the server has no guess. Anything that is not valid UTF-8 is treated as
/// no hint; hints are advisory and must never block progress.
pub fn decode_leader_hint(payload: &Bytes) -> Option<String> {
    if payload.is_empty() {
        return None;
    }
    let end = payload
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(payload.len());
    let hint = std::str::from_utf8(&payload[..end]).ok()?;
    if hint.is_empty() {
        return None;
    }
    Some(hint.to_string())
}
