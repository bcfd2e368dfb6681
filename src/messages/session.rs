//! Exactly-once sessions.
//!
//! A session gives a client a 64-bit identity the cluster uses to
//! deduplicate retried mutations. The metadata travels with every mutating
//! tree RPC as [`ExactlyOnceRpcInfo`].

use bytes::{BufMut, Bytes};
use nom::{IResult, number::complete::be_u64};
use nombytes::NomBytes;

use crate::encode::ToByte;
use crate::error::Result;
use crate::protocol::FromWire;

/// Open a new exactly-once session. Empty payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenSessionRequest {}

impl ToByte for OpenSessionRequest {
    fn encode<W: BufMut>(&self, _buffer: &mut W) -> Result<()> {
        Ok(())
    }
}

/// The identity the cluster assigned to this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenSessionResponse {
    pub client_id: u64,
}

impl ToByte for OpenSessionResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.client_id.encode(buffer)
    }
}

fn parse_open_session_response(s: NomBytes) -> IResult<NomBytes, OpenSessionResponse> {
    let (s, client_id) = be_u64(s)?;
    Ok((s, OpenSessionResponse { client_id }))
}

impl FromWire for OpenSessionResponse {
    fn from_wire(data: Bytes) -> Result<Self> {
        super::decode_with(data, parse_open_session_response)
    }
}

/// Deduplication metadata attached to mutating RPCs.
///
/// `rpc_number` is strictly increasing per client. `first_outstanding_rpc`
/// tells the server it may discard cached responses for lower numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactlyOnceRpcInfo {
    pub client_id: u64,
    pub first_outstanding_rpc: u64,
    pub rpc_number: u64,
}

impl ToByte for ExactlyOnceRpcInfo {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.client_id.encode(buffer)?;
        self.first_outstanding_rpc.encode(buffer)?;
        self.rpc_number.encode(buffer)
    }
}

pub(crate) fn parse_exactly_once(s: NomBytes) -> IResult<NomBytes, ExactlyOnceRpcInfo> {
    let (s, client_id) = be_u64(s)?;
    let (s, first_outstanding_rpc) = be_u64(s)?;
    let (s, rpc_number) = be_u64(s)?;
    Ok((
        s,
        ExactlyOnceRpcInfo {
            client_id,
            first_outstanding_rpc,
            rpc_number,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nombytes::NomBytes;

    #[test]
    fn test_open_session_response_roundtrip() {
        let resp = OpenSessionResponse { client_id: 0x1122 };
        let mut buf = Vec::new();
        resp.encode(&mut buf).unwrap();
        assert_eq!(buf, vec![0, 0, 0, 0, 0, 0, 0x11, 0x22]);
        assert_eq!(OpenSessionResponse::from_wire(Bytes::from(buf)).unwrap(), resp);
    }

    #[test]
    fn test_exactly_once_layout() {
        let info = ExactlyOnceRpcInfo {
            client_id: 1,
            first_outstanding_rpc: 2,
            rpc_number: 3,
        };
        let mut buf = Vec::new();
        info.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), 24); // three u64s

        let (_, parsed) = parse_exactly_once(NomBytes::new(Bytes::from(buf))).unwrap();
        assert_eq!(parsed, info);
    }

    #[test]
    fn test_empty_payload_is_not_a_session_response() {
        assert!(OpenSessionResponse::from_wire(Bytes::new()).is_err());
    }
}
