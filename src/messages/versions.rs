//! Version negotiation, the first RPC any client issues.

use bytes::{BufMut, Bytes};
use nom::{IResult, number::complete::be_u16};
use nombytes::NomBytes;

use crate::encode::ToByte;
use crate::error::Result;
use crate::protocol::FromWire;

/// Ask the cluster which wire versions it supports. Empty payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetSupportedRpcVersionsRequest {}

impl ToByte for GetSupportedRpcVersionsRequest {
    fn encode<W: BufMut>(&self, _buffer: &mut W) -> Result<()> {
        Ok(())
    }
}

/// The inclusive range of wire versions the cluster speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetSupportedRpcVersionsResponse {
    pub min_version: u16,
    pub max_version: u16,
}

impl ToByte for GetSupportedRpcVersionsResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.min_version.encode(buffer)?;
        self.max_version.encode(buffer)
    }
}

fn parse_response(s: NomBytes) -> IResult<NomBytes, GetSupportedRpcVersionsResponse> {
    let (s, min_version) = be_u16(s)?;
    let (s, max_version) = be_u16(s)?;
    Ok((
        s,
        GetSupportedRpcVersionsResponse {
            min_version,
            max_version,
        },
    ))
}

impl FromWire for GetSupportedRpcVersionsResponse {
    fn from_wire(data: Bytes) -> Result<Self> {
        super::decode_with(data, parse_response)
    }
}
