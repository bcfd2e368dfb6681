//! Log management RPCs: clients name logs, the cluster assigns their IDs.

use bytes::{BufMut, Bytes};
use nom::{IResult, number::complete::be_u64};
use nombytes::NomBytes;

use crate::encode::ToByte;
use crate::error::Result;
use crate::parser::{parse_array, parse_string_utf8};
use crate::protocol::FromWire;

/// Open (creating if necessary) the log with the given name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenLogRequest {
    pub log_name: String,
}

impl ToByte for OpenLogRequest {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.log_name.encode(buffer)
    }
}

/// The ID under which the named log is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenLogResponse {
    pub log_id: u64,
}

impl ToByte for OpenLogResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.log_id.encode(buffer)
    }
}

fn parse_open_log_response(s: NomBytes) -> IResult<NomBytes, OpenLogResponse> {
    let (s, log_id) = be_u64(s)?;
    Ok((s, OpenLogResponse { log_id }))
}

impl FromWire for OpenLogResponse {
    fn from_wire(data: Bytes) -> Result<Self> {
        super::decode_with(data, parse_open_log_response)
    }
}

/// Delete the log with the given name. Deleting an absent log succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteLogRequest {
    pub log_name: String,
}

impl ToByte for DeleteLogRequest {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.log_name.encode(buffer)
    }
}

/// Empty acknowledgement of a deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteLogResponse {}

impl ToByte for DeleteLogResponse {
    fn encode<W: BufMut>(&self, _buffer: &mut W) -> Result<()> {
        Ok(())
    }
}

impl FromWire for DeleteLogResponse {
    fn from_wire(_data: Bytes) -> Result<Self> {
        Ok(DeleteLogResponse {})
    }
}

/// Enumerate the names of all logs. Empty payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListLogsRequest {}

impl ToByte for ListLogsRequest {
    fn encode<W: BufMut>(&self, _buffer: &mut W) -> Result<()> {
        Ok(())
    }
}

/// The names of all logs, in no particular order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLogsResponse {
    pub log_names: Vec<String>,
}

impl ToByte for ListLogsResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.log_names.encode(buffer)
    }
}

fn parse_list_logs_response(s: NomBytes) -> IResult<NomBytes, ListLogsResponse> {
    let (s, log_names) = parse_array(parse_string_utf8)(s)?;
    Ok((s, ListLogsResponse { log_names }))
}

impl FromWire for ListLogsResponse {
    fn from_wire(data: Bytes) -> Result<Self> {
        super::decode_with(data, parse_list_logs_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_request_layout() {
        let req = OpenLogRequest {
            log_name: "logName".to_string(),
        };
        let mut buf = Vec::new();
        req.encode(&mut buf).unwrap();
        assert_eq!(buf[..2], [0x00, 0x07]);
        assert_eq!(&buf[2..], b"logName");
    }

    #[test]
    fn test_open_log_response_roundtrip() {
        let resp = OpenLogResponse { log_id: 3 };
        let mut buf = Vec::new();
        resp.encode(&mut buf).unwrap();
        assert_eq!(OpenLogResponse::from_wire(Bytes::from(buf)).unwrap(), resp);
    }

    #[test]
    fn test_open_log_response_rejects_empty_payload() {
        assert!(OpenLogResponse::from_wire(Bytes::new()).is_err());
    }

    #[test]
    fn test_list_logs_roundtrip() {
        let resp = ListLogsResponse {
            log_names: vec!["alpha".to_string(), "beta".to_string()],
        };
        let mut buf = Vec::new();
        resp.encode(&mut buf).unwrap();
        assert_eq!(ListLogsResponse::from_wire(Bytes::from(buf)).unwrap(), resp);
    }

    #[test]
    fn test_delete_log_response_is_empty() {
        let mut buf = Vec::new();
        DeleteLogResponse {}.encode(&mut buf).unwrap();
        assert!(buf.is_empty());
        assert!(DeleteLogResponse::from_wire(Bytes::new()).is_ok());
    }
}
