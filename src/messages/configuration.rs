//! Cluster membership queries and changes.

use bytes::{BufMut, Bytes};
use nom::{
    IResult,
    number::complete::{be_u8, be_u64},
};
use nombytes::NomBytes;

use crate::encode::ToByte;
use crate::error::Result;
use crate::parser::{parse_array, parse_string_utf8};
use crate::protocol::FromWire;

/// One cluster member: its stable ID and the address clients reach it at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDescriptor {
    pub server_id: u64,
    pub address: String,
}

impl ToByte for ServerDescriptor {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.server_id.encode(buffer)?;
        self.address.encode(buffer)
    }
}

fn parse_server(s: NomBytes) -> IResult<NomBytes, ServerDescriptor> {
    let (s, server_id) = be_u64(s)?;
    let (s, address) = parse_string_utf8(s)?;
    Ok((s, ServerDescriptor { server_id, address }))
}

/// Fetch the current stable configuration. Empty payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetConfigurationRequest {}

impl ToByte for GetConfigurationRequest {
    fn encode<W: BufMut>(&self, _buffer: &mut W) -> Result<()> {
        Ok(())
    }
}

/// The stable configuration ID and its member list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetConfigurationResponse {
    pub id: u64,
    pub servers: Vec<ServerDescriptor>,
}

impl ToByte for GetConfigurationResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.id.encode(buffer)?;
        self.servers.encode(buffer)
    }
}

fn parse_get_configuration_response(s: NomBytes) -> IResult<NomBytes, GetConfigurationResponse> {
    let (s, id) = be_u64(s)?;
    let (s, servers) = parse_array(parse_server)(s)?;
    Ok((s, GetConfigurationResponse { id, servers }))
}

impl FromWire for GetConfigurationResponse {
    fn from_wire(data: Bytes) -> Result<Self> {
        super::decode_with(data, parse_get_configuration_response)
    }
}

/// Replace the membership, conditioned on the configuration the caller last
/// observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetConfigurationRequest {
    /// The stable configuration ID the caller based its change on.
    pub old_id: u64,
    pub new_servers: Vec<ServerDescriptor>,
}

impl ToByte for SetConfigurationRequest {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.old_id.encode(buffer)?;
        self.new_servers.encode(buffer)
    }
}

/// Outcome of a membership change, tagged by one wire byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetConfigurationResponse {
    /// The change committed.
    Ok,
    /// Another change committed since `old_id`; the caller must re-read.
    ConfigurationChanged,
    /// The proposed servers could not be contacted or synced.
    ConfigurationBad {
        bad_servers: Vec<ServerDescriptor>,
    },
}

const SET_CONFIGURATION_OK: u8 = 0;
const SET_CONFIGURATION_CHANGED: u8 = 1;
const SET_CONFIGURATION_BAD: u8 = 2;

impl ToByte for SetConfigurationResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        match self {
            SetConfigurationResponse::Ok => SET_CONFIGURATION_OK.encode(buffer),
            SetConfigurationResponse::ConfigurationChanged => {
                SET_CONFIGURATION_CHANGED.encode(buffer)
            }
            SetConfigurationResponse::ConfigurationBad { bad_servers } => {
                SET_CONFIGURATION_BAD.encode(buffer)?;
                bad_servers.encode(buffer)
            }
        }
    }
}

fn parse_set_configuration_response(s: NomBytes) -> IResult<NomBytes, SetConfigurationResponse> {
    let (s, tag) = be_u8(s)?;
    match tag {
        SET_CONFIGURATION_OK => Ok((s, SetConfigurationResponse::Ok)),
        SET_CONFIGURATION_CHANGED => Ok((s, SetConfigurationResponse::ConfigurationChanged)),
        SET_CONFIGURATION_BAD => {
            let (s, bad_servers) = parse_array(parse_server)(s)?;
            Ok((s, SetConfigurationResponse::ConfigurationBad { bad_servers }))
        }
        _ => Err(nom::Err::Failure(nom::error::Error::new(
            s,
            nom::error::ErrorKind::Verify,
        ))),
    }
}

impl FromWire for SetConfigurationResponse {
    fn from_wire(data: Bytes) -> Result<Self> {
        super::decode_with(data, parse_set_configuration_response)
    }
}
