//! Typed payloads for the version-1 RPC set.
//!
//! Requests are encoded with [`crate::encode::ToByte`]; responses are also
//! decodable through [`crate::protocol::FromWire`] so the client can
//! interpret `OK` payloads (and a server implementation can build them).
//! One submodule per RPC family, mirroring the op-code table in
//! [`crate::protocol::OpCode`].

mod configuration;
mod logs;
mod session;
mod tree;
mod versions;

use bytes::Bytes;
use nom::IResult;
use nombytes::NomBytes;

use crate::error::{Error, Result};

pub use configuration::*;
pub use logs::*;
pub use session::*;
pub use tree::*;
pub use versions::*;

/// Run a nom parser over a response payload, mapping any parse failure to
/// [`Error::Parsing`] carrying the offending bytes.
pub(crate) fn decode_with<O, F>(data: Bytes, parser: F) -> Result<O>
where
    F: Fn(NomBytes) -> IResult<NomBytes, O>,
{
    let input = NomBytes::new(data.clone());
    let (_, value) = parser(input).map_err(|_| Error::Parsing(data))?;
    Ok(value)
}
