//! Cluster addresses: `host:port` strings and what they resolve to.

use std::fmt;
use std::net::SocketAddr;

use tokio::net;

use crate::error::{Error, Result};

/// A `host:port` pair plus the concrete endpoints it resolved to.
///
/// Resolution failures are not errors here: an address that resolves to
/// nothing, or that names port 0, is retained as a value but reported
/// unusable by [`is_usable`](ClusterAddress::is_usable). The routing engine
/// receives such addresses as leader hints and must be able to shrug them
/// off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAddress {
    host: String,
    port: u16,
    endpoints: Vec<SocketAddr>,
}

impl ClusterAddress {
    /// Parse `spec` as `host:port` and resolve the host.
    ///
    /// Returns `Err(InvalidAddress)` only for syntactically broken input
    /// (no colon, unparseable port). A host that does not resolve yields an
    /// address with no endpoints.
    pub async fn resolve(spec: &str) -> Result<Self> {
        let (host, port) = split_host_port(spec)?;

        let endpoints = match net::lookup_host((host.as_str(), port)).await {
            Ok(found) => found.collect(),
            Err(err) => {
                tracing::debug!(host = %host, error = %err, "address did not resolve");
                Vec::new()
            }
        };

        Ok(Self {
            host,
            port,
            endpoints,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The concrete endpoints to try, in resolver order.
    pub fn endpoints(&self) -> &[SocketAddr] {
        &self.endpoints
    }

    /// Whether the routing engine should bother connecting here. Port 0 and
    /// unresolvable hosts are legal values but never usable targets.
    pub fn is_usable(&self) -> bool {
        self.port != 0 && !self.endpoints.is_empty()
    }

    /// Whether `peer` is one of this address's endpoints.
    pub fn covers(&self, peer: SocketAddr) -> bool {
        self.endpoints.contains(&peer)
    }
}

impl fmt::Display for ClusterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Split `host:port`, accepting bracketed IPv6 hosts (`[::1]:80`).
fn split_host_port(spec: &str) -> Result<(String, u16)> {
    let bad = || Error::InvalidAddress(spec.to_string());

    let (host, port_str) = if let Some(rest) = spec.strip_prefix('[') {
        let (host, rest) = rest.split_once(']').ok_or_else(bad)?;
        let port_str = rest.strip_prefix(':').ok_or_else(bad)?;
        (host, port_str)
    } else {
        spec.rsplit_once(':').ok_or_else(bad)?
    };

    if host.is_empty() {
        return Err(bad());
    }
    let port = port_str.parse::<u16>().map_err(|_| bad())?;
    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_ip_literal() {
        let addr = ClusterAddress::resolve("127.0.0.1:5254").await.unwrap();
        assert_eq!(addr.host(), "127.0.0.1");
        assert_eq!(addr.port(), 5254);
        assert!(addr.is_usable());
        assert_eq!(addr.to_string(), "127.0.0.1:5254");
    }

    #[tokio::test]
    async fn test_zero_port_is_sucky() {
        let addr = ClusterAddress::resolve("127.0.0.1:0").await.unwrap();
        assert!(!addr.is_usable());
        // Still a perfectly good value.
        assert_eq!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_ipv6_bracketed() {
        let addr = ClusterAddress::resolve("[::1]:80").await.unwrap();
        assert_eq!(addr.host(), "::1");
        assert_eq!(addr.port(), 80);
        assert_eq!(addr.to_string(), "[::1]:80");
    }

    #[tokio::test]
    async fn test_syntax_errors() {
        assert!(matches!(
            ClusterAddress::resolve("no-port-here").await,
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            ClusterAddress::resolve("host:notaport").await,
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            ClusterAddress::resolve(":80").await,
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            ClusterAddress::resolve("host:99999").await,
            Err(Error::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_covers() {
        let addr = ClusterAddress::resolve("127.0.0.1:4000").await.unwrap();
        assert!(addr.covers("127.0.0.1:4000".parse().unwrap()));
        assert!(!addr.covers("127.0.0.1:4001".parse().unwrap()));
    }
}
