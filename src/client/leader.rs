//! Routing RPCs to the cluster leader.
//!
//! Callers hand [`LeaderRpc::call`] an op code and a request message and get
//! back the leader's response, however long that takes. Underneath, the
//! engine keeps one guess at who leads the cluster, follows the redirect
//! hints non-leaders return, and falls back to round-robining the seed list
//! whenever the guess goes stale. Redirects and connection loss are routing
//! business and never surface; protocol violations are not survivable and
//! abort the process.

use std::net::SocketAddr;

use backon::Retryable;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::client::address::ClusterAddress;
use crate::client::backoff;
use crate::client::session::ClientSession;
use crate::encode::ToByte;
use crate::error::{Error, Result, Status};
use crate::protocol::{self, FromWire, OpCode, RPC_VERSION};

/// Client-side engine that calls whichever server currently leads the
/// cluster.
///
/// Cheap to share: all state sits behind one lock, and the lock is never
/// held across network I/O, so any number of tasks may `call` concurrently.
/// Each in-flight call uses its own connection; one idle connection to the
/// probable leader is kept pooled between calls.
pub struct LeaderRpc {
    seeds: Vec<ClusterAddress>,
    routing: Mutex<Routing>,
}

/// Where the engine currently believes the leader is.
///
/// `leader` moves through three kinds of value: a seed being probed, a hint
/// a non-leader sent us, and (most of the time) the address that last
/// answered `OK`. `None` means the next call starts from the seed list.
#[derive(Default)]
struct Routing {
    leader: Option<ClusterAddress>,
    pooled: Option<ClientSession>,
    next_seed: usize,
}

impl LeaderRpc {
    /// Create an engine bootstrapped from a single seed address.
    pub fn new(seed: ClusterAddress) -> Self {
        Self::with_seeds(vec![seed])
    }

    /// Create an engine bootstrapped from a seed list.
    ///
    /// # Panics
    /// Panics if `seeds` is empty; there is nothing to bootstrap from.
    pub fn with_seeds(seeds: Vec<ClusterAddress>) -> Self {
        assert!(!seeds.is_empty(), "seed list must name at least one server");
        LeaderRpc {
            seeds,
            routing: Mutex::new(Routing::default()),
        }
    }

    /// Send `request` to the cluster leader and decode its response.
    ///
    /// Blocks (asynchronously) until some server answers as leader:
    /// `NOT_LEADER` redirects, refused connections, and servers that hang up
    /// mid-request are all retried with backoff, indefinitely. Callers
    /// wanting bounded latency wrap this in a timeout.
    ///
    /// Returns `Err(Error::SessionExpired)` when the cluster has discarded
    /// the session a mutating request rode on; the session layer above
    /// decides what to do. A response this client cannot understand (an
    /// unknown status byte, an unsupported version, a rejected request, an
    /// `OK` body that does not parse) is a deployment or programming error
    /// and aborts the process with a diagnostic.
    pub async fn call<Q, R>(&self, op: OpCode, request: &Q) -> Result<R>
    where
        Q: ToByte,
        R: FromWire,
    {
        let frame = protocol::encode_request(RPC_VERSION, op, request)?;
        let mut failures: u32 = 0;

        loop {
            let mut session = self.checkout_session().await;
            let peer = session.peer();

            let reply = match session.send(&frame).await {
                Ok(reply) => reply,
                Err(err) => {
                    // Covers "server not listening": it accepted the
                    // connection but hung up without replying.
                    tracing::debug!(
                        op = op.as_str(),
                        peer = %peer,
                        error = %err,
                        "connection lost before reply; retrying"
                    );
                    sleep(backoff::routing_delay(failures)).await;
                    failures = failures.saturating_add(1);
                    continue;
                }
            };

            let (status_byte, body) = protocol::decode_response(reply)?;
            match Status::from_wire(status_byte) {
                Some(Status::Ok) => {
                    let response = match R::from_wire(body) {
                        Ok(response) => response,
                        Err(_) => fatal(op, "Could not parse server response".to_string()),
                    };
                    self.check_in(session).await;
                    return Ok(response);
                }
                Some(Status::NotLeader) => {
                    // Free the non-leader's connection before chasing the
                    // redirect.
                    drop(session);
                    let hint = match protocol::decode_leader_hint(&body) {
                        Some(spec) => ClusterAddress::resolve(&spec).await.ok(),
                        None => None,
                    };
                    self.reroute(peer, hint).await;
                    sleep(backoff::routing_delay(failures)).await;
                    failures = failures.saturating_add(1);
                }
                Some(Status::SessionExpired) => {
                    tracing::warn!(op = op.as_str(), peer = %peer, "session expired");
                    return Err(Error::SessionExpired);
                }
                Some(Status::InvalidVersion) => fatal(
                    op,
                    format!(
                        "server at {peer} does not support wire version {RPC_VERSION}: \
                         this client is too old to talk to the cluster"
                    ),
                ),
                Some(Status::InvalidRequest) => fatal(
                    op,
                    format!(
                        "{op} request to the cluster was rejected as invalid; \
                         the two sides disagree about the message format"
                    ),
                ),
                None => fatal(
                    op,
                    format!("Unknown status {status_byte} in response from {peer}"),
                ),
            }
        }
    }

    /// Get a session to the probable leader, connecting if none is pooled.
    /// Loops until some candidate accepts; the seed cursor advances past
    /// candidates that refuse.
    async fn checkout_session(&self) -> ClientSession {
        if let Some(session) = self.routing.lock().await.pooled.take() {
            return session;
        }

        let mut attempt: u32 = 0;
        loop {
            let target = self.pick_target().await;
            match self.connect(&target).await {
                Ok(session) => return session,
                Err(err) => {
                    tracing::warn!(address = %target, error = %err, "could not reach server");
                    self.evict(&target).await;
                    sleep(backoff::routing_delay(attempt)).await;
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }

    /// Choose who to connect to: the cached probable leader if usable,
    /// otherwise the next seed (which becomes the new probable leader).
    async fn pick_target(&self) -> ClusterAddress {
        let mut routing = self.routing.lock().await;
        if let Some(leader) = &routing.leader {
            if leader.is_usable() {
                return leader.clone();
            }
        }
        let seed = self.seeds[routing.next_seed % self.seeds.len()].clone();
        routing.next_seed = routing.next_seed.wrapping_add(1);
        routing.leader = Some(seed.clone());
        tracing::debug!(address = %seed, "probing seed for the leader");
        seed
    }

    /// Connect to one of the address's endpoints, retrying transient
    /// failures per endpoint before moving to the next.
    async fn connect(&self, address: &ClusterAddress) -> Result<ClientSession> {
        let mut last_err = Error::InvalidAddress(address.to_string());
        for &endpoint in address.endpoints() {
            let attempt = (|| ClientSession::open(endpoint))
                .retry(backoff::connect_policy())
                .when(Error::is_transient)
                .await;
            match attempt {
                Ok(session) => return Ok(session),
                Err(err) => last_err = err,
            }
        }
        Err(last_err)
    }

    /// Forget the probable leader if it still points at `address`.
    async fn evict(&self, address: &ClusterAddress) {
        let mut routing = self.routing.lock().await;
        if routing.leader.as_ref() == Some(address) {
            routing.leader = None;
        }
    }

    /// Apply a `NOT_LEADER` verdict from `from`: jump to a usable hint, or
    /// evict the cache so the next attempt probes the seed list.
    async fn reroute(&self, from: SocketAddr, hint: Option<ClusterAddress>) {
        let mut routing = self.routing.lock().await;
        match hint {
            Some(hint) if hint.is_usable() => {
                tracing::info!(leader = %hint, "redirected to probable leader");
                routing.leader = Some(hint);
            }
            Some(hint) => {
                tracing::debug!(peer = %from, hint = %hint, "ignoring unusable leader hint");
                routing.leader = None;
            }
            None => {
                tracing::debug!(peer = %from, "server is not leader and offered no hint");
                routing.leader = None;
            }
        }
    }

    /// Return a session to the pool for the next call, keeping at most one.
    async fn check_in(&self, session: ClientSession) {
        let mut routing = self.routing.lock().await;
        if routing.pooled.is_none() {
            routing.pooled = Some(session);
        } else {
            session.close();
        }
    }
}

/// Abort the process over an unrecoverable protocol or programming error.
/// The diagnostic text is part of the engine's observable contract.
fn fatal(op: OpCode, message: String) -> ! {
    tracing::error!(op = op.as_str(), "{message}");
    panic!("{} RPC failed: {message}", op.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[should_panic(expected = "seed list must name at least one server")]
    async fn test_with_seeds_rejects_empty_list() {
        let _ = LeaderRpc::with_seeds(Vec::new());
    }

    #[tokio::test]
    async fn test_pick_target_round_robins_seeds() {
        let seeds = vec![
            ClusterAddress::resolve("127.0.0.1:11001").await.unwrap(),
            ClusterAddress::resolve("127.0.0.1:11002").await.unwrap(),
        ];
        let rpc = LeaderRpc::with_seeds(seeds.clone());

        // No probable leader yet: first pick installs seed 0.
        let first = rpc.pick_target().await;
        assert_eq!(first, seeds[0]);
        // The pick became the probable leader, so it is sticky.
        assert_eq!(rpc.pick_target().await, seeds[0]);

        // After eviction the cursor moves on.
        rpc.evict(&first).await;
        assert_eq!(rpc.pick_target().await, seeds[1]);
    }

    #[tokio::test]
    async fn test_reroute_ignores_sucky_hint() {
        let seed = ClusterAddress::resolve("127.0.0.1:11001").await.unwrap();
        let rpc = LeaderRpc::new(seed);
        let peer: SocketAddr = "127.0.0.1:11001".parse().unwrap();

        let sucky = ClusterAddress::resolve("127.0.0.1:0").await.unwrap();
        rpc.reroute(peer, Some(sucky)).await;
        assert!(rpc.routing.lock().await.leader.is_none());

        let usable = ClusterAddress::resolve("127.0.0.1:11002").await.unwrap();
        rpc.reroute(peer, Some(usable.clone())).await;
        assert_eq!(rpc.routing.lock().await.leader.as_ref(), Some(&usable));
    }
}
