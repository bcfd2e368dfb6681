//! Client-side access to a loghouse cluster.
//!
//! The pieces compose bottom-up:
//!
//! - [`ClusterAddress`] parses and resolves `host:port` strings, including
//!   the advisory hints non-leaders return.
//! - [`ClientSession`] is one framed request/reply connection to one server.
//! - [`LeaderRpc`] routes each call to the current cluster leader, chasing
//!   redirects and reconnecting until the cluster answers.
//! - [`Client`] is the typed facade: one method per RPC.

pub mod address;
pub mod api;
pub mod backoff;
pub mod leader;
pub mod session;

pub use address::ClusterAddress;
pub use api::Client;
pub use leader::LeaderRpc;
pub use session::ClientSession;
