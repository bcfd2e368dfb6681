//! # Loghouse
//! Client-side routing engine and log storage substrate for a replicated,
//! strongly-consistent coordination service.
//!
//! A loghouse cluster keeps a hierarchical key-value tree replicated across a
//! set of servers via a consensus-ordered log. This crate provides the two
//! pieces a client and an embedding server need that do not depend on the
//! consensus algorithm itself:
//!
//! - **Leader RPC**: [`client::LeaderRpc`] routes a request to whichever
//!   server currently leads the cluster, transparently following leadership
//!   changes, redirect hints, and dropped connections. Callers see a single
//!   "call the leader" operation that blocks until the cluster answers.
//! - **Log storage**: [`storage::StorageModule`] and [`storage::Log`] define
//!   the append-only, per-log storage contract a consensus layer sits on top
//!   of, with an in-memory implementation in [`storage::memory`].
//!
//! # Goals
//! - Easy to understand code
//! - Leverage best in class libraries such as [Tokio](https://tokio.rs/), [Nom](https://docs.rs/nom/latest/nom/)
//! - Be a building block for replicated coordination services
//!
//! ## Calling the cluster
//!
//! ```rust,no_run
//! use loghouse::client::{Client, ClusterAddress, LeaderRpc};
//!
//! #[tokio::main]
//! async fn main() -> loghouse::Result<()> {
//!     let seed = ClusterAddress::resolve("127.0.0.1:5254").await?;
//!     let client = Client::new(LeaderRpc::new(seed));
//!
//!     let session = client.open_session().await?;
//!     println!("client id: {}", session.client_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Storing log entries
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use loghouse::storage::{entry::LogEntry, memory::MemoryStorage, StorageModule};
//! use loghouse::types::LogId;
//!
//! #[tokio::main]
//! async fn main() {
//!     let storage = MemoryStorage::new();
//!     let log = storage.create_log(LogId(1)).await;
//!     let entry = LogEntry::new(0, 0, 0, Bytes::from_static(b"hello"));
//!     log.append(entry, Box::new(|appended: LogEntry| {
//!         println!("appended {appended}");
//!     }))
//!     .await;
//! }
//! ```

#![forbid(unsafe_code)]

pub mod client;
pub mod constants;
pub mod encode;
pub mod error;
pub mod messages;
pub mod parser;
pub mod protocol;
pub mod storage;
pub mod telemetry;
pub mod types;

pub use error::{Error, Result, Status};

pub mod prelude {
    //! Main exports for talking to a loghouse cluster.
    pub use crate::client::{Client, ClusterAddress, LeaderRpc};
    pub use crate::error::{Error, Result, Status};
    pub use crate::protocol::{FromWire, OpCode, RPC_VERSION};
    pub use crate::storage::{Completion, Log, StorageModule};
    pub use crate::types::{EntryId, LogId};

    pub use bytes;
}
