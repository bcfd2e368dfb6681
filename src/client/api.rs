//! Typed facade over [`LeaderRpc`]: one method per RPC in the version-1 set.

use bytes::Bytes;

use crate::client::leader::LeaderRpc;
use crate::error::Result;
use crate::messages::{
    DeleteLogRequest, DeleteLogResponse, ExactlyOnceRpcInfo, GetConfigurationRequest,
    GetConfigurationResponse, GetSupportedRpcVersionsRequest, GetSupportedRpcVersionsResponse,
    ListLogsRequest, ListLogsResponse, OpenLogRequest, OpenLogResponse, OpenSessionRequest,
    OpenSessionResponse, ReadOnlyTreeRequest, ReadOnlyTreeResponse, ReadWriteTreeRequest,
    ReadWriteTreeResponse, ServerDescriptor, SetConfigurationRequest, SetConfigurationResponse,
    TreeReadOp, TreeWriteOp,
};
use crate::protocol::OpCode;

/// A typed client for one loghouse cluster.
///
/// Thin sugar over [`LeaderRpc::call`]; every method inherits its routing
/// and failure semantics.
pub struct Client {
    rpc: LeaderRpc,
}

impl Client {
    pub fn new(rpc: LeaderRpc) -> Self {
        Client { rpc }
    }

    /// The first RPC a client should issue: which wire versions does the
    /// cluster speak?
    pub async fn get_supported_rpc_versions(&self) -> Result<GetSupportedRpcVersionsResponse> {
        self.rpc
            .call(
                OpCode::GetSupportedRpcVersions,
                &GetSupportedRpcVersionsRequest {},
            )
            .await
    }

    /// Open an exactly-once session and learn this client's identity.
    pub async fn open_session(&self) -> Result<OpenSessionResponse> {
        self.rpc
            .call(OpCode::OpenSession, &OpenSessionRequest {})
            .await
    }

    pub async fn get_configuration(&self) -> Result<GetConfigurationResponse> {
        self.rpc
            .call(OpCode::GetConfiguration, &GetConfigurationRequest {})
            .await
    }

    pub async fn set_configuration(
        &self,
        old_id: u64,
        new_servers: Vec<ServerDescriptor>,
    ) -> Result<SetConfigurationResponse> {
        self.rpc
            .call(
                OpCode::SetConfiguration,
                &SetConfigurationRequest {
                    old_id,
                    new_servers,
                },
            )
            .await
    }

    /// Read from the replicated tree. Carries no exactly-once metadata.
    pub async fn read_only_tree(
        &self,
        op: TreeReadOp,
        path: impl Into<String>,
    ) -> Result<ReadOnlyTreeResponse> {
        self.rpc
            .call(
                OpCode::ReadOnlyTree,
                &ReadOnlyTreeRequest {
                    op,
                    path: path.into(),
                },
            )
            .await
    }

    /// Mutate the replicated tree. The caller supplies the exactly-once
    /// metadata from its session bookkeeping.
    pub async fn read_write_tree(
        &self,
        exactly_once: ExactlyOnceRpcInfo,
        op: TreeWriteOp,
        path: impl Into<String>,
        contents: Option<Bytes>,
    ) -> Result<ReadWriteTreeResponse> {
        self.rpc
            .call(
                OpCode::ReadWriteTree,
                &ReadWriteTreeRequest {
                    exactly_once,
                    op,
                    path: path.into(),
                    contents,
                },
            )
            .await
    }

    pub async fn open_log(&self, log_name: impl Into<String>) -> Result<OpenLogResponse> {
        self.rpc
            .call(
                OpCode::OpenLog,
                &OpenLogRequest {
                    log_name: log_name.into(),
                },
            )
            .await
    }

    pub async fn delete_log(&self, log_name: impl Into<String>) -> Result<DeleteLogResponse> {
        self.rpc
            .call(
                OpCode::DeleteLog,
                &DeleteLogRequest {
                    log_name: log_name.into(),
                },
            )
            .await
    }

    pub async fn list_logs(&self) -> Result<ListLogsResponse> {
        self.rpc.call(OpCode::ListLogs, &ListLogsRequest {}).await
    }
}
