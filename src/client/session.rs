//! One framed connection to one server.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, MAX_FRAME_SIZE};
use crate::error::{Error, Result};

/// A transport session: one TCP connection carrying size-prefixed frames,
/// one outstanding request at a time.
///
/// Frames are `[len:u32 big-endian][payload]`. The session pairs each
/// request with the next reply frame; the routing engine serializes use, so
/// there is never more than one request in flight per session. If the peer
/// closes the connection before replying, `send` returns
/// [`Error::Disconnected`] and the session is no longer usable.
#[derive(Debug)]
pub struct ClientSession {
    stream: TcpStream,
    peer: SocketAddr,
}

impl ClientSession {
    /// Connect to `peer`. Applies a connect timeout so a black-holed
    /// endpoint fails over to the next candidate instead of hanging.
    pub async fn open(peer: SocketAddr) -> Result<Self> {
        let connect_timeout = Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS);
        let stream = timeout(connect_timeout, TcpStream::connect(peer))
            .await
            .map_err(|_| Error::Io(io::ErrorKind::TimedOut))??;
        stream.set_nodelay(true)?;

        tracing::debug!(peer = %peer, "session opened");
        Ok(Self { stream, peer })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Send one request frame and await the matching reply frame.
    pub async fn send(&mut self, request: &[u8]) -> Result<Bytes> {
        self.write_frame(request).await?;
        self.read_frame().await
    }

    /// Release the connection.
    pub fn close(self) {
        tracing::debug!(peer = %self.peer, "session closed");
        // Dropping the stream closes the socket.
    }

    async fn write_frame(&mut self, payload: &[u8]) -> Result<()> {
        let mut frame = Vec::with_capacity(4 + payload.len());
        frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        frame.extend_from_slice(payload);

        self.stream
            .write_all(&frame)
            .await
            .map_err(map_write_error)?;
        self.stream.flush().await.map_err(map_write_error)?;

        tracing::trace!(peer = %self.peer, bytes = frame.len(), "request frame written");
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<Bytes> {
        let mut size_buf = [0u8; 4];
        if let Err(e) = self.stream.read_exact(&mut size_buf).await {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                return Err(Error::Disconnected);
            }
            return Err(Error::Io(e.kind()));
        }

        let size = u32::from_be_bytes(size_buf) as usize;
        if size > MAX_FRAME_SIZE {
            return Err(Error::OversizedFrame(size));
        }

        let mut data = vec![0u8; size];
        if let Err(e) = self.stream.read_exact(&mut data).await {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                return Err(Error::Disconnected);
            }
            return Err(Error::Io(e.kind()));
        }

        tracing::trace!(peer = %self.peer, bytes = size, "reply frame read");
        Ok(Bytes::from(data))
    }
}

/// A write against a peer that already went away surfaces as a broken pipe
/// or reset; the engine treats those the same as an EOF before the reply.
fn map_write_error(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted => Error::Disconnected,
        kind => Error::Io(kind),
    }
}
