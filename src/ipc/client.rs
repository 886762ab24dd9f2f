//! Unix domain socket client for player control
//!
//! Connects lazily on the first command, reconnects after any transport
//! error. The daemon is request/reply only; it never holds the socket
//! open for pushes.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::debug;

use super::protocol::{PlayerReply, PlayerRequest};

/// Upper bound on a reply body; anything larger is a protocol violation
const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Client side of the player control socket
pub struct PlayerClient {
    socket_path: PathBuf,
    stream: Option<UnixStream>,
}

impl PlayerClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            stream: None,
        }
    }

    /// Send one request and wait for its reply. Any transport error
    /// drops the connection so the next request reconnects.
    pub async fn request(&mut self, request: &PlayerRequest) -> Result<PlayerReply> {
        match self.try_request(request).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                self.stream = None;
                Err(e)
            }
        }
    }

    async fn try_request(&mut self, request: &PlayerRequest) -> Result<PlayerReply> {
        if self.stream.is_none() {
            let stream = UnixStream::connect(&self.socket_path)
                .await
                .with_context(|| {
                    format!("failed to connect to player at {}", self.socket_path.display())
                })?;
            debug!(path = %self.socket_path.display(), "connected to player socket");
            self.stream = Some(stream);
        }
        let stream = self.stream.as_mut().context("player connection lost")?;

        send_message(stream, request).await?;
        read_reply(stream).await
    }
}

/// Send a length-prefixed JSON message
async fn send_message<T: serde::Serialize>(stream: &mut UnixStream, msg: &T) -> Result<()> {
    let msg_bytes = serde_json::to_vec(msg)?;
    let msg_len = (msg_bytes.len() as u32).to_le_bytes();

    stream.write_all(&msg_len).await?;
    stream.write_all(&msg_bytes).await?;

    Ok(())
}

/// Read one length-prefixed JSON reply
async fn read_reply(stream: &mut UnixStream) -> Result<PlayerReply> {
    let mut len_buf = [0u8; 4];
    stream
        .read_exact(&mut len_buf)
        .await
        .context("player closed the connection")?;

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        bail!("player reply too large: {len} bytes");
    }

    let mut msg_buf = vec![0u8; len];
    stream.read_exact(&mut msg_buf).await?;

    serde_json::from_slice(&msg_buf).context("failed to parse player reply")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::UnixListener;

    async fn reply_with(stream: &mut UnixStream, reply: &PlayerReply) {
        let bytes = serde_json::to_vec(reply).unwrap();
        stream
            .write_all(&(bytes.len() as u32).to_le_bytes())
            .await
            .unwrap();
        stream.write_all(&bytes).await.unwrap();
    }

    async fn read_request(stream: &mut UnixStream) -> PlayerRequest {
        let mut len_buf = [0u8; 4];
        stream.read_exact(&mut len_buf).await.unwrap();
        let mut buf = vec![0u8; u32::from_le_bytes(len_buf) as usize];
        stream.read_exact(&mut buf).await.unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    #[tokio::test]
    async fn test_request_reply_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("player.sock");
        let listener = UnixListener::bind(&socket_path).unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            assert!(matches!(request, PlayerRequest::Ping));
            reply_with(&mut stream, &PlayerReply::Pong).await;
        });

        let mut client = PlayerClient::new(socket_path);
        let reply = client.request(&PlayerRequest::Ping).await.unwrap();
        assert!(matches!(reply, PlayerReply::Pong));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_reconnects_after_server_drop() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("player.sock");
        let listener = UnixListener::bind(&socket_path).unwrap();

        let server = tokio::spawn(async move {
            // First connection: drop immediately without replying.
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);

            // Second connection: serve one status request.
            let (mut stream, _) = listener.accept().await.unwrap();
            let _ = read_request(&mut stream).await;
            reply_with(
                &mut stream,
                &PlayerReply::Status(super::super::protocol::PlayerStatus {
                    playing: false,
                    volume: 30,
                    position_ms: 0,
                }),
            )
            .await;
        });

        let mut client = PlayerClient::new(socket_path);
        assert!(client.request(&PlayerRequest::Status).await.is_err());

        let reply = client.request(&PlayerRequest::Status).await.unwrap();
        match reply {
            PlayerReply::Status(status) => assert_eq!(status.volume, 30),
            other => panic!("unexpected reply: {other:?}"),
        }

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_player_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = PlayerClient::new(dir.path().join("absent.sock"));
        assert!(client.request(&PlayerRequest::Play).await.is_err());
    }
}
