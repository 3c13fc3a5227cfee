//! Socket-framed transport: persistent connection, length-prefixed messages.
//!
//! Connects to a well-known local endpoint (Unix domain socket, or a named
//! pipe on Windows) and exchanges [`crate::framing`] frames. Requests carry
//! an event name before the JSON payload; replies are the bare response
//! JSON.

use std::path::{Path, PathBuf};

use hbs_api::{RENDER_EVENT, RenderRequest, RenderResponse};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::framing::{read_frame, write_frame};
use crate::{IpcError, IpcResult, Transport};

/// Environment variable for overriding the endpoint path
pub const HBS_SOCKET_ENV: &str = "HBS_SOCKET";

#[cfg(unix)]
type EndpointStream = tokio::net::UnixStream;
#[cfg(windows)]
type EndpointStream = tokio::net::windows::named_pipe::NamedPipeClient;

/// Get the default endpoint path.
///
/// Order of precedence:
/// 1. `$HBS_SOCKET` environment variable (if set)
/// 2. `$XDG_RUNTIME_DIR/handlebars-ipc.sock` (Unix, if set)
/// 3. `/tmp/handlebars-ipc` (Unix fallback) or `\\.\pipe\handlebars-ipc`
///    (Windows)
pub fn default_socket_path() -> PathBuf {
    if let Ok(path) = std::env::var(HBS_SOCKET_ENV) {
        return PathBuf::from(path);
    }

    socket_path_without_env()
}

/// Get the endpoint path without checking the `HBS_SOCKET` env var.
pub fn socket_path_without_env() -> PathBuf {
    #[cfg(unix)]
    {
        if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
            return PathBuf::from(runtime_dir).join("handlebars-ipc.sock");
        }
        PathBuf::from("/tmp/handlebars-ipc")
    }

    #[cfg(windows)]
    {
        PathBuf::from(r"\\.\pipe\handlebars-ipc")
    }
}

/// Length-prefix framed transport over a local stream endpoint.
///
/// The transport exclusively owns its stream; it lives until [`close`]
/// releases the descriptor.
///
/// [`close`]: Transport::close
pub struct SocketTransport {
    stream: EndpointStream,
}

impl SocketTransport {
    /// Connect to the render service at the given endpoint path.
    ///
    /// Fails with [`IpcError::Connection`] if the endpoint does not exist or
    /// refuses the connection.
    pub async fn connect(path: impl AsRef<Path>) -> IpcResult<Self> {
        let path = path.as_ref();

        #[cfg(unix)]
        let stream = tokio::net::UnixStream::connect(path)
            .await
            .map_err(IpcError::Connection)?;

        #[cfg(windows)]
        let stream = tokio::net::windows::named_pipe::ClientOptions::new()
            .open(path)
            .map_err(IpcError::Connection)?;

        debug!(path = %path.display(), "connected to render service");

        Ok(Self { stream })
    }
}

impl Transport for SocketTransport {
    async fn send(&mut self, request: &RenderRequest) -> IpcResult<()> {
        let data = serde_json::to_string(request)
            .map_err(|e| IpcError::Protocol(format!("failed to encode request: {e}")))?;
        let message = format!("{RENDER_EVENT}:{data}");

        write_frame(&mut self.stream, &message).await
    }

    async fn receive(&mut self) -> IpcResult<RenderResponse> {
        let payload = read_frame(&mut self.stream)
            .await?
            .ok_or(IpcError::ConnectionClosed)?;

        debug!(bytes = payload.len(), "received response frame");

        serde_json::from_str(&payload)
            .map_err(|e| IpcError::Protocol(format!("unrecognizable response payload: {e}")))
    }

    async fn close(&mut self) -> IpcResult<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_to_missing_endpoint_is_a_connection_error() {
        let result = SocketTransport::connect("/nonexistent/render.sock").await;

        assert!(matches!(result, Err(IpcError::Connection(_))));
    }

    #[test]
    fn default_path_names_the_service() {
        // The path should always identify the handlebars endpoint regardless
        // of environment.
        let path = socket_path_without_env();
        assert!(path.to_string_lossy().contains("handlebars-ipc"));
    }
}
