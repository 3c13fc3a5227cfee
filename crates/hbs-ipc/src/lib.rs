//! IPC client for the Handlebars render service
//!
//! Provides:
//! - Length-prefixed framing over a Unix domain socket (or Windows named
//!   pipe): [`SocketTransport`]
//! - Sentinel-framed exchange over a child process's stdin/stdout:
//!   [`StdioTransport`]
//! - A transport-agnostic facade: [`RenderClient`]
//!
//! Both bindings carry one strictly synchronous request/response pair at a
//! time per transport. Callers needing concurrency open independent
//! client/transport pairs.

mod client;
mod framing;
mod socket;
mod stdio;
mod transport;

pub use client::*;
pub use framing::*;
pub use socket::*;
pub use stdio::*;
pub use transport::*;

use std::time::Duration;
use thiserror::Error;

/// IPC errors
#[derive(Debug, Error)]
pub enum IpcError {
    /// The endpoint could not be reached, or the service process failed to
    /// spawn.
    #[error("connection failed: {0}")]
    Connection(#[source] std::io::Error),

    /// The peer closed the stream before a complete response arrived.
    #[error("connection closed by peer before a response was received")]
    ConnectionClosed,

    /// I/O failure mid-exchange.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The length prefix promised more bytes than the peer delivered.
    #[error("truncated frame: expected {expected} bytes, got {received}")]
    TruncatedFrame { expected: usize, received: usize },

    /// The payload could not be decoded into a recognizable response.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The request failed client-side validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The service explicitly reported a render failure; the message is
    /// remote text, verbatim.
    #[error("render failed: {0}")]
    Render(String),

    /// A configured deadline elapsed before the exchange completed.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

pub type IpcResult<T> = Result<T, IpcError>;
