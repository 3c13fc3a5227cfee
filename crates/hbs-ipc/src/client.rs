//! Client facade over either transport

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use hbs_api::{RenderRequest, RenderResponse};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{IpcError, IpcResult, SocketTransport, StdioTransport, Transport};

/// Client for the remote render service.
///
/// Owns its transport exclusively and drives the serialize -> send ->
/// receive -> decode sequence for each call. The protocol is strictly one
/// request then one response: `render` takes `&mut self`, so a second call
/// on the same client cannot begin before the first completes. Callers
/// needing concurrent renders open independent clients, one connection or
/// child process each.
pub struct RenderClient<T: Transport> {
    transport: T,
    timeout: Option<Duration>,
}

impl RenderClient<SocketTransport> {
    /// Connect to a render service listening on the given endpoint path.
    pub async fn connect(path: impl AsRef<Path>) -> IpcResult<Self> {
        Ok(Self::new(SocketTransport::connect(path).await?))
    }
}

impl RenderClient<StdioTransport> {
    /// Spawn the render service as a child process and attach to its stdio.
    pub fn spawn<S, I, A>(program: S, args: I) -> IpcResult<Self>
    where
        S: AsRef<OsStr>,
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        Ok(Self::new(StdioTransport::spawn(program, args)?))
    }
}

impl<T: Transport> RenderClient<T> {
    /// Wrap an already-open transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: None,
        }
    }

    /// Bound each render exchange by a deadline.
    ///
    /// Off by default: without one, a non-responding peer blocks the caller
    /// indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Render `template` against `context`, optionally overriding the
    /// service's default layout.
    ///
    /// Returns the rendered output, or:
    /// - [`IpcError::Render`] if the service reported a failure (remote
    ///   message verbatim)
    /// - [`IpcError::Protocol`] if the reply could not be decoded
    /// - [`IpcError::Connection`] / [`IpcError::Transport`] /
    ///   [`IpcError::TruncatedFrame`] / [`IpcError::ConnectionClosed`] on
    ///   transport failures
    ///
    /// Nothing is retried internally: a render call has no idempotent-retry
    /// semantics, so retrying could double-invoke template logic remotely.
    pub async fn render(
        &mut self,
        template: &str,
        context: Map<String, Value>,
        layout: Option<&str>,
    ) -> IpcResult<String> {
        if template.is_empty() {
            return Err(IpcError::InvalidRequest(
                "template identifier must not be empty".into(),
            ));
        }

        let mut request = RenderRequest::new(template, context);
        if let Some(layout) = layout {
            request = request.with_layout(layout);
        }

        debug!(template, layout = ?request.layout, "sending render request");

        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.exchange(&request))
                .await
                .map_err(|_| IpcError::Timeout(limit))??,
            None => self.exchange(&request).await?,
        };

        match response {
            RenderResponse::Success { html } => Ok(html),
            RenderResponse::Failure { message } => Err(IpcError::Render(message)),
        }
    }

    async fn exchange(&mut self, request: &RenderRequest) -> IpcResult<RenderResponse> {
        self.transport.send(request).await?;
        self.transport.receive().await
    }

    /// Drain any out-of-band diagnostic text from the transport (the child
    /// process's stderr on the stdio binding). Advisory; never changes a
    /// prior outcome.
    pub async fn diagnostics(&mut self) -> IpcResult<Option<String>> {
        self.transport.diagnostics().await
    }

    /// Release the transport. Safe to call even if no request was issued.
    pub async fn close(&mut self) -> IpcResult<()> {
        self.transport.close().await
    }
}
