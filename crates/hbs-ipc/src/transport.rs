//! Transport abstraction shared by both wire bindings

use hbs_api::{RenderRequest, RenderResponse};

use crate::IpcResult;

/// A duplex session that carries exactly one render request and one response
/// per send/receive pair.
///
/// The two implementations differ only in framing: [`crate::SocketTransport`]
/// length-prefixes each message, [`crate::StdioTransport`] relies on an
/// in-band terminator token. Neither supports overlapping in-flight
/// requests; `&mut self` on every operation makes a second call before the
/// first completes unrepresentable.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Encode and write one request.
    async fn send(&mut self, request: &RenderRequest) -> IpcResult<()>;

    /// Block until the response to the last request is framed and decoded.
    async fn receive(&mut self) -> IpcResult<RenderResponse>;

    /// Release the underlying OS handle.
    async fn close(&mut self) -> IpcResult<()>;

    /// Drain any out-of-band diagnostic text the peer produced.
    ///
    /// Advisory only: it never changes the outcome of a prior exchange.
    async fn diagnostics(&mut self) -> IpcResult<Option<String>> {
        Ok(None)
    }
}
