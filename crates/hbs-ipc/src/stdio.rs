//! Stream-sentinel transport: line-oriented exchange with a child process.
//!
//! The render service is spawned as a child with stdin/stdout/stderr piped.
//! Requests go out as one newline-terminated JSON line; the response is read
//! line by line until a line carrying the `:EOF:` terminator token, and the
//! accumulated text is classified by a leading `SUCCESS:` tag.
//!
//! Known limitation: framing is in-band, so a rendered payload containing
//! the literal terminator or success token corrupts the exchange. The
//! protocol relies on the peer never emitting those tokens inside legitimate
//! content; prefer [`crate::SocketTransport`] where that cannot be
//! guaranteed.

use std::ffi::OsStr;
use std::process::Stdio;

use hbs_api::{RenderRequest, RenderResponse};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tracing::debug;

use crate::{IpcError, IpcResult, Transport};

/// In-band end-of-message marker appended to the final response line
pub const TERMINATOR: &str = ":EOF:";

/// Tag prefixed to the response body on success
pub const SUCCESS_PREFIX: &str = "SUCCESS:";

/// Sentinel-framed transport over a spawned child process's stdio.
///
/// The transport exclusively owns the process handles; [`close`] requests
/// termination best-effort without waiting for the child to exit.
///
/// [`close`]: Transport::close
pub struct StdioTransport {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    stderr: Option<ChildStderr>,
}

impl StdioTransport {
    /// Launch the render service with the given program and arguments, all
    /// three standard streams redirected to pipes.
    ///
    /// Fails with [`IpcError::Connection`] if the process cannot be spawned.
    pub fn spawn<S, I, A>(program: S, args: I) -> IpcResult<Self>
    where
        S: AsRef<OsStr>,
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        let mut child = Command::new(&program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(IpcError::Connection)?;

        let stdin = take_handle(child.stdin.take())?;
        let stdout = take_handle(child.stdout.take())?;
        let stderr = take_handle(child.stderr.take())?;

        debug!(program = %program.as_ref().to_string_lossy(), "spawned render service");

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            stderr: Some(stderr),
        })
    }
}

fn take_handle<T>(handle: Option<T>) -> IpcResult<T> {
    handle.ok_or_else(|| {
        IpcError::Connection(std::io::Error::other("child process stream not captured"))
    })
}

impl Transport for StdioTransport {
    async fn send(&mut self, request: &RenderRequest) -> IpcResult<()> {
        let mut line = serde_json::to_string(request)
            .map_err(|e| IpcError::Protocol(format!("failed to encode request: {e}")))?;
        line.push('\n');

        // Flush immediately so the line-buffered peer sees the request now.
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        Ok(())
    }

    async fn receive(&mut self) -> IpcResult<RenderResponse> {
        let body = read_until_terminator(&mut self.stdout).await?;

        debug!(bytes = body.len(), "received response body");

        Ok(classify_response(&body))
    }

    async fn close(&mut self) -> IpcResult<()> {
        // Best-effort shutdown; the child may still be exiting when this
        // returns.
        self.child.start_kill()?;
        Ok(())
    }

    async fn diagnostics(&mut self) -> IpcResult<Option<String>> {
        let Some(mut stderr) = self.stderr.take() else {
            return Ok(None);
        };

        // Single blocking drain to end-of-stream; call after close() or the
        // read can outlive the exchange.
        let mut text = String::new();
        stderr.read_to_string(&mut text).await?;

        Ok((!text.is_empty()).then_some(text))
    }
}

/// Accumulate response lines until one carries the terminator token.
///
/// The terminator is stripped from the final line; everything before it is
/// kept. End of stream without a terminator means the peer died mid-message.
async fn read_until_terminator<R>(reader: &mut R) -> IpcResult<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut body = String::new();
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(IpcError::ConnectionClosed);
        }

        if let Some(stripped) = line.trim_end().strip_suffix(TERMINATOR) {
            body.push_str(stripped);
            return Ok(body);
        }

        body.push_str(&line);
    }
}

/// Split the accumulated body into success or failure by its status tag.
fn classify_response(body: &str) -> RenderResponse {
    match body.strip_prefix(SUCCESS_PREFIX) {
        Some(html) => RenderResponse::success(html.trim()),
        None => RenderResponse::failure(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    async fn read_body(input: &str) -> IpcResult<String> {
        let (mut tx, rx) = tokio::io::duplex(1024);
        tx.write_all(input.as_bytes()).await.unwrap();
        drop(tx);

        let mut reader = BufReader::new(rx);
        read_until_terminator(&mut reader).await
    }

    #[tokio::test]
    async fn single_line_terminator_is_stripped() {
        let body = read_body("SUCCESS:<p>hi</p>:EOF:\n").await.unwrap();

        assert_eq!(body, "SUCCESS:<p>hi</p>");
    }

    #[tokio::test]
    async fn multi_line_body_accumulates_in_order() {
        let body = read_body("SUCCESS:<ul>\n<li>one</li>\n<li>two</li>\n</ul>:EOF:\n")
            .await
            .unwrap();

        assert_eq!(body, "SUCCESS:<ul>\n<li>one</li>\n<li>two</li>\n</ul>");
    }

    #[tokio::test]
    async fn content_before_terminator_on_final_line_is_kept() {
        let body = read_body("line one\ntail:EOF:\n").await.unwrap();

        assert_eq!(body, "line one\ntail");
    }

    #[tokio::test]
    async fn eof_without_terminator_is_an_error() {
        let result = read_body("SUCCESS:partial output\n").await;

        assert!(matches!(result, Err(IpcError::ConnectionClosed)));
    }

    #[test]
    fn success_prefix_yields_trimmed_remainder() {
        let response = classify_response("SUCCESS: <p>Hello, World!</p> ");

        assert_eq!(response, RenderResponse::success("<p>Hello, World!</p>"));
    }

    #[test]
    fn unprefixed_body_is_a_failure_with_full_text() {
        let response = classify_response("ENOENT: no such file or directory");

        assert_eq!(
            response,
            RenderResponse::failure("ENOENT: no such file or directory")
        );
    }

    #[tokio::test]
    async fn spawn_failure_is_a_connection_error() {
        let result = StdioTransport::spawn("/nonexistent/render-service", ["--main", "main.hbs"]);

        assert!(matches!(result, Err(IpcError::Connection(_))));
    }
}
