//! Line-delimited JSON-RPC sessions.
//!
//! One JSON message per line in each direction. A session reads a line,
//! dispatches it, writes at most one reply line and repeats until EOF.
//! Blank lines are skipped.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::TransportResult;
use crate::core::dispatcher::{DispatchError, Dispatcher, SessionState};
use crate::core::protocol::{JsonRpcRequest, JsonRpcResponse, parse_message};

/// One decoded inbound line.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A well-formed request or notification.
    Request(JsonRpcRequest),
    /// A line that could not be decoded, with the error reply to send.
    Invalid(JsonRpcResponse),
}

/// A message channel for the dispatcher.
#[async_trait]
pub trait Transport: Send {
    /// Next inbound message, or `None` once the peer is done.
    async fn read_request(&mut self) -> TransportResult<Option<Inbound>>;

    /// Send one reply.
    async fn write_response(&mut self, response: &JsonRpcResponse) -> TransportResult<()>;
}

/// Longest accepted line, newline excluded.
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// [`Transport`] over any buffered reader and writer pair.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
    buf: Vec<u8>,
    max_line: usize,
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            buf: Vec::new(),
            max_line: DEFAULT_MAX_LINE_BYTES,
        }
    }

    /// Set the longest accepted line.
    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.max_line = max_line;
        self
    }

    /// Give back the writer, e.g. to inspect what was written.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Drop input up to and including the next newline.
    async fn skip_line(&mut self) -> TransportResult<()> {
        loop {
            let (used, done) = {
                let chunk = self.reader.fill_buf().await?;
                match chunk.iter().position(|b| *b == b'\n') {
                    Some(pos) => (pos + 1, true),
                    None => (chunk.len(), chunk.is_empty()),
                }
            };
            self.reader.consume(used);
            if done {
                return Ok(());
            }
        }
    }
}

#[async_trait]
impl<R, W> Transport for LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn read_request(&mut self) -> TransportResult<Option<Inbound>> {
        loop {
            self.buf.clear();
            let limit = self.max_line as u64 + 1;
            if (&mut self.reader)
                .take(limit)
                .read_until(b'\n', &mut self.buf)
                .await?
                == 0
            {
                return Ok(None);
            }

            if self.buf.len() > self.max_line && self.buf.last() != Some(&b'\n') {
                warn!("Discarding line longer than {} bytes", self.max_line);
                self.skip_line().await?;
                let error = DispatchError::InvalidRequest(format!(
                    "line exceeds {} bytes",
                    self.max_line
                ));
                return Ok(Some(Inbound::Invalid(JsonRpcResponse::error(
                    None,
                    (&error).into(),
                ))));
            }

            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    let error = DispatchError::ParseError(format!("invalid UTF-8: {e}"));
                    return Ok(Some(Inbound::Invalid(JsonRpcResponse::error(
                        None,
                        (&error).into(),
                    ))));
                }
            };
            if line.is_empty() {
                continue;
            }

            debug!("Received: {}", line);
            return Ok(Some(match parse_message(line) {
                Ok(request) => Inbound::Request(request),
                Err(response) => Inbound::Invalid(response),
            }));
        }
    }

    async fn write_response(&mut self, response: &JsonRpcResponse) -> TransportResult<()> {
        let mut line = serde_json::to_vec(response)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Serve one session until the transport reports EOF.
///
/// The session starts uninitialized; the state returned by each dispatch is
/// carried into the next one.
pub async fn serve_session<T: Transport>(
    dispatcher: &Dispatcher,
    transport: &mut T,
) -> TransportResult<()> {
    let mut state = SessionState::Uninitialized;

    while let Some(inbound) = transport.read_request().await? {
        let reply = match inbound {
            Inbound::Request(request) => {
                let (next, reply) = dispatcher.handle(request, state).await;
                state = next;
                reply
            }
            Inbound::Invalid(response) => Some(response),
        };

        if let Some(response) = reply {
            transport.write_response(&response).await?;
        }
    }

    info!("Session ended (EOF)");
    Ok(())
}
