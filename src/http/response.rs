//! Status codes and the stateful response writer.

use std::fmt;
use std::io;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::{Headers, is_token_byte};

const HTTP_VERSION: &str = "HTTP/1.1";

/// HTTP status codes the server emits.
///
/// - `Ok` (200): Request successful
/// - `BadRequest` (400): Malformed request
/// - `InternalServerError` (500): Server error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use anvil::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Which part of the response the writer expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    StatusLine,
    Headers,
    Body,
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriterState::StatusLine => "status line",
            WriterState::Headers => "headers",
            WriterState::Body => "body",
        })
    }
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("can't write {attempted} now, expected to write {expected}")]
    OutOfOrder {
        expected: WriterState,
        attempted: WriterState,
    },
    #[error("invalid content type (should be a mime type): {0:?}")]
    InvalidContentType(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Writes a response onto a byte sink in wire order.
///
/// The writer walks the same path every response takes: status line,
/// header block, body. Each write method checks that it is that path's
/// next step; a call out of order fails without touching the sink, so a
/// half-written response never gets out.
pub struct ResponseWriter<W> {
    sink: W,
    state: WriterState,
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            state: WriterState::StatusLine,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    fn expect_state(&self, attempted: WriterState) -> Result<(), WriteError> {
        if self.state == attempted {
            Ok(())
        } else {
            Err(WriteError::OutOfOrder {
                expected: self.state,
                attempted,
            })
        }
    }

    /// Writes `HTTP/1.1 <code> <reason>` and advances to the header phase.
    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.expect_state(WriterState::StatusLine)?;
        let line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        );
        self.sink.write_all(line.as_bytes()).await?;
        self.state = WriterState::Headers;
        Ok(())
    }

    /// Writes every header as `name: value` followed by the blank line,
    /// then advances to the body phase. Names go out as stored, in the
    /// map's iteration order.
    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        self.expect_state(WriterState::Headers)?;
        self.sink.write_all(&serialize_field_block(headers)).await?;
        self.state = WriterState::Body;
        Ok(())
    }

    /// Writes raw body bytes. Returns how many bytes of `data` went out.
    pub async fn write_body(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.expect_state(WriterState::Body)?;
        self.sink.write_all(data).await?;
        Ok(data.len())
    }

    /// Writes one chunk in chunked transfer coding: uppercase hex length,
    /// CRLF, the bytes, CRLF. An empty `data` writes nothing, since a
    /// zero-length chunk would read as the terminator.
    ///
    /// Returns the total bytes written including framing.
    pub async fn write_chunked_body(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.expect_state(WriterState::Body)?;
        if data.is_empty() {
            return Ok(0);
        }
        let mut chunk = format!("{:X}\r\n", data.len()).into_bytes();
        chunk.extend_from_slice(data);
        chunk.extend_from_slice(b"\r\n");
        self.sink.write_all(&chunk).await?;
        Ok(chunk.len())
    }

    /// Writes the zero-length chunk that terminates a chunked body.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriteError> {
        self.expect_state(WriterState::Body)?;
        self.sink.write_all(b"0\r\n\r\n").await?;
        Ok(())
    }

    /// Writes a trailer block after the final chunk, in the same shape as
    /// the header block. Trailer names should have been advertised in a
    /// `Trailer` header.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriteError> {
        self.expect_state(WriterState::Body)?;
        self.sink
            .write_all(&serialize_field_block(trailers))
            .await?;
        Ok(())
    }

    /// Consumes the writer, handing back the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

fn serialize_field_block(headers: &Headers) -> Vec<u8> {
    let mut buf = Vec::new();
    for (name, value) in headers.iter() {
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
    buf.extend_from_slice(b"\r\n");
    buf
}

/// The headers every plain response carries: `Content-Length` for `len`,
/// `Connection: close`, and the given `Content-Type`.
pub fn default_headers(len: usize, content_type: &str) -> Result<Headers, WriteError> {
    if !is_mime_type(content_type) {
        return Err(WriteError::InvalidContentType(content_type.to_string()));
    }
    let mut headers = Headers::new();
    headers.replace("Content-Length", &len.to_string());
    headers.replace("Connection", "close");
    headers.replace("Content-Type", content_type);
    Ok(headers)
}

/// Syntactic check only: `type/subtype`, optionally followed by
/// `;`-separated parameters. Parameters are not inspected.
fn is_mime_type(s: &str) -> bool {
    let essence = s.split(';').next().unwrap_or(s).trim_matches(' ');
    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };
    !kind.is_empty()
        && !subtype.is_empty()
        && kind.bytes().all(is_token_byte)
        && subtype.bytes().all(is_token_byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_check() {
        assert!(is_mime_type("text/html"));
        assert!(is_mime_type("application/json"));
        assert!(is_mime_type("text/html; charset=utf-8"));
        assert!(!is_mime_type("text"));
        assert!(!is_mime_type("text/"));
        assert!(!is_mime_type("/html"));
        assert!(!is_mime_type("not a mime"));
    }
}
