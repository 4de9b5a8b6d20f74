//! HTTP request representation and the incremental parser.

use std::str;

use thiserror::Error;
use tokio::io::AsyncRead;

use crate::http::buffer::RecvBuffer;
use crate::http::headers::{FieldLineError, Headers, find_crlf};

/// HTTP request methods.
///
/// The method token must arrive in uppercase; anything outside this set is
/// rejected during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// CONNECT - Establish a tunnel
    CONNECT,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// TRACE - Echo the received request
    TRACE,
}

impl Method {
    /// Parses an HTTP method from its token.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation of the method (case-sensitive, uppercase)
    ///
    /// # Returns
    ///
    /// `Some(Method)` if the token matches a known method, `None` otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// # use anvil::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("BREW"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "HEAD" => Some(Method::HEAD),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "CONNECT" => Some(Method::CONNECT),
            "OPTIONS" => Some(Method::OPTIONS),
            "TRACE" => Some(Method::TRACE),
            _ => None,
        }
    }
}

/// The first line of a request: method, target, and HTTP version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    /// The request target (e.g., "/index.html")
    pub request_target: String,
    /// The version digits after "HTTP/" (always "1.1" once parsed)
    pub http_version: String,
}

/// Where the parser is within a request. States only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

/// A parsed (or partially parsed) HTTP request.
///
/// Built incrementally by [`Request::parse`] as bytes arrive, or in one
/// call with [`Request::from_reader`]. Fields other than `headers` are
/// read through accessors so nothing outside the parser can move the
/// state machine.
#[derive(Debug, Clone)]
pub struct Request {
    request_line: Option<RequestLine>,
    /// Request headers under the duplicate-merge rule
    pub headers: Headers,
    body: Vec<u8>,
    state: ParserState,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("request line must have exactly three space-separated parts")]
    MalformedRequestLine,
    #[error("method {0:?} must contain only uppercase letters")]
    MethodNotUppercase(String),
    #[error("method {0:?} is not a supported http method")]
    UnsupportedMethod(String),
    #[error("unsupported http version {0:?}, only HTTP/1.1 is served")]
    UnsupportedVersion(String),
    #[error("request line is not valid utf-8")]
    InvalidEncoding,
    #[error("request line never completed before end of stream")]
    UnfinishedRequestLine,
    #[error("header section never terminated before end of stream")]
    UnfinishedHeaders,
    #[error("content-length {0:?} is not a valid length")]
    InvalidContentLength(String),
    #[error("body ended at {actual} bytes, shorter than the declared content-length {expected}")]
    BodyTooShort { expected: usize, actual: usize },
    #[error("body reached {actual} bytes, longer than the declared content-length {expected}")]
    BodyTooLong { expected: usize, actual: usize },
    #[error("parse called on an already complete request")]
    ParseAfterDone,
    #[error(transparent)]
    FieldLine(#[from] FieldLineError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Request {
    pub fn new() -> Self {
        Self {
            request_line: None,
            headers: Headers::new(),
            body: Vec::new(),
            state: ParserState::Initialized,
        }
    }

    /// Reads a whole request from `reader`, driving the parser until it
    /// completes. The body phase runs until end of stream, where the
    /// accumulated length is checked against Content-Length.
    pub async fn from_reader<R>(reader: &mut R) -> Result<Self, ParseError>
    where
        R: AsyncRead + Unpin,
    {
        let mut request = Request::new();
        let mut buffer = RecvBuffer::new();

        while request.state != ParserState::Done {
            let n = buffer.fill_from(reader).await?;
            if n == 0 {
                request.finish_at_eof()?;
                continue;
            }
            let consumed = request.parse(buffer.bytes())?;
            buffer.consume(consumed);
        }

        Ok(request)
    }

    /// Feeds the parser one increment of data.
    ///
    /// Consumes as much of `data` as the current state allows, possibly
    /// crossing several states in one call, and returns the number of
    /// bytes used. Bytes past the returned count must be offered again
    /// with the next increment.
    ///
    /// # Errors
    ///
    /// Any grammar violation is fatal to the request. Calling this after
    /// the request is complete is an error as well.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.state == ParserState::Done {
            return Err(ParseError::ParseAfterDone);
        }
        let mut total = 0;
        while self.state != ParserState::Done {
            let consumed = self.parse_single(&data[total..])?;
            if consumed == 0 {
                break;
            }
            total += consumed;
        }
        Ok(total)
    }

    /// One state-machine step over the front of `data`.
    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParserState::Initialized => match parse_request_line(data)? {
                Some((line, consumed)) => {
                    self.request_line = Some(line);
                    self.state = ParserState::ParsingHeaders;
                    Ok(consumed)
                }
                None => Ok(0),
            },
            ParserState::ParsingHeaders => {
                let (consumed, done) = self.headers.parse_field_line(data)?;
                if done {
                    // without a declared length there is no body to wait for
                    self.state = if self.headers.get("Content-Length").is_some() {
                        ParserState::ParsingBody
                    } else {
                        ParserState::Done
                    };
                }
                Ok(consumed)
            }
            ParserState::ParsingBody => {
                self.body.extend_from_slice(data);
                Ok(data.len())
            }
            ParserState::Done => Err(ParseError::ParseAfterDone),
        }
    }

    /// Settles the request at end of stream.
    ///
    /// Mid-line or mid-header streams are fatal. In the body phase this is
    /// the moment the accumulated length is compared against the declared
    /// Content-Length; matching completes the request.
    pub fn finish_at_eof(&mut self) -> Result<(), ParseError> {
        match self.state {
            ParserState::Initialized => Err(ParseError::UnfinishedRequestLine),
            ParserState::ParsingHeaders => Err(ParseError::UnfinishedHeaders),
            ParserState::ParsingBody => {
                let raw = self.headers.get("Content-Length").unwrap_or("");
                let expected: usize = raw
                    .parse()
                    .map_err(|_| ParseError::InvalidContentLength(raw.to_string()))?;
                if self.body.len() < expected {
                    return Err(ParseError::BodyTooShort {
                        expected,
                        actual: self.body.len(),
                    });
                }
                if self.body.len() > expected {
                    return Err(ParseError::BodyTooLong {
                        expected,
                        actual: self.body.len(),
                    });
                }
                self.state = ParserState::Done;
                Ok(())
            }
            ParserState::Done => Ok(()),
        }
    }

    pub fn request_line(&self) -> Option<&RequestLine> {
        self.request_line.as_ref()
    }

    /// Retrieves a header value by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn state(&self) -> ParserState {
        self.state
    }
}

/// Parses the request line if a full CRLF-terminated line is buffered.
/// Returns `None` when more data is needed.
fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(crlf) = find_crlf(data) else {
        return Ok(None);
    };
    let line = str::from_utf8(&data[..crlf]).map_err(|_| ParseError::InvalidEncoding)?;

    let parts: Vec<&str> = line.split(' ').collect();
    if parts.len() != 3 {
        return Err(ParseError::MalformedRequestLine);
    }
    let (method_token, target, version_token) = (parts[0], parts[1], parts[2]);

    if !method_token.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ParseError::MethodNotUppercase(method_token.to_string()));
    }
    let method = Method::from_str(method_token)
        .ok_or_else(|| ParseError::UnsupportedMethod(method_token.to_string()))?;

    let version = version_token
        .strip_prefix("HTTP/")
        .ok_or_else(|| ParseError::UnsupportedVersion(version_token.to_string()))?;
    if version != "1.1" {
        return Err(ParseError::UnsupportedVersion(version_token.to_string()));
    }

    let request_line = RequestLine {
        method,
        request_target: target.to_string(),
        http_version: version.to_string(),
    };
    Ok(Some((request_line, crlf + 2)))
}
