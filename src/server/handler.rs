//! The application boundary: one async call per parsed request.

use std::future::Future;

use tokio::io::AsyncWrite;
use tokio::net::tcp::OwnedWriteHalf;

use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::{ResponseWriter, StatusCode, WriteError, default_headers};

/// The writer type handlers receive, bound to the connection's write half.
pub type ConnectionWriter = ResponseWriter<OwnedWriteHalf>;

/// A request handler.
///
/// The server calls `handle` once per successfully parsed request, passing
/// ownership of the connection's response writer. Whatever the handler
/// writes is the response; when the returned future finishes, the
/// connection is closed.
///
/// Any `async fn(ConnectionWriter, Request)` qualifies:
///
/// ```ignore
/// async fn hello(mut writer: ConnectionWriter, _request: Request) {
///     let _ = Reply::ok("hello").send(&mut writer).await;
/// }
///
/// let server = Server::serve(42069, hello).await?;
/// ```
pub trait Handler: Send + Sync + 'static {
    type Fut: Future<Output = ()> + Send;

    fn handle(&self, writer: ConnectionWriter, request: Request) -> Self::Fut;
}

impl<F, Fut> Handler for F
where
    F: Fn(ConnectionWriter, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    type Fut = Fut;

    fn handle(&self, writer: ConnectionWriter, request: Request) -> Self::Fut {
        self(writer, request)
    }
}

/// A whole response in one value, for the common non-streaming case.
///
/// Sends the status line, the default headers overlaid with any extras,
/// and the body through the writer in one call.
pub struct Reply {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

impl Reply {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Creates a 200 OK reply with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::Ok).body(body)
    }

    /// Creates a 400 Bad Request reply with the given body.
    pub fn bad_request(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::BadRequest).body(body)
    }

    /// Creates a 500 Internal Server Error reply with the given body.
    pub fn server_error(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::InternalServerError).body(body)
    }

    /// Adds or replaces a header. A `Content-Type` set here also drives
    /// the default header set; other responses default to `text/plain`.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.replace(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub async fn send<W>(self, writer: &mut ResponseWriter<W>) -> Result<(), WriteError>
    where
        W: AsyncWrite + Unpin,
    {
        let content_type = self.headers.get("Content-Type").unwrap_or("text/plain");
        let mut headers = default_headers(self.body.len(), content_type)?;
        for (name, value) in self.headers.iter() {
            headers.replace(name, value);
        }

        writer.write_status_line(self.status).await?;
        writer.write_headers(&headers).await?;
        writer.write_body(&self.body).await?;
        Ok(())
    }
}
