//! HTTP/1.1 protocol implementation.
//!
//! This module implements HTTP/1.1 message framing directly over byte
//! streams: an incremental request parser that accepts input in arbitrary
//! fragments, and a response writer that enforces wire order.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`buffer`**: Growable receive buffer that feeds the parser
//! - **`headers`**: Field-line parsing and the case-insensitive header map
//! - **`request`**: HTTP request representation and the parser state machine
//! - **`response`**: Status codes and the stateful response writer
//!
//! # Request Parser State Machine
//!
//! Each request advances through a one-way state machine as bytes arrive:
//!
//! ```text
//!        ┌─────────────────┐
//!        │   Initialized   │ ← Wait for the full request line
//!        └────────┬────────┘
//!                 │ Request line + CRLF
//!                 ▼
//!        ┌─────────────────┐
//!        │ ParsingHeaders  │ ← One field line per step
//!        └────────┬────────┘
//!                 │ Empty line (CRLF CRLF)
//!                 ├─ no Content-Length → Done
//!                 ▼
//!        ┌─────────────────┐
//!        │  ParsingBody    │ ← Accumulate until end of stream
//!        └────────┬────────┘
//!                 │ EOF, length checks out
//!                 ▼
//!               Done
//! ```
//!
//! The response writer mirrors this on the way out: status line, then
//! headers, then body. Calls out of order fail without touching the stream.
//!
//! # Example
//!
//! ```ignore
//! use anvil::http::request::Request;
//! use anvil::http::response::{ResponseWriter, StatusCode, default_headers};
//!
//! let (mut read_half, write_half) = socket.into_split();
//! let request = Request::from_reader(&mut read_half).await?;
//!
//! let mut writer = ResponseWriter::new(write_half);
//! writer.write_status_line(StatusCode::Ok).await?;
//! writer.write_headers(&default_headers(2, "text/plain")?).await?;
//! writer.write_body(b"ok").await?;
//! ```

pub mod buffer;
pub mod headers;
pub mod request;
pub mod response;
