//! Receive buffer feeding the request parser.
//!
//! One read can deliver any fragment of a request, so parsed bytes are
//! consumed off the front while unread capacity grows at the back. The
//! buffer doubles whenever a read fills it, which keeps large request
//! heads moving without a fixed line-length limit.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

pub const DEFAULT_CAPACITY: usize = 1024;

pub struct RecvBuffer {
    buf: BytesMut,
    initial: usize,
}

impl RecvBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            initial: capacity,
        }
    }

    /// Read once from `reader` into free space, growing first if the last
    /// read left no room. Returns the number of bytes read; 0 means end of
    /// stream.
    pub async fn fill_from<R>(&mut self, reader: &mut R) -> std::io::Result<usize>
    where
        R: AsyncRead + Unpin,
    {
        if self.buf.len() == self.buf.capacity() {
            let additional = self.buf.capacity().max(self.initial).max(1);
            self.buf.reserve(additional);
        }
        reader.read_buf(&mut self.buf).await
    }

    /// Drop `n` parsed bytes off the front. Callers pass counts reported by
    /// the parser, which never exceed `len`.
    pub fn consume(&mut self, n: usize) {
        self.buf.advance(n);
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}
