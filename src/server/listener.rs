//! TCP listener, accept loop, and per-connection dispatch.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tracing::{error, info};

use crate::http::request::Request;
use crate::http::response::ResponseWriter;
use crate::server::handler::{Handler, Reply};

/// A running HTTP server.
///
/// [`Server::serve`] binds the port and returns immediately; accepting
/// runs on its own task until [`Server::close`] is called or the value is
/// dropped with close already requested. Each accepted connection gets its
/// own task, so a stalled client never holds up the rest.
pub struct Server {
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
}

impl Server {
    /// Binds `0.0.0.0:port` and starts accepting. Pass port 0 to let the
    /// OS pick one; [`Server::local_addr`] reports the bound address.
    pub async fn serve<H: Handler>(port: u16, handler: H) -> io::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        let closed = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(Notify::new());
        tokio::spawn(accept_loop(
            listener,
            Arc::new(handler),
            Arc::clone(&closed),
            Arc::clone(&shutdown),
        ));

        Ok(Self {
            local_addr,
            closed,
            shutdown,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Stops accepting and releases the listening socket. Safe to call
    /// from any task, any number of times; only the first call acts.
    /// Connections already being served run to completion.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.shutdown.notify_one();
            info!("Server closed");
        }
    }
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    closed: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) {
    while !closed.load(Ordering::SeqCst) {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    info!("Accepted connection from {}", peer);
                    let handler = Arc::clone(&handler);
                    tokio::spawn(handle_connection(stream, peer, handler));
                }
                Err(e) => {
                    if closed.load(Ordering::SeqCst) {
                        break;
                    }
                    error!("Accept failed: {}", e);
                }
            },
            _ = shutdown.notified() => break,
        }
    }
    // dropping the listener here closes the socket
}

/// One connection, start to finish: parse the request, run the handler or
/// report the parse failure, close.
async fn handle_connection<H: Handler>(stream: TcpStream, peer: SocketAddr, handler: Arc<H>) {
    let (mut read_half, write_half) = stream.into_split();
    let mut writer = ResponseWriter::new(write_half);

    match Request::from_reader(&mut read_half).await {
        Ok(request) => handler.handle(writer, request).await,
        Err(e) => {
            error!("Connection error from {}: {}", peer, e);
            if let Err(write_err) = Reply::server_error(e.to_string()).send(&mut writer).await {
                error!("Failed to report error to {}: {}", peer, write_err);
            }
        }
    }
}
