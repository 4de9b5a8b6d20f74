//! TCP server layer.
//!
//! - **`listener`**: Binds the port, accepts connections, and dispatches
//!   each one to its own task
//! - **`handler`**: The [`Handler`] trait connecting parsed requests to
//!   application code, plus the [`Reply`] shorthand

pub mod handler;
pub mod listener;

pub use handler::{ConnectionWriter, Handler, Reply};
pub use listener::Server;
