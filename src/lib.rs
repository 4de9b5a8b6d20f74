//! Anvil - HTTP/1.1 straight from TCP
//!
//! Core library for parsing HTTP requests off raw byte streams and
//! writing framed responses back.

pub mod config;
pub mod http;
pub mod server;
