//! # Adapters
//!
//! Concrete transports for the outbound ports.

pub mod http;

pub use http::JsonRpcHttpTransport;
