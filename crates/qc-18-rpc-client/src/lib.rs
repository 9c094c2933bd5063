// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! QC-18 RPC Client - cursor-paginated queries and transaction submission
//! against a Rooch-compatible JSON-RPC node.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       RPC CLIENT (qc-18)                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  QueryApi                         SubmissionApi                   │
//! │  (listings, point reads,          (dry run, send, execute,        │
//! │   repair_indexer)                  bitcoin broadcast)             │
//! │         │                                 │                       │
//! │  ┌──────┴─────────────────────────────────┴──────┐                │
//! │  │              RpcClientService                  │                │
//! │  │  validate → bind cursor → dispatch → normalize │                │
//! │  │            → resolve state / classify error    │                │
//! │  └──────────────────────┬─────────────────────────┘                │
//! │                         │ RpcTransport                            │
//! │  ┌──────────────────────┴─────────────────────────┐                │
//! │  │     JsonRpcHttpTransport (jsonrpsee)            │                │
//! │  └─────────────────────────────────────────────────┘                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Cursors
//!
//! Every page carries an opaque [`PageCursor`] bound to its resource,
//! direction and filter. Passing it to a different query fails locally
//! with [`RpcClientError::CursorMismatch`].
//!
//! # Usage
//!
//! ```ignore
//! use qc_18_rpc_client::{JsonRpcHttpTransport, RpcClientConfig, RpcClientService};
//!
//! let config = RpcClientConfig::from_env();
//! let transport = Arc::new(JsonRpcHttpTransport::from_config(&config)?);
//! let client = RpcClientService::new(config, transport)?;
//!
//! let page = client
//!     .list_field_states(&object_id, None, Some(PageLimit::new(50)?), StateOptions::decoded())
//!     .await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

// Re-exports for public API
pub use adapters::JsonRpcHttpTransport;
pub use application::{Paginator, RpcClientService};
pub use config::{ConfigError, LogConfig, RpcClientConfig};
pub use domain::*;
pub use ports::{LayoutDecoder, QueryApi, RpcTransport, SubmissionApi};
pub use telemetry::{init_tracing, TelemetryError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_method_support() {
        assert!(is_method_supported("rooch_listFieldStates"));
        assert!(is_method_supported("btc_broadcastTX"));
        assert!(!is_method_supported("eth_getBalance"));
    }
}
