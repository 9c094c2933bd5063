//! # Application Layer
//!
//! The dispatcher service, state resolution and cursor-chain helpers.

pub mod paginator;
pub mod resolver;
pub mod service;

pub use paginator::{Paginator, DEFAULT_MAX_PAGES};
pub use resolver::StateResolver;
pub use service::RpcClientService;
