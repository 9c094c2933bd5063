//! # Outbound Ports
//!
//! Collaborators the client depends on: the JSON-RPC transport and an
//! optional local layout decoder.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{codes, DecodeError, TransportError};
use crate::domain::value_objects::encode_hex;

/// Executes one JSON-RPC call. Framing, ids and HTTP belong to the
/// implementation.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Sends `method` with by-name `params` and returns the `result` member.
    async fn call(&self, method: &str, params: Value) -> Result<Value, TransportError>;

    /// Endpoint description, for logs.
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: RpcTransport + ?Sized> RpcTransport for Arc<T> {
    async fn call(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        (**self).call(method, params).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Decodes raw Move values locally when the server did not.
pub trait LayoutDecoder: Send + Sync {
    /// Decodes `bytes` as a value of `value_type`.
    fn decode(&self, value_type: &str, bytes: &[u8]) -> Result<Value, DecodeError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Scripted response for one method.
pub type MockHandler = Arc<dyn Fn(&Value) -> Result<Value, TransportError> + Send + Sync>;

#[derive(Clone)]
struct MockRoute {
    handler: MockHandler,
    delay: Option<Duration>,
}

/// A call seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
}

/// In-memory transport with per-method handlers and a call log.
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<RwLock<HashMap<String, MockRoute>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    /// Fail every call with a connection error.
    pub should_fail: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `method` to `handler`.
    pub fn on<F>(&self, method: &str, handler: F)
    where
        F: Fn(&Value) -> Result<Value, TransportError> + Send + Sync + 'static,
    {
        self.routes.write().insert(
            method.to_string(),
            MockRoute {
                handler: Arc::new(handler),
                delay: None,
            },
        );
    }

    /// Routes `method` to `handler`, answering after `delay`.
    pub fn on_delayed<F>(&self, method: &str, delay: Duration, handler: F)
    where
        F: Fn(&Value) -> Result<Value, TransportError> + Send + Sync + 'static,
    {
        self.routes.write().insert(
            method.to_string(),
            MockRoute {
                handler: Arc::new(handler),
                delay: Some(delay),
            },
        );
    }

    /// Always answers `method` with `result`.
    pub fn respond(&self, method: &str, result: Value) {
        self.on(method, move |_| Ok(result.clone()));
    }

    /// Always fails `method` with `error`.
    pub fn fail(&self, method: &str, error: TransportError) {
        self.on(method, move |_| Err(error.clone()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|c| c.method == method)
            .map(|c| c.params.clone())
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("routes", &self.routes.read().keys().collect::<Vec<_>>())
            .field("calls", &self.calls.lock().len())
            .field("should_fail", &self.should_fail)
            .finish()
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        self.calls.lock().push(RecordedCall {
            method: method.to_string(),
            params: params.clone(),
        });

        if self.should_fail {
            return Err(TransportError::Connection("Mock failure".to_string()));
        }

        let route = self.routes.read().get(method).cloned();
        let Some(route) = route else {
            return Err(TransportError::Rpc {
                code: codes::METHOD_NOT_FOUND,
                message: format!("Method not found: {}", method),
                data: None,
            });
        };

        if let Some(delay) = route.delay {
            tokio::time::sleep(delay).await;
        }
        (route.handler)(&params)
    }

    fn endpoint(&self) -> &str {
        "mock://"
    }
}

/// Layout decoder that knows a fixed set of types.
#[derive(Debug, Clone, Default)]
pub struct MockLayoutDecoder {
    known: HashSet<String>,
}

impl MockLayoutDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, value_type: &str) -> Self {
        self.known.insert(value_type.to_string());
        self
    }
}

impl LayoutDecoder for MockLayoutDecoder {
    fn decode(&self, value_type: &str, bytes: &[u8]) -> Result<Value, DecodeError> {
        if !self.known.contains(value_type) {
            return Err(DecodeError::MissingLayout {
                value_type: value_type.to_string(),
            });
        }
        if bytes.is_empty() {
            return Err(DecodeError::SchemaMismatch {
                value_type: value_type.to_string(),
                reason: "empty value".to_string(),
            });
        }
        Ok(json!({ "type": value_type, "bytes": encode_hex(bytes) }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_routes_and_records() {
        let mock = MockTransport::new();
        mock.respond("rooch_getChainID", json!("0x4"));

        let result = mock.call("rooch_getChainID", json!({})).await.unwrap();
        assert_eq!(result, json!("0x4"));
        assert_eq!(mock.calls_to("rooch_getChainID"), 1);
        assert_eq!(mock.last_params("rooch_getChainID"), Some(json!({})));
    }

    #[tokio::test]
    async fn test_mock_unknown_method() {
        let mock = MockTransport::new();
        let err = mock.call("rooch_nope", json!({})).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Rpc {
                code: codes::METHOD_NOT_FOUND,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mut mock = MockTransport::new();
        mock.respond("rooch_status", json!({}));
        mock.should_fail = true;
        assert!(matches!(
            mock.call("rooch_status", json!({})).await,
            Err(TransportError::Connection(_))
        ));
    }

    #[test]
    fn test_mock_layout_decoder() {
        let decoder = MockLayoutDecoder::new().with_type("0x2::m::T");
        assert!(decoder.decode("0x2::m::T", &[1]).is_ok());
        assert!(matches!(
            decoder.decode("0x2::m::U", &[1]),
            Err(DecodeError::MissingLayout { .. })
        ));
        assert!(matches!(
            decoder.decode("0x2::m::T", &[]),
            Err(DecodeError::SchemaMismatch { .. })
        ));
    }
}
