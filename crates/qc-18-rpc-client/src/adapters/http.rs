//! JSON-RPC over HTTP, framed by jsonrpsee.

use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::{ArrayParams, ObjectParams};
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::trace;

use crate::config::{ConfigError, RpcClientConfig};
use crate::domain::TransportError;
use crate::ports::RpcTransport;

/// [`RpcTransport`] backed by a jsonrpsee HTTP client.
pub struct JsonRpcHttpTransport {
    client: HttpClient,
    endpoint: String,
    timeout: Duration,
}

impl JsonRpcHttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let client = HttpClientBuilder::default()
            .request_timeout(timeout)
            .build(endpoint)
            .map_err(|e| ConfigError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &RpcClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(&config.endpoint, config.request_timeout())
    }

    fn map_error(&self, err: ClientError) -> TransportError {
        match err {
            ClientError::Call(obj) => TransportError::Rpc {
                code: obj.code(),
                message: obj.message().to_string(),
                data: obj
                    .data()
                    .and_then(|raw| serde_json::from_str(raw.get()).ok()),
            },
            ClientError::RequestTimeout => TransportError::Timeout(self.timeout),
            ClientError::ParseError(e) => TransportError::InvalidResponse(e.to_string()),
            ClientError::InvalidRequestId(e) => TransportError::InvalidResponse(e.to_string()),
            other => TransportError::Connection(other.to_string()),
        }
    }
}

impl fmt::Debug for JsonRpcHttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRpcHttpTransport")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Splits a params value into by-name or positional jsonrpsee params.
enum WireParams {
    Named(ObjectParams),
    Positional(ArrayParams),
}

/// Params that fail to encode never leave the client.
fn encode_error(err: serde_json::Error) -> TransportError {
    TransportError::Encode(err.to_string())
}

fn to_wire_params(params: Value) -> Result<WireParams, TransportError> {
    match params {
        Value::Object(map) => {
            let mut named = ObjectParams::new();
            for (key, value) in map {
                named.insert(&key, value).map_err(encode_error)?;
            }
            Ok(WireParams::Named(named))
        }
        Value::Array(items) => {
            let mut positional = ArrayParams::new();
            for item in items {
                positional.insert(item).map_err(encode_error)?;
            }
            Ok(WireParams::Positional(positional))
        }
        Value::Null => Ok(WireParams::Positional(ArrayParams::new())),
        other => {
            let mut positional = ArrayParams::new();
            positional.insert(other).map_err(encode_error)?;
            Ok(WireParams::Positional(positional))
        }
    }
}

#[async_trait]
impl RpcTransport for JsonRpcHttpTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        trace!(method, endpoint = %self.endpoint, "http request");
        let result = match to_wire_params(params)? {
            WireParams::Named(p) => self.client.request::<Value, _>(method, p).await,
            WireParams::Positional(p) => self.client.request::<Value, _>(method, p).await,
        };
        result.map_err(|e| self.map_error(e))
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builds_from_config() {
        let transport = JsonRpcHttpTransport::from_config(&RpcClientConfig::default()).unwrap();
        assert_eq!(transport.endpoint(), "http://127.0.0.1:6767");
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let mut config = RpcClientConfig::default();
        config.endpoint = "tcp://nowhere".into();
        assert!(JsonRpcHttpTransport::from_config(&config).is_err());
    }

    #[test]
    fn test_param_shapes() {
        assert!(matches!(
            to_wire_params(json!({"txBcsHex": "0x01"})),
            Ok(WireParams::Named(_))
        ));
        assert!(matches!(
            to_wire_params(json!(["0x01"])),
            Ok(WireParams::Positional(_))
        ));
        assert!(matches!(to_wire_params(Value::Null), Ok(WireParams::Positional(_))));
    }

    #[test]
    fn test_encode_failure_is_request_side() {
        let serde_err = serde_json::from_str::<Value>("{").unwrap_err();
        let err = encode_error(serde_err);
        assert!(matches!(err, TransportError::Encode(_)));
        assert!(!crate::domain::RpcClientError::Transport(err).outcome_unknown());
    }

    #[test]
    fn test_call_error_maps_to_rpc() {
        let transport = JsonRpcHttpTransport::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let obj = jsonrpsee::types::ErrorObjectOwned::owned(-26, "rejected", Some(json!({"k": 1})));
        match transport.map_error(ClientError::Call(obj)) {
            TransportError::Rpc { code, message, data } => {
                assert_eq!(code, -26);
                assert_eq!(message, "rejected");
                assert_eq!(data, Some(json!({"k": 1})));
            }
            other => panic!("unexpected mapping {other:?}"),
        }
        assert_eq!(
            transport.map_error(ClientError::RequestTimeout),
            TransportError::Timeout(Duration::from_secs(1))
        );
    }

    #[tokio::test]
    async fn test_unreachable_node_is_connection_error() {
        let transport =
            JsonRpcHttpTransport::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = transport.call("rooch_getChainID", Value::Null).await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_) | TransportError::Timeout(_)));
    }
}
