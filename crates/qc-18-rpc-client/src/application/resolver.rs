//! Applies the decode rule to raw state and event payloads.

use serde_json::Value;
use tracing::warn;

use crate::domain::state::{raw_bytes, ObjectStateView};
use crate::domain::views::{EventView, IndexerEventView};
use crate::domain::{DecodeError, Decoded, RawState, ResolvedEvent, ResolvedState, RpcClientError};
use crate::ports::LayoutDecoder;

/// Per-call resolver. Decode failures degrade the item, never the call.
pub struct StateResolver<'a> {
    method: &'static str,
    decode: bool,
    decoder: Option<&'a dyn LayoutDecoder>,
}

impl<'a> StateResolver<'a> {
    pub fn new(method: &'static str, decode: bool, decoder: Option<&'a dyn LayoutDecoder>) -> Self {
        Self {
            method,
            decode,
            decoder,
        }
    }

    /// Picks the decoded form for one payload.
    ///
    /// Server value first, then the local decoder, then the server's error,
    /// then `MissingLayout`.
    pub fn decode_payload(
        &self,
        value_type: &str,
        bytes: &[u8],
        server_value: Option<Value>,
        server_error: Option<String>,
    ) -> Decoded {
        if !self.decode {
            return Decoded::NotRequested;
        }
        if let Some(value) = server_value.filter(|v| !v.is_null()) {
            return Decoded::Value(value);
        }

        let failure = match self.decoder.map(|d| d.decode(value_type, bytes)) {
            Some(Ok(value)) => return Decoded::Value(value),
            Some(Err(err)) => err,
            None => match server_error {
                Some(message) => DecodeError::Server(message),
                None => DecodeError::MissingLayout {
                    value_type: value_type.to_string(),
                },
            },
        };
        warn!(
            method = self.method,
            value_type = value_type,
            error = %failure,
            "decode failed, returning raw value"
        );
        Decoded::Failed(failure)
    }

    pub fn resolve_state(&self, view: ObjectStateView) -> Result<ResolvedState, RpcClientError> {
        let bytes = raw_bytes(self.method, &view.value)?;
        let decoded = self.decode_payload(
            &view.object_type,
            &bytes,
            view.decoded_value,
            view.decode_error,
        );
        Ok(ResolvedState {
            id: view.id,
            owner: view.owner,
            raw: RawState {
                value_type: view.object_type,
                bytes,
            },
            decoded,
            display_fields: view.display_fields,
        })
    }

    pub fn resolve_indexer_event(
        &self,
        view: IndexerEventView,
    ) -> Result<ResolvedEvent, RpcClientError> {
        let data = raw_bytes(self.method, &view.event_data)?;
        let decoded = self.decode_payload(&view.event_type, &data, view.decoded_event_data, None);
        Ok(ResolvedEvent {
            event_id: view.event_id,
            indexer_event_id: Some(view.indexer_event_id),
            event_type: view.event_type,
            data,
            decoded,
            tx_hash: view.tx_hash,
            sender: view.sender,
        })
    }

    pub fn resolve_event(&self, view: EventView) -> Result<ResolvedEvent, RpcClientError> {
        let data = raw_bytes(self.method, &view.event_data)?;
        let decoded = self.decode_payload(&view.event_type, &data, view.decoded_event_data, None);
        Ok(ResolvedEvent {
            event_id: view.event_id,
            indexer_event_id: None,
            event_type: view.event_type,
            data,
            decoded,
            tx_hash: None,
            sender: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ObjectId;
    use crate::ports::MockLayoutDecoder;
    use serde_json::{json, Map};

    fn view(decoded: Option<Value>, error: Option<&str>) -> ObjectStateView {
        ObjectStateView {
            id: ObjectId::new("0x1").unwrap(),
            owner: None,
            object_type: "0x3::coin::CoinInfo".into(),
            value: "0x0a0b".into(),
            decoded_value: decoded,
            decode_error: error.map(str::to_string),
            display_fields: None,
            metadata: Map::new(),
        }
    }

    #[test]
    fn test_raw_only_discards_server_value() {
        let resolver = StateResolver::new("test", false, None);
        let state = resolver
            .resolve_state(view(Some(json!({"supply": "1"})), None))
            .unwrap();
        assert_eq!(state.decoded, Decoded::NotRequested);
        assert_eq!(state.raw.bytes, vec![0x0a, 0x0b]);
    }

    #[test]
    fn test_server_value_wins() {
        let resolver = StateResolver::new("test", true, None);
        let state = resolver
            .resolve_state(view(Some(json!({"supply": "1"})), None))
            .unwrap();
        assert_eq!(state.decoded.value(), Some(&json!({"supply": "1"})));
    }

    #[test]
    fn test_missing_value_degrades() {
        let resolver = StateResolver::new("test", true, None);
        let state = resolver.resolve_state(view(None, None)).unwrap();
        assert!(matches!(
            state.decoded.error(),
            Some(DecodeError::MissingLayout { .. })
        ));

        let state = resolver
            .resolve_state(view(None, Some("unknown struct")))
            .unwrap();
        assert_eq!(
            state.decoded.error(),
            Some(&DecodeError::Server("unknown struct".into()))
        );
    }

    #[test]
    fn test_local_decoder_fills_gap() {
        let decoder = MockLayoutDecoder::new().with_type("0x3::coin::CoinInfo");
        let resolver = StateResolver::new("test", true, Some(&decoder));
        let state = resolver.resolve_state(view(None, None)).unwrap();
        assert!(state.decoded.value().is_some());
    }

    #[test]
    fn test_bad_hex_is_unexpected_response() {
        let resolver = StateResolver::new("test", false, None);
        let mut bad = view(None, None);
        bad.value = "0xzz".into();
        assert!(matches!(
            resolver.resolve_state(bad),
            Err(RpcClientError::UnexpectedResponse { .. })
        ));
    }
}
