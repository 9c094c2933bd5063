//! In-memory node serving a fixed data set with the node's paging rules.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use qc_18_rpc_client::{codes, RpcClientConfig, RpcClientService, RpcTransport, TransportError};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const PARENT: &str = "0x42";
pub const FIELD_TYPE: &str = "0x2::string::String";
pub const EVENT_TYPE: &str = "0x3::coin::DepositEvent";
pub const TX_COUNT: u64 = 20;

/// (tx_order, event_index) for every fixture event.
pub fn all_event_ids() -> Vec<(u64, u64)> {
    (1..=5u64)
        .flat_map(|order| (0..3u64).map(move |index| (order, index)))
        .collect()
}

pub struct FakeNode {
    fields: BTreeMap<String, Vec<u8>>,
    events: Vec<(u64, u64)>,
    server_decodes: bool,
    pruned_below: Mutex<u64>,
    calls: Mutex<Vec<String>>,
}

impl FakeNode {
    pub fn new() -> Self {
        let fields = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|k| (k.to_string(), format!("value-{}", k).into_bytes()))
            .collect();
        Self {
            fields,
            events: all_event_ids(),
            server_decodes: true,
            pruned_below: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Node that never fills `decoded_value`.
    pub fn without_server_decoding() -> Self {
        Self {
            server_decodes: false,
            ..Self::new()
        }
    }

    /// Forgets transaction cursors below `order`.
    pub fn prune_below(&self, order: u64) {
        *self.pruned_below.lock() = order;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|m| *m == method).count()
    }

    pub fn field_bytes(&self, key: &str) -> Option<&[u8]> {
        self.fields.get(key).map(Vec::as_slice)
    }

    fn state_json(&self, key: &str, bytes: &[u8], decode: bool) -> Value {
        let decoded = if decode && self.server_decodes {
            json!({ "value": String::from_utf8_lossy(bytes) })
        } else {
            Value::Null
        };
        json!({
            "id": format!("{}{}", PARENT, hex::encode(key)),
            "owner": "0x1",
            "object_type": FIELD_TYPE,
            "value": format!("0x{}", hex::encode(bytes)),
            "decoded_value": decoded,
            "state_root": "0x00",
            "size": "0"
        })
    }

    fn list_field_states(&self, params: &Value) -> Result<Value, TransportError> {
        let limit = limit_of(params);
        let decode = params["stateOption"]["decode"].as_bool().unwrap_or(false);
        let after = params["cursor"].as_str().map(str::to_string);

        let remaining: Vec<(&String, &Vec<u8>)> = self
            .fields
            .iter()
            .filter(|(k, _)| after.as_ref().map_or(true, |c| *k > c))
            .collect();
        let page: Vec<(&String, &Vec<u8>)> = remaining.iter().copied().take(limit).collect();
        let has_next = remaining.len() > limit;
        // The node always echoes the last key, even on the final page.
        let next = page.last().map(|(k, _)| json!(k)).unwrap_or(Value::Null);

        let data: Vec<Value> = page
            .iter()
            .map(|(k, v)| json!({ "field_key": k, "state": self.state_json(k.as_str(), v.as_slice(), decode) }))
            .collect();
        Ok(json!({ "data": data, "nextCursor": next, "hasNextPage": has_next }))
    }

    fn get_field_states(&self, params: &Value) -> Result<Value, TransportError> {
        let decode = params["stateOption"]["decode"].as_bool().unwrap_or(false);
        let keys = params["fieldKey"]
            .as_array()
            .ok_or_else(|| invalid_params("fieldKey must be an array"))?;
        let slots: Vec<Value> = keys
            .iter()
            .map(|k| {
                let key = k.as_str().unwrap_or_default();
                self.fields
                    .get(key)
                    .map(|v| self.state_json(key, v, decode))
                    .unwrap_or(Value::Null)
            })
            .collect();
        Ok(Value::Array(slots))
    }

    fn query_events(&self, params: &Value) -> Result<Value, TransportError> {
        let limit = limit_of(params);
        let descending = params["queryOption"]["descending"].as_bool().unwrap_or(false);
        let decode = params["queryOption"]["decode"].as_bool().unwrap_or(false);
        let after = match &params["cursor"] {
            Value::Null => None,
            c => Some((number(&c["tx_order"])?, number(&c["event_index"])?)),
        };

        let mut ordered = self.events.clone();
        if descending {
            ordered.reverse();
        }
        let remaining: Vec<(u64, u64)> = ordered
            .into_iter()
            .filter(|id| match after {
                None => true,
                Some(c) if descending => *id < c,
                Some(c) => *id > c,
            })
            .collect();
        let page: Vec<(u64, u64)> = remaining.iter().copied().take(limit).collect();
        let has_next = remaining.len() > limit;
        let next = match (has_next, page.last()) {
            (true, Some((o, i))) => json!({ "tx_order": o.to_string(), "event_index": i.to_string() }),
            _ => Value::Null,
        };

        let data: Vec<Value> = page
            .iter()
            .map(|(order, index)| {
                let payload = format!("deposit-{}-{}", order, index).into_bytes();
                let decoded = if decode {
                    json!({ "amount": order * 10 + index })
                } else {
                    Value::Null
                };
                json!({
                    "indexer_event_id": { "tx_order": order.to_string(), "event_index": index.to_string() },
                    "event_id": { "event_handle_id": "0xe", "event_seq": (order * 3 + index).to_string() },
                    "event_type": EVENT_TYPE,
                    "event_data": format!("0x{}", hex::encode(&payload)),
                    "decoded_event_data": decoded,
                    "tx_hash": format!("0x{:064x}", order),
                    "sender": "0x1",
                    "created_at": "0"
                })
            })
            .collect();
        Ok(json!({ "data": data, "nextCursor": next, "hasNextPage": has_next }))
    }

    fn get_transactions_by_order(&self, params: &Value) -> Result<Value, TransportError> {
        let limit = limit_of(params);
        let descending = params["descendingOrder"].as_bool().unwrap_or(false);
        let after = match &params["cursor"] {
            Value::Null => None,
            c => Some(number(c)?),
        };
        if let Some(c) = after {
            if c < *self.pruned_below.lock() {
                return Err(TransportError::Rpc {
                    code: codes::SERVER_ERROR,
                    message: format!("cursor {} not found: pruned", c),
                    data: None,
                });
            }
        }

        let mut orders: Vec<u64> = (0..TX_COUNT).collect();
        if descending {
            orders.reverse();
        }
        let remaining: Vec<u64> = orders
            .into_iter()
            .filter(|o| match after {
                None => true,
                Some(c) if descending => *o < c,
                Some(c) => *o > c,
            })
            .collect();
        let page: Vec<u64> = remaining.iter().copied().take(limit).collect();
        let has_next = remaining.len() > limit;
        let next = match (has_next, page.last()) {
            (true, Some(o)) => json!(o.to_string()),
            _ => Value::Null,
        };
        let data: Vec<Value> = page
            .iter()
            .map(|o| json!({ "transaction": { "sequence_info": { "tx_order": o.to_string() } } }))
            .collect();
        Ok(json!({ "data": data, "nextCursor": next, "hasNextPage": has_next }))
    }
}

#[async_trait]
impl RpcTransport for FakeNode {
    async fn call(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        self.calls.lock().push(method.to_string());
        match method {
            "rooch_listFieldStates" => self.list_field_states(&params),
            "rooch_getFieldStates" => self.get_field_states(&params),
            "rooch_queryEvents" => self.query_events(&params),
            "rooch_getTransactionsByOrder" => self.get_transactions_by_order(&params),
            "rooch_dryRunRawTransaction" => Ok(json!({
                "raw_output": { "status": { "type": "outofgas" }, "gas_used": "1000000" },
                "vm_error_info": { "error_message": "OUT_OF_GAS", "execution_state": [] }
            })),
            "rooch_sendRawTransaction" => Ok(json!(format!("0x{:064x}", 1))),
            other => Err(TransportError::Rpc {
                code: codes::METHOD_NOT_FOUND,
                message: format!("Method not found: {}", other),
                data: None,
            }),
        }
    }

    fn endpoint(&self) -> &str {
        "fake://node"
    }
}

fn limit_of(params: &Value) -> usize {
    params["limit"]
        .as_str()
        .and_then(|l| l.parse().ok())
        .unwrap_or(50)
}

fn number(v: &Value) -> Result<u64, TransportError> {
    match v {
        Value::String(s) => s.parse().map_err(|_| invalid_params("bad number")),
        Value::Number(n) => n.as_u64().ok_or_else(|| invalid_params("bad number")),
        _ => Err(invalid_params("expected number")),
    }
}

fn invalid_params(message: &str) -> TransportError {
    TransportError::Rpc {
        code: codes::INVALID_PARAMS,
        message: message.to_string(),
        data: None,
    }
}

pub fn client(node: FakeNode) -> (Arc<FakeNode>, RpcClientService<FakeNode>) {
    let node = Arc::new(node);
    let service = RpcClientService::new(RpcClientConfig::for_testing(), node.clone())
        .expect("valid test config");
    (node, service)
}
