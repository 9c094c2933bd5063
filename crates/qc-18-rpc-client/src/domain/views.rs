//! Response item views for events, transactions, balances and sync states.
//!
//! Fields the client does not interpret are kept in `rest` untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use super::pagination::{CursorKey, IndexerEventId, PageItem};
use super::state::Decoded;
use super::transaction::{ExecutionInfoView, SequenceInfoView};
use super::value_objects::TxHash;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventIdView {
    pub event_handle_id: String,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub event_seq: u64,
}

/// Event from the indexer (`rooch_queryEvents`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerEventView {
    pub indexer_event_id: IndexerEventId,
    pub event_id: EventIdView,
    pub event_type: String,
    /// `0x`-prefixed hex.
    pub event_data: String,
    #[serde(default)]
    pub decoded_event_data: Option<Value>,
    #[serde(default)]
    pub tx_hash: Option<TxHash>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl PageItem for IndexerEventView {
    fn cursor_key(&self) -> Option<CursorKey> {
        Some(self.indexer_event_id.into())
    }
}

/// Event read from a handle (`rooch_getEventsByEventHandle`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventView {
    pub event_id: EventIdView,
    pub event_type: String,
    pub event_data: String,
    #[serde(default)]
    pub decoded_event_data: Option<Value>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl PageItem for EventView {
    fn cursor_key(&self) -> Option<CursorKey> {
        Some(CursorKey::Sequence(self.event_id.event_seq))
    }
}

/// Event with the decode rule applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEvent {
    pub event_id: EventIdView,
    /// Present for indexer results.
    pub indexer_event_id: Option<IndexerEventId>,
    pub event_type: String,
    pub data: Vec<u8>,
    pub decoded: Decoded,
    pub tx_hash: Option<TxHash>,
    pub sender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransactionView {
    pub sequence_info: SequenceInfoView,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Transaction with its execution info, if executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionWithInfoView {
    pub transaction: LedgerTransactionView,
    #[serde(default)]
    pub execution_info: Option<ExecutionInfoView>,
}

impl TransactionWithInfoView {
    pub fn tx_order(&self) -> u64 {
        self.transaction.sequence_info.tx_order
    }
}

impl PageItem for TransactionWithInfoView {
    fn cursor_key(&self) -> Option<CursorKey> {
        Some(CursorKey::Sequence(self.tx_order()))
    }
}

/// Coin balance of an owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceInfoView {
    pub coin_type: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
    /// Decimal string, may exceed `u64`.
    pub balance: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl PageItem for BalanceInfoView {
    fn cursor_key(&self) -> Option<CursorKey> {
        None
    }
}

/// State change set of one transaction.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChangeSetView {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub tx_order: u64,
    pub state_change_set: Value,
}

impl PageItem for StateChangeSetView {
    fn cursor_key(&self) -> Option<CursorKey> {
        Some(CursorKey::Sequence(self.tx_order))
    }
}

/// Module ABI. Only the identifying fields are typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleAbiView {
    pub address: String,
    pub name: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_view_key() {
        let view: TransactionWithInfoView = serde_json::from_value(json!({
            "transaction": {
                "sequence_info": {"tx_order": "42", "tx_order_signature": "0x"},
                "data": {"type": "l2_tx"}
            },
            "execution_info": null
        }))
        .unwrap();
        assert_eq!(view.cursor_key(), Some(CursorKey::Sequence(42)));
        assert!(view.execution_info.is_none());
        assert!(view.transaction.rest.contains_key("data"));
    }

    #[test]
    fn test_indexer_event_key() {
        let view: IndexerEventView = serde_json::from_value(json!({
            "indexer_event_id": {"tx_order": "3", "event_index": "1"},
            "event_id": {"event_handle_id": "0x9", "event_seq": "0"},
            "event_type": "0x3::coin::MintEvent",
            "event_data": "0x00",
            "created_at": "1700000000000"
        }))
        .unwrap();
        assert_eq!(
            view.cursor_key(),
            Some(CursorKey::Indexed { order: 3, index: 1 })
        );
    }
}
