//! Request parameter objects, one per catalogue method.
//!
//! Field names are the exact camelCase names the node expects. `None`
//! fields are omitted from the JSON object.

use serde::Serialize;
use serde_json::Value;

use super::filters::{
    EventFilter, InscriptionFilter, ObjectStateFilter, SyncStateFilter, TransactionFilter,
    UtxoFilter,
};
use super::state::{EventOptions, QueryOptions, StateOptions};
use super::transaction::{RepairScope, RepairType, TxOptions};
use super::value_objects::{comma_separated, ObjectId, TxHash};

#[derive(Debug, Clone, Serialize)]
pub struct BroadcastTxParams<'a> {
    pub hex: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxfeerate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxburnamount: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInscriptionsParams<'a> {
    pub filter: &'a InscriptionFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descending_order: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryUtxosParams<'a> {
    pub filter: &'a UtxoFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descending_order: Option<bool>,
}

/// Shared by dry run and fire-and-forget send.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxBcsParams {
    pub tx_bcs_hex: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRawTransactionParams {
    pub tx_bcs_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_option: Option<TxOptions>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBalanceParams<'a> {
    pub owner: &'a str,
    pub coin_type: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBalancesParams<'a> {
    pub owner: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEventsByEventHandleParams<'a> {
    pub event_handle_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descending_order: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_options: Option<EventOptions>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFieldStatesParams<'a> {
    pub object_id: &'a ObjectId,
    pub field_key: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_option: Option<StateOptions>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetModuleAbiParams<'a> {
    pub module_addr: &'a str,
    pub module_name: &'a str,
}

/// `objectIds` travels as one comma-separated string.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetObjectStatesParams<'a> {
    #[serde(with = "comma_separated")]
    pub object_ids: &'a [ObjectId],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_option: Option<StateOptions>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStatesParams {
    pub access_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_option: Option<StateOptions>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionsByHashParams<'a> {
    pub tx_hashes: &'a [TxHash],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionsByOrderParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descending_order: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFieldStatesParams<'a> {
    pub object_id: &'a ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_option: Option<StateOptions>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStatesParams {
    pub access_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_option: Option<StateOptions>,
}

/// Shape shared by the four indexer queries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerQueryParams<'a, F> {
    pub filter: &'a F,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_option: Option<QueryOptions>,
}

pub type QueryEventsParams<'a> = IndexerQueryParams<'a, EventFilter>;
pub type QueryObjectStatesParams<'a> = IndexerQueryParams<'a, ObjectStateFilter>;
pub type QueryTransactionsParams<'a> = IndexerQueryParams<'a, TransactionFilter>;
pub type SyncStatesParams<'a> = IndexerQueryParams<'a, SyncStateFilter>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairIndexerParams<'a> {
    pub repair_type: RepairType,
    pub repair_params: &'a RepairScope,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_none_fields_are_omitted() {
        let filter = InscriptionFilter::All;
        let params = QueryInscriptionsParams {
            filter: &filter,
            cursor: None,
            limit: Some("10".into()),
            descending_order: None,
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"filter": "all", "limit": "10"})
        );
    }

    #[test]
    fn test_camel_case_names() {
        let id = ObjectId::new("0x1").unwrap();
        let keys = vec!["a".to_string(), "b".to_string()];
        let params = GetFieldStatesParams {
            object_id: &id,
            field_key: &keys,
            state_option: Some(StateOptions::decoded()),
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "objectId": "0x1",
                "fieldKey": ["a", "b"],
                "stateOption": {"decode": true, "showDisplay": false}
            })
        );

        let params = ExecuteRawTransactionParams {
            tx_bcs_hex: "0x01".into(),
            tx_option: Some(TxOptions { with_output: true }),
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"txBcsHex": "0x01", "txOption": {"withOutput": true}})
        );
    }

    #[test]
    fn test_object_ids_joined() {
        let ids = vec![ObjectId::new("0x1").unwrap(), ObjectId::new("0x2").unwrap()];
        let params = GetObjectStatesParams {
            object_ids: &ids,
            state_option: None,
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"objectIds": "0x1,0x2"})
        );
    }

    #[test]
    fn test_repair_params() {
        let scope = RepairScope::Owner("bc1qowner".into());
        let params = RepairIndexerParams {
            repair_type: RepairType::Utxo,
            repair_params: &scope,
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"repairType": "utxo", "repairParams": {"owner": "bc1qowner"}})
        );
    }
}
