//! # Filter Grammar
//!
//! One closed filter type per listing resource. Variants are externally
//! tagged in snake_case, matching the server's filter views:
//!
//! ```text
//! {"owner": "bc1q..."}
//! {"time_range": {"start_time": "1700000000000", "end_time": "1700000100000"}}
//! "all"
//! ```
//!
//! Predicates inside one variant combine with AND. There is no OR.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::fmt;

use super::errors::RpcClientError;
use super::pagination::{FilterDigest, ResourceKind};
use super::state::AccessPath;
use super::value_objects::{
    comma_separated, validate_address, validate_btc_txid, validate_type_tag, ObjectId, TxHash,
};

/// Shared contract of every listing filter.
pub trait QueryFilter: Serialize + fmt::Debug + Send + Sync {
    /// Resource this filter selects from.
    const RESOURCE: ResourceKind;

    /// Fails fast on malformed predicates.
    fn validate(&self) -> Result<(), RpcClientError>;

    /// Digest binding cursors to this exact filter.
    fn digest(&self) -> FilterDigest {
        FilterDigest::of(Self::RESOURCE, self)
    }
}

fn non_empty_ids(field: &str, ids: &[ObjectId]) -> Result<(), RpcClientError> {
    if ids.is_empty() {
        return Err(RpcClientError::MalformedRequest(format!(
            "{} must list at least one object id",
            field
        )));
    }
    Ok(())
}

fn ordered_range(field: &str, start: u64, end: u64) -> Result<(), RpcClientError> {
    if start >= end {
        return Err(RpcClientError::MalformedRequest(format!(
            "{} is empty or inverted: [{}, {})",
            field, start, end
        )));
    }
    Ok(())
}

/// Inscription listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InscriptionFilter {
    Owner(String),
    InscriptionId { txid: String, index: u32 },
    ObjectId(#[serde(with = "comma_separated")] Vec<ObjectId>),
    #[default]
    All,
}

impl QueryFilter for InscriptionFilter {
    const RESOURCE: ResourceKind = ResourceKind::Inscriptions;

    fn validate(&self) -> Result<(), RpcClientError> {
        match self {
            InscriptionFilter::Owner(owner) => validate_address("owner", owner),
            InscriptionFilter::InscriptionId { txid, .. } => validate_btc_txid(txid),
            InscriptionFilter::ObjectId(ids) => non_empty_ids("object_id", ids),
            InscriptionFilter::All => Ok(()),
        }
    }
}

/// UTXO listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtxoFilter {
    Owner(String),
    OutPoint { txid: String, vout: u32 },
    ObjectId(#[serde(with = "comma_separated")] Vec<ObjectId>),
    #[default]
    All,
}

impl QueryFilter for UtxoFilter {
    const RESOURCE: ResourceKind = ResourceKind::Utxos;

    fn validate(&self) -> Result<(), RpcClientError> {
        match self {
            UtxoFilter::Owner(owner) => validate_address("owner", owner),
            UtxoFilter::OutPoint { txid, .. } => validate_btc_txid(txid),
            UtxoFilter::ObjectId(ids) => non_empty_ids("object_id", ids),
            UtxoFilter::All => Ok(()),
        }
    }
}

/// Event query filter. Time ranges are milliseconds, half-open `[start, end)`.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventFilter {
    EventTypeWithSender {
        event_type: String,
        sender: String,
    },
    EventType(String),
    Sender(String),
    TxHash(TxHash),
    TimeRange {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        start_time: u64,
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        end_time: u64,
    },
    TxOrderRange {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        from_order: u64,
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        to_order: u64,
    },
    #[default]
    All,
}

impl QueryFilter for EventFilter {
    const RESOURCE: ResourceKind = ResourceKind::Events;

    fn validate(&self) -> Result<(), RpcClientError> {
        match self {
            EventFilter::EventTypeWithSender { event_type, sender } => {
                validate_type_tag("event_type", event_type)?;
                validate_address("sender", sender)
            }
            EventFilter::EventType(event_type) => validate_type_tag("event_type", event_type),
            EventFilter::Sender(sender) => validate_address("sender", sender),
            EventFilter::TxHash(_) => Ok(()),
            EventFilter::TimeRange {
                start_time,
                end_time,
            } => ordered_range("time_range", *start_time, *end_time),
            EventFilter::TxOrderRange {
                from_order,
                to_order,
            } => ordered_range("tx_order_range", *from_order, *to_order),
            EventFilter::All => Ok(()),
        }
    }
}

/// Object state query filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStateFilter {
    /// Objects of a type owned by `owner`. With `filter_out`, every type
    /// except `object_type`.
    ObjectTypeWithOwner {
        object_type: String,
        owner: String,
        #[serde(default)]
        filter_out: bool,
    },
    ObjectType(String),
    Owner(String),
    ObjectId(#[serde(with = "comma_separated")] Vec<ObjectId>),
    #[default]
    All,
}

impl QueryFilter for ObjectStateFilter {
    const RESOURCE: ResourceKind = ResourceKind::ObjectStates;

    fn validate(&self) -> Result<(), RpcClientError> {
        match self {
            ObjectStateFilter::ObjectTypeWithOwner {
                object_type, owner, ..
            } => {
                validate_type_tag("object_type", object_type)?;
                validate_address("owner", owner)
            }
            ObjectStateFilter::ObjectType(object_type) => {
                validate_type_tag("object_type", object_type)
            }
            ObjectStateFilter::Owner(owner) => validate_address("owner", owner),
            ObjectStateFilter::ObjectId(ids) => non_empty_ids("object_id", ids),
            ObjectStateFilter::All => Ok(()),
        }
    }
}

/// Transaction query filter.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionFilter {
    Sender(String),
    TxHashes(Vec<TxHash>),
    TimeRange {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        start_time: u64,
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        end_time: u64,
    },
    TxOrderRange {
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        from_order: u64,
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        to_order: u64,
    },
    #[default]
    All,
}

impl QueryFilter for TransactionFilter {
    const RESOURCE: ResourceKind = ResourceKind::Transactions;

    fn validate(&self) -> Result<(), RpcClientError> {
        match self {
            TransactionFilter::Sender(sender) => validate_address("sender", sender),
            TransactionFilter::TxHashes(hashes) if hashes.is_empty() => Err(
                RpcClientError::MalformedRequest("tx_hashes must not be empty".into()),
            ),
            TransactionFilter::TxHashes(_) => Ok(()),
            TransactionFilter::TimeRange {
                start_time,
                end_time,
            } => ordered_range("time_range", *start_time, *end_time),
            TransactionFilter::TxOrderRange {
                from_order,
                to_order,
            } => ordered_range("tx_order_range", *from_order, *to_order),
            TransactionFilter::All => Ok(()),
        }
    }
}

/// State change-set sync filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStateFilter {
    ObjectId(ObjectId),
    #[default]
    All,
}

impl QueryFilter for SyncStateFilter {
    const RESOURCE: ResourceKind = ResourceKind::SyncStates;

    fn validate(&self) -> Result<(), RpcClientError> {
        Ok(())
    }
}

// Single-predicate scopes for listings whose method takes no filter object.
// They exist so every listing binds its cursors the same way.

/// Balances of one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceScope<'a> {
    pub owner: &'a str,
}

impl QueryFilter for BalanceScope<'_> {
    const RESOURCE: ResourceKind = ResourceKind::Balances;

    fn validate(&self) -> Result<(), RpcClientError> {
        validate_address("owner", self.owner)
    }
}

/// Events of one event handle type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventHandleScope<'a> {
    pub event_handle_type: &'a str,
}

impl QueryFilter for EventHandleScope<'_> {
    const RESOURCE: ResourceKind = ResourceKind::EventsByHandle;

    fn validate(&self) -> Result<(), RpcClientError> {
        validate_type_tag("event_handle_type", self.event_handle_type)
    }
}

/// Every transaction, by order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransactionOrderScope;

impl QueryFilter for TransactionOrderScope {
    const RESOURCE: ResourceKind = ResourceKind::TransactionsByOrder;

    fn validate(&self) -> Result<(), RpcClientError> {
        Ok(())
    }
}

/// Fields of one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldScope<'a> {
    pub object_id: &'a ObjectId,
}

impl QueryFilter for FieldScope<'_> {
    const RESOURCE: ResourceKind = ResourceKind::FieldStates;

    fn validate(&self) -> Result<(), RpcClientError> {
        Ok(())
    }
}

/// States under one access path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateScope<'a> {
    pub access_path: &'a AccessPath,
}

impl Serialize for StateScope<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self.access_path)
    }
}

impl QueryFilter for StateScope<'_> {
    const RESOURCE: ResourceKind = ResourceKind::States;

    fn validate(&self) -> Result<(), RpcClientError> {
        self.access_path.validate()
    }
}
