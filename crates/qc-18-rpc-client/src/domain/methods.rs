//! Method catalogue of the node's JSON-RPC surface.
//!
//! Bitcoin: broadcast and the ordinal/UTXO indexer
//! Query: state, event, transaction and balance reads
//! Submission: dry run, send, execute
//! Admin: indexer repair
//! Chain: chain id, status, view functions (named only)

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use super::pagination::ResourceKind;

/// Every method the client knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    BroadcastTx,
    QueryInscriptions,
    QueryUtxos,
    DryRunRawTransaction,
    ExecuteRawTransaction,
    ExecuteViewFunction,
    GetBalance,
    GetBalances,
    GetChainId,
    GetEventsByEventHandle,
    GetFieldStates,
    GetModuleAbi,
    GetObjectStates,
    GetStates,
    GetTransactionsByHash,
    GetTransactionsByOrder,
    ListFieldStates,
    ListStates,
    QueryEvents,
    QueryObjectStates,
    QueryTransactions,
    RepairIndexer,
    SendRawTransaction,
    Status,
    SyncStates,
}

impl RpcMethod {
    pub const ALL: [RpcMethod; 25] = [
        RpcMethod::BroadcastTx,
        RpcMethod::QueryInscriptions,
        RpcMethod::QueryUtxos,
        RpcMethod::DryRunRawTransaction,
        RpcMethod::ExecuteRawTransaction,
        RpcMethod::ExecuteViewFunction,
        RpcMethod::GetBalance,
        RpcMethod::GetBalances,
        RpcMethod::GetChainId,
        RpcMethod::GetEventsByEventHandle,
        RpcMethod::GetFieldStates,
        RpcMethod::GetModuleAbi,
        RpcMethod::GetObjectStates,
        RpcMethod::GetStates,
        RpcMethod::GetTransactionsByHash,
        RpcMethod::GetTransactionsByOrder,
        RpcMethod::ListFieldStates,
        RpcMethod::ListStates,
        RpcMethod::QueryEvents,
        RpcMethod::QueryObjectStates,
        RpcMethod::QueryTransactions,
        RpcMethod::RepairIndexer,
        RpcMethod::SendRawTransaction,
        RpcMethod::Status,
        RpcMethod::SyncStates,
    ];

    /// Wire name.
    pub const fn name(&self) -> &'static str {
        match self {
            RpcMethod::BroadcastTx => "btc_broadcastTX",
            RpcMethod::QueryInscriptions => "btc_queryInscriptions",
            RpcMethod::QueryUtxos => "btc_queryUTXOs",
            RpcMethod::DryRunRawTransaction => "rooch_dryRunRawTransaction",
            RpcMethod::ExecuteRawTransaction => "rooch_executeRawTransaction",
            RpcMethod::ExecuteViewFunction => "rooch_executeViewFunction",
            RpcMethod::GetBalance => "rooch_getBalance",
            RpcMethod::GetBalances => "rooch_getBalances",
            RpcMethod::GetChainId => "rooch_getChainID",
            RpcMethod::GetEventsByEventHandle => "rooch_getEventsByEventHandle",
            RpcMethod::GetFieldStates => "rooch_getFieldStates",
            RpcMethod::GetModuleAbi => "rooch_getModuleABI",
            RpcMethod::GetObjectStates => "rooch_getObjectStates",
            RpcMethod::GetStates => "rooch_getStates",
            RpcMethod::GetTransactionsByHash => "rooch_getTransactionsByHash",
            RpcMethod::GetTransactionsByOrder => "rooch_getTransactionsByOrder",
            RpcMethod::ListFieldStates => "rooch_listFieldStates",
            RpcMethod::ListStates => "rooch_listStates",
            RpcMethod::QueryEvents => "rooch_queryEvents",
            RpcMethod::QueryObjectStates => "rooch_queryObjectStates",
            RpcMethod::QueryTransactions => "rooch_queryTransactions",
            RpcMethod::RepairIndexer => "rooch_repairIndexer",
            RpcMethod::SendRawTransaction => "rooch_sendRawTransaction",
            RpcMethod::Status => "rooch_status",
            RpcMethod::SyncStates => "rooch_syncStates",
        }
    }

    /// The listing method serving a resource kind.
    pub const fn for_listing(resource: ResourceKind) -> RpcMethod {
        match resource {
            ResourceKind::Inscriptions => RpcMethod::QueryInscriptions,
            ResourceKind::Utxos => RpcMethod::QueryUtxos,
            ResourceKind::Balances => RpcMethod::GetBalances,
            ResourceKind::Events => RpcMethod::QueryEvents,
            ResourceKind::EventsByHandle => RpcMethod::GetEventsByEventHandle,
            ResourceKind::ObjectStates => RpcMethod::QueryObjectStates,
            ResourceKind::Transactions => RpcMethod::QueryTransactions,
            ResourceKind::TransactionsByOrder => RpcMethod::GetTransactionsByOrder,
            ResourceKind::FieldStates => RpcMethod::ListFieldStates,
            ResourceKind::States => RpcMethod::ListStates,
            ResourceKind::SyncStates => RpcMethod::SyncStates,
        }
    }

    pub fn info(&self) -> Option<&'static MethodInfo> {
        get_method_info(self.name())
    }

    /// Reverse lookup from a wire name.
    pub fn from_name(name: &str) -> Option<RpcMethod> {
        get_method_info(name).map(|info| info.method)
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Method category for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodCategory {
    Bitcoin,
    Query,
    Submission,
    Admin,
    Chain,
}

/// Method metadata
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub method: RpcMethod,
    pub category: MethodCategory,
    /// Changes chain or indexer state.
    pub is_write: bool,
    /// Resource served, for cursor-paginated methods.
    pub paginated: Option<ResourceKind>,
    pub description: &'static str,
}

impl MethodInfo {
    const fn read(method: RpcMethod, category: MethodCategory, description: &'static str) -> Self {
        Self {
            method,
            category,
            is_write: false,
            paginated: None,
            description,
        }
    }

    const fn listing(
        method: RpcMethod,
        category: MethodCategory,
        resource: ResourceKind,
        description: &'static str,
    ) -> Self {
        Self {
            method,
            category,
            is_write: false,
            paginated: Some(resource),
            description,
        }
    }

    const fn write(method: RpcMethod, category: MethodCategory, description: &'static str) -> Self {
        Self {
            method,
            category,
            is_write: true,
            paginated: None,
            description,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.method.name()
    }
}

/// Method registry keyed by wire name.
pub static METHOD_REGISTRY: LazyLock<HashMap<&'static str, MethodInfo>> = LazyLock::new(|| {
    use MethodCategory::*;
    let methods = [
        // --- Bitcoin ---
        MethodInfo::write(RpcMethod::BroadcastTx, Bitcoin, "Broadcast a Bitcoin transaction"),
        MethodInfo::listing(
            RpcMethod::QueryInscriptions,
            Bitcoin,
            ResourceKind::Inscriptions,
            "Query inscriptions via the global index",
        ),
        MethodInfo::listing(
            RpcMethod::QueryUtxos,
            Bitcoin,
            ResourceKind::Utxos,
            "Query UTXOs via the global index",
        ),
        // --- Submission ---
        MethodInfo::read(
            RpcMethod::DryRunRawTransaction,
            Submission,
            "Simulate a signed transaction",
        ),
        MethodInfo::write(
            RpcMethod::ExecuteRawTransaction,
            Submission,
            "Submit a transaction and wait for execution",
        ),
        MethodInfo::write(
            RpcMethod::SendRawTransaction,
            Submission,
            "Submit a transaction without waiting",
        ),
        // --- Query ---
        MethodInfo::read(RpcMethod::GetBalance, Query, "Balance of one coin type"),
        MethodInfo::listing(
            RpcMethod::GetBalances,
            Query,
            ResourceKind::Balances,
            "Balances of an owner",
        ),
        MethodInfo::listing(
            RpcMethod::GetEventsByEventHandle,
            Query,
            ResourceKind::EventsByHandle,
            "Events by event handle type",
        ),
        MethodInfo::read(RpcMethod::GetFieldStates, Query, "Object fields by key"),
        MethodInfo::read(RpcMethod::GetModuleAbi, Query, "Module ABI"),
        MethodInfo::read(RpcMethod::GetObjectStates, Query, "Object states by id"),
        MethodInfo::read(RpcMethod::GetStates, Query, "States by access path"),
        MethodInfo::read(
            RpcMethod::GetTransactionsByHash,
            Query,
            "Transactions by hash",
        ),
        MethodInfo::listing(
            RpcMethod::GetTransactionsByOrder,
            Query,
            ResourceKind::TransactionsByOrder,
            "Transactions by sequence order",
        ),
        MethodInfo::listing(
            RpcMethod::ListFieldStates,
            Query,
            ResourceKind::FieldStates,
            "All fields of an object",
        ),
        MethodInfo::listing(
            RpcMethod::ListStates,
            Query,
            ResourceKind::States,
            "States under an access path",
        ),
        MethodInfo::listing(
            RpcMethod::QueryEvents,
            Query,
            ResourceKind::Events,
            "Query the event indexer",
        ),
        MethodInfo::listing(
            RpcMethod::QueryObjectStates,
            Query,
            ResourceKind::ObjectStates,
            "Query the object state indexer",
        ),
        MethodInfo::listing(
            RpcMethod::QueryTransactions,
            Query,
            ResourceKind::Transactions,
            "Query the transaction indexer",
        ),
        MethodInfo::listing(
            RpcMethod::SyncStates,
            Query,
            ResourceKind::SyncStates,
            "State change sets by tx order",
        ),
        // --- Admin ---
        MethodInfo::write(
            RpcMethod::RepairIndexer,
            Admin,
            "Rebuild indexer rows from states",
        ),
        // --- Chain ---
        MethodInfo::read(RpcMethod::GetChainId, Chain, "Chain id"),
        MethodInfo::read(RpcMethod::Status, Chain, "Chain and service status"),
        MethodInfo::read(
            RpcMethod::ExecuteViewFunction,
            Chain,
            "Read-only function call",
        ),
    ];

    methods.into_iter().map(|m| (m.name(), m)).collect()
});

/// Get method info by wire name
pub fn get_method_info(method: &str) -> Option<&'static MethodInfo> {
    METHOD_REGISTRY.get(method)
}

/// Check if a wire name is in the catalogue
pub fn is_method_supported(method: &str) -> bool {
    METHOD_REGISTRY.contains_key(method)
}

/// Check if method is a write operation
pub fn is_write_method(method: &str) -> bool {
    METHOD_REGISTRY
        .get(method)
        .map(|m| m.is_write)
        .unwrap_or(false)
}

/// All methods in a category
pub fn get_methods_by_category(category: MethodCategory) -> Vec<&'static str> {
    METHOD_REGISTRY
        .values()
        .filter(|m| m.category == category)
        .map(|m| m.name())
        .collect()
}
