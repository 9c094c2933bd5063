//! # Inbound Ports
//!
//! What callers can ask of the client: paginated and point queries, and the
//! four ways to hand a transaction to the network.

use async_trait::async_trait;

use crate::domain::{
    AccessPath, BalanceInfoView, BroadcastOptions, EventFilter, EventOptions, ExecuteOptions,
    ExecutionOutcome, FieldEntry, IndexedState, InscriptionFilter, ModuleAbiView, ObjectId,
    ObjectStateFilter, Page, PageCursor, PageLimit, QueryOptions, RawTransaction, RepairScope,
    RepairType, ResolvedEvent, RpcClientError, SimulationOutcome, StateChangeSetView, StateOptions,
    StateSlot, SubmissionReceipt, SyncStateFilter, TransactionFilter, TransactionWithInfoView,
    TxHash, UtxoFilter,
};

/// Read-side API.
///
/// Every listing takes an optional cursor from a previous page of the same
/// listing and an optional limit. Results are never cached.
#[async_trait]
pub trait QueryApi: Send + Sync {
    async fn query_inscriptions(
        &self,
        filter: &InscriptionFilter,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        descending: bool,
    ) -> Result<Page<IndexedState>, RpcClientError>;

    async fn query_utxos(
        &self,
        filter: &UtxoFilter,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        descending: bool,
    ) -> Result<Page<IndexedState>, RpcClientError>;

    async fn get_balances(
        &self,
        owner: &str,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
    ) -> Result<Page<BalanceInfoView>, RpcClientError>;

    async fn query_events(
        &self,
        filter: &EventFilter,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        options: QueryOptions,
    ) -> Result<Page<ResolvedEvent>, RpcClientError>;

    async fn get_events_by_event_handle(
        &self,
        event_handle_type: &str,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        descending: bool,
        options: EventOptions,
    ) -> Result<Page<ResolvedEvent>, RpcClientError>;

    async fn query_object_states(
        &self,
        filter: &ObjectStateFilter,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        options: QueryOptions,
    ) -> Result<Page<IndexedState>, RpcClientError>;

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        options: QueryOptions,
    ) -> Result<Page<TransactionWithInfoView>, RpcClientError>;

    async fn get_transactions_by_order(
        &self,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        descending: bool,
    ) -> Result<Page<TransactionWithInfoView>, RpcClientError>;

    async fn sync_states(
        &self,
        filter: &SyncStateFilter,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        options: QueryOptions,
    ) -> Result<Page<StateChangeSetView>, RpcClientError>;

    async fn list_states(
        &self,
        access_path: &AccessPath,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        options: StateOptions,
    ) -> Result<Page<FieldEntry>, RpcClientError>;

    async fn list_field_states(
        &self,
        object_id: &ObjectId,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        options: StateOptions,
    ) -> Result<Page<FieldEntry>, RpcClientError>;

    /// One slot per state the path names, in path order.
    async fn get_states(
        &self,
        access_path: &AccessPath,
        options: StateOptions,
    ) -> Result<Vec<StateSlot>, RpcClientError>;

    /// One slot per key, in input order. Missing fields are `Absent`.
    async fn get_field_states(
        &self,
        object_id: &ObjectId,
        field_keys: &[String],
        options: StateOptions,
    ) -> Result<Vec<StateSlot>, RpcClientError>;

    async fn get_object_states(
        &self,
        object_ids: &[ObjectId],
        options: StateOptions,
    ) -> Result<Vec<StateSlot>, RpcClientError>;

    async fn get_transactions_by_hash(
        &self,
        tx_hashes: &[TxHash],
    ) -> Result<Vec<Option<TransactionWithInfoView>>, RpcClientError>;

    async fn get_balance(
        &self,
        owner: &str,
        coin_type: &str,
    ) -> Result<BalanceInfoView, RpcClientError>;

    async fn get_module_abi(
        &self,
        module_addr: &str,
        module_name: &str,
    ) -> Result<Option<ModuleAbiView>, RpcClientError>;

    /// Rebuilds indexer rows for one scope. Never retried by the client.
    async fn repair_indexer(
        &self,
        repair_type: RepairType,
        scope: &RepairScope,
    ) -> Result<(), RpcClientError>;
}

/// Write-side API.
#[async_trait]
pub trait SubmissionApi: Send + Sync {
    /// Simulates without side effects. VM failures are an `Ok` outcome.
    async fn dry_run(&self, tx: &RawTransaction) -> Result<SimulationOutcome, RpcClientError>;

    /// Hands the transaction over and returns at once.
    async fn send_raw_transaction(
        &self,
        tx: RawTransaction,
    ) -> Result<SubmissionReceipt, RpcClientError>;

    /// Waits for a terminal result or `SubmissionTimeout`.
    ///
    /// An indexer wait that fails or runs out of budget still returns the
    /// execution outcome, with `indexed` left false.
    async fn execute_raw_transaction(
        &self,
        tx: RawTransaction,
        options: ExecuteOptions,
    ) -> Result<ExecutionOutcome, RpcClientError>;

    /// Broadcasts a raw Bitcoin transaction, returning its txid.
    async fn broadcast_tx(
        &self,
        hex: &str,
        options: BroadcastOptions,
    ) -> Result<String, RpcClientError>;
}
