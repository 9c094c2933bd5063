//! Domain types for the RPC client.
//!
//! Pure protocol rules: cursors, filters, state resolution types, the
//! submission lifecycle and the method catalogue. No I/O here.

pub mod errors;
pub mod filters;
pub mod methods;
pub mod pagination;
pub mod params;
pub mod state;
pub mod transaction;
pub mod value_objects;
pub mod views;

// Re-exports for convenience
pub use errors::{codes, DecodeError, RpcClientError, TransportError};
pub use filters::{
    EventFilter, InscriptionFilter, ObjectStateFilter, QueryFilter, SyncStateFilter,
    TransactionFilter, UtxoFilter,
};
pub use methods::{get_method_info, is_method_supported, MethodCategory, MethodInfo, RpcMethod};
pub use pagination::{
    CursorKey, IndexerEventId, IndexerStateId, Page, PageCursor, PageLimit, ResourceKind,
};
pub use state::{
    AccessPath, Decoded, EventOptions, FieldEntry, IndexedState, QueryOptions, RawState,
    ResolvedState, StateOptions, StateSlot,
};
pub use transaction::{
    BroadcastOptions, ExecuteOptions, ExecutionOutcome, RawTransaction, RepairScope, RepairType,
    SimulationOutcome, SubmissionReceipt, SubmissionState, TxOptions, TxSubmission, VmErrorInfo,
    VmStatus,
};
pub use value_objects::{ObjectId, RequestId, TxHash};
pub use views::{
    BalanceInfoView, ModuleAbiView, ResolvedEvent, StateChangeSetView, TransactionWithInfoView,
};
