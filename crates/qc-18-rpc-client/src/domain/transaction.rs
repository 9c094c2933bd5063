//! # Transaction Submission
//!
//! ## Submission lifecycle
//!
//! ```text
//!   [Built] ──dry_run──→ [Simulated] (side-effect free, may repeat)
//!      │                      │
//!      └──────send/execute────┴──→ [Submitted]
//!                                      │
//!                     ┌────────────────┼───────────────┐
//!                     ↓                ↓               ↓
//!                 [Pending]       [Executed]      [Rejected]
//!                     │
//!          ┌──────────┼──────────┐
//!          ↓          ↓          ↓
//!     [Executed] [Rejected] [TimedOut]
//! ```
//!
//! `Submitted → TimedOut` is also legal: the execute call itself may not
//! return within the budget. `TimedOut` means the outcome is unknown.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::errors::RpcClientError;
use super::value_objects::{
    comma_separated, decode_hex, encode_hex, strip_hex_prefix, validate_address, ObjectId, TxHash,
};

/// Immutable bcs-encoded transaction bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct RawTransaction {
    bytes: Arc<[u8]>,
}

impl RawTransaction {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, RpcClientError> {
        let bytes: Vec<u8> = bytes.into();
        if bytes.is_empty() {
            return Err(RpcClientError::MalformedRequest(
                "transaction bytes are empty".into(),
            ));
        }
        Ok(Self {
            bytes: Arc::from(bytes),
        })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, RpcClientError> {
        let bytes = decode_hex(hex_str).map_err(|e| {
            RpcClientError::MalformedRequest(format!("transaction hex is invalid: {}", e))
        })?;
        Self::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `0x`-prefixed hex, as sent in `txBcsHex`.
    pub fn to_hex(&self) -> String {
        encode_hex(&self.bytes)
    }

    /// SHA3-256 of the bytes.
    pub fn tx_hash(&self) -> TxHash {
        TxHash::from_digest(Sha3_256::digest(&self.bytes).into())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for RawTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawTransaction")
            .field("len", &self.bytes.len())
            .field("tx_hash", &self.tx_hash().as_str())
            .finish()
    }
}

/// Server-side execution options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOptions {
    pub with_output: bool,
}

/// Client-side wait options for blocking execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Total budget for execution plus optional indexing wait.
    pub timeout: Duration,
    /// Poll `get_transactions_by_hash` until the indexer reports the tx.
    pub wait_for_indexing: bool,
    pub poll_interval: Duration,
    pub tx_options: TxOptions,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            wait_for_indexing: false,
            poll_interval: Duration::from_millis(500),
            tx_options: TxOptions::default(),
        }
    }
}

impl ExecuteOptions {
    pub fn validate(&self) -> Result<(), RpcClientError> {
        if self.timeout.is_zero() {
            return Err(RpcClientError::MalformedRequest(
                "execute timeout must be positive".into(),
            ));
        }
        if self.wait_for_indexing && self.poll_interval.is_zero() {
            return Err(RpcClientError::MalformedRequest(
                "poll interval must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Safety caps for `btc_broadcastTX`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BroadcastOptions {
    /// Maximum fee rate in BTC/kvB.
    pub maxfeerate: Option<f64>,
    /// Maximum amount (BTC) allowed in provably unspendable outputs.
    pub maxburnamount: Option<f64>,
}

impl BroadcastOptions {
    pub fn validate(&self) -> Result<(), RpcClientError> {
        for (name, cap) in [
            ("maxfeerate", self.maxfeerate),
            ("maxburnamount", self.maxburnamount),
        ] {
            if let Some(value) = cap {
                if !value.is_finite() || value < 0.0 {
                    return Err(RpcClientError::MalformedRequest(format!(
                        "{} must be a non-negative number, got {}",
                        name, value
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Checks a raw Bitcoin transaction hex string.
pub fn validate_bitcoin_hex(hex_str: &str) -> Result<(), RpcClientError> {
    let body = strip_hex_prefix(hex_str);
    if body.is_empty() || body.len() % 2 != 0 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RpcClientError::MalformedRequest(
            "bitcoin transaction must be non-empty even-length hex".into(),
        ));
    }
    Ok(())
}

/// Lifecycle position of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Built,
    Simulated,
    Submitted,
    Pending,
    Executed,
    Rejected,
    TimedOut,
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Executed | SubmissionState::Rejected | SubmissionState::TimedOut
        )
    }

    pub fn can_transition_to(&self, next: SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (self, next),
            (Built, Simulated)
                | (Simulated, Simulated)
                | (Built, Submitted)
                | (Simulated, Submitted)
                | (Submitted, Pending)
                | (Submitted, Executed)
                | (Submitted, Rejected)
                | (Submitted, TimedOut)
                | (Pending, Executed)
                | (Pending, Rejected)
                | (Pending, TimedOut)
        )
    }
}

/// Tracks one transaction through its lifecycle.
#[derive(Debug, Clone)]
pub struct TxSubmission {
    tx: RawTransaction,
    tx_hash: TxHash,
    state: SubmissionState,
    history: Vec<SubmissionState>,
}

impl TxSubmission {
    pub fn new(tx: RawTransaction) -> Self {
        let tx_hash = tx.tx_hash();
        Self {
            tx,
            tx_hash,
            state: SubmissionState::Built,
            history: vec![SubmissionState::Built],
        }
    }

    pub fn advance(&mut self, next: SubmissionState) -> Result<(), RpcClientError> {
        if !self.state.can_transition_to(next) {
            return Err(RpcClientError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn history(&self) -> &[SubmissionState] {
        &self.history
    }

    pub fn tx_hash(&self) -> &TxHash {
        &self.tx_hash
    }

    pub fn transaction(&self) -> &RawTransaction {
        &self.tx
    }
}

/// VM status kept on chain for an executed transaction.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VmStatus {
    Executed,
    OutOfGas,
    MoveAbort {
        location: String,
        #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
        abort_code: u64,
    },
    ExecutionFailure {
        location: String,
        function: u16,
        code_offset: u16,
    },
    MiscellaneousError,
}

impl VmStatus {
    pub fn is_executed(&self) -> bool {
        matches!(self, VmStatus::Executed)
    }
}

impl fmt::Display for VmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmStatus::Executed => f.write_str("executed"),
            VmStatus::OutOfGas => f.write_str("out of gas"),
            VmStatus::MoveAbort {
                location,
                abort_code,
            } => write!(f, "move abort {} at {}", abort_code, location),
            VmStatus::ExecutionFailure {
                location,
                function,
                code_offset,
            } => write!(
                f,
                "execution failure at {}::{}+{}",
                location, function, code_offset
            ),
            VmStatus::MiscellaneousError => f.write_str("miscellaneous error"),
        }
    }
}

/// VM diagnostics returned by a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmErrorInfo {
    pub error_message: String,
    #[serde(default)]
    pub execution_state: Vec<String>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOutputView {
    pub status: VmStatus,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub gas_used: u64,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// `rooch_dryRunRawTransaction` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DryRunResponseView {
    pub raw_output: RawOutputView,
    #[serde(default)]
    pub vm_error_info: Option<VmErrorInfo>,
}

/// Result of a simulation. Produced for success and for VM failure alike.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub tx_hash: TxHash,
    pub status: VmStatus,
    pub gas_used: u64,
    pub vm_error: Option<VmErrorInfo>,
    pub state: SubmissionState,
}

impl SimulationOutcome {
    pub fn succeeded(&self) -> bool {
        self.status.is_executed()
    }
}

/// Acknowledgement of a fire-and-forget send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Hash reported by the node.
    pub tx_hash: TxHash,
    /// Hash computed from the submitted bytes.
    pub local_hash: TxHash,
    pub state: SubmissionState,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceInfoView {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub tx_order: u64,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionInfoView {
    pub tx_hash: TxHash,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub gas_used: u64,
    pub status: VmStatus,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// `rooch_executeRawTransaction` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResponseView {
    pub sequence_info: SequenceInfoView,
    pub execution_info: ExecutionInfoView,
    #[serde(default)]
    pub output: Option<Value>,
}

/// Terminal result of a blocking execute.
///
/// A transaction that ran and aborted is `Rejected` here, not an `Err`: it
/// was sequenced and charged gas.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub tx_hash: TxHash,
    pub tx_order: u64,
    pub gas_used: u64,
    pub status: VmStatus,
    pub output: Option<Value>,
    /// Set only once the indexer has reported the transaction.
    pub indexed: bool,
}

impl ExecutionOutcome {
    pub fn state(&self) -> SubmissionState {
        if self.status.is_executed() {
            SubmissionState::Executed
        } else {
            SubmissionState::Rejected
        }
    }
}

impl From<ExecuteResponseView> for ExecutionOutcome {
    fn from(view: ExecuteResponseView) -> Self {
        Self {
            tx_hash: view.execution_info.tx_hash,
            tx_order: view.sequence_info.tx_order,
            gas_used: view.execution_info.gas_used,
            status: view.execution_info.status,
            output: view.output,
            indexed: false,
        }
    }
}

/// Indexer table to rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairType {
    ObjectState,
    Utxo,
    Inscription,
}

/// What `rooch_repairIndexer` should rebuild within a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairScope {
    Owner(String),
    ObjectId(#[serde(with = "comma_separated")] Vec<ObjectId>),
}

impl RepairScope {
    pub fn validate(&self) -> Result<(), RpcClientError> {
        match self {
            RepairScope::Owner(owner) => validate_address("owner", owner),
            RepairScope::ObjectId(ids) if ids.is_empty() => Err(RpcClientError::MalformedRequest(
                "repair scope must list at least one object id".into(),
            )),
            RepairScope::ObjectId(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tx() -> RawTransaction {
        RawTransaction::new(vec![1, 2, 3]).unwrap()
    }

    #[test]
    fn test_raw_transaction_hash_and_hex() {
        let tx = tx();
        assert_eq!(tx.to_hex(), "0x010203");
        assert_eq!(tx.tx_hash(), RawTransaction::from_hex("010203").unwrap().tx_hash());
        assert!(RawTransaction::new(Vec::new()).is_err());
        assert!(RawTransaction::from_hex("0xzz").is_err());
    }

    #[test]
    fn test_lifecycle_happy_path() {
        let mut sub = TxSubmission::new(tx());
        sub.advance(SubmissionState::Simulated).unwrap();
        sub.advance(SubmissionState::Submitted).unwrap();
        sub.advance(SubmissionState::Pending).unwrap();
        sub.advance(SubmissionState::Executed).unwrap();
        assert!(sub.state().is_terminal());
        assert_eq!(sub.history().len(), 5);
    }

    #[test]
    fn test_lifecycle_rejects_illegal_moves() {
        let mut sub = TxSubmission::new(tx());
        assert!(matches!(
            sub.advance(SubmissionState::Executed),
            Err(RpcClientError::InvalidTransition { .. })
        ));
        sub.advance(SubmissionState::Submitted).unwrap();
        sub.advance(SubmissionState::TimedOut).unwrap();
        assert!(sub.advance(SubmissionState::Executed).is_err());
        assert_eq!(sub.state(), SubmissionState::TimedOut);
    }

    #[test]
    fn test_vm_status_wire() {
        let status: VmStatus = serde_json::from_value(json!({"type": "outofgas"})).unwrap();
        assert_eq!(status, VmStatus::OutOfGas);
        let status: VmStatus = serde_json::from_value(json!({
            "type": "moveabort",
            "location": "0x3::account",
            "abort_code": "1001"
        }))
        .unwrap();
        assert!(matches!(status, VmStatus::MoveAbort { abort_code: 1001, .. }));
    }

    #[test]
    fn test_broadcast_options_validation() {
        assert!(BroadcastOptions::default().validate().is_ok());
        let bad = BroadcastOptions {
            maxfeerate: Some(-1.0),
            maxburnamount: None,
        };
        assert!(bad.validate().is_err());
        assert!(validate_bitcoin_hex("0200").is_ok());
        assert!(validate_bitcoin_hex("020").is_err());
        assert!(validate_bitcoin_hex("").is_err());
    }

    #[test]
    fn test_execution_outcome_state() {
        let view: ExecuteResponseView = serde_json::from_value(json!({
            "sequence_info": {"tx_order": "12", "tx_timestamp": "0"},
            "execution_info": {
                "tx_hash": format!("0x{}", "11".repeat(32)),
                "gas_used": "100",
                "status": {"type": "moveabort", "location": "0x1::m", "abort_code": "7"},
                "state_root": "0x00"
            }
        }))
        .unwrap();
        let outcome = ExecutionOutcome::from(view);
        assert_eq!(outcome.tx_order, 12);
        assert_eq!(outcome.state(), SubmissionState::Rejected);
    }
}
