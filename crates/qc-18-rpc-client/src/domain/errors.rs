//! # Domain Errors
//!
//! Error taxonomy for queries and submissions, plus the JSON-RPC code table
//! used to classify node rejections.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::pagination::ResourceKind;
use super::transaction::SubmissionState;

/// JSON-RPC error codes seen on the wire.
pub mod codes {
    // JSON-RPC 2.0 standard errors (-32700 to -32600)
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server errors (-32000 to -32099)
    pub const SERVER_ERROR: i32 = -32000;

    // Bitcoin Core RPC errors, surfaced verbatim by btc_broadcastTX
    pub const RPC_DESERIALIZATION_ERROR: i32 = -22;
    pub const RPC_VERIFY_ERROR: i32 = -25;
    pub const RPC_VERIFY_REJECTED: i32 = -26;
    pub const RPC_VERIFY_ALREADY_IN_CHAIN: i32 = -27;
}

/// Errors raised by the transport collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    /// Could not reach the node or the connection dropped.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The node did not answer within the request timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error [{code}]: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i32,
        /// Error message
        message: String,
        /// Optional additional data
        data: Option<Value>,
    },

    /// The response was not valid JSON-RPC.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be encoded. Nothing was sent.
    #[error("Request encoding failed: {0}")]
    Encode(String),
}

/// Caller-facing error for every query and submission operation.
#[derive(Debug, Error)]
pub enum RpcClientError {
    /// Request rejected before reaching the transport.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// A cursor was reused with a different resource, filter or direction.
    #[error("Cursor mismatch: {0}")]
    CursorMismatch(String),

    /// The transport failed. Safe to retry for queries.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The cursor no longer points into the server's ordered set.
    #[error("Stale cursor for {resource}: {reason}")]
    StaleCursor {
        /// Resource the cursor belonged to
        resource: ResourceKind,
        /// Server-provided reason
        reason: String,
    },

    /// The server answered with something that breaks the protocol.
    #[error("Unexpected response from {method}: {reason}")]
    UnexpectedResponse {
        /// Method that produced the response
        method: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Blocking execute ran out of budget before the node answered.
    /// Transaction status is unknown.
    #[error("Submission {tx_hash} timed out after {waited:?}")]
    SubmissionTimeout {
        /// Locally computed transaction hash
        tx_hash: String,
        /// Time spent waiting
        waited: Duration,
    },

    /// The caller cancelled a blocking execute. Transaction status is unknown.
    #[error("Wait for {tx_hash} cancelled")]
    WaitCancelled {
        /// Locally computed transaction hash
        tx_hash: String,
    },

    /// The node refused the transaction before execution.
    #[error("Transaction rejected [{code}]: {reason}")]
    ChainRejected {
        /// Locally computed transaction hash, when known
        tx_hash: Option<String>,
        /// Node error code
        code: i32,
        /// Reason given by the node
        reason: String,
        /// Error data attached by the node
        data: Option<Value>,
    },

    /// Bitcoin node refused by policy (fee or burn caps, relay rules).
    #[error("Bitcoin broadcast rejected by policy [{code}]: {reason}")]
    BitcoinPolicyRejected {
        /// Node error code
        code: i32,
        /// Reason given by the node
        reason: String,
        /// Error data attached by the node
        data: Option<Value>,
    },

    /// Bitcoin node refused an invalid transaction.
    #[error("Bitcoin broadcast rejected as invalid [{code}]: {reason}")]
    BitcoinConsensusRejected {
        /// Node error code
        code: i32,
        /// Reason given by the node
        reason: String,
        /// Error data attached by the node
        data: Option<Value>,
    },

    /// Illegal submission lifecycle transition.
    #[error("Invalid submission transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Current state
        from: SubmissionState,
        /// Requested state
        to: SubmissionState,
    },
}

impl RpcClientError {
    /// True if the same request may be sent again unchanged.
    ///
    /// Only connectivity failures qualify. Callers must not resend a
    /// submission on this basis alone, see [`Self::outcome_unknown`].
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RpcClientError::Transport(TransportError::Connection(_))
                | RpcClientError::Transport(TransportError::Timeout(_))
        )
    }

    /// True if a submission may or may not have been applied on chain.
    ///
    /// Any transport failure after the request left the client counts,
    /// including JSON-RPC error objects that are not node rejections.
    pub fn outcome_unknown(&self) -> bool {
        match self {
            RpcClientError::SubmissionTimeout { .. } | RpcClientError::WaitCancelled { .. } => true,
            RpcClientError::Transport(err) => !matches!(err, TransportError::Encode(_)),
            _ => false,
        }
    }

    pub(crate) fn unexpected(method: &'static str, reason: impl Into<String>) -> Self {
        RpcClientError::UnexpectedResponse {
            method,
            reason: reason.into(),
        }
    }
}

/// Per-item decode failure. Attached to the item, never returned as `Err`.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeError {
    /// No layout is known for the value's type.
    #[error("no layout known for {value_type}")]
    MissingLayout {
        /// Move type tag of the value
        value_type: String,
    },

    /// Bytes do not match the layout.
    #[error("value does not match layout of {value_type}: {reason}")]
    SchemaMismatch {
        /// Move type tag of the value
        value_type: String,
        /// Decoder message
        reason: String,
    },

    /// The server reported a decode failure for this item.
    #[error("server failed to decode: {0}")]
    Server(String),
}

const STALE_CURSOR_HINTS: &[&str] = &["not found", "pruned", "stale", "no longer", "rolled back"];

/// Maps a listing transport failure, recognizing stale cursors.
///
/// Only requests that actually carried a cursor can produce `StaleCursor`.
pub fn classify_query_error(
    err: TransportError,
    resource: ResourceKind,
    had_cursor: bool,
) -> RpcClientError {
    if let TransportError::Rpc { message, .. } = &err {
        let lower = message.to_ascii_lowercase();
        if had_cursor
            && lower.contains("cursor")
            && STALE_CURSOR_HINTS.iter().any(|hint| lower.contains(hint))
        {
            return RpcClientError::StaleCursor {
                resource,
                reason: message.clone(),
            };
        }
    }
    RpcClientError::Transport(err)
}

const SERVER_ERROR_RANGE: std::ops::RangeInclusive<i32> = -32099..=-32000;

const WAIT_HINTS: &[&str] = &["timed out", "timeout", "deadline"];

/// Maps a submission transport failure.
///
/// Only server-range error objects carrying a validation or VM reason are
/// terminal rejections. Protocol errors (`-32700..=-32600`, `-32603`), server
/// errors that report a wait timeout and every other failure stay transport
/// errors, whose outcome is unknown.
pub fn classify_submission_error(err: TransportError, tx_hash: Option<&str>) -> RpcClientError {
    match err {
        TransportError::Rpc {
            code,
            message,
            data,
        } if SERVER_ERROR_RANGE.contains(&code) && !is_wait_timeout(&message) => {
            RpcClientError::ChainRejected {
                tx_hash: tx_hash.map(str::to_owned),
                code,
                reason: message,
                data,
            }
        }
        other => RpcClientError::Transport(other),
    }
}

fn is_wait_timeout(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    WAIT_HINTS.iter().any(|hint| lower.contains(hint))
}

const POLICY_HINTS: &[&str] = &[
    "max-fee-exceeded",
    "maxfeerate",
    "maxburnamount",
    "max-burn-amount",
    "min relay fee",
    "mempool min fee",
    "insufficient fee",
    "non-mandatory-script-verify-flag",
    "dust",
    "too-long-mempool-chain",
];

const CONSENSUS_HINTS: &[&str] = &[
    "mandatory-script-verify-flag-failed",
    "bad-txns",
    "missing-inputs",
    "missingorspent",
    "tx decode failed",
];

/// Maps a `btc_broadcastTX` failure into policy vs. consensus rejection.
pub fn classify_broadcast_error(err: TransportError) -> RpcClientError {
    let TransportError::Rpc {
        code,
        message,
        data,
    } = err
    else {
        return RpcClientError::Transport(err);
    };
    let lower = message.to_ascii_lowercase();

    // Policy first: node policy messages can embed consensus-looking fragments.
    if POLICY_HINTS.iter().any(|hint| lower.contains(hint)) {
        return RpcClientError::BitcoinPolicyRejected {
            code,
            reason: message,
            data,
        };
    }
    if CONSENSUS_HINTS.iter().any(|hint| lower.contains(hint)) {
        return RpcClientError::BitcoinConsensusRejected {
            code,
            reason: message,
            data,
        };
    }
    match code {
        codes::RPC_VERIFY_REJECTED => RpcClientError::BitcoinPolicyRejected {
            code,
            reason: message,
            data,
        },
        codes::RPC_VERIFY_ERROR
        | codes::RPC_DESERIALIZATION_ERROR
        | codes::RPC_VERIFY_ALREADY_IN_CHAIN => RpcClientError::BitcoinConsensusRejected {
            code,
            reason: message,
            data,
        },
        _ => RpcClientError::Transport(TransportError::Rpc {
            code,
            message,
            data,
        }),
    }
}
