//! # State Resolution
//!
//! States always arrive as raw bytes plus a Move type tag. With `decode`
//! requested, each item also carries a decoded value or the reason it could
//! not be decoded.
//!
//! ```text
//! decode = false  ->  ResolvedState { raw, decoded: NotRequested }
//! decode = true   ->  ResolvedState { raw, decoded: Value(..) | Failed(..) }
//! missing key     ->  StateSlot::Absent
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::errors::{DecodeError, RpcClientError};
use super::pagination::{CursorKey, IndexerStateId, PageItem};
use super::value_objects::{decode_hex, ObjectId};

/// Options for state reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateOptions {
    /// Attach a decoded value (or decode error) to each state.
    pub decode: bool,
    /// Ask the server to render display fields.
    pub show_display: bool,
}

impl StateOptions {
    pub fn decoded() -> Self {
        Self {
            decode: true,
            show_display: false,
        }
    }
}

/// Options for indexer queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Walk the ordered set from the tail.
    #[serde(rename = "descending", alias = "descendingOrder")]
    pub descending_order: bool,
    /// Attach decoded values to items.
    pub decode: bool,
    /// Ask the server to render display fields.
    pub show_display: bool,
}

/// Options for event-handle reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOptions {
    pub decode: bool,
}

/// String-encoded locator for one or more states.
///
/// ```text
/// /object/0x1,0x2
/// /fields/0x1/key_a,key_b
/// /fields/0x1
/// /resource/0xa/0x3::account::Account
/// /module/0xa/coin
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessPath {
    /// One or more objects, in order.
    Objects(Vec<ObjectId>),
    /// Fields of an object. Empty `keys` means every field (listing only).
    Fields { object_id: ObjectId, keys: Vec<String> },
    /// A resource stored under an account.
    Resource { account: String, resource_type: String },
    /// A module published under an account.
    Module { account: String, name: String },
}

impl AccessPath {
    pub fn object(id: ObjectId) -> Self {
        AccessPath::Objects(vec![id])
    }

    pub fn fields(object_id: ObjectId, keys: Vec<String>) -> Self {
        AccessPath::Fields { object_id, keys }
    }

    /// Number of slots a point read over this path must return.
    pub fn expected_slots(&self) -> Option<usize> {
        match self {
            AccessPath::Objects(ids) => Some(ids.len()),
            AccessPath::Fields { keys, .. } if !keys.is_empty() => Some(keys.len()),
            AccessPath::Fields { .. } => None,
            AccessPath::Resource { .. } | AccessPath::Module { .. } => Some(1),
        }
    }

    pub fn validate(&self) -> Result<(), RpcClientError> {
        match self {
            AccessPath::Objects(ids) if ids.is_empty() => Err(RpcClientError::MalformedRequest(
                "access path must name at least one object".into(),
            )),
            AccessPath::Fields { keys, .. } => {
                for key in keys {
                    if key.is_empty() || key.contains([',', '/']) {
                        return Err(RpcClientError::MalformedRequest(format!(
                            "invalid field key '{}'",
                            key
                        )));
                    }
                }
                Ok(())
            }
            AccessPath::Resource {
                account,
                resource_type,
            } => {
                super::value_objects::validate_address("account", account)?;
                super::value_objects::validate_type_tag("resource_type", resource_type)
            }
            AccessPath::Module { account, name } => {
                super::value_objects::validate_address("account", account)?;
                if name.is_empty() || name.contains('/') {
                    return Err(RpcClientError::MalformedRequest(format!(
                        "invalid module name '{}'",
                        name
                    )));
                }
                Ok(())
            }
            AccessPath::Objects(_) => Ok(()),
        }
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessPath::Objects(ids) => {
                let joined = ids
                    .iter()
                    .map(ObjectId::as_str)
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "/object/{}", joined)
            }
            AccessPath::Fields { object_id, keys } if keys.is_empty() => {
                write!(f, "/fields/{}", object_id)
            }
            AccessPath::Fields { object_id, keys } => {
                write!(f, "/fields/{}/{}", object_id, keys.join(","))
            }
            AccessPath::Resource {
                account,
                resource_type,
            } => write!(f, "/resource/{}/{}", account, resource_type),
            AccessPath::Module { account, name } => write!(f, "/module/{}/{}", account, name),
        }
    }
}

impl FromStr for AccessPath {
    type Err = RpcClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || RpcClientError::MalformedRequest(format!("invalid access path '{}'", s));
        let rest = s.strip_prefix('/').ok_or_else(malformed)?;
        let mut parts = rest.splitn(3, '/');
        let kind = parts.next().ok_or_else(malformed)?;
        let first = parts.next().filter(|p| !p.is_empty()).ok_or_else(malformed)?;
        let second = parts.next();

        let path = match (kind, second) {
            ("object", None) => AccessPath::Objects(
                first
                    .split(',')
                    .map(ObjectId::new)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            ("fields", keys) => AccessPath::Fields {
                object_id: ObjectId::new(first)?,
                keys: keys
                    .map(|k| k.split(',').map(str::to_owned).collect())
                    .unwrap_or_default(),
            },
            ("resource", Some(resource_type)) => AccessPath::Resource {
                account: first.to_owned(),
                resource_type: resource_type.to_owned(),
            },
            ("module", Some(name)) => AccessPath::Module {
                account: first.to_owned(),
                name: name.to_owned(),
            },
            _ => return Err(malformed()),
        };
        path.validate()?;
        Ok(path)
    }
}

/// Object state as the server sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStateView {
    pub id: ObjectId,
    #[serde(default)]
    pub owner: Option<String>,
    pub object_type: String,
    /// `0x`-prefixed hex of the encoded value.
    pub value: String,
    #[serde(default)]
    pub decoded_value: Option<Value>,
    #[serde(default)]
    pub decode_error: Option<String>,
    #[serde(default)]
    pub display_fields: Option<Value>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Object state with its indexer position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerObjectStateView {
    pub indexer_id: IndexerStateId,
    #[serde(flatten)]
    pub state: ObjectStateView,
}

impl PageItem for IndexerObjectStateView {
    fn cursor_key(&self) -> Option<CursorKey> {
        Some(self.indexer_id.into())
    }
}

/// Key/state pair from a field or state listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateKvView {
    pub field_key: String,
    pub state: ObjectStateView,
}

impl PageItem for StateKvView {
    fn cursor_key(&self) -> Option<CursorKey> {
        None
    }
}

/// Decoding outcome attached to a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum Decoded {
    /// Raw only was requested.
    NotRequested,
    Value(Value),
    Failed(DecodeError),
}

impl Decoded {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Decoded::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&DecodeError> {
        match self {
            Decoded::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Raw encoded payload and its type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawState {
    pub value_type: String,
    pub bytes: Vec<u8>,
}

/// A state after the decode rule has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedState {
    pub id: ObjectId,
    pub owner: Option<String>,
    pub raw: RawState,
    pub decoded: Decoded,
    pub display_fields: Option<Value>,
}

/// Point-read result: present or absent at its input position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateSlot {
    Present(ResolvedState),
    Absent,
}

impl StateSlot {
    pub fn is_absent(&self) -> bool {
        matches!(self, StateSlot::Absent)
    }

    pub fn state(&self) -> Option<&ResolvedState> {
        match self {
            StateSlot::Present(state) => Some(state),
            StateSlot::Absent => None,
        }
    }
}

/// Listing item keyed by its field key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub field_key: String,
    pub state: ResolvedState,
}

/// Indexer listing item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedState {
    pub indexer_id: IndexerStateId,
    pub state: ResolvedState,
}

/// Decodes the hex payload of a state view.
pub fn raw_bytes(method: &'static str, hex_value: &str) -> Result<Vec<u8>, RpcClientError> {
    decode_hex(hex_value).map_err(|e| {
        RpcClientError::unexpected(method, format!("state value is not valid hex: {}", e))
    })
}
