//! # Cursor Pagination
//!
//! Every listing call shares one protocol: an opaque cursor, a positive limit
//! sent as a decimal string, and a direction flag.
//!
//! ## Cursor binding
//!
//! A [`PageCursor`] remembers the resource kind, direction and filter digest
//! it was produced under. Reusing it anywhere else fails with
//! `CursorMismatch` before the transport is touched.
//!
//! ## Page invariants
//!
//! - `has_next_page()` is true iff `next_cursor()` is present
//! - `data.len() <= limit` when a limit was sent
//! - with a cursor, every item lies strictly beyond it in the requested
//!   direction and items advance strictly inside the page

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use sha3::{Digest, Sha3_256};
use std::cmp::Ordering;
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;
use tracing::debug;

use super::errors::RpcClientError;

/// Listing resources served by the cursor protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Inscriptions,
    Utxos,
    Balances,
    Events,
    EventsByHandle,
    ObjectStates,
    Transactions,
    TransactionsByOrder,
    FieldStates,
    States,
    SyncStates,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 11] = [
        ResourceKind::Inscriptions,
        ResourceKind::Utxos,
        ResourceKind::Balances,
        ResourceKind::Events,
        ResourceKind::EventsByHandle,
        ResourceKind::ObjectStates,
        ResourceKind::Transactions,
        ResourceKind::TransactionsByOrder,
        ResourceKind::FieldStates,
        ResourceKind::States,
        ResourceKind::SyncStates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Inscriptions => "inscriptions",
            ResourceKind::Utxos => "utxos",
            ResourceKind::Balances => "balances",
            ResourceKind::Events => "events",
            ResourceKind::EventsByHandle => "events_by_handle",
            ResourceKind::ObjectStates => "object_states",
            ResourceKind::Transactions => "transactions",
            ResourceKind::TransactionsByOrder => "transactions_by_order",
            ResourceKind::FieldStates => "field_states",
            ResourceKind::States => "states",
            ResourceKind::SyncStates => "sync_states",
        }
    }

    /// Wire form of this resource's cursor.
    pub fn cursor_shape(&self) -> CursorShape {
        match self {
            ResourceKind::Inscriptions
            | ResourceKind::Utxos
            | ResourceKind::Balances
            | ResourceKind::ObjectStates => CursorShape::IndexerState,
            ResourceKind::Events => CursorShape::IndexerEvent,
            ResourceKind::EventsByHandle
            | ResourceKind::Transactions
            | ResourceKind::TransactionsByOrder
            | ResourceKind::SyncStates => CursorShape::Sequence,
            ResourceKind::FieldStates | ResourceKind::States => CursorShape::FieldKey,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a cursor is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    /// `{"tx_order": "..", "state_index": ".."}`
    IndexerState,
    /// `{"tx_order": "..", "event_index": ".."}`
    IndexerEvent,
    /// Decimal string of a sequence number.
    Sequence,
    /// Field key string, ordered by the server.
    FieldKey,
}

/// Indexer position of an object state.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexerStateId {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub tx_order: u64,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub state_index: u64,
}

/// Indexer position of an event.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexerEventId {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub tx_order: u64,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub event_index: u64,
}

/// Ordering key carried by a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorKey {
    /// Composite `(order, index)`, compared lexicographically.
    Indexed { order: u64, index: u64 },
    /// Single sequence number.
    Sequence(u64),
    /// Server-ordered key the client cannot compare.
    Opaque(String),
}

impl CursorKey {
    /// Compares two keys of the same kind. `None` when not comparable.
    pub fn compare(&self, other: &CursorKey) -> Option<Ordering> {
        match (self, other) {
            (
                CursorKey::Indexed { order, index },
                CursorKey::Indexed {
                    order: other_order,
                    index: other_index,
                },
            ) => Some((order, index).cmp(&(other_order, other_index))),
            (CursorKey::Sequence(a), CursorKey::Sequence(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Parses a server cursor of the given shape.
    pub fn from_wire(shape: CursorShape, value: &Value) -> Result<Self, String> {
        match shape {
            CursorShape::IndexerState => serde_json::from_value::<IndexerStateId>(value.clone())
                .map(CursorKey::from)
                .map_err(|e| format!("bad indexer state cursor {}: {}", value, e)),
            CursorShape::IndexerEvent => serde_json::from_value::<IndexerEventId>(value.clone())
                .map(CursorKey::from)
                .map_err(|e| format!("bad indexer event cursor {}: {}", value, e)),
            CursorShape::Sequence => match value {
                Value::String(s) => s
                    .parse::<u64>()
                    .map(CursorKey::Sequence)
                    .map_err(|e| format!("bad sequence cursor '{}': {}", s, e)),
                Value::Number(n) => n
                    .as_u64()
                    .map(CursorKey::Sequence)
                    .ok_or_else(|| format!("bad sequence cursor {}", n)),
                other => Err(format!("bad sequence cursor {}", other)),
            },
            CursorShape::FieldKey => match value {
                Value::String(s) if !s.is_empty() => Ok(CursorKey::Opaque(s.clone())),
                other => Err(format!("bad field key cursor {}", other)),
            },
        }
    }

    /// Encodes the key in the given shape, if the kinds agree.
    pub fn to_wire(&self, shape: CursorShape) -> Option<Value> {
        match (shape, self) {
            (CursorShape::IndexerState, CursorKey::Indexed { order, index }) => {
                serde_json::to_value(IndexerStateId {
                    tx_order: *order,
                    state_index: *index,
                })
                .ok()
            }
            (CursorShape::IndexerEvent, CursorKey::Indexed { order, index }) => {
                serde_json::to_value(IndexerEventId {
                    tx_order: *order,
                    event_index: *index,
                })
                .ok()
            }
            (CursorShape::Sequence, CursorKey::Sequence(n)) => Some(Value::String(n.to_string())),
            (CursorShape::FieldKey, CursorKey::Opaque(s)) => Some(Value::String(s.clone())),
            _ => None,
        }
    }
}

impl From<IndexerStateId> for CursorKey {
    fn from(id: IndexerStateId) -> Self {
        CursorKey::Indexed {
            order: id.tx_order,
            index: id.state_index,
        }
    }
}

impl From<IndexerEventId> for CursorKey {
    fn from(id: IndexerEventId) -> Self {
        CursorKey::Indexed {
            order: id.tx_order,
            index: id.event_index,
        }
    }
}

impl fmt::Display for CursorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorKey::Indexed { order, index } => write!(f, "({}, {})", order, index),
            CursorKey::Sequence(n) => write!(f, "{}", n),
            CursorKey::Opaque(s) => f.write_str(s),
        }
    }
}

/// Short SHA3-256 digest of a filter, binding cursors to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterDigest([u8; 8]);

impl FilterDigest {
    /// Digest of `filter` scoped to `resource`.
    pub fn of<F: Serialize + ?Sized>(resource: ResourceKind, filter: &F) -> Self {
        let mut hasher = Sha3_256::new();
        hasher.update(resource.as_str().as_bytes());
        hasher.update([0u8]);
        // Filters are plain enums of strings and integers and always serialize.
        if let Ok(bytes) = serde_json::to_vec(filter) {
            hasher.update(&bytes);
        }
        let digest = hasher.finalize();
        let mut out = [0u8; 8];
        out.copy_from_slice(&digest[..8]);
        Self(out)
    }
}

impl fmt::Display for FilterDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Opaque continuation token returned by a listing call.
///
/// Serializable so callers can persist it between requests. Only valid as
/// input to the same listing with the same filter and direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageCursor {
    resource: ResourceKind,
    descending: bool,
    filter_digest: FilterDigest,
    key: CursorKey,
}

impl PageCursor {
    pub(crate) fn bind(
        resource: ResourceKind,
        descending: bool,
        filter_digest: FilterDigest,
        key: CursorKey,
    ) -> Self {
        Self {
            resource,
            descending,
            filter_digest,
            key,
        }
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    /// Ordering key, for diagnostics.
    pub fn key(&self) -> &CursorKey {
        &self.key
    }

    /// Rejects reuse under another resource, direction or filter.
    pub fn ensure_bound_to(
        &self,
        resource: ResourceKind,
        descending: bool,
        filter_digest: FilterDigest,
    ) -> Result<(), RpcClientError> {
        if self.resource != resource {
            return Err(RpcClientError::CursorMismatch(format!(
                "cursor belongs to {}, not {}",
                self.resource, resource
            )));
        }
        if self.descending != descending {
            return Err(RpcClientError::CursorMismatch(format!(
                "cursor was produced in {} order",
                if self.descending { "descending" } else { "ascending" }
            )));
        }
        if self.filter_digest != filter_digest {
            return Err(RpcClientError::CursorMismatch(format!(
                "cursor was produced under filter {}, request uses {}",
                self.filter_digest, filter_digest
            )));
        }
        Ok(())
    }

    /// Wire encoding for this cursor's resource.
    pub fn to_wire(&self) -> Result<Value, RpcClientError> {
        self.key
            .to_wire(self.resource.cursor_shape())
            .ok_or_else(|| {
                RpcClientError::CursorMismatch(format!(
                    "cursor key {} cannot be encoded for {}",
                    self.key, self.resource
                ))
            })
    }
}

/// Positive page size, sent as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageLimit(NonZeroU64);

impl PageLimit {
    pub fn new(limit: u64) -> Result<Self, RpcClientError> {
        NonZeroU64::new(limit)
            .map(Self)
            .ok_or_else(|| RpcClientError::MalformedRequest("limit must be positive".into()))
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }

    pub fn to_wire(&self) -> String {
        self.0.to_string()
    }
}

impl FromStr for PageLimit {
    type Err = RpcClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s.trim().parse::<u64>().map_err(|_| {
            RpcClientError::MalformedRequest(format!("limit '{}' is not a decimal integer", s))
        })?;
        Self::new(n)
    }
}

impl fmt::Display for PageLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    data: Vec<T>,
    next_cursor: Option<PageCursor>,
}

impl<T> Page<T> {
    /// Builds a page. `has_next_page` follows from the cursor.
    pub fn new(data: Vec<T>, next_cursor: Option<PageCursor>) -> Self {
        Self { data, next_cursor }
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn next_cursor(&self) -> Option<&PageCursor> {
        self.next_cursor.as_ref()
    }

    pub fn has_next_page(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_parts(self) -> (Vec<T>, Option<PageCursor>) {
        (self.data, self.next_cursor)
    }

    /// Converts every item, keeping the cursor.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        let data = self.data.into_iter().map(f).collect::<Result<Vec<_>, E>>()?;
        Ok(Page {
            data,
            next_cursor: self.next_cursor,
        })
    }
}

/// Page as the server sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<Value>,
    pub has_next_page: bool,
}

/// Items that expose their position in the ordered set.
pub trait PageItem {
    /// `None` when the item carries no comparable key.
    fn cursor_key(&self) -> Option<CursorKey>;
}

/// Checks that keyed items advance strictly past `after` in the direction.
pub fn verify_progress<T: PageItem>(
    method: &'static str,
    items: &[T],
    after: Option<&CursorKey>,
    descending: bool,
) -> Result<(), RpcClientError> {
    let mut prev = after.cloned();
    for (position, item) in items.iter().enumerate() {
        let Some(key) = item.cursor_key() else {
            continue;
        };
        if let Some(prev_key) = &prev {
            if !advances(&key, prev_key, descending) {
                return Err(RpcClientError::unexpected(
                    method,
                    format!(
                        "item {} with key {} does not advance past {}",
                        position, key, prev_key
                    ),
                ));
            }
        }
        prev = Some(key);
    }
    Ok(())
}

fn advances(key: &CursorKey, prev: &CursorKey, descending: bool) -> bool {
    match key.compare(prev) {
        Some(Ordering::Greater) => !descending,
        Some(Ordering::Less) => descending,
        Some(Ordering::Equal) => false,
        None => true,
    }
}

/// Request-side pagination state for one listing call.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub method: &'static str,
    pub resource: ResourceKind,
    pub descending: bool,
    pub digest: FilterDigest,
    pub cursor: Option<&'a PageCursor>,
    pub limit: Option<PageLimit>,
}

impl<'a> PageContext<'a> {
    /// Validates cursor binding and returns its wire form.
    pub fn wire_cursor(&self) -> Result<Option<Value>, RpcClientError> {
        match self.cursor {
            Some(cursor) => {
                cursor.ensure_bound_to(self.resource, self.descending, self.digest)?;
                cursor.to_wire().map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn wire_limit(&self) -> Option<String> {
        self.limit.map(|l| l.to_wire())
    }

    /// Checks a server page against the protocol and binds its cursor.
    pub fn normalize<T: PageItem>(&self, view: PageView<T>) -> Result<Page<T>, RpcClientError> {
        if let Some(limit) = self.limit {
            if view.data.len() as u64 > limit.get() {
                return Err(RpcClientError::unexpected(
                    self.method,
                    format!("{} items returned for limit {}", view.data.len(), limit),
                ));
            }
        }

        let after = self.cursor.map(PageCursor::key);
        verify_progress(self.method, &view.data, after, self.descending)?;

        let next_cursor = match (view.has_next_page, view.next_cursor) {
            (true, None) | (true, Some(Value::Null)) => {
                return Err(RpcClientError::unexpected(
                    self.method,
                    "hasNextPage is true but nextCursor is missing",
                ));
            }
            (true, Some(raw)) => {
                if view.data.is_empty() {
                    return Err(RpcClientError::unexpected(
                        self.method,
                        "hasNextPage is true on an empty page",
                    ));
                }
                let key = CursorKey::from_wire(self.resource.cursor_shape(), &raw)
                    .map_err(|reason| RpcClientError::unexpected(self.method, reason))?;
                if let Some(prev) = after {
                    if !advances(&key, prev, self.descending) {
                        return Err(RpcClientError::unexpected(
                            self.method,
                            format!("next cursor {} does not advance past {}", key, prev),
                        ));
                    }
                }
                Some(PageCursor::bind(
                    self.resource,
                    self.descending,
                    self.digest,
                    key,
                ))
            }
            (false, dangling) => {
                if matches!(dangling, Some(ref v) if !v.is_null()) {
                    debug!(method = self.method, "dropping nextCursor on final page");
                }
                None
            }
        };

        Ok(Page::new(view.data, next_cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone)]
    struct Item(u64);

    impl PageItem for Item {
        fn cursor_key(&self) -> Option<CursorKey> {
            Some(CursorKey::Sequence(self.0))
        }
    }

    fn ctx<'a>(cursor: Option<&'a PageCursor>, limit: Option<u64>, descending: bool) -> PageContext<'a> {
        PageContext {
            method: "rooch_getTransactionsByOrder",
            resource: ResourceKind::TransactionsByOrder,
            descending,
            digest: FilterDigest::of(ResourceKind::TransactionsByOrder, &()),
            cursor,
            limit: limit.map(|l| PageLimit::new(l).unwrap()),
        }
    }

    fn view(items: &[u64], next: Option<Value>, has_next: bool) -> PageView<Item> {
        PageView {
            data: items.iter().copied().map(Item).collect(),
            next_cursor: next,
            has_next_page: has_next,
        }
    }

    #[test]
    fn test_limit_zero_rejected() {
        assert!(matches!(
            PageLimit::new(0),
            Err(RpcClientError::MalformedRequest(_))
        ));
        assert!("0".parse::<PageLimit>().is_err());
        assert_eq!("25".parse::<PageLimit>().unwrap().to_wire(), "25");
    }

    #[test]
    fn test_indexer_ids_accept_strings_and_numbers() {
        let a: IndexerStateId = serde_json::from_value(json!({"tx_order": "7", "state_index": "2"})).unwrap();
        let b: IndexerStateId = serde_json::from_value(json!({"tx_order": 7, "state_index": 2})).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_value(a).unwrap(),
            json!({"tx_order": "7", "state_index": "2"})
        );
    }

    #[test]
    fn test_indexed_keys_compare_lexicographically() {
        let a = CursorKey::Indexed { order: 1, index: 9 };
        let b = CursorKey::Indexed { order: 2, index: 0 };
        assert_eq!(a.compare(&b), Some(Ordering::Less));
        assert_eq!(CursorKey::Opaque("a".into()).compare(&CursorKey::Opaque("b".into())), None);
    }

    #[test]
    fn test_normalize_binds_cursor() {
        let page = ctx(None, Some(2), false)
            .normalize(view(&[1, 2], Some(json!("2")), true))
            .unwrap();
        assert!(page.has_next_page());
        let cursor = page.next_cursor().unwrap();
        assert_eq!(cursor.key(), &CursorKey::Sequence(2));
        assert_eq!(cursor.to_wire().unwrap(), json!("2"));
    }

    #[test]
    fn test_normalize_drops_dangling_cursor() {
        let page = ctx(None, Some(5), false)
            .normalize(view(&[1, 2], Some(json!("2")), false))
            .unwrap();
        assert!(!page.has_next_page());
        assert!(page.next_cursor().is_none());
    }

    #[test]
    fn test_normalize_rejects_missing_cursor_and_overflow() {
        let err = ctx(None, Some(5), false)
            .normalize(view(&[1, 2], None, true))
            .unwrap_err();
        assert!(matches!(err, RpcClientError::UnexpectedResponse { .. }));

        let err = ctx(None, Some(1), false)
            .normalize(view(&[1, 2], None, false))
            .unwrap_err();
        assert!(matches!(err, RpcClientError::UnexpectedResponse { .. }));
    }

    #[test]
    fn test_normalize_rejects_items_behind_cursor() {
        let cursor = PageCursor::bind(
            ResourceKind::TransactionsByOrder,
            false,
            FilterDigest::of(ResourceKind::TransactionsByOrder, &()),
            CursorKey::Sequence(5),
        );
        let err = ctx(Some(&cursor), None, false)
            .normalize(view(&[5, 6], None, false))
            .unwrap_err();
        assert!(matches!(err, RpcClientError::UnexpectedResponse { .. }));

        let desc_cursor = PageCursor::bind(
            ResourceKind::TransactionsByOrder,
            true,
            FilterDigest::of(ResourceKind::TransactionsByOrder, &()),
            CursorKey::Sequence(5),
        );
        let page = ctx(Some(&desc_cursor), None, true)
            .normalize(view(&[4, 3], None, false))
            .unwrap();
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn test_cursor_binding_checks() {
        let digest = FilterDigest::of(ResourceKind::Events, &"all");
        let cursor = PageCursor::bind(
            ResourceKind::Events,
            false,
            digest,
            CursorKey::Indexed { order: 1, index: 0 },
        );
        assert!(cursor.ensure_bound_to(ResourceKind::Events, false, digest).is_ok());
        assert!(matches!(
            cursor.ensure_bound_to(ResourceKind::Events, true, digest),
            Err(RpcClientError::CursorMismatch(_))
        ));
        assert!(matches!(
            cursor.ensure_bound_to(ResourceKind::Utxos, false, digest),
            Err(RpcClientError::CursorMismatch(_))
        ));
        let other = FilterDigest::of(ResourceKind::Events, &"sender");
        assert!(matches!(
            cursor.ensure_bound_to(ResourceKind::Events, false, other),
            Err(RpcClientError::CursorMismatch(_))
        ));
        assert_eq!(
            cursor.to_wire().unwrap(),
            json!({"tx_order": "1", "event_index": "0"})
        );
    }

    #[test]
    fn test_every_resource_has_shape() {
        for kind in ResourceKind::ALL {
            let _ = kind.cursor_shape();
            assert!(!kind.as_str().is_empty());
        }
    }
}
