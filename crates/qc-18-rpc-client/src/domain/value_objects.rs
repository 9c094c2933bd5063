//! # Domain Value Objects
//!
//! Validated identifiers shared by filters, access paths and submissions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::RpcClientError;

/// Length of a 32-byte hash rendered as hex (without prefix).
pub const HASH_HEX_LEN: usize = 64;

/// Strips an optional `0x`/`0X` prefix.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decodes a `0x`-prefixed (or bare) hex string.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(strip_hex_prefix(s))
}

/// Encodes bytes as a `0x`-prefixed lower-case hex string.
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// On-chain object identifier (`0x`-prefixed hex).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parses and normalizes an object id.
    pub fn new(s: impl AsRef<str>) -> Result<Self, RpcClientError> {
        let raw = s.as_ref().trim();
        let body = strip_hex_prefix(raw);
        if !is_hex(body) {
            return Err(RpcClientError::MalformedRequest(format!(
                "invalid object id '{}'",
                raw
            )));
        }
        Ok(Self(format!("0x{}", body.to_ascii_lowercase())))
    }

    /// The normalized `0x`-prefixed form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectId {
    type Err = RpcClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ObjectId::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Transaction hash (32 bytes, `0x`-prefixed hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHash(String);

impl TxHash {
    /// Parses a 32-byte hex hash.
    pub fn new(s: impl AsRef<str>) -> Result<Self, RpcClientError> {
        let raw = s.as_ref().trim();
        let body = strip_hex_prefix(raw);
        if body.len() != HASH_HEX_LEN || !is_hex(body) {
            return Err(RpcClientError::MalformedRequest(format!(
                "invalid transaction hash '{}'",
                raw
            )));
        }
        Ok(Self(format!("0x{}", body.to_ascii_lowercase())))
    }

    /// Builds a hash from a raw digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(encode_hex(&digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TxHash::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Tags one dispatched call in logs. UUID v7, so ids sort by issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Checks a Bitcoin txid (64 hex chars, no prefix).
pub fn validate_btc_txid(txid: &str) -> Result<(), RpcClientError> {
    if txid.len() != HASH_HEX_LEN || !is_hex(txid) {
        return Err(RpcClientError::MalformedRequest(format!(
            "invalid bitcoin txid '{}'",
            txid
        )));
    }
    Ok(())
}

/// Checks an owner/sender address: non-empty, no whitespace.
///
/// The server accepts several address encodings (hex, bech32, bitcoin), so
/// only the shape common to all of them is checked here.
pub fn validate_address(field: &str, address: &str) -> Result<(), RpcClientError> {
    if address.is_empty() || address.chars().any(char::is_whitespace) {
        return Err(RpcClientError::MalformedRequest(format!(
            "{} must be a non-empty address, got '{}'",
            field, address
        )));
    }
    Ok(())
}

/// Checks a Move type tag such as `0x3::coin::CoinInfo`.
pub fn validate_type_tag(field: &str, tag: &str) -> Result<(), RpcClientError> {
    if tag.split("::").count() < 3 || tag.chars().any(char::is_whitespace) {
        return Err(RpcClientError::MalformedRequest(format!(
            "{} must be a fully qualified type tag, got '{}'",
            field, tag
        )));
    }
    Ok(())
}

/// Serde helper: `Vec<ObjectId>` on the wire as `"0x1,0x2"`.
pub mod comma_separated {
    use super::ObjectId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ids: &[ObjectId], serializer: S) -> Result<S::Ok, S::Error> {
        let joined = ids
            .iter()
            .map(ObjectId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        serializer.serialize_str(&joined)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<ObjectId>, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.split(',')
            .filter(|part| !part.is_empty())
            .map(|part| ObjectId::new(part).map_err(serde::de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_normalizes() {
        let id = ObjectId::new("0xABcd").unwrap();
        assert_eq!(id.as_str(), "0xabcd");
        assert_eq!(ObjectId::new("1").unwrap().as_str(), "0x1");
    }

    #[test]
    fn test_object_id_rejects_garbage() {
        assert!(ObjectId::new("").is_err());
        assert!(ObjectId::new("0x").is_err());
        assert!(ObjectId::new("0xzz").is_err());
    }

    #[test]
    fn test_tx_hash_length() {
        let good = format!("0x{}", "a".repeat(64));
        assert!(TxHash::new(&good).is_ok());
        assert!(TxHash::new("0x1234").is_err());
    }

    #[test]
    fn test_request_ids_are_v7_and_unique() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn test_type_tag_validation() {
        assert!(validate_type_tag("event_type", "0x3::coin::CoinInfo").is_ok());
        assert!(validate_type_tag("event_type", "CoinInfo").is_err());
    }

    #[test]
    fn test_comma_separated_ids() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper(#[serde(with = "comma_separated")] Vec<ObjectId>);

        let ids = vec![ObjectId::new("0x1").unwrap(), ObjectId::new("0x2").unwrap()];
        let json = serde_json::to_string(&Wrapper(ids.clone())).unwrap();
        assert_eq!(json, "\"0x1,0x2\"");
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.0, ids);
    }
}
