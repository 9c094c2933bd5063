//! Point reads and the decode rule.

mod common;

use common::{client, FakeNode, FIELD_TYPE, PARENT};
use qc_18_rpc_client::ports::MockLayoutDecoder;
use qc_18_rpc_client::{
    DecodeError, Decoded, ObjectId, QueryApi, RpcClientConfig, RpcClientService, StateOptions,
    StateSlot,
};
use std::sync::Arc;

fn parent() -> ObjectId {
    ObjectId::new(PARENT).unwrap()
}

fn keys(ks: &[&str]) -> Vec<String> {
    ks.iter().map(|k| k.to_string()).collect()
}

#[tokio::test]
async fn missing_fields_keep_their_position() {
    let (_node, svc) = client(FakeNode::new());
    let slots = svc
        .get_field_states(&parent(), &keys(&["a", "missing", "b"]), StateOptions::default())
        .await
        .unwrap();

    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].state().unwrap().raw.bytes, b"value-a");
    assert_eq!(slots[1], StateSlot::Absent);
    assert_eq!(slots[2].state().unwrap().raw.bytes, b"value-b");
}

#[tokio::test]
async fn decode_flag_never_changes_raw_bytes() {
    let (node, svc) = client(FakeNode::new());
    let requested = keys(&["c", "d"]);

    let raw = svc
        .get_field_states(&parent(), &requested, StateOptions::default())
        .await
        .unwrap();
    let decoded = svc
        .get_field_states(&parent(), &requested, StateOptions::decoded())
        .await
        .unwrap();

    for ((plain, rich), key) in raw.iter().zip(&decoded).zip(&requested) {
        let plain = plain.state().unwrap();
        let rich = rich.state().unwrap();
        assert_eq!(plain.raw, rich.raw);
        assert_eq!(plain.raw.bytes, node.field_bytes(key).unwrap());
        assert_eq!(plain.raw.value_type, FIELD_TYPE);
        assert_eq!(plain.decoded, Decoded::NotRequested);
        assert!(rich.decoded.value().is_some());
    }
}

#[tokio::test]
async fn local_decoder_fills_missing_server_decode() {
    let node = Arc::new(FakeNode::without_server_decoding());
    let svc = RpcClientService::new(RpcClientConfig::for_testing(), node)
        .unwrap()
        .with_decoder(Arc::new(MockLayoutDecoder::new().with_type(FIELD_TYPE)));

    let slots = svc
        .get_field_states(&parent(), &keys(&["a"]), StateOptions::decoded())
        .await
        .unwrap();
    let state = slots[0].state().unwrap();
    assert_eq!(state.decoded.value().unwrap()["type"], FIELD_TYPE);
    assert_eq!(state.raw.bytes, b"value-a");
}

#[tokio::test]
async fn undecodable_state_still_returns_raw() {
    let (_node, svc) = client(FakeNode::without_server_decoding());
    let slots = svc
        .get_field_states(&parent(), &keys(&["e"]), StateOptions::decoded())
        .await
        .unwrap();
    let state = slots[0].state().unwrap();
    assert_eq!(state.raw.bytes, b"value-e");
    assert!(matches!(
        state.decoded.error(),
        Some(DecodeError::MissingLayout { .. })
    ));
}
