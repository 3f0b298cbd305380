//! Correlator behavior against a scripted hub.

mod common;

use std::time::Duration;

use common::{frame_bytes, reply, MockHub};
use serde_json::{json, Value};
use spike_protocol::{encode_data, Method, METHOD_GET_HUB_INFO};
use spike_rpc::{RpcClient, RpcConfig, RpcError, TransportFault};

#[test]
fn test_request_frame_shape() {
    let mut client = RpcClient::new(MockHub::new());
    client.display_clear().unwrap();

    let hub = client.transport();
    let requests = hub.requests();
    assert_eq!(requests.len(), 1);
    let request = requests[0];
    assert_eq!(request.method, Some(Method::from("scratch.display_clear")));
    assert_eq!(request.params, Some(json!({})));
    let id = request.id.as_deref().unwrap();
    assert_eq!(id.len(), 4);
    assert!(id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'));
}

#[test]
fn test_hub_info_result() {
    let hub = MockHub::with_responder(|request| {
        assert_eq!(request.method, Some(Method::from(METHOD_GET_HUB_INFO)));
        vec![reply(
            request,
            json!({"firmware": {"version": [1, 3, 4]}, "runtime": {"version": [3, 0, 1]}}),
        )]
    });
    let mut client = RpcClient::new(hub);
    let info = client.hub_info().unwrap();
    assert_eq!(info.firmware.dotted(), "1.3.4");
    assert_eq!(info.runtime.dotted(), "3.0.1");
    assert_eq!(client.stats().requests_sent, 1);
}

#[test]
fn test_interleaved_tokens_resolve_on_own_token() {
    let hub = MockHub::with_responder(|request| {
        vec![
            frame_bytes(json!({"i": "other", "r": "not yours"})),
            frame_bytes(json!({"m": 0, "p": [1, 2, 3]})),
            reply(request, json!("yours")),
            frame_bytes(json!({"i": "later", "r": "also not yours"})),
        ]
    });
    let mut client = RpcClient::new(hub);

    let result = client.send_request("scratch.display_text", json!({"text": "hi"})).unwrap();
    assert_eq!(result, json!("yours"));
    assert_eq!(client.stats().frames_discarded, 2);
    // The frame after the response stays queued for whoever reads next.
    assert!(client.transport().pending() > 0);
}

#[test]
fn test_stale_frames_are_drained_before_sending() {
    let mut hub = MockHub::with_responder(|request| vec![reply(request, json!("fresh"))]);
    hub.queue(&frame_bytes(json!({"i": "stale", "r": "stale result"})));
    hub.queue(&frame_bytes(json!({"m": 2, "p": []})));
    hub.queue(&frame_bytes(json!({"m": "userProgram.print", "p": {"value": "eA=="}, "i": "zzzz_"})));

    let mut client = RpcClient::new(hub);
    let result = client.program_terminate().unwrap();

    assert_eq!(result, json!("fresh"));
    assert_eq!(client.stats().frames_discarded, 3);
    assert_eq!(client.transport().pending_at_write, vec![0]);
}

#[test]
fn test_missing_result_is_null() {
    let hub = MockHub::with_responder(|request| {
        vec![frame_bytes(json!({"i": request.id}))]
    });
    let mut client = RpcClient::new(hub);
    assert_eq!(client.remove_project(3).unwrap(), Value::Null);
}

#[test]
fn test_malformed_frames_do_not_block_response() {
    let hub = MockHub::with_responder(|request| {
        let mut bytes = b"{\"broken\r\xff\xfe\r".to_vec();
        bytes.extend(reply(request, json!(1)));
        vec![bytes]
    });
    let mut client = RpcClient::new(hub);
    assert_eq!(client.move_project(1, 2).unwrap(), json!(1));
    assert_eq!(client.stats().frames_malformed, 2);
}

#[test]
fn test_remote_error_is_recoverable() {
    let error = encode_data(br#"{"type":"error","message":"slot empty"}"#);
    let mut calls = 0;
    let hub = MockHub::with_responder(move |request| {
        calls += 1;
        if calls == 1 {
            vec![frame_bytes(json!({"i": request.id, "e": error.clone()}))]
        } else {
            vec![reply(request, json!("ok"))]
        }
    });
    let mut client = RpcClient::new(hub);

    match client.remove_project(9) {
        Err(RpcError::Remote(err)) => {
            assert_eq!(err.payload, json!({"type": "error", "message": "slot empty"}));
        }
        other => panic!("expected remote error, got {:?}", other),
    }

    // The connection is still usable for the next call in a batch.
    assert_eq!(client.remove_project(8).unwrap(), json!("ok"));
    assert_eq!(client.stats().requests_sent, 2);
}

#[test]
fn test_acknowledgment_is_bare_and_unanswered() {
    let mut hub = MockHub::new();
    hub.queue(&frame_bytes(json!({"m": 4, "p": []})));
    let mut client = RpcClient::new(hub);

    client.send_acknowledgment("ab12").unwrap();

    let hub = client.transport();
    let acks = hub.acknowledgments();
    assert_eq!(acks.len(), 1);
    assert_eq!(acks[0].id.as_deref(), Some("ab12"));
    assert_eq!(hub.written, vec!["{\"i\":\"ab12\",\"r\":null}\r".to_string()]);
    assert!(hub.requests().is_empty());
    assert_eq!(hub.pending_at_write, vec![0]);
    assert_eq!(client.stats().acknowledgments_sent, 1);
    assert_eq!(client.stats().frames_discarded, 1);
}

#[test]
fn test_write_failures_are_transport_faults() {
    let mut hub = MockHub::new();
    hub.fail_writes = true;
    let mut client = RpcClient::new(hub);

    match client.display_clear() {
        Err(RpcError::Transport { fault, .. }) => assert_eq!(fault, TransportFault::Write),
        other => panic!("expected write fault, got {:?}", other),
    }
    match client.send_acknowledgment("ab12") {
        Err(err @ RpcError::Transport { .. }) => {
            assert_eq!(err.fault_code(), Some(3));
            assert_eq!(err.exit_code(), 2);
        }
        other => panic!("expected acknowledge fault, got {:?}", other),
    }
}

#[test]
fn test_response_timeout_is_opt_in() {
    let hub = MockHub::with_responder(|_| Vec::new());
    let config = RpcConfig::default()
        .with_receive_timeout(Duration::from_millis(5))
        .with_response_timeout(Duration::from_millis(30));
    let mut client = RpcClient::with_config(hub, config);

    match client.display_text("hello") {
        Err(RpcError::ResponseTimeout { method, timeout }) => {
            assert_eq!(method, "scratch.display_text");
            assert_eq!(timeout, Duration::from_millis(30));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[test]
fn test_unexpected_result_shape_is_protocol_error() {
    let hub = MockHub::with_responder(|request| vec![reply(request, json!("nonsense"))]);
    let mut client = RpcClient::new(hub);
    match client.storage_status() {
        Err(err @ RpcError::Protocol(_)) => assert_eq!(err.exit_code(), 4),
        other => panic!("expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_close_releases_transport() {
    let mut client = RpcClient::new(MockHub::new());
    client.close().unwrap();
    assert!(client.into_transport().closed);
}

#[test]
fn test_error_field_of_any_type_resolves_the_request() {
    let hub = MockHub::with_responder(|request| {
        vec![frame_bytes(json!({"i": request.id, "e": {"code": 5}}))]
    });
    let mut client = RpcClient::new(hub);

    match client.program_terminate() {
        Err(RpcError::Remote(err)) => assert_eq!(err.payload, json!(r#"{"code":5}"#)),
        other => panic!("expected remote error, got {:?}", other),
    }
    assert_eq!(client.stats().frames_malformed, 0);
}
