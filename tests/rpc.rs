//! Envelope dispatch: URLs, headers, error unwrapping.

mod common;

use common::{MockTransport, body_json, logged_in, query_pairs, session};
use piazza_api::networking::HttpMethod;
use piazza_api::nonce::decode_base36;
use piazza_api::rpc::{PiazzaRpc, RpcCall};
use piazza_api::{Piazza, PiazzaApiError};
use serde_json::json;

const NID: &str = "hl5qm84dl4t3x2";

#[test]
fn anonymous_calls_fail_before_sending() {
    let mock = MockTransport::new();
    let rpc = PiazzaRpc::new(session(&mock), Some(NID));

    let err = rpc.content_get(181, None).unwrap_err();
    assert!(matches!(err, PiazzaApiError::NotAuthenticatedError));
    let err = rpc.get_user_status().unwrap_err();
    assert!(matches!(err, PiazzaApiError::NotAuthenticatedError));
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn network_handle_needs_login() {
    let mock = MockTransport::new();
    let piazza = Piazza::with_session(session(&mock));
    assert!(matches!(
        piazza.network(NID).unwrap_err(),
        PiazzaApiError::NotAuthenticatedError
    ));
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn ok_envelope_returns_result() {
    let mock = MockTransport::new();
    mock.reply_json(json!({"result": {"ok": true}, "error": null}));
    let rpc = PiazzaRpc::new(logged_in(&mock), Some(NID));

    let result = rpc.call(RpcCall::new("content.get").param("cid", 1)).unwrap();
    assert_eq!(result, json!({"ok": true}));
}

#[test]
fn error_envelope_is_request_error() {
    let mock = MockTransport::new();
    mock.reply_json(json!({"result": null, "error": "no such post"}));
    let rpc = PiazzaRpc::new(logged_in(&mock), Some(NID));

    let err = rpc.content_get(999, None).unwrap_err();
    match &err {
        PiazzaApiError::RequestError { context, payload } => {
            assert_eq!(context, "Could not get post 999.");
            assert_eq!(payload["error"], "no such post");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("no such post"));
}

#[test]
fn logic_calls_carry_method_and_nonce() {
    let mock = MockTransport::new();
    mock.reply_json(json!({"result": {}, "error": null}));
    let rpc = PiazzaRpc::new(logged_in(&mock), Some(NID));

    rpc.content_get(181, None).unwrap();

    let request = mock.last_request();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url.path(), "/logic/api");
    let query = query_pairs(&request);
    assert_eq!(query[0], ("method".to_string(), "content.get".to_string()));
    assert_eq!(query[1].0, "aid");
    assert!(decode_base36(&query[1].1).is_some_and(|aid| aid > 0));
    assert_eq!(
        body_json(&request),
        json!({
            "method": "content.get",
            "params": {"nid": NID, "cid": 181, "student_view": "false"},
        })
    );
}

#[test]
fn stats_go_to_main_api_without_query() {
    let mock = MockTransport::new();
    mock.reply_json(json!({"result": {"total_posts": 12}, "error": null}));
    let rpc = PiazzaRpc::new(logged_in(&mock), Some(NID));

    let stats = rpc.get_stats(None).unwrap();

    assert_eq!(stats["total_posts"], 12);
    let request = mock.last_request();
    assert_eq!(request.url.as_str(), "https://piazza.com/main/api");
    assert_eq!(body_json(&request)["method"], "network.get_stats");
}

#[test]
fn session_cookie_doubles_as_csrf_header() {
    let mock = MockTransport::new();
    mock.reply_json(json!({"result": {}, "error": null}));
    let rpc = PiazzaRpc::new(logged_in(&mock), None);

    rpc.get_user_status().unwrap();

    let request = mock.last_request();
    assert_eq!(request.header("csrf-token"), Some("sess-42"));
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(
        request.header("cookie"),
        Some("piazza_session=p1; session_id=sess-42")
    );
    assert_eq!(body_json(&request)["params"], json!({"nid": null}));
}

#[test]
fn per_call_network_id_overrides_default() {
    let mock = MockTransport::new();
    mock.reply_json(json!({"result": [], "error": null}));
    let rpc = PiazzaRpc::new(logged_in(&mock), Some(NID));

    rpc.search("midterm", Some("other")).unwrap();

    let body = body_json(&mock.last_request());
    assert_eq!(body["params"], json!({"nid": "other", "query": "midterm"}));
}

#[test]
fn roster_updates_use_id_key() {
    let mock = MockTransport::new();
    mock.reply_json(json!({"result": [], "error": null}))
        .reply_json(json!({"result": [], "error": null}));
    let rpc = PiazzaRpc::new(logged_in(&mock), Some(NID));

    rpc.add_students(&["new@example.edu".to_string()], None)
        .unwrap();
    rpc.remove_users(&["u1".to_string()], None).unwrap();

    let requests = mock.requests();
    assert_eq!(
        body_json(&requests[0])["params"],
        json!({"id": NID, "from": "ClassSettingsPage", "add_students": ["new@example.edu"]})
    );
    assert_eq!(
        body_json(&requests[1])["params"],
        json!({"id": NID, "remove_users": ["u1"]})
    );
}

#[test]
fn non_json_error_page_is_request_error() {
    let mock = MockTransport::new();
    mock.reply(500, "<html>Internal Server Error</html>");
    let rpc = PiazzaRpc::new(logged_in(&mock), Some(NID));

    match rpc.get_all_users(None).unwrap_err() {
        PiazzaApiError::RequestError { context, payload } => {
            assert!(context.contains("HTTP 500"));
            assert_eq!(payload, json!("<html>Internal Server Error</html>"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn non_json_success_is_serde_error() {
    let mock = MockTransport::new();
    mock.reply(200, "<html>maintenance</html>");
    let rpc = PiazzaRpc::new(logged_in(&mock), Some(NID));

    assert!(matches!(
        rpc.get_all_users(None).unwrap_err(),
        PiazzaApiError::SerdeError(_)
    ));
}

#[test]
fn invalid_filter_fails_locally() {
    let mock = MockTransport::new();
    let rpc = PiazzaRpc::new(logged_in(&mock), Some(NID));

    let err = rpc
        .filter_feed_flags(true, true, false, "", "updated", None)
        .unwrap_err();
    assert!(matches!(err, PiazzaApiError::InvalidArgument(_)));
    assert_eq!(mock.request_count(), 0);
}
