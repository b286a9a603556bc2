//! One session shared by several threads.

mod common;

use common::{MockTransport, logged_in};
use piazza_api::networking::Session;
use piazza_api::{Network, Piazza, PiazzaRpc};
use serde_json::json;
use std::sync::Arc;
use std::thread;

const WORKERS: usize = 8;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn clients_are_send_and_sync() {
    assert_send_sync::<Session>();
    assert_send_sync::<Piazza>();
    assert_send_sync::<Network>();
    assert_send_sync::<PiazzaRpc>();
}

#[test]
fn shared_session_serialises_cookie_access() {
    let mock = MockTransport::new();
    for _ in 0..WORKERS {
        mock.reply_json(json!({"result": {"ok": true}, "error": null}));
    }
    let session = logged_in(&mock);

    let handles: Vec<_> = (0..WORKERS)
        .map(|i| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                session.import_cookies([(format!("worker_{i}"), i.to_string())]);
                let rpc = PiazzaRpc::new(Arc::clone(&session), Some("hl5qm84dl4t3x2"));
                let result = rpc.get_user_status().unwrap();
                assert_eq!(result, json!({"ok": true}));
                session.export_cookies()
            })
        })
        .collect();
    for handle in handles {
        let seen = handle.join().unwrap();
        assert_eq!(seen.get("session_id").map(String::as_str), Some("sess-42"));
    }

    let cookies = session.export_cookies();
    assert_eq!(cookies.len(), WORKERS + 2);
    for i in 0..WORKERS {
        assert_eq!(cookies[&format!("worker_{i}")], i.to_string());
    }
    let requests = mock.requests();
    assert_eq!(requests.len(), WORKERS);
    assert!(
        requests
            .iter()
            .all(|r| r.header("csrf-token") == Some("sess-42"))
    );
}
