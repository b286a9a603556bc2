//! Network-scoped calls and the params they send.

mod common;

use common::{MockTransport, body_json, logged_in};
use piazza_api::{FeedFilter, Network, NewPost, Piazza, PiazzaApiError, PostType, UserClass};
use serde_json::{Value, json};
use std::time::Duration;

const NID: &str = "hl5qm84dl4t3x2";

fn network(mock: &MockTransport) -> Network {
    Piazza::with_session(logged_in(mock)).network(NID).unwrap()
}

fn ok(result: Value) -> Value {
    json!({"result": result, "error": null})
}

#[test]
fn record_and_bare_id_send_the_same_body() {
    let mock = MockTransport::new();
    for _ in 0..4 {
        mock.reply_json(ok(json!({})));
    }
    let network = network(&mock);
    let record = json!({"id": "hx3k2", "subject": "Midterm", "nr": 12});

    network.create_followup(&record, "same here", false, false).unwrap();
    network.create_followup("hx3k2", "same here", false, false).unwrap();
    network.create_reply(&record, "thanks", true).unwrap();
    network.create_reply("hx3k2", "thanks", true).unwrap();

    let bodies: Vec<Value> = mock.requests().iter().map(body_json).collect();
    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[2], bodies[3]);
    assert_eq!(
        bodies[0],
        json!({
            "method": "content.create",
            "params": {
                "nid": NID,
                "cid": "hx3k2",
                "type": "followup",
                "subject": "same here",
                "content": "",
                "config": {"editor": "rte", "ionly": false},
                "anonymous": "no",
            },
        })
    );
    assert_eq!(bodies[2]["params"]["type"], "feedback");
    assert_eq!(bodies[2]["params"]["anonymous"], "yes");
}

#[test]
fn create_post_shapes_params() {
    let mock = MockTransport::new();
    mock.reply_json(ok(json!({"id": "new1"})));
    let network = network(&mock);
    let post = NewPost::new(PostType::Question, ["hw2"], "Q3?", "<p>How?</p>").anonymous(true);

    let created = network.create_post(&post).unwrap();

    assert_eq!(created["id"], "new1");
    assert_eq!(
        body_json(&mock.last_request()),
        json!({
            "method": "content.create",
            "params": {
                "nid": NID,
                "anonymous": "yes",
                "subject": "Q3?",
                "content": "<p>How?</p>",
                "folders": ["hw2"],
                "type": "question",
                "config": {"bypass_email": 0, "is_announcement": 0},
            },
        })
    );
}

#[test]
fn answers_and_moderation_calls() {
    let mock = MockTransport::new();
    for _ in 0..5 {
        mock.reply_json(ok(json!({})));
    }
    let network = network(&mock);

    network.create_instructor_answer(181, "Use induction.", 0, false).unwrap();
    network.create_student_answer(181, "Try n=1 first.", 1, true).unwrap();
    network.resolve_post(181).unwrap();
    network.pin_post(181, true).unwrap();
    network.add_feedback(181).unwrap();

    let bodies: Vec<Value> = mock.requests().iter().map(body_json).collect();
    assert_eq!(bodies[0]["method"], "content.answer");
    assert_eq!(bodies[0]["params"]["type"], "i_answer");
    assert_eq!(bodies[0]["params"]["revision"], 0);
    assert_eq!(bodies[1]["params"]["type"], "s_answer");
    assert_eq!(bodies[1]["params"]["anonymous"], "stud");
    assert_eq!(bodies[2]["method"], "content.mark_resolved");
    assert_eq!(bodies[2]["params"]["resolved"], "true");
    assert_eq!(bodies[3]["method"], "content.unpin");
    assert_eq!(bodies[4]["method"], "content.add_feedback");
    assert_eq!(bodies[4]["params"]["type"], "tag_good");
}

#[test]
fn mark_as_duplicate_resolves_both_posts() {
    let mock = MockTransport::new();
    mock.reply_json(ok(json!({"id": "dupe1", "nr": 40})))
        .reply_json(ok(json!({"id": "orig1", "nr": 12})))
        .reply_json(ok(json!({})));
    let network = network(&mock);

    network.mark_as_duplicate(40, 12, "asked before").unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(body_json(&requests[0])["params"]["cid"], 40);
    assert_eq!(body_json(&requests[1])["params"]["cid"], 12);
    assert_eq!(
        body_json(&requests[2]),
        json!({
            "method": "content.duplicate",
            "params": {"nid": NID, "cid_dupe": "dupe1", "cid_to": "orig1", "msg": "asked before"},
        })
    );
}

#[test]
fn mark_as_duplicate_needs_post_ids() {
    let mock = MockTransport::new();
    mock.reply_json(ok(json!({"nr": 40})));
    let network = network(&mock);

    match network.mark_as_duplicate(40, 12, "asked before").unwrap_err() {
        PiazzaApiError::RequestError { payload, .. } => assert_eq!(payload, json!({"nr": 40})),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(mock.request_count(), 1);
}

#[test]
fn invalid_filters_make_no_requests() {
    let mock = MockTransport::new();
    let network = network(&mock);

    assert!(FeedFilter::from_flags(true, false, true, "hw1").is_err());
    let err = network
        .get_filtered_feed(&FeedFilter::Folder(String::new()))
        .unwrap_err();
    assert!(matches!(err, PiazzaApiError::InvalidArgument(_)));
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn folder_filter_params() {
    let mock = MockTransport::new();
    mock.reply_json(ok(json!({"feed": []})));
    let network = network(&mock);

    network
        .get_filtered_feed(&FeedFilter::Folder("hw1".to_string()))
        .unwrap();

    assert_eq!(
        body_json(&mock.last_request()),
        json!({
            "method": "network.filter_feed",
            "params": {"nid": NID, "sort": "updated", "folder": 1, "filter_folder": "hw1"},
        })
    );
}

#[test]
fn feed_paging_params() {
    let mock = MockTransport::new();
    mock.reply_json(ok(json!({"feed": []})));
    let network = network(&mock);

    network.get_feed(20, 40).unwrap();

    assert_eq!(
        body_json(&mock.last_request())["params"],
        json!({"nid": NID, "limit": 20, "offset": 40, "sort": "updated"})
    );
}

#[test]
fn iter_all_posts_fetches_up_to_limit() {
    let mock = MockTransport::new();
    mock.reply_json(ok(json!({"feed": [{"id": "a"}, {"id": "b"}, {"id": "c"}]})))
        .reply_json(ok(json!({"id": "a", "nr": 1})))
        .reply_json(ok(json!({"id": "b", "nr": 2})));
    let network = network(&mock);

    let posts: Vec<Value> = network
        .iter_all_posts(Some(2), Duration::ZERO)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1]["nr"], 2);
    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(body_json(&requests[0])["params"]["limit"], 999_999);
    assert_eq!(body_json(&requests[2])["params"]["cid"], "b");
}

#[test]
fn iter_users_rejects_non_list_payload() {
    let mock = MockTransport::new();
    mock.reply_json(ok(json!({"unexpected": true})))
        .reply_json(ok(json!([{"id": "u1"}, {"id": "u2"}])));
    let network = network(&mock);

    let err = network.iter_users(["u1"]).unwrap_err();
    assert!(matches!(err, PiazzaApiError::RequestError { .. }));

    let users: Vec<Value> = network.iter_all_users().unwrap().collect();
    assert_eq!(users.len(), 2);
    assert_eq!(body_json(&mock.requests()[0])["params"]["ids"], json!(["u1"]));
}

#[test]
fn user_classes_from_status() {
    let mock = MockTransport::new();
    mock.reply_json(ok(json!({
        "id": "me1",
        "networks": [
            {
                "name": "Algorithms",
                "course_number": "CS 161",
                "term": "Fall 2026",
                "id": "net1",
                "prof_hash": {"me1": {}, "prof2": {}},
            },
            {
                "name": "Compilers",
                "course_number": "CS 143",
                "term": "Fall 2026",
                "id": "net2",
                "prof_hash": {"prof3": {}},
            },
        ],
    })));
    let piazza = Piazza::with_session(logged_in(&mock));

    let classes = piazza.get_user_classes().unwrap();

    assert_eq!(
        classes,
        vec![
            UserClass {
                name: "Algorithms".to_string(),
                num: "CS 161".to_string(),
                term: "Fall 2026".to_string(),
                nid: "net1".to_string(),
                is_ta: true,
            },
            UserClass {
                name: "Compilers".to_string(),
                num: "CS 143".to_string(),
                term: "Fall 2026".to_string(),
                nid: "net2".to_string(),
                is_ta: false,
            },
        ]
    );
    assert_eq!(body_json(&mock.last_request())["method"], "user.status");
}
