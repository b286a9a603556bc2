//! Shared helpers: a recording transport with canned replies.
#![allow(dead_code)]

use piazza_api::networking::{HttpRequest, HttpResponse, Session, Transport};
use piazza_api::{ClientConfig, Result};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct State {
    requests: Vec<HttpRequest>,
    replies: VecDeque<HttpResponse>,
}

/// Records every request and answers from a queue; an empty queue answers 500.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_full(&self, status: u16, headers: &[(&str, &str)], body: &str) -> &Self {
        self.state.lock().unwrap().replies.push_back(HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_string(),
        });
        self
    }

    pub fn reply(&self, status: u16, body: &str) -> &Self {
        self.reply_full(status, &[], body)
    }

    pub fn reply_json(&self, envelope: Value) -> &Self {
        self.reply(200, &envelope.to_string())
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        Ok(state.replies.pop_front().unwrap_or(HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: "no canned reply".to_string(),
        }))
    }
}

/// Anonymous session over `mock`, pointed at the production base URL.
pub fn session(mock: &MockTransport) -> Arc<Session> {
    Arc::new(Session::with_transport(ClientConfig::default(), mock.clone()))
}

/// Session that already holds a login cookie.
pub fn logged_in(mock: &MockTransport) -> Arc<Session> {
    let session = session(mock);
    session.import_cookies([("session_id", "sess-42"), ("piazza_session", "p1")]);
    session
}

pub fn body_json(request: &HttpRequest) -> Value {
    serde_json::from_str(request.body.as_deref().expect("request has no body"))
        .expect("request body is not JSON")
}

pub fn query_pairs(request: &HttpRequest) -> Vec<(String, String)> {
    request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
