//! RPC dispatch for Piazza's internal API
//!
//! Every endpoint is a JSON envelope `{"method": ..., "params": {...}}`
//! posted to `/logic/api` (with a nonce) or `/main/api`, answered by
//! `{"result": ..., "error": ...}`. [`PiazzaRpc::call`] is the one place
//! that checks authentication and unwraps errors; the methods below it only
//! fix the method name and shape the params.

use crate::config::ApiTarget;
use crate::errors::{PiazzaApiError, Result};
use crate::networking::{HttpRequest, Session};
use crate::nonce;
use crate::types::FeedFilter;
use crate::utils::is_truthy;
use log::debug;
use serde_json::{Map, Value, json};
use std::sync::Arc;

pub const DEFAULT_NID_KEY: &str = "nid";
/// Page the web client asks `network.get_my_feed` for.
pub const MY_FEED_LIMIT: u32 = 150;
pub const MY_FEED_OFFSET: u32 = 20;
/// Cookie whose value doubles as the `CSRF-Token` header.
pub const SESSION_COOKIE: &str = "session_id";

/// One call to an API method.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcCall {
    pub method: String,
    pub params: Map<String, Value>,
    /// Overrides the dispatcher's network id.
    pub nid: Option<String>,
    pub nid_key: String,
    pub target: ApiTarget,
    /// Message put on the `RequestError` when the call fails.
    pub context: String,
}

impl RpcCall {
    pub fn new(method: impl Into<String>) -> Self {
        let method = method.into();
        Self {
            context: format!("Request {method} failed."),
            method,
            params: Map::new(),
            nid: None,
            nid_key: DEFAULT_NID_KEY.to_string(),
            target: ApiTarget::Logic,
        }
    }

    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// An empty id keeps the dispatcher's own.
    pub fn nid(mut self, nid: Option<&str>) -> Self {
        if let Some(nid) = nid.filter(|n| !n.is_empty()) {
            self.nid = Some(nid.to_string());
        }
        self
    }

    pub fn nid_key(mut self, key: impl Into<String>) -> Self {
        self.nid_key = key.into();
        self
    }

    pub fn target(mut self, target: ApiTarget) -> Self {
        self.target = target;
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// The request body. Caller params win over the network id entry.
    pub fn envelope(&self, default_nid: Option<&str>) -> Value {
        let nid = self.nid.as_deref().or(default_nid);
        let mut params = Map::new();
        params.insert(
            self.nid_key.clone(),
            nid.map_or(Value::Null, |n| Value::String(n.to_string())),
        );
        params.extend(self.params.clone());
        json!({
            "method": self.method,
            "params": params,
        })
    }
}

/// Unwrap a response envelope: its `result`, or a `RequestError` when `error` is set.
pub fn handle_error(envelope: Value, context: &str) -> Result<Value> {
    if envelope.get("error").is_some_and(is_truthy) {
        return Err(PiazzaApiError::RequestError {
            context: context.to_string(),
            payload: envelope,
        });
    }
    Ok(match envelope {
        Value::Object(mut map) => map.remove("result").unwrap_or(Value::Null),
        _ => Value::Null,
    })
}

/// The fields of a `json!` object literal.
pub(crate) fn into_params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn describe(params: &Map<String, Value>) -> String {
    format!("Could not create object {}.", Value::Object(params.clone()))
}

/// Dispatcher bound to a session and, optionally, a default network id.
#[derive(Debug, Clone)]
pub struct PiazzaRpc {
    session: Arc<Session>,
    nid: Option<String>,
}

impl PiazzaRpc {
    pub fn new(session: Arc<Session>, network_id: Option<&str>) -> Self {
        Self {
            session,
            nid: network_id.map(str::to_string),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn network_id(&self) -> Option<&str> {
        self.nid.as_deref()
    }

    /// Post `call` and return the raw response envelope.
    ///
    /// Fails with `NotAuthenticatedError` before touching the network when
    /// the session has not logged in.
    pub fn request(&self, call: &RpcCall) -> Result<Value> {
        self.session.ensure_authenticated()?;

        let config = self.session.config();
        let mut url = config.api_url(call.target)?;
        if call.target == ApiTarget::Logic {
            url.query_pairs_mut()
                .append_pair("method", &call.method)
                .append_pair("aid", &nonce::generate());
        }

        let body = serde_json::to_string(&call.envelope(self.nid.as_deref()))?;
        let mut request =
            HttpRequest::post(url, body).with_header("Content-Type", "application/json");
        if let Some(token) = self.session.cookie(SESSION_COOKIE) {
            request = request.with_header("CSRF-Token", token);
        }

        debug!("calling {}", call.method);
        let response = self.session.send(request)?;
        match serde_json::from_str(&response.body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !response.is_success() => Err(PiazzaApiError::RequestError {
                context: format!("{} (HTTP {})", call.context, response.status),
                payload: Value::String(response.body),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Post `call` and unwrap its result.
    pub fn call(&self, call: RpcCall) -> Result<Value> {
        let envelope = self.request(&call)?;
        handle_error(envelope, &call.context)
    }

    /// Get data from post `cid`
    pub fn content_get(&self, cid: impl Into<Value>, nid: Option<&str>) -> Result<Value> {
        let cid = cid.into();
        let context = format!("Could not get post {cid}.");
        self.call(
            RpcCall::new("content.get")
                .param("cid", cid)
                .param("student_view", "false")
                .nid(nid)
                .context(context),
        )
    }

    /// Create a post or followup.
    pub fn content_create(&self, params: Map<String, Value>) -> Result<Value> {
        let context = describe(&params);
        self.call(RpcCall::new("content.create").params(params).context(context))
    }

    /// Update a post or followup.
    pub fn content_update(&self, params: Map<String, Value>) -> Result<Value> {
        let context = describe(&params);
        self.call(RpcCall::new("content.update").params(params).context(context))
    }

    /// Answer a post as an instructor.
    pub fn content_instructor_answer(&self, params: Map<String, Value>) -> Result<Value> {
        let context = describe(&params);
        self.call(RpcCall::new("content.answer").params(params).context(context))
    }

    /// Answer a question as a student, or update an existing student answer.
    ///
    /// `revision` must be greater than the answer's current history size.
    pub fn content_student_answer(
        &self,
        cid: impl Into<Value>,
        content: &str,
        revision: u32,
        anonymous: bool,
    ) -> Result<Value> {
        let cid = cid.into();
        let context = format!("Could not update answer {cid}.");
        self.call(
            RpcCall::new("content.answer")
                .param("content", content)
                .param("type", "s_answer")
                .param("anonymous", if anonymous { "stud" } else { "no" })
                .param("revision", revision)
                .param("cid", cid)
                .context(context),
        )
    }

    pub fn content_mark_duplicate(&self, params: Map<String, Value>) -> Result<Value> {
        let context = describe(&params);
        self.call(RpcCall::new("content.duplicate").params(params).context(context))
    }

    pub fn content_mark_resolved(&self, params: Map<String, Value>) -> Result<Value> {
        let context = describe(&params);
        self.call(
            RpcCall::new("content.mark_resolved")
                .params(params)
                .context(context),
        )
    }

    pub fn content_pin(&self, params: Map<String, Value>, unpin: bool) -> Result<Value> {
        let method = if unpin { "content.unpin" } else { "content.pin" };
        let context = describe(&params);
        self.call(RpcCall::new(method).params(params).context(context))
    }

    pub fn content_delete(&self, params: Map<String, Value>) -> Result<Value> {
        let context = describe(&params);
        self.call(RpcCall::new("content.delete").params(params).context(context))
    }

    /// Mark a post as a good note.
    pub fn content_add_feedback(&self, params: Map<String, Value>) -> Result<Value> {
        let context = describe(&params);
        self.call(
            RpcCall::new("content.add_feedback")
                .params(params)
                .context(context),
        )
    }

    pub fn content_remove_feedback(&self, params: Map<String, Value>) -> Result<Value> {
        let context = describe(&params);
        self.call(
            RpcCall::new("content.remove_feedback")
                .params(params)
                .context(context),
        )
    }

    /// Enroll students by email; Piazza mails them activation instructions.
    ///
    /// Returns every user of the network, the new ones included.
    pub fn add_students(&self, student_emails: &[String], nid: Option<&str>) -> Result<Value> {
        self.call(
            RpcCall::new("network.update")
                .param("from", "ClassSettingsPage")
                .param("add_students", json!(student_emails))
                .nid(nid)
                .nid_key("id")
                .context("Could not add users."),
        )
    }

    pub fn get_all_users(&self, nid: Option<&str>) -> Result<Value> {
        self.call(
            RpcCall::new("network.get_all_users")
                .nid(nid)
                .context("Could not get users."),
        )
    }

    pub fn get_users(&self, user_ids: &[String], nid: Option<&str>) -> Result<Value> {
        self.call(
            RpcCall::new("network.get_users")
                .param("ids", json!(user_ids))
                .nid(nid)
                .context("Could not get users."),
        )
    }

    /// Returns the users remaining in the network.
    pub fn remove_users(&self, user_ids: &[String], nid: Option<&str>) -> Result<Value> {
        self.call(
            RpcCall::new("network.update")
                .param("remove_users", json!(user_ids))
                .nid(nid)
                .nid_key("id")
                .context("Could not remove users."),
        )
    }

    /// `limit` posts starting `offset` from the bottom of the feed
    ///
    /// The web client pages with [`MY_FEED_LIMIT`] and [`MY_FEED_OFFSET`].
    pub fn get_my_feed(
        &self,
        limit: u32,
        offset: u32,
        sort: &str,
        nid: Option<&str>,
    ) -> Result<Value> {
        self.call(
            RpcCall::new("network.get_my_feed")
                .param("limit", limit)
                .param("offset", offset)
                .param("sort", sort)
                .nid(nid)
                .context("Could not retrieve your feed."),
        )
    }

    pub fn filter_feed(&self, filter: &FeedFilter, sort: &str, nid: Option<&str>) -> Result<Value> {
        let params = filter.to_params()?;
        self.call(
            RpcCall::new("network.filter_feed")
                .param("sort", sort)
                .params(params)
                .nid(nid)
                .context("Could not retrieve filtered feed."),
        )
    }

    /// [`PiazzaRpc::filter_feed`] with one flag per filter kind; exactly one may be set.
    pub fn filter_feed_flags(
        &self,
        unread: bool,
        following: bool,
        folder: bool,
        filter_folder: &str,
        sort: &str,
        nid: Option<&str>,
    ) -> Result<Value> {
        let filter = FeedFilter::from_flags(unread, following, folder, filter_folder)?;
        self.filter_feed(&filter, sort, nid)
    }

    pub fn search(&self, query: &str, nid: Option<&str>) -> Result<Value> {
        self.call(
            RpcCall::new("network.search")
                .param("query", query)
                .nid(nid)
                .context(format!("Search with query '{query}' failed.")),
        )
    }

    /// Class statistics; served by the `main` API.
    pub fn get_stats(&self, nid: Option<&str>) -> Result<Value> {
        self.call(
            RpcCall::new("network.get_stats")
                .target(ApiTarget::Main)
                .nid(nid)
                .context("Could not retrieve stats for class."),
        )
    }

    pub fn get_user_profile(&self) -> Result<Value> {
        self.call(RpcCall::new("user_profile.get_profile").context("Could not get user profile."))
    }

    /// Status of the current user across every class they are enrolled in.
    pub fn get_user_status(&self) -> Result<Value> {
        self.call(RpcCall::new("user.status").context("Could not get user status."))
    }
}
