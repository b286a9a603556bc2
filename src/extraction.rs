//! Extraction of the few things we need out of Piazza's responses.
//!
//! The login exchange answers with HTML and inline scripts rather than JSON,
//! so the CSRF token and login error are pulled out with regexes. This is a
//! best-effort shim over whatever markup the site currently serves.
use crate::define_regex;
use crate::errors::{PiazzaApiError, Result};
use crate::types::UserClass;
use crate::utils::safe_static_regex;
use serde_json::Value;

define_regex!(
    CSRF_REGEX,
    CSRF_REGEX_TEXT,
    r#"(?i)CSRF_TOKEN\s*=\s*"?([^";\s]+)"#
);
define_regex!(
    ERROR_MSG_REGEX,
    ERROR_MSG_REGEX_TEXT,
    r#"(?i)var\s+ERROR_MSG\s*=\s*"?([^";]*)"#
);

/// Pull the CSRF token out of the `csrf_token` endpoint's script body
///
/// # Example
/// ```
/// use piazza_api::extraction::extract_csrf_token;
/// let token = extract_csrf_token(r#"CSRF_TOKEN = "abc123";"#).unwrap();
/// assert_eq!(token, "abc123");
/// ```
pub fn extract_csrf_token(body: &str) -> Result<String> {
    safe_static_regex(&CSRF_REGEX, CSRF_REGEX_TEXT)?
        .captures(body)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| PiazzaApiError::AuthenticationError("Could not get CSRF token".to_string()))
}

/// The `var ERROR_MSG = "..."` message embedded in a login page, if non-empty.
pub fn extract_login_error(body: &str) -> Result<Option<String>> {
    Ok(safe_static_regex(&ERROR_MSG_REGEX, ERROR_MSG_REGEX_TEXT)?
        .captures(body)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|msg| !msg.is_empty()))
}

/// A JSON login reply whose `result` is something other than `"OK"`.
pub fn extract_login_rejection(body: &str) -> Option<Value> {
    let envelope: Value = serde_json::from_str(body).ok()?;
    let result = envelope.as_object()?.get("result")?;
    (result != "OK").then_some(envelope)
}

/// Ids of every post summary in a feed payload.
pub fn feed_post_ids(feed: &Value) -> Vec<Value> {
    feed.get("feed")
        .and_then(Value::as_array)
        .map(|posts| posts.iter().filter_map(|p| p.get("id").cloned()).collect())
        .unwrap_or_default()
}

fn string_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Classes of the current user out of a `user.status` payload
///
/// `is_ta` holds when the user's id is one of the class's `prof_hash` keys.
pub fn extract_user_classes(status: &Value) -> Result<Vec<UserClass>> {
    let uid = status.get("id").and_then(Value::as_str).ok_or_else(|| {
        PiazzaApiError::RequestError {
            context: "User status has no user id.".to_string(),
            payload: status.clone(),
        }
    })?;
    let networks = match status.get("networks") {
        Some(Value::Array(networks)) => networks.as_slice(),
        _ => &[],
    };

    Ok(networks
        .iter()
        .map(|network| {
            let is_ta = match network.get("prof_hash") {
                Some(Value::Object(profs)) => profs.contains_key(uid),
                Some(Value::Array(profs)) => profs.iter().any(|p| p == uid),
                _ => false,
            };
            UserClass {
                name: string_field(network, "name"),
                num: string_field(network, "course_number"),
                term: string_field(network, "term"),
                nid: string_field(network, "id"),
                is_ta,
            }
        })
        .collect())
}
