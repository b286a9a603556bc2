//! Session cookie storage
//!
//! Piazza only ever talks to one host, so the jar is a flat name -> value
//! map scoped to a single domain. `Set-Cookie` headers are parsed with the
//! `cookie` crate; only expiry is honoured, path and secure flags are not.

use cookie::Cookie;
use log::debug;
use std::collections::BTreeMap;
use time::OffsetDateTime;

fn is_expired(cookie: &Cookie<'_>) -> bool {
    if let Some(max_age) = cookie.max_age() {
        return !max_age.is_positive();
    }
    cookie
        .expires_datetime()
        .is_some_and(|expires| expires <= OffsetDateTime::now_utc())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    domain: String,
    cookies: BTreeMap<String, String>,
}

impl CookieJar {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            cookies: BTreeMap::new(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.cookies.remove(name)
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// Whether requests to `host` should carry these cookies.
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.');
        host == self.domain
            || host
                .strip_suffix(self.domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    /// Apply one `Set-Cookie` header value.
    ///
    /// A cookie whose `Max-Age` is zero or whose `Expires` date has passed
    /// removes any stored cookie of the same name.
    pub fn store_set_cookie(&mut self, header: &str) {
        let cookie = match Cookie::parse(header) {
            Ok(cookie) => cookie,
            Err(e) => {
                debug!("skipping malformed Set-Cookie ({e})");
                return;
            }
        };
        if cookie.name().is_empty() {
            return;
        }
        if is_expired(&cookie) {
            self.cookies.remove(cookie.name());
        } else {
            self.cookies
                .insert(cookie.name().to_string(), cookie.value_trimmed().to_string());
        }
    }

    /// `Cookie` request header value, `None` when the jar is empty.
    pub fn header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Plain key/value copy of the jar.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.cookies.clone()
    }

    pub fn extend<K, V>(&mut self, cookies: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in cookies {
            self.set(k, v);
        }
    }
}
