//! Client configuration
//!
//! Everything the transport and session need to know about where the
//! service lives and how to talk to it. Defaults point at the production
//! service with no request timeout.

use crate::errors::{PiazzaApiError, Result};
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://piazza.com";
pub const DEFAULT_USER_AGENT: &str = concat!("piazza-api-rs/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Which API endpoint an RPC call goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiTarget {
    /// `/logic/api`, the endpoint nearly every method lives on.
    #[default]
    Logic,
    /// `/main/api`
    Main,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    pub user_agent: String,
    /// `None` blocks until the transport resolves.
    pub timeout: Option<Duration>,
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            // constant, always parses
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at `base_url` (scheme and host, optionally a path prefix).
    pub fn new(base_url: &str) -> Result<Self> {
        Self::default().with_base_url(base_url)
    }

    /// Read `PIAZZA_BASE_URL`, `PIAZZA_USER_AGENT` and `PIAZZA_TIMEOUT_SECS`
    /// from the environment, falling back to the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ClientConfig::from_env`] but with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("PIAZZA_BASE_URL") {
            config = config.with_base_url(&base_url)?;
        }
        if let Some(user_agent) = lookup("PIAZZA_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(timeout) = lookup("PIAZZA_TIMEOUT_SECS") {
            let secs: f64 = timeout.trim().parse().map_err(|_| {
                PiazzaApiError::InvalidArgument(format!(
                    "PIAZZA_TIMEOUT_SECS must be a number of seconds, got {timeout:?}"
                ))
            })?;
            config.timeout = Some(Duration::try_from_secs_f64(secs).map_err(|e| {
                PiazzaApiError::InvalidArgument(format!("PIAZZA_TIMEOUT_SECS: {e}"))
            })?);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| PiazzaApiError::UrlError(format!("{base_url}: {e}")))?;
        if url.host_str().is_none() {
            return Err(PiazzaApiError::UrlError(format!("{base_url}: missing host")));
        }
        self.base_url = url;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Host the session cookies are scoped to.
    pub fn cookie_domain(&self) -> &str {
        self.base_url.host_str().unwrap_or_default()
    }

    /// `<base>/<path>` keeping any path prefix of the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| PiazzaApiError::UrlError(format!("{joined}: {e}")))
    }

    pub fn api_url(&self, target: ApiTarget) -> Result<Url> {
        match target {
            ApiTarget::Logic => self.endpoint("logic/api"),
            ApiTarget::Main => self.endpoint("main/api"),
        }
    }

    pub fn csrf_url(&self) -> Result<Url> {
        self.endpoint("main/csrf_token")
    }

    pub fn login_url(&self) -> Result<Url> {
        self.endpoint("class")
    }

    pub fn demo_login_url(&self) -> Result<Url> {
        self.endpoint("demo_login")
    }
}
