//! Blocking session management for Piazza
use crate::config::ClientConfig;
use crate::errors::{PiazzaApiError, Result};
use crate::extraction::{extract_csrf_token, extract_login_error, extract_login_rejection};
use crate::networking::auth::{CredentialProvider, Credentials, SharedLink};
use crate::networking::client::blocking::BlockingTransport;
use crate::networking::client::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::networking::cookies::CookieJar;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use urlencoding::encode;

/// An authenticated (or not yet authenticated) connection to Piazza.
///
/// Owns the cookie jar; every request goes through [`Session::send`], which
/// attaches the cookies, records `Set-Cookie` replies and follows redirects.
/// The jar is behind a mutex so one session can be shared across threads.
pub struct Session {
    config: ClientConfig,
    transport: Box<dyn Transport>,
    jar: Mutex<CookieJar>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.config.base_url().as_str())
            .field("cookies", &self.jar().len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Session over the blocking `reqwest` transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = BlockingTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        let jar = CookieJar::new(config.cookie_domain());
        Self {
            config,
            transport: Box::new(transport),
            jar: Mutex::new(jar),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn jar(&self) -> MutexGuard<'_, CookieJar> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_authenticated(&self) -> bool {
        !self.jar().is_empty()
    }

    /// Fails with `NotAuthenticatedError` unless a login has happened.
    pub fn ensure_authenticated(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(PiazzaApiError::NotAuthenticatedError)
        }
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.jar().get(name).map(str::to_string)
    }

    /// Export the session cookies as plain name/value pairs.
    pub fn export_cookies(&self) -> BTreeMap<String, String> {
        self.jar().to_map()
    }

    /// Import cookies (from [`Session::export_cookies`] or a browser).
    pub fn import_cookies<K, V>(&self, cookies: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.jar().extend(cookies);
    }

    /// Write the cookies to `path` as a flat JSON object.
    pub fn save_cookies(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.export_cookies())?;
        fs::write(path.as_ref(), json)?;
        debug!("saved cookies to {}", path.as_ref().display());
        Ok(())
    }

    /// Read cookies written by [`Session::save_cookies`].
    pub fn load_cookies(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = fs::read_to_string(path.as_ref())?;
        let cookies: BTreeMap<String, String> = serde_json::from_str(&text)?;
        debug!("loaded {} cookies from {}", cookies.len(), path.as_ref().display());
        self.import_cookies(cookies);
        Ok(())
    }

    /// Login with email and password and keep the session cookie
    ///
    /// Fetches a CSRF token first, then posts the login form. On failure the
    /// cookie jar is left as it was before the attempt.
    ///
    /// # Example
    /// ```no_run
    /// use piazza_api::config::ClientConfig;
    /// use piazza_api::networking::Session;
    /// let session = Session::new(ClientConfig::default()).unwrap();
    /// session.login("student@example.edu", "hunter2").unwrap();
    /// ```
    pub fn login(&self, email: &str, password: &str) -> Result<()> {
        let before = self.jar().clone();
        let outcome = self.login_exchange(email, password);
        if outcome.is_err() {
            *self.jar() = before;
        }
        outcome
    }

    /// Login with whatever `provider` hands out.
    pub fn login_with(&self, provider: &dyn CredentialProvider) -> Result<()> {
        let Credentials { email, password } = provider.credentials()?;
        self.login(&email, &password)
    }

    fn login_exchange(&self, email: &str, password: &str) -> Result<()> {
        // get the csrf token
        let response = self.send(HttpRequest::get(self.config.csrf_url()?))?;
        let csrf_token = extract_csrf_token(&response.body)?;
        debug!("CSRF token acquired");

        let form = format!(
            "from=%2Fsignup&email={}&password={}&remember=on&csrf_token={}",
            encode(email),
            encode(password),
            encode(&csrf_token)
        );
        let request = HttpRequest::post(self.config.login_url()?, form)
            .with_header("Content-Type", "application/x-www-form-urlencoded");
        let response = self.send(request)?;

        if !response.is_success() {
            return Err(PiazzaApiError::AuthenticationError(format!(
                "Could not authenticate (HTTP {}).\n{}",
                response.status, response.body
            )));
        }
        // a 200 can still carry an error in the page
        if let Some(message) = extract_login_error(&response.body)? {
            return Err(PiazzaApiError::AuthenticationError(format!(
                "Could not authenticate.\n{message}"
            )));
        }
        if let Some(envelope) = extract_login_rejection(&response.body) {
            return Err(PiazzaApiError::AuthenticationError(format!(
                "Could not authenticate.\n{envelope}"
            )));
        }
        info!("logged in as {}", email);
        Ok(())
    }

    /// Authenticate with a "share your class" link as a demo user.
    pub fn login_via_shared_link(&self, link: &SharedLink) -> Result<()> {
        let url = match link {
            SharedLink::Url(url) => reqwest::Url::parse(url)
                .map_err(|e| PiazzaApiError::UrlError(format!("{url}: {e}")))?,
            SharedLink::Token { auth, network_id } => {
                let mut url = self.config.demo_login_url()?;
                {
                    let mut query = url.query_pairs_mut();
                    if let Some(nid) = network_id {
                        query.append_pair("nid", nid);
                    }
                    query.append_pair("auth", auth);
                }
                url
            }
        };

        let before = self.jar().clone();
        let outcome = self.demo_exchange(url);
        if outcome.is_err() {
            *self.jar() = before;
            return outcome;
        }
        if !self.is_authenticated() {
            warn!("demo login returned no session cookies");
        }
        info!("logged in through shared link");
        Ok(())
    }

    fn demo_exchange(&self, url: reqwest::Url) -> Result<()> {
        let response = self.send(HttpRequest::get(url))?;
        if !response.is_success() {
            return Err(PiazzaApiError::AuthenticationError(format!(
                "Demo login failed (HTTP {}).",
                response.status
            )));
        }
        Ok(())
    }

    /// Send `request` with the session cookies, following redirects.
    pub fn send(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        let mut hops = 0;
        loop {
            self.attach_cookies(&mut request);
            let response = self.transport.execute(request.clone())?;
            self.absorb_cookies(&request, &response);

            if !response.is_redirect() {
                return Ok(response);
            }
            if hops >= self.config.max_redirects {
                warn!("giving up after {} redirects at {}", hops, request.url);
                return Ok(response);
            }
            let Some(location) = response.header("location") else {
                return Ok(response);
            };
            let next = request
                .url
                .join(location)
                .map_err(|e| PiazzaApiError::UrlError(format!("{location}: {e}")))?;
            debug!("Following redirect to {}", next);

            let keep_method = matches!(response.status, 307 | 308);
            if !keep_method && request.method == HttpMethod::Post {
                request.method = HttpMethod::Get;
                request.body = None;
                request
                    .headers
                    .retain(|(k, _)| !k.eq_ignore_ascii_case("content-type"));
            }
            if next.host_str() != request.url.host_str() {
                // the session id travels in these; never hand them to another host
                request.headers.retain(|(k, _)| {
                    !k.eq_ignore_ascii_case("csrf-token") && !k.eq_ignore_ascii_case("cookie")
                });
            }
            request.url = next;
            hops += 1;
        }
    }

    fn attach_cookies(&self, request: &mut HttpRequest) {
        request.headers.retain(|(k, _)| !k.eq_ignore_ascii_case("cookie"));
        let jar = self.jar();
        let host = request.url.host_str().unwrap_or_default();
        if !jar.matches_host(host) {
            return;
        }
        if let Some(value) = jar.header_value() {
            request.headers.push(("Cookie".to_string(), value));
        }
    }

    fn absorb_cookies(&self, request: &HttpRequest, response: &HttpResponse) {
        let mut jar = self.jar();
        let host = request.url.host_str().unwrap_or_default();
        if !jar.matches_host(host) {
            return;
        }
        for header in response.set_cookies() {
            jar.store_set_cookie(header);
        }
    }
}
