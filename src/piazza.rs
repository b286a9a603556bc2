//! Top-level client: login, then hand out [`Network`] handles.

use crate::config::ClientConfig;
use crate::errors::Result;
use crate::extraction::extract_user_classes;
use crate::network::Network;
use crate::networking::{CredentialProvider, Session, SharedLink};
use crate::rpc::PiazzaRpc;
use crate::types::UserClass;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Unofficial client for Piazza's internal API
///
/// # Example
/// ```no_run
/// use piazza_api::Piazza;
/// let piazza = Piazza::new().unwrap();
/// piazza.user_login("student@example.edu", "hunter2").unwrap();
/// let class = piazza.network("hl5qm84dl4t3x2").unwrap();
/// let post = class.get_post(181).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Piazza {
    rpc: PiazzaRpc,
}

impl Piazza {
    /// Client for the production service.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self::with_session(Arc::new(Session::new(config)?)))
    }

    /// Client over an existing session; logins through either are shared.
    pub fn with_session(session: Arc<Session>) -> Self {
        Self {
            rpc: PiazzaRpc::new(session, None),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        self.rpc.session()
    }

    pub fn rpc(&self) -> &PiazzaRpc {
        &self.rpc
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    /// Login with email and password and keep the session cookie.
    pub fn user_login(&self, email: &str, password: &str) -> Result<()> {
        self.session().login(email, password)
    }

    /// Login with credentials from `provider` (environment, file, prompt...).
    pub fn user_login_with(&self, provider: &dyn CredentialProvider) -> Result<()> {
        self.session().login_with(provider)
    }

    /// Authenticate as a demo user from a "share your class" link
    ///
    /// Give either the bare `auth` token or the whole `url`, for example
    /// `https://piazza.com/demo_login?nid=hbj11a1gcvl1s6&auth=06c111b`.
    pub fn demo_login(&self, auth: Option<&str>, url: Option<&str>) -> Result<()> {
        let link = SharedLink::new(auth, url, None)?;
        self.session().login_via_shared_link(&link)
    }

    /// [`Network`] handle for `network_id`, the id in `https://piazza.com/class/{network_id}`.
    pub fn network(&self, network_id: &str) -> Result<Network> {
        self.session().ensure_authenticated()?;
        Ok(Network::new(network_id, self.session().clone()))
    }

    pub fn get_user_profile(&self) -> Result<Value> {
        self.rpc.get_user_profile()
    }

    /// Relationship of the current user to every class they are enrolled in.
    pub fn get_user_status(&self) -> Result<Value> {
        self.rpc.get_user_status()
    }

    /// The current user's classes, derived from their status.
    pub fn get_user_classes(&self) -> Result<Vec<UserClass>> {
        extract_user_classes(&self.get_user_status()?)
    }

    pub fn export_cookies(&self) -> BTreeMap<String, String> {
        self.session().export_cookies()
    }

    pub fn import_cookies(&self, cookies: BTreeMap<String, String>) {
        self.session().import_cookies(cookies);
    }

    pub fn save_cookies(&self, path: impl AsRef<Path>) -> Result<()> {
        self.session().save_cookies(path)
    }

    pub fn load_cookies(&self, path: impl AsRef<Path>) -> Result<()> {
        self.session().load_cookies(path)
    }
}
