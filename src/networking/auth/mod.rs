//! Credentials and login arguments
//!
//! The session never prompts on its own: callers hand it credentials
//! directly or through a [`CredentialProvider`].

pub mod blocking;

use crate::errors::{PiazzaApiError, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const EMAIL_VAR: &str = "PIAZZA_EMAIL";
pub const PASSWORD_VAR: &str = "PIAZZA_PASSWORD";

/// Login information for Piazza authentication
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: Box<str>,
    pub password: Box<str>,
}

impl Credentials {
    pub fn new(email: impl Into<Box<str>>, password: impl Into<Box<str>>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Supplies credentials when a login needs them.
pub trait CredentialProvider {
    fn credentials(&self) -> Result<Credentials>;
}

impl CredentialProvider for Credentials {
    fn credentials(&self) -> Result<Credentials> {
        Ok(self.clone())
    }
}

impl<F> CredentialProvider for F
where
    F: Fn() -> Result<Credentials>,
{
    fn credentials(&self) -> Result<Credentials> {
        self()
    }
}

/// Reads `PIAZZA_EMAIL` and `PIAZZA_PASSWORD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Result<Credentials> {
        let read = |var: &str| {
            std::env::var(var)
                .map_err(|_| PiazzaApiError::InvalidArgument(format!("{var} is not set")))
        };
        Ok(Credentials::new(read(EMAIL_VAR)?, read(PASSWORD_VAR)?))
    }
}

/// Reads a login file: email on the first line, password on the second.
#[derive(Debug, Clone)]
pub struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for FileCredentials {
    fn credentials(&self) -> Result<Credentials> {
        get_login_info(&self.path)
    }
}

/// Get login information from text file at provided path
///
/// # Example
/// ```no_run
/// use piazza_api::networking::get_login_info;
/// let info = get_login_info("login.txt").unwrap();
/// ```
pub fn get_login_info(path: impl AsRef<Path>) -> Result<Credentials> {
    let path = path.as_ref();
    let file = fs::read_to_string(path)?;
    let mut lines = file.lines().map(str::trim);
    let mut next = |what: &str| {
        lines
            .next()
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| {
                PiazzaApiError::InvalidArgument(format!("{what} not found in {}", path.display()))
            })
    };
    let email = next("Email")?;
    let password = next("Password")?;
    Ok(Credentials::new(email, password))
}

/// A validated "share your class" login target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharedLink {
    /// Bare `auth` token, optionally tied to a network id.
    Token {
        auth: String,
        network_id: Option<String>,
    },
    /// Full demo-login URL as handed out by Piazza.
    Url(String),
}

impl SharedLink {
    /// Exactly one of `auth` and `url` must be given.
    pub fn new(auth: Option<&str>, url: Option<&str>, network_id: Option<&str>) -> Result<Self> {
        let auth = auth.filter(|a| !a.is_empty());
        let url = url.filter(|u| !u.is_empty());
        match (auth, url) {
            (Some(auth), None) => Ok(SharedLink::Token {
                auth: auth.to_string(),
                network_id: network_id.map(str::to_string),
            }),
            (None, Some(url)) => Ok(SharedLink::Url(url.to_string())),
            (Some(_), Some(_)) => Err(PiazzaApiError::InvalidArgument(
                "provide either an auth token or a url, not both".to_string(),
            )),
            (None, None) => Err(PiazzaApiError::InvalidArgument(
                "an auth token or a url is required".to_string(),
            )),
        }
    }
}
