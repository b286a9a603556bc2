//! # networking
//!
//! Everything between the endpoint wrappers and the wire:
//! - HTTP transport seam and the blocking `reqwest` implementation
//! - Cookie jar scoped to the service domain
//! - Credentials and the login session
//!
//! ## Usage - Blocking
//!
//! ```no_run
//! use piazza_api::config::ClientConfig;
//! use piazza_api::networking::{EnvCredentials, Session};
//!
//! let session = Session::new(ClientConfig::default()).expect("Failed to create session");
//! session.login_with(&EnvCredentials).expect("Failed to log in");
//! let cookies = session.export_cookies();
//! ```

// Module declarations
pub mod auth;
pub mod client;
pub mod cookies;

// Re-export commonly used items for convenience
pub use auth::blocking::Session;
pub use auth::{
    CredentialProvider, Credentials, EnvCredentials, FileCredentials, SharedLink, get_login_info,
};
pub use client::blocking::{BlockingTransport, create_client};
pub use client::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use cookies::CookieJar;

// Re-export types from dependencies for convenience
pub use reqwest::Error as NetworkError;
pub use reqwest::Url;
pub use reqwest::blocking::Client;
