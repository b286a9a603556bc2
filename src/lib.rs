//! # piazza-api
//!
//! An unofficial, blocking client for Piazza's internal API.
//!
//! Log in once through a [`Piazza`] client, then work with a class through
//! its [`Network`] handle. Every call is one JSON round trip through
//! [`rpc::PiazzaRpc`], which checks the session and turns remote errors into
//! [`PiazzaApiError::RequestError`].
//!
//! ```no_run
//! use piazza_api::{FeedFilter, Piazza};
//! use piazza_api::networking::EnvCredentials;
//!
//! let piazza = Piazza::new().expect("Failed to create client");
//! piazza.user_login_with(&EnvCredentials).expect("Failed to log in");
//! for class in piazza.get_user_classes().unwrap() {
//!     println!("{} {} (ta: {})", class.num, class.name, class.is_ta);
//! }
//! let network = piazza.network("hl5qm84dl4t3x2").unwrap();
//! let unread = network.get_filtered_feed(&FeedFilter::Unread).unwrap();
//! ```

pub mod config;
pub mod errors;
pub mod extraction;
pub mod network;
pub mod networking;
pub mod nonce;
pub mod piazza;
pub mod rpc;
pub mod types;
mod utils;

pub use config::{ApiTarget, ClientConfig};
pub use errors::{PiazzaApiError, Result};
pub use network::{Network, PostIter};
pub use piazza::Piazza;
pub use rpc::{PiazzaRpc, RpcCall};
pub use types::{FeedFilter, NewPost, PostRef, PostType, UserClass};
