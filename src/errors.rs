use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PiazzaApiError {
    /// The remote login exchange did not report success.
    #[error("authentication failed: {0}")]
    AuthenticationError(String),
    /// An authenticated-only call was made before any login.
    #[error("you must authenticate before making any other requests")]
    NotAuthenticatedError,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The response envelope carried an `error`; `payload` is the whole envelope.
    #[error("{context}\nResponse: {payload}")]
    RequestError { context: String, payload: Value },
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("url error: {0}")]
    UrlError(String),
    #[error("regex error: {0}")]
    RegexError(String),
}

pub type Result<T, E = PiazzaApiError> = std::result::Result<T, E>;

impl PiazzaApiError {
    /// The remote error message, when this is a `RequestError` with a string `error`.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            PiazzaApiError::RequestError { payload, .. } => payload.get("error")?.as_str(),
            _ => None,
        }
    }
}
