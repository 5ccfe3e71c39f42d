//! Error taxonomy for page fetches.
//!
//! Every failure a [`Paginator`](crate::paginator::Paginator) can hit while
//! loading a page is classified into one of four kinds.  Errors stop at the
//! paginator: they are stored in the [`ResultStore`](crate::store::ResultStore)
//! and the UI decides how to surface them.

use reqwest::StatusCode;
use thiserror::Error;

/// A failed page fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request URL could not be built from the configured base.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// The server answered with something other than `200 OK`.
    #[error("server responded with {0}")]
    ServerError(StatusCode),

    /// The body was not valid JSON or did not match the expected schema.
    #[error("response did not match the expected schema: {0}")]
    InvalidData(#[from] serde_json::Error),

    /// Any lower-level transport failure (DNS, timeout, connection reset).
    #[error("request failed: {0}")]
    Unknown(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Field-less mirror of [`FetchError`], handy for matching and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    ServerError,
    InvalidData,
    Unknown,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            FetchError::ServerError(_) => ErrorKind::ServerError,
            FetchError::InvalidData(_) => ErrorKind::InvalidData,
            FetchError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Text shown to the user in the error alert.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::InvalidUrl(_) => "Something went wrong building the request.".into(),
            FetchError::ServerError(_) => {
                "There was an error with the server. Please try again later".into()
            }
            FetchError::InvalidData(_) => "The data is invalid. Please try again later".into(),
            FetchError::Unknown(e) => e.to_string(),
        }
    }

    /// Whether a later attempt could plausibly succeed.
    ///
    /// Transport failures and 5xx responses are transient; a malformed URL or
    /// a schema mismatch will fail the same way every time.  Nothing retries
    /// automatically, the UI only uses this to phrase its hint.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Unknown(_) => true,
            FetchError::ServerError(status) => status.is_server_error(),
            FetchError::InvalidUrl(_) | FetchError::InvalidData(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Unknown(Box::new(e))
    }
}
