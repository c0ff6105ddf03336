//! Command-line admin client for the employee API.

pub mod api;
pub mod form;
pub mod session;

use std::fmt;

pub use api::ApiClient;
pub use form::{filter_by_name, EmployeeDraft, ImageAttachment};
pub use session::{Session, SessionFile};

#[derive(Debug)]
pub enum ClientError {
    Http(reqwest::Error),
    Api { status: u16, message: String },
    Io(std::io::Error),
    Json(serde_json::Error),
    Url(url::ParseError),
    NotLoggedIn,
    Invalid(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Http(err) => write!(f, "Request failed: {}", err),
            ClientError::Api { status, message } => write!(f, "{} ({})", message, status),
            ClientError::Io(err) => write!(f, "I/O error: {}", err),
            ClientError::Json(err) => write!(f, "Invalid JSON: {}", err),
            ClientError::Url(err) => write!(f, "Invalid backend URL: {}", err),
            ClientError::NotLoggedIn => write!(f, "Not logged in, run `ems-admin login` first"),
            ClientError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Json(err)
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Url(err)
    }
}
