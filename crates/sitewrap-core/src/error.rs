//! Error types for SiteWrap

use crate::types::Denied;
use thiserror::Error;

/// Result type alias for SiteWrap operations
pub type SiteWrapResult<T> = Result<T, SiteWrapError>;

/// Main error type for SiteWrap
#[derive(Error, Debug)]
pub enum SiteWrapError {
    #[error("Denied: {0}")]
    Denied(Denied),

    #[error("Configuration load failed: {0}")]
    ConfigLoad(String),

    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("WebView error: {0}")]
    WebView(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SiteWrapError {
    /// Create a new config load error
    pub fn config_load(msg: impl Into<String>) -> Self {
        Self::ConfigLoad(msg.into())
    }

    /// Create a new malformed URL error
    pub fn malformed_url(msg: impl Into<String>) -> Self {
        Self::MalformedUrl(msg.into())
    }

    /// Create a new window error
    pub fn window(msg: impl Into<String>) -> Self {
        Self::Window(msg.into())
    }

    /// Create a new WebView error
    pub fn webview(msg: impl Into<String>) -> Self {
        Self::WebView(msg.into())
    }

    /// The denial carried by this error, if it is one
    pub fn as_denied(&self) -> Option<&Denied> {
        match self {
            Self::Denied(denied) => Some(denied),
            _ => None,
        }
    }
}

impl From<Denied> for SiteWrapError {
    fn from(denied: Denied) -> Self {
        Self::Denied(denied)
    }
}
