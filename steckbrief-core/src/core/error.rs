//! Error types for the Steckbrief client core.

use thiserror::Error;

/// All errors that can occur while talking to the Personen API or driving
/// the profile view.
#[derive(Debug, Error)]
pub enum SteckbriefError {
    /// The request never produced an HTTP response (connection refused, DNS, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// A payload was rejected client-side before any request was sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The requested person does not exist on the backend.
    #[error("Person not found: {0}")]
    NotFound(i64),

    /// The backend answered with a non-2xx status.
    #[error("Server error {status}: {detail}")]
    Server { status: u16, detail: String },

    /// A response body did not have the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the settings file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings describe an unusable client (e.g. a malformed base URL).
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias that pins the error type to [`SteckbriefError`].
pub type Result<T> = std::result::Result<T, SteckbriefError>;

impl SteckbriefError {
    /// Returns a short, human-readable message suitable for a transient notice.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Server nicht erreichbar".to_string(),
            Self::Timeout(_) => "Zeitüberschreitung bei der Anfrage".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::NotFound(_) => "Person nicht gefunden".to_string(),
            Self::Server { status, detail } if detail.is_empty() => {
                format!("Serverfehler ({status})")
            }
            Self::Server { detail, .. } => detail.clone(),
            Self::Json(e) => format!("Ungültige Antwort: {e}"),
            Self::Io(e) => format!("Dateifehler: {e}"),
            Self::Config(msg) => format!("Konfigurationsfehler: {msg}"),
        }
    }

    /// True for failures where the backend was never reached or never answered.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}
