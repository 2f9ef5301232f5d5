//! Error types for s3nav-core
//!
//! `Error` is the general crate error, convertible to an exit code. Listing and
//! export failures get their own types because the session reacts to them
//! differently: a listing failure breaks the connection, an export failure is
//! reported once and forgotten.

use thiserror::Error;

/// Result type alias for s3nav-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for s3nav-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid prefix or navigation target
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Bucket configuration not found
    #[error("Bucket not configured: {0}")]
    BucketNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) | Error::Config(_) | Error::InvalidUrl(_) => 2, // UsageError
            Error::Network(_) => 3,                                                // NetworkError
            Error::Auth(_) => 4,                                                   // AuthError
            Error::NotFound(_) | Error::BucketNotFound(_) => 5,                    // NotFound
            _ => 1,                                                                // GeneralError
        }
    }
}

/// Coarse classification of a failed listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingErrorKind {
    /// Network hiccup or server-side failure
    Transient,
    /// Credentials rejected
    AuthFailure,
    /// Bucket, endpoint or root folder are wrong
    Misconfigured,
}

/// A listing failure as reported to the session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ListingError {
    pub kind: ListingErrorKind,
    pub message: String,
    /// Advisory hint for the user; never changes control flow.
    pub likely_misconfiguration: bool,
}

/// Message fragments that point at a network-layer failure, usually a bad
/// endpoint or a blocked cross-origin request rather than a flaky link.
const NETWORK_FAILURE_MARKERS: &[&str] = &[
    "failed to fetch",
    "network",
    "dispatch failure",
    "connection refused",
    "cors",
];

impl ListingError {
    /// Classify a store client error
    pub fn classify(err: &Error) -> Self {
        let kind = match err {
            Error::Auth(_) => ListingErrorKind::AuthFailure,
            Error::NotFound(_)
            | Error::BucketNotFound(_)
            | Error::Config(_)
            | Error::InvalidPath(_)
            | Error::InvalidUrl(_) => ListingErrorKind::Misconfigured,
            _ => ListingErrorKind::Transient,
        };

        let message = err.to_string();
        let lowered = message.to_lowercase();
        let network_like = NETWORK_FAILURE_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker));

        Self {
            kind,
            message,
            likely_misconfiguration: network_like || kind == ListingErrorKind::Misconfigured,
        }
    }

    /// Message suitable for showing to a user
    pub fn user_message(&self) -> String {
        if self.likely_misconfiguration {
            format!(
                "{} (check the endpoint, bucket name and CORS/network settings)",
                self.message
            )
        } else {
            self.message.clone()
        }
    }
}

/// Export failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// Nothing selected that is still present in the folder
    #[error("Nothing selected to export")]
    EmptySelection,

    /// The archive builder failed
    #[error("Export failed: {reason}")]
    CollaboratorFailure { reason: String },
}

impl ExportError {
    /// Short reason string carried by the export-failed event
    pub fn reason(&self) -> String {
        match self {
            ExportError::EmptySelection => "empty selection".to_string(),
            ExportError::CollaboratorFailure { reason } => reason.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::InvalidPath("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::Network("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::BucketNotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::General("test".into()).exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = Error::BucketNotFound("photos".into());
        assert_eq!(err.to_string(), "Bucket not configured: photos");
    }

    #[test]
    fn test_classify_auth() {
        let err = ListingError::classify(&Error::Auth("InvalidAccessKeyId".into()));
        assert_eq!(err.kind, ListingErrorKind::AuthFailure);
        assert!(!err.likely_misconfiguration);
    }

    #[test]
    fn test_classify_network_is_flagged() {
        let err = ListingError::classify(&Error::Network("dispatch failure: io error".into()));
        assert_eq!(err.kind, ListingErrorKind::Transient);
        assert!(err.likely_misconfiguration);
        assert!(err.user_message().contains("CORS"));
    }

    #[test]
    fn test_classify_plain_transient() {
        let err = ListingError::classify(&Error::General("SlowDown".into()));
        assert_eq!(err.kind, ListingErrorKind::Transient);
        assert!(!err.likely_misconfiguration);
        assert_eq!(err.user_message(), "SlowDown");
    }

    #[test]
    fn test_classify_missing_bucket() {
        let err = ListingError::classify(&Error::NotFound("NoSuchBucket".into()));
        assert_eq!(err.kind, ListingErrorKind::Misconfigured);
        assert!(err.likely_misconfiguration);
    }

    #[test]
    fn test_export_error_reason() {
        assert_eq!(ExportError::EmptySelection.reason(), "empty selection");
        let err = ExportError::CollaboratorFailure {
            reason: "boom".into(),
        };
        assert_eq!(err.reason(), "boom");
        assert_eq!(err.to_string(), "Export failed: boom");
    }
}
