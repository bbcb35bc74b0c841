//! Error types for rolodex-sync.

use std::path::PathBuf;

use thiserror::Error;

use rolodex_core::ContactError;

/// All errors that can arise from configuration, auth, transport, and sync
/// operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A record could not be normalized or a write could not be built.
    #[error("contact error: {0}")]
    Contact(#[from] ContactError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (token store).
    #[error("token store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error (config save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config file did not exist at the expected path.
    #[error("config not found at {path}; run `rolodex init` first")]
    ConfigNotFound { path: PathBuf },

    /// Config YAML parse error on load.
    #[error("failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required setting is empty after the config file and environment
    /// have both been consulted.
    #[error("missing required setting `{0}` (set it in config.yaml or the environment)")]
    MissingConfig(&'static str),

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The endpoint answered with an error status or could not be reached.
    #[error("HTTP error from {endpoint}{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Http {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// A response body could not be decoded.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// No refresh token is stored for the configured subject.
    #[error("no refresh token stored for '{subject}'; run `rolodex auth exchange <code>`")]
    NoRefreshToken { subject: String },

    /// The authorization server answered without the token we asked for.
    #[error("OAuth error: {0}")]
    OAuth(String),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convert a transport failure into [`SyncError::Http`], keeping the response
/// body of error statuses for the message.
pub(crate) fn http_err(endpoint: &str, err: ureq::Error) -> SyncError {
    match err {
        ureq::Error::Status(status, response) => SyncError::Http {
            endpoint: endpoint.to_owned(),
            status: Some(status),
            message: response
                .into_string()
                .unwrap_or_else(|e| format!("<unreadable body: {e}>")),
        },
        ureq::Error::Transport(transport) => SyncError::Http {
            endpoint: endpoint.to_owned(),
            status: None,
            message: transport.to_string(),
        },
    }
}

pub(crate) fn decode_err(endpoint: &str, source: std::io::Error) -> SyncError {
    SyncError::Decode {
        endpoint: endpoint.to_owned(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_message_includes_status_when_known() {
        let err = SyncError::Http {
            endpoint: "notion".to_string(),
            status: Some(401),
            message: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error from notion (status 401): unauthorized");

        let err = SyncError::Http {
            endpoint: "people".to_string(),
            status: None,
            message: "dns failure".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error from people: dns failure");
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(SyncError::HomeNotFound.to_string().contains("home directory"));
    }
}
