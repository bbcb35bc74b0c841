//! Error types for rolodex-core.

use thiserror::Error;

/// All errors that can arise while normalizing records or building writes.
///
/// A destination property that is missing or oddly shaped is *not* an error:
/// it reads as `None`. Every variant here is a defect the caller must not
/// swallow.
#[derive(Debug, Error)]
pub enum ContactError {
    /// A source record slipped past the eligibility filter without the shape
    /// the adapter relies on.
    #[error("malformed source record {resource_name:?}: {reason}")]
    MalformedSourceRecord {
        resource_name: String,
        reason: &'static str,
    },

    /// A change kind string that is neither `create` nor `update`.
    #[error("unknown change kind '{0}'; expected: create, update")]
    UnknownChangeKind(String),

    /// An update was requested against a contact with no destination page id.
    #[error("update target for contact {identity_key:?} has no destination page id")]
    MissingPageId { identity_key: Option<String> },

    /// Raw JSON could not be decoded into the declared record shape.
    #[error("record JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
