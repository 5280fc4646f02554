use thiserror::Error;

//===========================
// region:      --- Error

/// Failures surfaced by the registry, the serialization proxy, and policy construction.
///
/// Sanitization itself never fails; see [`crate::sanex::sanitize_with`].
#[derive(Error, Debug)]
pub enum Error {
    /// A tag read from the wire corresponds to no form in the local registry.
    #[error("{tag} corresponds to no known error form")]
    UnknownTag { tag: String },

    /// A suppression configuration is missing required flags or has non-boolean values.
    #[error("malformed suppression policy: missing or invalid {missing:?}")]
    MalformedPolicy { missing: Vec<&'static str> },

    /// The wire text could not be read or written.
    #[error("wire format error: {0}")]
    Deser(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn unknown_tag(tag: impl Into<String>) -> Self {
        Self::UnknownTag { tag: tag.into() }
    }

    pub fn is_unknown_tag(&self) -> bool {
        matches!(self, Self::UnknownTag { .. })
    }
}

// endregion:   --- Error
