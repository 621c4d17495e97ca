//! Error types for loading and model construction.
//!
//! Every failure here is fatal: the loader and the builder stop at the first
//! problem and no partial model is ever handed to a solver.

use thiserror::Error;

use crate::models::LocationId;

/// Crate-wide error.
#[derive(Debug, Error)]
pub enum Error {
    /// A record is malformed: missing field, wrong type, bad value, or a
    /// reference to an entity that does not exist.
    #[error("invalid {collection} record {record}: field `{field}` {reason}")]
    Validation {
        collection: &'static str,
        record: String,
        field: String,
        reason: String,
    },

    /// The same identifier appears twice within one collection.
    #[error("duplicate id {id} in {collection}")]
    DuplicateId { collection: &'static str, id: String },

    /// An ordered location pair needed for travel chaining has no entry in
    /// the distance table.
    #[error("missing travel time from location {from} to location {to}")]
    MissingTravelTime { from: LocationId, to: LocationId },

    /// Invalid horizon or otherwise unusable configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn validation(
        collection: &'static str,
        record: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            collection,
            record: record.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn duplicate(collection: &'static str, id: impl ToString) -> Self {
        Self::DuplicateId {
            collection,
            id: id.to_string(),
        }
    }

    /// Whether this error came from a malformed input document.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::DuplicateId { .. } | Self::Json(_)
        )
    }
}
