//! Error types for the transactional store.

use colonycore_pluginapi::RuleViolationError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id:?} already exists")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("{kind} {id:?} not found")]
    NotFound { kind: &'static str, id: String },

    /// A referenced record is missing, e.g. the facility of a housing unit.
    #[error("{kind} {id:?} not found for {owner}")]
    MissingReference {
        kind: &'static str,
        id: String,
        owner: &'static str,
    },

    #[error("{kind} {id:?} still referenced by {by_kind} {by_id:?}")]
    StillReferenced {
        kind: &'static str,
        id: String,
        by_kind: &'static str,
        by_id: String,
    },

    /// Structural validation failed at staging time.
    #[error("{0}")]
    Invalid(String),

    /// The aggregate rule result contained a blocking violation.
    #[error(transparent)]
    Blocked(#[from] RuleViolationError),

    /// A rule failed to evaluate.
    #[error("rule {rule} failed: {source}")]
    Rule {
        rule: String,
        #[source]
        source: anyhow::Error,
    },

    /// Cancelled or timed out before commit.
    #[error("transaction cancelled")]
    Cancelled,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// The blocking result, when this error is a rule rejection.
    pub fn violations(&self) -> Option<&RuleViolationError> {
        match self {
            Self::Blocked(err) => Some(err),
            _ => None,
        }
    }
}
