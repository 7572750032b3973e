//! Error types for document editing commands
//!
//! Structural problems in parsed data are not errors here; those are
//! collected by [`crate::validate`] as a list of messages.

/// Errors from editing commands on typed documents
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Referenced entity does not exist in the document
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Readonly tasks mirror CJM actions and follow them
    #[error("task {0} mirrors a CJM action and cannot be removed directly")]
    ReadonlyTask(String),

    /// The CJM lane is managed by lane mirroring
    #[error("lane {0} is the CJM lane and is managed automatically")]
    ManagedLane(String),

    /// A second `cjm` lane was requested
    #[error("an SBP document may hold at most one cjm lane")]
    DuplicateCjmLane,

    /// Emotion scores live in [-2, 2]
    #[error("emotion score {0} out of range [-2, 2]")]
    EmotionOutOfRange(i64),
}

impl ModelError {
    /// Create not-found error
    #[inline]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Result alias for editing commands
pub type ModelResult<T> = Result<T, ModelError>;
