use crate::types::DbId;

/// Generic domain error used outside the approval workflow (auth, request
/// validation, lookups by id).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Outcome kinds of the approval workflow.
///
/// Everything except [`WorkflowError::StorageUnavailable`] is an expected
/// business outcome the caller should present to the user; storage
/// failures are the only retriable kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("{kind} document with id {id} not found")]
    NotFound { kind: &'static str, id: DbId },

    #[error("Not permitted: {0}")]
    Unauthorized(String),

    #[error("Document {id} is already {stage}; no further transitions are possible")]
    AlreadyTerminal { id: DbId, stage: &'static str },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Document {id} was modified concurrently (expected version {expected_version})")]
    Conflict { id: DbId, expected_version: i32 },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl WorkflowError {
    /// Stable snake_case identifier for the failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::NotFound { .. } => "not_found",
            WorkflowError::Unauthorized(_) => "unauthorized",
            WorkflowError::AlreadyTerminal { .. } => "already_terminal",
            WorkflowError::Validation(_) => "validation_error",
            WorkflowError::Conflict { .. } => "conflict",
            WorkflowError::StorageUnavailable(_) => "storage_unavailable",
        }
    }

    /// Only storage failures may succeed if retried unchanged.
    pub fn is_retriable(&self) -> bool {
        matches!(self, WorkflowError::StorageUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let errors = [
            WorkflowError::NotFound { kind: "bapb", id: 1 },
            WorkflowError::Unauthorized("x".into()),
            WorkflowError::AlreadyTerminal { id: 1, stage: "approved" },
            WorkflowError::Validation("x".into()),
            WorkflowError::Conflict { id: 1, expected_version: 2 },
            WorkflowError::StorageUnavailable("x".into()),
        ];
        let mut codes: Vec<_> = errors.iter().map(WorkflowError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn only_storage_unavailable_is_retriable() {
        assert!(WorkflowError::StorageUnavailable("timeout".into()).is_retriable());
        assert!(!WorkflowError::Conflict { id: 1, expected_version: 1 }.is_retriable());
        assert!(!WorkflowError::Unauthorized("no".into()).is_retriable());
    }

    #[test]
    fn not_found_message_names_kind() {
        let err = WorkflowError::NotFound { kind: "bapp", id: 9 };
        assert_eq!(err.to_string(), "bapp document with id 9 not found");
    }
}
