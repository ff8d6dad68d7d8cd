/// Service layer for Daymark
///
/// Services sit between the HTTP front door and the models. They own the
/// business rules: ownership checks, the subtask-completion promotion, the
/// habit log toggle cycle, and the derived views (board, gantt, weekly grid,
/// day summary). Handlers call services; services call models.
///
/// Ownership failures surface two ways, matching the access pattern: entities
/// looked up directly under the caller's id report NotFound, while entities
/// whose owner is resolved through a parent task report Unauthorized.

pub mod habits;
pub mod projects;
pub mod tasks;

/// Error type shared by all service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Entity absent, or owned by another user on a direct lookup
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Ownership check through a parent entity failed
    #[error("Not authorized to access this resource")]
    Unauthorized,

    /// Input rejected before touching the store
    #[error("{0}")]
    Validation(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_entity() {
        let err = ServiceError::NotFound("Task");
        assert_eq!(err.to_string(), "Task not found");
    }

    #[test]
    fn test_database_error_wraps_sqlx() {
        let err = ServiceError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ServiceError::Database(_)));
    }
}
