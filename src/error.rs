use thiserror::Error;

#[derive(Error, Debug)]
pub enum GradebookError {
    #[error("identifier must be exactly 10 digits")]
    InvalidIdentifier,

    #[error("a student with this identifier already exists")]
    DuplicateKey,

    #[error("no student with this identifier")]
    NotFound,

    #[error("{0}")]
    InvalidScore(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl GradebookError {
    /// Stable error code reported in IPC error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            GradebookError::InvalidIdentifier => "invalid_identifier",
            GradebookError::DuplicateKey => "duplicate_key",
            GradebookError::NotFound => "not_found",
            GradebookError::InvalidScore(_) => "invalid_score",
            GradebookError::Database(_) => "db_query_failed",
        }
    }

    /// True for errors the user can fix by changing their input.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, GradebookError::Database(_))
    }
}

pub type Result<T> = std::result::Result<T, GradebookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(GradebookError::InvalidIdentifier.code(), "invalid_identifier");
        assert_eq!(GradebookError::DuplicateKey.code(), "duplicate_key");
        assert_eq!(GradebookError::NotFound.code(), "not_found");
        assert_eq!(
            GradebookError::InvalidScore("x".into()).code(),
            "invalid_score"
        );
    }

    #[test]
    fn database_errors_are_not_user_errors() {
        let e = GradebookError::from(rusqlite::Error::InvalidQuery);
        assert!(!e.is_user_error());
        assert!(GradebookError::NotFound.is_user_error());
    }
}
