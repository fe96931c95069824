use crate::error::{GradebookError, Result};
use crate::identifier::is_valid_identifier;

/// Format gate in front of the main interface. No credential store is
/// consulted; any well-formed teacher identifier is admitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionGate {
    #[default]
    Unauthenticated,
    Authenticated { teacher_id: String },
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// A well-formed identifier submitted while logged in switches the
    /// session to that teacher; a malformed one is rejected either way and
    /// leaves the current session untouched.
    pub fn submit(&mut self, identifier: &str) -> Result<()> {
        if !is_valid_identifier(identifier) {
            tracing::debug!("login rejected: malformed teacher identifier");
            return Err(GradebookError::InvalidIdentifier);
        }
        tracing::info!(teacher_id = identifier, "session authenticated");
        *self = SessionGate::Authenticated {
            teacher_id: identifier.to_string(),
        };
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionGate::Authenticated { .. })
    }

    pub fn teacher_id(&self) -> Option<&str> {
        match self {
            SessionGate::Authenticated { teacher_id } => Some(teacher_id),
            SessionGate::Unauthenticated => None,
        }
    }
}
