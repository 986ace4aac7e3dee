use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("domain validation failed: {message}")]
    Validation { message: String },
    #[error("domain invariant violated: {message}")]
    Invariant { message: String },
    #[error("cannot {action} {entity} `{id}` in state `{from}`")]
    InvalidTransition {
        entity: &'static str,
        id: String,
        from: &'static str,
        action: &'static str,
    },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }

    pub fn invalid_transition(
        entity: &'static str,
        id: impl Into<String>,
        from: &'static str,
        action: &'static str,
    ) -> Self {
        Self::InvalidTransition {
            entity,
            id: id.into(),
            from,
            action,
        }
    }
}
