use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    application::moderation::gate::GateError, domain::error::DomainError,
    infra::error::InfraError,
};

/// Failure of one round trip to the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("`{0}` is not supported by this resource")]
    Unsupported(&'static str),
}

impl ApiError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Error chain flattened into printable lines, outermost first.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// True when the request never left the client.
    pub fn is_rejected_locally(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::Gate(_)
                | AppError::Domain(DomainError::InvalidTransition { .. })
                | AppError::Domain(DomainError::Validation { .. })
        )
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Validation(_) | AppError::Gate(_) | AppError::Domain(_) => 2,
            AppError::Api(_) => 3,
            AppError::Infra(_) | AppError::Unexpected(_) => 1,
        }
    }
}
