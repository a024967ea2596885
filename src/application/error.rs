use std::error::Error as StdError;

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::envelope::{CODE_BAD_REQUEST, CODE_INTERNAL, CODE_NOT_FOUND, error_response},
    domain::error::DomainError,
    infra::error::InfraError,
};

/// Diagnostic chain attached to failed envelopes so the logging middleware can
/// report what happened without leaking it into the payload.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub code: u16,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, code: u16, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            code,
            messages,
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Failure taxonomy of the route-handler boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

pub const INTERNAL_ERROR_MESSAGE: &str = "服务器内部错误";

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Envelope code: `400` validation and state, `404` missing, `500` the rest.
    pub fn code(&self) -> u16 {
        match self {
            AppError::Domain(DomainError::Validation { .. })
            | AppError::Domain(DomainError::State { .. })
            | AppError::Validation(_) => CODE_BAD_REQUEST,
            AppError::Domain(DomainError::NotFound { .. }) | AppError::NotFound(_) => {
                CODE_NOT_FOUND
            }
            AppError::Domain(DomainError::Invariant { .. })
            | AppError::Serialization(_)
            | AppError::Infra(_)
            | AppError::Unexpected(_) => CODE_INTERNAL,
        }
    }

    /// Message placed in the envelope. Internal failures never expose detail.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Domain(DomainError::Validation { message })
            | AppError::Domain(DomainError::State { message })
            | AppError::Validation(message)
            | AppError::NotFound(message) => message.clone(),
            AppError::Domain(DomainError::NotFound { .. }) => "数据不存在".to_string(),
            AppError::Domain(DomainError::Invariant { .. })
            | AppError::Serialization(_)
            | AppError::Infra(_)
            | AppError::Unexpected(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let envelope = error_response(self.public_message(), code);
        let report = ErrorReport::from_error("application::error::AppError", code, &self);
        let mut response = Json(envelope).into_response();
        report.attach(&mut response);
        response
    }
}
