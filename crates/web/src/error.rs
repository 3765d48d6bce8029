//! Request-level failures raised by controller actions.

use adwizard_store::{AssembleError, StoreError};
use adwizard_types::ParamError;
use axum::http::StatusCode;
use thiserror::Error;

use crate::view::ViewError;

/// Errors that abort a request with a framework-level error response.
///
/// Persistence failures during save never surface here; they become flash
/// notices instead.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Login required")]
    Unauthenticated,

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("view error: {0}")]
    View(#[from] ViewError),
}

impl HandlerError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::View(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(_) | Self::View(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ParamError> for HandlerError {
    fn from(error: ParamError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl From<AssembleError> for HandlerError {
    fn from(error: AssembleError) -> Self {
        Self::bad_request(error.to_string())
    }
}
