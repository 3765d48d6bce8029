use adwizard_types::{FieldErrors, ParamError};
use thiserror::Error;

/// Errors surfaced by layout store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O failure while reading or writing a store file.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failure.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The record failed attribute validation.
    #[error("validation failed: {}", summarize(.0))]
    Validation(FieldErrors),

    /// The generic layout is structurally invalid.
    #[error("invalid layout: {reason}")]
    InvalidLayout { reason: String },

    /// No generic layout exists with the given id.
    #[error("layout not found: {id}")]
    LayoutNotFound { id: i64 },
}

impl StoreError {
    pub fn invalid_layout(reason: impl Into<String>) -> Self {
        Self::InvalidLayout { reason: reason.into() }
    }

    /// Attribute errors carried by a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Errors raised while assembling a layout from posted form data.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error(transparent)]
    Param(#[from] ParamError),

    #[error("malformed field layout configuration: {0}")]
    Config(#[from] serde_json::Error),
}

fn summarize(errors: &FieldErrors) -> String {
    errors
        .iter()
        .flat_map(|(attribute, messages)| messages.iter().map(move |message| format!("{attribute}: {message}")))
        .collect::<Vec<_>>()
        .join("; ")
}
