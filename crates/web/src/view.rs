//! View rendering seam.

use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("failed to serialize view context: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Output of a rendered template.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    pub template: String,
    /// Context the template was rendered with.
    pub context: Value,
    pub content_type: &'static str,
    pub body: String,
}

/// Turns a template name and data context into a response body.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, template: &str, context: Value) -> Result<RenderedView, ViewError>;
}

/// Renderer that emits the template name and context as a JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonViewRenderer;

impl JsonViewRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ViewRenderer for JsonViewRenderer {
    fn render(&self, template: &str, context: Value) -> Result<RenderedView, ViewError> {
        let document = json!({ "template": template, "context": &context });
        let body = serde_json::to_string(&document)?;
        Ok(RenderedView {
            template: template.to_string(),
            context,
            content_type: "application/json",
            body,
        })
    }
}
