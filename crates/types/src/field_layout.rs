use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Validation messages keyed by attribute name.
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// Named wrapper around a generic layout, scoped to advertisements.
///
/// A wrapper without an `id` has never been persisted. Once saved, `id` is the
/// identifier of the generic [`Layout`](crate::Layout) it names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLayout {
    pub id: Option<i64>,
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<DateTime<Utc>>,
    /// Validation errors from the last failed save; never persisted.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub errors: FieldErrors,
}

impl FieldLayout {
    pub fn new(id: Option<i64>, name: Option<String>) -> Self {
        Self {
            id,
            name,
            ..Self::default()
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Name used in breadcrumbs and listings; empty when unnamed.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Check the attributes required for persistence.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.id.is_none() {
            errors.entry("id".into()).or_default().push("ID cannot be blank.".into());
        }
        if self.name.as_deref().is_none_or(|name| name.trim().is_empty()) {
            errors.entry("name".into()).or_default().push("Name cannot be blank.".into());
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
