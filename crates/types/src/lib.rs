//! Shared type definitions for the Ad Wizard field layout workflow.
//!
//! The plugin keeps two records per layout: the generic [`Layout`] owned by
//! the host (tabs and fields) and the named [`FieldLayout`] wrapper that ties
//! it to advertisements. Both share the same numeric identifier.

mod body_params;
mod field_layout;
mod layout;

pub use body_params::{BodyParams, ParamError};
pub use field_layout::{FieldErrors, FieldLayout};
pub use layout::{AD_ELEMENT_TYPE, Layout, LayoutField, LayoutTab};

use serde::{Deserialize, Serialize};

/// A single breadcrumb entry rendered above control panel pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    /// Localized label shown to the user.
    pub label: String,
    /// Absolute control panel URL the crumb links to.
    pub url: String,
}

impl Crumb {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}
