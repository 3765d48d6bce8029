use serde::{Deserialize, Serialize};

/// Element type marker stamped on every generic layout owned by the plugin.
pub const AD_ELEMENT_TYPE: &str = "adwizard.ad";

/// Generic host layout: the tabs and fields attachable to a content type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub id: Option<i64>,
    /// Element type the layout belongs to (for example [`AD_ELEMENT_TYPE`]).
    #[serde(rename = "type", default)]
    pub element_type: String,
    #[serde(default)]
    pub tabs: Vec<LayoutTab>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutTab {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<LayoutField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutField {
    /// Handle of the custom field placed on the tab.
    pub handle: String,
    #[serde(default)]
    pub required: bool,
}

impl Layout {
    /// All field handles in tab order.
    pub fn field_handles(&self) -> impl Iterator<Item = &str> {
        self.tabs
            .iter()
            .flat_map(|tab| tab.fields.iter().map(|field| field.handle.as_str()))
    }
}
