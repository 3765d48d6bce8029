//! Message translation by category.

use indexmap::IndexMap;

/// Host application messages.
pub const APP: &str = "app";
/// Site content such as user-entered layout names.
pub const SITE: &str = "site";
/// Messages owned by the plugin.
pub const PLUGIN: &str = "ad-wizard";

/// Category → source message → translation.
pub type Catalog = IndexMap<String, IndexMap<String, String>>;

/// Looks messages up in a static catalog, falling back to the source text.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    catalog: Catalog,
}

impl Translator {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn t(&self, category: &str, message: &str) -> String {
        self.catalog
            .get(category)
            .and_then(|messages| messages.get(message))
            .cloned()
            .unwrap_or_else(|| message.to_string())
    }
}
