//! Field layout wrapper storage.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use adwizard_types::{FieldErrors, FieldLayout};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::StoreError;
use crate::file::{load_json_file, write_json_atomic};
use crate::layouts::LayoutStore;

/// Default filename for persisted field layout wrappers.
pub const FIELD_LAYOUTS_FILE_NAME: &str = "field_layouts.json";

/// Shared trait implemented by field layout backends.
pub trait FieldLayoutStore: Send + Sync {
    /// All wrappers in store order (by name, then id).
    fn field_layouts(&self) -> Result<Vec<FieldLayout>, StoreError>;

    fn field_layout_by_id(&self, id: i64) -> Result<Option<FieldLayout>, StoreError>;

    /// Insert or update a wrapper. Its generic layout must already exist.
    fn save_field_layout(&self, field_layout: &FieldLayout) -> Result<(), StoreError>;

    /// Remove a wrapper and its generic layout. Missing records are ignored.
    fn delete_field_layout_by_id(&self, id: i64) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldLayoutFile {
    #[serde(default)]
    field_layouts: BTreeMap<i64, FieldLayout>,
}

/// Field layout store kept in memory and optionally mirrored to JSON.
pub struct JsonFieldLayoutStore {
    path: Option<PathBuf>,
    state: Mutex<FieldLayoutFile>,
    layouts: Arc<dyn LayoutStore>,
}

impl JsonFieldLayoutStore {
    /// Open (or lazily create) the store backed by `path`.
    pub fn open(path: impl Into<PathBuf>, layouts: Arc<dyn LayoutStore>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = load_json_file(&path)?;
        Ok(Self {
            path: Some(path),
            state: Mutex::new(state),
            layouts,
        })
    }

    /// Store that never touches disk, primarily used in tests.
    pub fn in_memory(layouts: Arc<dyn LayoutStore>) -> Self {
        Self {
            path: None,
            state: Mutex::new(FieldLayoutFile::default()),
            layouts,
        }
    }

    fn persist(&self, file: &FieldLayoutFile) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => write_json_atomic(path, file),
            None => Ok(()),
        }
    }
}

impl FieldLayoutStore for JsonFieldLayoutStore {
    fn field_layouts(&self) -> Result<Vec<FieldLayout>, StoreError> {
        let state = self.state.lock().expect("field layout store lock poisoned");
        let mut records: Vec<FieldLayout> = state.field_layouts.values().cloned().collect();
        records.sort_by(|left, right| {
            left.display_name()
                .to_lowercase()
                .cmp(&right.display_name().to_lowercase())
                .then(left.id.cmp(&right.id))
        });
        Ok(records)
    }

    fn field_layout_by_id(&self, id: i64) -> Result<Option<FieldLayout>, StoreError> {
        let state = self.state.lock().expect("field layout store lock poisoned");
        Ok(state.field_layouts.get(&id).cloned())
    }

    fn save_field_layout(&self, field_layout: &FieldLayout) -> Result<(), StoreError> {
        field_layout.validate().map_err(StoreError::Validation)?;
        let Some(id) = field_layout.id else {
            return Err(StoreError::Validation(FieldErrors::new()));
        };
        if self.layouts.layout_by_id(id)?.is_none() {
            return Err(StoreError::LayoutNotFound { id });
        }

        let mut state = self.state.lock().expect("field layout store lock poisoned");
        let mut next = state.clone();
        let now = Utc::now();
        let date_created = next
            .field_layouts
            .get(&id)
            .and_then(|existing| existing.date_created)
            .unwrap_or(now);
        let record = FieldLayout {
            id: Some(id),
            name: field_layout.name.as_deref().map(|name| name.trim().to_string()),
            date_created: Some(date_created),
            date_updated: Some(now),
            errors: FieldErrors::new(),
        };
        next.field_layouts.insert(id, record);
        self.persist(&next)?;
        *state = next;

        debug!(field_layout_id = id, "saved field layout");
        Ok(())
    }

    fn delete_field_layout_by_id(&self, id: i64) -> Result<(), StoreError> {
        {
            let mut state = self.state.lock().expect("field layout store lock poisoned");
            if state.field_layouts.contains_key(&id) {
                let mut next = state.clone();
                next.field_layouts.remove(&id);
                self.persist(&next)?;
                *state = next;
            }
        }

        if !self.layouts.delete_layout_by_id(id)? {
            warn!(field_layout_id = id, "no generic layout to delete");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonLayoutStore;
    use adwizard_types::{AD_ELEMENT_TYPE, Layout};
    use tempfile::tempdir;

    fn stores() -> (Arc<JsonLayoutStore>, JsonFieldLayoutStore) {
        let layouts = Arc::new(JsonLayoutStore::in_memory());
        let field_layouts = JsonFieldLayoutStore::in_memory(layouts.clone());
        (layouts, field_layouts)
    }

    fn saved_layout(layouts: &JsonLayoutStore) -> i64 {
        let mut layout = Layout {
            element_type: AD_ELEMENT_TYPE.into(),
            ..Layout::default()
        };
        layouts.save_layout(&mut layout).unwrap();
        layout.id.unwrap()
    }

    #[test]
    fn save_requires_existing_generic_layout() {
        let (_layouts, store) = stores();
        let error = store
            .save_field_layout(&FieldLayout::new(Some(3), Some("Banner".into())))
            .unwrap_err();
        assert!(matches!(error, StoreError::LayoutNotFound { id: 3 }));
    }

    #[test]
    fn save_rejects_blank_name_with_field_errors() {
        let (layouts, store) = stores();
        let id = saved_layout(&layouts);
        let error = store.save_field_layout(&FieldLayout::new(Some(id), Some(" ".into()))).unwrap_err();
        let errors = error.field_errors().expect("validation errors");
        assert!(errors.contains_key("name"));
        assert!(store.field_layout_by_id(id).unwrap().is_none());
    }

    #[test]
    fn update_keeps_creation_date() {
        let (layouts, store) = stores();
        let id = saved_layout(&layouts);
        store.save_field_layout(&FieldLayout::new(Some(id), Some("Banner".into()))).unwrap();
        let created = store.field_layout_by_id(id).unwrap().unwrap();

        store.save_field_layout(&FieldLayout::new(Some(id), Some(" Leaderboard ".into()))).unwrap();
        let updated = store.field_layout_by_id(id).unwrap().unwrap();

        assert_eq!(updated.name.as_deref(), Some("Leaderboard"));
        assert_eq!(updated.date_created, created.date_created);
        assert!(updated.date_updated >= created.date_updated);
    }

    #[test]
    fn lists_by_name_then_id() {
        let (layouts, store) = stores();
        for name in ["sidebar", "Banner", "banner"] {
            let id = saved_layout(&layouts);
            store.save_field_layout(&FieldLayout::new(Some(id), Some(name.into()))).unwrap();
        }
        let names: Vec<_> = store
            .field_layouts()
            .unwrap()
            .into_iter()
            .map(|layout| (layout.id.unwrap(), layout.name.unwrap()))
            .collect();
        assert_eq!(
            names,
            vec![(2, "Banner".to_string()), (3, "banner".to_string()), (1, "sidebar".to_string())]
        );
    }

    #[test]
    fn delete_removes_wrapper_and_generic_layout() {
        let (layouts, store) = stores();
        let id = saved_layout(&layouts);
        store.save_field_layout(&FieldLayout::new(Some(id), Some("Banner".into()))).unwrap();

        store.delete_field_layout_by_id(id).unwrap();
        assert!(store.field_layout_by_id(id).unwrap().is_none());
        assert!(layouts.layout_by_id(id).unwrap().is_none());

        store.delete_field_layout_by_id(id).unwrap();
    }

    #[test]
    fn json_store_persists_entries() {
        let dir = tempdir().unwrap();
        let layouts = Arc::new(JsonLayoutStore::open(dir.path().join("layouts.json")).unwrap());
        let path = dir.path().join(FIELD_LAYOUTS_FILE_NAME);
        let store = JsonFieldLayoutStore::open(&path, layouts.clone()).unwrap();
        let id = saved_layout(&layouts);
        store.save_field_layout(&FieldLayout::new(Some(id), Some("Banner".into()))).unwrap();
        drop(store);

        let reloaded = JsonFieldLayoutStore::open(&path, layouts).unwrap();
        let record = reloaded.field_layout_by_id(id).unwrap().unwrap();
        assert_eq!(record.name.as_deref(), Some("Banner"));
        assert!(record.date_created.is_some());
    }
}
