//! Generic layout storage.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;

use adwizard_types::{BodyParams, Layout};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::file::{load_json_file, write_json_atomic};
use crate::{AssembleError, StoreError};

/// Default filename for persisted generic layouts.
pub const LAYOUTS_FILE_NAME: &str = "layouts.json";

/// Shared trait implemented by generic layout backends.
pub trait LayoutStore: Send + Sync {
    /// Build an unsaved layout from posted form data.
    fn assemble_from_request(&self, params: &BodyParams) -> Result<Layout, AssembleError> {
        assemble_layout(params)
    }

    fn layout_by_id(&self, id: i64) -> Result<Option<Layout>, StoreError>;

    /// Insert or update `layout`, assigning a fresh id to new layouts.
    fn save_layout(&self, layout: &mut Layout) -> Result<(), StoreError>;

    /// Remove a layout. Returns whether a record existed.
    fn delete_layout_by_id(&self, id: i64) -> Result<bool, StoreError>;
}

/// Assemble a layout from the `fieldLayoutId` and `fieldLayout` body params.
///
/// `fieldLayout` carries the tab configuration as JSON. When it is absent the
/// layout has no tabs.
pub fn assemble_layout(params: &BodyParams) -> Result<Layout, AssembleError> {
    let id = params.parse::<i64>("fieldLayoutId")?;
    let mut layout = match params.get_trimmed("fieldLayout") {
        Some(config) => serde_json::from_str::<Layout>(config)?,
        None => Layout::default(),
    };
    layout.id = id;
    Ok(layout)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutFile {
    #[serde(default)]
    next_id: i64,
    #[serde(default)]
    layouts: BTreeMap<i64, Layout>,
}

impl LayoutFile {
    fn allocate_id(&mut self) -> i64 {
        let highest = self.layouts.keys().next_back().copied().unwrap_or(0);
        let id = self.next_id.max(highest + 1).max(1);
        self.next_id = id + 1;
        id
    }
}

/// Generic layout store kept in memory and optionally mirrored to JSON.
#[derive(Debug)]
pub struct JsonLayoutStore {
    path: Option<PathBuf>,
    state: Mutex<LayoutFile>,
}

impl JsonLayoutStore {
    /// Open (or lazily create) the store backed by `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = load_json_file(&path)?;
        Ok(Self {
            path: Some(path),
            state: Mutex::new(state),
        })
    }

    /// Store that never touches disk, primarily used in tests.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(LayoutFile::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("layout store lock poisoned").layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, file: &LayoutFile) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => write_json_atomic(path, file),
            None => Ok(()),
        }
    }
}

impl LayoutStore for JsonLayoutStore {
    fn layout_by_id(&self, id: i64) -> Result<Option<Layout>, StoreError> {
        let state = self.state.lock().expect("layout store lock poisoned");
        Ok(state.layouts.get(&id).cloned())
    }

    fn save_layout(&self, layout: &mut Layout) -> Result<(), StoreError> {
        validate_layout(layout)?;

        let mut state = self.state.lock().expect("layout store lock poisoned");
        let mut next = state.clone();
        let id = match layout.id {
            Some(id) if next.layouts.contains_key(&id) => id,
            Some(id) => return Err(StoreError::LayoutNotFound { id }),
            None => next.allocate_id(),
        };

        let mut record = layout.clone();
        record.id = Some(id);
        next.layouts.insert(id, record);
        self.persist(&next)?;
        *state = next;

        layout.id = Some(id);
        debug!(layout_id = id, "saved generic layout");
        Ok(())
    }

    fn delete_layout_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.lock().expect("layout store lock poisoned");
        if !state.layouts.contains_key(&id) {
            return Ok(false);
        }
        let mut next = state.clone();
        next.layouts.remove(&id);
        self.persist(&next)?;
        *state = next;
        Ok(true)
    }
}

fn validate_layout(layout: &Layout) -> Result<(), StoreError> {
    if layout.element_type.trim().is_empty() {
        return Err(StoreError::invalid_layout("layout has no element type"));
    }
    if layout.tabs.iter().any(|tab| tab.name.trim().is_empty()) {
        return Err(StoreError::invalid_layout("tab names cannot be blank"));
    }
    let mut seen = HashSet::new();
    for handle in layout.field_handles() {
        if handle.trim().is_empty() {
            return Err(StoreError::invalid_layout("field handles cannot be blank"));
        }
        if !seen.insert(handle) {
            return Err(StoreError::invalid_layout(format!("field '{handle}' appears more than once")));
        }
    }
    Ok(())
}
