//! Persistence for generic layouts and the plugin's field layout wrappers.
//!
//! Both stores expose a trait so the request handlers can be wired against
//! any backend. The bundled implementations keep their records in memory and
//! optionally mirror them to a JSON file after every mutation.

mod error;
mod field_layouts;
mod file;
mod layouts;

pub use error::{AssembleError, StoreError};
pub use field_layouts::{FIELD_LAYOUTS_FILE_NAME, FieldLayoutStore, JsonFieldLayoutStore};
pub use layouts::{JsonLayoutStore, LAYOUTS_FILE_NAME, LayoutStore, assemble_layout};
