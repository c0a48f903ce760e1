//! Application settings for Docker Simple Manager.
//!
//! This module provides:
//! - Typed settings groups with per-key validation rules
//! - A process-wide registry routing all reads and writes
//! - Atomic JSON persistence (write to temp, then rename)
//! - Stepwise schema migration for outdated documents
//! - Change notification through registered observers
//!
//! # Example
//!
//! ```no_run
//! use dsm_core::paths::WorkspacePaths;
//! use dsm_core::settings;
//! use serde_json::json;
//!
//! // Resolve the workspace and bring up the shared registry
//! let paths = WorkspacePaths::resolve();
//! let shared = settings::init(&paths).unwrap();
//!
//! // Read a setting
//! let theme = shared.read().get_value("app", "theme").unwrap();
//! println!("Theme: {}", theme);
//!
//! // Change a setting and flush the document
//! let mut registry = shared.write();
//! registry.set_value("app", "theme", json!("dark")).unwrap();
//! registry.save_if_dirty().unwrap();
//! ```

mod errors;
mod group;
mod migration;
mod observers;
mod registry;
mod schema;
mod validators;

pub use errors::{SettingsError, SettingsResult};
pub use group::{GroupBuilder, KeyDef, SettingsGroup};
pub use migration::{standard_migrations, MigrationEngine, MigrationFn};
pub use observers::{LoggingObserver, SettingsObserver, SharedObserver};
pub use registry::SettingsRegistry;
pub use schema::{standard_groups, CURRENT_SCHEMA_VERSION, CURRENT_VERSION};
pub use validators::{Validator, ValueKind};

use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::paths::WorkspacePaths;

/// Registry handle shared across subsystems and threads.
pub type SharedSettings = Arc<RwLock<SettingsRegistry>>;

static SHARED: OnceCell<SharedSettings> = OnceCell::new();

/// Initialize the process-wide settings registry.
///
/// The first call loads the document from the workspace (falling
/// back to defaults and materializing the file when it does not
/// exist yet). Every later call returns the same handle and ignores
/// `paths`.
pub fn init(paths: &WorkspacePaths) -> SettingsResult<SharedSettings> {
    let shared = SHARED.get_or_try_init(|| {
        let mut registry = SettingsRegistry::new(paths.config_file());
        registry.load_from_disk(None)?;
        registry.save_if_dirty()?;
        Ok::<_, SettingsError>(Arc::new(RwLock::new(registry)))
    })?;
    Ok(shared.clone())
}

/// The shared registry, or `None` before [`init`] has run.
pub fn try_shared() -> Option<SharedSettings> {
    SHARED.get().cloned()
}
