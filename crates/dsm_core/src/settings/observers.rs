//! Change-notification contract for settings writes.

use std::sync::Arc;

use serde_json::Value;

/// Callback invoked synchronously after a value changes.
///
/// Implementations must not write back to the registry from inside
/// the callback in a way that re-enters notification of the same
/// change; with the shared handle such a write would deadlock on the
/// registry lock rather than recurse.
pub trait SettingsObserver: Send + Sync {
    /// Called with the group, key, and the old and new values.
    fn on_setting_changed(&self, group: &str, key: &str, old_value: &Value, new_value: &Value);
}

/// Shared observer handle; unregistration matches by pointer
/// identity of this handle.
pub type SharedObserver = Arc<dyn SettingsObserver>;

/// Observer that records every change to the application log.
///
/// Installed at startup so value changes are visible in the log
/// without every collaborator logging them itself.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl SettingsObserver for LoggingObserver {
    fn on_setting_changed(&self, group: &str, key: &str, old_value: &Value, new_value: &Value) {
        tracing::info!(
            "Setting changed: {}.{} = {} (was {})",
            group,
            key,
            new_value,
            old_value
        );
    }
}
