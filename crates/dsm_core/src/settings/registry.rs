//! Process-wide settings registry.
//!
//! The registry owns one instance of each settings group, routes
//! every read and write, dispatches change notifications, and
//! handles disk persistence end-to-end: load -> migrate ->
//! distribute into groups on the way in, serialize -> atomic write
//! on the way out.

use std::fs;
use std::io::{self, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::errors::{SettingsError, SettingsResult};
use super::group::SettingsGroup;
use super::migration::{declared_schema, standard_migrations, MigrationEngine};
use super::observers::SharedObserver;
use super::schema::{standard_groups, CURRENT_SCHEMA_VERSION, CURRENT_VERSION};
use super::validators::ValueKind;

/// Coordinator owning every settings group and the persistence state.
///
/// The group set is closed at construction; unknown group or key
/// lookups fail with NotFound instead of creating entries. Writes go
/// through the owning group's validation, then observers are
/// notified and the registry is marked dirty; the actual disk write
/// happens at flush points via [`save_if_dirty`](Self::save_if_dirty).
pub struct SettingsRegistry {
    /// Groups in document order.
    groups: Vec<SettingsGroup>,
    /// Observers in registration order.
    observers: Vec<SharedObserver>,
    /// Top-level document fields outside the group sections (for
    /// example a section injected by migration), written back on
    /// every save so they survive round-trips.
    metadata: Map<String, Value>,
    /// Registered schema migrations.
    migrations: MigrationEngine,
    /// Whether in-memory state is ahead of the persisted document.
    dirty: bool,
    /// Canonical document location.
    config_path: PathBuf,
}

impl SettingsRegistry {
    /// Create a registry with every standard group at its defaults.
    ///
    /// Does not touch the disk - call
    /// [`load_from_disk`](Self::load_from_disk) after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            groups: standard_groups(),
            observers: Vec::new(),
            metadata: Map::new(),
            migrations: standard_migrations(),
            dirty: false,
            config_path: config_path.into(),
        }
    }

    /// Canonical document path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Whether in-memory values have changed since the last save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read-only access to a group.
    pub fn group(&self, name: &str) -> SettingsResult<&SettingsGroup> {
        self.groups
            .iter()
            .find(|group| group.name() == name)
            .ok_or_else(|| SettingsError::group_not_found(name))
    }

    fn group_mut(&mut self, name: &str) -> SettingsResult<&mut SettingsGroup> {
        self.groups
            .iter_mut()
            .find(|group| group.name() == name)
            .ok_or_else(|| SettingsError::group_not_found(name))
    }

    /// Current value of a key; NotFound for unknown group or key.
    pub fn get_value(&self, group: &str, key: &str) -> SettingsResult<Value> {
        Ok(self.group(group)?.get(key)?.clone())
    }

    /// Current value of a key, or `default` if the key is absent.
    ///
    /// The default masks a missing key only - an unknown group name
    /// still fails with NotFound.
    pub fn get_value_or(&self, group: &str, key: &str, default: Value) -> SettingsResult<Value> {
        let group = self.group(group)?;
        match group.get(key) {
            Ok(value) => Ok(value.clone()),
            Err(SettingsError::NotFound { .. }) => Ok(default),
            Err(other) => Err(other),
        }
    }

    /// Validate and store a value, then notify observers.
    ///
    /// On success the registry is marked dirty so the next flush
    /// persists the document. On rejection the error propagates with
    /// no notification, no dirty-marking, and no save.
    pub fn set_value(&mut self, group: &str, key: &str, value: Value) -> SettingsResult<()> {
        let old = self.group_mut(group)?.set(key, value.clone())?;
        self.notify_observers(group, key, &old, &value);
        self.dirty = true;
        Ok(())
    }

    /// Register an observer; registering the same handle twice is a
    /// no-op.
    pub fn register_observer(&mut self, observer: SharedObserver) {
        let present = self
            .observers
            .iter()
            .any(|existing| same_observer(existing, &observer));
        if !present {
            self.observers.push(observer);
        }
    }

    /// Remove an observer; unknown handles are ignored.
    pub fn unregister_observer(&mut self, observer: &SharedObserver) {
        self.observers
            .retain(|existing| !same_observer(existing, observer));
    }

    /// Invoke every observer in registration order.
    ///
    /// A panicking observer is caught and logged; it neither stops
    /// later observers nor propagates to the writer.
    pub fn notify_observers(&self, group: &str, key: &str, old: &Value, new: &Value) {
        for observer in &self.observers {
            let result = catch_unwind(AssertUnwindSafe(|| {
                observer.on_setting_changed(group, key, old, new);
            }));
            if result.is_err() {
                tracing::error!("Settings observer panicked on {}.{} change", group, key);
            }
        }
    }

    /// Serialize the document and write it atomically.
    ///
    /// Writes to `path`, or the canonical path when none is given,
    /// and clears the dirty flag.
    pub fn save_to_disk(&mut self, path: Option<&Path>) -> SettingsResult<()> {
        let target = path.unwrap_or(&self.config_path).to_path_buf();
        write_document(&target, &self.build_document())?;
        self.dirty = false;
        tracing::debug!("Saved settings document to {}", target.display());
        Ok(())
    }

    /// Persist to the canonical path only when the registry is
    /// dirty. Returns whether a write happened.
    pub fn save_if_dirty(&mut self) -> SettingsResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.save_to_disk(None)?;
        Ok(true)
    }

    /// Load the document from `path` or the canonical path.
    ///
    /// A missing file is not an error: defaults stay in place and
    /// the registry is marked dirty so the next flush materializes
    /// the document. An existing file is backed up before migrations
    /// run, then migrated and distributed into the groups; any
    /// failure on that path leaves the in-memory state untouched.
    pub fn load_from_disk(&mut self, path: Option<&Path>) -> SettingsResult<()> {
        let target = path.unwrap_or(&self.config_path).to_path_buf();
        if !target.exists() {
            tracing::info!(
                "Settings document {} not found; keeping defaults",
                target.display()
            );
            self.dirty = true;
            return Ok(());
        }

        let migrated = self.read_and_migrate(&target, true)?;
        self.adopt_document(migrated)?;
        self.dirty = false;
        tracing::info!("Loaded settings document from {}", target.display());
        Ok(())
    }

    /// Re-check every held value against its rule across all groups.
    ///
    /// Each violation is logged; returns overall validity. Used
    /// defensively after an external edit to the backing file.
    pub fn validate(&self) -> bool {
        let mut valid = true;
        for group in &self.groups {
            for (key, reason) in group.violations() {
                tracing::error!("Invalid setting {}.{}: {}", group.name(), key, reason);
                valid = false;
            }
        }
        valid
    }

    /// Reset every group to its defaults and mark the registry
    /// dirty.
    pub fn reset_to_defaults(&mut self) {
        for group in &mut self.groups {
            group.reset_to_defaults();
        }
        self.dirty = true;
    }

    /// Write the document to an arbitrary path for backup.
    ///
    /// The canonical path and the dirty flag are left untouched.
    pub fn export_to_json(&self, path: &Path) -> SettingsResult<()> {
        write_document(path, &self.build_document())?;
        tracing::info!("Exported settings to {}", path.display());
        Ok(())
    }

    /// Restore the document from an arbitrary path.
    ///
    /// The source must exist - a missing restore source is an I/O
    /// error, never a silent reset. The document goes through the
    /// same migrate-and-distribute pipeline as a normal load, and
    /// the registry is marked dirty so the imported state reaches
    /// the canonical file on the next flush.
    pub fn import_from_json(&mut self, path: &Path) -> SettingsResult<()> {
        if !path.exists() {
            return Err(SettingsError::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "restore source does not exist"),
            ));
        }

        let migrated = self.read_and_migrate(path, false)?;
        self.adopt_document(migrated)?;
        self.dirty = true;
        tracing::info!("Imported settings from {}", path.display());
        Ok(())
    }

    /// Top-level document fields outside the group sections.
    ///
    /// Holds whatever migrations injected (the `notifications`
    /// section) and any future sections this version does not know.
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Assemble the full document: version fields, group sections in
    /// document order, then retained metadata.
    fn build_document(&self) -> Map<String, Value> {
        let mut document = Map::new();
        document.insert("version".to_string(), json!(CURRENT_VERSION));
        document.insert("schema_version".to_string(), json!(CURRENT_SCHEMA_VERSION));
        for group in &self.groups {
            document.insert(group.name().to_string(), Value::Object(group.to_map()));
        }
        for (key, value) in &self.metadata {
            document.insert(key.clone(), value.clone());
        }
        document
    }

    /// Read a document and bring it to the current schema.
    ///
    /// With `backup` set, an outdated document's file is copied to a
    /// `.bak` sibling before migrations run; backup failure is
    /// logged and does not abort the load.
    fn read_and_migrate(&self, target: &Path, backup: bool) -> SettingsResult<Map<String, Value>> {
        let document = read_document(target)?;
        let declared = declared_schema(&document)
            .map_err(|reason| SettingsError::format(target, reason))?;
        if backup && declared < self.migrations.target_schema() {
            backup_document(target);
        }
        self.migrations.apply(document)
    }

    /// Distribute a migrated document into the groups.
    ///
    /// Staged on copies: a rejected section aborts with the
    /// registry's prior values intact. Sections that are not objects
    /// are dropped the same way unknown keys are, and everything
    /// outside the group sections becomes retained metadata.
    fn adopt_document(&mut self, document: Map<String, Value>) -> SettingsResult<()> {
        let mut staged = self.groups.clone();
        for group in &mut staged {
            if let Some(Value::Object(section)) = document.get(group.name()) {
                group.from_map(section)?;
            }
        }

        let mut metadata = document;
        metadata.remove("version");
        metadata.remove("schema_version");
        for group in &staged {
            metadata.remove(group.name());
        }

        self.groups = staged;
        self.metadata = metadata;
        Ok(())
    }
}

/// Pointer identity of two shared observer handles.
fn same_observer(a: &SharedObserver, b: &SharedObserver) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Parse a document file into its root object.
fn read_document(target: &Path) -> SettingsResult<Map<String, Value>> {
    let content = fs::read_to_string(target).map_err(|source| SettingsError::io(target, source))?;
    let parsed: Value =
        serde_json::from_str(&content).map_err(|err| SettingsError::format(target, err.to_string()))?;
    match parsed {
        Value::Object(map) => Ok(map),
        other => Err(SettingsError::format(
            target,
            format!("document root must be an object, got {}", ValueKind::of(&other)),
        )),
    }
}

/// Serialize and write a document atomically.
fn write_document(target: &Path, document: &Map<String, Value>) -> SettingsResult<()> {
    let content = serde_json::to_string_pretty(document)
        .map_err(|err| SettingsError::format(target, err.to_string()))?;
    atomic_write(target, &content).map_err(|source| SettingsError::io(target, source))
}

/// Write content to a temp file in the target directory, then rename.
///
/// A crash mid-write never leaves a half-written document at the
/// target path.
fn atomic_write(target: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = target.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, target)
}

/// Copy an outdated document to a `.bak` sibling before migration.
fn backup_document(target: &Path) {
    let backup_path = target.with_extension("json.bak");
    match fs::copy(target, &backup_path) {
        Ok(_) => tracing::info!("Backed up settings document to {}", backup_path.display()),
        Err(err) => tracing::warn!(
            "Could not back up {} before migration: {}",
            target.display(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::observers::SettingsObserver;
    use parking_lot::Mutex;
    use tempfile::tempdir;

    /// Observer that records every notification it receives.
    #[derive(Default)]
    struct RecordingObserver {
        changes: Mutex<Vec<(String, String, Value, Value)>>,
    }

    impl RecordingObserver {
        fn changes(&self) -> Vec<(String, String, Value, Value)> {
            self.changes.lock().clone()
        }
    }

    impl SettingsObserver for RecordingObserver {
        fn on_setting_changed(&self, group: &str, key: &str, old: &Value, new: &Value) {
            self.changes.lock().push((
                group.to_string(),
                key.to_string(),
                old.clone(),
                new.clone(),
            ));
        }
    }

    /// Observer that fails on every notification.
    struct PanickingObserver;

    impl SettingsObserver for PanickingObserver {
        fn on_setting_changed(&self, _: &str, _: &str, _: &Value, _: &Value) {
            panic!("observer failure");
        }
    }

    /// Observer that appends its tag to a shared order log.
    struct TagObserver {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl SettingsObserver for TagObserver {
        fn on_setting_changed(&self, _: &str, _: &str, _: &Value, _: &Value) {
            self.log.lock().push(self.tag);
        }
    }

    fn write_raw(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn write_json(path: &Path, value: &Value) {
        write_raw(path, &serde_json::to_string_pretty(value).unwrap());
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn fresh_registry_serves_defaults() {
        let dir = tempdir().unwrap();
        let registry = SettingsRegistry::new(dir.path().join("config.json"));

        assert_eq!(registry.get_value("app", "language").unwrap(), json!("ru"));
        assert_eq!(
            registry.get_value("connections", "refresh_rate_ms").unwrap(),
            json!(5000)
        );
        assert!(!registry.is_dirty());
        assert!(registry.validate());
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let mut registry = SettingsRegistry::new(dir.path().join("config.json"));

        registry.set_value("app", "language", json!("en")).unwrap();
        assert_eq!(registry.get_value("app", "language").unwrap(), json!("en"));
        assert!(registry.is_dirty());
    }

    #[test]
    fn unknown_group_is_not_found_even_with_default() {
        let dir = tempdir().unwrap();
        let registry = SettingsRegistry::new(dir.path().join("config.json"));

        let err = registry.get_value("bogus", "language").unwrap_err();
        assert!(matches!(err, SettingsError::NotFound { .. }));

        // A supplied default never masks a missing group.
        let err = registry
            .get_value_or("bogus", "language", json!("en"))
            .unwrap_err();
        assert!(matches!(err, SettingsError::NotFound { .. }));
    }

    #[test]
    fn default_masks_missing_key_only() {
        let dir = tempdir().unwrap();
        let registry = SettingsRegistry::new(dir.path().join("config.json"));

        assert_eq!(
            registry.get_value_or("app", "nonexistent", json!(42)).unwrap(),
            json!(42)
        );
        // A present key wins over the supplied default.
        assert_eq!(
            registry.get_value_or("app", "language", json!("en")).unwrap(),
            json!("ru")
        );
    }

    #[test]
    fn rejected_set_changes_nothing_and_notifies_nobody() {
        let dir = tempdir().unwrap();
        let mut registry = SettingsRegistry::new(dir.path().join("config.json"));
        let recorder = Arc::new(RecordingObserver::default());
        registry.register_observer(recorder.clone());

        let err = registry
            .set_value("logging", "level", json!("TRACE"))
            .unwrap_err();
        assert!(matches!(err, SettingsError::Validation { .. }));
        assert_eq!(registry.get_value("logging", "level").unwrap(), json!("INFO"));

        let err = registry
            .set_value("connections", "refresh_rate_ms", json!(500))
            .unwrap_err();
        assert!(matches!(err, SettingsError::Validation { .. }));

        assert!(recorder.changes().is_empty());
        assert!(!registry.is_dirty());
    }

    #[test]
    fn panicking_observer_does_not_break_others_or_the_write() {
        let dir = tempdir().unwrap();
        let mut registry = SettingsRegistry::new(dir.path().join("config.json"));
        let recorder = Arc::new(RecordingObserver::default());
        registry.register_observer(Arc::new(PanickingObserver));
        registry.register_observer(recorder.clone());

        registry.set_value("app", "theme", json!("dark")).unwrap();

        let changes = recorder.changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[0],
            (
                "app".to_string(),
                "theme".to_string(),
                json!("system"),
                json!("dark")
            )
        );
    }

    #[test]
    fn observers_run_in_registration_order() {
        let dir = tempdir().unwrap();
        let mut registry = SettingsRegistry::new(dir.path().join("config.json"));
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.register_observer(Arc::new(TagObserver {
            tag: "first",
            log: log.clone(),
        }));
        registry.register_observer(Arc::new(TagObserver {
            tag: "second",
            log: log.clone(),
        }));

        registry.set_value("app", "language", json!("en")).unwrap();
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn observer_registration_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut registry = SettingsRegistry::new(dir.path().join("config.json"));
        let recorder = Arc::new(RecordingObserver::default());

        let handle: SharedObserver = recorder.clone();
        registry.register_observer(handle.clone());
        registry.register_observer(handle.clone());

        registry.set_value("app", "theme", json!("light")).unwrap();
        assert_eq!(recorder.changes().len(), 1);

        registry.unregister_observer(&handle);
        // Removing again is a no-op, not an error.
        registry.unregister_observer(&handle);

        registry.set_value("app", "theme", json!("dark")).unwrap();
        assert_eq!(recorder.changes().len(), 1);
    }

    #[test]
    fn save_writes_document_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("workspace").join("config.json");
        let mut registry = SettingsRegistry::new(&config_path);

        registry.save_to_disk(None).unwrap();

        assert!(config_path.exists());
        assert!(!config_path.with_extension("json.tmp").exists());

        let document = read_json(&config_path);
        assert_eq!(document["version"], json!(CURRENT_VERSION));
        assert_eq!(document["schema_version"], json!(CURRENT_SCHEMA_VERSION));
        assert_eq!(document["app"]["language"], json!("ru"));
        assert_eq!(document["theme"]["colors"]["dark"]["primary"], json!("#32b8c6"));
    }

    #[test]
    fn persistence_round_trip_reproduces_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        let mut registry = SettingsRegistry::new(&config_path);
        registry.set_value("app", "language", json!("en")).unwrap();
        registry
            .set_value("connections", "refresh_rate_ms", json!(2500))
            .unwrap();
        registry
            .set_value("theme", "colors.light.primary", json!("#abcdef"))
            .unwrap();
        registry
            .set_value("hotkeys", "exit_app", json!("Ctrl+W"))
            .unwrap();
        registry.save_to_disk(None).unwrap();
        assert!(!registry.is_dirty());

        let mut fresh = SettingsRegistry::new(&config_path);
        fresh.load_from_disk(None).unwrap();

        assert_eq!(fresh.get_value("app", "language").unwrap(), json!("en"));
        assert_eq!(
            fresh.get_value("connections", "refresh_rate_ms").unwrap(),
            json!(2500)
        );
        assert_eq!(
            fresh.get_value("theme", "colors.light.primary").unwrap(),
            json!("#abcdef")
        );
        assert_eq!(fresh.get_value("hotkeys", "exit_app").unwrap(), json!("Ctrl+W"));
        assert!(!fresh.is_dirty());
    }

    #[test]
    fn missing_file_keeps_defaults_and_marks_dirty() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let mut registry = SettingsRegistry::new(&config_path);

        registry.load_from_disk(None).unwrap();
        assert_eq!(registry.get_value("app", "language").unwrap(), json!("ru"));
        assert!(registry.is_dirty());

        // The next flush materializes the default document.
        assert!(registry.save_if_dirty().unwrap());
        assert!(config_path.exists());
        assert!(!registry.save_if_dirty().unwrap());
    }

    #[test]
    fn corrupted_file_is_format_error_and_state_survives() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let mut registry = SettingsRegistry::new(&config_path);
        registry.set_value("app", "language", json!("en")).unwrap();

        write_raw(&config_path, "not json {{{");
        let err = registry.load_from_disk(None).unwrap_err();
        assert!(matches!(err, SettingsError::Format { .. }));
        assert_eq!(registry.get_value("app", "language").unwrap(), json!("en"));
    }

    #[test]
    fn non_object_root_is_format_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        write_json(&config_path, &json!([1, 2, 3]));

        let mut registry = SettingsRegistry::new(&config_path);
        let err = registry.load_from_disk(None).unwrap_err();
        match err {
            SettingsError::Format { reason, .. } => assert!(reason.contains("array")),
            other => panic!("expected format error, got {}", other),
        }
    }

    #[test]
    fn non_integer_schema_version_is_format_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        write_json(&config_path, &json!({ "schema_version": "two" }));

        let mut registry = SettingsRegistry::new(&config_path);
        let err = registry.load_from_disk(None).unwrap_err();
        assert!(matches!(err, SettingsError::Format { .. }));
    }

    #[test]
    fn missing_migration_edge_leaves_state_intact() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        write_json(
            &config_path,
            &json!({ "schema_version": 0, "app": { "language": "en" } }),
        );

        let mut registry = SettingsRegistry::new(&config_path);
        let err = registry.load_from_disk(None).unwrap_err();
        assert!(matches!(err, SettingsError::Migration { .. }));
        assert_eq!(registry.get_value("app", "language").unwrap(), json!("ru"));
    }

    #[test]
    fn schema_one_document_is_migrated_and_backed_up() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        write_json(
            &config_path,
            &json!({
                "version": "1.0.0",
                "schema_version": 1,
                "app": { "language": "en" },
            }),
        );

        let mut registry = SettingsRegistry::new(&config_path);
        registry.load_from_disk(None).unwrap();

        assert_eq!(registry.get_value("app", "language").unwrap(), json!("en"));
        assert_eq!(
            registry.metadata()["notifications"]["enabled"],
            json!(true)
        );

        // The pre-migration document was preserved as a sibling.
        let backup = read_json(&config_path.with_extension("json.bak"));
        assert_eq!(backup["schema_version"], json!(1));

        // The injected section reaches the document on save.
        registry.save_to_disk(None).unwrap();
        let saved = read_json(&config_path);
        assert_eq!(saved["schema_version"], json!(CURRENT_SCHEMA_VERSION));
        assert_eq!(saved["notifications"]["show_build_notifications"], json!(true));
    }

    #[test]
    fn unknown_top_level_sections_survive_round_trip() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        write_json(
            &config_path,
            &json!({
                "version": CURRENT_VERSION,
                "schema_version": CURRENT_SCHEMA_VERSION,
                "experimental": { "flag": "kept" },
            }),
        );

        let mut registry = SettingsRegistry::new(&config_path);
        registry.load_from_disk(None).unwrap();
        registry.save_to_disk(None).unwrap();

        let saved = read_json(&config_path);
        assert_eq!(saved["experimental"]["flag"], json!("kept"));
    }

    #[test]
    fn malformed_group_section_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        write_json(
            &config_path,
            &json!({
                "version": CURRENT_VERSION,
                "schema_version": CURRENT_SCHEMA_VERSION,
                "app": 5,
            }),
        );

        let mut registry = SettingsRegistry::new(&config_path);
        registry.load_from_disk(None).unwrap();
        assert_eq!(registry.get_value("app", "language").unwrap(), json!("ru"));
    }

    #[test]
    fn invalid_section_value_aborts_load_without_partial_state() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        // A valid app section followed (in document order) by an
        // invalid connections value.
        write_json(
            &config_path,
            &json!({
                "version": CURRENT_VERSION,
                "schema_version": CURRENT_SCHEMA_VERSION,
                "app": { "language": "en" },
                "connections": { "refresh_rate_ms": 100 },
            }),
        );

        let mut registry = SettingsRegistry::new(&config_path);
        let err = registry.load_from_disk(None).unwrap_err();
        assert!(matches!(err, SettingsError::Validation { .. }));

        // Neither section was applied.
        assert_eq!(registry.get_value("app", "language").unwrap(), json!("ru"));
        assert_eq!(
            registry.get_value("connections", "refresh_rate_ms").unwrap(),
            json!(5000)
        );
    }

    #[test]
    fn reset_to_defaults_restores_every_group() {
        let dir = tempdir().unwrap();
        let mut registry = SettingsRegistry::new(dir.path().join("config.json"));
        registry.set_value("app", "language", json!("en")).unwrap();
        registry
            .set_value("logging", "level", json!("ERROR"))
            .unwrap();
        registry.save_to_disk(None).unwrap();

        registry.reset_to_defaults();
        assert_eq!(registry.get_value("app", "language").unwrap(), json!("ru"));
        assert_eq!(registry.get_value("logging", "level").unwrap(), json!("INFO"));
        assert!(registry.is_dirty());
    }

    #[test]
    fn export_writes_backup_without_touching_canonical_state() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let backup_path = dir.path().join("backup.json");

        let mut registry = SettingsRegistry::new(&config_path);
        registry.set_value("app", "language", json!("en")).unwrap();
        registry.export_to_json(&backup_path).unwrap();

        assert_eq!(read_json(&backup_path)["app"]["language"], json!("en"));
        // Export is outside normal persistence: the canonical file
        // was not written and the dirty flag still stands.
        assert!(!config_path.exists());
        assert!(registry.is_dirty());
    }

    #[test]
    fn import_restores_values_and_marks_dirty() {
        let dir = tempdir().unwrap();
        let backup_path = dir.path().join("backup.json");

        let mut source = SettingsRegistry::new(dir.path().join("a.json"));
        source.set_value("app", "language", json!("en")).unwrap();
        source
            .set_value("projects", "auto_load_projects", json!(false))
            .unwrap();
        source.export_to_json(&backup_path).unwrap();

        let canonical = dir.path().join("b.json");
        let mut target = SettingsRegistry::new(&canonical);
        target.import_from_json(&backup_path).unwrap();

        assert_eq!(target.get_value("app", "language").unwrap(), json!("en"));
        assert_eq!(
            target.get_value("projects", "auto_load_projects").unwrap(),
            json!(false)
        );
        // Import marks dirty; the canonical file waits for a flush.
        assert!(target.is_dirty());
        assert!(!canonical.exists());
    }

    #[test]
    fn import_from_missing_path_is_io_error() {
        let dir = tempdir().unwrap();
        let mut registry = SettingsRegistry::new(dir.path().join("config.json"));

        let err = registry
            .import_from_json(&dir.path().join("nope.json"))
            .unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
