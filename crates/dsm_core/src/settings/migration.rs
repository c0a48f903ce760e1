//! Schema migrations for the persisted settings document.
//!
//! Each released schema change registers one step. Loading walks the
//! contiguous chain from the document's declared schema version to
//! the current target and applies every transform in order; a
//! missing link is an error, never a silent stop.

use serde_json::{json, Map, Value};

use super::errors::{SettingsError, SettingsResult};
use super::schema::{CURRENT_SCHEMA_VERSION, CURRENT_VERSION};

/// Transform for one schema step: raw document in, raw document out.
pub type MigrationFn =
    Box<dyn Fn(Map<String, Value>) -> Result<Map<String, Value>, String> + Send + Sync>;

/// One registered edge of the migration chain.
struct MigrationStep {
    from: u32,
    to: u32,
    transform: MigrationFn,
}

/// Ordered table of version-to-version document transforms.
pub struct MigrationEngine {
    steps: Vec<MigrationStep>,
    target_schema: u32,
    target_version: String,
}

impl MigrationEngine {
    /// Engine targeting the current document version.
    pub fn new() -> Self {
        Self::with_target(CURRENT_SCHEMA_VERSION, CURRENT_VERSION)
    }

    /// Engine with an explicit target (used by tests).
    pub fn with_target(schema: u32, version: impl Into<String>) -> Self {
        Self {
            steps: Vec::new(),
            target_schema: schema,
            target_version: version.into(),
        }
    }

    /// Register a transform for one schema step.
    pub fn register(&mut self, from: u32, to: u32, transform: MigrationFn) {
        self.steps.push(MigrationStep {
            from,
            to,
            transform,
        });
    }

    /// Schema version documents are migrated to.
    pub fn target_schema(&self) -> u32 {
        self.target_schema
    }

    /// Apply the chain from the document's declared schema version
    /// to the target, threading each transform's output into the
    /// next.
    ///
    /// A document already at the target passes through unchanged; a
    /// document beyond it is left alone with a warning. A missing
    /// edge or a failing transform aborts with a Migration error and
    /// no partial result. After the last transform the document's
    /// version fields are set to the targets.
    pub fn apply(&self, document: Map<String, Value>) -> SettingsResult<Map<String, Value>> {
        let declared = declared_schema(&document)
            .map_err(|reason| SettingsError::migration(0, self.target_schema, reason))?;

        if declared == self.target_schema {
            return Ok(document);
        }
        if declared > self.target_schema {
            tracing::warn!(
                "Settings document declares schema {} ahead of supported {}; leaving it untouched",
                declared,
                self.target_schema
            );
            return Ok(document);
        }

        let mut current = document;
        let mut version = declared;
        while version < self.target_schema {
            let step = self
                .steps
                .iter()
                .find(|s| s.from == version)
                .ok_or_else(|| {
                    SettingsError::migration(
                        version,
                        self.target_schema,
                        format!("no migration registered from schema {}", version),
                    )
                })?;
            if step.to <= version {
                return Err(SettingsError::migration(
                    step.from,
                    step.to,
                    "migration step does not increase the schema version",
                ));
            }

            tracing::info!("Migrating settings document: schema {} -> {}", step.from, step.to);
            current = (step.transform)(current)
                .map_err(|reason| SettingsError::migration(step.from, step.to, reason))?;
            version = step.to;
        }

        current.insert("version".to_string(), json!(self.target_version));
        current.insert("schema_version".to_string(), json!(self.target_schema));
        Ok(current)
    }
}

impl Default for MigrationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Declared schema version of a raw document.
///
/// Absent means the first released schema. A non-integer declaration
/// is reported as text so the caller can surface it as a format
/// error with the file path attached.
pub fn declared_schema(document: &Map<String, Value>) -> Result<u32, String> {
    match document.get("schema_version") {
        None => Ok(1),
        Some(value) => value
            .as_u64()
            .map(|v| v as u32)
            .ok_or_else(|| format!("schema_version must be an integer, got {}", value)),
    }
}

/// Engine with every released migration registered.
pub fn standard_migrations() -> MigrationEngine {
    let mut engine = MigrationEngine::new();
    engine.register(1, 2, Box::new(migrate_1_to_2));
    engine
}

/// 1 -> 2: desktop notifications got their own document section.
fn migrate_1_to_2(mut document: Map<String, Value>) -> Result<Map<String, Value>, String> {
    document.entry("notifications").or_insert_with(|| {
        json!({
            "enabled": true,
            "show_container_updates": true,
            "show_build_notifications": true,
        })
    });
    Ok(document)
}
