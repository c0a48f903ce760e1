//! Error types for the settings subsystem.
//!
//! Validators and groups report rejection as plain return values;
//! everything is converted to `SettingsError` at the registry
//! boundary, which is the public-facing contract.

use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by registry, group, and persistence operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Unknown group name, or unknown key within a known group.
    #[error("Settings entry not found: {}", entry_path(.group, .key))]
    NotFound {
        group: String,
        key: Option<String>,
    },

    /// A value was rejected by its key's rule; nothing was stored.
    #[error("Invalid value for {group}.{key}: {reason} (got {value})")]
    Validation {
        group: String,
        key: String,
        value: Value,
        reason: String,
    },

    /// The migration chain could not bring a document to the current
    /// schema version.
    #[error("Migration from schema {from} to {to} failed: {reason}")]
    Migration { from: u32, to: u32, reason: String },

    /// Reading or writing the document failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document exists but does not have the expected shape.
    #[error("Malformed settings document {path}: {reason}")]
    Format { path: PathBuf, reason: String },
}

impl SettingsError {
    /// Create a not-found error for a group name.
    pub fn group_not_found(group: impl Into<String>) -> Self {
        Self::NotFound {
            group: group.into(),
            key: None,
        }
    }

    /// Create a not-found error for a key within a known group.
    pub fn key_not_found(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            group: group.into(),
            key: Some(key.into()),
        }
    }

    /// Create a validation error carrying the rejected value.
    pub fn validation(
        group: impl Into<String>,
        key: impl Into<String>,
        value: Value,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            group: group.into(),
            key: key.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create a migration error for a chain edge.
    pub fn migration(from: u32, to: u32, reason: impl Into<String>) -> Self {
        Self::Migration {
            from,
            to,
            reason: reason.into(),
        }
    }

    /// Create an I/O error with the file path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a format error for a structurally invalid document.
    pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

fn entry_path(group: &str, key: &Option<String>) -> String {
    match key {
        Some(key) => format!("{}.{}", group, key),
        None => group.to_string(),
    }
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;
