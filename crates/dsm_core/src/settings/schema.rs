//! Standard groups and document constants.
//!
//! Seven fixed groups make up the application's configuration: app,
//! logging, theme, hotkeys, connections, projects, ui_state. The
//! tables here are the single place defaults and rules live; every
//! default passes its own rule.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use super::group::SettingsGroup;
use super::validators::{Validator, ValueKind};

/// Application version written to the document.
pub const CURRENT_VERSION: &str = "1.1.0";

/// Schema version migrations target.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// `#RRGGBB` color form.
static HEX_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

/// Key combination form (`Ctrl+Alt+C`, `F1`).
static HOTKEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9\+\-\s]+$").unwrap());

/// Build all seven groups with defaults in place.
pub fn standard_groups() -> Vec<SettingsGroup> {
    vec![
        app_group(),
        logging_group(),
        theme_group(),
        hotkeys_group(),
        connections_group(),
        projects_group(),
        ui_state_group(),
    ]
}

/// Language, UI theme, and window geometry/state.
fn app_group() -> SettingsGroup {
    SettingsGroup::builder("app")
        .key("language", json!("ru"), Validator::one_of(&["ru", "en"]))
        .key(
            "theme",
            json!("system"),
            Validator::one_of(&["light", "dark", "system"]),
        )
        .key("window_width", json!(1920), Validator::range(800.0, 10000.0))
        .key("window_height", json!(1080), Validator::range(600.0, 10000.0))
        .key("window_x", json!(0), Validator::range(-10000.0, 10000.0))
        .key("window_y", json!(0), Validator::range(-10000.0, 10000.0))
        .key("window_maximized", json!(true), Validator::of_kind(ValueKind::Bool))
        .key("save_window_state", json!(true), Validator::of_kind(ValueKind::Bool))
        .build()
}

/// Log output toggles and file rotation limits.
fn logging_group() -> SettingsGroup {
    SettingsGroup::builder("logging")
        .key("enabled", json!(true), Validator::of_kind(ValueKind::Bool))
        .key(
            "level",
            json!("INFO"),
            Validator::one_of(&["DEBUG", "INFO", "WARNING", "ERROR"]),
        )
        .key("max_file_size_mb", json!(10), Validator::range(1.0, 1000.0))
        .key("max_archived_files", json!(5), Validator::range(1.0, 50.0))
        .build()
}

/// Light and dark palettes under the nested `colors` tree.
fn theme_group() -> SettingsGroup {
    const LIGHT: [(&str, &str); 11] = [
        ("primary", "#218094"),
        ("background", "#fcfcf9"),
        ("text", "#134252"),
        ("border", "#5e5240"),
        ("table_background", "#ffffff"),
        ("table_alternate_background", "#f5f1ea"),
        ("table_selection_background", "#d2edf4"),
        ("table_selection_text", "#134252"),
        ("accent_success", "#208094"),
        ("accent_error", "#c01547"),
        ("accent_warning", "#a84b2f"),
    ];
    const DARK: [(&str, &str); 11] = [
        ("primary", "#32b8c6"),
        ("background", "#1f2121"),
        ("text", "#f5f5f5"),
        ("border", "#777c7c"),
        ("table_background", "#2b2d30"),
        ("table_alternate_background", "#25272a"),
        ("table_selection_background", "#3a505a"),
        ("table_selection_text", "#f5f5f5"),
        ("accent_success", "#208094"),
        ("accent_error", "#c01547"),
        ("accent_warning", "#a84b2f"),
    ];

    let mut builder = SettingsGroup::builder("theme");
    for (mode, slots) in [("light", LIGHT), ("dark", DARK)] {
        for (slot, color) in slots {
            builder = builder.key(
                format!("colors.{}.{}", mode, slot),
                json!(color),
                Validator::pattern(HEX_COLOR.clone()),
            );
        }
    }
    builder.build()
}

/// Global key bindings.
fn hotkeys_group() -> SettingsGroup {
    const BINDINGS: [(&str, &str); 8] = [
        ("open_connections_manager", "Ctrl+Alt+C"),
        ("test_connection", "Ctrl+Alt+T"),
        ("open_projects_manager", "Ctrl+Alt+P"),
        ("open_settings", "Ctrl+Alt+S"),
        ("open_logs", "Ctrl+Alt+L"),
        ("open_help", "F1"),
        ("open_about", "Ctrl+Alt+I"),
        ("exit_app", "Ctrl+Q"),
    ];

    let mut builder = SettingsGroup::builder("hotkeys");
    for (action, binding) in BINDINGS {
        builder = builder.key(
            action,
            json!(binding),
            Validator::all_of(vec![
                Validator::of_kind(ValueKind::String),
                Validator::pattern(HOTKEY.clone()),
            ]),
        );
    }
    builder.build()
}

/// Docker connection startup and polling behavior.
fn connections_group() -> SettingsGroup {
    SettingsGroup::builder("connections")
        .key(
            "auto_connect_on_startup",
            json!([]),
            Validator::of_kind(ValueKind::Array),
        )
        .key(
            "default_connection",
            json!(null),
            Validator::of_kinds(&[ValueKind::String, ValueKind::Null]),
        )
        .key(
            "refresh_rate_ms",
            json!(5000),
            Validator::range(1000.0, 60000.0),
        )
        .build()
}

/// Project loading behavior.
fn projects_group() -> SettingsGroup {
    SettingsGroup::builder("projects")
        .key("auto_load_projects", json!(true), Validator::of_kind(ValueKind::Bool))
        .key(
            "default_project",
            json!(null),
            Validator::of_kinds(&[ValueKind::String, ValueKind::Null]),
        )
        .key("show_project_history", json!(true), Validator::of_kind(ValueKind::Bool))
        .build()
}

/// Open tabs and panel visibility, saved across sessions.
fn ui_state_group() -> SettingsGroup {
    SettingsGroup::builder("ui_state")
        .key("open_tabs", json!([]), Validator::of_kind(ValueKind::Array))
        .key("last_active_tab", json!(0), Validator::range(0.0, 1000.0))
        .key("dashboard_visible", json!(true), Validator::of_kind(ValueKind::Bool))
        .key("footer_visible", json!(true), Validator::of_kind(ValueKind::Bool))
        .build()
}
