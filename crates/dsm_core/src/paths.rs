//! Workspace directory layout.
//!
//! All persistent state lives under one workspace root, `.dsmanager`
//! inside the user's home directory. Setting `DSM_HOME` replaces the
//! home lookup with an explicit directory.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Workspace directory created under the resolved home.
pub const WORKSPACE_DIR_NAME: &str = ".dsmanager";
/// Environment variable replacing the home directory lookup.
pub const ENV_HOME_OVERRIDE: &str = "DSM_HOME";
/// Settings document file name inside the workspace.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Resolved locations of the on-disk workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    root: PathBuf,
}

impl WorkspacePaths {
    /// Resolve the workspace for this process.
    ///
    /// `DSM_HOME` wins when set; otherwise the workspace sits in the
    /// user's home directory. Without a resolvable home it lands
    /// under the working directory.
    pub fn resolve() -> Self {
        let override_home = env::var_os(ENV_HOME_OVERRIDE).map(PathBuf::from);
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Self::from_home(override_home.or(home))
    }

    /// A workspace rooted at an explicit directory, bypassing home
    /// resolution.
    pub fn at_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn from_home(home: Option<PathBuf>) -> Self {
        let base = home.unwrap_or_else(|| PathBuf::from("."));
        Self {
            root: base.join(WORKSPACE_DIR_NAME),
        }
    }

    /// Workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Settings document location.
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// Directory receiving application log files.
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Directory holding per-project state.
    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    /// Create the workspace directory tree if missing.
    pub fn ensure_exists(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::create_dir_all(self.logs_dir())?;
        fs::create_dir_all(self.projects_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn workspace_sits_inside_the_home_directory() {
        let paths = WorkspacePaths::from_home(Some(PathBuf::from("/home/user")));
        assert_eq!(paths.root(), Path::new("/home/user/.dsmanager"));
    }

    #[test]
    fn missing_home_falls_back_to_working_directory() {
        let paths = WorkspacePaths::from_home(None);
        assert_eq!(paths.root(), PathBuf::from(".").join(WORKSPACE_DIR_NAME));
    }

    #[test]
    fn derived_paths_hang_off_the_root() {
        let paths = WorkspacePaths::at_root("/tmp/ws");
        assert_eq!(paths.config_file(), Path::new("/tmp/ws/config.json"));
        assert_eq!(paths.logs_dir(), Path::new("/tmp/ws/logs"));
        assert_eq!(paths.projects_dir(), Path::new("/tmp/ws/projects"));
    }

    #[test]
    fn resolve_honors_the_home_override() {
        let dir = tempdir().unwrap();
        env::set_var(ENV_HOME_OVERRIDE, dir.path());
        let paths = WorkspacePaths::resolve();
        env::remove_var(ENV_HOME_OVERRIDE);

        assert_eq!(paths.root(), dir.path().join(WORKSPACE_DIR_NAME));
    }

    #[test]
    fn ensure_exists_creates_the_tree_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let paths = WorkspacePaths::at_root(dir.path().join("ws"));

        paths.ensure_exists().unwrap();
        assert!(paths.root().is_dir());
        assert!(paths.logs_dir().is_dir());
        assert!(paths.projects_dir().is_dir());

        paths.ensure_exists().unwrap();
    }
}
