//! Path management for medfolio's local files.
//!
//! ```text
//! ~/.config/medfolio/          # Config directory (platform default)
//! ├── config.toml              # Backend address
//! ├── state.toml               # Session token, email, last view (0600)
//! ├── history.txt              # REPL history
//! └── logs/
//!     └── medfolio.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "medfolio";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find a config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves medfolio's files, optionally under an explicit base directory.
#[derive(Debug, Clone, Default)]
pub struct MedfolioPaths {
    base: Option<PathBuf>,
}

impl MedfolioPaths {
    /// `base` replaces the platform config directory when given.
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn state_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("state.toml"))
    }

    pub fn history_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("history.txt"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_base_is_used_verbatim() {
        let paths = MedfolioPaths::new(Some(PathBuf::from("/tmp/medfolio-test")));
        assert_eq!(
            paths.state_file().unwrap(),
            PathBuf::from("/tmp/medfolio-test/state.toml")
        );
        assert_eq!(
            paths.logs_dir().unwrap(),
            PathBuf::from("/tmp/medfolio-test/logs")
        );
    }

    #[test]
    fn test_files_live_under_config_dir() {
        let paths = MedfolioPaths::new(None);
        if let Ok(config_dir) = paths.config_dir() {
            assert!(config_dir.ends_with("medfolio"));
            assert!(paths.config_file().unwrap().starts_with(&config_dir));
            assert!(paths.history_file().unwrap().starts_with(&config_dir));
        }
    }
}
