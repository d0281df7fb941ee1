//! Configuration resolution
//!
//! Each setting resolves with the priority: command-line argument, then
//! environment variable, then the TOML config file
//! (`~/.config/dupkeep/config.toml`). The library and playlists roots are
//! required; the quarantine directory defaults to `duplicates` under the
//! library root. The indexer excludes the quarantine directory from scanning
//! wherever it lives.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

pub const ENV_LIBRARY_ROOT: &str = "DUPKEEP_LIBRARY_ROOT";
pub const ENV_PLAYLISTS_ROOT: &str = "DUPKEEP_PLAYLISTS_ROOT";
pub const ENV_QUARANTINE_DIR: &str = "DUPKEEP_QUARANTINE_DIR";

/// Default quarantine directory name, relative to the library root
pub const DEFAULT_QUARANTINE_DIR: &str = "duplicates";

/// On-disk configuration file model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub library_root: Option<PathBuf>,
    pub playlists_root: Option<PathBuf>,
    pub quarantine_dir: Option<PathBuf>,
}

/// Fully resolved run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub library_root: PathBuf,
    pub playlists_root: PathBuf,
    pub quarantine_dir: PathBuf,
}

impl Config {
    /// Resolve configuration from CLI arguments, environment, and the config
    /// file, in that priority order.
    pub fn resolve(
        cli_library_root: Option<PathBuf>,
        cli_playlists_root: Option<PathBuf>,
        cli_quarantine_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let file = load_toml_config()?;
        Self::resolve_from(
            cli_library_root,
            cli_playlists_root,
            cli_quarantine_dir,
            &file,
        )
    }

    fn resolve_from(
        cli_library_root: Option<PathBuf>,
        cli_playlists_root: Option<PathBuf>,
        cli_quarantine_dir: Option<PathBuf>,
        file: &TomlConfig,
    ) -> Result<Self> {
        let library_root = resolve_setting(
            "library root",
            cli_library_root,
            ENV_LIBRARY_ROOT,
            file.library_root.clone(),
        )
        .ok_or_else(|| {
            Error::Config(format!(
                "library root not configured (--library-root, {ENV_LIBRARY_ROOT}, or config.toml)"
            ))
        })?;

        let playlists_root = resolve_setting(
            "playlists root",
            cli_playlists_root,
            ENV_PLAYLISTS_ROOT,
            file.playlists_root.clone(),
        )
        .ok_or_else(|| {
            Error::Config(format!(
                "playlists root not configured (--playlists-root, {ENV_PLAYLISTS_ROOT}, or config.toml)"
            ))
        })?;

        let quarantine_dir = resolve_setting(
            "quarantine dir",
            cli_quarantine_dir,
            ENV_QUARANTINE_DIR,
            file.quarantine_dir.clone(),
        )
        .unwrap_or_else(|| library_root.join(DEFAULT_QUARANTINE_DIR));

        Ok(Self {
            library_root,
            playlists_root,
            quarantine_dir,
        })
    }
}

/// Resolve one setting with CLI → ENV → file priority, warning when more than
/// one source is set (potential misconfiguration).
fn resolve_setting(
    name: &str,
    cli: Option<PathBuf>,
    env_var: &str,
    file: Option<PathBuf>,
) -> Option<PathBuf> {
    let env_value = std::env::var(env_var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    let sources = [cli.is_some(), env_value.is_some(), file.is_some()]
        .iter()
        .filter(|set| **set)
        .count();
    if sources > 1 {
        warn!(
            "{} set in multiple sources; using the highest-priority one",
            name
        );
    }

    cli.or(env_value).or(file)
}

/// Load the config file when present; a missing file is simply the default
/// configuration, a malformed one is an error.
fn load_toml_config() -> Result<TomlConfig> {
    let Some(path) = config_file_path() else {
        return Ok(TomlConfig::default());
    };
    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dupkeep").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn file_config(library: Option<&str>, playlists: Option<&str>, quarantine: Option<&str>) -> TomlConfig {
        TomlConfig {
            library_root: library.map(PathBuf::from),
            playlists_root: playlists.map(PathBuf::from),
            quarantine_dir: quarantine.map(PathBuf::from),
        }
    }

    fn clear_env() {
        std::env::remove_var(ENV_LIBRARY_ROOT);
        std::env::remove_var(ENV_PLAYLISTS_ROOT);
        std::env::remove_var(ENV_QUARANTINE_DIR);
    }

    #[test]
    #[serial]
    fn cli_overrides_file() {
        clear_env();
        let file = file_config(Some("/file/lib"), Some("/file/pl"), None);

        let config = Config::resolve_from(
            Some(PathBuf::from("/cli/lib")),
            None,
            None,
            &file,
        )
        .unwrap();

        assert_eq!(config.library_root, PathBuf::from("/cli/lib"));
        assert_eq!(config.playlists_root, PathBuf::from("/file/pl"));
    }

    #[test]
    #[serial]
    fn env_overrides_file() {
        clear_env();
        std::env::set_var(ENV_LIBRARY_ROOT, "/env/lib");
        let file = file_config(Some("/file/lib"), Some("/file/pl"), None);

        let config = Config::resolve_from(None, None, None, &file).unwrap();

        assert_eq!(config.library_root, PathBuf::from("/env/lib"));
        clear_env();
    }

    #[test]
    #[serial]
    fn quarantine_defaults_under_library_root() {
        clear_env();
        let file = file_config(Some("/file/lib"), Some("/file/pl"), None);

        let config = Config::resolve_from(None, None, None, &file).unwrap();

        assert_eq!(
            config.quarantine_dir,
            PathBuf::from("/file/lib").join(DEFAULT_QUARANTINE_DIR)
        );
    }

    #[test]
    #[serial]
    fn missing_library_root_is_an_error() {
        clear_env();
        let result = Config::resolve_from(None, None, None, &TomlConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn blank_env_value_is_ignored() {
        clear_env();
        std::env::set_var(ENV_LIBRARY_ROOT, "   ");
        let file = file_config(Some("/file/lib"), Some("/file/pl"), None);

        let config = Config::resolve_from(None, None, None, &file).unwrap();

        assert_eq!(config.library_root, PathBuf::from("/file/lib"));
        clear_env();
    }
}
