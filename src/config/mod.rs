#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use toml_config::TomlConfig;

use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::path::{Path, PathBuf};

/// Loads and validates the settings file, or returns empty settings when no
/// file was given.
pub fn load_settings(path: Option<&Path>) -> Result<TomlConfig> {
    let config = match path {
        Some(path) => TomlConfig::from_file(path)?,
        None => TomlConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Command-line value first, then the settings file, then `ask`.
pub fn resolve_path<F>(flag: Option<PathBuf>, file: Option<&Path>, ask: F) -> Result<PathBuf>
where
    F: FnOnce() -> Result<PathBuf>,
{
    match (flag, file) {
        (Some(path), _) => Ok(path),
        (None, Some(path)) => Ok(path.to_path_buf()),
        (None, None) => ask(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::MaintError;

    #[test]
    fn test_flag_wins_over_file_and_prompt() {
        let resolved = resolve_path(
            Some(PathBuf::from("flag.db")),
            Some(Path::new("file.db")),
            || panic!("must not prompt"),
        )
        .unwrap();
        assert_eq!(resolved, PathBuf::from("flag.db"));
    }

    #[test]
    fn test_file_wins_over_prompt() {
        let resolved =
            resolve_path(None, Some(Path::new("file.db")), || panic!("must not prompt")).unwrap();
        assert_eq!(resolved, PathBuf::from("file.db"));
    }

    #[test]
    fn test_prompt_as_last_resort() {
        let resolved = resolve_path(None, None, || Ok(PathBuf::from("typed.db"))).unwrap();
        assert_eq!(resolved, PathBuf::from("typed.db"));

        let failed = resolve_path(None, None, || {
            Err(MaintError::MissingConfigError {
                field: "store.path".to_string(),
            })
        });
        assert!(failed.is_err());
    }

    #[test]
    fn test_load_settings_without_file() {
        let config = load_settings(None).unwrap();
        assert!(config.store_path().is_none());
    }
}
