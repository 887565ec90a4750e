//! Application path configuration (config/data directories, log files).
//!
//! Resolution order: CLI override, REPIX_CONFIG_DIR/REPIX_DATA_DIR
//! environment variables, platform defaults.

use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PathConfig {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl PathConfig {
    /// Build path configuration from CLI args and environment.
    /// A CLI override puts config and data in the same directory.
    pub fn from_env_and_cli(cli_override: Option<PathBuf>) -> Self {
        if let Some(dir) = cli_override {
            return Self {
                config_dir: dir.clone(),
                data_dir: dir,
            };
        }

        let config_dir = std::env::var_os("REPIX_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs_next::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("repix")
            });
        let data_dir = std::env::var_os("REPIX_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs_next::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("repix")
            });

        Self { config_dir, data_dir }
    }
}

/// Create the application directories if missing.
pub fn ensure_dirs(paths: &PathConfig) -> io::Result<()> {
    std::fs::create_dir_all(&paths.config_dir)?;
    std::fs::create_dir_all(&paths.data_dir)?;
    Ok(())
}

/// Path of a file in the data directory (logs, caches).
pub fn data_file(name: &str, paths: &PathConfig) -> PathBuf {
    paths.data_dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override_wins() {
        let paths = PathConfig::from_env_and_cli(Some(PathBuf::from("/tmp/repix-test")));
        assert_eq!(paths.config_dir, PathBuf::from("/tmp/repix-test"));
        assert_eq!(paths.data_dir, PathBuf::from("/tmp/repix-test"));
        assert_eq!(
            data_file("repix.log", &paths),
            PathBuf::from("/tmp/repix-test/repix.log")
        );
    }
}
