use std::fs;
use std::path::{Path, PathBuf};

use super::{AnalyzerConfig, ConfigError};

pub const CONFIG_FILE_NAME: &str = ".algoscope.toml";

/// How many directories (the start included) discovery inspects.
pub const MAX_TRAVERSAL_DEPTH: usize = 10;

fn read_config(path: &Path) -> Result<AnalyzerConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = AnalyzerConfig::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Load a config file the user named explicitly. Any failure is an error.
pub fn load_explicit(path: &Path) -> Result<AnalyzerConfig, ConfigError> {
    let config = read_config(path)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Discovery attempt for one candidate. Missing files are silent; broken
/// ones are logged and skipped.
fn try_load_config_from_path(path: &Path) -> Option<AnalyzerConfig> {
    match read_config(path) {
        Ok(config) => {
            log::debug!("Loaded config from {}", path.display());
            Some(config)
        }
        Err(ConfigError::Read { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            None
        }
        Err(e) => {
            log::warn!("{e}. Using defaults.");
            Some(AnalyzerConfig::default())
        }
    }
}

/// `start` and its parents, nearest first, at most `max_depth` entries.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for [`CONFIG_FILE_NAME`].
pub fn load_config_from(start: &Path) -> AnalyzerConfig {
    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            AnalyzerConfig::default()
        })
}

pub fn load_config() -> AnalyzerConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_from(&dir),
        Err(e) => {
            log::warn!("Failed to get current directory: {}. Using default config.", e);
            AnalyzerConfig::default()
        }
    }
}
