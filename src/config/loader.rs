use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::PyqualConfig;
use super::scoring::{DebtCosts, ScoringWeights};
use crate::core::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".pyqual.toml";

/// Read the raw contents of a config file
pub(crate) fn read_config_file(path: &Path) -> Result<String> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse a TOML string and repair invalid weight or cost tables
pub fn parse_and_validate_config(contents: &str) -> Result<PyqualConfig> {
    let mut config = toml::from_str::<PyqualConfig>(contents).map_err(|e| {
        Error::Configuration(format!("failed to parse {}: {}", CONFIG_FILE_NAME, e))
    })?;

    if let Err(e) = config.scoring.validate() {
        log::warn!("Invalid scoring weights: {}. Using defaults.", e);
        config.scoring = ScoringWeights::default();
    } else {
        config.scoring.normalize();
    }

    if let Err(e) = config.debt.validate() {
        log::warn!("Invalid debt costs: {}. Using defaults.", e);
        config.debt = DebtCosts::default();
    }

    Ok(config)
}

pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<PyqualConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// Only log actual errors, not "file not found"
pub(crate) fn handle_read_error(config_path: &Path, error: &Error) {
    let not_found = matches!(error, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound);
    if !not_found {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// `start` followed by its ancestors, at most `max_depth` directories
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

/// Search `start` and its ancestors for a config file
pub fn load_config_from(start: PathBuf) -> PyqualConfig {
    const MAX_TRAVERSAL_DEPTH: usize = 10;

    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            PyqualConfig::default()
        })
}

pub fn load_config() -> PyqualConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_from(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            PyqualConfig::default()
        }
    }
}
