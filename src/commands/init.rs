use crate::config::CONFIG_FILE_NAME;
use crate::io;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = r#"# pyqual configuration

[thresholds]
max_cyclomatic = 10
max_nesting = 3
max_parameters = 5
max_function_length = 50

# Quality score weights; normalized to sum to 1
[scoring]
documentation = 0.25
complexity = 0.25
maintainability = 0.30
smells = 0.20

# Remediation minutes per finding severity
[debt]
critical = 30
warning = 10
info = 2

[docstring]
# google, numpy or rest
style = "google"
"#;

pub fn init_config_in(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    io::write_file(&config_path, DEFAULT_CONFIG)?;
    Ok(config_path)
}

pub fn init_config(force: bool) -> Result<()> {
    init_config_in(Path::new("."), force)?;
    println!("Created {} configuration file", CONFIG_FILE_NAME);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_and_validate_config, PyqualConfig};
    use tempfile::TempDir;

    #[test]
    fn test_default_config_matches_builtin_defaults() {
        let parsed = parse_and_validate_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, PyqualConfig::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        init_config_in(dir.path(), false).unwrap();
        assert!(init_config_in(dir.path(), false).is_err());
        assert!(init_config_in(dir.path(), true).is_ok());
    }
}
