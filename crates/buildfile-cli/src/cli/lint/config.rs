//! Linter configuration

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::LintError;
use super::formatter::Format;

/// File names looked up in the working directory, in order
pub const DEFAULT_CONFIG_FILES: [&str; 2] = [".buildfilelint.yml", ".buildfilelint.yaml"];

/// Configuration file structure (.buildfilelint.yml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ConfigFile {
    /// Custom validator library; relative paths are taken from the config file's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_validator: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_variables: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_warning: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,

    /// Variables applied on top of the process environment
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

impl ConfigFile {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, LintError> {
        let content = fs::read_to_string(path).map_err(|e| LintError::ConfigLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config: ConfigFile = serde_yml::from_str(&content).map_err(|e| {
            LintError::ConfigLoad { path: path.to_path_buf(), message: e.to_string() }
        })?;

        if let Some(validator) = config.custom_validator.as_mut() {
            if validator.is_relative() {
                if let Some(dir) = path.parent() {
                    *validator = dir.join(&*validator);
                }
            }
        }
        Ok(config)
    }

    /// First default config file found in `dir`, if any
    pub fn load_default_in(dir: &Path) -> Result<Option<Self>, LintError> {
        for filename in DEFAULT_CONFIG_FILES {
            let path = dir.join(filename);
            if path.is_file() {
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// An explicit path must exist; without one the working directory is searched.
    pub fn load(config_path: Option<&Path>) -> Result<Option<Self>, LintError> {
        match config_path {
            Some(path) => Self::from_file(path).map(Some),
            None => Self::load_default_in(Path::new(".")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_config_file_parses_every_setting() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
custom_validator: /opt/validators/libdirectory_guard.so
strict_variables: true
fail_on_warning: false
format: json
variables:
  QNX_TARGET: /opt/qnx/target
  ARCH: aarch64le
"#
        )
        .unwrap();

        let config = ConfigFile::from_file(file.path()).unwrap();
        assert_eq!(
            config.custom_validator,
            Some(PathBuf::from("/opt/validators/libdirectory_guard.so"))
        );
        assert_eq!(config.strict_variables, Some(true));
        assert_eq!(config.fail_on_warning, Some(false));
        assert_eq!(config.format, Some(Format::Json));
        assert_eq!(config.variables.get("ARCH").map(String::as_str), Some("aarch64le"));
    }

    #[test]
    fn test_relative_custom_validator_is_resolved_against_config_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".buildfilelint.yml");
        fs::write(&path, "custom_validator: plugins/libguard.so\n").unwrap();

        let config = ConfigFile::from_file(&path).unwrap();
        assert_eq!(config.custom_validator, Some(dir.path().join("plugins/libguard.so")));
    }

    #[test]
    fn test_config_file_not_found_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigFile::load(Some(&dir.path().join("missing.yml"))).unwrap_err();
        assert!(matches!(err, LintError::ConfigLoad { .. }));
    }

    #[test]
    fn test_config_file_malformed_yaml_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "format: [not, a, format").unwrap();

        let err = ConfigFile::from_file(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load config from"));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "format: html").unwrap();
        assert!(ConfigFile::from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_default_config_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        assert_eq!(ConfigFile::load_default_in(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_load_default_prefers_yml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".buildfilelint.yaml"), "strict_variables: false\n").unwrap();
        fs::write(dir.path().join(".buildfilelint.yml"), "strict_variables: true\n").unwrap();

        let config = ConfigFile::load_default_in(dir.path()).unwrap().unwrap();
        assert_eq!(config.strict_variables, Some(true));
    }
}
