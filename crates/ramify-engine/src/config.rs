//! Configuration (ramify.toml)
//!
//! ```toml
//! [lowering]
//! rewrite-ast = true
//! verify = true
//!
//! [output]
//! module-wrapper = true
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up by [`Config::discover`]
pub const CONFIG_FILE: &str = "ramify.toml";

/// Errors that can occur while loading a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub lowering: LoweringOptions,
    pub output: OutputOptions,
}

/// Options for one lowering pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LoweringOptions {
    /// Lower native `if` statements automatically. When false the body must
    /// drive the conditional builtins itself.
    pub rewrite_ast: bool,
    /// Run the structural verifier on each finished function
    pub verify: bool,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            rewrite_ast: true,
            verify: true,
        }
    }
}

impl LoweringOptions {
    /// Options for bodies that call `begin_if`/`end_if` themselves
    pub fn explicit() -> Self {
        Self {
            rewrite_ast: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct OutputOptions {
    /// Wrap printed functions in `module { ... }`
    pub module_wrapper: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            module_wrapper: true,
        }
    }
}

impl Config {
    /// Load a config from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a config from a string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Find `ramify.toml` in `start` or any of its ancestors
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.lowering.rewrite_ast);
        assert!(config.lowering.verify);
        assert!(config.output.module_wrapper);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::parse("[lowering]\nrewrite-ast = false\n").unwrap();
        assert!(!config.lowering.rewrite_ast);
        assert!(config.lowering.verify);
        assert_eq!(config.lowering, LoweringOptions::explicit());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::parse("[lowering]\nrewrite_ast = false\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nmodule-wrapper = false").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert!(!config.output.module_wrapper);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::from_file(&dir.path().join(CONFIG_FILE)).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_discover_walks_up() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            Config::discover(&nested),
            Some(dir.path().join(CONFIG_FILE))
        );
    }
}
