use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use viewer::Format;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "cguide.toml";

/// Settings from `cguide.toml`. Every key is optional; command-line flags
/// take precedence over anything set here.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory of extra guides. Relative paths are resolved against the
    /// directory holding the config file.
    pub docs_dir: Option<PathBuf>,

    /// Default output format for `show`.
    pub format: Option<Format>,

    /// Width of horizontal rules in text output.
    pub width: Option<usize>,

    /// Set to false to never emit ANSI styling.
    pub color: Option<bool>,

    /// Listen address for `serve`.
    pub addr: Option<SocketAddr>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {}", .path.display(), .source.message())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load `explicit` if given (it must exist), else `cguide.toml` in the
    /// working directory if present, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Config::default());
                }
                default
            }
        };
        Self::load_file(&path)
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let (Some(dir), Some(base)) = (&config.docs_dir, path.parent()) {
            if dir.is_relative() {
                config.docs_dir = Some(base.join(dir));
            }
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn all_keys_parse() {
        let config = Config::from_toml(
            "docs_dir = \"guides\"\nformat = \"html\"\nwidth = 60\ncolor = false\naddr = \"0.0.0.0:8080\"\n",
        )
        .unwrap();
        assert_eq!(config.docs_dir, Some(PathBuf::from("guides")));
        assert_eq!(config.format, Some(Format::Html));
        assert_eq!(config.width, Some(60));
        assert_eq!(config.color, Some(false));
        assert_eq!(config.addr, Some("0.0.0.0:8080".parse().unwrap()));
    }

    #[test]
    fn unknown_keys_and_bad_values_are_rejected() {
        assert!(Config::from_toml("colour = true").is_err());
        assert!(Config::from_toml("format = \"pdf\"").is_err());
    }

    #[test]
    fn relative_docs_dir_resolves_against_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cguide.toml");
        std::fs::write(&path, "docs_dir = \"guides\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.docs_dir, Some(dir.path().join("guides")));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
