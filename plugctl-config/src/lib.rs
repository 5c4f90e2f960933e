use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

pub use labels::{LabelMap, LabelMapReadError};

mod labels;

pub const CONFIG_DIR_NAME: &str = "plugctl";
pub const DEFAULT_CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_LABELS_FILE_NAME: &str = "labels.json";
pub const CONFIG_PATH_ENV_VAR: &str = "PLUGCTL_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigReadError {
    #[error("Error in configuration file {}", .path.display())]
    ConfigToml {
        path: PathBuf,
        #[source]
        error: Box<toml::de::Error>,
    },

    #[error("Encountered an IO error while reading the configuration file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: Box<io::Error>,
    },
}

/// Settings file contents. Every key is optional, command line flags take
/// precedence over anything set here.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Commissioning tool program, looked up in `PATH` when not absolute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chip_tool: Option<PathBuf>,

    /// Label map location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<PathBuf>,

    /// Seconds between the off and on halves of a power cycle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_delay: Option<f64>,

    /// Extra arguments appended to every pairing invocation
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pairing_args: Vec<String>,
}

impl Config {
    pub fn read<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigReadError> {
        let content =
            fs::read_to_string(&config_path).map_err(|e| ConfigReadError::Io {
                path: config_path.as_ref().to_owned(),
                error: Box::new(e),
            })?;
        Self::from_str(&content).map_err(|e| ConfigReadError::ConfigToml {
            path: config_path.as_ref().to_owned(),
            error: Box::new(e),
        })
    }

    /// Read the settings file named explicitly, or the default one.
    ///
    /// A missing default file is not an error and yields the defaults, a
    /// missing explicit file is.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigReadError> {
        if let Some(path) = explicit_path {
            return Self::read(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::read(path),
            _ => Ok(Self::default()),
        }
    }
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

/// `$XDG_CONFIG_HOME/plugctl` or the platform equivalent
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(DEFAULT_CONFIG_FILE_NAME))
}

pub fn default_labels_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(DEFAULT_LABELS_FILE_NAME))
}
