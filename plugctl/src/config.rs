use crate::chip_tool::DEFAULT_PROGRAM;
use crate::power::DEFAULT_CYCLE_DELAY;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cycle delay must be a non-negative number of seconds, found {_0}")]
    InvalidCycleDelay(f64),
    #[error("No label map path configured and no home configuration directory to default to")]
    NoLabelsPath,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigReadError {
    #[error(transparent)]
    Syntax(#[from] plugctl_config::ConfigReadError),
    #[error(transparent)]
    Semantics(#[from] ConfigError),
}

/// Settings with defaults filled in and values checked
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub chip_tool: PathBuf,
    pub labels: Option<PathBuf>,
    pub cycle_delay: Duration,
    pub pairing_args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chip_tool: DEFAULT_PROGRAM.into(),
            labels: plugctl_config::default_labels_path(),
            cycle_delay: DEFAULT_CYCLE_DELAY,
            pairing_args: Vec::new(),
        }
    }
}

impl Config {
    /// Load the settings file (explicit or default location) and validate it
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigReadError> {
        let cfg = plugctl_config::Config::load(explicit_path)?;
        Ok(Self::try_from(cfg)?)
    }

    pub fn labels_path(&self) -> Result<&Path, ConfigError> {
        self.labels.as_deref().ok_or(ConfigError::NoLabelsPath)
    }
}

impl TryFrom<plugctl_config::Config> for Config {
    type Error = ConfigError;

    fn try_from(value: plugctl_config::Config) -> Result<Self, Self::Error> {
        let defaults = Self::default();
        Ok(Self {
            chip_tool: value.chip_tool.unwrap_or(defaults.chip_tool),
            labels: value.labels.or(defaults.labels),
            cycle_delay: value
                .cycle_delay
                .map(parse_cycle_delay)
                .transpose()?
                .unwrap_or(defaults.cycle_delay),
            pairing_args: value.pairing_args,
        })
    }
}

pub fn parse_cycle_delay(secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidCycleDelay(secs))
}
