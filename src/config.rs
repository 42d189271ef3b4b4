use log::info;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::scheduler::{Intervals, SchedulerError, DEFAULT_INTERVALS};
use crate::selection::GroupFilter;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "WORDBRICK_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Intervals(#[from] SchedulerError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub database_path: PathBuf,
    /// Where the review journal is written; `None` disables it.
    pub journal_directory: Option<PathBuf>,
    pub owner_id: String,
    /// Days between reviews for stages 0..=6.
    pub intervals: Vec<u32>,
    /// Whether the scheduled review queue honours the selected group.
    pub due_honors_group: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            database_path: PathBuf::from("wordbrick/words.db"),
            journal_directory: Some(PathBuf::from("wordbrick/journal")),
            owner_id: "local".to_string(),
            intervals: DEFAULT_INTERVALS.to_vec(),
            due_honors_group: true,
        }
    }

    /// Reads a JSON config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text)?;
        config.intervals()?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Loads the file named by `WORDBRICK_CONFIG`, or the defaults if it is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::new()),
        }
    }

    pub fn intervals(&self) -> Result<Intervals, SchedulerError> {
        Intervals::new(&self.intervals)
    }

    /// The group filter the review queue should use for a user's selection.
    pub fn review_group_filter(&self, requested: GroupFilter) -> GroupFilter {
        if self.due_honors_group {
            requested
        } else {
            GroupFilter::All
        }
    }
}
