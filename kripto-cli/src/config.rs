use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub verbose: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("kripto"),
            verbose: false,
        }
    }
}

impl CliConfig {
    pub fn new(data_dir: Option<PathBuf>, verbose: bool) -> Self {
        let mut config = Self::default();
        if let Some(data_dir) = data_dir {
            config.data_dir = data_dir;
        }
        config.verbose = verbose;
        config
    }

    pub fn log_filter(&self) -> String {
        let log_level = if self.verbose { "debug" } else { "info" };
        format!("kripto={},kripto_lottery={}", log_level, log_level)
    }
}
