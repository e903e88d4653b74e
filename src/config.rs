use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "task-ledger.toml";
const CONFIG_ENV_VAR: &str = "TASK_LEDGER_CONFIG";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub finalize: FinalizeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// CSV files touched by the finalizer.
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_input() -> PathBuf {
    PathBuf::from("todo_data.csv")
}

fn default_output() -> PathBuf {
    PathBuf::from("subset_todo_data.csv")
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FinalizeConfig {
    /// Rows are kept when their length is strictly greater than this.
    #[serde(default = "default_length_threshold")]
    pub length_threshold: usize,
    /// Compute `Task_Length` on the loaded dataset before filtering.
    /// Off by default: a file without that column fails the filter.
    #[serde(default)]
    pub annotate_loaded: bool,
}

fn default_length_threshold() -> usize { 10 }

impl Default for FinalizeConfig {
    fn default() -> Self {
        Self {
            length_threshold: default_length_threshold(),
            annotate_loaded: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("task-ledger.log")
}

fn default_log_filter() -> String {
    "task_ledger=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Resolve the config path ($TASK_LEDGER_CONFIG, then the default file)
    /// and load it. A missing default file means built-in defaults; a path
    /// named explicitly by the env var must exist.
    pub fn discover() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(p) if !p.trim().is_empty() => Self::load(Path::new(p.trim())),
            _ => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
