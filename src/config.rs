//! Configuration for ollama-chat.
//!
//! Every value is a fixed constant. There is no config file and no
//! environment override; `Config::default()` is what the binary runs with.

use std::path::{Path, PathBuf};

/// Model sent with every chat request.
pub const MODEL_NAME: &str = "llama2";
/// Where the local Ollama server listens.
pub const OLLAMA_HOST: &str = "http://localhost:11434";
/// Directory holding the rotated chat logs.
pub const LOG_DIR: &str = "data/logs";
/// Directory reserved for saved chat output.
pub const OUTPUT_DIR: &str = "data/output";
/// Log files are named `{prefix}_{YYYY-MM-DD}.log`.
pub const LOG_FILE_PREFIX: &str = "chat";
/// Number of daily log files kept on disk.
pub const MAX_LOG_FILES: usize = 10;
/// Timestamp layout used at the start of every log line.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Main configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    /// Model name passed to the backend.
    pub model: String,
    /// Ollama host URL.
    pub host: String,
    /// Log directory.
    pub log_dir: PathBuf,
    /// Output directory (created at startup, currently unused).
    pub output_dir: PathBuf,
    /// Log file name prefix.
    pub log_file_prefix: String,
    /// How many daily log files to retain.
    pub max_log_files: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            host: default_host(),
            log_dir: PathBuf::from(LOG_DIR),
            output_dir: PathBuf::from(OUTPUT_DIR),
            log_file_prefix: LOG_FILE_PREFIX.to_string(),
            max_log_files: MAX_LOG_FILES,
        }
    }
}

fn default_model() -> String {
    MODEL_NAME.to_string()
}

fn default_host() -> String {
    OLLAMA_HOST.to_string()
}

impl Config {
    /// Directories that must exist before logging starts.
    pub fn required_dirs(&self) -> [&Path; 2] {
        [&self.log_dir, &self.output_dir]
    }
}

#[cfg(test)]
impl Config {
    /// Same layout as the defaults, rooted at `root` instead of `data/`.
    pub fn with_data_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            log_dir: root.join("logs"),
            output_dir: root.join("output"),
            ..Self::default()
        }
    }
}
