//! Plugin configuration.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::audit::LogFormat;
use crate::schedule::{Schedules, WeeklyRangesStr};
use crate::Result;

/// Configuration for the name-blocking plugin.
///
/// ```yaml
/// blocked_names_file: blocked-names.txt
/// log_file: blocked-names.log
/// log_format: ltsv
/// enforce_schedules: true
/// schedules:
///   time-to-sleep:
///     mon: [{after: "21:00", before: "07:00"}]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct BlockNameConfig {
    /// Rule file, one rule per line
    pub blocked_names_file: PathBuf,
    /// Audit log for blocked queries
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// `tsv` or `ltsv`
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Gate `@name` rules by their schedule
    #[serde(default)]
    pub enforce_schedules: bool,
    /// Named weekly schedules
    #[serde(default)]
    pub schedules: HashMap<String, WeeklyRangesStr>,
}

fn default_log_format() -> String {
    "tsv".to_string()
}

impl BlockNameConfig {
    /// Create a config for a rule file with everything else defaulted.
    pub fn new(blocked_names_file: impl Into<PathBuf>) -> Self {
        Self {
            blocked_names_file: blocked_names_file.into(),
            log_file: None,
            log_format: default_log_format(),
            enforce_schedules: false,
            schedules: HashMap::new(),
        }
    }

    /// Parse a config from YAML text. Paths are kept as written.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a config file.
    ///
    /// Relative paths inside it are resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;

        if let Some(base) = path.parent() {
            config.blocked_names_file = resolve(base, &config.blocked_names_file);
            config.log_file = config.log_file.map(|p| resolve(base, &p));
        }

        Ok(config)
    }

    /// Set the audit log file and format.
    pub fn with_log_file(mut self, path: impl Into<PathBuf>, format: &str) -> Self {
        self.log_file = Some(path.into());
        self.log_format = format.to_string();
        self
    }

    /// Parse the audit log format.
    pub fn log_format(&self) -> Result<LogFormat> {
        self.log_format.parse()
    }

    /// Parse the named schedules.
    pub fn schedules(&self) -> Result<Schedules> {
        Schedules::parse(&self.schedules)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
