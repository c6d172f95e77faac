use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// `[logging]` section. Every field has a default, so the section is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global level filter (e.g. `"info"`).
    pub level: String,
    /// Per-module overrides, e.g. `{ qb_core = "debug" }`.
    pub modules: HashMap<String, String>,
    /// Log file. Relative paths are resolved against the config file's
    /// directory.
    pub file: Option<PathBuf>,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            modules: HashMap::new(),
            file: None,
            format: LogFormat::Plain,
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directive string: the global level followed by module
    /// overrides, sorted for a stable result.
    pub fn filter_directives(&self) -> String {
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort();
        let mut directives = self.level.clone();
        for (module, level) in modules {
            directives.push_str(&format!(",{module}={level}"));
        }
        directives
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Plain,
    Json,
}
