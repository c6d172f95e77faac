use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::compile::CompileConfig;
use crate::logging::LoggingConfig;
use crate::vars::{VarConfig, VarSource};

// ---------------------------------------------------------------------------
// Raw TOML structure
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QbConfigRaw {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    compile: CompileConfig,
    #[serde(default)]
    vars: HashMap<String, VarSource>,
}

// ---------------------------------------------------------------------------
// QbConfig (resolved, validated)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct QbConfig {
    pub logging: LoggingConfig,
    pub compile: CompileConfig,
    /// Runtime variables, sorted by name.
    pub vars: Vec<VarConfig>,
}

impl QbConfig {
    /// Read and parse a `qb.toml` file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.as_ref().display()))?;
        content.parse()
    }

    pub fn var(&self, name: &str) -> Option<&VarSource> {
        self.vars
            .iter()
            .find(|v| v.name == name)
            .map(|v| &v.source)
    }
}

impl FromStr for QbConfig {
    type Err = anyhow::Error;

    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let raw: QbConfigRaw = toml::from_str(toml_str)?;

        let mut vars: Vec<VarConfig> = raw
            .vars
            .into_iter()
            .map(|(name, source)| VarConfig { name, source })
            .collect();
        vars.sort_by(|a, b| a.name.cmp(&b.name));
        for var in &vars {
            var.validate()?;
        }

        Ok(QbConfig {
            logging: raw.logging,
            compile: raw.compile,
            vars,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
