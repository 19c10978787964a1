//! formulactl configuration
//!
//! A configuration file names formulas so they can be listed and run by name:
//!
//! ```yaml
//! logging:
//!   level: info
//! formulas:
//!   - name: radius
//!     definition: "sqrt(x*x + y*y); x; y"
//!     description: distance from origin
//!     args: [3, 4]
//! ```
//!
//! Sources, lowest priority first: serde defaults, the file given with
//! `--config` (YAML, TOML or JSON by extension), then `FORMULACTL_*`
//! environment variables (`FORMULACTL_LOGGING__LEVEL=debug`).

use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Json, Toml, Yaml},
    Figment,
};
use formula_core::Formula;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "FORMULACTL_";

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FormulactlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub formulas: Vec<FormulaEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `formula_core=debug`
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// A named formula
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormulaEntry {
    pub name: String,
    /// Formula text, `<expression> [; <variable>]*`
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Arguments used by `formulactl run`, in declaration order
    #[serde(default)]
    pub args: Vec<f64>,
}

impl FormulaEntry {
    pub fn compile(&self) -> formula_core::Result<Formula<f64>> {
        Formula::parse(&self.definition)
    }
}

impl FormulactlConfig {
    /// Load configuration from an optional file plus the environment
    ///
    /// Only reads and deserializes; call [`FormulactlConfig::validate`] once
    /// logging is installed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(path) = path {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            let extension = path
                .extension()
                .and_then(|s| s.to_str())
                .context("Config file must have an extension")?;

            figment = match extension {
                "toml" => figment.merge(Toml::file(path)),
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                "json" => figment.merge(Json::file(path)),
                _ => bail!("Unsupported config file format: {}", extension),
            };
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__").ignore(&["config"]))
            .extract()
            .context("Failed to load configuration")
    }

    /// Check names and compile every definition
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for entry in &self.formulas {
            if entry.name.trim().is_empty() {
                bail!("Formula name must not be empty");
            }
            if !seen.insert(entry.name.as_str()) {
                bail!("Duplicate formula name: {}", entry.name);
            }

            let formula = entry.compile().map_err(|e| {
                anyhow::anyhow!(
                    "Formula '{}' does not compile: {}",
                    entry.name,
                    e
                )
            })?;
            if !entry.args.is_empty() && entry.args.len() != formula.arity() {
                bail!(
                    "Formula '{}' declares {} variables but {} args are configured",
                    entry.name,
                    formula.arity(),
                    entry.args.len()
                );
            }
            debug!(name = %entry.name, arity = formula.arity(), "formula validated");
        }
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&FormulaEntry> {
        self.formulas.iter().find(|entry| entry.name == name)
    }
}
