//! Compiler and engine limits.
//!
//! Limits come from defaults, optionally overridden by a TOML file and then by
//! `FILTERSPEC_*` environment variables (environment wins).

use crate::errors::FilterError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_GROUP_DEPTH: usize = 32;
pub const DEFAULT_MAX_IN_VALUES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Maximum nesting of condition groups, the root group being level 1.
    pub max_group_depth: usize,
    /// Maximum number of values accepted by the membership operators.
    pub max_in_values: usize,
    /// Upper bound applied to the page size; `None` leaves it unbounded.
    pub max_page_size: Option<usize>,
    /// Evaluate condition sets on scoped threads when the source allows it.
    pub parallel_sets: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_group_depth: DEFAULT_MAX_GROUP_DEPTH,
            max_in_values: DEFAULT_MAX_IN_VALUES,
            max_page_size: None,
            parallel_sets: false,
        }
    }
}

impl CompilerConfig {
    /// # Errors
    /// Returns `FilterError::Config` if the text is not a valid config table.
    pub fn from_toml_str(s: &str) -> Result<Self, FilterError> {
        toml::from_str::<Self>(s).map_err(|e| FilterError::Config(e.to_string()))
    }

    /// Loads a TOML file and applies environment overrides on top.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, FilterError> {
        let text = std::fs::read_to_string(path)?;
        let mut cfg = Self::from_toml_str(&text)?;
        cfg.apply_env();
        Ok(cfg)
    }

    /// Defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    /// Overrides fields from `FILTERSPEC_MAX_GROUP_DEPTH`, `FILTERSPEC_MAX_IN_VALUES`,
    /// `FILTERSPEC_MAX_PAGE_SIZE` and `FILTERSPEC_PARALLEL_SETS`. Unparseable values are ignored.
    pub fn apply_env(&mut self) {
        if let Some(v) = env_usize("FILTERSPEC_MAX_GROUP_DEPTH") {
            self.max_group_depth = v;
        }
        if let Some(v) = env_usize("FILTERSPEC_MAX_IN_VALUES") {
            self.max_in_values = v;
        }
        if let Some(v) = env_usize("FILTERSPEC_MAX_PAGE_SIZE") {
            self.max_page_size = Some(v);
        }
        if let Ok(s) = std::env::var("FILTERSPEC_PARALLEL_SETS") {
            self.parallel_sets = matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<usize>().ok())
}
