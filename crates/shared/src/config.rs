use anyhow::{Context, Result};
use std::env;

use crate::parser::{DEFAULT_NAME_COLUMN, DEFAULT_WEIGHT_COLUMN};

pub const DEFAULT_NUM_GROUPS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub num_groups: usize,
    pub initial_loads: Option<Vec<i64>>,
    pub name_column: String,
    pub weight_column: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_groups: DEFAULT_NUM_GROUPS,
            initial_loads: None,
            name_column: DEFAULT_NAME_COLUMN.to_string(),
            weight_column: DEFAULT_WEIGHT_COLUMN.to_string(),
        }
    }
}

impl Config {
    /// Read settings from the environment. Every variable is optional.
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let mut config = Self::default();

        if let Ok(groups) = env::var("CASE_DIGEST_GROUPS") {
            config.num_groups = groups.trim().parse().with_context(|| {
                format!(
                    "CASE_DIGEST_GROUPS must be a positive whole number, got \"{}\"",
                    groups
                )
            })?;
        }

        if let Ok(loads) = env::var("CASE_DIGEST_INITIAL_LOADS") {
            if !loads.trim().is_empty() {
                config.initial_loads = Some(
                    parse_initial_loads(&loads).context("Invalid CASE_DIGEST_INITIAL_LOADS")?,
                );
            }
        }

        if let Ok(column) = env::var("CASE_DIGEST_NAME_COLUMN") {
            config.name_column = column.trim().to_string();
        }

        if let Ok(column) = env::var("CASE_DIGEST_WEIGHT_COLUMN") {
            config.weight_column = column.trim().to_string();
        }

        Ok(config)
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/case-digest/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("case-digest").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }

        // If none found, defaults apply
    }
}

/// Parse a comma-separated list of page counts already carried by each group,
/// e.g. `"120, 0, 45"`.
///
/// Only the values are checked here; whether there is one per group is up to
/// `Assigner::new`.
pub fn parse_initial_loads(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .enumerate()
        .map(|(idx, part)| {
            let part = part.trim();
            if part.is_empty() {
                anyhow::bail!("initial load {} is empty", idx + 1);
            }
            let load: i64 = part
                .parse()
                .with_context(|| format!("initial load {} is not a whole number: \"{}\"", idx + 1, part))?;
            if load < 0 {
                anyhow::bail!("initial load {} must be non-negative, got {}", idx + 1, load);
            }
            Ok(load)
        })
        .collect()
}
