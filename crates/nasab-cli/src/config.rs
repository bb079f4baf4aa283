//! CLI configuration
//!
//! Stored as TOML at `<config_dir>/nasab/config.toml`. Every field is
//! optional; unset fields fall back to the defaults below. Command line flags
//! (and their environment variables) win over the file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use nasab_core::{GenderAliases, LayoutStyle};
use serde::{Deserialize, Serialize};

/// Environment variable pointing at an alternative config file
pub const CONFIG_ENV: &str = "NASAB_CONFIG";

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nasab")
}

/// Get default directory for rendered trees and reports
pub fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

pub const DEFAULT_GRAPHVIZ_ENGINE: &str = "dot";

/// Location of the config file
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nasab")
        .join("config.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graphviz_engine: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    /// Extra aliases merged into the built-in table
    #[serde(default = "GenderAliases::empty")]
    pub gender_aliases: GenderAliases,

    #[serde(default)]
    pub style: LayoutStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            output_dir: None,
            graphviz_engine: None,
            default_format: None,
            gender_aliases: GenderAliases::empty(),
            style: LayoutStyle::default(),
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults if it is missing or invalid
    pub fn load() -> Self {
        let path = config_file_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Ignoring config file {}: {:#}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Built-in gender aliases extended with the configured ones
    pub fn aliases(&self) -> GenderAliases {
        let mut aliases = GenderAliases::default();
        aliases.extend(&self.gender_aliases);
        aliases
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_output_dir)
    }

    pub fn graphviz_engine(&self) -> &str {
        self.graphviz_engine
            .as_deref()
            .unwrap_or(DEFAULT_GRAPHVIZ_ENGINE)
    }

    /// Keys accepted by `get` and `set`
    pub fn keys() -> &'static [&'static str] {
        &[
            "data_dir",
            "output_dir",
            "graphviz_engine",
            "default_format",
            "gender_aliases.male",
            "gender_aliases.female",
            "style.male_color",
            "style.female_color",
            "style.unknown_color",
            "style.border_color",
            "style.edge_color",
            "style.lineage_symbol",
            "style.lineage_color",
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let path_string = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
        match key {
            "data_dir" => path_string(&self.data_dir),
            "output_dir" => path_string(&self.output_dir),
            "graphviz_engine" => self.graphviz_engine.clone(),
            "default_format" => self.default_format.clone(),
            "gender_aliases.male" => non_empty(self.gender_aliases.male.join(",")),
            "gender_aliases.female" => non_empty(self.gender_aliases.female.join(",")),
            "style.male_color" => Some(self.style.male_color.clone()),
            "style.female_color" => Some(self.style.female_color.clone()),
            "style.unknown_color" => Some(self.style.unknown_color.clone()),
            "style.border_color" => Some(self.style.border_color.clone()),
            "style.edge_color" => Some(self.style.edge_color.clone()),
            "style.lineage_symbol" => Some(self.style.lineage_symbol.clone()),
            "style.lineage_color" => Some(self.style.lineage_color.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let value = value.trim();
        let list = |v: &str| -> Vec<String> {
            v.split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        match key {
            "data_dir" => self.data_dir = Some(PathBuf::from(value)),
            "output_dir" => self.output_dir = Some(PathBuf::from(value)),
            "graphviz_engine" => self.graphviz_engine = Some(value.to_string()),
            "default_format" => match value.to_lowercase().as_str() {
                "table" | "json" => self.default_format = Some(value.to_lowercase()),
                other => anyhow::bail!("Invalid format '{}': expected table or json", other),
            },
            "gender_aliases.male" => self.gender_aliases.male = list(value),
            "gender_aliases.female" => self.gender_aliases.female = list(value),
            "style.male_color" => self.style.male_color = value.to_string(),
            "style.female_color" => self.style.female_color = value.to_string(),
            "style.unknown_color" => self.style.unknown_color = value.to_string(),
            "style.border_color" => self.style.border_color = value.to_string(),
            "style.edge_color" => self.style.edge_color = value.to_string(),
            "style.lineage_symbol" => self.style.lineage_symbol = value.to_string(),
            "style.lineage_color" => self.style.lineage_color = value.to_string(),
            _ => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
