//! Config command for managing CLI configuration

use clap::{Args, Subcommand};

use crate::config::{config_file_path, Config};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Get a config value
    Get {
        /// Config key name (e.g. style.male_color)
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key name
        key: String,
        /// New value (comma-separated for alias lists)
        value: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
    /// Write a config file with the default settings
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(args: &ConfigArgs) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommands::Get { key } => run_get(key),
        ConfigCommands::Set { key, value } => run_set(key, value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Init { force } => run_init(*force),
    }
}

fn run_get(key: &str) -> anyhow::Result<()> {
    if !Config::keys().contains(&key) {
        anyhow::bail!(
            "Unknown config key: {}. Available keys: {}",
            key,
            Config::keys().join(", ")
        );
    }
    println!("{}", display_value(&Config::load(), key));
    Ok(())
}

fn run_set(key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = Config::load();
    config.set(key, value)?;
    config.save()?;
    tracing::info!("Config {} updated", key);
    println!("Set {} = {}", key, display_value(&config, key));
    Ok(())
}

fn run_list() -> anyhow::Result<()> {
    let config = Config::load();
    let width = Config::keys().iter().map(|k| k.len()).max().unwrap_or(0);

    println!("Config file: {}", config_file_path().display());
    println!();
    for key in Config::keys() {
        println!("{:width$} = {}", key, display_value(&config, key), width = width);
    }
    Ok(())
}

/// Stored value, or what the CLI falls back to when the key is unset
fn display_value(config: &Config, key: &str) -> String {
    if let Some(value) = config.get(key) {
        return value;
    }
    match key {
        "data_dir" => format!("(default: {})", config.data_dir().display()),
        "output_dir" => format!("(default: {})", config.output_dir().display()),
        "graphviz_engine" => format!("(default: {})", config.graphviz_engine()),
        "default_format" => "(default: table)".to_string(),
        _ => "(not set)".to_string(),
    }
}

fn run_path() -> anyhow::Result<()> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn run_init(force: bool) -> anyhow::Result<()> {
    let path = config_file_path();

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    // Write the resolved defaults so the file documents every setting
    let config = Config {
        data_dir: Some(crate::config::default_data_dir()),
        output_dir: Some(crate::config::default_output_dir()),
        graphviz_engine: Some(crate::config::DEFAULT_GRAPHVIZ_ENGINE.to_string()),
        default_format: Some("table".to_string()),
        ..Config::default()
    };
    config.save()?;
    println!("Created config file at {}", path.display());
    Ok(())
}
