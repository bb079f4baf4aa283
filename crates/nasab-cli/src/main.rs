//! Nasab CLI - Command line interface for family records and kinship

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;
mod render;

use commands::{child, completions, io, kinship, marriage, person, report, tree};
use config::Config;
use nasab_core::{FamilySnapshot, GenderAliases};
use nasab_storage::{RedbStorage, StorageBackend};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "nasab")]
#[command(author, version, about = "Family records, kinship paths and family-tree diagrams")]
pub struct Cli {
    /// Data directory
    #[arg(short, long, global = true, env = "NASAB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory for rendered trees and reports
    #[arg(long, global = true, env = "NASAB_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Graphviz layout engine written into rendered trees
    #[arg(long, global = true, env = "NASAB_GRAPHVIZ_ENGINE")]
    pub engine: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage people
    Person(person::PersonArgs),
    /// Manage marriages
    Marriage(marriage::MarriageArgs),
    /// Link children to marriages
    Child(child::ChildArgs),
    /// Resolve kinship paths and mahram verdicts
    Kinship(kinship::KinshipArgs),
    /// Render the family tree
    Tree(tree::TreeArgs),
    /// Person profiles and CSV reports
    Report(report::ReportArgs),
    /// Export all records as JSON
    Export(io::ExportArgs),
    /// Import records from a JSON export
    Import(io::ImportArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with storage backend and resolved settings
pub struct AppContext {
    pub storage: Arc<RedbStorage>,
    pub config: Config,
    pub aliases: GenderAliases,
    pub format: OutputFormat,
    pub output_dir: PathBuf,
    pub engine: String,
}

impl AppContext {
    pub async fn new(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir());
        std::fs::create_dir_all(&data_dir)?;

        let db_path = data_dir.join("nasab.redb");
        tracing::debug!("Using database at: {:?}", db_path);

        let storage = RedbStorage::open(&db_path)?;
        storage.initialize().await?;

        let format = cli.format.unwrap_or_else(|| {
            config
                .default_format
                .as_deref()
                .map(OutputFormat::from)
                .unwrap_or_default()
        });
        let output_dir = cli.output_dir.clone().unwrap_or_else(|| config.output_dir());
        let engine = cli
            .engine
            .clone()
            .unwrap_or_else(|| config.graphviz_engine().to_string());

        Ok(Self {
            storage: Arc::new(storage),
            aliases: config.aliases(),
            config,
            format,
            output_dir,
            engine,
        })
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub async fn snapshot(&self) -> anyhow::Result<FamilySnapshot> {
        Ok(self.storage.load_snapshot().await?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting nasab CLI");

    // These never touch the database
    match &cli.command {
        Commands::Config(args) => return commands::config::run(args).await,
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let config = Config::load();
    let ctx = AppContext::new(&cli, config).await?;

    match &cli.command {
        Commands::Person(args) => person::run(args, &ctx).await?,
        Commands::Marriage(args) => marriage::run(args, &ctx).await?,
        Commands::Child(args) => child::run(args, &ctx).await?,
        Commands::Kinship(args) => kinship::run(args, &ctx).await?,
        Commands::Tree(args) => tree::run(args, &ctx).await?,
        Commands::Report(args) => report::run(args, &ctx).await?,
        Commands::Export(args) => io::run_export(args, &ctx).await?,
        Commands::Import(args) => io::run_import(args, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }

    ctx.storage.close().await?;
    Ok(())
}
