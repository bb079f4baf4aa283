//! Family tree rendering command

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use super::{emit, output_target};
use crate::output::to_json;
use crate::render::render_dot;
use crate::AppContext;
use nasab_core::{MarriageId, TreeLayoutBuilder};

/// Tree output format
#[derive(Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TreeFormat {
    /// Graphviz DOT source
    #[default]
    Dot,
    /// The layout model as JSON
    Json,
}

impl TreeFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Json => "json",
        }
    }
}

#[derive(Args)]
pub struct TreeArgs {
    /// Marriage to root the tree at (default: every marriage)
    #[arg(short, long)]
    pub root: Option<u64>,

    /// Also draw the direct ancestors of the root couple
    #[arg(long, requires = "root")]
    pub ancestors: bool,

    /// What to emit
    #[arg(short, long, value_enum, default_value = "dot")]
    pub emit: TreeFormat,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write family_tree.<ext> into the output directory
    #[arg(long)]
    pub save: bool,
}

pub async fn run(args: &TreeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let snapshot = ctx.snapshot().await?;

    let layout = TreeLayoutBuilder::new(&snapshot)
        .with_style(ctx.config.style.clone())
        .with_root(args.root.map(MarriageId))
        .with_ancestors(args.ancestors)
        .build();

    tracing::info!(
        "Built tree layout: {} nodes, {} edges",
        layout.nodes.len(),
        layout.edges.len()
    );

    let content = match args.emit {
        TreeFormat::Dot => render_dot(&layout, &ctx.config.style, &ctx.engine),
        TreeFormat::Json => format!("{}\n", to_json(&layout)?),
    };

    let file_name = format!("family_tree.{}", args.emit.extension());
    let target = output_target(args.output.as_ref(), args.save, &ctx.output_dir, &file_name);
    emit(&content, target, "family tree")
}
