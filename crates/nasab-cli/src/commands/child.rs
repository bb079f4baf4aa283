//! Child link commands

use clap::{Args, Subcommand};

use super::resolve_person;
use crate::output::print_json;
use crate::AppContext;
use nasab_core::{ChildLinkId, MarriageId};
use nasab_storage::StorageBackend;

#[derive(Args)]
pub struct ChildArgs {
    #[command(subcommand)]
    pub command: ChildCommands,
}

#[derive(Subcommand)]
pub enum ChildCommands {
    /// Record a person as a child of a marriage
    Add {
        /// Marriage id
        marriage: u64,
        /// Child (id or name)
        child: String,
    },
    /// Remove a child link
    Remove {
        /// Child link id
        link: u64,
    },
    /// List child links
    List {
        /// Only links of this marriage
        #[arg(short, long)]
        marriage: Option<u64>,
    },
}

pub async fn run(args: &ChildArgs, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        ChildCommands::Add { marriage, child } => {
            let people = ctx.storage.list_people().await?;
            let child_id = resolve_person(&people, child)?;

            let link = ctx
                .storage
                .add_child(MarriageId(*marriage), child_id)
                .await?;
            tracing::info!(
                "Linked person #{} as child of marriage #{}",
                child_id,
                marriage
            );

            if ctx.is_json() {
                print_json(&link)?;
            } else {
                println!(
                    "Added child link #{}: person #{} of marriage #{}",
                    link.id, link.child_id, link.marriage_id
                );
            }
        }
        ChildCommands::Remove { link } => {
            ctx.storage.remove_child(ChildLinkId(*link)).await?;
            tracing::info!("Removed child link #{}", link);
            println!("Removed child link #{}", link);
        }
        ChildCommands::List { marriage } => {
            let links = match marriage {
                Some(id) => ctx.storage.list_children(MarriageId(*id)).await?,
                None => ctx.storage.list_child_links().await?,
            };

            if ctx.is_json() {
                return print_json(&links);
            }
            if links.is_empty() {
                println!("No child links found");
                return Ok(());
            }

            let snapshot = ctx.snapshot().await?;
            println!("Child links ({} found):", links.len());
            for link in &links {
                println!(
                    "  #{} {} (#{}) of marriage #{}",
                    link.id,
                    snapshot.name_of(link.child_id),
                    link.child_id,
                    link.marriage_id
                );
            }
        }
    }

    Ok(())
}
