//! Kinship commands

use clap::{Args, Subcommand};

use super::resolve_person;
use crate::output::print_json;
use crate::AppContext;
use nasab_core::{find_relationship, mahram_relatives, KinshipPath, MAHRAM_MAX_DISTANCE};

#[derive(Args)]
pub struct KinshipArgs {
    #[command(subcommand)]
    pub command: KinshipCommands,
}

#[derive(Subcommand)]
pub enum KinshipCommands {
    /// Shortest kinship path between two people and the mahram verdict
    Find {
        /// First person (id or name)
        from: String,
        /// Second person (id or name)
        to: String,
    },
    /// Everyone within mahram distance of a person
    Mahrams {
        /// Person id or name
        person: String,
    },
}

fn verdict(path: &KinshipPath) -> &'static str {
    if path.is_mahram {
        "mahram"
    } else {
        "not mahram"
    }
}

pub async fn run(args: &KinshipArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let snapshot = ctx.snapshot().await?;

    match &args.command {
        KinshipCommands::Find { from, to } => {
            let source = resolve_person(&snapshot.people, from)?;
            let target = resolve_person(&snapshot.people, to)?;
            let result = find_relationship(&snapshot, source, target);

            match &result {
                Some(path) => tracing::info!(
                    "Kinship #{} -> #{}: distance {}",
                    source,
                    target,
                    path.distance
                ),
                None => tracing::info!("No kinship path between #{} and #{}", source, target),
            }

            if ctx.is_json() {
                return print_json(&result);
            }

            match result {
                Some(path) => {
                    println!("Path: {}", path.names.join(" -> "));
                    println!("Distance: {}", path.distance);
                    println!("Verdict: {}", verdict(&path));
                }
                None => println!(
                    "No relationship found between {} and {}",
                    snapshot.name_of(source),
                    snapshot.name_of(target)
                ),
            }
        }
        KinshipCommands::Mahrams { person } => {
            let id = resolve_person(&snapshot.people, person)?;
            let relatives = mahram_relatives(&snapshot, id);
            tracing::info!("Found {} mahram relatives of #{}", relatives.len(), id);

            if ctx.is_json() {
                return print_json(&relatives);
            }
            if relatives.is_empty() {
                println!(
                    "{} has no relatives within distance {}",
                    snapshot.name_of(id),
                    MAHRAM_MAX_DISTANCE
                );
                return Ok(());
            }

            println!(
                "Relatives of {} within distance {} ({} found):",
                snapshot.name_of(id),
                MAHRAM_MAX_DISTANCE,
                relatives.len()
            );
            for path in &relatives {
                let name = path.names.last().map(String::as_str).unwrap_or("?");
                println!("  [{}] {}: {}", path.distance, name, path.names.join(" -> "));
            }
        }
    }

    Ok(())
}
