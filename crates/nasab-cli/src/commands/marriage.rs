//! Marriage commands

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::resolve_person;
use crate::output::{format_date, marriage_line, print_json};
use crate::AppContext;
use nasab_core::{MarriageId, NewMarriage, Person, PersonId};
use nasab_storage::StorageBackend;

#[derive(Args)]
pub struct MarriageArgs {
    #[command(subcommand)]
    pub command: MarriageCommands,
}

#[derive(Subcommand)]
pub enum MarriageCommands {
    /// Record a marriage
    Add {
        /// Husband (id or name)
        #[arg(long)]
        husband: Option<String>,
        /// Wife (id or name)
        #[arg(long)]
        wife: Option<String>,
        /// Marriage date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// List marriages
    List,
    /// Show a marriage and its children
    Get {
        /// Marriage id
        id: u64,
    },
    /// Update a marriage
    Update {
        /// Marriage id
        id: u64,
        /// New husband (id or name)
        #[arg(long)]
        husband: Option<String>,
        /// New wife (id or name)
        #[arg(long)]
        wife: Option<String>,
        /// New marriage date
        #[arg(long)]
        date: Option<NaiveDate>,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a marriage with its child links
    Delete {
        /// Marriage id
        id: u64,
        /// Force deletion without confirmation
        #[arg(long)]
        force: bool,
    },
}

fn resolve_spouse(people: &[Person], spouse: Option<&String>) -> anyhow::Result<Option<PersonId>> {
    spouse.map(|s| resolve_person(people, s)).transpose()
}

pub async fn run(args: &MarriageArgs, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        MarriageCommands::Add {
            husband,
            wife,
            date,
            notes,
        } => {
            let people = ctx.storage.list_people().await?;
            let mut new = NewMarriage::new(
                resolve_spouse(&people, husband.as_ref())?,
                resolve_spouse(&people, wife.as_ref())?,
            );
            new.marriage_date = *date;
            new.notes = notes.clone();

            let marriage = ctx.storage.insert_marriage(new).await?;
            tracing::info!("Created marriage #{}", marriage.id);

            if ctx.is_json() {
                print_json(&marriage)?;
            } else {
                let name_of = |id: PersonId| name_in(&people, id);
                println!("Created marriage {}", marriage_line(&marriage, name_of));
            }
        }
        MarriageCommands::List => {
            let snapshot = ctx.snapshot().await?;

            if ctx.is_json() {
                return print_json(&snapshot.marriages);
            }
            if snapshot.marriages.is_empty() {
                println!("No marriages found");
                return Ok(());
            }

            println!("Marriages ({} found):", snapshot.marriages.len());
            for marriage in &snapshot.marriages {
                let children = snapshot.children_of(marriage.id).count();
                println!(
                    "  {} [{} children]",
                    marriage_line(marriage, |id| snapshot.name_of(id)),
                    children
                );
            }
        }
        MarriageCommands::Get { id } => {
            let snapshot = ctx.snapshot().await?;
            let Some(marriage) = snapshot.marriage(MarriageId(*id)) else {
                anyhow::bail!("Marriage #{} not found", id);
            };
            let children: Vec<&Person> = snapshot
                .children_of(marriage.id)
                .filter_map(|link| snapshot.person(link.child_id))
                .collect();

            if ctx.is_json() {
                return print_json(&serde_json::json!({
                    "marriage": marriage,
                    "children": children,
                }));
            }

            let spouse = |p: Option<PersonId>| {
                p.map(|id| format!("{} (#{})", snapshot.name_of(id), id))
                    .unwrap_or_else(|| "Unknown".to_string())
            };
            println!("Marriage #{}", marriage.id);
            println!("  Husband: {}", spouse(marriage.husband_id));
            println!("  Wife: {}", spouse(marriage.wife_id));
            if marriage.marriage_date.is_some() {
                println!("  Date: {}", format_date(marriage.marriage_date));
            }
            if let Some(notes) = &marriage.notes {
                println!("  Notes: {}", notes);
            }
            if !children.is_empty() {
                println!("  Children:");
                for child in children {
                    println!("    - {} (#{})", child.name, child.id);
                }
            }
        }
        MarriageCommands::Update {
            id,
            husband,
            wife,
            date,
            notes,
        } => {
            let id = MarriageId(*id);
            let Some(mut marriage) = ctx.storage.get_marriage(id).await? else {
                anyhow::bail!("Marriage #{} not found", id);
            };
            let people = ctx.storage.list_people().await?;

            let mut changes = Vec::new();
            if let Some(h) = resolve_spouse(&people, husband.as_ref())? {
                marriage.husband_id = Some(h);
                changes.push(format!("husband = #{}", h));
            }
            if let Some(w) = resolve_spouse(&people, wife.as_ref())? {
                marriage.wife_id = Some(w);
                changes.push(format!("wife = #{}", w));
            }
            if let Some(date) = date {
                marriage.marriage_date = Some(*date);
                changes.push(format!("date = {}", date));
            }
            if let Some(notes) = notes {
                marriage.notes = Some(notes.clone());
                changes.push("notes updated".to_string());
            }

            if changes.is_empty() {
                println!("No changes specified for marriage #{}", id);
                return Ok(());
            }

            ctx.storage.update_marriage(&marriage).await?;
            tracing::info!("Updated marriage #{}: {}", id, changes.join(", "));

            if ctx.is_json() {
                print_json(&marriage)?;
            } else {
                let name_of = |p: PersonId| name_in(&people, p);
                println!("Updated marriage {}", marriage_line(&marriage, name_of));
                for change in &changes {
                    println!("  - {}", change);
                }
            }
        }
        MarriageCommands::Delete { id, force } => {
            let id = MarriageId(*id);
            if ctx.storage.get_marriage(id).await?.is_none() {
                anyhow::bail!("Marriage #{} not found", id);
            }

            if !force {
                println!("Use --force to confirm deletion of marriage #{}", id);
                return Ok(());
            }

            ctx.storage.delete_marriage(id).await?;
            tracing::info!("Deleted marriage #{}", id);
            println!("Deleted marriage #{}", id);
        }
    }

    Ok(())
}

fn name_in(people: &[Person], id: PersonId) -> String {
    people
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("#{}", id))
}
