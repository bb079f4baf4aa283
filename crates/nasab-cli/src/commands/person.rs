//! Person commands

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::resolve_person;
use crate::output::{format_date, person_line, print_json};
use crate::AppContext;
use nasab_core::{NewPerson, PersonQuery, SearchMode};
use nasab_search::engine_for;
use nasab_storage::StorageBackend;

#[derive(Args)]
pub struct PersonArgs {
    #[command(subcommand)]
    pub command: PersonCommands,
}

#[derive(Subcommand)]
pub enum PersonCommands {
    /// Add a new person
    Add {
        /// Full name
        name: String,
        /// Gender (male, female or a configured alias)
        #[arg(short, long, default_value = "")]
        gender: String,
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        born: Option<NaiveDate>,
        /// Death date (YYYY-MM-DD)
        #[arg(long)]
        died: Option<NaiveDate>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// List people
    List {
        /// Filter by gender
        #[arg(short, long)]
        gender: Option<String>,
        /// Limit results
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },
    /// Show a person
    Get {
        /// Person id or name
        person: String,
    },
    /// Update a person
    Update {
        /// Person id or name
        person: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New gender
        #[arg(short, long)]
        gender: Option<String>,
        /// New birth date
        #[arg(long)]
        born: Option<NaiveDate>,
        /// New death date
        #[arg(long)]
        died: Option<NaiveDate>,
        /// New notes
        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,
        /// Remove notes
        #[arg(long)]
        clear_notes: bool,
    },
    /// Delete a person and their child links, leaving their marriages spouse-less
    Delete {
        /// Person id or name
        person: String,
        /// Force deletion without confirmation
        #[arg(long)]
        force: bool,
    },
    /// Search people by name
    Search {
        /// Search text
        query: String,
        /// Rank by fuzzy name similarity instead of substring match
        #[arg(long)]
        fuzzy: bool,
        /// Filter by gender
        #[arg(short, long)]
        gender: Option<String>,
        /// Page number (0-based)
        #[arg(long, default_value = "0")]
        page: usize,
        /// Results per page
        #[arg(long, default_value = "20")]
        page_size: usize,
    },
}

pub async fn run(args: &PersonArgs, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        PersonCommands::Add {
            name,
            gender,
            born,
            died,
            notes,
        } => {
            let mut new = NewPerson::new(name, ctx.aliases.normalize(gender));
            new.birth_date = *born;
            new.death_date = *died;
            new.notes = notes.clone();

            let person = ctx.storage.insert_person(new).await?;
            tracing::info!("Created person #{}: {}", person.id, person.name);

            if ctx.is_json() {
                print_json(&person)?;
            } else {
                println!("Created person {}", person_line(&person));
            }
        }
        PersonCommands::List { gender, limit } => {
            let wanted = gender.as_deref().map(|g| ctx.aliases.normalize(g));
            let people: Vec<_> = ctx
                .storage
                .list_people()
                .await?
                .into_iter()
                .filter(|p| wanted.map_or(true, |g| p.gender == g))
                .take(*limit)
                .collect();

            tracing::info!("Found {} people", people.len());

            if ctx.is_json() {
                print_json(&people)?;
            } else if people.is_empty() {
                println!("No people found");
            } else {
                println!("People ({} found):", people.len());
                for person in &people {
                    println!("  {}", person_line(person));
                }
            }
        }
        PersonCommands::Get { person } => {
            let snapshot = ctx.snapshot().await?;
            let id = resolve_person(&snapshot.people, person)?;
            let Some(person) = snapshot.person(id) else {
                anyhow::bail!("Person #{} not found", id);
            };

            if ctx.is_json() {
                return print_json(person);
            }

            println!("Person #{}: {}", person.id, person.name);
            println!("  Gender: {}", person.gender.as_str());
            if person.birth_date.is_some() {
                println!("  Born: {}", format_date(person.birth_date));
            }
            if person.death_date.is_some() {
                println!("  Died: {}", format_date(person.death_date));
            }
            if let Some(notes) = &person.notes {
                println!("  Notes: {}", notes);
            }
            let marriages: Vec<String> = snapshot
                .marriages_of(id)
                .map(|m| {
                    let partner = m
                        .partner_of(id)
                        .map(|p| snapshot.name_of(p))
                        .unwrap_or_else(|| "Unknown".to_string());
                    format!("#{} with {}", m.id, partner)
                })
                .collect();
            if !marriages.is_empty() {
                println!("  Marriages: {}", marriages.join(", "));
            }
        }
        PersonCommands::Update {
            person,
            name,
            gender,
            born,
            died,
            notes,
            clear_notes,
        } => {
            let people = ctx.storage.list_people().await?;
            let id = resolve_person(&people, person)?;
            let Some(mut person) = people.into_iter().find(|p| p.id == id) else {
                anyhow::bail!("Person #{} not found", id);
            };

            let mut changes = Vec::new();
            if let Some(name) = name {
                person.name = name.clone();
                changes.push(format!("name = {}", name));
            }
            if let Some(gender) = gender {
                person.gender = ctx.aliases.normalize(gender);
                changes.push(format!("gender = {}", person.gender.as_str()));
            }
            if let Some(date) = born {
                person.birth_date = Some(*date);
                changes.push(format!("born = {}", date));
            }
            if let Some(date) = died {
                person.death_date = Some(*date);
                changes.push(format!("died = {}", date));
            }
            if let Some(notes) = notes {
                person.notes = Some(notes.clone());
                changes.push("notes updated".to_string());
            }
            if *clear_notes {
                person.notes = None;
                changes.push("notes cleared".to_string());
            }

            if changes.is_empty() {
                println!("No changes specified for person #{}", id);
                return Ok(());
            }

            ctx.storage.update_person(&person).await?;
            tracing::info!("Updated person #{}: {}", id, changes.join(", "));

            if ctx.is_json() {
                print_json(&person)?;
            } else {
                println!("Updated {}", person_line(&person));
                for change in &changes {
                    println!("  - {}", change);
                }
            }
        }
        PersonCommands::Delete { person, force } => {
            let people = ctx.storage.list_people().await?;
            let id = resolve_person(&people, person)?;

            if !force {
                println!("Use --force to confirm deletion of person #{}", id);
                return Ok(());
            }

            ctx.storage.delete_person(id).await?;
            tracing::info!("Deleted person #{}", id);
            println!("Deleted person #{}", id);
        }
        PersonCommands::Search {
            query,
            fuzzy,
            gender,
            page,
            page_size,
        } => {
            let mode = if *fuzzy {
                SearchMode::Fuzzy
            } else {
                SearchMode::Exact
            };
            let mut search = PersonQuery::new(query)
                .with_mode(mode)
                .with_pagination(*page, *page_size);
            if let Some(gender) = gender {
                search = search.with_gender(ctx.aliases.normalize(gender));
            }

            let people = ctx.storage.list_people().await?;
            let engine = engine_for(mode)?;
            let results = engine.search_page(&search, &people).await?;

            tracing::info!(
                "Search '{}' matched {} people",
                query,
                results.pagination.total_count
            );

            if ctx.is_json() {
                print_json(&results)?;
            } else if results.data.is_empty() {
                println!("No people match '{}'", query);
            } else {
                let info = &results.pagination;
                println!(
                    "Matches for '{}' (page {}/{}, {} total):",
                    query,
                    info.current_page + 1,
                    info.total_pages,
                    info.total_count
                );
                for hit in &results.data {
                    if *fuzzy {
                        println!("  {} [score {}]", person_line(&hit.person), hit.score);
                    } else {
                        println!("  {}", person_line(&hit.person));
                    }
                }
            }
        }
    }

    Ok(())
}
