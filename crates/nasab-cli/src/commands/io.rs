//! Import/Export commands

use std::path::PathBuf;

use clap::Args;
use serde::{Deserialize, Serialize};

use super::emit;
use crate::AppContext;
use nasab_core::FamilySnapshot;
use nasab_storage::StorageBackend;

/// Version written into new exports
pub const EXPORT_VERSION: &str = "1.0";

#[derive(Args)]
pub struct ImportArgs {
    /// Input file (JSON export)
    pub file: PathBuf,

    /// Merge with existing data (default: error if the store is not empty)
    #[arg(long)]
    pub merge: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Export file layout: a version tag next to the three record lists
///
/// A bare snapshot without `version` is accepted on import.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportData {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(flatten)]
    pub snapshot: FamilySnapshot,
}

fn default_version() -> String {
    EXPORT_VERSION.to_string()
}

impl ExportData {
    pub fn new(snapshot: FamilySnapshot) -> Self {
        Self {
            version: default_version(),
            snapshot,
        }
    }
}

pub async fn run_import(args: &ImportArgs, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("Importing from {:?}", args.file);

    let content = std::fs::read_to_string(&args.file)?;
    let data: ExportData = serde_json::from_str(&content)?;

    tracing::debug!("Import format version: {}", data.version);

    if !args.merge {
        let existing = ctx.storage.list_people().await?.len();
        if existing > 0 {
            anyhow::bail!(
                "Store already has {} people. Use --merge to add to existing data.",
                existing
            );
        }
    }

    let snapshot = &data.snapshot;
    ctx.storage.import_snapshot(snapshot).await?;

    tracing::info!(
        "Imported {} people, {} marriages and {} child links",
        snapshot.people.len(),
        snapshot.marriages.len(),
        snapshot.children.len()
    );
    println!(
        "Imported {} people, {} marriages and {} child links from {:?}",
        snapshot.people.len(),
        snapshot.marriages.len(),
        snapshot.children.len(),
        args.file
    );

    Ok(())
}

pub async fn run_export(args: &ExportArgs, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("Exporting data");

    let snapshot = ctx.snapshot().await?;
    tracing::debug!(
        "Exporting {} people, {} marriages, {} child links",
        snapshot.people.len(),
        snapshot.marriages.len(),
        snapshot.children.len()
    );

    let content = format!(
        "{}\n",
        serde_json::to_string_pretty(&ExportData::new(snapshot))?
    );
    emit(&content, args.output.clone(), "export")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nasab_core::{Gender, Person};

    #[test]
    fn test_export_layout() {
        let snapshot =
            FamilySnapshot::new().with_people(vec![Person::new(1, "Adam", Gender::Male)]);
        let json = serde_json::to_value(ExportData::new(snapshot)).unwrap();

        assert_eq!(json["version"], "1.0");
        assert_eq!(json["people"][0]["name"], "Adam");
        assert!(json["marriages"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_import_accepts_bare_snapshot() {
        let data: ExportData =
            serde_json::from_str(r#"{"people": [{"id": 4, "name": "Hawa", "gender": "female"}]}"#)
                .unwrap();

        assert_eq!(data.version, EXPORT_VERSION);
        assert_eq!(data.snapshot.people.len(), 1);
        assert_eq!(data.snapshot.people[0].gender, Gender::Female);
        assert!(data.snapshot.children.is_empty());
    }

    #[test]
    fn test_import_normalizes_locale_genders() {
        let data: ExportData = serde_json::from_str(
            r#"{"version": "1.0", "people": [
                {"id": 1, "name": "Budi", "gender": "L"},
                {"id": 2, "name": "Siti", "gender": "Perempuan"}
            ]}"#,
        )
        .unwrap();

        let genders: Vec<Gender> = data.snapshot.people.iter().map(|p| p.gender).collect();
        assert_eq!(genders, vec![Gender::Male, Gender::Female]);
    }
}
