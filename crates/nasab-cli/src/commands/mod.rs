//! CLI command implementations

pub mod child;
pub mod completions;
pub mod config;
pub mod io;
pub mod kinship;
pub mod marriage;
pub mod person;
pub mod report;
pub mod tree;

use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use nasab_core::{Person, PersonId};

/// Resolve a person argument: a numeric id, or a name matched case-insensitively
pub fn resolve_person(people: &[Person], reference: &str) -> anyhow::Result<PersonId> {
    let reference = reference.trim();
    if let Ok(id) = reference.trim_start_matches('#').parse::<u64>() {
        let id = PersonId(id);
        if people.iter().any(|p| p.id == id) {
            return Ok(id);
        }
        anyhow::bail!("Person #{} not found", id);
    }

    let wanted = reference.to_lowercase();
    let matches: Vec<&Person> = people
        .iter()
        .filter(|p| p.name.to_lowercase() == wanted)
        .collect();

    match matches.as_slice() {
        [] => anyhow::bail!("No person named '{}'", reference),
        [person] => Ok(person.id),
        many => {
            let ids: Vec<String> = many.iter().map(|p| format!("#{}", p.id)).collect();
            anyhow::bail!(
                "Name '{}' is ambiguous ({}); use an id instead",
                reference,
                ids.join(", ")
            )
        }
    }
}

/// Write `content` to `path` readable by the owner only, creating parent directories
pub fn write_private(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Write with secure permissions (0o600 = owner read/write only)
    #[cfg(unix)]
    {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(content.as_bytes())?;
    }
    #[cfg(not(unix))]
    {
        std::fs::write(path, content)?;
    }
    Ok(())
}

/// Write `content` to `target` if given, otherwise to stdout
pub fn emit(content: &str, target: Option<PathBuf>, what: &str) -> anyhow::Result<()> {
    match target {
        Some(path) => {
            write_private(&path, content)?;
            tracing::info!("Wrote {} to {:?}", what, path);
            println!("Wrote {} to {}", what, path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// `--output` wins over `--save`, which writes `file_name` into the output directory
pub fn output_target(
    output: Option<&PathBuf>,
    save: bool,
    output_dir: &Path,
    file_name: &str,
) -> Option<PathBuf> {
    match output {
        Some(path) => Some(path.clone()),
        None if save => Some(output_dir.join(file_name)),
        None => None,
    }
}
