//! Output formatting utilities

use chrono::NaiveDate;
use clap::ValueEnum;
use nasab_core::{Marriage, Person, PersonId};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Pretty JSON for `data`
pub fn to_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

pub fn print_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    println!("{}", to_json(data)?);
    Ok(())
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// One-line summary: `#3 Hasan (♂) b. 1950-03-01 d. 2010-05-02`
pub fn person_line(person: &Person) -> String {
    let mut line = format!("#{} {} ({})", person.id, person.name, person.gender.symbol());
    if person.birth_date.is_some() {
        line.push_str(&format!(" b. {}", format_date(person.birth_date)));
    }
    if person.death_date.is_some() {
        line.push_str(&format!(" d. {}", format_date(person.death_date)));
    }
    line
}

/// One-line marriage summary with spouse names resolved through `name_of`
pub fn marriage_line(marriage: &Marriage, name_of: impl Fn(PersonId) -> String) -> String {
    let spouse = |id: Option<PersonId>| id.map(&name_of).unwrap_or_else(|| "Unknown".to_string());
    let mut line = format!(
        "#{} {} + {}",
        marriage.id,
        spouse(marriage.husband_id),
        spouse(marriage.wife_id)
    );
    if let Some(date) = marriage.marriage_date {
        line.push_str(&format!(" (married {})", format_date(Some(date))));
    }
    line
}
