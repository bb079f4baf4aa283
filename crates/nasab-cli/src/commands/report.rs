//! Person profile, family listing and people CSV reports

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;

use super::{emit, output_target, resolve_person};
use crate::output::{format_date, print_json, to_json};
use crate::AppContext;
use nasab_core::{FamilySnapshot, MarriageId, Person, Relative, RelativesProfile};
use nasab_storage::StorageBackend;

#[derive(Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub command: ReportCommands,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Parents, siblings, spouses and children of a person
    Profile {
        /// Person id or name
        person: String,
    },
    /// Every person by name, then every marriage
    Family {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write family_report.txt (or .json) into the output directory
        #[arg(long)]
        save: bool,
    },
    /// Every person as CSV, ordered by name
    Csv {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write people.csv into the output directory
        #[arg(long)]
        save: bool,
    },
}

pub async fn run(args: &ReportArgs, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        ReportCommands::Profile { person } => {
            let snapshot = ctx.snapshot().await?;
            let id = resolve_person(&snapshot.people, person)?;
            let profile = RelativesProfile::for_person(&snapshot, id)?;

            if ctx.is_json() {
                return print_json(&profile);
            }

            println!(
                "{} (#{}, {})",
                profile.person.name,
                profile.person.id,
                profile.person.gender.as_str()
            );
            print_section("Parents", &profile.parents);
            print_section("Siblings", &profile.siblings);
            print_section("Spouses", &profile.spouses);
            print_section("Children", &profile.children);
        }
        ReportCommands::Family { output, save } => {
            let snapshot = ctx.snapshot().await?;
            let report = FamilyReport::build(&snapshot);
            tracing::info!(
                "Writing family report: {} people, {} marriages",
                report.people.len(),
                report.marriages.len()
            );

            let (content, file_name) = if ctx.is_json() {
                (format!("{}\n", to_json(&report)?), "family_report.json")
            } else {
                (report.to_text(), "family_report.txt")
            };
            let target = output_target(output.as_ref(), *save, &ctx.output_dir, file_name);
            emit(&content, target, "family report")?;
        }
        ReportCommands::Csv { output, save } => {
            let people = sorted_by_name(ctx.storage.list_people().await?);
            tracing::info!("Writing CSV report for {} people", people.len());

            let content = people_csv(&people);
            let target = output_target(output.as_ref(), *save, &ctx.output_dir, "people.csv");
            emit(&content, target, "people report")?;
        }
    }

    Ok(())
}

fn print_section(title: &str, relatives: &[Relative]) {
    if relatives.is_empty() {
        println!("  {}: none", title);
        return;
    }
    println!("  {}:", title);
    for relative in relatives {
        println!(
            "    - {} {} (#{})",
            relative.gender.symbol(),
            relative.name,
            relative.id
        );
    }
}

/// People ordered by name, ties broken by id
fn sorted_by_name(mut people: Vec<Person>) -> Vec<Person> {
    people.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    people
}

#[derive(Debug, Serialize)]
struct FamilyReport {
    people: Vec<Person>,
    marriages: Vec<MarriageEntry>,
}

/// A marriage with spouse names resolved; `None` for an empty slot
#[derive(Debug, Serialize)]
struct MarriageEntry {
    id: MarriageId,
    husband: Option<String>,
    wife: Option<String>,
    marriage_date: Option<NaiveDate>,
}

impl FamilyReport {
    fn build(snapshot: &FamilySnapshot) -> Self {
        let marriages = snapshot
            .marriages
            .iter()
            .map(|m| MarriageEntry {
                id: m.id,
                husband: m.husband_id.map(|id| snapshot.name_of(id)),
                wife: m.wife_id.map(|id| snapshot.name_of(id)),
                marriage_date: m.marriage_date,
            })
            .collect();

        Self {
            people: sorted_by_name(snapshot.people.clone()),
            marriages,
        }
    }

    fn to_text(&self) -> String {
        let dash = |value: String| if value.is_empty() { "-".to_string() } else { value };
        let mut out = String::from("Family Tree Report\n\n");

        for person in &self.people {
            out.push_str(&format!("Name: {}\n", person.name));
            out.push_str(&format!("Gender: {}\n", person.gender.as_str()));
            out.push_str(&format!("Born: {}\n", dash(format_date(person.birth_date))));
            out.push_str(&format!("Died: {}\n", dash(format_date(person.death_date))));
            out.push_str(&format!(
                "Notes: {}\n",
                dash(person.notes.clone().unwrap_or_default())
            ));
            out.push_str(&format!("{}\n", "-".repeat(60)));
        }

        out.push_str("\nMarriages\n\n");
        if self.marriages.is_empty() {
            out.push_str("(none)\n");
        }
        for marriage in &self.marriages {
            out.push_str(&format!(
                "{} & {} - {}\n",
                marriage.husband.as_deref().unwrap_or("?"),
                marriage.wife.as_deref().unwrap_or("?"),
                dash(format_date(marriage.marriage_date))
            ));
        }
        out
    }
}

/// `ID,Name,Gender,Birth,Death,Notes`, one row per person
fn people_csv(people: &[Person]) -> String {
    let mut output = String::from("ID,Name,Gender,Birth,Death,Notes\n");

    for person in people {
        output.push_str(&format!(
            "{},{},{},{},{},{}\n",
            person.id,
            csv_escape(&person.name),
            person.gender.as_str(),
            format_date(person.birth_date),
            format_date(person.death_date),
            csv_escape(person.notes.as_deref().unwrap_or(""))
        ));
    }

    output
}

/// Escape a string for CSV output with formula injection protection
fn csv_escape(s: &str) -> String {
    // Prefix dangerous chars with ' to prevent spreadsheet interpretation
    let needs_formula_protection = s
        .chars()
        .next()
        .map(|c| matches!(c, '=' | '+' | '-' | '@' | '\t' | '\r'))
        .unwrap_or(false);

    let escaped = if needs_formula_protection {
        format!("'{}", s)
    } else {
        s.to_string()
    };

    if escaped.contains(',') || escaped.contains('"') || escaped.contains('\n') {
        format!("\"{}\"", escaped.replace('"', "\"\""))
    } else {
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nasab_core::{Gender, Marriage, PersonId};

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("Hasan"), "Hasan");
        assert_eq!(csv_escape("bin Ali, Hasan"), "\"bin Ali, Hasan\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(csv_escape("-1,2"), "\"'-1,2\"");
    }

    #[test]
    fn test_people_csv() {
        let people = vec![
            Person::new(1, "Zaid", Gender::Male),
            Person::new(2, "Hawa", Gender::Female).with_notes("@home, mostly"),
            Person::new(3, "Adam", Gender::Male)
                .with_birth_date(NaiveDate::from_ymd_opt(1900, 1, 2).unwrap()),
        ];

        let csv = people_csv(&sorted_by_name(people));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "ID,Name,Gender,Birth,Death,Notes");
        assert_eq!(lines[1], "3,Adam,male,1900-01-02,,");
        assert_eq!(lines[2], "2,Hawa,female,,,\"'@home, mostly\"");
        assert_eq!(lines[3], "1,Zaid,male,,,");
    }

    #[test]
    fn test_sorted_by_name_breaks_ties_by_id() {
        let people = vec![
            Person::new(5, "Ali", Gender::Male),
            Person::new(2, "Ali", Gender::Male),
            Person::new(9, "Aisyah", Gender::Female),
        ];
        let ids: Vec<u64> = sorted_by_name(people).iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![9, 2, 5]);
    }

    #[test]
    fn test_family_report_text() {
        let snapshot = FamilySnapshot::new()
            .with_people(vec![
                Person::new(1, "Yusuf", Gender::Male),
                Person::new(2, "Asenath", Gender::Female).with_notes("Heliopolis"),
            ])
            .with_marriages(vec![
                Marriage::couple(1, PersonId(1), PersonId(2))
                    .with_date(NaiveDate::from_ymd_opt(1950, 3, 4).unwrap()),
                Marriage::new(2, None, Some(PersonId(2))),
            ]);

        let report = FamilyReport::build(&snapshot);
        let text = report.to_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Family Tree Report");
        // Asenath sorts before Yusuf
        assert_eq!(lines[2], "Name: Asenath");
        assert_eq!(lines[6], "Notes: Heliopolis");
        assert_eq!(lines[8], "Name: Yusuf");
        assert_eq!(lines[10], "Born: -");
        assert!(text.contains("Yusuf & Asenath - 1950-03-04\n"));
        assert!(text.contains("? & Asenath - -\n"));
    }

    #[test]
    fn test_family_report_json_keeps_missing_spouse_null() {
        let snapshot = FamilySnapshot::new()
            .with_people(vec![Person::new(4, "Maryam", Gender::Female)])
            .with_marriages(vec![Marriage::new(3, None, Some(PersonId(4)))]);

        let json = serde_json::to_value(FamilyReport::build(&snapshot)).unwrap();
        assert_eq!(json["people"][0]["name"], "Maryam");
        assert_eq!(json["marriages"][0]["id"], 3);
        assert!(json["marriages"][0]["husband"].is_null());
        assert_eq!(json["marriages"][0]["wife"], "Maryam");
    }
}
