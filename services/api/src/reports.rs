use chrono::{DateTime, Utc};
use clap::Args;
use sportdash::dashboard::status::legacy::{parse_legacy_csv, resolve_legacy};
use sportdash::dashboard::status::LegacyStatusRecord;
use sportdash::dashboard::{parse_candidates_csv, GroupName, PriorityEntry, StatusCategory};
use sportdash::error::AppError;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct StatusResolveArgs {
    /// Legacy status export (group,status,severity,kleur,type,note,active,end)
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Group to resolve; matched ignoring case and surrounding whitespace
    #[arg(long)]
    pub(crate) group: String,
    /// Evaluation instant as RFC 3339 (defaults to now)
    #[arg(long, value_parser = crate::infra::parse_instant)]
    pub(crate) at: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
pub(crate) struct PriorityRankArgs {
    /// Candidate listing (group_id,name,moment_count)
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Print the ranking as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_status_resolve(args: StatusResolveArgs) -> Result<(), AppError> {
    let StatusResolveArgs { csv, group, at } = args;
    let records = parse_legacy_csv(BufReader::new(File::open(&csv)?))?;
    let now = at.unwrap_or_else(Utc::now);
    let group = GroupName::from(group.as_str());

    let category = resolve_legacy(&records, &group, now);
    println!("{}", render_status(&group, category, &records, now));
    Ok(())
}

pub(crate) fn run_priority_rank(args: PriorityRankArgs) -> Result<(), AppError> {
    let PriorityRankArgs { csv, json } = args;
    let candidates = parse_candidates_csv(BufReader::new(File::open(&csv)?))?;
    let ranking = sportdash::dashboard::priority::rank(candidates);

    if json {
        let body = serde_json::to_string_pretty(&ranking).map_err(std::io::Error::from)?;
        println!("{body}");
    } else {
        print!("{}", render_ranking(&ranking));
    }
    Ok(())
}

fn render_status(
    group: &GroupName,
    category: Option<StatusCategory>,
    records: &[LegacyStatusRecord],
    now: DateTime<Utc>,
) -> String {
    let mentioned = records
        .iter()
        .filter(|record| {
            record
                .group
                .as_deref()
                .is_some_and(|name| GroupName::from(name) == *group)
        })
        .count();

    match category {
        Some(category) => format!(
            "{group}: {} ({mentioned} record(s) on file, evaluated at {})",
            category.label(),
            now.to_rfc3339()
        ),
        None => format!(
            "{group}: no applicable status ({mentioned} record(s) on file, evaluated at {})",
            now.to_rfc3339()
        ),
    }
}

fn render_ranking(ranking: &[PriorityEntry]) -> String {
    let width = ranking
        .iter()
        .map(|entry| entry.name.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut output = format!("{:<width$}  {:>5}  {:>7}\n", "Group", "Score", "Moments");
    for entry in ranking {
        output.push_str(&format!(
            "{:<width$}  {:>5}  {:>7}\n",
            entry.name, entry.score, entry.moment_count
        ));
    }
    output
}
