use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;

use super::domain::{ExtraSportMoment, Group, MomentStatus};
use super::import::{csv_reader, ImportError};
use super::window::{parse_event_instant, DateWindow};

pub const MAX_SCORE: u32 = 100;
pub const POINTS_PER_MOMENT: u32 = 10;

/// Deficit score: 100 with no recent moments, ten less per moment, never below zero.
pub const fn score(moment_count: u32) -> u32 {
    MAX_SCORE.saturating_sub(moment_count.saturating_mul(POINTS_PER_MOMENT))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCandidate {
    pub group_id: String,
    pub name: String,
    #[serde(default)]
    pub moment_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityEntry {
    pub group_id: String,
    pub name: String,
    pub score: u32,
    pub moment_count: u32,
}

impl From<PriorityCandidate> for PriorityEntry {
    fn from(candidate: PriorityCandidate) -> Self {
        Self {
            score: score(candidate.moment_count),
            group_id: candidate.group_id,
            name: candidate.name,
            moment_count: candidate.moment_count,
        }
    }
}

/// Highest score first. Equal scores keep their input order.
pub fn rank<I>(candidates: I) -> Vec<PriorityEntry>
where
    I: IntoIterator<Item = PriorityCandidate>,
{
    let mut entries: Vec<PriorityEntry> = candidates.into_iter().map(PriorityEntry::from).collect();
    entries.sort_by(|left, right| right.score.cmp(&left.score));
    entries
}

/// Counts completed moments per group whose start lies in `[now - window, now]`.
///
/// Every group gets a candidate, in registry order. Moments with unreadable starts or for
/// unregistered groups are ignored.
pub fn count_recent_moments(
    groups: &[Group],
    moments: &[ExtraSportMoment],
    now: DateTime<Utc>,
    window: Duration,
    tz: &Tz,
) -> Vec<PriorityCandidate> {
    let since = now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let trailing = DateWindow::range(since, now);
    let completed: Vec<(&ExtraSportMoment, DateTime<Utc>)> = moments
        .iter()
        .filter(|moment| moment.status == MomentStatus::Completed)
        .filter_map(|moment| parse_event_instant(&moment.start, tz).map(|start| (moment, start)))
        .filter(|(_, start)| trailing.contains_instant(*start))
        .collect();

    groups
        .iter()
        .map(|group| {
            let moment_count = completed
                .iter()
                .filter(|(moment, _)| moment.group == group.name)
                .count();
            PriorityCandidate {
                group_id: group.id.clone(),
                name: group.name.to_string(),
                moment_count: u32::try_from(moment_count).unwrap_or(u32::MAX),
            }
        })
        .collect()
}

/// Reads `group_id,name,moment_count` rows. A blank count reads as zero.
pub fn parse_candidates_csv<R: Read>(reader: R) -> Result<Vec<PriorityCandidate>, ImportError> {
    let mut candidates = Vec::new();

    for row in csv_reader(reader).deserialize::<CandidateCsvRow>() {
        let row = row?;
        candidates.push(PriorityCandidate {
            group_id: row.group_id,
            name: row.name,
            moment_count: row.moment_count,
        });
    }

    Ok(candidates)
}

#[derive(Debug, Deserialize)]
struct CandidateCsvRow {
    group_id: String,
    name: String,
    #[serde(default, deserialize_with = "blank_as_zero")]
    moment_count: u32,
}

fn blank_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse()
        .map_err(|_| D::Error::custom(format!("moment_count '{raw}' is not a count")))
}
