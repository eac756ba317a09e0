//! Adapter for status records that only carry free-text fields.
//!
//! Older exports describe a restriction with loose Dutch or English text spread over
//! `status`, `severity`, `kleur`, `type`, and `note`. [`classify`] maps that text onto a
//! [`StatusCategory`] using keyword patterns checked in severity order, so the first
//! category whose pattern matches wins even when the text also mentions a milder one.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::OnceLock;

use crate::dashboard::domain::GroupName;
use crate::dashboard::import::{csv_reader, empty_string_as_none, ImportError};
use super::domain::{StatusCategory, StatusRecord};
use super::resolver::resolve_group_status;

fn category_patterns() -> &'static [(StatusCategory, Regex)] {
    static PATTERNS: OnceLock<Vec<(StatusCategory, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (
                StatusCategory::NotAllowed,
                r"(?i)\b(niet\s+sporten|geen\s+sport(en)?|sportverbod|verboden|niet\s+toegestaan|not\s+allowed|no\s+sports?|rood|red)\b",
            ),
            (
                StatusCategory::Restricted,
                r"(?i)\b(beperkt|beperking|alleen\s+fitness|alleen\s+wandelen|aangepast|restricted|limited|oranje|orange)\b",
            ),
            (
                StatusCategory::Cautious,
                r"(?i)\b(voorzichtig|licht|lichte|opletten|let\s+op|cautious|caution|geel|yellow)\b",
            ),
            (
                StatusCategory::Cleared,
                r"(?i)\b(vrij|toegestaan|mag\s+sporten|groen|green|cleared|ok)\b",
            ),
        ]
        .into_iter()
        .map(|(category, pattern)| {
            (
                category,
                Regex::new(pattern).expect("status keyword pattern compiles"),
            )
        })
        .collect()
    })
}

/// Classifies free text; `None` when no pattern matches.
pub fn classify(text: &str) -> Option<StatusCategory> {
    category_patterns()
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(category, _)| *category)
}

/// Status record as exported by the free-text store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyStatusRecord {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub kleur: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub end: Option<String>,
}

impl LegacyStatusRecord {
    /// All descriptive fields joined by spaces, skipping empty ones.
    pub fn combined_text(&self) -> String {
        [
            &self.status,
            &self.severity,
            &self.kleur,
            &self.kind,
            &self.note,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn category(&self) -> Option<StatusCategory> {
        classify(&self.combined_text())
    }

    /// Converts into a typed record, or `None` when the group is missing, the text does
    /// not classify, or `end` is present but unreadable.
    pub fn into_record(self, id: impl Into<String>) -> Option<StatusRecord> {
        let group = self
            .group
            .as_deref()
            .map(GroupName::from)
            .filter(|group| !group.is_blank())?;
        let category = self.category()?;
        let end = match self.end.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_legacy_end(raw)?),
        };

        Some(StatusRecord {
            id: id.into(),
            group,
            category,
            active: self.active.unwrap_or(true),
            end,
            note: self.note.filter(|note| !note.trim().is_empty()),
        })
    }
}

fn parse_legacy_end(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Resolves directly from free-text records, skipping any that do not convert.
pub fn resolve_legacy(
    records: &[LegacyStatusRecord],
    group: &GroupName,
    now: DateTime<Utc>,
) -> Option<StatusCategory> {
    let converted: Vec<StatusRecord> = records
        .iter()
        .cloned()
        .enumerate()
        .filter_map(|(index, record)| record.into_record(format!("legacy-{index}")))
        .collect();
    resolve_group_status(&converted, group, now)
}

/// Reads a legacy CSV export with `group,status,severity,kleur,type,note,active,end`
/// headers. Missing columns read as empty.
pub fn parse_legacy_csv<R: Read>(reader: R) -> Result<Vec<LegacyStatusRecord>, ImportError> {
    let mut records = Vec::new();

    for row in csv_reader(reader).deserialize::<LegacyCsvRow>() {
        records.push(row?.into_legacy());
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct LegacyCsvRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    group: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    severity: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    kleur: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "empty_string_as_none")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    note: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    end: Option<String>,
}

impl LegacyCsvRow {
    fn into_legacy(self) -> LegacyStatusRecord {
        let active = self.active.as_deref().map(|raw| {
            !matches!(
                raw.to_ascii_lowercase().as_str(),
                "false" | "0" | "no" | "nee" | "inactive"
            )
        });

        LegacyStatusRecord {
            group: self.group,
            status: self.status,
            severity: self.severity,
            kleur: self.kleur,
            kind: self.kind,
            note: self.note,
            active,
            end: self.end,
        }
    }
}
