use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dashboard::domain::{Group, GroupName};
use super::domain::{StatusCategory, StatusRecord};

/// Most severe category among the records that apply to `group` at `now`.
///
/// Returns `None` when no record applies.
pub fn resolve_group_status<'a, I>(
    records: I,
    group: &GroupName,
    now: DateTime<Utc>,
) -> Option<StatusCategory>
where
    I: IntoIterator<Item = &'a StatusRecord>,
{
    records
        .into_iter()
        .filter(|record| record.applies_to(group, now))
        .map(|record| record.category)
        .min_by_key(|category| category.rank())
}

/// Resolved status for one group, shaped for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStatusView {
    pub group: GroupName,
    pub category: Option<StatusCategory>,
    pub label: Option<&'static str>,
    pub applicable_records: usize,
}

impl GroupStatusView {
    pub fn resolve(records: &[StatusRecord], group: &GroupName, now: DateTime<Utc>) -> Self {
        let applicable_records = records
            .iter()
            .filter(|record| record.applies_to(group, now))
            .count();
        let category = resolve_group_status(records, group, now);

        Self {
            group: group.clone(),
            category,
            label: category.map(StatusCategory::label),
            applicable_records,
        }
    }
}

/// Resolves every group in the order given.
pub fn resolve_overview(
    groups: &[Group],
    records: &[StatusRecord],
    now: DateTime<Utc>,
) -> Vec<GroupStatusView> {
    groups
        .iter()
        .map(|group| GroupStatusView::resolve(records, &group.name, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn record(group: &str, category: StatusCategory) -> StatusRecord {
        StatusRecord {
            id: format!("{group}-{}", category.rank()),
            group: GroupName::from(group),
            category,
            active: true,
            end: None,
            note: None,
        }
    }

    #[test]
    fn most_severe_category_wins_regardless_of_order() {
        let records = vec![
            record("Lier", StatusCategory::Cleared),
            record("Lier", StatusCategory::Cautious),
            record("Lier", StatusCategory::NotAllowed),
            record("Lier", StatusCategory::Restricted),
        ];

        assert_eq!(
            resolve_group_status(&records, &GroupName::from("Lier"), now()),
            Some(StatusCategory::NotAllowed)
        );
    }

    #[test]
    fn inactive_expired_and_foreign_records_are_ignored() {
        let mut inactive = record("Lier", StatusCategory::NotAllowed);
        inactive.active = false;
        let mut expired = record("Lier", StatusCategory::Restricted);
        expired.end = Some(now() - Duration::seconds(1));
        let other_group = record("Kempen", StatusCategory::NotAllowed);
        let current = record("Lier", StatusCategory::Cautious);

        let records = vec![inactive, expired, other_group, current];
        assert_eq!(
            resolve_group_status(&records, &GroupName::from("Lier"), now()),
            Some(StatusCategory::Cautious)
        );
    }

    #[test]
    fn record_ending_exactly_now_still_applies() {
        let mut ending = record("Lier", StatusCategory::Restricted);
        ending.end = Some(now());

        assert_eq!(
            resolve_group_status([&ending], &GroupName::from("Lier"), now()),
            Some(StatusCategory::Restricted)
        );
    }

    #[test]
    fn no_applicable_record_resolves_to_none() {
        let records = vec![record("Kempen", StatusCategory::Cleared)];
        assert_eq!(
            resolve_group_status(&records, &GroupName::from("Lier"), now()),
            None
        );
        let empty: Vec<StatusRecord> = Vec::new();
        assert_eq!(
            resolve_group_status(&empty, &GroupName::from("Lier"), now()),
            None
        );
    }

    #[test]
    fn group_match_ignores_case_and_padding() {
        let records = vec![record(" lier", StatusCategory::Restricted)];
        assert_eq!(
            resolve_group_status(&records, &GroupName::from("LIER"), now()),
            Some(StatusCategory::Restricted)
        );
    }

    #[test]
    fn overview_keeps_group_order_and_counts_applicable_records() {
        let groups = vec![
            Group {
                id: "g-2".to_string(),
                name: GroupName::from("Kempen"),
                description: None,
            },
            Group {
                id: "g-1".to_string(),
                name: GroupName::from("Lier"),
                description: None,
            },
        ];
        let records = vec![
            record("Lier", StatusCategory::Cautious),
            record("Lier", StatusCategory::Cleared),
        ];

        let overview = resolve_overview(&groups, &records, now());
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].group.as_str(), "Kempen");
        assert_eq!(overview[0].category, None);
        assert_eq!(overview[0].applicable_records, 0);
        assert_eq!(overview[1].category, Some(StatusCategory::Cautious));
        assert_eq!(overview[1].label, Some("Cautious"));
        assert_eq!(overview[1].applicable_records, 2);
    }
}
