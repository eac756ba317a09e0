use chrono::{DateTime, Duration, TimeZone, Utc};
use sportdash::dashboard::status::legacy::{classify, resolve_legacy};
use sportdash::dashboard::status::{resolve_group_status, LegacyStatusRecord};
use sportdash::dashboard::{GroupName, StatusCategory, StatusRecord};

fn evaluation_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 9, 30, 0).unwrap()
}

fn free_text(group: &str, status: &str) -> LegacyStatusRecord {
    LegacyStatusRecord {
        group: Some(group.to_string()),
        status: Some(status.to_string()),
        active: Some(true),
        ..LegacyStatusRecord::default()
    }
}

#[test]
fn most_severe_free_text_status_wins_despite_order() {
    let records = vec![free_text("Lier", "niet sporten"), free_text("Lier", "licht")];
    let reversed: Vec<_> = records.iter().rev().cloned().collect();
    let group = GroupName::from("Lier");

    assert_eq!(
        resolve_legacy(&records, &group, evaluation_time()),
        Some(StatusCategory::NotAllowed)
    );
    assert_eq!(
        resolve_legacy(&reversed, &group, evaluation_time()),
        Some(StatusCategory::NotAllowed)
    );
}

#[test]
fn resolution_matches_minimum_rank_of_applicable_records() {
    let now = evaluation_time();
    let group = GroupName::from("Lier");
    let mut records = Vec::new();
    for (index, category) in StatusCategory::ordered().into_iter().enumerate() {
        records.push(StatusRecord {
            id: format!("status-{index}"),
            group: group.clone(),
            category,
            active: index % 2 == 1,
            end: Some(now + Duration::days(index as i64)),
            note: None,
        });
    }

    let expected = records
        .iter()
        .filter(|record| record.active && record.end.map_or(true, |end| end >= now))
        .map(|record| record.category.rank())
        .min();
    let resolved = resolve_group_status(&records, &group, now);

    assert_eq!(resolved.map(StatusCategory::rank), expected);
    assert_eq!(resolved, Some(StatusCategory::Restricted));
    assert_eq!(resolve_group_status(&records, &group, now), resolved);
}

#[test]
fn every_field_participates_in_classification() {
    let by_color = LegacyStatusRecord {
        group: Some("Kempen".to_string()),
        kleur: Some("rood".to_string()),
        ..LegacyStatusRecord::default()
    };
    let by_type = LegacyStatusRecord {
        group: Some("Kempen".to_string()),
        kind: Some("Alleen wandelen".to_string()),
        ..LegacyStatusRecord::default()
    };

    assert_eq!(by_color.category(), Some(StatusCategory::NotAllowed));
    assert_eq!(by_type.category(), Some(StatusCategory::Restricted));
    assert_eq!(classify(""), None);
}

#[test]
fn unclassified_text_contributes_nothing() {
    let records = vec![free_text("Lier", "zie dossier")];
    assert_eq!(
        resolve_legacy(&records, &GroupName::from("Lier"), evaluation_time()),
        None
    );
}

#[test]
fn legacy_json_uses_original_field_names() {
    let raw = r#"[
        {"group": "Lier", "type": "sportverbod", "active": false},
        {"group": "Lier", "severity": "voorzichtig", "end": "2025-06-16T00:00:00Z"}
    ]"#;
    let records: Vec<LegacyStatusRecord> = serde_json::from_str(raw).expect("valid json");

    assert_eq!(records[0].kind.as_deref(), Some("sportverbod"));
    assert_eq!(
        resolve_legacy(&records, &GroupName::from("Lier"), evaluation_time()),
        Some(StatusCategory::Cautious)
    );
}
