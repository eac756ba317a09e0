use sportdash::dashboard::priority::{rank, score};
use sportdash::dashboard::PriorityCandidate;

fn candidate(name: &str, moment_count: u32) -> PriorityCandidate {
    PriorityCandidate {
        group_id: name.to_lowercase(),
        name: name.to_string(),
        moment_count,
    }
}

#[test]
fn score_saturates_at_ten_moments() {
    for count in 10..200 {
        assert_eq!(score(count), 0, "count {count} should floor at zero");
    }
    assert_eq!(score(0), 100);
    assert_eq!(score(3), 70);
}

#[test]
fn ranked_output_is_sorted_and_stable() {
    let candidates = vec![
        candidate("Lier", 2),
        candidate("Kempen", 11),
        candidate("Berk", 0),
        candidate("Eik", 2),
        candidate("Hazel", 15),
        candidate("Linde", 0),
    ];

    let ranked = rank(candidates);
    assert!(ranked.windows(2).all(|pair| pair[0].score >= pair[1].score));

    let names: Vec<&str> = ranked.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, vec!["Berk", "Linde", "Lier", "Eik", "Kempen", "Hazel"]);
}

#[test]
fn ranking_an_empty_list_yields_nothing() {
    assert!(rank(Vec::new()).is_empty());
}
