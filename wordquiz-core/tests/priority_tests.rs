use wordquiz_core::{
    calculate_priority, category_of, is_stale, sort_by_priority, wordbook_hash, AttemptRecord,
    GradeValue, PriorityCategory, ProgressStore, Word, WordProgress, MS_PER_DAY,
};

fn history(grades: &[GradeValue]) -> Vec<AttemptRecord> {
    grades
        .iter()
        .enumerate()
        .map(|(i, g)| AttemptRecord {
            timestamp: i as i64 * 1_000,
            grade: *g,
        })
        .collect()
}

#[test]
fn empty_history_scores_as_new() {
    assert_eq!(calculate_priority(&[]), 1.0);
}

#[test]
fn priority_stays_in_bounds() {
    use GradeValue::*;
    let cases: Vec<Vec<GradeValue>> = vec![
        vec![Hard; 10],
        vec![Easy; 10],
        vec![Again, Hard, Again, Hard],
        vec![Easy, Normal, Hard, Again, Easy],
        vec![Unknown],
        vec![Unknown, Unknown, Easy],
    ];
    for grades in cases {
        let p = calculate_priority(&history(&grades));
        assert!((0.1..=1.5).contains(&p), "priority {p} out of bounds");
    }
}

#[test]
fn most_recent_grade_dominates() {
    // identical except for the newest entry
    let ends_hard = history(&[GradeValue::Normal, GradeValue::Hard]);
    let ends_easy = history(&[GradeValue::Normal, GradeValue::Easy]);
    assert!(calculate_priority(&ends_hard) > calculate_priority(&ends_easy));

    // the tail still matters, but cannot outweigh the newest grade
    let hard_then_easy = history(&[GradeValue::Hard, GradeValue::Easy]);
    let easy_then_hard = history(&[GradeValue::Easy, GradeValue::Hard]);
    assert!(calculate_priority(&easy_then_hard) > calculate_priority(&hard_then_easy));
}

#[test]
fn single_grades_land_in_their_bands() {
    let p = calculate_priority(&history(&[GradeValue::Hard]));
    assert_eq!(category_of(p), PriorityCategory::Hard);
    let p = calculate_priority(&history(&[GradeValue::Again]));
    assert_eq!(category_of(p), PriorityCategory::Again);
    let p = calculate_priority(&history(&[GradeValue::Normal]));
    assert_eq!(category_of(p), PriorityCategory::Normal);
    let p = calculate_priority(&history(&[GradeValue::Easy]));
    assert_eq!(category_of(p), PriorityCategory::Easy);
}

#[test]
fn category_boundaries() {
    assert_eq!(category_of(0.49), PriorityCategory::Easy);
    assert_eq!(category_of(0.5), PriorityCategory::Normal);
    assert_eq!(category_of(0.99), PriorityCategory::Normal);
    assert_eq!(category_of(1.0), PriorityCategory::Again);
    assert_eq!(category_of(1.19), PriorityCategory::Again);
    assert_eq!(category_of(1.2), PriorityCategory::Hard);
}

#[test]
fn unrecognized_grades_load_as_unknown_and_weigh_zero() {
    let rec: AttemptRecord =
        serde_json::from_str(r#"{"timestamp":0,"grade":"banana"}"#).unwrap();
    assert_eq!(rec.grade, GradeValue::Unknown);

    // an unknown-only history collapses to the lower clamp
    assert_eq!(calculate_priority(&[rec]), 0.1);

    // a known newest grade is untouched by an unknown tail
    let mixed = history(&[GradeValue::Unknown, GradeValue::Hard]);
    let p = calculate_priority(&mixed);
    assert!((p - 1.0).abs() < 1e-6, "got {p}");
}

#[test]
fn staleness_requires_history_and_age() {
    let now = 1_700_000_000_000;

    let mut old = WordProgress::default();
    old.history.push(AttemptRecord {
        timestamp: now - 40 * MS_PER_DAY,
        grade: GradeValue::Easy,
    });
    assert!(is_stale(&old, now, 30));

    let mut recent = WordProgress::default();
    recent.history.push(AttemptRecord {
        timestamp: now - 10 * MS_PER_DAY,
        grade: GradeValue::Easy,
    });
    assert!(!is_stale(&recent, now, 30));

    assert!(!is_stale(&WordProgress::default(), now, 30));
}

#[test]
fn priority_sort_is_stable_for_ties() {
    let a = Word::new("a", "1");
    let b = Word::new("b", "2");
    let c = Word::new("c", "3");

    let mut store = ProgressStore::new();
    store.ensure("c").history.push(AttemptRecord {
        timestamp: 0,
        grade: GradeValue::Hard,
    });

    let sorted = sort_by_priority(&[a.clone(), b.clone(), c.clone()], &store);
    assert_eq!(sorted[0].question, "c");
    // a and b both score 1.0 and keep their input order
    assert_eq!(sorted[1].question, "a");
    assert_eq!(sorted[2].question, "b");
}

#[test]
fn wordbook_hash_matches_the_rolling_hash() {
    assert_eq!(wordbook_hash(&[]), "0");
    // h("abc") = ((0*31+97)*31+98)*31+99 = 96354
    assert_eq!(wordbook_hash(&[Word::new("ab", "c")]), "96354");
    // order-sensitive
    assert_ne!(
        wordbook_hash(&[Word::new("ab", "c"), Word::new("d", "e")]),
        wordbook_hash(&[Word::new("d", "e"), Word::new("ab", "c")])
    );
}
