use partsxref::graph::fuzzy::{similarity, FuzzyMatcher};
use partsxref::graph::Snapshot;
use partsxref::types::{PartRecord, RelevanceGroup};

fn part_only(part: &str) -> PartRecord {
    PartRecord {
        part_number: Some(part.to_string()),
        ..PartRecord::default()
    }
}

fn snapshot_of(parts: &[&str]) -> Snapshot {
    Snapshot::build(parts.iter().map(|p| part_only(p)).collect())
}

#[test]
fn test_exact_ranks_before_partial() {
    let snapshot = snapshot_of(&["AB1000", "AB100"]);
    let matches = FuzzyMatcher::default().rank(&snapshot, "AB100");
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].identifier, "AB100");
    assert_eq!(matches[0].group, RelevanceGroup::Exact);
    assert_eq!(matches[1].identifier, "AB1000");
    assert_eq!(matches[1].group, RelevanceGroup::Partial);
}

#[test]
fn test_input_containing_identifier_is_partial() {
    let snapshot = snapshot_of(&["AB10"]);
    let matches = FuzzyMatcher::default().rank(&snapshot, "XAB10Y");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].group, RelevanceGroup::Partial);
}

#[test]
fn test_similar_identifier_is_fuzzy() {
    let snapshot = snapshot_of(&["ABC1234", "ZZZZZZ"]);
    let input = "ABC1243";
    assert!(similarity("ABC1234", input) > 0.25);
    let matches = FuzzyMatcher::default().rank(&snapshot, input);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].identifier, "ABC1234");
    assert_eq!(matches[0].group, RelevanceGroup::Fuzzy);
}

#[test]
fn test_threshold_excludes_dissimilar() {
    let snapshot = snapshot_of(&["ABC1234"]);
    let strict = FuzzyMatcher::new(0.99, 500);
    assert!(strict.rank(&snapshot, "ABC1243").is_empty());
}

#[test]
fn test_groups_are_monotonic_and_scores_descend_within_group() {
    let snapshot = snapshot_of(&[
        "QX5000", "QX500", "QX5001", "QX50", "QX5X00", "QX500A", "Q5000", "QX5",
    ]);
    let matches = FuzzyMatcher::default().rank(&snapshot, "QX500");
    assert!(!matches.is_empty());
    assert_eq!(matches[0].group, RelevanceGroup::Exact);
    for pair in matches.windows(2) {
        assert!(pair[0].group <= pair[1].group, "{:?}", matches);
        if pair[0].group == pair[1].group {
            assert!(pair[0].similarity >= pair[1].similarity, "{:?}", matches);
        }
    }
}

#[test]
fn test_ties_keep_encounter_order() {
    // Both contain the input and share the same trigram overlap with it.
    let snapshot = snapshot_of(&["K77Z", "K77Y"]);
    let matches = FuzzyMatcher::default().rank(&snapshot, "K77");
    let ids: Vec<&str> = matches.iter().map(|m| m.identifier.as_str()).collect();
    assert_eq!(ids, vec!["K77Z", "K77Y"]);
}

#[test]
fn test_cap_drops_lowest_ranked() {
    let parts: Vec<String> = (0..20).map(|i| format!("M{i:02}X")).collect();
    let mut refs: Vec<&str> = parts.iter().map(String::as_str).collect();
    refs.push("M05");
    let snapshot = snapshot_of(&refs);

    let full = FuzzyMatcher::new(0.25, 500).rank(&snapshot, "M05");
    let capped = FuzzyMatcher::new(0.25, 3).rank(&snapshot, "M05");

    assert_eq!(capped.len(), 3);
    assert_eq!(capped[..], full[..3]);
    assert_eq!(capped[0].identifier, "M05");
}

#[test]
fn test_empty_input_matches_nothing() {
    let snapshot = snapshot_of(&["A"]);
    assert!(FuzzyMatcher::default().rank(&snapshot, "").is_empty());
}
