use deepflow::planner::keyword::{KeywordIntentSource, ObjectiveEntry};
use deepflow::planner::{IntentExtractionError, IntentSource};

#[test]
fn keyword_module_builds_main_goal_from_request_text() {
    let source = KeywordIntentSource::default();
    let intent = source
        .extract_intent("  Book flight and hotel ", 1_700_000_000)
        .expect("intent");
    assert_eq!(intent.raw_text, "Book flight and hotel");
    assert_eq!(intent.main_goal.objective, "Book flight and hotel");
    assert!(intent.main_goal.dependencies.is_empty());
    assert!(intent.id.as_str().starts_with("intent-"));
}

#[test]
fn keyword_module_chains_matched_objectives_in_catalog_order() {
    let source = KeywordIntentSource::default();
    let intent = source
        .extract_intent("Book flight and hotel", 1_700_000_000)
        .expect("intent");

    let objectives: Vec<&str> = intent
        .sub_goals
        .iter()
        .map(|goal| goal.objective.as_str())
        .collect();
    assert_eq!(objectives, vec!["Book flight", "Book hotel"]);

    assert!(intent.sub_goals[0].dependencies.is_empty());
    assert_eq!(
        intent.sub_goals[1].dependencies,
        vec![intent.sub_goals[0].id.clone()]
    );
}

#[test]
fn keyword_module_matches_exact_tokens_only() {
    let source = KeywordIntentSource::default();
    // "flights" is a catalog keyword, "flightless" is not a token match.
    let matched = source
        .extract_intent("compare flights", 1_700_000_000)
        .expect("intent");
    assert_eq!(matched.sub_goals.len(), 1);
    assert_eq!(matched.sub_goals[0].objective, "Book flight");

    let unmatched = source
        .extract_intent("study flightless birds", 1_700_000_000)
        .expect("intent");
    assert!(unmatched.sub_goals.is_empty());
}

#[test]
fn keyword_module_unmatched_text_still_yields_single_goal_intent() {
    let source = KeywordIntentSource::default();
    let intent = source
        .extract_intent("water the plants", 1_700_000_000)
        .expect("intent");
    assert!(intent.sub_goals.is_empty());
    assert_eq!(intent.main_goal.objective, "water the plants");
}

#[test]
fn keyword_module_blank_input_is_an_extraction_error() {
    let source = KeywordIntentSource::default();
    let err = source
        .extract_intent("   ", 1_700_000_000)
        .expect_err("blank input rejected");
    assert_eq!(err, IntentExtractionError::EmptyInput);
}

#[test]
fn keyword_module_custom_catalog_drives_matching() {
    let source = KeywordIntentSource::new(vec![ObjectiveEntry::new(
        "deploy",
        &["deploy", "ship"],
        "Deploy the service",
    )
    .expect("entry")]);
    let intent = source
        .extract_intent("ship it to production", 1_700_000_000)
        .expect("intent");
    assert_eq!(intent.sub_goals.len(), 1);
    assert_eq!(intent.sub_goals[0].objective, "Deploy the service");
    assert_eq!(intent.sub_goals[0].id.as_str(), "goal-deploy");
}

#[test]
fn keyword_module_entry_requires_keywords() {
    let err = ObjectiveEntry::new("empty", &[], "Nothing").expect_err("no keywords rejected");
    assert!(err.contains("at least one keyword"));
}
