//! Tests for the choice and value recognizer

use dialog_runtime::{
    find_choices, find_values, recognize_choices, Choice, FindChoicesOptions, FindValuesOptions,
    FoundChoice, FoundValue, ModelResult, RecognizeChoicesOptions, SortedValue,
};

fn assert_result<T>(result: &ModelResult<T>, start: usize, end: usize, text: &str) {
    assert_eq!(result.start, start, "invalid start for '{text}'");
    assert_eq!(result.end, end, "invalid end for '{text}'");
    assert_eq!(result.text, text, "invalid text for '{text}'");
}

fn assert_value(result: &ModelResult<FoundValue>, value: &str, index: usize, score: f64) {
    assert_eq!(result.type_name, "value");
    assert_eq!(result.resolution.value, value);
    assert_eq!(result.resolution.index, index);
    assert!(
        (result.resolution.score - score).abs() < f64::EPSILON,
        "invalid score {} for '{value}'",
        result.resolution.score
    );
}

fn assert_choice(
    result: &ModelResult<FoundChoice>,
    value: &str,
    index: usize,
    score: f64,
    synonym: Option<&str>,
) {
    assert_eq!(result.type_name, "choice");
    assert_eq!(result.resolution.value, value);
    assert_eq!(result.resolution.index, index);
    assert!(
        (result.resolution.score - score).abs() < f64::EPSILON,
        "invalid score {} for '{value}'",
        result.resolution.score
    );
    if let Some(synonym) = synonym {
        assert_eq!(result.resolution.synonym.as_deref(), Some(synonym));
    }
}

fn color_values() -> Vec<SortedValue> {
    vec![
        SortedValue::new("red", 0),
        SortedValue::new("green", 1),
        SortedValue::new("blue", 2),
    ]
}

fn overlapping_values() -> Vec<SortedValue> {
    vec![
        SortedValue::new("bread", 0),
        SortedValue::new("bread pudding", 1),
        SortedValue::new("pudding", 2),
    ]
}

fn color_choices() -> Vec<Choice> {
    vec![
        Choice::new("red"),
        Choice::new("green"),
        Choice::new("blue"),
    ]
}

#[test]
fn finds_a_simple_value_in_a_single_word_utterance() {
    let found = find_values("red", &color_values(), &FindValuesOptions::default());
    assert_eq!(found.len(), 1);
    assert_result(&found[0], 0, 2, "red");
    assert_value(&found[0], "red", 0, 1.0);
}

#[test]
fn finds_a_simple_value_in_an_utterance() {
    let found = find_values(
        "the red one please.",
        &color_values(),
        &FindValuesOptions::default(),
    );
    assert_eq!(found.len(), 1);
    assert_result(&found[0], 4, 6, "red");
    assert_value(&found[0], "red", 0, 1.0);
}

#[test]
fn finds_multiple_values_within_an_utterance() {
    let found = find_values(
        "the red and blue ones please.",
        &color_values(),
        &FindValuesOptions::default(),
    );
    assert_eq!(found.len(), 2);
    assert_result(&found[0], 4, 6, "red");
    assert_value(&found[0], "red", 0, 1.0);
    assert_value(&found[1], "blue", 2, 1.0);
}

#[test]
fn finds_multiple_values_that_overlap() {
    let found = find_values(
        "the bread pudding and bread please.",
        &overlapping_values(),
        &FindValuesOptions::default(),
    );
    assert_eq!(found.len(), 2);
    assert_result(&found[0], 4, 16, "bread pudding");
    assert_value(&found[0], "bread pudding", 1, 1.0);
    assert_value(&found[1], "bread", 0, 1.0);
}

#[test]
fn disambiguates_between_very_similar_values() {
    let similar = vec![
        SortedValue::new("option A", 0),
        SortedValue::new("option B", 1),
        SortedValue::new("option C", 2),
    ];
    let options = FindValuesOptions {
        allow_partial_matches: true,
        ..FindValuesOptions::default()
    };
    let found = find_values("option B", &similar, &options);
    assert_eq!(found.len(), 1);
    assert_value(&found[0], "option B", 1, 1.0);
}

#[test]
fn prefers_an_exact_match() {
    let special = vec![
        SortedValue::new("A < B", 0),
        SortedValue::new("A >= B", 1),
        SortedValue::new("A ??? B", 2),
    ];
    let found = find_values("A >= B", &special, &FindValuesOptions::default());
    assert_eq!(found.len(), 1);
    assert_value(&found[0], "A >= B", 1, 1.0);
}

#[test]
fn empty_input_yields_no_results() {
    assert!(find_values("", &color_values(), &FindValuesOptions::default()).is_empty());
    assert!(find_values("   ", &color_values(), &FindValuesOptions::default()).is_empty());
    assert!(find_values("red", &[], &FindValuesOptions::default()).is_empty());
}

#[test]
fn finds_a_single_choice_in_an_utterance() {
    let found = find_choices(
        "the red one please.",
        &color_choices(),
        &FindChoicesOptions::default(),
    );
    assert_eq!(found.len(), 1);
    assert_result(&found[0], 4, 6, "red");
    assert_choice(&found[0], "red", 0, 1.0, Some("red"));
}

#[test]
fn finds_multiple_choices_within_an_utterance() {
    let found = find_choices(
        "the red and blue ones please.",
        &color_choices(),
        &FindChoicesOptions::default(),
    );
    assert_eq!(found.len(), 2);
    assert_result(&found[0], 4, 6, "red");
    assert_choice(&found[0], "red", 0, 1.0, None);
    assert_choice(&found[1], "blue", 2, 1.0, None);
}

#[test]
fn finds_multiple_choices_that_overlap() {
    let overlapping = vec![
        Choice::new("bread"),
        Choice::new("bread pudding"),
        Choice::new("pudding"),
    ];
    let found = find_choices(
        "the bread pudding and bread please.",
        &overlapping,
        &FindChoicesOptions::default(),
    );
    assert_eq!(found.len(), 2);
    assert_result(&found[0], 4, 16, "bread pudding");
    assert_choice(&found[0], "bread pudding", 1, 1.0, None);
    assert_choice(&found[1], "bread", 0, 1.0, None);
}

#[test]
fn finds_a_choice_through_a_synonym() {
    let choices = vec![
        Choice::new("red").with_synonyms(["crimson", "scarlet"]),
        Choice::new("green"),
    ];
    let found = find_choices(
        "I'd take the scarlet one",
        &choices,
        &FindChoicesOptions::default(),
    );
    assert_eq!(found.len(), 1);
    assert_choice(&found[0], "red", 0, 1.0, Some("scarlet"));
}

#[test]
fn recognizes_a_choice_by_name() {
    let found = recognize_choices(
        "the red one please.",
        &color_choices(),
        &RecognizeChoicesOptions::default(),
    );
    assert_eq!(found.len(), 1);
    assert_result(&found[0], 4, 6, "red");
    assert_choice(&found[0], "red", 0, 1.0, Some("red"));
}

#[test]
fn recognizes_a_choice_by_ordinal_position() {
    let found = recognize_choices(
        "the first one please.",
        &color_choices(),
        &RecognizeChoicesOptions::default(),
    );
    assert_eq!(found.len(), 1);
    assert_choice(&found[0], "red", 0, 1.0, None);
}

#[test]
fn recognizes_the_last_choice() {
    let found = recognize_choices(
        "the last one",
        &color_choices(),
        &RecognizeChoicesOptions::default(),
    );
    assert_eq!(found.len(), 1);
    assert_choice(&found[0], "blue", 2, 1.0, None);
}

#[test]
fn recognizes_a_choice_by_numeric_position() {
    let found = recognize_choices("2", &color_choices(), &RecognizeChoicesOptions::default());
    assert_eq!(found.len(), 1);
    assert_choice(&found[0], "green", 1, 1.0, None);
}

#[test]
fn ignores_out_of_range_positions() {
    let found = recognize_choices("7", &color_choices(), &RecognizeChoicesOptions::default());
    assert!(found.is_empty());
}

#[test]
fn does_not_recognize_ordinals_when_disabled() {
    let options = RecognizeChoicesOptions {
        recognize_ordinals: false,
        ..RecognizeChoicesOptions::default()
    };
    let found = recognize_choices("first", &color_choices(), &options);
    assert!(found.is_empty());
}

#[test]
fn does_not_recognize_numbers_when_disabled() {
    let options = RecognizeChoicesOptions {
        recognize_numbers: false,
        ..RecognizeChoicesOptions::default()
    };
    let found = recognize_choices("1", &color_choices(), &options);
    assert!(found.is_empty());
}

#[test]
fn only_matches_lexically_when_both_positional_modes_are_disabled() {
    let options = RecognizeChoicesOptions {
        recognize_numbers: false,
        recognize_ordinals: false,
        ..RecognizeChoicesOptions::default()
    };
    let found = recognize_choices("the first and third one please.", &color_choices(), &options);
    assert!(found.is_empty());
}
