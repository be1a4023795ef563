//! Behavioural properties shared with the generated TypeScript helpers.

use evalrow_model::{
    EvaluateResult, EvaluationRow, Message, Metadata, is_evaluation_row, validate_evaluation_row,
};
use serde_json::{Value, json};

fn fixtures() -> Vec<Value> {
    vec![
        json!({ "messages": [{ "role": "user", "content": "hi" }] }),
        json!({ "messages": [] }),
        json!({ "messages": [{ "content": "no role" }] }),
        json!({ "messages": [{ "role": 7 }, { "role": "assistant" }] }),
        json!({ "messages": "not a list" }),
        json!({ "ground_truth": "4" }),
        json!({ "messages": [null] }),
        json!([]),
        json!(null),
        json!("row"),
    ]
}

#[test]
fn deep_valid_implies_shallow_valid() {
    for value in fixtures() {
        if validate_evaluation_row(&value).valid {
            assert!(is_evaluation_row(&value), "{value}");
        }
    }
}

#[test]
fn valid_iff_no_errors() {
    for value in fixtures() {
        let outcome = validate_evaluation_row(&value);
        assert_eq!(outcome.valid, outcome.errors.is_empty(), "{value}");
    }
}

#[test]
fn every_defect_is_reported() {
    let outcome = validate_evaluation_row(&json!({
        "messages": [{ "role": 7 }, {}, { "role": "user" }]
    }));
    assert_eq!(
        outcome.errors,
        vec![
            "messages[0].role: must be a string".to_string(),
            "messages[1].role: must be a string".to_string(),
        ]
    );
}

#[test]
fn serialized_rows_validate() {
    let row = EvaluationRow::new(vec![Message::system("be brief"), Message::user("2+2?")])
        .with_ground_truth("4")
        .with_evaluation_result(EvaluateResult::new(1.0).with_reason("correct"));
    let value = serde_json::to_value(&row).unwrap();
    assert!(is_evaluation_row(&value));
    assert!(validate_evaluation_row(&value).valid);

    let back: EvaluationRow = serde_json::from_value(value).unwrap();
    assert_eq!(back, row);
}

// Metadata lookup follows `row.input_metadata?.[key] ?? defaultValue`:
// a stored `null` is treated like a missing key.

fn row_with_metadata(metadata: Value) -> EvaluationRow {
    let metadata: Metadata = serde_json::from_value(metadata).unwrap();
    EvaluationRow::new(vec![Message::user("go")]).with_input_metadata(metadata)
}

#[test]
fn null_metadata_value_falls_back() {
    let row = row_with_metadata(json!({ "k": null }));
    assert_eq!(row.input_metadata_or("k", &json!("x")), &json!("x"));
    assert_eq!(row.input_metadata("k"), None);
}

#[test]
fn falsy_metadata_values_are_kept() {
    let row = row_with_metadata(json!({ "zero": 0, "empty": "", "no": false }));
    let fallback = json!("x");
    assert_eq!(row.input_metadata_or("zero", &fallback), &json!(0));
    assert_eq!(row.input_metadata_or("empty", &fallback), &json!(""));
    assert_eq!(row.input_metadata_or("no", &fallback), &json!(false));
}

#[test]
fn absent_metadata_bag_falls_back() {
    let row = EvaluationRow::new(vec![Message::user("go")]);
    assert_eq!(row.input_metadata("k"), None);
    assert_eq!(row.input_metadata_or("k", &json!(1)), &json!(1));
}
