use crm_filter::criteria::{
    CriteriaExpression, CriteriaParseError, Criterion, Operator, apply_criteria, matches_criterion,
};
use serde_json::{Value, json};

fn criterion(field: &str, operator: Operator, value: Value, value2: Option<Value>) -> Criterion {
    Criterion {
        field: field.to_string(),
        operator,
        value,
        value2,
    }
}

#[test]
fn test_expression_rejects_malformed_term() {
    let result = CriteriaExpression::parse("not-a-term");
    assert!(
        result.is_err(),
        "malformed criteria terms should return an error, not be silently ignored"
    );
}

#[test]
fn test_expression_rejects_unknown_operator() {
    let result = CriteriaExpression::parse("name:fuzzy:alice");
    assert!(
        matches!(result, Err(CriteriaParseError::UnknownOperator(_))),
        "unknown operators in the expression syntax are typos, not stored data to preserve"
    );
}

#[test]
fn test_one_bad_record_does_not_abort_the_batch() {
    let records = vec![
        json!({"value": "garbage"}),
        json!({"value": 500}),
        json!("not even an object"),
        json!({"value": 1500}),
    ];

    let crits = CriteriaExpression::parse("value:greater_than:1000")
        .unwrap()
        .criteria;
    let out = apply_criteria(&records, &crits);

    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["value"], json!(1500));
}

#[test]
fn test_not_equals_on_null_field_does_not_match() {
    // Null means "no value", not "a value different from x"
    let record = json!({"status": null});
    let c = criterion("status", Operator::NotEquals, json!("active"), None);
    assert!(!matches_criterion(&record, &c));
}

#[test]
fn test_not_contains_on_missing_field_does_not_match() {
    let record = json!({});
    let c = criterion("notes", Operator::NotContains, json!("urgent"), None);
    assert!(!matches_criterion(&record, &c));
}

#[test]
fn test_numeric_comparison_against_non_numeric_criterion_value() {
    let record = json!({"value": 50});
    let c = criterion("value", Operator::GreaterThan, json!("not a number"), None);
    assert!(
        !matches_criterion(&record, &c),
        "NaN on either side must fail the comparison instead of erroring"
    );
}

#[test]
fn test_between_date_detection_uses_field_name() {
    // "closeDate" mentions Date, so its bounds parse as dates
    let c = criterion(
        "closeDate",
        Operator::Between,
        json!("2024-01-01"),
        Some(json!("2024-12-31")),
    );
    assert!(matches_criterion(&json!({"closeDate": "2024-06-15"}), &c));

    // "value" does not, so date strings become NaN and nothing matches
    let c = criterion(
        "value",
        Operator::Between,
        json!("2024-01-01"),
        Some(json!("2024-12-31")),
    );
    assert!(!matches_criterion(&json!({"value": "2024-06-15"}), &c));
}

#[test]
fn test_rfc3339_timestamps_work_with_date_operators() {
    let record = json!({"createdAt": "2024-06-15T10:30:00Z"});
    let c = criterion("createdAt", Operator::After, json!("2024-06-15"), None);
    assert!(matches_criterion(&record, &c));
}

#[test]
fn test_epoch_millisecond_timestamps_compare_as_dates() {
    // 2024-06-15T00:00:00Z in epoch milliseconds
    let record = json!({"timestamp": 1718409600000_i64});
    let c = criterion("timestamp", Operator::After, json!("2024-01-01"), None);
    assert!(matches_criterion(&record, &c));
}

#[test]
fn test_boolean_fields_match_through_string_coercion() {
    let record = json!({"archived": false});
    let c = criterion("archived", Operator::Equals, json!("false"), None);
    assert!(matches_criterion(&record, &c));
}

#[test]
fn test_deep_paths_short_circuit_instead_of_erroring() {
    let records = vec![
        json!({"contact": {"address": {"city": "Berlin"}}}),
        json!({"contact": {"address": "unstructured"}}),
        json!({"contact": 42}),
        json!({}),
    ];

    let crits = CriteriaExpression::parse("contact.address.city:equals:Berlin")
        .unwrap()
        .criteria;
    let out = apply_criteria(&records, &crits);

    assert_eq!(out.len(), 1);
}

#[test]
fn test_criteria_order_does_not_change_the_result() {
    let records = vec![
        json!({"status": "active", "value": 5000}),
        json!({"status": "prospect", "value": 50000}),
        json!({"status": "active", "value": 100}),
    ];

    let forward = CriteriaExpression::parse("status:equals:active value:greater_than:1000")
        .unwrap()
        .criteria;
    let mut reversed = forward.clone();
    reversed.reverse();

    let a = apply_criteria(&records, &forward);
    let b = apply_criteria(&records, &reversed);

    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
        assert!(std::ptr::eq(*x, *y), "criteria are independent; order must not matter");
    }
}
