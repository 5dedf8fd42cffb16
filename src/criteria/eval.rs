use super::expression::Criterion;
use super::operator::Operator;
use crate::entity::EntityType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use colored::Colorize;
use serde_json::Value;

/// Resolve a dot-separated path against a record.
///
/// Walks segment by segment; a missing key, a null, or a non-container
/// intermediate short-circuits to `None` instead of erroring. Array elements
/// are addressable by numeric segment (`deals.0.value`).
pub fn lookup_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Evaluate a single criterion against a record.
///
/// Never fails: an absent field, an unparseable number, or an invalid date
/// degrades to a non-match so one malformed record cannot abort a batch
/// filter. An unrecognized operator matches everything; see
/// [`print_criteria_warnings`].
pub fn matches_criterion(record: &Value, criterion: &Criterion) -> bool {
    let Some(item) = lookup_path(record, &criterion.field) else {
        return false;
    };
    if item.is_null() {
        return false;
    }

    let value = &criterion.value;

    match &criterion.operator {
        Operator::Contains => text_pair(item, value)
            .map(|(it, val)| it.contains(&val))
            .unwrap_or(false),
        Operator::NotContains => text_pair(item, value)
            .map(|(it, val)| !it.contains(&val))
            .unwrap_or(false),
        Operator::StartsWith => text_pair(item, value)
            .map(|(it, val)| it.starts_with(&val))
            .unwrap_or(false),
        Operator::EndsWith => text_pair(item, value)
            .map(|(it, val)| it.ends_with(&val))
            .unwrap_or(false),
        Operator::Equals => values_equal(item, value),
        Operator::NotEquals => !values_equal(item, value),
        Operator::GreaterThan => value_as_f64(item) > value_as_f64(value),
        Operator::LessThan => value_as_f64(item) < value_as_f64(value),
        Operator::GreaterEqual => value_as_f64(item) >= value_as_f64(value),
        Operator::LessEqual => value_as_f64(item) <= value_as_f64(value),
        Operator::Before => match (value_as_datetime(item), value_as_datetime(value)) {
            (Some(it), Some(val)) => it < val,
            _ => false,
        },
        Operator::After => match (value_as_datetime(item), value_as_datetime(value)) {
            (Some(it), Some(val)) => it > val,
            _ => false,
        },
        Operator::Between => {
            // A missing second bound degrades to non-match, like any other
            // unparseable value
            let value2 = criterion.value2.as_ref();
            if is_date_field(&criterion.field) {
                match (
                    value_as_datetime(item),
                    value_as_datetime(value),
                    value2.and_then(value_as_datetime),
                ) {
                    (Some(it), Some(lo), Some(hi)) => it >= lo && it <= hi,
                    _ => false,
                }
            } else {
                let it = value_as_f64(item);
                let hi = value2.map(value_as_f64).unwrap_or(f64::NAN);
                it >= value_as_f64(value) && it <= hi
            }
        }
        // Preserved fail-open behavior for operators outside the vocabulary.
        Operator::Unrecognized(_) => true,
    }
}

/// Apply an ordered list of criteria to a collection of records.
///
/// Criteria are AND-combined with per-record short-circuiting. An empty
/// criteria list is an identity pass-through, distinct from match-nothing.
/// Input order is preserved and nothing is mutated.
pub fn apply_criteria<'a>(records: &'a [Value], criteria: &[Criterion]) -> Vec<&'a Value> {
    if criteria.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|record| {
            criteria
                .iter()
                .all(|criterion| matches_criterion(record, criterion))
        })
        .collect()
}

/// Print warnings for criteria that will not behave the way their author
/// probably expects: unrecognized operators (which match everything) and
/// fields outside the entity's schema.
pub fn print_criteria_warnings(criteria: &[Criterion], entity: Option<EntityType>) {
    for criterion in criteria {
        if let Operator::Unrecognized(name) = &criterion.operator {
            eprintln!(
                "{} Unrecognized operator '{}' on field '{}' matches every record",
                "Warning:".yellow(),
                name,
                criterion.field
            );
        }

        if let Some(entity) = entity {
            // Dotted paths reach into related records the schema doesn't cover
            if !criterion.field.contains('.') && entity.field(&criterion.field).is_none() {
                eprintln!(
                    "{} Unknown field '{}' for {}. Known fields: {}",
                    "Warning:".yellow(),
                    criterion.field,
                    entity.canonical_name(),
                    entity
                        .fields()
                        .iter()
                        .map(|f| f.ui_name)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
    }
}

/// Ordering for client-side sorts: numeric when both sides parse numeric,
/// otherwise case-insensitive string comparison. Records missing the field
/// sort last.
pub fn compare_by_field(a: &Value, b: &Value, field: &str) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    let a = lookup_path(a, field).filter(|v| !v.is_null());
    let b = lookup_path(b, field).filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let (an, bn) = (value_as_f64(a), value_as_f64(b));
            if !an.is_nan() && !bn.is_nan() {
                return an.partial_cmp(&bn).unwrap_or(Ordering::Equal);
            }
            match (value_as_text(a), value_as_text(b)) {
                (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
                _ => Ordering::Equal,
            }
        }
    }
}

/// Fields compared as dates by `between`: any path mentioning "Date" plus the
/// two known date fields of the CRM schemas.
fn is_date_field(field: &str) -> bool {
    field.contains("Date") || field == "createdAt" || field == "expectedClose"
}

/// String forms of both sides, lowercased for the case-insensitive text
/// operators. `None` when either side has no string form.
fn text_pair(item: &Value, value: &Value) -> Option<(String, String)> {
    Some((
        value_as_text(item)?.to_lowercase(),
        value_as_text(value)?.to_lowercase(),
    ))
}

/// Exact match, or string-form match so `5` equals `"5"` across the
/// loosely-typed record/criterion boundary.
fn values_equal(item: &Value, value: &Value) -> bool {
    if item == value {
        return true;
    }
    match (value_as_text(item), value_as_text(value)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// String form of a scalar value, as JavaScript's String() would print it.
/// Nulls have none; containers fall back to compact JSON.
fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => serde_json::to_string(other).ok(),
    }
}

/// Numeric form of a value; anything unparseable becomes NaN, which fails
/// every comparison.
fn value_as_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Date form of a value. Strings are tried as RFC 3339, date-only, and
/// space-separated date-time; numbers are epoch milliseconds.
fn value_as_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_datetime_str(s),
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        _ => None,
    }
}

fn parse_datetime_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn criterion(field: &str, operator: Operator, value: Value) -> Criterion {
        Criterion {
            field: field.to_string(),
            operator,
            value,
            value2: None,
        }
    }

    #[test]
    fn test_lookup_path_top_level() {
        let record = json!({"name": "Alice"});
        assert_eq!(lookup_path(&record, "name"), Some(&json!("Alice")));
        assert_eq!(lookup_path(&record, "missing"), None);
    }

    #[test]
    fn test_lookup_path_nested() {
        let record = json!({"contact": {"name": "Alice", "address": {"city": "Berlin"}}});
        assert_eq!(lookup_path(&record, "contact.name"), Some(&json!("Alice")));
        assert_eq!(
            lookup_path(&record, "contact.address.city"),
            Some(&json!("Berlin"))
        );
    }

    #[test]
    fn test_lookup_path_short_circuits_on_missing_segment() {
        let record = json!({"contact": null});
        assert_eq!(lookup_path(&record, "contact.name"), None);

        let record = json!({"contact": "not-an-object"});
        assert_eq!(lookup_path(&record, "contact.name"), None);
    }

    #[test]
    fn test_lookup_path_array_index() {
        let record = json!({"deals": [{"value": 100}, {"value": 200}]});
        assert_eq!(lookup_path(&record, "deals.1.value"), Some(&json!(200)));
        assert_eq!(lookup_path(&record, "deals.5.value"), None);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let record = json!({"name": "Acme"});
        assert!(matches_criterion(
            &record,
            &criterion("name", Operator::Contains, json!("ACME"))
        ));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let record = json!({});
        for op in super::super::operator::ALL_OPERATORS {
            assert!(
                !matches_criterion(&record, &criterion("name", op.clone(), json!("x"))),
                "operator {} matched a missing field",
                op
            );
        }
    }

    #[test]
    fn test_null_field_never_matches() {
        let record = json!({"name": null});
        assert!(!matches_criterion(
            &record,
            &criterion("name", Operator::Equals, json!("x"))
        ));
        assert!(!matches_criterion(
            &record,
            &criterion("name", Operator::NotEquals, json!("x"))
        ));
    }

    #[test]
    fn test_equals_coerces_number_to_string_form() {
        let record = json!({"score": 5});
        assert!(matches_criterion(
            &record,
            &criterion("score", Operator::Equals, json!("5"))
        ));
    }

    #[test]
    fn test_equals_is_exact_case() {
        let record = json!({"status": "Active"});
        assert!(!matches_criterion(
            &record,
            &criterion("status", Operator::Equals, json!("active"))
        ));
        assert!(matches_criterion(
            &record,
            &criterion("status", Operator::Equals, json!("Active"))
        ));
    }

    #[test]
    fn test_numeric_comparisons_parse_strings() {
        let record = json!({"value": "1500"});
        assert!(matches_criterion(
            &record,
            &criterion("value", Operator::GreaterThan, json!(1000))
        ));
        assert!(!matches_criterion(
            &record,
            &criterion("value", Operator::LessThan, json!(1000))
        ));
    }

    #[test]
    fn test_non_numeric_values_fail_numeric_comparisons() {
        let record = json!({"value": "n/a"});
        for op in [
            Operator::GreaterThan,
            Operator::LessThan,
            Operator::GreaterEqual,
            Operator::LessEqual,
        ] {
            assert!(!matches_criterion(
                &record,
                &criterion("value", op, json!(10))
            ));
        }
    }

    #[test]
    fn test_before_and_after() {
        let record = json!({"createdAt": "2024-06-15"});
        assert!(matches_criterion(
            &record,
            &criterion("createdAt", Operator::Before, json!("2024-07-01"))
        ));
        assert!(matches_criterion(
            &record,
            &criterion("createdAt", Operator::After, json!("2024-01-01"))
        ));
        assert!(!matches_criterion(
            &record,
            &criterion("createdAt", Operator::After, json!("2024-06-15"))
        ));
    }

    #[test]
    fn test_invalid_dates_fail_date_comparisons() {
        let record = json!({"createdAt": "not a date"});
        assert!(!matches_criterion(
            &record,
            &criterion("createdAt", Operator::Before, json!("2024-07-01"))
        ));
    }

    #[test]
    fn test_between_numeric() {
        let record = json!({"value": 50});
        let mut c = criterion("value", Operator::Between, json!(10));
        c.value2 = Some(json!(100));
        assert!(matches_criterion(&record, &c));

        let record = json!({"value": 5});
        assert!(!matches_criterion(&record, &c));
    }

    #[test]
    fn test_between_is_inclusive_on_both_bounds() {
        let mut c = criterion("value", Operator::Between, json!(10));
        c.value2 = Some(json!(100));
        assert!(matches_criterion(&json!({"value": 10}), &c));
        assert!(matches_criterion(&json!({"value": 100}), &c));
    }

    #[test]
    fn test_between_on_date_field_compares_as_dates() {
        let mut c = criterion("createdAt", Operator::Between, json!("2024-01-01"));
        c.value2 = Some(json!("2024-12-31"));
        assert!(matches_criterion(&json!({"createdAt": "2024-06-15"}), &c));
        assert!(!matches_criterion(&json!({"createdAt": "2025-01-02"}), &c));
    }

    #[test]
    fn test_between_missing_second_bound_never_matches() {
        let c = criterion("value", Operator::Between, json!(10));
        assert!(!matches_criterion(&json!({"value": 50}), &c));
    }

    #[test]
    fn test_unrecognized_operator_fails_open() {
        let record = json!({"name": "Alice"});
        let c = criterion(
            "name",
            Operator::Unrecognized("fuzzy".to_string()),
            json!("zzz"),
        );
        assert!(matches_criterion(&record, &c));
    }

    #[test]
    fn test_apply_with_no_criteria_is_identity() {
        let records = vec![json!({"a": 1}), json!({"a": 2})];
        let out = apply_criteria(&records, &[]);
        assert_eq!(out.len(), 2);
        assert!(std::ptr::eq(out[0], &records[0]));
    }

    #[test]
    fn test_apply_preserves_input_order() {
        let records = vec![
            json!({"name": "Carol", "status": "active"}),
            json!({"name": "Alice", "status": "active"}),
            json!({"name": "Bob", "status": "prospect"}),
        ];
        let c = criterion("status", Operator::Equals, json!("active"));
        let out = apply_criteria(&records, std::slice::from_ref(&c));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["name"], json!("Carol"));
        assert_eq!(out[1]["name"], json!("Alice"));
    }
}
