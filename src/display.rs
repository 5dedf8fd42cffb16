use crate::criteria::{ALL_OPERATORS, Criterion, Operator};
use crate::entity::{EntityType, FieldKind};
use crate::store::SavedFilter;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use regex::Regex;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}([T ]\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})?)?$")
        .expect("valid iso date regex")
});

const MAX_TABLE_COLUMNS: usize = 8;
const MAX_CELL_WIDTH: usize = 40;

/// Create a table with the shared styling used across all commands
pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

/// Render filtered records as a table. Columns come from the entity schema
/// when known, otherwise from the union of record keys.
pub fn render_records_table(records: &[&Value], entity: Option<EntityType>) -> String {
    let columns: Vec<String> = match entity {
        Some(entity) => entity.fields().iter().map(|f| f.ui_name.to_string()).collect(),
        None => {
            let mut keys: Vec<String> = records
                .iter()
                .filter_map(|record| record.as_object())
                .flat_map(|map| map.keys().cloned())
                .collect::<std::collections::BTreeSet<_>>()
                .into_iter()
                .collect();
            keys.truncate(MAX_TABLE_COLUMNS);
            keys
        }
    };

    if columns.is_empty() {
        return "No displayable fields.\n".to_string();
    }

    let headers: Vec<&str> = columns.iter().map(String::as_str).collect();
    let mut table = create_styled_table(&headers);
    for record in records {
        table.add_row(
            columns
                .iter()
                .map(|column| Cell::new(format_cell(record.get(column))))
                .collect::<Vec<_>>(),
        );
    }

    format!("{table}\n")
}

/// Render saved filters as a table
pub fn render_filters_table(filters: &[SavedFilter]) -> String {
    let mut table = create_styled_table(&["ID", "Name", "Entity", "Criteria", "Updated"]);
    for filter in filters {
        table.add_row(vec![
            Cell::new(filter.id),
            Cell::new(&filter.name),
            Cell::new(filter.entity_type.canonical_name()),
            Cell::new(describe_criteria(&filter.criteria)),
            Cell::new(filter.updated_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }
    format!("{table}\n")
}

/// Render the operator vocabulary, the surface criterion builders work from
pub fn render_operator_table() -> String {
    let mut table = create_styled_table(&["Operator", "Applies to", "Values", "Description"]);
    for operator in &ALL_OPERATORS {
        let kinds: Vec<&str> = [FieldKind::Text, FieldKind::Number, FieldKind::Date]
            .iter()
            .filter(|kind| Operator::for_kind(**kind).contains(operator))
            .map(|kind| kind.label())
            .collect();

        table.add_row(vec![
            Cell::new(operator.canonical_name()),
            Cell::new(kinds.join(", ")),
            Cell::new(if operator.takes_second_value() { "2" } else { "1" }),
            Cell::new(operator.description()),
        ]);
    }
    format!("{table}\n")
}

/// Render per-field coverage for a records file: how often each field is
/// present and what kind of values it holds.
pub fn render_field_coverage(records: &[Value], entity: Option<EntityType>) -> String {
    #[derive(Default)]
    struct Coverage {
        present: usize,
        numbers: usize,
        dates: usize,
        sample: Option<String>,
    }

    let mut coverage: BTreeMap<String, Coverage> = BTreeMap::new();
    for record in records {
        let Some(map) = record.as_object() else {
            continue;
        };
        for (key, value) in map {
            if value.is_null() {
                continue;
            }
            let entry = coverage.entry(key.clone()).or_default();
            entry.present += 1;
            match value {
                Value::Number(_) => entry.numbers += 1,
                Value::String(s) if ISO_DATE_RE.is_match(s) => entry.dates += 1,
                _ => {}
            }
            if entry.sample.is_none() {
                entry.sample = Some(format_cell(Some(value)));
            }
        }
    }

    let mut table = create_styled_table(&["Field", "Present", "Kind", "Sample"]);
    for (field, cov) in &coverage {
        let kind = entity
            .and_then(|entity| entity.field(field))
            .map(|def| def.kind.label().to_string())
            .unwrap_or_else(|| guess_kind(cov.present, cov.numbers, cov.dates).to_string());

        table.add_row(vec![
            Cell::new(field),
            Cell::new(format!("{}/{}", cov.present, records.len())),
            Cell::new(kind),
            Cell::new(cov.sample.clone().unwrap_or_default()),
        ]);
    }
    format!("{table}\n")
}

/// JSON output for the apply command: summary plus the matching records
pub fn generate_apply_json(records: &[&Value], total: usize, criteria: &[Criterion]) -> String {
    serde_json::to_string_pretty(&json!({
        "summary": {
            "total": total,
            "matched": records.len(),
            "criteria": criteria,
        },
        "records": records,
    }))
    .unwrap_or_else(|_| "{\"error\":\"failed to serialize apply output\"}".into())
}

/// One-line human description of a criteria list
pub fn describe_criteria(criteria: &[Criterion]) -> String {
    if criteria.is_empty() {
        return "(all records)".to_string();
    }
    criteria
        .iter()
        .map(describe_criterion)
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn describe_criterion(criterion: &Criterion) -> String {
    match &criterion.value2 {
        Some(value2) => format!(
            "{} {} {}..{}",
            criterion.field,
            criterion.operator,
            format_scalar(&criterion.value),
            format_scalar(value2)
        ),
        None => format!(
            "{} {} {}",
            criterion.field,
            criterion.operator,
            format_scalar(&criterion.value)
        ),
    }
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_cell(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| format_scalar(item))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    };
    truncate_string(&text, MAX_CELL_WIDTH)
}

fn guess_kind(present: usize, numbers: usize, dates: usize) -> &'static str {
    if present > 0 && numbers == present {
        "number"
    } else if present > 0 && dates == present {
        "date"
    } else {
        "text"
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_criteria() {
        let criteria = vec![
            Criterion::parse("status:equals:active").unwrap(),
            Criterion::parse("value:between:10:100").unwrap(),
        ];
        assert_eq!(
            describe_criteria(&criteria),
            "status equals active AND value between 10..100"
        );
        assert_eq!(describe_criteria(&[]), "(all records)");
    }

    #[test]
    fn test_iso_date_detection() {
        assert!(ISO_DATE_RE.is_match("2024-06-15"));
        assert!(ISO_DATE_RE.is_match("2024-06-15T10:30:00Z"));
        assert!(ISO_DATE_RE.is_match("2024-06-15 10:30:00"));
        assert!(!ISO_DATE_RE.is_match("15 June 2024"));
        assert!(!ISO_DATE_RE.is_match("1234"));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdefghij", 6), "abc...");
    }
}
