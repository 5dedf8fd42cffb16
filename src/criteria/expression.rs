use super::error::CriteriaParseError;
use super::operator::Operator;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single filter condition: one field, one operator, one or two values.
///
/// `field` is a dot-separated path into the record (e.g. `contact.name`).
/// `value2` is only meaningful for the `between` operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<Value>,
}

impl Criterion {
    /// Parse a single criterion term (e.g. "status:equals:active" or
    /// "value:between:10:100")
    pub fn parse(s: &str) -> Result<Self, CriteriaParseError> {
        let parts = split_term_colons(s);
        if parts.len() < 3 || parts.len() > 4 {
            // Quote values that contain colons, e.g. createdAt:after:"2024-01-01T10:00:00Z"
            return Err(CriteriaParseError::InvalidTerm(s.to_string()));
        }

        let field = parts[0].trim().to_string();
        if field.is_empty() {
            return Err(CriteriaParseError::InvalidTerm(s.to_string()));
        }

        let operator: Operator = parts[1].trim().parse()?;

        let raw_value = parts[2].trim();
        if raw_value.is_empty() {
            return Err(CriteriaParseError::EmptyValue(field));
        }
        let value = parse_scalar(raw_value);

        let value2 = match (operator.takes_second_value(), parts.get(3)) {
            (true, Some(raw)) if !raw.trim().is_empty() => Some(parse_scalar(raw.trim())),
            (true, _) => return Err(CriteriaParseError::MissingRangeBound(field)),
            (false, None) => None,
            (false, Some(_)) => {
                return Err(CriteriaParseError::UnexpectedRangeBound {
                    field,
                    operator: operator.canonical_name().to_string(),
                });
            }
        };

        Ok(Criterion {
            field,
            operator,
            value,
            value2,
        })
    }
}

/// An ordered list of criteria combined with AND logic.
///
/// Parsed from the `--criteria` expression syntax:
///
/// ```text
/// field:operator:value            one condition
/// field:between:low:high          range condition (inclusive)
/// multiple terms                  combined with AND
/// field:contains:"two words"      quote values containing spaces or colons
/// ```
#[derive(Debug, Clone, Default)]
pub struct CriteriaExpression {
    pub criteria: Vec<Criterion>,
}

impl CriteriaExpression {
    /// Create a new empty expression
    pub fn new() -> Self {
        Self {
            criteria: Vec::new(),
        }
    }

    /// Parse a criteria expression from a string
    ///
    /// Terms are separated by whitespace and combined with AND logic.
    pub fn parse(s: &str) -> Result<Self, CriteriaParseError> {
        let mut criteria = Vec::new();

        for part in split_preserving_quotes(s) {
            criteria.push(Criterion::parse(part)?);
        }

        Ok(CriteriaExpression { criteria })
    }

    /// Check if this expression is empty (no criteria)
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

/// Parse a scalar literal from the expression syntax. Quoted values are
/// always strings; bare values are tried as integer, float, and boolean
/// before falling back to a string.
fn parse_scalar(s: &str) -> Value {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        return Value::String(s[1..s.len() - 1].to_string());
    }
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(f) = s.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    if let Ok(b) = s.parse::<bool>() {
        return Value::Bool(b);
    }
    Value::String(s.to_string())
}

/// Split a term on colons while ignoring colons inside double quotes, so
/// values like "contact.name:contains:\"a: b\"" parse correctly.
fn split_term_colons(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);

    parts
}

/// Split a string by whitespace while preserving quoted segments
fn split_preserving_quotes(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ' ' | '\t' if !in_quotes => {
                if i > start {
                    let part = &s[start..i];
                    if !part.trim().is_empty() {
                        parts.push(part.trim());
                    }
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    // Add the last part
    if start < s.len() {
        let part = &s[start..];
        if !part.trim().is_empty() {
            parts.push(part.trim());
        }
    }

    parts
}
