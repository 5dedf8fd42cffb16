use super::error::CriteriaParseError;
use crate::entity::FieldKind;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Comparison operators understood by criterion evaluation.
///
/// The string names form the wire vocabulary shared with criterion-builder
/// UIs and saved filter definitions, so they must stay stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    /// Case-insensitive substring match
    Contains,
    /// Exact match, or string-form match for mixed types
    Equals,
    /// Negation of `Equals`
    NotEquals,
    /// Case-insensitive prefix match
    StartsWith,
    /// Case-insensitive suffix match
    EndsWith,
    /// Negation of `Contains`
    NotContains,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    /// Date strictly earlier than the criterion value
    Before,
    /// Date strictly later than the criterion value
    After,
    /// Inclusive two-sided range; the only operator taking a second value
    Between,
    /// Operator name not in the vocabulary. Kept so stored filters written by
    /// newer or buggy builders still deserialize; evaluation treats it as
    /// match-everything, and the warnings pass flags it.
    Unrecognized(String),
}

/// The full operator vocabulary, in the order pickers present it.
pub const ALL_OPERATORS: [Operator; 13] = [
    Operator::Contains,
    Operator::Equals,
    Operator::NotEquals,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::NotContains,
    Operator::GreaterThan,
    Operator::LessThan,
    Operator::GreaterEqual,
    Operator::LessEqual,
    Operator::Before,
    Operator::After,
    Operator::Between,
];

impl FromStr for Operator {
    type Err = CriteriaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contains" => Ok(Operator::Contains),
            "equals" | "eq" => Ok(Operator::Equals),
            "not_equals" | "ne" => Ok(Operator::NotEquals),
            "starts_with" => Ok(Operator::StartsWith),
            "ends_with" => Ok(Operator::EndsWith),
            "not_contains" => Ok(Operator::NotContains),
            "greater_than" | "gt" => Ok(Operator::GreaterThan),
            "less_than" | "lt" => Ok(Operator::LessThan),
            "greater_equal" | "ge" => Ok(Operator::GreaterEqual),
            "less_equal" | "le" => Ok(Operator::LessEqual),
            "before" => Ok(Operator::Before),
            "after" => Ok(Operator::After),
            "between" => Ok(Operator::Between),
            _ => Err(CriteriaParseError::UnknownOperator(s.to_string())),
        }
    }
}

impl Operator {
    /// Parse an operator name, keeping unknown names as `Unrecognized`
    /// instead of failing. Used when loading stored filter definitions.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse()
            .unwrap_or_else(|_| Operator::Unrecognized(s.to_string()))
    }

    /// Get the canonical wire name of this operator
    pub fn canonical_name(&self) -> &str {
        match self {
            Operator::Contains => "contains",
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::NotContains => "not_contains",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::GreaterEqual => "greater_equal",
            Operator::LessEqual => "less_equal",
            Operator::Before => "before",
            Operator::After => "after",
            Operator::Between => "between",
            Operator::Unrecognized(name) => name,
        }
    }

    /// Short human description for pickers and the `operators` command
    pub fn description(&self) -> &'static str {
        match self {
            Operator::Contains => "value appears anywhere in the field (case-insensitive)",
            Operator::Equals => "field equals value, comparing string forms for mixed types",
            Operator::NotEquals => "field differs from value",
            Operator::StartsWith => "field starts with value (case-insensitive)",
            Operator::EndsWith => "field ends with value (case-insensitive)",
            Operator::NotContains => "value appears nowhere in the field (case-insensitive)",
            Operator::GreaterThan => "numeric field is greater than value",
            Operator::LessThan => "numeric field is less than value",
            Operator::GreaterEqual => "numeric field is greater than or equal to value",
            Operator::LessEqual => "numeric field is less than or equal to value",
            Operator::Before => "date field is earlier than value",
            Operator::After => "date field is later than value",
            Operator::Between => "field is within the inclusive range [value, value2]",
            Operator::Unrecognized(_) => "not in the vocabulary; matches every record",
        }
    }

    /// Whether this operator takes a second value (`value2`)
    pub fn takes_second_value(&self) -> bool {
        matches!(self, Operator::Between)
    }

    /// Operators a criterion builder should offer for a field of `kind`
    pub fn for_kind(kind: FieldKind) -> &'static [Operator] {
        static TEXT: [Operator; 6] = [
            Operator::Contains,
            Operator::Equals,
            Operator::NotEquals,
            Operator::StartsWith,
            Operator::EndsWith,
            Operator::NotContains,
        ];
        static NUMBER: [Operator; 7] = [
            Operator::Equals,
            Operator::NotEquals,
            Operator::GreaterThan,
            Operator::LessThan,
            Operator::GreaterEqual,
            Operator::LessEqual,
            Operator::Between,
        ];
        static DATE: [Operator; 3] = [Operator::Before, Operator::After, Operator::Between];

        match kind {
            FieldKind::Text => &TEXT,
            FieldKind::Number => &NUMBER,
            FieldKind::Date => &DATE,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.canonical_name())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Operator::parse_lenient(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        for op in &ALL_OPERATORS {
            let parsed: Operator = op.canonical_name().parse().unwrap();
            assert_eq!(&parsed, op);
        }
    }

    #[test]
    fn test_parse_short_aliases() {
        assert_eq!("gt".parse::<Operator>().unwrap(), Operator::GreaterThan);
        assert_eq!("le".parse::<Operator>().unwrap(), Operator::LessEqual);
        assert_eq!("eq".parse::<Operator>().unwrap(), Operator::Equals);
        assert_eq!("NE".parse::<Operator>().unwrap(), Operator::NotEquals);
    }

    #[test]
    fn test_unknown_operator_is_an_error() {
        assert!("regex_match".parse::<Operator>().is_err());
    }

    #[test]
    fn test_lenient_parse_keeps_unknown_names() {
        let op = Operator::parse_lenient("fuzzy");
        assert_eq!(op, Operator::Unrecognized("fuzzy".to_string()));
        assert_eq!(op.canonical_name(), "fuzzy");
    }

    #[test]
    fn test_only_between_takes_a_second_value() {
        for op in &ALL_OPERATORS {
            assert_eq!(op.takes_second_value(), *op == Operator::Between);
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&Operator::StartsWith).unwrap();
        assert_eq!(json, "\"starts_with\"");
        let back: Operator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Operator::StartsWith);
    }
}
