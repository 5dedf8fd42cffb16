use thiserror::Error;

/// Errors that can occur when parsing criteria expressions
#[derive(Debug, Error)]
pub enum CriteriaParseError {
    #[error(
        "Unknown operator: '{0}'. Valid operators are: contains, equals, not_equals, starts_with, ends_with, not_contains, greater_than, less_than, greater_equal, less_equal, before, after, between"
    )]
    UnknownOperator(String),

    #[error("Invalid criterion term: expected 'field:operator:value', got: {0}")]
    InvalidTerm(String),

    #[error("Empty value for field '{0}'")]
    EmptyValue(String),

    #[error("Operator 'between' requires two values for field '{0}', e.g. 'value:between:10:100'")]
    MissingRangeBound(String),

    #[error("Operator '{operator}' does not take a second value (field '{field}')")]
    UnexpectedRangeBound { field: String, operator: String },
}
