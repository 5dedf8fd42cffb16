//! Criteria parsing and evaluation
//!
//! This module is the filtering core: a small interpreted query language over
//! loosely-typed CRM records. A filter is an ordered list of criteria, each
//! naming a field path, an operator, and one or two values; criteria combine
//! with AND logic and apply uniformly across entity schemas.
//!
//! # Expression syntax
//!
//! ```text
//! field:operator:value            one condition
//! field:between:low:high          inclusive range condition
//! multiple terms                  combined with AND
//! field:contains:"two words"      quote values containing spaces or colons
//! ```
//!
//! # Operators
//!
//! - `contains` / `not_contains` / `starts_with` / `ends_with` - case-insensitive text
//! - `equals` / `not_equals` - exact or string-form comparison
//! - `greater_than` / `less_than` / `greater_equal` / `less_equal` - numeric
//! - `before` / `after` - dates
//! - `between` - inclusive range, dates on date fields and numbers elsewhere
//!
//! # Examples
//!
//! ```text
//! status:equals:active                    # active records only
//! company:contains:acme                   # company mentions acme
//! value:between:1000:50000                # deal size band
//! createdAt:after:2024-01-01              # created this year
//! contact.name:starts_with:a              # nested field path
//! ```

pub mod error;
pub mod eval;
pub mod expression;
pub mod operator;

pub use error::CriteriaParseError;
pub use eval::{
    apply_criteria, compare_by_field, lookup_path, matches_criterion, print_criteria_warnings,
};
pub use expression::{CriteriaExpression, Criterion};
pub use operator::{ALL_OPERATORS, Operator};
