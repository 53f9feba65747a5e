use serde::de::DeserializeOwned;

use crate::errors::FilterError;

use super::types::{Condition, ConditionGroup, Segment};

// `null` (or an absent body) is a missing spec rather than a JSON error.
fn parse_required<T: DeserializeOwned>(s: &str) -> Result<T, FilterError> {
    let parsed: Option<T> = serde_json::from_str(s)?;
    parsed.ok_or(FilterError::MissingSpec)
}

/// Parse a JSON segment (`conditionSets`, `orders`, `page`).
///
/// # Errors
/// `MissingSpec` for `null`, `Json` for malformed input.
pub fn parse_segment_json(s: &str) -> Result<Segment, FilterError> {
    parse_required(s)
}

/// # Errors
/// `MissingSpec` for `null`, `Json` for malformed input.
pub fn parse_group_json(s: &str) -> Result<ConditionGroup, FilterError> {
    parse_required(s)
}

/// # Errors
/// `MissingSpec` for `null`, `Json` for malformed input.
pub fn parse_condition_json(s: &str) -> Result<Condition, FilterError> {
    parse_required(s)
}

/// # Errors
/// Propagates serializer failures.
pub fn segment_to_json(segment: &Segment) -> Result<String, FilterError> {
    Ok(serde_json::to_string(segment)?)
}
