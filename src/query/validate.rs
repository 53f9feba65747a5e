//! Arity and lexical validation of a single condition's values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::errors::FilterError;

use super::predicate::Literal;
use super::types::{Arity, Condition, DataType};

const DATETIME_FORMATS: &[&str] =
    &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses RFC 3339 (converted to UTC), ISO-like local timestamps, or a bare date (midnight).
#[must_use]
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| NaiveDate::parse_from_str(s, DATE_FORMAT).ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
}

#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok().or_else(|| parse_datetime(s).map(|d| d.date()))
}

/// Parses one raw token as a literal of `data_type`.
///
/// # Errors
/// `FilterError::InvalidFormat` when the token is not lexically valid for the type.
pub fn parse_literal(raw: &str, data_type: DataType) -> Result<Literal, FilterError> {
    let bad = || FilterError::InvalidFormat { value: raw.to_owned(), data_type: data_type.to_string() };
    let trimmed = raw.trim();
    Ok(match data_type {
        DataType::Text => Literal::Text(raw.to_owned()),
        DataType::Number => match trimmed.parse::<i128>() {
            Ok(i) => Literal::Integer(i),
            Err(_) => Literal::Number(trimmed.parse::<f64>().ok().filter(|n| n.is_finite()).ok_or_else(bad)?),
        },
        DataType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" => Literal::Bool(true),
            "false" => Literal::Bool(false),
            _ => return Err(bad()),
        },
        DataType::Guid => Literal::Guid(Uuid::parse_str(trimmed).map_err(|_| bad())?),
        DataType::DateTime => Literal::DateTime(parse_datetime(trimmed).ok_or_else(bad)?),
        DataType::Date => Literal::Date(parse_date(trimmed).ok_or_else(bad)?),
    })
}

/// Checks operator applicability, value count and value format, returning the
/// typed literals in input order.
///
/// # Errors
/// Returns the first violation found: `UnsupportedOperator`, an arity error
/// (`NotRequiredValues`, `RequiredOneValue`, `RequiredTwoValue`,
/// `RequiredValues`, `TooManyValues`), `InvalidValue` for blank values, or
/// `InvalidFormat`.
pub fn validate_condition(condition: &Condition, max_in_values: usize) -> Result<Vec<Literal>, FilterError> {
    let op = condition.operator;
    if !op.supports(condition.data_type) {
        return Err(FilterError::UnsupportedOperator {
            operator: op.name().to_owned(),
            data_type: condition.data_type.to_string(),
        });
    }

    let values = &condition.values;
    match op.arity() {
        Arity::None => {
            if !values.is_empty() {
                return Err(FilterError::NotRequiredValues { operator: op.name().to_owned() });
            }
            return Ok(Vec::new());
        }
        Arity::One if values.len() != 1 => {
            return Err(FilterError::RequiredOneValue(op.name().to_owned()));
        }
        Arity::Two if values.len() != 2 => {
            return Err(FilterError::RequiredTwoValue { operator: op.name().to_owned() });
        }
        Arity::Many if values.is_empty() => {
            return Err(FilterError::RequiredValues { operator: op.name().to_owned() });
        }
        Arity::Many if values.len() > max_in_values => {
            return Err(FilterError::TooManyValues { operator: op.name().to_owned(), max: max_in_values });
        }
        _ => {}
    }

    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(FilterError::InvalidValue { field: condition.field.clone() });
    }
    values.iter().map(|v| parse_literal(v, condition.data_type)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn datetime_accepts_common_shapes() {
        assert!(parse_datetime("2024-05-01T12:30:00Z").is_some());
        assert!(parse_datetime("2024-05-01T12:30:00.250").is_some());
        assert!(parse_datetime("2024-05-01 12:30:00").is_some());
        assert_eq!(parse_datetime("2024-05-01").unwrap().hour(), 0);
        assert!(parse_datetime("01/05/2024").is_none());
    }

    #[test]
    fn rfc3339_offsets_normalize_to_utc() {
        let dt = parse_datetime("2024-05-01T12:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn number_rejects_non_finite() {
        assert!(parse_literal("NaN", DataType::Number).is_err());
        assert!(parse_literal("inf", DataType::Number).is_err());
        assert_eq!(parse_literal(" -3.5 ", DataType::Number).unwrap(), Literal::Number(-3.5));
    }

    #[test]
    fn whole_numbers_parse_exactly() {
        assert_eq!(
            parse_literal("9007199254740993", DataType::Number).unwrap(),
            Literal::Integer(9_007_199_254_740_993)
        );
        assert_eq!(parse_literal("1e3", DataType::Number).unwrap(), Literal::Number(1000.0));
    }
}
