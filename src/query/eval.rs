use std::cmp::Ordering;

use crate::schema::{Record, Value};
use crate::utils::num::i128_to_f64;

use super::predicate::{CmpOp, FieldRef, Literal, OrderKey, Predicate};
use super::types::Direction;

/// Evaluates `predicate` with `scope` as the current value (the root record,
/// or a collection element inside `Any`).
pub fn eval_predicate(predicate: &Predicate, scope: &Value<'_>) -> bool {
    match predicate {
        Predicate::True => true,
        Predicate::And(ps) => ps.iter().all(|p| eval_predicate(p, scope)),
        Predicate::Or(ps) => ps.iter().any(|p| eval_predicate(p, scope)),
        Predicate::Not(p) => !eval_predicate(p, scope),
        Predicate::IsNull(field) => resolve_field(scope, field).is_null(),
        Predicate::IsNotNull(field) => !resolve_field(scope, field).is_null(),
        Predicate::Compare { field, op, value, fold_case } => {
            let v = resolve_field(scope, field);
            compare_literal(&v, value, *fold_case).is_some_and(|ord| cmp_holds(*op, ord))
        }
        Predicate::Like { field, pattern, fold_case, negated } => match resolve_field(scope, field) {
            Value::Text(s) if *fold_case => pattern.is_match(&s.to_lowercase()) != *negated,
            Value::Text(s) => pattern.is_match(&s) != *negated,
            _ => false,
        },
        Predicate::Any { collection, predicate } => match resolve_field(scope, collection) {
            Value::List(items) => items.iter().any(|item| eval_predicate(predicate, item)),
            _ => false,
        },
    }
}

/// Walks `field` from `scope`; missing or non-record hops yield `Null`.
pub fn resolve_field<'a>(scope: &Value<'a>, field: &FieldRef) -> Value<'a> {
    let mut parts = field.0.iter();
    let Some(first) = parts.next() else {
        return scope.clone();
    };
    let mut cur = scope.get(first);
    for part in parts {
        if cur.is_null() {
            break;
        }
        cur = cur.get(part);
    }
    cur
}

fn cmp_holds(op: CmpOp, ord: Ordering) -> bool {
    match op {
        CmpOp::Eq => ord == Ordering::Equal,
        CmpOp::Ne => ord != Ordering::Equal,
        CmpOp::Gt => ord == Ordering::Greater,
        CmpOp::Gte => ord != Ordering::Less,
        CmpOp::Lt => ord == Ordering::Less,
        CmpOp::Lte => ord != Ordering::Greater,
    }
}

/// Orders a field value against a literal after coercing the field to the
/// literal's kind. `None` when the field is null or cannot be coerced.
#[must_use]
pub fn compare_literal(field: &Value<'_>, literal: &Literal, fold_case: bool) -> Option<Ordering> {
    match literal {
        Literal::Text(lit) => {
            let s = field.as_text()?;
            if fold_case {
                Some(s.to_lowercase().as_str().cmp(lit.as_str()))
            } else {
                Some(s.cmp(lit.as_str()))
            }
        }
        Literal::Integer(i) => match field.as_integer() {
            Some(v) => Some(v.cmp(i)),
            None => field.as_number().and_then(|v| v.partial_cmp(&i128_to_f64(*i))),
        },
        Literal::Number(n) => field.as_number().and_then(|v| v.partial_cmp(n)),
        Literal::Bool(b) => field.as_bool().map(|v| v.cmp(b)),
        Literal::Guid(g) => field.as_guid().map(|v| v.cmp(g)),
        Literal::DateTime(d) => field.as_datetime().map(|v| v.cmp(d)),
        Literal::Date(d) => field.as_date().map(|v| v.cmp(d)),
    }
}

fn kind_rank(v: &Value<'_>) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Integer(_) | Value::Number(_) => 2,
        Value::Text(_) => 3,
        Value::Guid(_) => 4,
        Value::Date(_) | Value::DateTime(_) => 5,
        Value::List(_) => 6,
        Value::Record(_) => 7,
    }
}

/// Total order over field values used for sorting. Nulls sort first; values of
/// different kinds order by kind.
#[must_use]
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::Integer(x), Value::Number(y)) => i128_to_f64(*x).total_cmp(y),
        (Value::Number(x), Value::Integer(y)) => x.total_cmp(&i128_to_f64(*y)),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Guid(x), Value::Guid(y)) => x.cmp(y),
        (Value::DateTime(x), Value::DateTime(y)) => x.cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Date(_) | Value::DateTime(_), Value::Date(_) | Value::DateTime(_)) => {
            a.as_datetime().cmp(&b.as_datetime())
        }
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

/// Compares two records key by key; the first unequal key decides.
pub fn compare_records(a: &Value<'_>, b: &Value<'_>, keys: &[OrderKey]) -> Ordering {
    for key in keys {
        let ord = compare_values(&resolve_field(a, &key.field), &resolve_field(b, &key.field));
        if ord != Ordering::Equal {
            return match key.direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            };
        }
    }
    Ordering::Equal
}

/// Stable multi-key sort; a no-op without keys.
pub fn sort_records<T: Record>(items: &mut [T], keys: &[OrderKey]) {
    if keys.is_empty() {
        return;
    }
    items.sort_by(|a, b| compare_records(&Value::Record(a), &Value::Record(b), keys));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_never_compares() {
        assert_eq!(compare_literal(&Value::Null, &Literal::Number(1.0), false), None);
        assert_eq!(compare_literal(&Value::text("x"), &Literal::Number(1.0), false), None);
    }

    #[test]
    fn large_integers_compare_exactly() {
        let big = Value::Integer(9_007_199_254_740_993);
        assert_eq!(compare_literal(&big, &Literal::Integer(9_007_199_254_740_992), false), Some(Ordering::Greater));
        assert_eq!(compare_literal(&big, &Literal::Integer(9_007_199_254_740_993), false), Some(Ordering::Equal));
        assert_eq!(compare_literal(&Value::Number(2.5), &Literal::Integer(2), false), Some(Ordering::Greater));
        assert_eq!(compare_literal(&Value::Integer(3), &Literal::Number(2.5), false), Some(Ordering::Greater));
        assert_eq!(compare_values(&Value::Integer(2), &Value::Number(2.5)), Ordering::Less);
    }

    #[test]
    fn nulls_sort_first() {
        assert_eq!(compare_values(&Value::Null, &Value::Number(-1.0)), Ordering::Less);
        assert_eq!(compare_values(&Value::Number(2.0), &Value::Number(10.0)), Ordering::Less);
    }

    #[test]
    fn folded_text_compares_lowercased_field() {
        let ord = compare_literal(&Value::text("HeLLo"), &Literal::Text("hello".into()), true);
        assert_eq!(ord, Some(Ordering::Equal));
        let ord = compare_literal(&Value::text("HeLLo"), &Literal::Text("hello".into()), false);
        assert_ne!(ord, Some(Ordering::Equal));
    }
}
