//! Single-condition predicate construction.
//!
//! Every operator except `IsNull`/`IsNotNull` is wrapped as
//! `field IS NOT NULL AND <body>`, so a null field only ever satisfies `IsNull`.
//! Paths that cross collections are wrapped in `Any`, innermost level first.

use crate::errors::FilterError;

use super::path::ResolvedPath;
use super::predicate::{CmpOp, FieldRef, Literal, LikePattern, Predicate};
use super::types::{Condition, Operator};

enum Shape {
    Contains,
    StartsWith,
    EndsWith,
}

fn like(
    field: &FieldRef,
    literal: Literal,
    shape: Shape,
    negated: bool,
    condition: &Condition,
) -> Result<Predicate, FilterError> {
    let Literal::Text(text) = literal else {
        return Err(FilterError::UnsupportedOperator {
            operator: condition.operator.name().to_owned(),
            data_type: condition.data_type.to_string(),
        });
    };
    let pattern = match shape {
        Shape::Contains => LikePattern::contains(&text),
        Shape::StartsWith => LikePattern::starts_with(&text),
        Shape::EndsWith => LikePattern::ends_with(&text),
    }
    .map_err(|_| FilterError::InvalidValue { field: condition.field.clone() })?;
    let fold_case = condition.operator.is_case_insensitive();
    Ok(Predicate::Like { field: field.clone(), pattern, fold_case, negated })
}

fn operator_body(
    condition: &Condition,
    field: &FieldRef,
    literals: Vec<Literal>,
    fold_case: bool,
) -> Result<Predicate, FilterError> {
    let cmp = |op: CmpOp, value: Literal| Predicate::Compare { field: field.clone(), op, value, fold_case };
    let op = condition.operator;
    let need = |v: Option<Literal>| v.ok_or_else(|| FilterError::RequiredOneValue(op.name().to_owned()));
    let mut values = literals.into_iter();

    Ok(match op {
        Operator::Equal | Operator::IEqual => cmp(CmpOp::Eq, need(values.next())?),
        Operator::NotEqual | Operator::INotEqual => cmp(CmpOp::Ne, need(values.next())?),
        Operator::GreaterThan => cmp(CmpOp::Gt, need(values.next())?),
        Operator::GreaterThanOrEqual => cmp(CmpOp::Gte, need(values.next())?),
        Operator::LessThan => cmp(CmpOp::Lt, need(values.next())?),
        Operator::LessThanOrEqual => cmp(CmpOp::Lte, need(values.next())?),
        Operator::Contains | Operator::IContains => {
            like(field, need(values.next())?, Shape::Contains, false, condition)?
        }
        Operator::NotContains | Operator::INotContains => {
            like(field, need(values.next())?, Shape::Contains, true, condition)?
        }
        Operator::StartsWith | Operator::IStartsWith => {
            like(field, need(values.next())?, Shape::StartsWith, false, condition)?
        }
        Operator::NotStartsWith | Operator::INotStartsWith => {
            like(field, need(values.next())?, Shape::StartsWith, true, condition)?
        }
        Operator::EndsWith | Operator::IEndsWith => {
            like(field, need(values.next())?, Shape::EndsWith, false, condition)?
        }
        Operator::NotEndsWith | Operator::INotEndsWith => {
            like(field, need(values.next())?, Shape::EndsWith, true, condition)?
        }
        Operator::In | Operator::IIn => Predicate::or(values.map(|v| cmp(CmpOp::Eq, v)).collect()),
        Operator::NotIn | Operator::INotIn => Predicate::and(values.map(|v| cmp(CmpOp::Ne, v)).collect()),
        Operator::Between => {
            let lo = need(values.next())?;
            let hi = need(values.next())?;
            Predicate::And(vec![cmp(CmpOp::Gte, lo), cmp(CmpOp::Lte, hi)])
        }
        Operator::NotBetween => {
            let lo = need(values.next())?;
            let hi = need(values.next())?;
            Predicate::Or(vec![cmp(CmpOp::Lt, lo), cmp(CmpOp::Gt, hi)])
        }
        Operator::IsNull => Predicate::IsNull(field.clone()),
        Operator::IsNotNull => Predicate::IsNotNull(field.clone()),
    })
}

/// Builds the predicate for one validated condition.
///
/// # Errors
/// Only fails if `literals` does not match the operator's arity or a pattern
/// literal is not text, both of which validation rules out beforehand.
pub fn build_condition(
    condition: &Condition,
    resolved: &ResolvedPath,
    literals: Vec<Literal>,
) -> Result<Predicate, FilterError> {
    let (mut hops, mut leaf_path) = resolved.split_hops();
    // Null tests on a collection field look at the collection, not its elements.
    if matches!(condition.operator, Operator::IsNull | Operator::IsNotNull)
        && leaf_path.is_empty()
        && let Some(last) = hops.pop()
    {
        leaf_path = last.path;
    }
    let field = FieldRef::new(leaf_path);
    let fold_case = condition.operator.is_case_insensitive();
    let literals = if fold_case { literals.into_iter().map(Literal::fold_case).collect() } else { literals };

    let body = operator_body(condition, &field, literals, fold_case)?;
    let mut predicate = match condition.operator {
        Operator::IsNull | Operator::IsNotNull => body,
        _ => Predicate::And(vec![Predicate::IsNotNull(field), body]),
    };

    for hop in hops.into_iter().rev() {
        for _ in 1..hop.depth {
            predicate = Predicate::Any { collection: FieldRef::default(), predicate: Box::new(predicate) };
        }
        predicate = Predicate::Any { collection: FieldRef::new(hop.path), predicate: Box::new(predicate) };
    }
    Ok(predicate)
}
