//! Typed predicate tree produced by the compiler.
//!
//! The tree is evaluated directly by [`super::eval`] or inspected by a backend
//! that wants to translate it; `Display` renders an SQL-like explain string.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::fmt;
use uuid::Uuid;

use crate::schema::{Record, Value};

use super::eval::eval_predicate;
use super::types::Direction;

/// Escape character used in [`LikePattern`]s.
pub const LIKE_ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// A validated, typed condition value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Integer(i128),
    Number(f64),
    Bool(bool),
    Guid(Uuid),
    DateTime(NaiveDateTime),
    /// Compared against the field truncated to its calendar date.
    Date(NaiveDate),
}

impl Literal {
    /// Lowercases text literals; other kinds are returned unchanged.
    #[must_use]
    pub fn fold_case(self) -> Self {
        match self {
            Self::Text(s) => Self::Text(s.to_lowercase()),
            other => other,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Self::Guid(g) => write!(f, "'{g}'"),
            Self::DateTime(d) => write!(f, "TIMESTAMP '{}'", d.format("%Y-%m-%d %H:%M:%S%.f")),
            Self::Date(d) => write!(f, "DATE '{}'", d.format("%Y-%m-%d")),
        }
    }
}

/// Field path relative to the current scope (the record, or the collection
/// element inside an `Any`). An empty path is the scope value itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldRef(pub Vec<String>);

impl FieldRef {
    #[must_use]
    pub fn new(path: Vec<String>) -> Self {
        Self(path)
    }

    #[must_use]
    pub fn is_element(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() { f.write_str("@") } else { f.write_str(&self.0.join(".")) }
    }
}

/// One compiled ordering key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub field: FieldRef,
    pub direction: Direction,
}

/// Escapes `\`, `%` and `_` so the text matches only itself inside a LIKE pattern.
#[must_use]
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, LIKE_ESCAPE | '%' | '_') {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

fn like_to_regex(pattern: &str) -> String {
    let mut re = String::from("(?s)^");
    let mut chars = pattern.chars();
    let mut buf = [0u8; 4];
    while let Some(c) = chars.next() {
        match c {
            LIKE_ESCAPE => {
                if let Some(next) = chars.next() {
                    re.push_str(&regex::escape(next.encode_utf8(&mut buf)));
                }
            }
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            other => re.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    re.push('$');
    re
}

/// A LIKE pattern (`%` any run, `_` any char, `\` escape) with its compiled matcher.
#[derive(Debug, Clone)]
pub struct LikePattern {
    pattern: String,
    matcher: Regex,
}

impl LikePattern {
    /// # Errors
    /// Fails only if the translated expression exceeds the regex size limit.
    pub fn new(pattern: impl Into<String>) -> Result<Self, regex::Error> {
        let pattern = pattern.into();
        let matcher = Regex::new(&like_to_regex(&pattern))?;
        Ok(Self { pattern, matcher })
    }

    /// # Errors
    /// See [`LikePattern::new`].
    pub fn contains(literal: &str) -> Result<Self, regex::Error> {
        Self::new(format!("%{}%", escape_like(literal)))
    }

    /// # Errors
    /// See [`LikePattern::new`].
    pub fn starts_with(literal: &str) -> Result<Self, regex::Error> {
        Self::new(format!("{}%", escape_like(literal)))
    }

    /// # Errors
    /// See [`LikePattern::new`].
    pub fn ends_with(literal: &str) -> Result<Self, regex::Error> {
        Self::new(format!("%{}", escape_like(literal)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

impl PartialEq for LikePattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches everything.
    True,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    IsNull(FieldRef),
    IsNotNull(FieldRef),
    Compare { field: FieldRef, op: CmpOp, value: Literal, fold_case: bool },
    /// `NOT LIKE` when `negated`; non-text values satisfy neither form.
    Like { field: FieldRef, pattern: LikePattern, fold_case: bool, negated: bool },
    /// True when at least one element of the collection satisfies `predicate`.
    Any { collection: FieldRef, predicate: Box<Predicate> },
}

impl Predicate {
    /// Conjunction; a single part is returned as is and no parts yield `True`.
    #[must_use]
    pub fn and(mut parts: Vec<Predicate>) -> Self {
        match parts.len() {
            0 => Self::True,
            1 => parts.remove(0),
            _ => Self::And(parts),
        }
    }

    /// Disjunction; a single part is returned as is.
    #[must_use]
    pub fn or(mut parts: Vec<Predicate>) -> Self {
        if parts.len() == 1 { parts.remove(0) } else { Self::Or(parts) }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }

    /// Evaluates the predicate against one record.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        eval_predicate(self, &Value::Record(record))
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Predicate], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, p) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, " {sep} ")?;
        }
        write!(f, "{p}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("TRUE"),
            Self::And(parts) if parts.is_empty() => f.write_str("TRUE"),
            Self::Or(parts) if parts.is_empty() => f.write_str("FALSE"),
            Self::And(parts) => write_joined(f, parts, "AND"),
            Self::Or(parts) => write_joined(f, parts, "OR"),
            Self::Not(inner) => write!(f, "NOT {inner}"),
            Self::IsNull(field) => write!(f, "{field} IS NULL"),
            Self::IsNotNull(field) => write!(f, "{field} IS NOT NULL"),
            Self::Compare { field, op, value, fold_case } => {
                if *fold_case {
                    write!(f, "LOWER({field}) {} {value}", op.symbol())
                } else if matches!(value, Literal::Date(_)) {
                    write!(f, "DATE({field}) {} {value}", op.symbol())
                } else {
                    write!(f, "{field} {} {value}", op.symbol())
                }
            }
            Self::Like { field, pattern, fold_case, negated } => {
                let pat = pattern.as_str().replace('\'', "''");
                let like = if *negated { "NOT LIKE" } else { "LIKE" };
                if *fold_case {
                    write!(f, "LOWER({field}) {like} '{pat}' ESCAPE '{LIKE_ESCAPE}'")
                } else {
                    write!(f, "{field} {like} '{pat}' ESCAPE '{LIKE_ESCAPE}'")
                }
            }
            Self::Any { collection, predicate } => write!(f, "ANY({collection}: {predicate})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_marks_wildcards_literal() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn contains_pattern_treats_percent_literally() {
        let p = LikePattern::contains("10%").unwrap();
        assert!(p.is_match("save 10% today"));
        assert!(!p.is_match("save 100 today"));
        assert_eq!(p.as_str(), "%10\\%%");
    }

    #[test]
    fn underscore_is_literal_after_escape() {
        let p = LikePattern::starts_with("a_b").unwrap();
        assert!(p.is_match("a_bc"));
        assert!(!p.is_match("axbc"));
    }

    #[test]
    fn raw_patterns_keep_wildcards() {
        let p = LikePattern::new("a_c%").unwrap();
        assert!(p.is_match("abcdef"));
        assert!(!p.is_match("abd"));
    }

    #[test]
    fn regex_metacharacters_are_inert() {
        let p = LikePattern::ends_with("(x.*)").unwrap();
        assert!(p.is_match("value (x.*)"));
        assert!(!p.is_match("value (xyz)"));
    }

    #[test]
    fn explain_renders_escape_clause() {
        let p = Predicate::Like {
            field: FieldRef::new(vec!["Name".into()]),
            pattern: LikePattern::contains("it's 5%").unwrap(),
            fold_case: true,
            negated: false,
        };
        assert_eq!(p.to_string(), "LOWER(Name) LIKE '%it''s 5\\%%' ESCAPE '\\'");
    }

    #[test]
    fn negate_wraps_in_not() {
        let p = Predicate::IsNull(FieldRef::new(vec!["Name".into()])).negate();
        assert_eq!(p.to_string(), "NOT Name IS NULL");
        assert!(p.matches(&serde_json::json!({"Name": "a"})));
        assert!(!p.matches(&serde_json::json!({"Name": null})));
    }

    #[test]
    fn and_collapses_trivial_lists() {
        assert!(Predicate::and(vec![]).is_true());
        let single = Predicate::IsNull(FieldRef::default());
        assert_eq!(Predicate::and(vec![single.clone()]), single);
    }
}
