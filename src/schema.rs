//! Schema descriptors and the record access seam.
//!
//! A [`Schema`] tells the compiler which fields a record type has, their logical
//! type and whether they hold collections. Records expose field values through
//! the [`Record`] trait, so the compiler never needs reflection.

use crate::query::validate::{parse_date, parse_datetime};
use crate::query::DataType;
use crate::utils::num::{f64_to_i128_exact, i128_to_f64};
use chrono::{NaiveDate, NaiveDateTime};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Scalar(DataType),
    Record(Arc<Schema>),
    List(Box<FieldType>),
}

impl FieldType {
    #[must_use]
    pub fn list(inner: FieldType) -> Self {
        Self::List(Box::new(inner))
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDef>,
    key: Option<String>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder { name: name.into(), fields: Vec::new(), key: None }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Field path used as record identity by the set operations.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Case-insensitive lookup; an exact-case match wins over a folded one.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name)))
            .or_else(|| self.fields.iter().find(|f| f.name.to_lowercase() == name.to_lowercase()))
    }
}

pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDef>,
    key: Option<String>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDef { name: name.into(), ty });
        self
    }

    #[must_use]
    pub fn scalar(self, name: impl Into<String>, data_type: DataType) -> Self {
        self.field(name, FieldType::Scalar(data_type))
    }

    #[must_use]
    pub fn text(self, name: impl Into<String>) -> Self {
        self.scalar(name, DataType::Text)
    }

    #[must_use]
    pub fn number(self, name: impl Into<String>) -> Self {
        self.scalar(name, DataType::Number)
    }

    #[must_use]
    pub fn boolean(self, name: impl Into<String>) -> Self {
        self.scalar(name, DataType::Boolean)
    }

    #[must_use]
    pub fn guid(self, name: impl Into<String>) -> Self {
        self.scalar(name, DataType::Guid)
    }

    #[must_use]
    pub fn date(self, name: impl Into<String>) -> Self {
        self.scalar(name, DataType::Date)
    }

    #[must_use]
    pub fn datetime(self, name: impl Into<String>) -> Self {
        self.scalar(name, DataType::DateTime)
    }

    #[must_use]
    pub fn record(self, name: impl Into<String>, schema: Arc<Schema>) -> Self {
        self.field(name, FieldType::Record(schema))
    }

    /// A collection field; `element` may itself be a list.
    #[must_use]
    pub fn list(self, name: impl Into<String>, element: FieldType) -> Self {
        self.field(name, FieldType::list(element))
    }

    #[must_use]
    pub fn key(mut self, path: impl Into<String>) -> Self {
        self.key = Some(path.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<Schema> {
        Arc::new(Schema { name: self.name, fields: self.fields, key: self.key })
    }
}

/// Read access to a record's fields by canonical name.
pub trait Record {
    /// Returns [`Value::Null`] for absent fields.
    fn field(&self, name: &str) -> Value<'_>;
}

impl<T: Record + ?Sized> Record for &T {
    fn field(&self, name: &str) -> Value<'_> {
        (**self).field(name)
    }
}

impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Value<'_> {
        self.as_object().and_then(|m| m.get(name)).map_or(Value::Null, json_value)
    }
}

fn json_value(v: &serde_json::Value) -> Value<'_> {
    use serde_json::Value as J;
    match v {
        J::Null => Value::Null,
        J::Bool(b) => Value::Bool(*b),
        J::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Value::Integer(i128::from(i)),
            (None, Some(u)) => Value::Integer(i128::from(u)),
            _ => n.as_f64().map_or(Value::Null, Value::Number),
        },
        J::String(s) => Value::Text(Cow::Borrowed(s)),
        J::Array(items) => Value::List(items.iter().map(json_value).collect()),
        J::Object(_) => Value::Record(v),
    }
}

/// Runtime value of a record field.
#[derive(Clone)]
pub enum Value<'a> {
    Null,
    Text(Cow<'a, str>),
    /// Whole numbers kept exact; compared without going through `f64`.
    Integer(i128),
    Number(f64),
    Bool(bool),
    Guid(Uuid),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Record(&'a dyn Record),
    List(Vec<Value<'a>>),
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Text(s) => write!(f, "Text({s:?})"),
            Self::Integer(i) => write!(f, "Integer({i})"),
            Self::Number(n) => write!(f, "Number({n})"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Guid(g) => write!(f, "Guid({g})"),
            Self::DateTime(d) => write!(f, "DateTime({d})"),
            Self::Date(d) => write!(f, "Date({d})"),
            Self::Record(_) => write!(f, "Record(..)"),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

impl<'a> Value<'a> {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn text(s: impl Into<Cow<'a, str>>) -> Self {
        Self::Text(s.into())
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numbers, or text that parses as a finite number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(i128_to_f64(*i)),
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Exact integer view: integers, whole floats, or text holding an integer.
    #[must_use]
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Number(n) => f64_to_i128_exact(*n),
            Self::Text(s) => s.trim().parse::<i128>().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    #[must_use]
    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Self::Guid(g) => Some(*g),
            Self::Text(s) => Uuid::parse_str(s.trim()).ok(),
            _ => None,
        }
    }

    /// Dates widen to midnight.
    #[must_use]
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(d) => Some(*d),
            Self::Date(d) => d.and_hms_opt(0, 0, 0),
            Self::Text(s) => parse_datetime(s),
            _ => None,
        }
    }

    /// Date-times truncate to their calendar date.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(d) => Some(d.date()),
            Self::Text(s) => parse_date(s),
            _ => None,
        }
    }

    /// Field of a nested record; anything else yields `Null`.
    #[must_use]
    pub fn get(&self, name: &str) -> Value<'a> {
        match self {
            Self::Record(r) => {
                let r: &'a dyn Record = *r;
                r.field(name)
            }
            _ => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_prefers_exact_case() {
        let s = Schema::builder("Dup").text("name").text("Name").build();
        assert_eq!(s.lookup("Name").unwrap().name, "Name");
        assert_eq!(s.lookup("name").unwrap().name, "name");
        assert_eq!(s.lookup("NAME").unwrap().name, "name");
        assert!(s.lookup("title").is_none());
    }

    #[test]
    fn json_records_expose_nested_values() {
        let doc = json!({"Name": "a", "Price": 3.5, "Tags": [{"Label": "x"}], "Gone": null});
        assert_eq!(doc.field("Name").as_text(), Some("a"));
        assert_eq!(doc.field("Price").as_number(), Some(3.5));
        assert!(doc.field("Gone").is_null());
        assert!(doc.field("Missing").is_null());
        match doc.field("Tags") {
            Value::List(items) => assert_eq!(items[0].get("Label").as_text(), Some("x")),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn json_integers_stay_exact() {
        let doc = json!({"Big": 9_007_199_254_740_993_u64, "Max": u64::MAX, "Half": 0.5});
        assert_eq!(doc.field("Big").as_integer(), Some(9_007_199_254_740_993));
        assert_eq!(doc.field("Max").as_integer(), Some(i128::from(u64::MAX)));
        assert!(doc.field("Half").as_integer().is_none());
        assert_eq!(doc.field("Half").as_number(), Some(0.5));
    }

    #[test]
    fn text_coerces_to_typed_values() {
        assert_eq!(Value::text("42").as_number(), Some(42.0));
        assert_eq!(Value::text("TRUE").as_bool(), Some(true));
        assert!(Value::text("nope").as_guid().is_none());
        let d = Value::text("2024-03-01T10:30:00").as_date().unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}
