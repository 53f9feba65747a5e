use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical data type a condition's values are validated and compared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[serde(alias = "String", alias = "text")]
    Text,
    #[serde(alias = "number")]
    Number,
    #[serde(alias = "Bool", alias = "boolean")]
    Boolean,
    #[serde(alias = "date")]
    Date,
    #[serde(alias = "datetime")]
    DateTime,
    #[serde(alias = "GUID", alias = "Uuid", alias = "guid")]
    Guid,
}

impl DataType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Guid => "Guid",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many values an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    One,
    Two,
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    NotEqual,
    IEqual,
    INotEqual,
    Contains,
    NotContains,
    IContains,
    INotContains,
    StartsWith,
    NotStartsWith,
    IStartsWith,
    INotStartsWith,
    EndsWith,
    NotEndsWith,
    IEndsWith,
    INotEndsWith,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    NotIn,
    IIn,
    INotIn,
    Between,
    NotBetween,
    IsNull,
    IsNotNull,
}

impl Operator {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Equal => "Equal",
            Self::NotEqual => "NotEqual",
            Self::IEqual => "IEqual",
            Self::INotEqual => "INotEqual",
            Self::Contains => "Contains",
            Self::NotContains => "NotContains",
            Self::IContains => "IContains",
            Self::INotContains => "INotContains",
            Self::StartsWith => "StartsWith",
            Self::NotStartsWith => "NotStartsWith",
            Self::IStartsWith => "IStartsWith",
            Self::INotStartsWith => "INotStartsWith",
            Self::EndsWith => "EndsWith",
            Self::NotEndsWith => "NotEndsWith",
            Self::IEndsWith => "IEndsWith",
            Self::INotEndsWith => "INotEndsWith",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
            Self::In => "In",
            Self::NotIn => "NotIn",
            Self::IIn => "IIn",
            Self::INotIn => "INotIn",
            Self::Between => "Between",
            Self::NotBetween => "NotBetween",
            Self::IsNull => "IsNull",
            Self::IsNotNull => "IsNotNull",
        }
    }

    #[must_use]
    pub fn arity(self) -> Arity {
        match self {
            Self::Between | Self::NotBetween => Arity::Two,
            Self::In | Self::NotIn | Self::IIn | Self::INotIn => Arity::Many,
            Self::IsNull | Self::IsNotNull => Arity::None,
            _ => Arity::One,
        }
    }

    /// The `I*` operators compare after case-folding both sides.
    #[must_use]
    pub fn is_case_insensitive(self) -> bool {
        matches!(
            self,
            Self::IEqual
                | Self::INotEqual
                | Self::IContains
                | Self::INotContains
                | Self::IStartsWith
                | Self::INotStartsWith
                | Self::IEndsWith
                | Self::INotEndsWith
                | Self::IIn
                | Self::INotIn
        )
    }

    #[must_use]
    pub fn is_pattern(self) -> bool {
        matches!(
            self,
            Self::Contains
                | Self::NotContains
                | Self::IContains
                | Self::INotContains
                | Self::StartsWith
                | Self::NotStartsWith
                | Self::IStartsWith
                | Self::INotStartsWith
                | Self::EndsWith
                | Self::NotEndsWith
                | Self::IEndsWith
                | Self::INotEndsWith
        )
    }

    #[must_use]
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::GreaterThan
                | Self::GreaterThanOrEqual
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::Between
                | Self::NotBetween
        )
    }

    /// Whether this operator can be applied to a field of `data_type`.
    #[must_use]
    pub fn supports(self, data_type: DataType) -> bool {
        if matches!(self, Self::IsNull | Self::IsNotNull | Self::Equal | Self::NotEqual) {
            return true;
        }
        match data_type {
            DataType::Text => !self.is_ordering(),
            DataType::Number | DataType::Date | DataType::DateTime => {
                !self.is_case_insensitive() && !self.is_pattern()
            }
            DataType::Guid => matches!(self, Self::In | Self::NotIn),
            DataType::Boolean => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connector {
    #[default]
    #[serde(alias = "AND", alias = "and")]
    And,
    #[serde(alias = "OR", alias = "or")]
    Or,
}

/// Set operator joining a condition set's result into the running fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combinator {
    Union,
    #[serde(alias = "Intersection")]
    Intersect,
    Except,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(alias = "Asc", alias = "asc")]
    Ascending,
    #[serde(alias = "Desc", alias = "desc")]
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default)]
    pub sort: i64,
    pub field: String,
    pub data_type: DataType,
    pub operator: Operator,
    #[serde(default)]
    pub values: Vec<String>,
}

impl Condition {
    pub fn new<I, S>(sort: i64, field: &str, data_type: DataType, operator: Operator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sort,
            field: field.to_owned(),
            data_type,
            operator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionGroup {
    #[serde(default)]
    pub sort: i64,
    #[serde(default)]
    pub connector: Connector,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, alias = "subgroups")]
    pub sub_condition_groups: Vec<ConditionGroup>,
}

impl ConditionGroup {
    #[must_use]
    pub fn new(sort: i64, connector: Connector) -> Self {
        Self { sort, connector, conditions: Vec::new(), sub_condition_groups: Vec::new() }
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn with_subgroup(mut self, group: ConditionGroup) -> Self {
        self.sub_condition_groups.push(group);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.sub_condition_groups.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSet {
    #[serde(default)]
    pub sort: i64,
    #[serde(default, alias = "combinator")]
    pub intersection: Option<Combinator>,
    #[serde(alias = "conditionGroup")]
    pub group: ConditionGroup,
}

impl ConditionSet {
    #[must_use]
    pub fn new(sort: i64, intersection: Option<Combinator>, group: ConditionGroup) -> Self {
        Self { sort, intersection, group }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSpec {
    #[serde(default)]
    pub sort: i64,
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    pub page_number: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(default, alias = "conditionSets")]
    pub sets: Vec<ConditionSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<OrderSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageSpec>,
}

impl Segment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_set(mut self, set: ConditionSet) -> Self {
        self.sets.push(set);
        self
    }

    #[must_use]
    pub fn order_by(mut self, sort: i64, field: &str, direction: Direction) -> Self {
        self.orders.get_or_insert_with(Vec::new).push(OrderSpec {
            sort,
            field: field.to_owned(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn paged(mut self, page_number: i64, page_size: i64) -> Self {
        self.page = Some(PageSpec { page_number, page_size });
        self
    }
}
