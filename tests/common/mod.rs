#![allow(dead_code)]

use std::sync::Arc;

use filterspec::query::{Combinator, Condition, ConditionGroup, ConditionSet, Connector, DataType, Operator};
use filterspec::schema::{FieldType, Record, Schema, Value};
use serde_json::{Value as Json, json};

pub fn tag_schema() -> Arc<Schema> {
    Schema::builder("Tag").text("Name").number("Weight").build()
}

pub fn employee_schema() -> Arc<Schema> {
    let dept = Schema::builder("Department").text("Name").text("Code").build();
    Schema::builder("Employee")
        .number("Id")
        .text("Name")
        .number("Salary")
        .boolean("Active")
        .date("HiredOn")
        .datetime("UpdatedAt")
        .guid("Uid")
        .record("Department", dept)
        .list("Tags", FieldType::Record(tag_schema()))
        .list("Scores", FieldType::Scalar(DataType::Number))
        .list("Matrix", FieldType::list(FieldType::Scalar(DataType::Number)))
        .key("Id")
        .build()
}

pub fn employees() -> Vec<Json> {
    vec![
        json!({
            "Id": 1, "Name": "Alice", "Salary": 5, "Active": true,
            "HiredOn": "2020-01-15", "UpdatedAt": "2024-05-01T08:00:00Z",
            "Uid": "6f1c2a8e-0000-4000-8000-000000000001",
            "Department": {"Name": "Sales", "Code": "S1"},
            "Tags": [{"Name": "remote", "Weight": 1}, {"Name": "lead", "Weight": 3}],
            "Scores": [1, 2, 3],
            "Matrix": [[1, 2], [3]]
        }),
        json!({
            "Id": 2, "Name": "bob", "Salary": 15, "Active": false,
            "HiredOn": "2021-06-30", "UpdatedAt": "2024-05-02T09:30:00Z",
            "Uid": "6f1c2a8e-0000-4000-8000-000000000002",
            "Department": {"Name": "Engineering", "Code": "E1"},
            "Tags": [{"Name": "onsite", "Weight": 2}],
            "Scores": [],
            "Matrix": [[7]]
        }),
        json!({
            "Id": 3, "Name": "Carol 100%", "Salary": -5, "Active": true,
            "HiredOn": "2019-11-01", "UpdatedAt": null,
            "Uid": "6f1c2a8e-0000-4000-8000-000000000003",
            "Department": null,
            "Tags": [],
            "Scores": [10],
            "Matrix": []
        }),
        json!({
            "Id": 4, "Name": null, "Salary": null, "Active": null,
            "HiredOn": null, "UpdatedAt": null,
            "Uid": null,
            "Department": {"Name": "Sales", "Code": null},
            "Tags": [{"Name": null, "Weight": null}],
            "Scores": null,
            "Matrix": null
        }),
    ]
}

pub fn ids<R: Record>(records: &[R]) -> Vec<f64> {
    records.iter().filter_map(|r| r.field("Id").as_number()).collect()
}

pub fn cond(sort: i64, field: &str, data_type: DataType, operator: Operator, values: &[&str]) -> Condition {
    Condition::new(sort, field, data_type, operator, values.iter().copied())
}

pub fn group(sort: i64, connector: Connector, conditions: Vec<Condition>) -> ConditionGroup {
    conditions.into_iter().fold(ConditionGroup::new(sort, connector), ConditionGroup::with_condition)
}

pub fn set(sort: i64, intersection: Option<Combinator>, condition: Condition) -> ConditionSet {
    ConditionSet::new(sort, intersection, group(1, Connector::And, vec![condition]))
}

/// A typed record implementing [`Record`] by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub sku: String,
    pub name: Option<String>,
    pub price: f64,
    pub labels: Vec<String>,
}

impl Record for Product {
    fn field(&self, name: &str) -> Value<'_> {
        match name {
            "Sku" => Value::text(self.sku.as_str()),
            "Name" => self.name.as_deref().map_or(Value::Null, |n| Value::text(n)),
            "Price" => Value::Number(self.price),
            "Labels" => Value::List(self.labels.iter().map(|l| Value::text(l.as_str())).collect()),
            _ => Value::Null,
        }
    }
}

pub fn product_schema() -> Arc<Schema> {
    Schema::builder("Product")
        .text("Sku")
        .text("Name")
        .number("Price")
        .list("Labels", FieldType::Scalar(DataType::Text))
        .key("Sku")
        .build()
}

pub fn products() -> Vec<Product> {
    vec![
        Product { sku: "A-1".into(), name: Some("Widget".into()), price: 9.5, labels: vec!["new".into()] },
        Product { sku: "B-2".into(), name: Some("gadget_pro".into()), price: 25.0, labels: vec![] },
        Product { sku: "C-3".into(), name: None, price: 3.0, labels: vec!["sale".into(), "new".into()] },
    ]
}
