mod common;

use common::*;
use filterspec::query::{Compiler, ConditionGroup, Connector, DataType, Operator, Predicate};
use filterspec::{CompilerConfig, FilterError};

fn hits(group: &ConditionGroup) -> Vec<f64> {
    let schema = employee_schema();
    let p = Compiler::new(&schema).compile_group(group).unwrap();
    let rows = employees();
    let matched: Vec<_> = rows.iter().filter(|r| p.matches(*r)).collect();
    ids(&matched)
}

#[test]
fn empty_group_matches_everything() {
    let schema = employee_schema();
    let p = Compiler::new(&schema).compile_group(&ConditionGroup::new(1, Connector::Or)).unwrap();
    assert_eq!(p, Predicate::True);
    assert_eq!(hits(&ConditionGroup::new(1, Connector::And)), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn empty_subgroups_are_dropped() {
    let g = group(1, Connector::Or, vec![cond(1, "Salary", DataType::Number, Operator::GreaterThan, &["10"])])
        .with_subgroup(ConditionGroup::new(1, Connector::And))
        .with_subgroup(ConditionGroup::new(2, Connector::Or).with_subgroup(ConditionGroup::new(1, Connector::And)));
    // an empty OR branch must not turn into "match all"
    assert_eq!(hits(&g), vec![2.0]);
}

#[test]
fn connectors_combine_fragments() {
    let and = group(
        1,
        Connector::And,
        vec![
            cond(1, "Active", DataType::Boolean, Operator::Equal, &["true"]),
            cond(2, "Salary", DataType::Number, Operator::GreaterThan, &["0"]),
        ],
    );
    assert_eq!(hits(&and), vec![1.0]);

    let or = ConditionGroup { connector: Connector::Or, ..and };
    assert_eq!(hits(&or), vec![1.0, 2.0, 3.0]);
}

#[test]
fn nested_groups() {
    // Active AND (Salary < 0 OR Tags.Name = 'lead')
    let inner = group(
        1,
        Connector::Or,
        vec![
            cond(1, "Salary", DataType::Number, Operator::LessThan, &["0"]),
            cond(2, "Tags.Name", DataType::Text, Operator::Equal, &["lead"]),
        ],
    );
    let g = group(1, Connector::And, vec![cond(1, "Active", DataType::Boolean, Operator::Equal, &["true"])])
        .with_subgroup(inner);
    assert_eq!(hits(&g), vec![1.0, 3.0]);
}

#[test]
fn fragments_follow_sort_order() {
    let schema = employee_schema();
    let g = group(
        1,
        Connector::And,
        vec![
            cond(2, "Name", DataType::Text, Operator::IsNotNull, &[]),
            cond(1, "Salary", DataType::Number, Operator::IsNull, &[]),
        ],
    );
    let p = Compiler::new(&schema).compile_group(&g).unwrap();
    assert_eq!(p.to_string(), "(Salary IS NULL AND Name IS NOT NULL)");
}

#[test]
fn duplicate_sorts_are_rejected() {
    let schema = employee_schema();
    let c = Compiler::new(&schema);
    let g = group(
        1,
        Connector::And,
        vec![
            cond(1, "Name", DataType::Text, Operator::IsNull, &[]),
            cond(1, "Salary", DataType::Number, Operator::IsNull, &[]),
        ],
    );
    assert!(matches!(c.compile_group(&g), Err(FilterError::ConditionsUniqueSort)));

    let g = ConditionGroup::new(1, Connector::And)
        .with_subgroup(ConditionGroup::new(3, Connector::And))
        .with_subgroup(ConditionGroup::new(3, Connector::Or));
    assert!(matches!(c.compile_group(&g), Err(FilterError::SubConditionsGroupsUniqueSort)));

    // same sort as the parent is fine
    let g = group(1, Connector::And, vec![cond(1, "Name", DataType::Text, Operator::IsNull, &[])])
        .with_subgroup(group(1, Connector::And, vec![cond(1, "Salary", DataType::Number, Operator::IsNull, &[])]));
    assert!(c.compile_group(&g).is_ok());
}

#[test]
fn errors_deep_in_the_tree_fail_the_whole_group() {
    let schema = employee_schema();
    let g = ConditionGroup::new(1, Connector::Or).with_subgroup(
        ConditionGroup::new(1, Connector::And)
            .with_subgroup(group(1, Connector::And, vec![cond(1, "Missing", DataType::Text, Operator::IsNull, &[])])),
    );
    let e = Compiler::new(&schema).compile_group(&g).unwrap_err();
    assert!(matches!(e, FilterError::InvalidField(ref f) if f == "Missing"));
}

#[test]
fn nesting_depth_is_bounded() {
    let schema = employee_schema();
    let cfg = CompilerConfig { max_group_depth: 3, ..CompilerConfig::default() };
    let c = Compiler::with_config(&schema, cfg);
    let leaf = group(1, Connector::And, vec![cond(1, "Name", DataType::Text, Operator::IsNull, &[])]);
    let three = ConditionGroup::new(1, Connector::And)
        .with_subgroup(ConditionGroup::new(1, Connector::And).with_subgroup(leaf.clone()));
    assert!(c.compile_group(&three).is_ok());
    let four = ConditionGroup::new(1, Connector::And).with_subgroup(three);
    assert!(matches!(c.compile_group(&four), Err(FilterError::NestingTooDeep(3))));
}
