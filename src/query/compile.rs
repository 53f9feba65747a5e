use std::collections::HashSet;

use crate::config::CompilerConfig;
use crate::errors::FilterError;
use crate::schema::Schema;

use super::builder::build_condition;
use super::path::{ResolvedPath, resolve_path};
use super::predicate::Predicate;
use super::types::{Condition, ConditionGroup, Connector};
use super::validate::validate_condition;

/// Fails with `err` if any sort value repeats.
pub(crate) fn ensure_unique_sort(
    sorts: impl IntoIterator<Item = i64>,
    err: impl FnOnce() -> FilterError,
) -> Result<(), FilterError> {
    let mut seen = HashSet::new();
    if sorts.into_iter().all(|s| seen.insert(s)) { Ok(()) } else { Err(err()) }
}

/// Compiles filter input against one root schema.
///
/// Compilation is pure: caller input is never modified and nothing is retained
/// between calls.
#[derive(Debug, Clone)]
pub struct Compiler<'s> {
    schema: &'s Schema,
    config: CompilerConfig,
}

impl<'s> Compiler<'s> {
    #[must_use]
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema, config: CompilerConfig::default() }
    }

    #[must_use]
    pub fn with_config(schema: &'s Schema, config: CompilerConfig) -> Self {
        Self { schema, config }
    }

    #[must_use]
    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    #[must_use]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// # Errors
    /// `FilterError::InvalidField` for unknown or empty paths.
    pub fn resolve(&self, path: &str) -> Result<ResolvedPath, FilterError> {
        resolve_path(self.schema, path)
    }

    /// Returns a copy of `condition` with its field path in schema casing.
    ///
    /// # Errors
    /// `FilterError::InvalidField` for unknown or empty paths.
    pub fn normalize_condition(&self, condition: &Condition) -> Result<Condition, FilterError> {
        let resolved = self.resolve(&condition.field)?;
        Ok(Condition { field: resolved.canonical(), ..condition.clone() })
    }

    /// Resolves, validates and builds a single condition.
    ///
    /// # Errors
    /// Any field, arity or format violation of the condition.
    pub fn compile_condition(&self, condition: &Condition) -> Result<Predicate, FilterError> {
        let resolved = self.resolve(&condition.field)?;
        let literals = validate_condition(condition, self.config.max_in_values)?;
        build_condition(condition, &resolved, literals)
    }

    /// Compiles a group tree. A group with nothing in it matches every record.
    ///
    /// # Errors
    /// The first violation found anywhere in the tree; no partial result is produced.
    pub fn compile_group(&self, group: &ConditionGroup) -> Result<Predicate, FilterError> {
        Ok(self.compile_group_at(group, 1)?.unwrap_or(Predicate::True))
    }

    fn compile_group_at(&self, group: &ConditionGroup, depth: usize) -> Result<Option<Predicate>, FilterError> {
        if depth > self.config.max_group_depth {
            return Err(FilterError::NestingTooDeep(self.config.max_group_depth));
        }
        ensure_unique_sort(group.conditions.iter().map(|c| c.sort), || FilterError::ConditionsUniqueSort)?;
        ensure_unique_sort(group.sub_condition_groups.iter().map(|g| g.sort), || {
            FilterError::SubConditionsGroupsUniqueSort
        })?;

        let mut conditions: Vec<&Condition> = group.conditions.iter().collect();
        conditions.sort_by_key(|c| c.sort);
        let mut subgroups: Vec<&ConditionGroup> = group.sub_condition_groups.iter().collect();
        subgroups.sort_by_key(|g| g.sort);

        let mut fragments = Vec::with_capacity(conditions.len() + subgroups.len());
        for condition in conditions {
            fragments.push(self.compile_condition(condition)?);
        }
        for sub in subgroups {
            if let Some(p) = self.compile_group_at(sub, depth + 1)? {
                fragments.push(p);
            }
        }

        if fragments.is_empty() {
            log::debug!("condition group {} at depth {depth} is empty", group.sort);
            return Ok(None);
        }
        Ok(Some(match group.connector {
            Connector::And => Predicate::and(fragments),
            Connector::Or => Predicate::or(fragments),
        }))
    }
}
