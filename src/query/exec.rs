//! Segment execution: independent evaluation of each condition set against the
//! full source, a left-to-right set-algebra fold in sort order, then ordering
//! and paging of the combined result.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;
use uuid::Uuid;

use crate::errors::FilterError;
use crate::schema::{Record, Value};
use crate::utils::devlog;
use crate::utils::num::{f64_to_i128_exact, u128_to_u64_saturating, usize_to_u64};

use super::compile::{Compiler, ensure_unique_sort};
use super::eval::{resolve_field, sort_records};
use super::page::{PageWindow, PagedResult};
use super::predicate::{FieldRef, OrderKey, Predicate};
use super::source::{AsyncRecordSource, RecordSource};
use super::types::{Combinator, ConditionSet, Segment};

/// Cooperative cancellation flag, checked before each condition set is evaluated.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::SeqCst)
    }

    fn check(&self) -> Result<(), FilterError> {
        if self.is_cancelled() { Err(FilterError::Cancelled) } else { Ok(()) }
    }
}

/// Record identity used by the set operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Text(String),
    /// Whole numbers, whether stored as integers or whole floats.
    Integer(i128),
    Number(OrderedFloat<f64>),
    Bool(bool),
    Guid(Uuid),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

impl RecordKey {
    /// # Errors
    /// `FilterError::InvalidRecordKey` when the value is null, a list or a record.
    pub fn from_value(value: &Value<'_>) -> Result<Self, FilterError> {
        Ok(match value {
            Value::Text(s) => Self::Text(s.to_string()),
            Value::Integer(i) => Self::Integer(*i),
            Value::Number(n) => f64_to_i128_exact(*n).map_or(Self::Number(OrderedFloat(*n)), Self::Integer),
            Value::Bool(b) => Self::Bool(*b),
            Value::Guid(g) => Self::Guid(*g),
            Value::DateTime(d) => Self::DateTime(*d),
            Value::Date(d) => Self::Date(*d),
            other => return Err(FilterError::InvalidRecordKey(format!("{other:?}"))),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSet {
    pub sort: i64,
    /// `None` only for the first set.
    pub combinator: Option<Combinator>,
    pub predicate: Predicate,
}

/// A validated segment ready to run against any [`RecordSource`].
#[derive(Debug, Clone)]
pub struct CompiledSegment {
    sets: Vec<CompiledSet>,
    orders: Vec<OrderKey>,
    page: Option<PageWindow>,
    key: Option<FieldRef>,
}

impl Compiler<'_> {
    /// Validates segment-level invariants and compiles every set, ordering
    /// key and the page request.
    ///
    /// # Errors
    /// `SetsUniqueSort`, `RequiredIntersection`, any group compilation error,
    /// `InvalidField` for ordering paths, page errors, and `MissingRecordKey`
    /// when more than one set needs combining over a schema without a key.
    pub fn compile_segment(&self, segment: &Segment) -> Result<CompiledSegment, FilterError> {
        ensure_unique_sort(segment.sets.iter().map(|s| s.sort), || FilterError::SetsUniqueSort)?;
        let mut ordered: Vec<&ConditionSet> = segment.sets.iter().collect();
        ordered.sort_by_key(|s| s.sort);

        let mut combinators = Vec::with_capacity(ordered.len());
        for (i, set) in ordered.iter().enumerate() {
            if i == 0 {
                if let Some(c) = set.intersection {
                    log::debug!("discarding {c:?} on first condition set {}", set.sort);
                }
                combinators.push(None);
            } else {
                let c = set.intersection.ok_or(FilterError::RequiredIntersection { sort: set.sort })?;
                combinators.push(Some(c));
            }
        }

        let mut sets = Vec::with_capacity(ordered.len());
        for (set, combinator) in ordered.into_iter().zip(combinators) {
            sets.push(CompiledSet { sort: set.sort, combinator, predicate: self.compile_group(&set.group)? });
        }

        let mut order_specs: Vec<_> = segment.orders.iter().flatten().collect();
        order_specs.sort_by_key(|o| o.sort);
        let mut orders = Vec::with_capacity(order_specs.len());
        for spec in order_specs {
            let resolved = self.resolve(&spec.field)?;
            if resolved.is_existential() {
                return Err(FilterError::InvalidField(spec.field.clone()));
            }
            let path = resolved.segments.into_iter().map(|s| s.name).collect();
            orders.push(OrderKey { field: FieldRef::new(path), direction: spec.direction });
        }

        let page = segment
            .page
            .as_ref()
            .map(|p| PageWindow::from_spec(p, self.config().max_page_size))
            .transpose()?;

        let key = if sets.len() > 1 { Some(self.record_key_field()?) } else { None };
        Ok(CompiledSegment { sets, orders, page, key })
    }

    fn record_key_field(&self) -> Result<FieldRef, FilterError> {
        let schema = self.schema();
        let key = schema.key().ok_or_else(|| FilterError::MissingRecordKey(schema.name().to_owned()))?;
        let resolved = self.resolve(key)?;
        if resolved.is_existential() {
            return Err(FilterError::InvalidRecordKey(key.to_owned()));
        }
        Ok(FieldRef::new(resolved.segments.into_iter().map(|s| s.name).collect()))
    }
}

fn record_key<T: Record>(item: &T, key: &FieldRef) -> Result<RecordKey, FilterError> {
    RecordKey::from_value(&resolve_field(&Value::Record(item), key))
}

fn key_set<T: Record>(items: &[T], key: &FieldRef) -> Result<HashSet<RecordKey>, FilterError> {
    items.iter().map(|i| record_key(i, key)).collect()
}

impl CompiledSegment {
    #[must_use]
    pub fn sets(&self) -> &[CompiledSet] {
        &self.sets
    }

    #[must_use]
    pub fn orders(&self) -> &[OrderKey] {
        &self.orders
    }

    #[must_use]
    pub fn page(&self) -> Option<PageWindow> {
        self.page
    }

    /// Runs the segment, evaluating sets one after another in sort order.
    ///
    /// # Errors
    /// Source failures and record-key errors.
    pub fn execute<S: RecordSource>(&self, source: &S) -> Result<PagedResult<S::Item>, FilterError> {
        self.execute_cancellable(source, &Cancellation::default())
    }

    /// Like [`CompiledSegment::execute`], checking `cancel` before each set.
    ///
    /// # Errors
    /// `FilterError::Cancelled` once `cancel` is set, plus those of `execute`.
    pub fn execute_cancellable<S: RecordSource>(
        &self,
        source: &S,
        cancel: &Cancellation,
    ) -> Result<PagedResult<S::Item>, FilterError> {
        let start = Instant::now();
        if self.sets.is_empty() {
            cancel.check()?;
            let total = source.count(&Predicate::True)?;
            let (skip, take) = self.bounds(total);
            let data = source.window(&Predicate::True, &self.orders, skip, take)?;
            let result = PagedResult::new(self.page, total, data);
            self.log_run(start, &result);
            return Ok(result);
        }

        let mut subsets = Vec::with_capacity(self.sets.len());
        for set in &self.sets {
            cancel.check()?;
            let items = source.matching(&set.predicate)?;
            log::trace!("condition set {} matched {} records", set.sort, items.len());
            subsets.push(items);
        }
        let result = self.finish(self.fold(subsets)?);
        self.log_run(start, &result);
        Ok(result)
    }

    /// Evaluates the sets concurrently on scoped threads; the fold still runs
    /// in sort order.
    ///
    /// # Errors
    /// Same as [`CompiledSegment::execute_cancellable`]; a panicking worker is
    /// reported as `FilterError::Source`.
    pub fn execute_parallel<S>(&self, source: &S, cancel: &Cancellation) -> Result<PagedResult<S::Item>, FilterError>
    where
        S: RecordSource + Sync,
        S::Item: Send,
    {
        if self.sets.len() < 2 {
            return self.execute_cancellable(source, cancel);
        }
        let start = Instant::now();
        let subsets = std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .sets
                .iter()
                .map(|set| {
                    scope.spawn(move || {
                        cancel.check()?;
                        source.matching(&set.predicate)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|_| Err(FilterError::Source("condition set worker panicked".into()))))
                .collect::<Result<Vec<_>, FilterError>>()
        })?;
        let result = self.finish(self.fold(subsets)?);
        self.log_run(start, &result);
        Ok(result)
    }

    /// Async counterpart of [`CompiledSegment::execute_cancellable`]; sets are
    /// awaited one after another.
    ///
    /// # Errors
    /// Same as [`CompiledSegment::execute_cancellable`].
    pub async fn execute_async<S: AsyncRecordSource>(
        &self,
        source: &S,
        cancel: &Cancellation,
    ) -> Result<PagedResult<S::Item>, FilterError> {
        let start = Instant::now();
        let combined = if self.sets.is_empty() {
            cancel.check()?;
            source.matching(&Predicate::True).await?
        } else {
            let mut subsets = Vec::with_capacity(self.sets.len());
            for set in &self.sets {
                cancel.check()?;
                subsets.push(source.matching(&set.predicate).await?);
            }
            self.fold(subsets)?
        };
        let result = self.finish(combined);
        self.log_run(start, &result);
        Ok(result)
    }

    /// Folds per-set results left to right in sort order. Identity is the
    /// schema's record key; the running result keeps first-seen order.
    fn fold<T: Record>(&self, subsets: Vec<Vec<T>>) -> Result<Vec<T>, FilterError> {
        let mut pairs = self.sets.iter().zip(subsets);
        let Some((_, first)) = pairs.next() else {
            return Ok(Vec::new());
        };
        let Some(key) = &self.key else {
            return Ok(first);
        };

        let mut seen = HashSet::new();
        let mut running = Vec::with_capacity(first.len());
        for item in first {
            let k = record_key(&item, key)?;
            if seen.insert(k.clone()) {
                running.push((k, item));
            }
        }

        for (set, subset) in pairs {
            match set.combinator {
                Some(Combinator::Union) => {
                    for item in subset {
                        let k = record_key(&item, key)?;
                        if seen.insert(k.clone()) {
                            running.push((k, item));
                        }
                    }
                }
                Some(Combinator::Intersect) => {
                    let keys = key_set(&subset, key)?;
                    running.retain(|(k, _)| keys.contains(k));
                }
                Some(Combinator::Except) => {
                    let keys = key_set(&subset, key)?;
                    running.retain(|(k, _)| !keys.contains(k));
                }
                None => return Err(FilterError::RequiredIntersection { sort: set.sort }),
            }
            seen = running.iter().map(|(k, _)| k.clone()).collect();
            crate::devlog!("after condition set {}: {} records", set.sort, running.len());
        }
        Ok(running.into_iter().map(|(_, item)| item).collect())
    }

    fn bounds(&self, total: usize) -> (usize, usize) {
        self.page.map_or((0, total), |p| (p.skip(), p.take()))
    }

    fn finish<T: Record>(&self, mut combined: Vec<T>) -> PagedResult<T> {
        sort_records(&mut combined, &self.orders);
        let total = combined.len();
        let (skip, take) = self.bounds(total);
        let data = combined.into_iter().skip(skip).take(take).collect();
        PagedResult::new(self.page, total, data)
    }

    fn log_run<T>(&self, start: Instant, result: &PagedResult<T>) {
        devlog::bench(
            "segment",
            "execute",
            &[
                ("sets", usize_to_u64(self.sets.len())),
                ("duration_ms", u128_to_u64_saturating(start.elapsed().as_millis())),
                ("total_count", usize_to_u64(result.total_count)),
                ("result_count", usize_to_u64(result.data.len())),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keys_reject_non_scalars() {
        assert_eq!(RecordKey::from_value(&Value::Number(2.0)).unwrap(), RecordKey::Integer(2));
        assert_eq!(RecordKey::from_value(&Value::Number(2.5)).unwrap(), RecordKey::Number(OrderedFloat(2.5)));
        assert_ne!(
            RecordKey::from_value(&Value::Integer(9_007_199_254_740_992)).unwrap(),
            RecordKey::from_value(&Value::Integer(9_007_199_254_740_993)).unwrap()
        );
        assert_eq!(RecordKey::from_value(&Value::text("a")).unwrap(), RecordKey::Text("a".into()));
        assert!(RecordKey::from_value(&Value::Null).is_err());
        assert!(RecordKey::from_value(&Value::List(vec![])).is_err());
    }

    #[test]
    fn cancellation_is_shared_between_clones() {
        let c = Cancellation::new();
        let other = c.clone();
        assert!(c.check().is_ok());
        other.cancel();
        assert!(c.is_cancelled());
        assert!(matches!(c.check(), Err(FilterError::Cancelled)));
    }
}
