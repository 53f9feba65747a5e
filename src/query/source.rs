//! The backing-store seam: anything that can return the records matching a
//! compiled predicate.

use std::future::Future;

use crate::errors::FilterError;
use crate::schema::Record;

use super::eval::sort_records;
use super::predicate::{OrderKey, Predicate};

/// Synchronous record store.
///
/// Only `matching` is required; `count` and `window` fall back to
/// materializing the matches, and stores that can push ordering or counting
/// down should override them.
pub trait RecordSource {
    type Item: Record + Clone;

    /// # Errors
    /// Store-specific failures, reported as `FilterError::Source`.
    fn matching(&self, predicate: &Predicate) -> Result<Vec<Self::Item>, FilterError>;

    /// # Errors
    /// See [`RecordSource::matching`].
    fn count(&self, predicate: &Predicate) -> Result<usize, FilterError> {
        Ok(self.matching(predicate)?.len())
    }

    /// Matches ordered by `order`, then `skip`/`take` applied.
    ///
    /// # Errors
    /// See [`RecordSource::matching`].
    fn window(
        &self,
        predicate: &Predicate,
        order: &[OrderKey],
        skip: usize,
        take: usize,
    ) -> Result<Vec<Self::Item>, FilterError> {
        let mut items = self.matching(predicate)?;
        sort_records(&mut items, order);
        Ok(items.into_iter().skip(skip).take(take).collect())
    }
}

/// Asynchronous record store, for remote or queryable backends.
pub trait AsyncRecordSource {
    type Item: Record + Clone;

    fn matching(&self, predicate: &Predicate) -> impl Future<Output = Result<Vec<Self::Item>, FilterError>>;
}

/// In-memory source over a borrowed slice; results borrow from the slice.
#[derive(Debug, Clone, Copy)]
pub struct MemorySource<'a, T> {
    items: &'a [T],
}

impl<'a, T: Record> MemorySource<'a, T> {
    #[must_use]
    pub fn new(items: &'a [T]) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T: Record> RecordSource for MemorySource<'a, T> {
    type Item = &'a T;

    fn matching(&self, predicate: &Predicate) -> Result<Vec<&'a T>, FilterError> {
        Ok(self.items.iter().filter(|r| predicate.matches(*r)).collect())
    }

    fn count(&self, predicate: &Predicate) -> Result<usize, FilterError> {
        if predicate.is_true() {
            return Ok(self.items.len());
        }
        Ok(self.items.iter().filter(|r| predicate.matches(*r)).count())
    }
}

impl<'a, T: Record> AsyncRecordSource for MemorySource<'a, T> {
    type Item = &'a T;

    fn matching(&self, predicate: &Predicate) -> impl Future<Output = Result<Vec<&'a T>, FilterError>> {
        std::future::ready(RecordSource::matching(self, predicate))
    }
}
