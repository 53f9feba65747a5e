use serde::Serialize;

use crate::errors::FilterError;
use crate::utils::num::{ceil_div, i64_to_usize};

use super::types::PageSpec;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_number: usize,
    pub page_size: usize,
}

impl PageWindow {
    /// Validates a page spec, clamping the size to `max_page_size` when set.
    ///
    /// # Errors
    /// `InvalidPageNumber` / `InvalidPageSize` for negative values.
    pub fn from_spec(spec: &PageSpec, max_page_size: Option<usize>) -> Result<Self, FilterError> {
        let page_number =
            i64_to_usize(spec.page_number).ok_or(FilterError::InvalidPageNumber(spec.page_number))?;
        let mut page_size =
            i64_to_usize(spec.page_size).ok_or(FilterError::InvalidPageSize(spec.page_size))?;
        if let Some(max) = max_page_size
            && page_size > max
        {
            log::warn!("page size {page_size} clamped to {max}");
            page_size = max;
        }
        Ok(Self { page_number, page_size })
    }

    /// Records to skip; page 0 behaves like page 1.
    #[must_use]
    pub fn skip(&self) -> usize {
        self.page_number.saturating_sub(1).saturating_mul(self.page_size)
    }

    #[must_use]
    pub fn take(&self) -> usize {
        self.page_size
    }
}

/// One page of a segment's result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub page_number: usize,
    pub page_size: usize,
    pub page_count: usize,
    /// Matching records after filtering, before paging.
    pub total_count: usize,
    pub data: Vec<T>,
}

impl<T> PagedResult<T> {
    pub(crate) fn new(page: Option<PageWindow>, total_count: usize, data: Vec<T>) -> Self {
        let (page_number, page_size) = page.map_or((1, total_count), |p| (p.page_number, p.page_size));
        Self { page_number, page_size, page_count: ceil_div(total_count, page_size), total_count, data }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            page_number: self.page_number,
            page_size: self.page_size,
            page_count: self.page_count,
            total_count: self.total_count,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

impl<T> IntoIterator for PagedResult<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_uses_one_based_pages() {
        let w = PageWindow::from_spec(&PageSpec { page_number: 3, page_size: 10 }, None).unwrap();
        assert_eq!(w.skip(), 20);
        assert_eq!(w.take(), 10);
        let zero = PageWindow::from_spec(&PageSpec { page_number: 0, page_size: 10 }, None).unwrap();
        assert_eq!(zero.skip(), 0);
    }

    #[test]
    fn negative_values_are_rejected() {
        let e = PageWindow::from_spec(&PageSpec { page_number: -1, page_size: 10 }, None).unwrap_err();
        assert_eq!(e.code(), "InvalidPageNumber");
        let e = PageWindow::from_spec(&PageSpec { page_number: 1, page_size: -5 }, None).unwrap_err();
        assert_eq!(e.code(), "InvalidPageSize");
    }

    #[test]
    fn page_size_is_clamped() {
        let w = PageWindow::from_spec(&PageSpec { page_number: 1, page_size: 500 }, Some(100)).unwrap();
        assert_eq!(w.page_size, 100);
    }

    #[test]
    fn page_count_rounds_up() {
        let w = PageWindow { page_number: 1, page_size: 4 };
        let r = PagedResult::new(Some(w), 10, vec![1, 2, 3, 4]);
        assert_eq!(r.page_count, 3);
        let all = PagedResult::new(None, 3, vec!['a', 'b', 'c']);
        assert_eq!((all.page_number, all.page_size, all.page_count), (1, 3, 1));
        let empty: PagedResult<u8> = PagedResult::new(None, 0, vec![]);
        assert_eq!(empty.page_count, 0);
    }
}
