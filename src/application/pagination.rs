//! Offset pagination over in-memory collections.

use serde::Serialize;

/// Upper bound for the `row` parameter.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalized 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    row: u32,
}

impl PageRequest {
    /// Both values are clamped to at least one; `row` is capped at [`MAX_PAGE_SIZE`].
    pub fn new(page: u32, row: u32) -> Self {
        Self {
            page: page.max(1),
            row: row.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn row(&self) -> u32 {
        self.row
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSlice<T> {
    pub list: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

impl<T> PageSlice<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageSlice<U> {
        PageSlice {
            list: self.list.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            has_more: self.has_more,
        }
    }

    /// Number of pages at the current page size.
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size.max(1) as usize)
    }
}

/// Slice `data` into the requested page.
///
/// Out-of-range pages produce an empty list rather than an error.
pub fn create_pagination_response<T: Clone>(data: &[T], page: u32, page_size: u32) -> PageSlice<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = data.len();

    let start = (page as usize - 1).saturating_mul(page_size as usize);
    let end = start.saturating_add(page_size as usize).min(total);
    let list = if start < total {
        data[start..end].to_vec()
    } else {
        Vec::new()
    };

    let has_more = (page as usize).saturating_mul(page_size as usize) < total;

    PageSlice {
        list,
        total,
        page,
        page_size,
        has_more,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_length_matches_formula() {
        let data: Vec<u32> = (0..23).collect();
        for page in 1..=5u32 {
            for size in 1..=12u32 {
                let slice = create_pagination_response(&data, page, size);
                let remaining = data.len() as i64 - ((page - 1) * size) as i64;
                let expected = remaining.clamp(0, size as i64) as usize;
                assert_eq!(slice.list.len(), expected, "page={page} size={size}");
                assert_eq!(slice.has_more, ((page * size) as usize) < data.len());
                assert_eq!(slice.total, 23);
            }
        }
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let data = vec!["a", "b", "c"];
        let slice = create_pagination_response(&data, 9, 2);
        assert!(slice.list.is_empty());
        assert!(!slice.has_more);
        assert_eq!(slice.total, 3);
    }

    #[test]
    fn second_page_picks_following_items() {
        let data = vec![1, 2, 3, 4, 5];
        let slice = create_pagination_response(&data, 2, 2);
        assert_eq!(slice.list, vec![3, 4]);
        assert!(slice.has_more);
        assert_eq!(slice.page_count(), 3);
        assert_eq!(create_pagination_response::<u8>(&[], 1, 10).page_count(), 0);
    }

    #[test]
    fn page_request_clamps_inputs() {
        let request = PageRequest::new(0, 0);
        assert_eq!((request.page(), request.row()), (1, 1));
        let request = PageRequest::new(3, 1_000);
        assert_eq!((request.page(), request.row()), (3, MAX_PAGE_SIZE));
    }
}
