use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A `from`/`size` window over an ordered listing.
///
/// Callers address results by offset, but the window is resolved as a whole
/// page: page index is `from / size` and the listing is cut at
/// `index * size`. A `from` that is not a multiple of `size` therefore
/// snaps back to the start of its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub from: i64,
    pub size: i64,
}

impl Page {
    pub fn new(from: i64, size: i64) -> Result<Self, PageError> {
        if from < 0 {
            return Err(PageError::NegativeOffset(from));
        }
        if size <= 0 {
            return Err(PageError::NonPositiveSize(size));
        }
        Ok(Self { from, size })
    }

    /// Everything, in a single page.
    pub fn unbounded() -> Self {
        Self { from: 0, size: i64::MAX }
    }

    pub fn index(&self) -> i64 {
        self.from / self.size
    }

    pub fn offset(&self) -> i64 {
        self.index().saturating_mul(self.size)
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    /// Cut an already ordered, fully materialised listing down to this page.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit()).unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(limit).collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { from: 0, size: DEFAULT_PAGE_SIZE }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Parameter from must not be negative, got {0}")]
    NegativeOffset(i64),

    #[error("Parameter size must be positive, got {0}")]
    NonPositiveSize(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_index_uses_integer_division() {
        let page = Page::new(25, 10).unwrap();
        assert_eq!(page.index(), 2);
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn test_rejects_bad_window() {
        assert_eq!(Page::new(-1, 10), Err(PageError::NegativeOffset(-1)));
        assert_eq!(Page::new(0, 0), Err(PageError::NonPositiveSize(0)));
    }

    #[test]
    fn test_slice() {
        let items: Vec<i32> = (1..=7).collect();
        assert_eq!(Page::new(3, 3).unwrap().slice(items.clone()), vec![4, 5, 6]);
        assert_eq!(Page::new(4, 3).unwrap().slice(items.clone()), vec![4, 5, 6]);
        assert_eq!(Page::new(6, 3).unwrap().slice(items.clone()), vec![7]);
        assert_eq!(Page::unbounded().slice(items).len(), 7);
    }
}
