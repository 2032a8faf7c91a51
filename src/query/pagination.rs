use std::ops::Range;

use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::error::Error;

/// Window of rows to fetch. `limit: None` fetches everything from `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRequest {
    pub limit: Option<i64>,
    pub offset: i64,
}

impl PageRequest {
    pub fn unbounded() -> Self {
        PageRequest {
            limit: None,
            offset: 0,
        }
    }

    pub fn bounded(limit: i64, offset: i64) -> Self {
        PageRequest {
            limit: Some(limit),
            offset,
        }
    }
}

/// Navigation metadata for a page of results.
///
/// Only the three inputs are stored; everything else is derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    page: i64,
    per_page: i64,
    total: i64,
}

impl PaginationState {
    /// `page` is not checked against the page count: a page past the end is
    /// valid and simply has no rows.
    pub fn new(page: i64, per_page: i64, total: i64) -> Result<Self, Error> {
        if per_page <= 0 {
            return Err(Error::InvalidArgument(format!(
                "per_page must be positive, got {}",
                per_page
            )));
        }
        if page < 1 {
            return Err(Error::InvalidArgument(format!(
                "page must be at least 1, got {}",
                page
            )));
        }
        if total < 0 {
            return Err(Error::InvalidArgument(format!(
                "total must not be negative, got {}",
                total
            )));
        }

        Ok(PaginationState {
            page,
            per_page,
            total,
        })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn total_pages(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.total - 1) / self.per_page + 1
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn prev_num(&self) -> Option<i64> {
        self.has_prev().then(|| self.page - 1)
    }

    pub fn next_num(&self) -> Option<i64> {
        self.has_next().then(|| self.page + 1)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::bounded(self.per_page, self.offset())
    }

    /// Two pages before the current one and three after, clipped.
    pub fn iter_pages(&self) -> Range<i64> {
        let start = (self.page - 2).max(1);
        let end = (self.total_pages() + 1).min(self.page.saturating_add(3));
        start..end
    }
}

impl Serialize for PaginationState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("PaginationState", 10)?;
        state.serialize_field("page", &self.page)?;
        state.serialize_field("per_page", &self.per_page)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("pages", &self.total_pages())?;
        state.serialize_field("has_prev", &self.has_prev())?;
        state.serialize_field("has_next", &self.has_next())?;
        state.serialize_field("prev_num", &self.prev_num())?;
        state.serialize_field("next_num", &self.next_num())?;
        state.serialize_field("offset", &self.offset())?;
        state.serialize_field("page_window", &self.iter_pages().collect::<Vec<_>>())?;
        state.end()
    }
}
