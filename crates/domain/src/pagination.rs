//! Pagination options, page results, and the reference `paginate` algorithm.

use account_client_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Page sizes the service accepts.
pub const ALLOWED_PAGE_LIMITS: [u32; 5] = [10, 25, 50, 100, 150];

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_LIMIT: u32 = 25;

/// Highest page number the service accepts.
pub const MAX_PAGE: u32 = 9999;

/// Returns true when `limit` is an accepted page size.
#[must_use]
pub fn is_allowed_limit(limit: u32) -> bool {
    ALLOWED_PAGE_LIMITS.contains(&limit)
}

/// Caller pagination request; absent keys are defaulted during validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationOptions {
    /// 1-based page number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Records skipped before paging starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PaginationOptions {
    /// Options with every key absent.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            page: None,
            offset: None,
            limit: None,
        }
    }

    /// Set the page.
    #[must_use]
    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set the limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One page of results. Built once per remote call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    docs: Vec<T>,
    total: u64,
    limit: u32,
    page: u32,
    pages: u32,
    offset: u64,
}

impl<T> Page<T> {
    /// Assemble a page.
    #[must_use]
    pub const fn new(docs: Vec<T>, total: u64, limit: u32, page: u32, pages: u32, offset: u64) -> Self {
        Self {
            docs,
            total,
            limit,
            page,
            pages,
            offset,
        }
    }

    /// Documents on this page.
    #[must_use]
    pub fn docs(&self) -> &[T] {
        &self.docs
    }

    /// Consume the page, keeping the documents.
    #[must_use]
    pub fn into_docs(self) -> Vec<T> {
        self.docs
    }

    /// Matching records after the offset.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page count.
    #[must_use]
    pub const fn pages(&self) -> u32 {
        self.pages
    }

    /// Records skipped before paging.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns true when a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.pages
    }

    /// Transform the documents, keeping the counters.
    #[must_use]
    pub fn map<U>(self, op: impl FnMut(T) -> U) -> Page<U> {
        Page {
            docs: self.docs.into_iter().map(op).collect(),
            total: self.total,
            limit: self.limit,
            page: self.page,
            pages: self.pages,
            offset: self.offset,
        }
    }
}

/// Failure of the reference pagination algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationError {
    /// Offset lies past the end of the data.
    OffsetOutOfRange {
        /// Requested offset.
        offset: u64,
        /// Data length.
        len: usize,
    },
}

impl fmt::Display for PaginationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OffsetOutOfRange { .. } => formatter.write_str("Offset out of data size."),
        }
    }
}

impl std::error::Error for PaginationError {}

impl From<PaginationError> for ErrorEnvelope {
    fn from(error: PaginationError) -> Self {
        match error {
            PaginationError::OffsetOutOfRange { offset, len } => Self::expected(
                ErrorCode::new("domain", "offset_out_of_range"),
                error.to_string(),
            )
            .with_metadata("offset", offset.to_string())
            .with_metadata("len", len.to_string()),
        }
    }
}

/// Slice already-filtered `data` into one page.
///
/// Absent options fall back to `page = 1`, `limit = 0` (everything on one
/// page) and `offset = 0`.
pub fn paginate<T: Clone>(
    data: &[T],
    options: &PaginationOptions,
) -> Result<Page<T>, PaginationError> {
    let page = options.page.filter(|page| *page > 0).unwrap_or(1);
    let limit = options.limit.unwrap_or(0);
    let offset = options.offset.unwrap_or(0);

    let skip = usize::try_from(offset).unwrap_or(usize::MAX);
    let Some(windowed) = data.get(skip..) else {
        return Err(PaginationError::OffsetOutOfRange {
            offset,
            len: data.len(),
        });
    };

    let total = windowed.len();
    let per_page = limit as usize;
    let pages = if per_page == 0 || per_page >= total {
        1
    } else {
        total.div_ceil(per_page)
    };

    let start = per_page.saturating_mul((page - 1) as usize);
    let end = if per_page > 0 {
        start.saturating_add(per_page)
    } else {
        total
    };
    let docs = windowed
        .get(start.min(total)..end.min(total))
        .map(<[T]>::to_vec)
        .unwrap_or_default();

    Ok(Page::new(
        docs,
        total as u64,
        limit,
        page,
        u32::try_from(pages).unwrap_or(u32::MAX),
        offset,
    ))
}
