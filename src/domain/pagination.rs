use crate::error::{AppError, Result};
use serde::Serialize;

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Builds a page request, applying `default_limit` when none is given.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` if `page` is zero or `limit` is outside `1..=max_limit`.
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32, max_limit: u32) -> Result<Self> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(default_limit);

        if page == 0 {
            return Err(AppError::BadRequest("page must be at least 1".into()));
        }
        if limit == 0 || limit > max_limit {
            return Err(AppError::BadRequest(format!("limit must be between 1 and {max_limit}")));
        }

        Ok(Self { page, limit })
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: u32,
    pub pages: i64,
}

impl Pagination {
    #[must_use]
    pub fn new(request: PageRequest, total: i64) -> Self {
        let limit = i64::from(request.limit);
        let pages = if total <= 0 { 0 } else { (total + limit - 1) / limit };
        Self { total, page: request.page, pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply() {
        let req = PageRequest::new(None, None, 30, 100).unwrap();
        assert_eq!(req, PageRequest { page: 1, limit: 30 });
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_offset() {
        let req = PageRequest::new(Some(3), Some(20), 30, 100).unwrap();
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(PageRequest::new(Some(0), None, 30, 100).is_err());
        assert!(PageRequest::new(None, Some(0), 30, 100).is_err());
        assert!(PageRequest::new(None, Some(101), 30, 100).is_err());
        assert!(PageRequest::new(None, Some(100), 30, 100).is_ok());
    }

    #[test]
    fn test_page_count_rounds_up() {
        let req = PageRequest { page: 1, limit: 30 };
        assert_eq!(Pagination::new(req, 0).pages, 0);
        assert_eq!(Pagination::new(req, 30).pages, 1);
        assert_eq!(Pagination::new(req, 31).pages, 2);
    }
}
