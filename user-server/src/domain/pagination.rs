use serde::Serialize;
use utoipa::ToSchema;

use super::error::DomainError;

pub(crate) const DEFAULT_PAGE: u32 = 1;
pub(crate) const DEFAULT_LIMIT: u32 = 10;
pub(crate) const MAX_LIMIT: u32 = 100;

/// Raw paging input as it arrives from the query string.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PageQuery {
    pub(crate) page: Option<u32>,
    pub(crate) limit: Option<u32>,
    pub(crate) offset: Option<u32>,
}

/// Resolved window over the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
}

impl PageQuery {
    /// Zero values fall back to defaults. An explicit offset wins over the one
    /// derived from `page`, and `page` is then re-derived from it.
    pub(crate) fn resolve(self) -> Result<Pagination, DomainError> {
        let page = self.page.filter(|page| *page > 0).unwrap_or(DEFAULT_PAGE);
        let limit = self.limit.filter(|limit| *limit > 0).unwrap_or(DEFAULT_LIMIT);
        if limit > MAX_LIMIT {
            return Err(DomainError::Validation {
                field: "limit",
                message: "must be 1..100",
            });
        }
        let (page, offset) = match self.offset {
            Some(offset) => (offset / limit + 1, offset),
            None => (page, (page - 1).saturating_mul(limit)),
        };

        Ok(Pagination {
            page,
            limit,
            offset,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageMeta {
    pub(crate) total: i64,
    pub(crate) current_page: u32,
    pub(crate) per_page: u32,
    pub(crate) last_page: i64,
    pub(crate) has_next_page: bool,
    pub(crate) has_prev_page: bool,
}

impl PageMeta {
    pub(crate) fn new(pagination: Pagination, total: i64) -> Self {
        let limit = i64::from(pagination.limit.max(1));
        let total = total.max(0);
        let last_page = (total + limit - 1) / limit;
        let offset = i64::from(pagination.offset);

        Self {
            total,
            current_page: pagination.page,
            per_page: pagination.limit,
            last_page,
            has_next_page: offset + limit < total,
            has_prev_page: offset > 0,
        }
    }
}
