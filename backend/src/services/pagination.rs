//! Page arithmetic shared by the list views.

use serde::Serialize;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: u32,
    pub num_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    #[serde(skip)]
    page_size: u32,
}

impl PageInfo {
    /// Resolve the requested page against `total` rows. Page 1 always exists,
    /// even for an empty list; any other page past the end is an error.
    ///
    /// `requested` is the raw `page` parameter: missing or blank means page 1,
    /// `last` means the final page, anything else must be a page number.
    pub fn resolve(total: i64, requested: Option<&str>, page_size: u32) -> Result<Self> {
        let page_size = page_size.max(1);
        let total = u64::try_from(total).unwrap_or(0);
        let num_pages = total.div_ceil(u64::from(page_size)).max(1);
        let num_pages = u32::try_from(num_pages).unwrap_or(u32::MAX);

        let number = match requested.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| AppError::InvalidPage(raw.to_string()))?,
        };
        if number == 0 || number > num_pages {
            return Err(AppError::InvalidPage(number.to_string()));
        }

        Ok(Self {
            number,
            num_pages,
            has_previous: number > 1,
            has_next: number < num_pages,
            page_size,
        })
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.page_size)
    }
}

/// Pagination block merged into every list context.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
    pub is_paginated: bool,
    pub page_obj: PageInfo,
}

impl From<PageInfo> for Pagination {
    fn from(page_obj: PageInfo) -> Self {
        Self {
            is_paginated: page_obj.num_pages > 1,
            page_obj,
        }
    }
}
