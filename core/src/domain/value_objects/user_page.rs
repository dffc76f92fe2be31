//! Paging through registered users

use crate::domain::entities::User;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// One page request of the user listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    /// 1-indexed page number
    pub page: u32,

    pub page_size: u32,

    /// Only users whose mobile number starts with these digits
    pub mobile_prefix: Option<String>,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            mobile_prefix: None,
        }
    }
}

impl UserQuery {
    /// Build a query, clamping the page to at least 1 and the page size to
    /// `1..=MAX_PAGE_SIZE`. An empty prefix means no filter.
    pub fn new(page: u32, page_size: u32, mobile_prefix: Option<String>) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            mobile_prefix: mobile_prefix.filter(|prefix| !prefix.is_empty()),
        }
    }

    /// Rows skipped before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    pub fn matches(&self, mobile_number: &str) -> bool {
        self.mobile_prefix
            .as_deref()
            .map_or(true, |prefix| mobile_number.starts_with(prefix))
    }
}

/// One page of users ordered by id, with the count of all matching users
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl UserPage {
    pub fn new(users: Vec<User>, total: u64, query: &UserQuery) -> Self {
        Self {
            users,
            total,
            page: query.page,
            page_size: query.page_size,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.page_size.max(1)))
    }
}
