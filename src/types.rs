/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// How a console is addressed inside a data source route.
/// `default` resolves to (and lazily creates) the data source's default console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleSelector {
    Id(i64),
    Default,
}

impl std::fmt::Display for ConsoleSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsoleSelector::Id(id) => write!(f, "{}", id),
            ConsoleSelector::Default => write!(f, "default"),
        }
    }
}

/// `?limit=&offset=` for list endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
}

pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 1000;

impl PageQuery {
    /// Clamped (limit, offset)
    pub fn resolve(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}
