//! Query DTOs - Query string parameters

use crate::entities::ExpenseCategory;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Cursor pagination for feeds and message lists
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PageQuery {
    #[serde(default)]
    pub before: Option<DateTime<Utc>>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PageQuery {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

/// Expense list/summary/export filter
/// Offset pagination for the admin listings
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct OffsetQuery {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl OffsetQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(PageQuery::DEFAULT_LIMIT)
            .clamp(1, PageQuery::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Expense filter, both dates inclusive
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct ExpenseQuery {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<ExpenseCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(PageQuery::default().limit(), 20);
        let q = PageQuery {
            before: None,
            limit: Some(1000),
        };
        assert_eq!(q.limit(), 100);
        let q = PageQuery {
            before: None,
            limit: Some(0),
        };
        assert_eq!(q.limit(), 1);
    }

    #[test]
    fn test_offset_never_negative() {
        let q = OffsetQuery {
            limit: None,
            offset: Some(-5),
        };
        assert_eq!(q.offset(), 0);
        assert_eq!(q.limit(), 20);
    }
}
