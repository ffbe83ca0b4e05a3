use serde::{Deserialize, Serialize};
use skillswap_database::{Conversation, ExchangeSession, Message, SearchPage, Session, Skill, User};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<i64>,
    /// Page size, 1 to 100.
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.filter(|page| *page >= 1).unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .map(|limit| limit.clamp(1, MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    PaginatedUsers = Paginated<User>,
    PaginatedSkills = Paginated<Skill>,
    PaginatedSessions = Paginated<Session>,
    PaginatedExchangeSessions = Paginated<ExchangeSession>,
    PaginatedConversations = Paginated<Conversation>,
    PaginatedMessages = Paginated<Message>
)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, query: PageQuery) -> Self {
        let limit = query.limit();
        Self {
            data,
            total,
            page: query.page(),
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }

    pub fn from_search(page: SearchPage<T>, query: PageQuery) -> Self {
        Self::new(page.items, page.total, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_or_invalid_values() {
        let query = PageQuery {
            page: Some(0),
            limit: None,
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn limit_is_clamped() {
        let query = PageQuery {
            page: Some(3),
            limit: Some(500),
        };
        assert_eq!(query.limit(), 100);
        assert_eq!(query.offset(), 200);
    }

    #[test]
    fn total_pages_rounds_up() {
        let query = PageQuery {
            page: Some(1),
            limit: Some(10),
        };
        let page = Paginated::new(vec![1, 2, 3], 21, query);
        assert_eq!(page.total_pages, 3);

        let empty: Paginated<i32> = Paginated::new(Vec::new(), 0, query);
        assert_eq!(empty.total_pages, 0);
    }
}
