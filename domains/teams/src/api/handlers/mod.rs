//! HTTP handlers for the Teams domain

pub mod auth;
pub mod invitations;
pub mod members;
pub mod teams;

use serde::{Deserialize, Serialize};
use teamtact_common::{Page, PageQuery, Result};

use crate::repository::ListFilter;
use crate::MembershipRole;

/// `search`, `role`, `page` and `per_page` query parameters of list endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListQuery {
    /// Split into store filters and paging. An unknown role is a 422.
    pub fn into_parts(self) -> Result<(ListFilter, PageQuery)> {
        let role = self
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::parse::<MembershipRole>)
            .transpose()?;

        Ok((
            ListFilter {
                search: self.search,
                role,
            },
            PageQuery {
                page: self.page,
                per_page: self.per_page,
            },
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ListFilters {
    pub roles: Vec<MembershipRole>,
}

/// `data` of the list endpoints: the available filters plus one page
#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub filters: ListFilters,
    pub pagination: Page<T>,
}

impl<T> Listing<T> {
    pub fn new(roles: &[MembershipRole], pagination: Page<T>) -> Self {
        Self {
            filters: ListFilters {
                roles: roles.to_vec(),
            },
            pagination,
        }
    }
}
