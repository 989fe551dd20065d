//! Route handlers, one module per resource.

pub mod categories;
pub mod checkout;
pub mod health;
pub mod products;
pub mod report;

use serde::Deserialize;
use storefront_core::pagination::PageRequest;

/// `?page=&limit=` query parameters shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}
