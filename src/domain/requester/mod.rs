//! Requester (identity collaborator)
//!
//! Registration and credentials live elsewhere; the booking saga only needs
//! to know whether a requester id exists.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::DomainResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: i32,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait RequesterRepository: Send + Sync {
    async fn exists(&self, id: i32) -> DomainResult<bool>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Requester>>;

    /// Insert a requester with a caller-chosen id (seeding, imports)
    async fn save(&self, requester: Requester) -> DomainResult<()>;

    async fn count(&self) -> DomainResult<u64>;
}
