use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::review::{Review, ReviewChanges, ReviewDraft};

pub mod memory;
pub mod models;
pub mod pool;
pub mod queries;

pub use memory::MemoryReviewStore;
pub use queries::review::PgReviewStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for reviews. The store assigns ids and timestamps.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_all(&self) -> Result<Vec<Review>, StoreError>;

    async fn find_by_owner(&self, owner: i32) -> Result<Vec<Review>, StoreError>;

    async fn find_by_item(&self, item: &str) -> Result<Vec<Review>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, StoreError>;

    async fn create(&self, draft: ReviewDraft) -> Result<Review, StoreError>;

    /// Applies the fields present in `changes`. Returns `None` if no review has `id`.
    async fn update(&self, id: Uuid, changes: &ReviewChanges)
        -> Result<Option<Review>, StoreError>;

    /// Returns `false` if no review has `id`.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
