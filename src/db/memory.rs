use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::models::review::{Review, ReviewChanges, ReviewDraft};
use crate::db::{ReviewStore, StoreError};

/// In-process review store. Keeps reviews in creation order.
#[derive(Default)]
pub struct MemoryReviewStore {
    reviews: Mutex<Vec<Review>>,
    unavailable: AtomicBool,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Relaxed) {
            Err(StoreError::Unavailable("memory store marked unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    async fn filtered(&self, keep: impl Fn(&Review) -> bool) -> Result<Vec<Review>, StoreError> {
        self.check()?;
        let reviews = self.reviews.lock().await;
        Ok(reviews.iter().filter(|r| keep(r)).cloned().collect())
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }

    async fn find_all(&self) -> Result<Vec<Review>, StoreError> {
        self.filtered(|_| true).await
    }

    async fn find_by_owner(&self, owner: i32) -> Result<Vec<Review>, StoreError> {
        self.filtered(|r| r.owner == owner).await
    }

    async fn find_by_item(&self, item: &str) -> Result<Vec<Review>, StoreError> {
        self.filtered(|r| r.item == item).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, StoreError> {
        self.check()?;
        let reviews = self.reviews.lock().await;
        Ok(reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, draft: ReviewDraft) -> Result<Review, StoreError> {
        self.check()?;
        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4(),
            item: draft.item,
            title: draft.title,
            body: draft.body,
            owner: draft.owner,
            owner_email: draft.owner_email,
            created_at: now,
            updated_at: now,
        };
        self.reviews.lock().await.push(review.clone());
        Ok(review)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &ReviewChanges,
    ) -> Result<Option<Review>, StoreError> {
        self.check()?;
        let mut reviews = self.reviews.lock().await;
        let Some(review) = reviews.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(item) = &changes.item {
            review.item = item.clone();
        }
        if let Some(title) = &changes.title {
            review.title = title.clone();
        }
        if let Some(body) = &changes.body {
            review.body = body.clone();
        }
        review.updated_at = Utc::now();
        Ok(Some(review.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check()?;
        let mut reviews = self.reviews.lock().await;
        let before = reviews.len();
        reviews.retain(|r| r.id != id);
        Ok(reviews.len() < before)
    }
}
