use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::review::{Review, ReviewChanges, ReviewDraft};
use crate::db::{ReviewStore, StoreError};

const REVIEW_COLUMNS: &str =
    "id, item, title, body, owner, owner_email, created_at, updated_at";

/// `reviews` table in PostgreSQL.
#[derive(Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Review>, StoreError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn find_by_owner(&self, owner: i32) -> Result<Vec<Review>, StoreError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE owner = $1 ORDER BY created_at, id"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn find_by_item(&self, item: &str) -> Result<Vec<Review>, StoreError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE item = $1 ORDER BY created_at, id"
        ))
        .bind(item)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, StoreError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn create(&self, draft: ReviewDraft) -> Result<Review, StoreError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (item, title, body, owner, owner_email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(draft.item)
        .bind(draft.title)
        .bind(draft.body)
        .bind(draft.owner)
        .bind(draft.owner_email)
        .fetch_one(&self.pool)
        .await?;
        Ok(review)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &ReviewChanges,
    ) -> Result<Option<Review>, StoreError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            UPDATE reviews
               SET item = COALESCE($2, item),
                   title = COALESCE($3, title),
                   body = COALESCE($4, body),
                   updated_at = NOW()
             WHERE id = $1
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.item.as_deref())
        .bind(changes.title.as_deref())
        .bind(changes.body.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn draft(item: &str, owner: i32) -> ReviewDraft {
        ReviewDraft {
            item: item.to_string(),
            title: "Great".to_string(),
            body: "Loved it".to_string(),
            owner,
            owner_email: format!("user{owner}@example.com"),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn postgres_create_update_find_delete(pool: PgPool) {
        let store = PgReviewStore::new(pool);
        store.ping().await.unwrap();

        let created = store.create(draft("Fries", 1)).await.unwrap();
        assert_eq!(created.item, "Fries");
        assert_eq!(created.owner, 1);
        assert_eq!(created.owner_email, "user1@example.com");
        assert_eq!(created.created_at, created.updated_at);

        tokio::time::sleep(Duration::from_millis(20)).await;

        let changes = ReviewChanges {
            title: Some("Even better".to_string()),
            ..Default::default()
        };
        let updated = store.update(created.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Even better");
        assert_eq!(updated.item, created.item);
        assert_eq!(updated.body, created.body);
        assert_eq!(updated.owner, created.owner);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        let found = store.find_by_id(created.id).await.unwrap();
        assert_eq!(found, Some(updated));

        assert!(store
            .update(Uuid::new_v4(), &changes)
            .await
            .unwrap()
            .is_none());

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert!(store.find_by_id(created.id).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn postgres_filters_by_owner_and_item(pool: PgPool) {
        let store = PgReviewStore::new(pool);
        let first = store.create(draft("Fries", 1)).await.unwrap();
        store.create(draft("Soda", 2)).await.unwrap();
        let third = store.create(draft("Fries", 2)).await.unwrap();

        let fries: Vec<_> = store
            .find_by_item("Fries")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(fries.len(), 2);
        assert!(fries.contains(&first.id) && fries.contains(&third.id));

        assert_eq!(store.find_by_owner(2).await.unwrap().len(), 2);
        assert!(store.find_by_owner(42).await.unwrap().is_empty());
        assert_eq!(store.find_all().await.unwrap().len(), 3);
    }
}
