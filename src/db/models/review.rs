use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::menu::is_on_menu;

/// A stored review.
#[derive(Serialize, Debug, Clone, PartialEq, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub item: String,
    pub title: String,
    pub body: String,
    /// Id of the user who created the review. Never changes.
    pub owner: i32,
    /// Owner's email at creation time.
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create input. Fields are optional here so that a missing field is reported as a
/// validation failure instead of a deserialization rejection.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct NewReview {
    pub item: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Partial update input.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, ToSchema)]
pub struct ReviewChanges {
    pub item: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
}

/// A create request that passed validation, with the owner taken from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    pub item: String,
    pub title: String,
    pub body: String,
    pub owner: i32,
    pub owner_email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub review: NewReview,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub review: ReviewChanges,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ReviewEnvelope {
    pub review: Review,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ReviewsEnvelope {
    pub reviews: Vec<Review>,
}

impl NewReview {
    /// Checks required fields and menu membership, then attaches the owner.
    pub fn into_draft(self, owner: i32, owner_email: String) -> Result<ReviewDraft, AppError> {
        let item = required("item", self.item)?;
        let title = required("title", self.title)?;
        let body = required("body", self.body)?;
        ensure_on_menu(&item)?;

        Ok(ReviewDraft {
            item,
            title,
            body,
            owner,
            owner_email,
        })
    }
}

impl ReviewChanges {
    /// Drops empty-string fields so they count as "not provided".
    pub fn strip_blanks(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        Self {
            item: keep(self.item),
            title: keep(self.title),
            body: keep(self.body),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        match &self.item {
            Some(item) => ensure_on_menu(item),
            None => Ok(()),
        }
    }
}

impl Review {
    /// Fails with `NotOwner` unless `caller` created this review.
    pub fn require_owner(&self, caller: i32) -> Result<(), AppError> {
        if self.owner == caller {
            Ok(())
        } else {
            Err(AppError::NotOwner)
        }
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!(
            "Review validation failed: `{field}` is required"
        ))),
    }
}

fn ensure_on_menu(item: &str) -> Result<(), AppError> {
    if is_on_menu(item) {
        Ok(())
    } else {
        Err(AppError::Validation("That item isn't on the menu!".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_review(item: &str, title: &str, body: &str) -> NewReview {
        NewReview {
            item: Some(item.to_string()),
            title: Some(title.to_string()),
            body: Some(body.to_string()),
        }
    }

    fn stored(owner: i32) -> Review {
        let now = Utc::now();
        Review {
            id: Uuid::new_v4(),
            item: "Fries".into(),
            title: "Great".into(),
            body: "Loved it".into(),
            owner,
            owner_email: "owner@example.com".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn draft_takes_owner_from_caller() {
        let draft = new_review("Fries", "Great", "Loved it")
            .into_draft(7, "u7@example.com".into())
            .unwrap();
        assert_eq!(draft.owner, 7);
        assert_eq!(draft.owner_email, "u7@example.com");
        assert_eq!(draft.item, "Fries");
    }

    #[test]
    fn draft_rejects_item_off_menu() {
        let err = new_review("Caviar", "Great", "Loved it")
            .into_draft(7, "u7@example.com".into())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("menu")));
    }

    #[test]
    fn draft_rejects_missing_and_blank_fields() {
        let missing = NewReview {
            item: Some("Fries".into()),
            title: None,
            body: Some("x".into()),
        };
        assert!(matches!(
            missing.into_draft(1, "a@b.c".into()),
            Err(AppError::Validation(msg)) if msg.contains("title")
        ));

        let blank = new_review("Fries", "Great", "");
        assert!(matches!(
            blank.into_draft(1, "a@b.c".into()),
            Err(AppError::Validation(msg)) if msg.contains("body")
        ));
    }

    #[test]
    fn strip_blanks_removes_only_empty_strings() {
        let changes = ReviewChanges {
            item: Some(String::new()),
            title: Some("New title".into()),
            body: Some(String::new()),
        }
        .strip_blanks();

        assert_eq!(changes.item, None);
        assert_eq!(changes.title.as_deref(), Some("New title"));
        assert_eq!(changes.body, None);
    }

    #[test]
    fn changes_validate_item_only_when_present() {
        assert!(ReviewChanges::default().validate().is_ok());

        let off_menu = ReviewChanges {
            item: Some("Caviar".into()),
            ..Default::default()
        };
        assert!(matches!(off_menu.validate(), Err(AppError::Validation(_))));

        // a blank item is stripped before validation and never reaches the menu check
        let blank = ReviewChanges {
            item: Some(String::new()),
            ..Default::default()
        }
        .strip_blanks();
        assert!(blank.validate().is_ok());
        assert_eq!(blank, ReviewChanges::default());
    }

    #[test]
    fn changes_ignore_client_supplied_owner() {
        let request: UpdateReviewRequest =
            serde_json::from_str(r#"{"review":{"title":"t","owner":99}}"#).unwrap();
        assert_eq!(request.review.title.as_deref(), Some("t"));
    }

    #[test]
    fn require_owner_checks_caller() {
        let review = stored(3);
        assert!(review.require_owner(3).is_ok());
        assert!(matches!(review.require_owner(4), Err(AppError::NotOwner)));
    }

    #[test]
    fn review_serializes_camel_case() {
        let value = serde_json::to_value(stored(3)).unwrap();
        assert_eq!(value["ownerEmail"], "owner@example.com");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("rating").is_none());
    }
}
