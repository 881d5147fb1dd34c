use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use tracing::{info, warn};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::models::review::{
    CreateReviewRequest, NewReview, Review, ReviewChanges, ReviewEnvelope, ReviewsEnvelope,
    UpdateReviewRequest,
};
use crate::error::{AppError, ErrorBody};
use crate::middleware::auth::{jwt_middleware, Claims};

/// Reads are public; writes go through the JWT middleware.
pub fn review_routes(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/reviews", get(get_all_reviews))
        .route("/reviews/{id}", get(get_review))
        .route("/reviews/users/{user}", get(get_reviews_for_user))
        .route("/reviews/items/{item}", get(get_reviews_for_item));

    let private_routes = Router::new()
        .route("/reviews", post(create_review))
        .route("/reviews/{id}", patch(update_review).delete(delete_review))
        .route_layer(from_fn_with_state(state, jwt_middleware));

    public_routes.merge(private_routes)
}

/// Malformed ids can never match a stored review.
fn parse_review_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::Validation(rejection.body_text())
}

#[utoipa::path(
    get,
    path = "/reviews",
    tag = "Reviews",
    responses(
        (status = 200, description = "All reviews", body = ReviewsEnvelope),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn get_all_reviews(
    State(state): State<AppState>,
) -> Result<Json<ReviewsEnvelope>, AppError> {
    let reviews = state.store.find_all().await?;
    Ok(Json(ReviewsEnvelope { reviews }))
}

#[utoipa::path(
    get,
    path = "/reviews/users/{user}",
    tag = "Reviews",
    params(
        ("user" = String, Path, description = "Id of the user whose reviews are listed"),
    ),
    responses(
        (status = 200, description = "Reviews owned by the user (possibly empty)", body = ReviewsEnvelope),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn get_reviews_for_user(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<ReviewsEnvelope>, AppError> {
    // a non-numeric id owns nothing
    let reviews = match user.parse::<i32>() {
        Ok(owner) => state.store.find_by_owner(owner).await?,
        Err(_) => Vec::new(),
    };
    Ok(Json(ReviewsEnvelope { reviews }))
}

#[utoipa::path(
    get,
    path = "/reviews/items/{item}",
    tag = "Reviews",
    params(
        ("item" = String, Path, description = "Menu item name"),
    ),
    responses(
        (status = 200, description = "Reviews of the item (possibly empty)", body = ReviewsEnvelope),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn get_reviews_for_item(
    State(state): State<AppState>,
    Path(item): Path<String>,
) -> Result<Json<ReviewsEnvelope>, AppError> {
    let reviews = state.store.find_by_item(&item).await?;
    Ok(Json(ReviewsEnvelope { reviews }))
}

#[utoipa::path(
    get,
    path = "/reviews/{id}",
    tag = "Reviews",
    params(
        ("id" = String, Path, description = "Id of the review being retrieved"),
    ),
    responses(
        (status = 200, description = "Review retrieved successfully", body = ReviewEnvelope),
        (status = 404, description = "Review not found"),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewEnvelope>, AppError> {
    let id = parse_review_id(&id)?;
    let review = state.store.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(ReviewEnvelope { review }))
}

#[utoipa::path(
    post,
    path = "/reviews",
    tag = "Reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewEnvelope),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 422, description = "Missing field or item not on the menu", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReviewEnvelope>), AppError> {
    let Json(CreateReviewRequest { review }) = payload.map_err(invalid_body)?;
    let owner = claims.user_id()?;

    let draft = review.into_draft(owner, claims.email).inspect_err(|e| {
        warn!(owner, "Rejected review: {e}");
    })?;

    let review = state.store.create(draft).await?;
    info!(review_id = %review.id, owner, item = %review.item, "Review created");

    Ok((StatusCode::CREATED, Json(ReviewEnvelope { review })))
}

#[utoipa::path(
    patch,
    path = "/reviews/{id}",
    tag = "Reviews",
    params(
        ("id" = String, Path, description = "Id of the review to be updated"),
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 204, description = "Review updated"),
        (status = 401, description = "Caller does not own the review", body = ErrorBody),
        (status = 404, description = "Review not found"),
        (status = 422, description = "Item not on the menu", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn update_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateReviewRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(UpdateReviewRequest { review }) = payload.map_err(invalid_body)?;
    let changes = review.strip_blanks();
    changes.validate()?;

    let id = parse_review_id(&id)?;
    let caller = claims.user_id()?;
    let existing = fetch_owned(&state, id, caller).await?;

    state
        .store
        .update(existing.id, &changes)
        .await?
        .ok_or(AppError::NotFound)?;
    info!(review_id = %id, owner = caller, "Review updated");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "Reviews",
    params(
        ("id" = String, Path, description = "Id of the review to be deleted"),
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Caller does not own the review", body = ErrorBody),
        (status = 404, description = "Review not found"),
        (status = 500, description = "Internal Server Error", body = ErrorBody)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_review_id(&id)?;
    let caller = claims.user_id()?;
    fetch_owned(&state, id, caller).await?;

    if !state.store.delete(id).await? {
        return Err(AppError::NotFound);
    }
    info!(review_id = %id, owner = caller, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Loads a review and checks that `caller` owns it, before any write.
async fn fetch_owned(state: &AppState, id: Uuid, caller: i32) -> Result<Review, AppError> {
    let review = state.store.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    review.require_owner(caller).inspect_err(|_| {
        warn!(review_id = %id, caller, owner = review.owner, "Ownership check failed");
    })?;
    Ok(review)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_all_reviews,
        get_reviews_for_user,
        get_reviews_for_item,
        get_review,
        create_review,
        update_review,
        delete_review,
    ),
    components(schemas(
        Review,
        NewReview,
        ReviewChanges,
        CreateReviewRequest,
        UpdateReviewRequest,
        ReviewEnvelope,
        ReviewsEnvelope,
        ErrorBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Reviews", description = "Reviews of menu items")
    )
)]
pub struct ReviewDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
