//! Review HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::handlers::{AdminUser, AuthenticatedUser};
use crate::review::{CreateReviewRequest, Review, ReviewError, UpdateReviewRequest};
use crate::state::AppState;

impl From<ReviewError> for ApiError {
    fn from(e: ReviewError) -> Self {
        match e {
            ReviewError::NotFound => ApiError::NotFound("Review not found".to_string()),
            ReviewError::ContractNotFound => ApiError::NotFound("Contract not found".to_string()),
            ReviewError::ContractNotCompleted => ApiError::ValidationError(
                "Contract must be completed before it can be reviewed".to_string(),
            ),
            ReviewError::NotContractParty => ApiError::Forbidden(
                "Only the contract's client or freelancer may review it".to_string(),
            ),
            ReviewError::AlreadyReviewed => {
                ApiError::Conflict("You have already reviewed this contract".to_string())
            }
            ReviewError::NotAuthor => {
                ApiError::Forbidden("Only the review's author may do this".to_string())
            }
            ReviewError::InvalidRating => {
                ApiError::ValidationError("Rating must be between 1 and 5".to_string())
            }
            ReviewError::DatabaseError(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// POST /reviews - Review a completed contract
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    request.validate()?;

    let review = state
        .review_service
        .create_review(user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /reviews/job/:job_id - Reviews on a job
pub async fn get_job_reviews(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = state.review_service.get_job_reviews(job_id).await?;
    Ok(Json(reviews))
}

/// GET /reviews/:id - Fetch a single review
pub async fn get_review_by_id(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Review>, ApiError> {
    let review = state.review_service.get_review(id).await?;
    Ok(Json(review))
}

/// GET /reviews/freelancer/:id - Reviews received by a freelancer
pub async fn get_freelancer_reviews(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(freelancer_id): Path<Uuid>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = state
        .review_service
        .get_freelancer_reviews(freelancer_id)
        .await?;

    Ok(Json(reviews))
}

/// PUT /reviews/:id - Amend an own review
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<Review>, ApiError> {
    request.validate()?;

    let review = state
        .review_service
        .update_review(user.user_id, id, request)
        .await?;

    Ok(Json(review))
}

/// DELETE /reviews/:id - Delete an own review
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.review_service.delete_review(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /reviews - All reviews (admin dashboard)
pub async fn get_all_reviews(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = state.review_service.list_all().await?;
    Ok(Json(reviews))
}
