//! Review route definitions

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::review;
use crate::state::AppState;

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", post(review::create_review))
        .route("/api/reviews", get(review::get_all_reviews))
        .route("/api/reviews/job/:job_id", get(review::get_job_reviews))
        .route(
            "/api/reviews/freelancer/:id",
            get(review::get_freelancer_reviews),
        )
        .route("/api/reviews/:id", get(review::get_review_by_id))
        .route("/api/reviews/:id", put(review::update_review))
        .route("/api/reviews/:id", delete(review::delete_review))
}
