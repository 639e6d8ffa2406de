//! Review service layer

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::contract::{Contract, ContractStatus};
use crate::review::{CreateReviewRequest, Review, UpdateReviewRequest};

/// Review service errors
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Review not found")]
    NotFound,

    #[error("Contract not found")]
    ContractNotFound,

    #[error("Contract must be completed before it can be reviewed")]
    ContractNotCompleted,

    #[error("Only the contract's client or freelancer may review it")]
    NotContractParty,

    #[error("This contract has already been reviewed by you")]
    AlreadyReviewed,

    #[error("Only the review's author may do this")]
    NotAuthor,

    #[error("Rating must be between 1 and 5")]
    InvalidRating,
}

impl From<sqlx::Error> for ReviewError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ReviewError::AlreadyReviewed,
            _ => ReviewError::DatabaseError(e.to_string()),
        }
    }
}

/// Review service
#[derive(Clone)]
pub struct ReviewService {
    db_pool: PgPool,
}

impl ReviewService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create a review on a completed contract
    ///
    /// The reviewee is derived as the opposite party; the unique index on
    /// (contract_id, reviewer_id) rejects duplicates.
    pub async fn create_review(
        &self,
        reviewer_id: Uuid,
        request: CreateReviewRequest,
    ) -> Result<Review, ReviewError> {
        if !(1..=5).contains(&request.rating) {
            return Err(ReviewError::InvalidRating);
        }

        let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1")
            .bind(request.contract_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(ReviewError::ContractNotFound)?;

        if contract.status != ContractStatus::Completed {
            return Err(ReviewError::ContractNotCompleted);
        }

        let reviewee_id = contract
            .counterparty(reviewer_id)
            .ok_or(ReviewError::NotContractParty)?;

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, contract_id, job_id, reviewer_id, reviewee_id, rating, title, comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(contract.id)
        .bind(contract.job_id)
        .bind(reviewer_id)
        .bind(reviewee_id)
        .bind(request.rating)
        .bind(&request.title)
        .bind(&request.comment)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(review_id = %review.id, contract_id = %contract.id, "Review created");

        Ok(review)
    }

    /// Reviews on a job, newest first
    pub async fn get_job_reviews(&self, job_id: Uuid) -> Result<Vec<Review>, ReviewError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE job_id = $1 ORDER BY created_at DESC",
        )
        .bind(job_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(reviews)
    }

    /// Get a single review
    pub async fn get_review(&self, id: Uuid) -> Result<Review, ReviewError> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(ReviewError::NotFound)
    }

    /// Reviews received by a freelancer, newest first
    pub async fn get_freelancer_reviews(
        &self,
        freelancer_id: Uuid,
    ) -> Result<Vec<Review>, ReviewError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE reviewee_id = $1 ORDER BY created_at DESC",
        )
        .bind(freelancer_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(reviews)
    }

    /// Amend an own review
    pub async fn update_review(
        &self,
        author_id: Uuid,
        review_id: Uuid,
        request: UpdateReviewRequest,
    ) -> Result<Review, ReviewError> {
        if matches!(request.rating, Some(r) if !(1..=5).contains(&r)) {
            return Err(ReviewError::InvalidRating);
        }

        let review = self.get_review(review_id).await?;

        if review.reviewer_id != author_id {
            return Err(ReviewError::NotAuthor);
        }

        let updated = sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET rating = COALESCE($1, rating),
                title = COALESCE($2, title),
                comment = COALESCE($3, comment),
                updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(request.rating)
        .bind(&request.title)
        .bind(&request.comment)
        .bind(review_id)
        .fetch_optional(&self.db_pool)
        .await?;

        updated.ok_or(ReviewError::NotFound)
    }

    /// Delete an own review
    pub async fn delete_review(&self, author_id: Uuid, review_id: Uuid) -> Result<(), ReviewError> {
        let review = self.get_review(review_id).await?;

        if review.reviewer_id != author_id {
            return Err(ReviewError::NotAuthor);
        }

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.db_pool)
            .await?;

        Ok(())
    }

    /// All reviews, newest first (admin dashboard)
    pub async fn list_all(&self) -> Result<Vec<Review>, ReviewError> {
        let reviews = sqlx::query_as::<_, Review>("SELECT * FROM reviews ORDER BY created_at DESC")
            .fetch_all(&self.db_pool)
            .await?;

        Ok(reviews)
    }
}
