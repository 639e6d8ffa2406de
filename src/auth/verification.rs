//! One-shot verification tokens (e-mail verification, password reset)
//!
//! Tokens are random 32-byte hex strings handed to the caller exactly once;
//! only their SHA-256 hash is stored. Consumption is a guarded UPDATE so a
//! token can be redeemed at most once even under concurrent requests.

use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;
use std::time::Duration as StdDuration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{VerificationKind, VerificationToken};

use super::service::hash_token;

/// Verification token errors
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Token invalid, expired, or already used")]
    InvalidToken,
}

impl From<sqlx::Error> for VerificationError {
    fn from(e: sqlx::Error) -> Self {
        VerificationError::DatabaseError(e.to_string())
    }
}

/// Service managing verification token issue and consumption
#[derive(Clone)]
pub struct VerificationService {
    db_pool: PgPool,
    token_ttl_hours: i64,
}

impl VerificationService {
    pub fn new(db_pool: PgPool, token_ttl_hours: i64) -> Self {
        Self {
            db_pool,
            token_ttl_hours,
        }
    }

    /// Issue a token for a user, returning the raw value
    ///
    /// The raw token leaves the system through the (external) e-mail
    /// delivery path; the database only ever sees its hash.
    pub async fn issue(
        &self,
        user_id: Uuid,
        kind: VerificationKind,
    ) -> Result<(String, VerificationToken), VerificationError> {
        let raw_token = generate_raw_token();
        let token_hash = hash_token(&raw_token);
        let expires_at = Utc::now() + Duration::hours(self.token_ttl_hours);

        let token = sqlx::query_as::<_, VerificationToken>(
            r#"
            INSERT INTO verification_tokens (id, user_id, token_hash, kind, expires_at, used)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&token_hash)
        .bind(kind)
        .bind(expires_at)
        .fetch_one(&self.db_pool)
        .await?;

        Ok((raw_token, token))
    }

    /// Consume a token, returning the owning user id
    ///
    /// Valid only while `used = FALSE` and `expires_at` is in the future.
    /// The guarded UPDATE marks the row used atomically; a second attempt
    /// finds no matching row.
    pub async fn consume(
        &self,
        raw_token: &str,
        kind: VerificationKind,
    ) -> Result<Uuid, VerificationError> {
        let token_hash = hash_token(raw_token);

        let consumed: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE verification_tokens
            SET used = TRUE, used_at = NOW()
            WHERE token_hash = $1 AND kind = $2 AND used = FALSE AND expires_at > NOW()
            RETURNING user_id
            "#,
        )
        .bind(&token_hash)
        .bind(kind)
        .fetch_optional(&self.db_pool)
        .await?;

        consumed
            .map(|(user_id,)| user_id)
            .ok_or(VerificationError::InvalidToken)
    }

    /// Delete stale rows: used tokens and tokens expired for over a week
    pub async fn sweep_expired(&self) -> Result<u64, VerificationError> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM verification_tokens
            WHERE used = TRUE OR expires_at < NOW() - INTERVAL '7 days'
            "#,
        )
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        Ok(rows_affected)
    }
}

/// Generate a 32-byte random token, hex-encoded
fn generate_raw_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Background task deleting stale verification tokens once an hour
pub async fn token_sweeper(service: VerificationService) {
    let mut interval = tokio::time::interval(StdDuration::from_secs(3600));

    loop {
        interval.tick().await;

        match service.sweep_expired().await {
            Ok(0) => {}
            Ok(n) => tracing::info!("Swept {} stale verification tokens", n),
            Err(e) => tracing::error!("Verification token sweep failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_token_shape() {
        let token = generate_raw_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_raw_tokens_are_unique() {
        assert_ne!(generate_raw_token(), generate_raw_token());
    }
}
