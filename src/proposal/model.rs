//! Proposal models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Proposal lifecycle status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "proposal_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Withdrawn => "withdrawn",
        }
    }
}

/// Proposal row
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Proposal {
    pub id: Uuid,
    pub job_id: Uuid,
    pub freelancer_id: Uuid,
    pub cover_letter: String,
    pub bid_amount: i64,
    pub currency: String,
    pub estimated_hours: Option<i32>,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitProposalRequest {
    pub job_id: Uuid,
    #[validate(length(min = 1))]
    pub cover_letter: String,
    #[validate(range(min = 1))]
    pub bid_amount: i64,
    pub currency: Option<String>,
    #[validate(range(min = 1))]
    pub estimated_hours: Option<i32>,
}

/// Client decision on a pending proposal
#[derive(Debug, Deserialize)]
pub struct UpdateProposalStatusRequest {
    pub status: ProposalStatus,
}
