//! Milestone models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Milestone lifecycle status
///
/// The transition table is explicit; skipping states (`pending ->
/// completed`) and reversals are rejected.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "milestone_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl MilestoneStatus {
    /// Whether the state machine permits moving from `self` to `to`
    pub fn can_transition(self, to: MilestoneStatus) -> bool {
        use MilestoneStatus::*;
        matches!(
            (self, to),
            (Pending, InProgress) | (InProgress, Completed) | (Pending | InProgress, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MilestoneStatus::Completed | MilestoneStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "pending",
            MilestoneStatus::InProgress => "in_progress",
            MilestoneStatus::Completed => "completed",
            MilestoneStatus::Cancelled => "cancelled",
        }
    }
}

/// Milestone row
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Milestone {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub amount: i64,
    pub currency: String,
    pub status: MilestoneStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// File attached to a milestone (upload plumbing is external; only the
/// resulting reference is stored)
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct MilestoneAttachment {
    pub id: Uuid,
    pub milestone_id: Uuid,
    pub url: String,
    pub public_id: Option<String>,
    pub mime_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Milestone with its attachments embedded
#[derive(Debug, Serialize)]
pub struct MilestoneWithAttachments {
    #[serde(flatten)]
    pub milestone: Milestone,
    pub attachments: Vec<MilestoneAttachment>,
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMilestoneRequest {
    pub contract_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub amount: i64,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMilestoneRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub amount: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMilestoneStatusRequest {
    pub status: MilestoneStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AttachFileRequest {
    #[validate(url)]
    pub url: String,
    pub public_id: Option<String>,
    pub mime_type: Option<String>,
}

/// Status-update response, flagging when the owning contract completed
#[derive(Debug, Serialize)]
pub struct MilestoneStatusResponse {
    #[serde(flatten)]
    pub milestone: Milestone,
    pub contract_completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        use MilestoneStatus::*;
        assert!(Pending.can_transition(InProgress));
        assert!(InProgress.can_transition(Completed));
    }

    #[test]
    fn test_cancellation_branch() {
        use MilestoneStatus::*;
        assert!(Pending.can_transition(Cancelled));
        assert!(InProgress.can_transition(Cancelled));
        assert!(!Completed.can_transition(Cancelled));
    }

    #[test]
    fn test_skips_and_reversals_rejected() {
        use MilestoneStatus::*;
        // Skipping straight to completed is not allowed
        assert!(!Pending.can_transition(Completed));
        // Reversals are not allowed
        assert!(!InProgress.can_transition(Pending));
        assert!(!Completed.can_transition(Pending));
        assert!(!Completed.can_transition(InProgress));
        // Terminal states are frozen
        assert!(!Cancelled.can_transition(InProgress));
        assert!(!Cancelled.can_transition(Completed));
    }

    #[test]
    fn test_terminal_classification() {
        use MilestoneStatus::*;
        assert!(!Pending.is_terminal());
        assert!(!InProgress.is_terminal());
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
    }
}
