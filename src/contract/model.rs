//! Contract models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::milestone::Milestone;

/// Contract lifecycle status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "contract_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Pending,
    Active,
    InProgress,
    Completed,
    Cancelled,
}

impl ContractStatus {
    /// Whether the lifecycle permits moving from `self` to `to`
    ///
    /// Forward only: pending -> active -> in_progress -> completed, with
    /// cancellation allowed from any non-terminal state.
    pub fn can_transition(self, to: ContractStatus) -> bool {
        use ContractStatus::*;
        match (self, to) {
            (Pending, Active) | (Active, InProgress) | (InProgress, Completed) => true,
            (Pending | Active | InProgress, Cancelled) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ContractStatus::Completed | ContractStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Pending => "pending",
            ContractStatus::Active => "active",
            ContractStatus::InProgress => "in_progress",
            ContractStatus::Completed => "completed",
            ContractStatus::Cancelled => "cancelled",
        }
    }
}

/// Escrow state of the contract's funding
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "escrow_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    NotRequired,
    FundsHeld,
    Released,
    Refunded,
}

/// Contract row
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Contract {
    pub id: Uuid,
    pub job_id: Uuid,
    pub proposal_id: Uuid,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,
    pub total_amount: i64,
    pub currency: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: ContractStatus,
    pub escrow_status: EscrowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    /// Whether a user is one of the contract's two parties
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.client_id == user_id || self.freelancer_id == user_id
    }

    /// The party on the other side of the table from `user_id`
    pub fn counterparty(&self, user_id: Uuid) -> Option<Uuid> {
        if user_id == self.client_id {
            Some(self.freelancer_id)
        } else if user_id == self.freelancer_id {
            Some(self.client_id)
        } else {
            None
        }
    }
}

/// Contract with its milestones embedded
#[derive(Debug, Serialize)]
pub struct ContractWithMilestones {
    #[serde(flatten)]
    pub contract: Contract,
    pub milestones: Vec<Milestone>,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Request to create a contract from an accepted proposal
#[derive(Debug, Deserialize)]
pub struct CreateContractRequest {
    pub proposal_id: Uuid,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Request to amend contract terms
#[derive(Debug, Deserialize)]
pub struct UpdateContractRequest {
    pub total_amount: Option<i64>,
    pub currency: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Request to move the contract status
#[derive(Debug, Deserialize)]
pub struct UpdateContractStatusRequest {
    pub status: ContractStatus,
}

/// Request to move the escrow state
#[derive(Debug, Deserialize)]
pub struct UpdateEscrowStatusRequest {
    pub escrow_status: EscrowStatus,
}

/// Per-status aggregate for the admin dashboard
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ContractStats {
    pub status: ContractStatus,
    pub count: i64,
    pub total_amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        use ContractStatus::*;
        assert!(Pending.can_transition(Active));
        assert!(Active.can_transition(InProgress));
        assert!(InProgress.can_transition(Completed));
    }

    #[test]
    fn test_cancellation_from_non_terminal() {
        use ContractStatus::*;
        assert!(Pending.can_transition(Cancelled));
        assert!(Active.can_transition(Cancelled));
        assert!(InProgress.can_transition(Cancelled));
        assert!(!Completed.can_transition(Cancelled));
        assert!(!Cancelled.can_transition(Cancelled));
    }

    #[test]
    fn test_no_reversals_or_skips() {
        use ContractStatus::*;
        assert!(!Pending.can_transition(Completed));
        assert!(!Pending.can_transition(InProgress));
        assert!(!Completed.can_transition(Pending));
        assert!(!InProgress.can_transition(Active));
        assert!(!Cancelled.can_transition(Active));
    }

    #[test]
    fn test_counterparty() {
        let client = Uuid::new_v4();
        let freelancer = Uuid::new_v4();
        let contract = Contract {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            proposal_id: Uuid::new_v4(),
            client_id: client,
            freelancer_id: freelancer,
            total_amount: 50_000,
            currency: "inr".to_string(),
            start_date: None,
            end_date: None,
            status: ContractStatus::Pending,
            escrow_status: EscrowStatus::NotRequired,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(contract.counterparty(client), Some(freelancer));
        assert_eq!(contract.counterparty(freelancer), Some(client));
        assert_eq!(contract.counterparty(Uuid::new_v4()), None);
        assert!(contract.is_party(client));
    }
}
