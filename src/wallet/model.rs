//! Wallet models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Wallet row
///
/// `balance` is the spendable amount in minor units. Holds live in their
/// own table and reduce the *available* amount without touching `balance`.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An earmarked amount reserved against a wallet
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct WalletHold {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub amount: i64,
    pub reason: String,
    pub related_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Wallet snapshot returned to callers: balance, holds, and what is left
/// to spend once reservations are subtracted
#[derive(Debug, Serialize)]
pub struct WalletSnapshot {
    #[serde(flatten)]
    pub wallet: Wallet,
    pub holds: Vec<WalletHold>,
    pub available: i64,
}

impl WalletSnapshot {
    pub fn new(wallet: Wallet, holds: Vec<WalletHold>) -> Self {
        let held: i64 = holds.iter().map(|h| h.amount).sum();
        let available = wallet.balance - held;
        Self {
            wallet,
            holds,
            available,
        }
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct DepositRequest {
    #[validate(range(min = 1))]
    pub amount: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WithdrawRequest {
    #[validate(range(min = 1))]
    pub amount: i64,
    #[validate(length(min = 1))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct HoldRequest {
    #[validate(range(min = 1))]
    pub amount: i64,
    #[validate(length(min = 1))]
    pub reason: String,
    pub related_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseHoldRequest {
    /// When true, the released amount is debited as a payout instead of
    /// returning to the available balance
    #[serde(default)]
    pub settle: bool,
}

/// Balance-only response for the dashboard widget
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: i64,
    pub available: i64,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn wallet(balance: i64) -> Wallet {
        Wallet {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            balance,
            currency: "inr".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn hold(wallet_id: Uuid, amount: i64) -> WalletHold {
        WalletHold {
            id: Uuid::new_v4(),
            wallet_id,
            amount,
            reason: "escrow".to_string(),
            related_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_available_subtracts_holds() {
        let w = wallet(10_000);
        let holds = vec![hold(w.id, 2_500), hold(w.id, 1_500)];
        let snapshot = WalletSnapshot::new(w, holds);
        assert_eq!(snapshot.wallet.balance, 10_000);
        assert_eq!(snapshot.available, 6_000);
    }

    #[test]
    fn test_snapshot_without_holds() {
        let w = wallet(500);
        let snapshot = WalletSnapshot::new(w, vec![]);
        assert_eq!(snapshot.available, 500);
    }
}
