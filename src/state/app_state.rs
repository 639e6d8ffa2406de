//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::{AuthService, VerificationService};
use crate::chat::ChatService;
use crate::contract::ContractService;
use crate::job::JobService;
use crate::milestone::MilestoneService;
use crate::notification::NotificationService;
use crate::proposal::ProposalService;
use crate::review::ReviewService;
use crate::transaction::TransactionService;
use crate::wallet::WalletService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub verification_service: Arc<VerificationService>,
    pub wallet_service: Arc<WalletService>,
    pub transaction_service: Arc<TransactionService>,
    pub contract_service: Arc<ContractService>,
    pub milestone_service: Arc<MilestoneService>,
    pub proposal_service: Arc<ProposalService>,
    pub job_service: Arc<JobService>,
    pub review_service: Arc<ReviewService>,
    pub chat_service: Arc<ChatService>,
    pub notification_service: Arc<NotificationService>,
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<VerificationService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.verification_service.clone()
    }
}

impl FromRef<AppState> for Arc<WalletService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.wallet_service.clone()
    }
}

impl FromRef<AppState> for Arc<TransactionService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.transaction_service.clone()
    }
}

impl FromRef<AppState> for Arc<ContractService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.contract_service.clone()
    }
}

impl FromRef<AppState> for Arc<MilestoneService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.milestone_service.clone()
    }
}

impl FromRef<AppState> for Arc<ProposalService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.proposal_service.clone()
    }
}

impl FromRef<AppState> for Arc<JobService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.job_service.clone()
    }
}

impl FromRef<AppState> for Arc<ReviewService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.review_service.clone()
    }
}

impl FromRef<AppState> for Arc<ChatService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.chat_service.clone()
    }
}

impl FromRef<AppState> for Arc<NotificationService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notification_service.clone()
    }
}
