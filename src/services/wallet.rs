use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{repo_error, RequestHandler, Service, ServiceError};
use crate::models::transactions::{LedgerRecord, RecordStatus, WalletBalance, WithdrawQuote};
use crate::models::users::{User, WithdrawalMethod};
use crate::repositories::store::MemoryStore;
use crate::repositories::transactions::LedgerRepository;

pub enum WalletRequest {
    Balance {
        user_id: String,
        response: oneshot::Sender<Result<WalletBalance, ServiceError>>,
    },
    Purchase {
        user_id: String,
        diamonds: i64,
        price_cents: i64,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
    Recharge {
        user_id: String,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
    Quote {
        amount: i64,
        response: oneshot::Sender<Result<WithdrawQuote, ServiceError>>,
    },
    Withdraw {
        user_id: String,
        amount: i64,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    UpdateMethod {
        user_id: String,
        method: WithdrawalMethod,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
    History {
        user_id: String,
        status: Option<RecordStatus>,
        response: oneshot::Sender<Result<Vec<LedgerRecord>, ServiceError>>,
    },
    AdminHistory {
        response: oneshot::Sender<Result<Vec<LedgerRecord>, ServiceError>>,
    },
    AdminWithdraw {
        user_id: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    AdminMethod {
        user_id: String,
        email: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
}

#[derive(Clone)]
pub struct WalletRequestHandler {
    repository: LedgerRepository,
}

impl WalletRequestHandler {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        let repository = LedgerRepository::new(store);

        WalletRequestHandler { repository }
    }
}

#[async_trait]
impl RequestHandler<WalletRequest> for WalletRequestHandler {
    async fn handle_request(&self, request: WalletRequest) {
        match request {
            WalletRequest::Balance { user_id, response } => {
                let _ = response.send(self.repository.balance(&user_id).map_err(repo_error));
            }
            WalletRequest::Purchase {
                user_id,
                diamonds,
                price_cents,
                response,
            } => {
                let result = self
                    .repository
                    .purchase(&user_id, diamonds, price_cents)
                    .map_err(repo_error);
                let _ = response.send(result);
            }
            WalletRequest::Recharge { user_id, response } => {
                let _ = response.send(self.repository.recharge(&user_id).map_err(repo_error));
            }
            WalletRequest::Quote { amount, response } => {
                let _ = response.send(Ok(self.repository.quote(amount)));
            }
            WalletRequest::Withdraw {
                user_id,
                amount,
                response,
            } => {
                let result = self
                    .repository
                    .withdraw(&user_id, amount)
                    .map_err(repo_error);
                let _ = response.send(result);
            }
            WalletRequest::UpdateMethod {
                user_id,
                method,
                response,
            } => {
                let result = self
                    .repository
                    .update_method(&user_id, method)
                    .map_err(repo_error);
                let _ = response.send(result);
            }
            WalletRequest::History {
                user_id,
                status,
                response,
            } => {
                let _ = response.send(Ok(self.repository.history(&user_id, status)));
            }
            WalletRequest::AdminHistory { response } => {
                let _ = response.send(self.repository.admin_history().map_err(repo_error));
            }
            WalletRequest::AdminWithdraw { user_id, response } => {
                let _ = response.send(self.repository.admin_withdraw(&user_id).map_err(repo_error));
            }
            WalletRequest::AdminMethod {
                user_id,
                email,
                response,
            } => {
                let result = self
                    .repository
                    .admin_method(&user_id, email)
                    .map_err(repo_error);
                let _ = response.send(result);
            }
        }
    }
}

pub struct WalletService;

impl WalletService {
    pub fn new() -> Self {
        WalletService {}
    }
}

#[async_trait]
impl Service<WalletRequest, WalletRequestHandler> for WalletService {}
