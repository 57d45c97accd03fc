use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use tokio::sync::oneshot;

use super::{respond, respond_empty, send_failure, AppState, AuthUser};
use crate::models::transactions::{PurchaseRequest, RecordStatus, WithdrawRequest};
use crate::models::users::WithdrawalMethod;
use crate::services::wallet::WalletRequest;

pub async fn balance(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .wallet_tx
        .send(WalletRequest::Balance {
            user_id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn purchase(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<PurchaseRequest>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .wallet_tx
        .send(WalletRequest::Purchase {
            user_id,
            diamonds: request.diamonds,
            price_cents: request.price_cents,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn calculate(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Json(request): Json<WithdrawRequest>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .wallet_tx
        .send(WalletRequest::Quote {
            amount: request.amount,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn request_withdraw(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<WithdrawRequest>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .wallet_tx
        .send(WalletRequest::Withdraw {
            user_id,
            amount: request.amount,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond_empty(rx).await
}

#[derive(Deserialize)]
pub struct MethodBody {
    pub method: String,
    pub email: String,
}

pub async fn update_method(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<MethodBody>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .wallet_tx
        .send(WalletRequest::UpdateMethod {
            user_id,
            method: WithdrawalMethod {
                method: body.method,
                email: body.email,
            },
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub status: Option<String>,
}

pub async fn history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let status = query
        .status
        .as_deref()
        .filter(|s| *s != "all")
        .and_then(RecordStatus::parse);

    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .wallet_tx
        .send(WalletRequest::History {
            user_id,
            status,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}
