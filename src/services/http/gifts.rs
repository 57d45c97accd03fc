use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use tokio::sync::oneshot;

use super::{respond, send_failure, AppState, AuthUser};
use crate::models::gifts::SendGift;
use crate::services::gifts::GiftRequest;
use crate::services::wallet::WalletRequest;

#[derive(Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

pub async fn catalog(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .gift_tx
        .send(GiftRequest::Catalog {
            category: query.category,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn gallery(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .gift_tx
        .send(GiftRequest::Gallery {
            user_id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn send(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<SendGift>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .gift_tx
        .send(GiftRequest::Send {
            sender_id: user_id,
            request,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn recharge(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .wallet_tx
        .send(WalletRequest::Recharge {
            user_id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}
