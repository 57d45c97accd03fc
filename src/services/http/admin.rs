use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::oneshot;

use super::{respond, respond_empty, send_failure, AppState, AuthUser};
use crate::services::wallet::WalletRequest;

fn require_admin(state: &AppState, user_id: &str) -> Result<(), Response> {
    let is_admin = state
        .store
        .users
        .get(user_id)
        .map(|u| u.is_admin)
        .unwrap_or(false);

    if is_admin {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(json!({"error": "platform account required"})),
        )
            .into_response())
    }
}

pub async fn history(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> Response {
    if let Err(response) = require_admin(&state, &user_id) {
        return response;
    }

    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .wallet_tx
        .send(WalletRequest::AdminHistory { response: tx })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn request_withdraw(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Response {
    if let Err(response) = require_admin(&state, &user_id) {
        return response;
    }

    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .wallet_tx
        .send(WalletRequest::AdminWithdraw {
            user_id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond_empty(rx).await
}

#[derive(Deserialize)]
pub struct AdminMethodBody {
    pub email: String,
}

pub async fn update_method(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<AdminMethodBody>,
) -> Response {
    if let Err(response) = require_admin(&state, &user_id) {
        return response;
    }

    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .wallet_tx
        .send(WalletRequest::AdminMethod {
            user_id,
            email: body.email,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond_empty(rx).await
}
