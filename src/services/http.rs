use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

use super::ServiceError;
use crate::repositories::store::MemoryStore;

mod admin;
mod auth;
mod chat;
mod gifts;
mod ranking;
mod streams;
mod users;
mod wallet;

#[derive(Clone)]
pub struct AppState {
    pub user_tx: mpsc::Sender<crate::services::users::UserRequest>,
    pub stream_tx: mpsc::Sender<crate::services::streams::StreamRequest>,
    pub gift_tx: mpsc::Sender<crate::services::gifts::GiftRequest>,
    pub wallet_tx: mpsc::Sender<crate::services::wallet::WalletRequest>,
    pub chat_tx: mpsc::Sender<crate::services::chat::ChatRequest>,
    pub ranking_tx: mpsc::Sender<crate::services::ranking::RankingRequest>,
    pub hub: super::ws::WsHub,
    pub store: Arc<MemoryStore>,
}

/// Resolves the bearer token to a session user id.
pub struct AuthUser(pub String);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let token = match token {
            Some(token) => token,
            None => {
                return Err((
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "missing bearer token"})),
                ))
            }
        };

        match state.store.sessions.get(token) {
            Some(user_id) => Ok(AuthUser(user_id.clone())),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "invalid session token"})),
            )),
        }
    }
}

fn error_response(error: &ServiceError) -> Response {
    let status = match error {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Rejected(_) => StatusCode::BAD_REQUEST,
        ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ServiceError::Internal(_) | ServiceError::Communication(_, _) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(json!({"error": error.to_string()}))).into_response()
}

fn send_failure<E: std::fmt::Display>(error: E) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": format!("Failed to process request: {}", error)})),
    )
        .into_response()
}

/// Awaits the service reply and turns it into a JSON response.
async fn respond<T: serde::Serialize>(rx: oneshot::Receiver<Result<T, ServiceError>>) -> Response {
    match rx.await {
        Ok(Ok(value)) => (StatusCode::OK, Json(json!(value))).into_response(),
        Ok(Err(error)) => error_response(&error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to receive response: {}", e)})),
        )
            .into_response(),
    }
}

/// Like [`respond`], for operations whose success carries no payload.
async fn respond_empty(rx: oneshot::Receiver<Result<(), ServiceError>>) -> Response {
    match rx.await {
        Ok(Ok(())) => (StatusCode::OK, Json(json!({"success": true}))).into_response(),
        Ok(Err(error)) => error_response(&error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("Failed to receive response: {}", e)})),
        )
            .into_response(),
    }
}

async fn status(State(_state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "online",
        "service": "livego",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/last-email", get(auth::last_email))
        .route("/api/auth/save-email", post(auth::save_email))
        .route("/api/users/me", get(users::me))
        .route("/api/users/online", get(users::online))
        .route("/api/users/search", get(users::search))
        .route("/api/users/me/language", post(users::set_language))
        .route("/api/users/me/blocklist", get(users::blocklist))
        .route("/api/users/me/blocklist/{id}", post(users::block))
        .route("/api/users/me/blocklist/{id}/unblock", post(users::unblock))
        .route("/api/users/me/reminders", get(users::reminders))
        .route("/api/users/me/reminders/{id}", delete(users::remove_reminder))
        .route("/api/users/me/history", get(users::watch_history))
        .route("/api/users/me/withdrawal-history", get(wallet::history))
        .route("/api/users/{id}", get(users::get_user).post(users::update))
        .route("/api/users/{id}/follow", post(users::toggle_follow))
        .route("/api/users/{id}/fans", get(users::fans))
        .route("/api/users/{id}/friends", get(users::friends))
        .route("/api/users/{id}/following", get(users::following))
        .route("/api/live/{category}", get(streams::list))
        .route("/api/streams", post(streams::create))
        .route("/api/streams/search", get(streams::search))
        .route(
            "/api/streams/{id}",
            patch(streams::update).delete(streams::end),
        )
        .route("/api/streams/{id}/quality", patch(streams::set_quality))
        .route("/api/streams/{id}/donors", get(streams::donors))
        .route("/api/gifts", get(gifts::catalog))
        .route("/api/gifts/gallery", get(gifts::gallery))
        .route("/api/gifts/recharge", post(gifts::recharge))
        .route("/api/gift", post(gifts::send))
        .route("/api/wallet/balance", get(wallet::balance))
        .route("/api/wallet/purchase", post(wallet::purchase))
        .route("/api/earnings/withdraw/calculate", post(wallet::calculate))
        .route(
            "/api/earnings/withdraw/request",
            post(wallet::request_withdraw),
        )
        .route(
            "/api/earnings/withdraw/methods",
            post(wallet::update_method),
        )
        .route("/api/admin/withdrawals", get(admin::history))
        .route("/api/admin/withdrawals/request", post(admin::request_withdraw))
        .route("/api/admin/withdrawals/method", post(admin::update_method))
        .route("/api/chats/conversations", get(chat::conversations))
        .route("/api/chats/start", post(chat::start))
        .route("/api/ranking/top-fans", get(ranking::top_fans))
        .route("/api/ranking/{period}", get(ranking::ranking))
        .route("/ws", get(super::ws::ws_handler))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_http_server(state: AppState, addr: &str) -> Result<(), anyhow::Error> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
