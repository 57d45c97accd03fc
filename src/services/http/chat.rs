use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use tokio::sync::oneshot;

use super::{respond, send_failure, AppState, AuthUser};
use crate::services::chat::ChatRequest;

pub async fn conversations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .chat_tx
        .send(ChatRequest::Conversations {
            user_id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

#[derive(Deserialize)]
pub struct StartBody {
    pub user_id: String,
}

pub async fn start(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<StartBody>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .chat_tx
        .send(ChatRequest::Start {
            user_id,
            peer_id: body.user_id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}
