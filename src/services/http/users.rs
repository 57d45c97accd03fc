use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::oneshot;

use super::{respond, respond_empty, send_failure, AppState, AuthUser};
use crate::models::users::UserPatch;
use crate::services::users::UserRequest;

pub async fn me(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::GetUser {
            id: user_id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

#[derive(Deserialize)]
pub struct OnlineQuery {
    #[serde(rename = "roomId")]
    pub room_id: Option<String>,
}

pub async fn online(
    State(state): State<AppState>,
    Query(query): Query<OnlineQuery>,
) -> Response {
    // A missing room id is a client race, not an error.
    let room_id = match query.room_id {
        Some(room_id) if !room_id.is_empty() && room_id != "undefined" => room_id,
        _ => {
            log::warn!("/users/online called without a valid roomId");
            return (StatusCode::OK, Json(json!([]))).into_response();
        }
    };

    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::OnlineUsers {
            room_id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::Search {
            query: query.q,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::GetUser { id, response: tx })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<UserPatch>,
) -> Response {
    if id != user_id {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "can only update your own profile"})),
        )
            .into_response();
    }

    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::UpdateUser {
            id,
            patch,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn toggle_follow(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::ToggleFollow {
            user_id,
            target_id: id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }

    match rx.await {
        Ok(Ok(following)) => {
            (StatusCode::OK, Json(json!({"following": following}))).into_response()
        }
        Ok(Err(error)) => super::error_response(&error),
        Err(e) => send_failure(e),
    }
}

pub async fn fans(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::Fans { id, response: tx })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn friends(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::Friends { id, response: tx })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn following(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::Following { id, response: tx })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

#[derive(Deserialize)]
pub struct LanguageBody {
    pub code: String,
}

pub async fn set_language(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LanguageBody>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::SetLanguage {
            user_id,
            code: body.code,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn blocklist(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::Blocklist {
            user_id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn block(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::Block {
            user_id,
            target_id: id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond_empty(rx).await
}

pub async fn unblock(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::Unblock {
            user_id,
            target_id: id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond_empty(rx).await
}

pub async fn reminders(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::Reminders {
            user_id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn remove_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::RemoveReminder {
            user_id,
            reminder_id: id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond_empty(rx).await
}

pub async fn watch_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::WatchHistory {
            user_id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}
