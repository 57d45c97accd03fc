use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::oneshot;

use super::{respond, respond_empty, send_failure, AppState};
use crate::models::users::{Credentials, NewUser};
use crate::services::users::UserRequest;

pub async fn register(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::Register {
            new_user,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::Login {
            credentials,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    let token = match token {
        Some(token) => token,
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "missing bearer token"})),
            )
                .into_response()
        }
    };

    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::Logout {
            token,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond_empty(rx).await
}

pub async fn last_email(State(state): State<AppState>) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::LastEmail { response: tx })
        .await
    {
        return send_failure(e);
    }

    match rx.await {
        Ok(Ok(email)) => (StatusCode::OK, Json(json!({"email": email}))).into_response(),
        Ok(Err(error)) => super::error_response(&error),
        Err(e) => send_failure(e),
    }
}

#[derive(Deserialize)]
pub struct SaveEmailBody {
    pub email: String,
}

pub async fn save_email(
    State(state): State<AppState>,
    Json(body): Json<SaveEmailBody>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_tx
        .send(UserRequest::SaveEmail {
            email: body.email,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond_empty(rx).await
}
