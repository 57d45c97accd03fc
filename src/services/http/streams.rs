use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use tokio::sync::oneshot;

use super::{respond, respond_empty, send_failure, AppState, AuthUser};
use crate::models::streams::{NewStream, StreamPatch, StreamQuality};
use crate::services::streams::StreamRequest;

#[derive(Deserialize)]
pub struct RegionQuery {
    pub region: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<RegionQuery>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .stream_tx
        .send(StreamRequest::List {
            category,
            region: query.region,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(new_stream): Json<NewStream>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .stream_tx
        .send(StreamRequest::Create {
            host_id: user_id,
            new_stream,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<StreamPatch>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .stream_tx
        .send(StreamRequest::Patch {
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

pub async fn end(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .stream_tx
        .send(StreamRequest::End {
            id,
            host_id: user_id,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond_empty(rx).await
}

#[derive(Deserialize)]
pub struct QualityBody {
    pub quality: StreamQuality,
}

pub async fn set_quality(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<QualityBody>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .stream_tx
        .send(StreamRequest::SetQuality {
            id,
            quality: body.quality,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn donors(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .stream_tx
        .send(StreamRequest::Donors {
            stream_id: id,
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
        .stream_tx
        .send(StreamRequest::Search {
            query: query.q,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}
