use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio::sync::oneshot;

use super::{respond, send_failure, AppState};
use crate::models::ranking::RankPeriod;
use crate::services::ranking::RankingRequest;

pub async fn ranking(State(state): State<AppState>, Path(period): Path<String>) -> Response {
    let period = match RankPeriod::parse(&period) {
        Some(period) => period,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("unknown ranking period: {}", period)})),
            )
                .into_response()
        }
    };

    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .ranking_tx
        .send(RankingRequest::Ranking {
            period,
            response: tx,
        })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}

pub async fn top_fans(State(state): State<AppState>) -> Response {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .ranking_tx
        .send(RankingRequest::TopFans { response: tx })
        .await
    {
        return send_failure(e);
    }
    respond(rx).await
}
