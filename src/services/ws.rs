use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::http::AppState;
use crate::models::events::{ClientEvent, ServerEvent, StreamMessage};

struct RoomMember {
    user_id: String,
    username: String,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

/// Room registry. Members hold an unbounded channel into their connection's
/// writer task; closed channels are dropped on the next broadcast.
#[derive(Clone)]
pub struct WsHub {
    rooms: Arc<DashMap<String, HashMap<u64, RoomMember>>>,
    next_conn_id: Arc<AtomicU64>,
}

impl WsHub {
    pub fn new() -> Self {
        WsHub {
            rooms: Arc::new(DashMap::new()),
            next_conn_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }

    fn join(
        &self,
        room: &str,
        conn_id: u64,
        user_id: String,
        username: String,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) {
        self.rooms.entry(room.to_string()).or_default().insert(
            conn_id,
            RoomMember {
                user_id,
                username,
                sender,
            },
        );
    }

    fn leave(&self, room: &str, conn_id: u64) -> Option<(String, String)> {
        let member = self
            .rooms
            .get_mut(room)
            .and_then(|mut members| members.remove(&conn_id))
            .map(|m| (m.user_id, m.username));
        self.rooms.retain(|_, members| !members.is_empty());
        member
    }

    pub fn broadcast(&self, room: &str, event: &ServerEvent) {
        if let Some(mut members) = self.rooms.get_mut(room) {
            members.retain(|_, member| member.sender.send(event.clone()).is_ok());
        }
    }

    pub fn broadcast_except(&self, room: &str, conn_id: u64, event: &ServerEvent) {
        if let Some(mut members) = self.rooms.get_mut(room) {
            members.retain(|id, member| {
                *id == conn_id || member.sender.send(event.clone()).is_ok()
            });
        }
    }
}

impl Default for WsHub {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
pub struct WsQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub username: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, query, state.hub))
}

async fn handle_socket(socket: WebSocket, query: WsQuery, hub: WsHub) {
    let user_id = query.user_id;
    let username = query.username.unwrap_or_else(|| user_id.clone());
    let conn_id = hub.next_id();

    log::info!("WS connected: {} ({})", username, user_id);

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();

    let writer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    log::error!("Could not encode event: {}", e);
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut joined: HashSet<String> = HashSet::new();

    while let Some(frame) = ws_rx.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(e) => {
                log::warn!("WS read error for {}: {}", user_id, e);
                break;
            }
        };

        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let event: ClientEvent = match serde_json::from_str(text.as_str()) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Dropping malformed frame from {}: {}", user_id, e);
                continue;
            }
        };

        match event {
            ClientEvent::JoinStream { stream_id } => {
                hub.join(
                    &stream_id,
                    conn_id,
                    user_id.clone(),
                    username.clone(),
                    event_tx.clone(),
                );
                joined.insert(stream_id.clone());
                hub.broadcast_except(
                    &stream_id,
                    conn_id,
                    &ServerEvent::UserJoined {
                        stream_id: stream_id.clone(),
                        user_id: user_id.clone(),
                        username: username.clone(),
                        timestamp: Utc::now(),
                    },
                );
            }
            ClientEvent::LeaveStream { stream_id } => {
                joined.remove(&stream_id);
                if hub.leave(&stream_id, conn_id).is_some() {
                    hub.broadcast(
                        &stream_id,
                        &ServerEvent::UserLeft {
                            stream_id: stream_id.clone(),
                            user_id: user_id.clone(),
                            username: username.clone(),
                        },
                    );
                }
            }
            ClientEvent::StreamMessage { stream_id, text } => {
                // Sender included, so every client renders the same line.
                hub.broadcast(
                    &stream_id,
                    &ServerEvent::StreamMessage(StreamMessage {
                        id: Uuid::new_v4().hyphenated().to_string(),
                        stream_id: stream_id.clone(),
                        sender_id: user_id.clone(),
                        sender_name: username.clone(),
                        text,
                        sent_at: Utc::now(),
                    }),
                );
            }
            ClientEvent::StreamGift(payload) => {
                let room = payload.room_id.clone();
                hub.broadcast(&room, &ServerEvent::StreamGift(payload));
            }
            ClientEvent::PkStart {
                stream_id,
                opponent_id,
            } => {
                hub.broadcast(
                    &stream_id,
                    &ServerEvent::PkStatus {
                        stream_id: stream_id.clone(),
                        active: true,
                        opponent_id: Some(opponent_id),
                    },
                );
            }
        }
    }

    for room in joined {
        if hub.leave(&room, conn_id).is_some() {
            hub.broadcast(
                &room,
                &ServerEvent::UserLeft {
                    stream_id: room.clone(),
                    user_id: user_id.clone(),
                    username: username.clone(),
                },
            );
        }
    }
    writer.abort();

    log::info!("WS disconnected: {}", user_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(hub: &WsHub, room: &str, user: &str) -> (u64, mpsc::UnboundedReceiver<ServerEvent>) {
        let conn_id = hub.next_id();
        let (tx, rx) = mpsc::unbounded_channel();
        hub.join(room, conn_id, user.to_string(), user.to_string(), tx);
        (conn_id, rx)
    }

    #[test]
    fn broadcast_reaches_every_member_except_excluded() {
        let hub = WsHub::new();
        let (a_id, mut a_rx) = member(&hub, "room", "a");
        let (_b_id, mut b_rx) = member(&hub, "room", "b");

        let event = ServerEvent::UserLeft {
            stream_id: "room".to_string(),
            user_id: "x".to_string(),
            username: "x".to_string(),
        };

        hub.broadcast_except("room", a_id, &event);
        assert!(a_rx.try_recv().is_err());
        assert!(b_rx.try_recv().is_ok());

        hub.broadcast("room", &event);
        assert!(a_rx.try_recv().is_ok());
        assert!(b_rx.try_recv().is_ok());
    }

    #[test]
    fn leaving_empties_the_room() {
        let hub = WsHub::new();
        let (conn_id, _rx) = member(&hub, "room", "a");

        assert!(hub.leave("room", conn_id).is_some());
        assert!(hub.leave("room", conn_id).is_none());
        assert!(hub.rooms.is_empty());
    }
}
