use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tungstenite::protocol::Message;

use super::api::ApiError;
use crate::models::events::{ClientEvent, EventKind, ServerEvent};

const MAX_CONNECT_ATTEMPTS: u32 = 5;

/// Fans server events out to per-kind subscribers. Subscribers that dropped
/// their receiver are discarded on the next emit. In real mode the bridge is
/// fed by the socket task; in mock mode the facade feeds it directly.
pub struct EventBridge {
    subscribers: Mutex<HashMap<EventKind, Vec<mpsc::UnboundedSender<ServerEvent>>>>,
}

impl EventBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(EventBridge {
            subscribers: Mutex::new(HashMap::new()),
        })
    }

    pub fn subscribe(&self, kind: EventKind) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(kind)
            .or_default()
            .push(tx);
        rx
    }

    pub fn emit(&self, event: &ServerEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(list) = subscribers.get_mut(&event.kind()) {
            list.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

/// Handle to the outgoing half of the socket supervisor.
#[derive(Clone)]
pub struct SocketHandle {
    outgoing: mpsc::UnboundedSender<ClientEvent>,
}

impl SocketHandle {
    pub fn send(&self, event: ClientEvent) -> Result<(), ApiError> {
        self.outgoing
            .send(event)
            .map_err(|_| ApiError::NotConnected)
    }
}

fn encode_query_value(value: &str) -> String {
    value.replace(' ', "%20")
}

/// Spawns the connection supervisor: connect (up to 5 attempts), pump frames
/// both ways, reconnect on drop. Ends for good when the handle is dropped or
/// the attempts run out.
pub fn connect_socket(
    ws_url: &str,
    user_id: &str,
    username: &str,
    bridge: Arc<EventBridge>,
) -> SocketHandle {
    let url = format!(
        "{}?userId={}&username={}",
        ws_url,
        encode_query_value(user_id),
        encode_query_value(username)
    );

    let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
    tokio::spawn(run_connection(url, bridge, outgoing_rx));

    SocketHandle {
        outgoing: outgoing_tx,
    }
}

async fn run_connection(
    url: String,
    bridge: Arc<EventBridge>,
    mut outgoing: mpsc::UnboundedReceiver<ClientEvent>,
) {
    let mut attempts = 0u32;

    loop {
        let stream = match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                log::info!("WS connected: {}", url);
                attempts = 0;
                stream
            }
            Err(e) => {
                attempts += 1;
                if attempts >= MAX_CONNECT_ATTEMPTS {
                    log::error!("WS giving up after {} attempts: {}", attempts, e);
                    return;
                }
                log::warn!("WS connect failed (attempt {}): {}", attempts, e);
                tokio::time::sleep(Duration::from_millis(500 * attempts as u64)).await;
                continue;
            }
        };

        let (mut write, mut read) = stream.split();

        loop {
            tokio::select! {
                event = outgoing.recv() => {
                    let event = match event {
                        Some(event) => event,
                        // Handle dropped, shut down for good.
                        None => return,
                    };
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            log::error!("Could not encode client event: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        log::warn!("WS send failed: {}", e);
                        break;
                    }
                }
                frame = read.next() => {
                    let message = match frame {
                        Some(Ok(message)) => message,
                        Some(Err(e)) => {
                            log::warn!("WS read error: {}", e);
                            break;
                        }
                        None => break,
                    };

                    let text = match message {
                        Message::Text(text) => text,
                        Message::Close(_) => break,
                        _ => continue,
                    };

                    match serde_json::from_str::<ServerEvent>(text.as_str()) {
                        Ok(event) => bridge.emit(&event),
                        Err(e) => log::warn!("Dropping unknown server event: {}", e),
                    }
                }
            }
        }

        log::warn!("WS disconnected, reconnecting.");
    }
}
