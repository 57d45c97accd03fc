use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::repositories::store::MemoryStore;

pub mod chat;
pub mod gifts;
pub mod http;
pub mod ranking;
pub mod streams;
pub mod users;
pub mod wallet;
pub mod ws;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Internal error: {0}")]
    Internal(String),
    /// A business rule rejected the request.
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Communication error: {0} - {1}")]
    Communication(String, String),
}

/// Repository failures carry their reason in the message; missing entities
/// map to `NotFound`, everything else is a rejection.
pub(crate) fn repo_error(error: anyhow::Error) -> ServiceError {
    let message = error.to_string();
    if message.contains("not found") {
        ServiceError::NotFound(message)
    } else {
        ServiceError::Rejected(message)
    }
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

/// Wires every domain service to its channel and returns the handles the
/// HTTP layer needs. The store is shared, never global.
pub async fn start_services(store: Arc<MemoryStore>) -> Result<http::AppState, anyhow::Error> {
    let (user_tx, mut user_rx) = mpsc::channel(512);
    let (stream_tx, mut stream_rx) = mpsc::channel(512);
    let (gift_tx, mut gift_rx) = mpsc::channel(512);
    let (wallet_tx, mut wallet_rx) = mpsc::channel(512);
    let (chat_tx, mut chat_rx) = mpsc::channel(512);
    let (ranking_tx, mut ranking_rx) = mpsc::channel(512);

    let mut user_service = users::UserService::new();
    let mut stream_service = streams::StreamService::new();
    let mut gift_service = gifts::GiftService::new();
    let mut wallet_service = wallet::WalletService::new();
    let mut chat_service = chat::ChatService::new();
    let mut ranking_service = ranking::RankingService::new();

    let hub = ws::WsHub::new();

    println!("[*] Starting user service.");
    let user_store = store.clone();
    tokio::spawn(async move {
        user_service
            .run(users::UserRequestHandler::new(user_store), &mut user_rx)
            .await;
    });

    println!("[*] Starting stream service.");
    let stream_store = store.clone();
    tokio::spawn(async move {
        stream_service
            .run(
                streams::StreamRequestHandler::new(stream_store),
                &mut stream_rx,
            )
            .await;
    });

    println!("[*] Starting gift service.");
    let gift_store = store.clone();
    let gift_hub = hub.clone();
    tokio::spawn(async move {
        gift_service
            .run(
                gifts::GiftRequestHandler::new(gift_store, gift_hub),
                &mut gift_rx,
            )
            .await;
    });

    println!("[*] Starting wallet service.");
    let wallet_store = store.clone();
    tokio::spawn(async move {
        wallet_service
            .run(
                wallet::WalletRequestHandler::new(wallet_store),
                &mut wallet_rx,
            )
            .await;
    });

    println!("[*] Starting chat service.");
    let chat_store = store.clone();
    tokio::spawn(async move {
        chat_service
            .run(chat::ChatRequestHandler::new(chat_store), &mut chat_rx)
            .await;
    });

    log::info!("Starting ranking service.");
    let ranking_store = store.clone();
    tokio::spawn(async move {
        ranking_service
            .run(
                ranking::RankingRequestHandler::new(ranking_store),
                &mut ranking_rx,
            )
            .await;
    });

    println!("[SUCCESS] Started services.");

    Ok(http::AppState {
        user_tx,
        stream_tx,
        gift_tx,
        wallet_tx,
        chat_tx,
        ranking_tx,
        hub,
        store,
    })
}
