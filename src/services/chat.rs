use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{repo_error, RequestHandler, Service, ServiceError};
use crate::models::chat::ConversationView;
use crate::repositories::chat::ChatRepository;
use crate::repositories::store::MemoryStore;

pub enum ChatRequest {
    Conversations {
        user_id: String,
        response: oneshot::Sender<Result<Vec<ConversationView>, ServiceError>>,
    },
    Start {
        user_id: String,
        peer_id: String,
        response: oneshot::Sender<Result<ConversationView, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct ChatRequestHandler {
    repository: ChatRepository,
}

impl ChatRequestHandler {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        let repository = ChatRepository::new(store);

        ChatRequestHandler { repository }
    }
}

#[async_trait]
impl RequestHandler<ChatRequest> for ChatRequestHandler {
    async fn handle_request(&self, request: ChatRequest) {
        match request {
            ChatRequest::Conversations { user_id, response } => {
                let _ = response.send(Ok(self.repository.conversations(&user_id)));
            }
            ChatRequest::Start {
                user_id,
                peer_id,
                response,
            } => {
                let result = self
                    .repository
                    .start(&user_id, &peer_id)
                    .map_err(repo_error);
                let _ = response.send(result);
            }
        }
    }
}

pub struct ChatService;

impl ChatService {
    pub fn new() -> Self {
        ChatService {}
    }
}

#[async_trait]
impl Service<ChatRequest, ChatRequestHandler> for ChatService {}
