use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::ws::WsHub;
use super::{repo_error, RequestHandler, Service, ServiceError};
use crate::models::events::ServerEvent;
use crate::models::gifts::{Gift, OwnedGift, SendGift, SendGiftResponse};
use crate::repositories::gifts::GiftRepository;
use crate::repositories::store::MemoryStore;

pub enum GiftRequest {
    Catalog {
        category: Option<String>,
        response: oneshot::Sender<Result<Vec<Gift>, ServiceError>>,
    },
    Gallery {
        user_id: String,
        response: oneshot::Sender<Result<Vec<OwnedGift>, ServiceError>>,
    },
    Send {
        sender_id: String,
        request: SendGift,
        response: oneshot::Sender<Result<SendGiftResponse, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct GiftRequestHandler {
    repository: GiftRepository,
    hub: WsHub,
}

impl GiftRequestHandler {
    pub fn new(store: Arc<MemoryStore>, hub: WsHub) -> Self {
        let repository = GiftRepository::new(store);

        GiftRequestHandler { repository, hub }
    }

    /// Runs the gift transaction and pushes the animation event to the room.
    fn send_gift(
        &self,
        sender_id: &str,
        request: SendGift,
    ) -> Result<SendGiftResponse, ServiceError> {
        let delivery = self
            .repository
            .send(
                sender_id,
                &request.stream_id,
                &request.gift_name,
                request.count,
                request.target_id.as_deref(),
            )
            .map_err(repo_error)?;

        self.hub.broadcast(
            &request.stream_id,
            &ServerEvent::StreamGift(delivery.payload),
        );

        Ok(SendGiftResponse {
            updated_sender: delivery.updated_sender,
            leveled_up: delivery.leveled_up,
        })
    }
}

#[async_trait]
impl RequestHandler<GiftRequest> for GiftRequestHandler {
    async fn handle_request(&self, request: GiftRequest) {
        match request {
            GiftRequest::Catalog { category, response } => {
                let _ = response.send(Ok(self.repository.catalog(category.as_deref())));
            }
            GiftRequest::Gallery { user_id, response } => {
                let _ = response.send(Ok(self.repository.gallery(&user_id)));
            }
            GiftRequest::Send {
                sender_id,
                request,
                response,
            } => {
                let _ = response.send(self.send_gift(&sender_id, request));
            }
        }
    }
}

pub struct GiftService;

impl GiftService {
    pub fn new() -> Self {
        GiftService {}
    }
}

#[async_trait]
impl Service<GiftRequest, GiftRequestHandler> for GiftService {}
