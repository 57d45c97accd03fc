use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::ranking::{RankPeriod, RankedUser, TopFan};
use crate::repositories::store::MemoryStore;
use crate::repositories::transactions::LedgerRepository;

pub enum RankingRequest {
    Ranking {
        period: RankPeriod,
        response: oneshot::Sender<Result<Vec<RankedUser>, ServiceError>>,
    },
    TopFans {
        response: oneshot::Sender<Result<Vec<TopFan>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct RankingRequestHandler {
    repository: LedgerRepository,
}

impl RankingRequestHandler {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        let repository = LedgerRepository::new(store);

        RankingRequestHandler { repository }
    }
}

#[async_trait]
impl RequestHandler<RankingRequest> for RankingRequestHandler {
    async fn handle_request(&self, request: RankingRequest) {
        match request {
            RankingRequest::Ranking { period, response } => {
                let _ = response.send(Ok(self.repository.ranking(period)));
            }
            RankingRequest::TopFans { response } => {
                let _ = response.send(Ok(self.repository.top_fans()));
            }
        }
    }
}

pub struct RankingService;

impl RankingService {
    pub fn new() -> Self {
        RankingService {}
    }
}

#[async_trait]
impl Service<RankingRequest, RankingRequestHandler> for RankingService {}
