use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{repo_error, RequestHandler, Service, ServiceError};
use crate::models::streams::{NewStream, Stream, StreamPatch, StreamQuality};
use crate::models::users::User;
use crate::repositories::store::MemoryStore;
use crate::repositories::streams::StreamRepository;

pub enum StreamRequest {
    List {
        category: String,
        region: Option<String>,
        response: oneshot::Sender<Result<Vec<Stream>, ServiceError>>,
    },
    Create {
        host_id: String,
        new_stream: NewStream,
        response: oneshot::Sender<Result<Stream, ServiceError>>,
    },
    Patch {
        id: String,
        patch: StreamPatch,
        response: oneshot::Sender<Result<Stream, ServiceError>>,
    },
    SetQuality {
        id: String,
        quality: StreamQuality,
        response: oneshot::Sender<Result<Stream, ServiceError>>,
    },
    End {
        id: String,
        host_id: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    Search {
        query: String,
        response: oneshot::Sender<Result<Vec<Stream>, ServiceError>>,
    },
    Donors {
        stream_id: String,
        response: oneshot::Sender<Result<Vec<User>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct StreamRequestHandler {
    repository: StreamRepository,
}

impl StreamRequestHandler {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        let repository = StreamRepository::new(store);

        StreamRequestHandler { repository }
    }
}

#[async_trait]
impl RequestHandler<StreamRequest> for StreamRequestHandler {
    async fn handle_request(&self, request: StreamRequest) {
        match request {
            StreamRequest::List {
                category,
                region,
                response,
            } => {
                let streams = self.repository.list(&category, region.as_deref());
                let _ = response.send(Ok(streams));
            }
            StreamRequest::Create {
                host_id,
                new_stream,
                response,
            } => {
                let result = self
                    .repository
                    .create(&host_id, new_stream)
                    .map_err(repo_error);
                let _ = response.send(result);
            }
            StreamRequest::Patch {
                id,
                patch,
                response,
            } => {
                let _ = response.send(self.repository.patch(&id, patch).map_err(repo_error));
            }
            StreamRequest::SetQuality {
                id,
                quality,
                response,
            } => {
                let result = self
                    .repository
                    .set_quality(&id, quality)
                    .map_err(repo_error);
                let _ = response.send(result);
            }
            StreamRequest::End {
                id,
                host_id,
                response,
            } => {
                let _ = response.send(self.repository.end(&id, &host_id).map_err(repo_error));
            }
            StreamRequest::Search { query, response } => {
                let _ = response.send(Ok(self.repository.search(&query)));
            }
            StreamRequest::Donors {
                stream_id,
                response,
            } => {
                let _ = response.send(self.repository.donors(&stream_id).map_err(repo_error));
            }
        }
    }
}

pub struct StreamService;

impl StreamService {
    pub fn new() -> Self {
        StreamService {}
    }
}

#[async_trait]
impl Service<StreamRequest, StreamRequestHandler> for StreamService {}
