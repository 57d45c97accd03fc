use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{repo_error, RequestHandler, Service, ServiceError};
use crate::models::users::{
    AuthResponse, Credentials, NewUser, Reminder, User, UserPatch, WatchHistoryEntry,
};
use crate::repositories::store::MemoryStore;
use crate::repositories::users::UserRepository;

pub enum UserRequest {
    Register {
        new_user: NewUser,
        response: oneshot::Sender<Result<AuthResponse, ServiceError>>,
    },
    Login {
        credentials: Credentials,
        response: oneshot::Sender<Result<AuthResponse, ServiceError>>,
    },
    Logout {
        token: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    LastEmail {
        response: oneshot::Sender<Result<Option<String>, ServiceError>>,
    },
    SaveEmail {
        email: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    GetUser {
        id: String,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
    UpdateUser {
        id: String,
        patch: UserPatch,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
    Search {
        query: String,
        response: oneshot::Sender<Result<Vec<User>, ServiceError>>,
    },
    OnlineUsers {
        room_id: String,
        response: oneshot::Sender<Result<Vec<User>, ServiceError>>,
    },
    ToggleFollow {
        user_id: String,
        target_id: String,
        response: oneshot::Sender<Result<bool, ServiceError>>,
    },
    Fans {
        id: String,
        response: oneshot::Sender<Result<Vec<User>, ServiceError>>,
    },
    Friends {
        id: String,
        response: oneshot::Sender<Result<Vec<User>, ServiceError>>,
    },
    Following {
        id: String,
        response: oneshot::Sender<Result<Vec<User>, ServiceError>>,
    },
    SetLanguage {
        user_id: String,
        code: String,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
    Block {
        user_id: String,
        target_id: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    Unblock {
        user_id: String,
        target_id: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    Blocklist {
        user_id: String,
        response: oneshot::Sender<Result<Vec<User>, ServiceError>>,
    },
    Reminders {
        user_id: String,
        response: oneshot::Sender<Result<Vec<Reminder>, ServiceError>>,
    },
    RemoveReminder {
        user_id: String,
        reminder_id: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    WatchHistory {
        user_id: String,
        response: oneshot::Sender<Result<Vec<WatchHistoryEntry>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct UserRequestHandler {
    repository: UserRepository,
}

impl UserRequestHandler {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        let repository = UserRepository::new(store);

        UserRequestHandler { repository }
    }

    fn register(&self, new_user: NewUser) -> Result<AuthResponse, ServiceError> {
        self.repository.register(new_user).map_err(repo_error)
    }

    fn login(&self, credentials: Credentials) -> Result<AuthResponse, ServiceError> {
        self.repository
            .login(credentials)
            .map_err(|e| ServiceError::Unauthorized(e.to_string()))
    }
}

#[async_trait]
impl RequestHandler<UserRequest> for UserRequestHandler {
    async fn handle_request(&self, request: UserRequest) {
        match request {
            UserRequest::Register { new_user, response } => {
                let _ = response.send(self.register(new_user));
            }
            UserRequest::Login {
                credentials,
                response,
            } => {
                let _ = response.send(self.login(credentials));
            }
            UserRequest::Logout { token, response } => {
                self.repository.logout(&token);
                let _ = response.send(Ok(()));
            }
            UserRequest::LastEmail { response } => {
                let _ = response.send(Ok(self.repository.last_email()));
            }
            UserRequest::SaveEmail { email, response } => {
                self.repository.save_last_email(email);
                let _ = response.send(Ok(()));
            }
            UserRequest::GetUser { id, response } => {
                let _ = response.send(self.repository.get(&id).map_err(repo_error));
            }
            UserRequest::UpdateUser {
                id,
                patch,
                response,
            } => {
                let _ = response.send(self.repository.update(&id, patch).map_err(repo_error));
            }
            UserRequest::Search { query, response } => {
                let _ = response.send(Ok(self.repository.search(&query)));
            }
            UserRequest::OnlineUsers { room_id, response } => {
                let _ = response.send(Ok(self.repository.online_users(&room_id)));
            }
            UserRequest::ToggleFollow {
                user_id,
                target_id,
                response,
            } => {
                let result = self
                    .repository
                    .toggle_follow(&user_id, &target_id)
                    .map_err(repo_error);
                let _ = response.send(result);
            }
            UserRequest::Fans { id, response } => {
                let _ = response.send(Ok(self.repository.fans(&id)));
            }
            UserRequest::Friends { id, response } => {
                let _ = response.send(self.repository.friends(&id).map_err(repo_error));
            }
            UserRequest::Following { id, response } => {
                let _ = response.send(self.repository.following_users(&id).map_err(repo_error));
            }
            UserRequest::SetLanguage {
                user_id,
                code,
                response,
            } => {
                let result = self
                    .repository
                    .set_language(&user_id, code)
                    .map_err(repo_error);
                let _ = response.send(result);
            }
            UserRequest::Block {
                user_id,
                target_id,
                response,
            } => {
                let result = self
                    .repository
                    .block(&user_id, &target_id)
                    .map_err(repo_error);
                let _ = response.send(result);
            }
            UserRequest::Unblock {
                user_id,
                target_id,
                response,
            } => {
                let result = self
                    .repository
                    .unblock(&user_id, &target_id)
                    .map_err(repo_error);
                let _ = response.send(result);
            }
            UserRequest::Blocklist { user_id, response } => {
                let _ = response.send(self.repository.blocklist(&user_id).map_err(repo_error));
            }
            UserRequest::Reminders { user_id, response } => {
                let _ = response.send(Ok(self.repository.reminders(&user_id)));
            }
            UserRequest::RemoveReminder {
                user_id,
                reminder_id,
                response,
            } => {
                let result = self
                    .repository
                    .remove_reminder(&user_id, &reminder_id)
                    .map_err(repo_error);
                let _ = response.send(result);
            }
            UserRequest::WatchHistory { user_id, response } => {
                let _ = response.send(Ok(self.repository.watch_history(&user_id)));
            }
        }
    }
}

pub struct UserService;

impl UserService {
    pub fn new() -> Self {
        UserService {}
    }
}

#[async_trait]
impl Service<UserRequest, UserRequestHandler> for UserService {}
