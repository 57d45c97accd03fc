use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::api::{Api, ApiError, Session};
use super::bridge::EventBridge;
use crate::models::chat::ConversationView;
use crate::models::events::{ClientEvent, ServerEvent, StreamMessage};
use crate::models::gifts::{Gift, OwnedGift, SendGift, SendGiftResponse};
use crate::models::ranking::{RankPeriod, RankedUser, TopFan};
use crate::models::streams::{NewStream, Stream, StreamPatch, StreamQuality};
use crate::models::transactions::{
    LedgerRecord, PurchaseRequest, RecordStatus, WalletBalance, WithdrawQuote,
};
use crate::models::users::{
    AuthResponse, Credentials, NewUser, Reminder, User, UserPatch, WatchHistoryEntry,
    WithdrawalMethod,
};
use crate::repositories::chat::ChatRepository;
use crate::repositories::gifts::GiftRepository;
use crate::repositories::store::MemoryStore;
use crate::repositories::streams::StreamRepository;
use crate::repositories::transactions::LedgerRepository;
use crate::repositories::users::UserRepository;
use crate::settings::Economy;

fn mock_error(error: anyhow::Error) -> ApiError {
    let message = error.to_string();
    let status = if message.contains("not found") { 404 } else { 400 };
    ApiError::Api { status, message }
}

/// Mock-mode facade: short-circuits every call to the in-memory store the
/// server would own, and drives the event bridge itself to simulate server
/// push. Same repositories, same response types as the real thing.
pub struct MockApi {
    store: Arc<MemoryStore>,
    users: UserRepository,
    streams: StreamRepository,
    gifts: GiftRepository,
    ledger: LedgerRepository,
    chat: ChatRepository,
    session: RwLock<Option<Session>>,
    bridge: Arc<EventBridge>,
}

impl MockApi {
    pub fn new(economy: Economy) -> Self {
        Self::with_store(MemoryStore::seeded(economy))
    }

    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        MockApi {
            users: UserRepository::new(store.clone()),
            streams: StreamRepository::new(store.clone()),
            gifts: GiftRepository::new(store.clone()),
            ledger: LedgerRepository::new(store.clone()),
            chat: ChatRepository::new(store.clone()),
            store,
            session: RwLock::new(None),
            bridge: EventBridge::new(),
        }
    }

    /// The backing store, shared with any server running in-process.
    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }

    async fn session_user(&self) -> Result<User, ApiError> {
        let id = match self.session.read().await.as_ref() {
            Some(session) => session.user.id.clone(),
            None => return Err(ApiError::Unauthenticated),
        };
        // Always re-read, the store is the source of truth.
        self.users.get(&id).map_err(mock_error)
    }
}

#[async_trait]
impl Api for MockApi {
    fn events(&self) -> Arc<EventBridge> {
        self.bridge.clone()
    }

    async fn connect_events(&self) -> Result<(), ApiError> {
        // Nothing to attach, the bridge is driven locally.
        self.session_user().await.map(|_| ())
    }

    /// Mirrors what the server's room fan-out would do for this client.
    async fn emit(&self, event: ClientEvent) -> Result<(), ApiError> {
        let user = self.session_user().await?;

        match event {
            ClientEvent::JoinStream { stream_id } => {
                self.bridge.emit(&ServerEvent::UserJoined {
                    stream_id,
                    user_id: user.id,
                    username: user.name,
                    timestamp: Utc::now(),
                });
            }
            ClientEvent::LeaveStream { stream_id } => {
                self.bridge.emit(&ServerEvent::UserLeft {
                    stream_id,
                    user_id: user.id,
                    username: user.name,
                });
            }
            ClientEvent::StreamMessage { stream_id, text } => {
                self.bridge.emit(&ServerEvent::StreamMessage(StreamMessage {
                    id: Uuid::new_v4().hyphenated().to_string(),
                    stream_id,
                    sender_id: user.id,
                    sender_name: user.name,
                    text,
                    sent_at: Utc::now(),
                }));
            }
            ClientEvent::StreamGift(payload) => {
                self.bridge.emit(&ServerEvent::StreamGift(payload));
            }
            ClientEvent::PkStart {
                stream_id,
                opponent_id,
            } => {
                self.bridge.emit(&ServerEvent::PkStatus {
                    stream_id,
                    active: true,
                    opponent_id: Some(opponent_id),
                });
            }
        }
        Ok(())
    }

    async fn register(&self, new_user: NewUser) -> Result<AuthResponse, ApiError> {
        let auth = self.users.register(new_user).map_err(mock_error)?;
        *self.session.write().await = Some(Session {
            token: auth.token.clone(),
            user: auth.user.clone(),
        });
        Ok(auth)
    }

    async fn login(&self, credentials: Credentials) -> Result<AuthResponse, ApiError> {
        let auth = self.users.login(credentials).map_err(|e| ApiError::Api {
            status: 401,
            message: e.to_string(),
        })?;
        *self.session.write().await = Some(Session {
            token: auth.token.clone(),
            user: auth.user.clone(),
        });
        Ok(auth)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        if let Some(session) = self.session.write().await.take() {
            self.users.logout(&session.token);
        }
        Ok(())
    }

    async fn last_email(&self) -> Result<Option<String>, ApiError> {
        Ok(self.users.last_email())
    }

    async fn save_last_email(&self, email: &str) -> Result<(), ApiError> {
        self.users.save_last_email(email.to_string());
        Ok(())
    }

    async fn me(&self) -> Result<User, ApiError> {
        self.session_user().await
    }

    async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        self.users.get(id).map_err(mock_error)
    }

    async fn online_users(&self, room_id: &str) -> Result<Vec<User>, ApiError> {
        Ok(self.users.online_users(room_id))
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>, ApiError> {
        Ok(self.users.search(query))
    }

    async fn update_profile(&self, patch: UserPatch) -> Result<User, ApiError> {
        let user = self.session_user().await?;
        let updated = self.users.update(&user.id, patch).map_err(mock_error)?;

        if let Some(session) = self.session.write().await.as_mut() {
            session.user = updated.clone();
        }
        Ok(updated)
    }

    async fn toggle_follow(&self, target_id: &str) -> Result<bool, ApiError> {
        let user = self.session_user().await?;
        self.users
            .toggle_follow(&user.id, target_id)
            .map_err(mock_error)
    }

    async fn fans(&self, id: &str) -> Result<Vec<User>, ApiError> {
        Ok(self.users.fans(id))
    }

    async fn friends(&self, id: &str) -> Result<Vec<User>, ApiError> {
        self.users.friends(id).map_err(mock_error)
    }

    async fn following(&self, id: &str) -> Result<Vec<User>, ApiError> {
        self.users.following_users(id).map_err(mock_error)
    }

    async fn set_language(&self, code: &str) -> Result<User, ApiError> {
        let user = self.session_user().await?;
        self.users
            .set_language(&user.id, code.to_string())
            .map_err(mock_error)
    }

    async fn blocklist(&self) -> Result<Vec<User>, ApiError> {
        let user = self.session_user().await?;
        self.users.blocklist(&user.id).map_err(mock_error)
    }

    async fn block_user(&self, id: &str) -> Result<(), ApiError> {
        let user = self.session_user().await?;
        self.users.block(&user.id, id).map_err(mock_error)
    }

    async fn unblock_user(&self, id: &str) -> Result<(), ApiError> {
        let user = self.session_user().await?;
        self.users.unblock(&user.id, id).map_err(mock_error)
    }

    async fn reminders(&self) -> Result<Vec<Reminder>, ApiError> {
        let user = self.session_user().await?;
        Ok(self.users.reminders(&user.id))
    }

    async fn remove_reminder(&self, id: &str) -> Result<(), ApiError> {
        let user = self.session_user().await?;
        self.users.remove_reminder(&user.id, id).map_err(mock_error)
    }

    async fn watch_history(&self) -> Result<Vec<WatchHistoryEntry>, ApiError> {
        let user = self.session_user().await?;
        Ok(self.users.watch_history(&user.id))
    }

    async fn list_streams(
        &self,
        category: &str,
        region: Option<&str>,
    ) -> Result<Vec<Stream>, ApiError> {
        Ok(self.streams.list(category, region))
    }

    async fn create_stream(&self, new_stream: NewStream) -> Result<Stream, ApiError> {
        let user = self.session_user().await?;
        self.streams.create(&user.id, new_stream).map_err(mock_error)
    }

    async fn update_stream(&self, id: &str, patch: StreamPatch) -> Result<Stream, ApiError> {
        self.streams.patch(id, patch).map_err(mock_error)
    }

    async fn set_stream_quality(
        &self,
        id: &str,
        quality: StreamQuality,
    ) -> Result<Stream, ApiError> {
        self.streams.set_quality(id, quality).map_err(mock_error)
    }

    async fn end_stream(&self, id: &str) -> Result<(), ApiError> {
        let user = self.session_user().await?;
        self.streams.end(id, &user.id).map_err(mock_error)
    }

    async fn search_streams(&self, query: &str) -> Result<Vec<Stream>, ApiError> {
        Ok(self.streams.search(query))
    }

    async fn stream_donors(&self, id: &str) -> Result<Vec<User>, ApiError> {
        self.streams.donors(id).map_err(mock_error)
    }

    async fn list_gifts(&self, category: Option<&str>) -> Result<Vec<Gift>, ApiError> {
        Ok(self.gifts.catalog(category))
    }

    async fn gift_gallery(&self) -> Result<Vec<OwnedGift>, ApiError> {
        let user = self.session_user().await?;
        Ok(self.gifts.gallery(&user.id))
    }

    async fn send_gift(&self, request: SendGift) -> Result<SendGiftResponse, ApiError> {
        let user = self.session_user().await?;
        let delivery = self
            .gifts
            .send(
                &user.id,
                &request.stream_id,
                &request.gift_name,
                request.count,
                request.target_id.as_deref(),
            )
            .map_err(mock_error)?;

        // Simulated server push, exactly what the room would receive.
        self.bridge
            .emit(&ServerEvent::StreamGift(delivery.payload));

        Ok(SendGiftResponse {
            updated_sender: delivery.updated_sender,
            leveled_up: delivery.leveled_up,
        })
    }

    async fn recharge(&self) -> Result<User, ApiError> {
        let user = self.session_user().await?;
        self.ledger.recharge(&user.id).map_err(mock_error)
    }

    async fn wallet_balance(&self) -> Result<WalletBalance, ApiError> {
        let user = self.session_user().await?;
        self.ledger.balance(&user.id).map_err(mock_error)
    }

    async fn purchase_diamonds(&self, request: PurchaseRequest) -> Result<User, ApiError> {
        let user = self.session_user().await?;
        self.ledger
            .purchase(&user.id, request.diamonds, request.price_cents)
            .map_err(mock_error)
    }

    async fn withdraw_quote(&self, amount: i64) -> Result<WithdrawQuote, ApiError> {
        Ok(self.ledger.quote(amount))
    }

    async fn request_withdrawal(&self, amount: i64) -> Result<(), ApiError> {
        let user = self.session_user().await?;
        self.ledger.withdraw(&user.id, amount).map_err(mock_error)
    }

    async fn update_withdrawal_method(
        &self,
        method: WithdrawalMethod,
    ) -> Result<User, ApiError> {
        let user = self.session_user().await?;
        self.ledger
            .update_method(&user.id, method)
            .map_err(mock_error)
    }

    async fn withdrawal_history(
        &self,
        status: Option<RecordStatus>,
    ) -> Result<Vec<LedgerRecord>, ApiError> {
        let user = self.session_user().await?;
        Ok(self.ledger.history(&user.id, status))
    }

    async fn admin_withdrawals(&self) -> Result<Vec<LedgerRecord>, ApiError> {
        self.session_user().await?;
        self.ledger.admin_history().map_err(mock_error)
    }

    async fn admin_request_withdrawal(&self) -> Result<(), ApiError> {
        let user = self.session_user().await?;
        self.ledger.admin_withdraw(&user.id).map_err(mock_error)
    }

    async fn admin_update_method(&self, email: &str) -> Result<(), ApiError> {
        let user = self.session_user().await?;
        self.ledger
            .admin_method(&user.id, email.to_string())
            .map_err(mock_error)
    }

    async fn conversations(&self) -> Result<Vec<ConversationView>, ApiError> {
        let user = self.session_user().await?;
        Ok(self.chat.conversations(&user.id))
    }

    async fn start_conversation(&self, user_id: &str) -> Result<ConversationView, ApiError> {
        let user = self.session_user().await?;
        self.chat.start(&user.id, user_id).map_err(mock_error)
    }

    async fn ranking(&self, period: RankPeriod) -> Result<Vec<RankedUser>, ApiError> {
        Ok(self.ledger.ranking(period))
    }

    async fn top_fans(&self) -> Result<Vec<TopFan>, ApiError> {
        Ok(self.ledger.top_fans())
    }
}
