use std::sync::Arc;

use async_trait::async_trait;

use super::bridge::EventBridge;
use crate::models::chat::ConversationView;
use crate::models::events::ClientEvent;
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

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend (or the mock) rejected the call.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("not authenticated")]
    Unauthenticated,
    #[error("event channel not connected")]
    NotConnected,
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Locally cached login state. The session survives only for the process
/// lifetime; there is no durable storage behind it.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// The full client-server capability set. `HttpApi` and `MockApi` both
/// conform; callers never know which mode they are in.
#[async_trait]
pub trait Api: Send + Sync {
    /// Typed replacement for the string-keyed event registry.
    fn events(&self) -> Arc<EventBridge>;
    /// Attaches the push channel for the logged-in user.
    async fn connect_events(&self) -> Result<(), ApiError>;
    /// Pushes a client event into the current room.
    async fn emit(&self, event: ClientEvent) -> Result<(), ApiError>;

    async fn register(&self, new_user: NewUser) -> Result<AuthResponse, ApiError>;
    async fn login(&self, credentials: Credentials) -> Result<AuthResponse, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn last_email(&self) -> Result<Option<String>, ApiError>;
    async fn save_last_email(&self, email: &str) -> Result<(), ApiError>;

    async fn me(&self) -> Result<User, ApiError>;
    async fn get_user(&self, id: &str) -> Result<User, ApiError>;
    async fn online_users(&self, room_id: &str) -> Result<Vec<User>, ApiError>;
    async fn search_users(&self, query: &str) -> Result<Vec<User>, ApiError>;
    async fn update_profile(&self, patch: UserPatch) -> Result<User, ApiError>;
    /// Returns whether the caller now follows the target.
    async fn toggle_follow(&self, target_id: &str) -> Result<bool, ApiError>;
    async fn fans(&self, id: &str) -> Result<Vec<User>, ApiError>;
    async fn friends(&self, id: &str) -> Result<Vec<User>, ApiError>;
    async fn following(&self, id: &str) -> Result<Vec<User>, ApiError>;
    async fn set_language(&self, code: &str) -> Result<User, ApiError>;
    async fn blocklist(&self) -> Result<Vec<User>, ApiError>;
    async fn block_user(&self, id: &str) -> Result<(), ApiError>;
    async fn unblock_user(&self, id: &str) -> Result<(), ApiError>;
    async fn reminders(&self) -> Result<Vec<Reminder>, ApiError>;
    async fn remove_reminder(&self, id: &str) -> Result<(), ApiError>;
    async fn watch_history(&self) -> Result<Vec<WatchHistoryEntry>, ApiError>;

    async fn list_streams(
        &self,
        category: &str,
        region: Option<&str>,
    ) -> Result<Vec<Stream>, ApiError>;
    async fn create_stream(&self, new_stream: NewStream) -> Result<Stream, ApiError>;
    async fn update_stream(&self, id: &str, patch: StreamPatch) -> Result<Stream, ApiError>;
    async fn set_stream_quality(
        &self,
        id: &str,
        quality: StreamQuality,
    ) -> Result<Stream, ApiError>;
    async fn end_stream(&self, id: &str) -> Result<(), ApiError>;
    async fn search_streams(&self, query: &str) -> Result<Vec<Stream>, ApiError>;
    async fn stream_donors(&self, id: &str) -> Result<Vec<User>, ApiError>;

    async fn list_gifts(&self, category: Option<&str>) -> Result<Vec<Gift>, ApiError>;
    async fn gift_gallery(&self) -> Result<Vec<OwnedGift>, ApiError>;
    /// Failures (insufficient balance, transport) leave the caller free to
    /// revert any optimistic UI state.
    async fn send_gift(&self, request: SendGift) -> Result<SendGiftResponse, ApiError>;
    async fn recharge(&self) -> Result<User, ApiError>;

    async fn wallet_balance(&self) -> Result<WalletBalance, ApiError>;
    async fn purchase_diamonds(&self, request: PurchaseRequest) -> Result<User, ApiError>;
    async fn withdraw_quote(&self, amount: i64) -> Result<WithdrawQuote, ApiError>;
    async fn request_withdrawal(&self, amount: i64) -> Result<(), ApiError>;
    async fn update_withdrawal_method(
        &self,
        method: WithdrawalMethod,
    ) -> Result<User, ApiError>;
    async fn withdrawal_history(
        &self,
        status: Option<RecordStatus>,
    ) -> Result<Vec<LedgerRecord>, ApiError>;

    async fn admin_withdrawals(&self) -> Result<Vec<LedgerRecord>, ApiError>;
    async fn admin_request_withdrawal(&self) -> Result<(), ApiError>;
    async fn admin_update_method(&self, email: &str) -> Result<(), ApiError>;

    async fn conversations(&self) -> Result<Vec<ConversationView>, ApiError>;
    async fn start_conversation(&self, user_id: &str) -> Result<ConversationView, ApiError>;

    async fn ranking(&self, period: RankPeriod) -> Result<Vec<RankedUser>, ApiError>;
    async fn top_fans(&self) -> Result<Vec<TopFan>, ApiError>;
}
