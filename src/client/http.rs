use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::api::{Api, ApiError, Session};
use super::bridge::{connect_socket, EventBridge, SocketHandle};
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

#[derive(Deserialize)]
struct EmailAck {
    email: Option<String>,
}

#[derive(Deserialize)]
struct FollowAck {
    following: bool,
}

fn encode_query(value: &str) -> String {
    value.replace(' ', "%20")
}

/// Real-mode facade: one HTTP round-trip per operation, session token kept
/// as an in-memory mirror.
pub struct HttpApi {
    base_url: String,
    ws_url: String,
    http: reqwest::Client,
    session: RwLock<Option<Session>>,
    socket: Mutex<Option<SocketHandle>>,
    bridge: Arc<EventBridge>,
}

impl HttpApi {
    pub fn new(base_url: String, ws_url: String) -> Self {
        HttpApi {
            base_url,
            ws_url,
            http: reqwest::Client::new(),
            session: RwLock::new(None),
            socket: Mutex::new(None),
            bridge: EventBridge::new(),
        }
    }

    async fn token(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.token.clone())
    }

    async fn session_user(&self) -> Result<User, ApiError> {
        match self.session.read().await.as_ref() {
            Some(session) => Ok(session.user.clone()),
            None => Err(ApiError::Unauthenticated),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let request_id = Uuid::new_v4().hyphenated().to_string();
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header("X-Request-ID", request_id.clone())
            .header("X-Request-Timestamp", Utc::now().to_rfc3339());
        if let Some(token) = self.token().await {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        log::debug!("[api-request][{}] {} {}", request_id, method, path);
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| format!("request failed with status {}", status));
            log::warn!("[api-request][{}] {} -> {}", request_id, path, status);
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }

    async fn ack(&self, method: Method, path: &str, body: Option<Value>) -> Result<(), ApiError> {
        let _: Value = self.request(method, path, body).await?;
        Ok(())
    }
}

#[async_trait]
impl Api for HttpApi {
    fn events(&self) -> Arc<EventBridge> {
        self.bridge.clone()
    }

    async fn connect_events(&self) -> Result<(), ApiError> {
        let user = self.session_user().await?;

        let mut socket = self.socket.lock().await;
        if socket.is_none() {
            *socket = Some(connect_socket(
                &self.ws_url,
                &user.id,
                &user.name,
                self.bridge.clone(),
            ));
        }
        Ok(())
    }

    async fn emit(&self, event: ClientEvent) -> Result<(), ApiError> {
        match self.socket.lock().await.as_ref() {
            Some(handle) => handle.send(event),
            None => Err(ApiError::NotConnected),
        }
    }

    async fn register(&self, new_user: NewUser) -> Result<AuthResponse, ApiError> {
        let auth: AuthResponse = self
            .request(
                Method::POST,
                "/auth/register",
                Some(json!({
                    "name": new_user.name,
                    "email": new_user.email,
                    "password": new_user.password,
                })),
            )
            .await?;

        *self.session.write().await = Some(Session {
            token: auth.token.clone(),
            user: auth.user.clone(),
        });
        Ok(auth)
    }

    async fn login(&self, credentials: Credentials) -> Result<AuthResponse, ApiError> {
        let auth: AuthResponse = self
            .request(Method::POST, "/auth/login", Some(json!(credentials)))
            .await?;

        *self.session.write().await = Some(Session {
            token: auth.token.clone(),
            user: auth.user.clone(),
        });
        Ok(auth)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let result = self.ack(Method::POST, "/auth/logout", None).await;
        *self.session.write().await = None;
        *self.socket.lock().await = None;
        result
    }

    async fn last_email(&self) -> Result<Option<String>, ApiError> {
        let ack: EmailAck = self.request(Method::GET, "/auth/last-email", None).await?;
        Ok(ack.email)
    }

    async fn save_last_email(&self, email: &str) -> Result<(), ApiError> {
        self.ack(
            Method::POST,
            "/auth/save-email",
            Some(json!({"email": email})),
        )
        .await
    }

    async fn me(&self) -> Result<User, ApiError> {
        self.request(Method::GET, "/users/me", None).await
    }

    async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        self.request(Method::GET, &format!("/users/{id}"), None).await
    }

    async fn online_users(&self, room_id: &str) -> Result<Vec<User>, ApiError> {
        self.request(
            Method::GET,
            &format!("/users/online?roomId={}", encode_query(room_id)),
            None,
        )
        .await
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>, ApiError> {
        self.request(
            Method::GET,
            &format!("/users/search?q={}", encode_query(query)),
            None,
        )
        .await
    }

    async fn update_profile(&self, patch: UserPatch) -> Result<User, ApiError> {
        let user = self.session_user().await?;
        let updated: User = self
            .request(
                Method::POST,
                &format!("/users/{}", user.id),
                Some(json!(patch)),
            )
            .await?;

        if let Some(session) = self.session.write().await.as_mut() {
            session.user = updated.clone();
        }
        Ok(updated)
    }

    async fn toggle_follow(&self, target_id: &str) -> Result<bool, ApiError> {
        let ack: FollowAck = self
            .request(Method::POST, &format!("/users/{target_id}/follow"), None)
            .await?;
        Ok(ack.following)
    }

    async fn fans(&self, id: &str) -> Result<Vec<User>, ApiError> {
        self.request(Method::GET, &format!("/users/{id}/fans"), None).await
    }

    async fn friends(&self, id: &str) -> Result<Vec<User>, ApiError> {
        self.request(Method::GET, &format!("/users/{id}/friends"), None)
            .await
    }

    async fn following(&self, id: &str) -> Result<Vec<User>, ApiError> {
        self.request(Method::GET, &format!("/users/{id}/following"), None)
            .await
    }

    async fn set_language(&self, code: &str) -> Result<User, ApiError> {
        self.request(
            Method::POST,
            "/users/me/language",
            Some(json!({"code": code})),
        )
        .await
    }

    async fn blocklist(&self) -> Result<Vec<User>, ApiError> {
        self.request(Method::GET, "/users/me/blocklist", None).await
    }

    async fn block_user(&self, id: &str) -> Result<(), ApiError> {
        self.ack(Method::POST, &format!("/users/me/blocklist/{id}"), None)
            .await
    }

    async fn unblock_user(&self, id: &str) -> Result<(), ApiError> {
        self.ack(
            Method::POST,
            &format!("/users/me/blocklist/{id}/unblock"),
            None,
        )
        .await
    }

    async fn reminders(&self) -> Result<Vec<Reminder>, ApiError> {
        self.request(Method::GET, "/users/me/reminders", None).await
    }

    async fn remove_reminder(&self, id: &str) -> Result<(), ApiError> {
        self.ack(Method::DELETE, &format!("/users/me/reminders/{id}"), None)
            .await
    }

    async fn watch_history(&self) -> Result<Vec<WatchHistoryEntry>, ApiError> {
        self.request(Method::GET, "/users/me/history", None).await
    }

    async fn list_streams(
        &self,
        category: &str,
        region: Option<&str>,
    ) -> Result<Vec<Stream>, ApiError> {
        self.request(
            Method::GET,
            &format!("/live/{}?region={}", category, region.unwrap_or("global")),
            None,
        )
        .await
    }

    async fn create_stream(&self, new_stream: NewStream) -> Result<Stream, ApiError> {
        self.request(Method::POST, "/streams", Some(json!(new_stream)))
            .await
    }

    async fn update_stream(&self, id: &str, patch: StreamPatch) -> Result<Stream, ApiError> {
        self.request(Method::PATCH, &format!("/streams/{id}"), Some(json!(patch)))
            .await
    }

    async fn set_stream_quality(
        &self,
        id: &str,
        quality: StreamQuality,
    ) -> Result<Stream, ApiError> {
        self.request(
            Method::PATCH,
            &format!("/streams/{id}/quality"),
            Some(json!({"quality": quality})),
        )
        .await
    }

    async fn end_stream(&self, id: &str) -> Result<(), ApiError> {
        self.ack(Method::DELETE, &format!("/streams/{id}"), None).await
    }

    async fn search_streams(&self, query: &str) -> Result<Vec<Stream>, ApiError> {
        self.request(
            Method::GET,
            &format!("/streams/search?q={}", encode_query(query)),
            None,
        )
        .await
    }

    async fn stream_donors(&self, id: &str) -> Result<Vec<User>, ApiError> {
        self.request(Method::GET, &format!("/streams/{id}/donors"), None)
            .await
    }

    async fn list_gifts(&self, category: Option<&str>) -> Result<Vec<Gift>, ApiError> {
        self.request(
            Method::GET,
            &format!("/gifts?category={}", category.unwrap_or("popular")),
            None,
        )
        .await
    }

    async fn gift_gallery(&self) -> Result<Vec<OwnedGift>, ApiError> {
        self.request(Method::GET, "/gifts/gallery", None).await
    }

    async fn send_gift(&self, request: SendGift) -> Result<SendGiftResponse, ApiError> {
        self.request(Method::POST, "/gift", Some(json!(request))).await
    }

    async fn recharge(&self) -> Result<User, ApiError> {
        self.request(Method::POST, "/gifts/recharge", None).await
    }

    async fn wallet_balance(&self) -> Result<WalletBalance, ApiError> {
        self.request(Method::GET, "/wallet/balance", None).await
    }

    async fn purchase_diamonds(&self, request: PurchaseRequest) -> Result<User, ApiError> {
        self.request(Method::POST, "/wallet/purchase", Some(json!(request)))
            .await
    }

    async fn withdraw_quote(&self, amount: i64) -> Result<WithdrawQuote, ApiError> {
        self.request(
            Method::POST,
            "/earnings/withdraw/calculate",
            Some(json!({"amount": amount})),
        )
        .await
    }

    async fn request_withdrawal(&self, amount: i64) -> Result<(), ApiError> {
        self.ack(
            Method::POST,
            "/earnings/withdraw/request",
            Some(json!({"amount": amount})),
        )
        .await
    }

    async fn update_withdrawal_method(
        &self,
        method: WithdrawalMethod,
    ) -> Result<User, ApiError> {
        self.request(
            Method::POST,
            "/earnings/withdraw/methods",
            Some(json!(method)),
        )
        .await
    }

    async fn withdrawal_history(
        &self,
        status: Option<RecordStatus>,
    ) -> Result<Vec<LedgerRecord>, ApiError> {
        let status = status
            .map(|s| serde_json::to_value(s).ok())
            .flatten()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "all".to_string());

        self.request(
            Method::GET,
            &format!("/users/me/withdrawal-history?status={status}"),
            None,
        )
        .await
    }

    async fn admin_withdrawals(&self) -> Result<Vec<LedgerRecord>, ApiError> {
        self.request(Method::GET, "/admin/withdrawals", None).await
    }

    async fn admin_request_withdrawal(&self) -> Result<(), ApiError> {
        self.ack(Method::POST, "/admin/withdrawals/request", None).await
    }

    async fn admin_update_method(&self, email: &str) -> Result<(), ApiError> {
        self.ack(
            Method::POST,
            "/admin/withdrawals/method",
            Some(json!({"email": email})),
        )
        .await
    }

    async fn conversations(&self) -> Result<Vec<ConversationView>, ApiError> {
        self.request(Method::GET, "/chats/conversations", None).await
    }

    async fn start_conversation(&self, user_id: &str) -> Result<ConversationView, ApiError> {
        self.request(
            Method::POST,
            "/chats/start",
            Some(json!({"user_id": user_id})),
        )
        .await
    }

    async fn ranking(&self, period: RankPeriod) -> Result<Vec<RankedUser>, ApiError> {
        let period = match period {
            RankPeriod::Daily => "daily",
            RankPeriod::Weekly => "weekly",
            RankPeriod::Monthly => "monthly",
        };
        self.request(Method::GET, &format!("/ranking/{period}"), None)
            .await
    }

    async fn top_fans(&self) -> Result<Vec<TopFan>, ApiError> {
        self.request(Method::GET, "/ranking/top-fans", None).await
    }
}
