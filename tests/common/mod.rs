use std::net::SocketAddr;
use std::sync::Arc;

use livego::repositories::store::MemoryStore;
use livego::services;
use livego::settings::Economy;
use serde_json::Value;

pub fn economy() -> Economy {
    Economy {
        diamonds_per_unit: 3000,
        unit_value_cents: 2500,
        platform_fee_bps: 2000,
        earnings_share_bps: 5000,
        recharge_pack_diamonds: 5000,
    }
}

/// Serves the full router on an ephemeral port over a freshly seeded store.
pub async fn spawn_server() -> (SocketAddr, Arc<MemoryStore>) {
    let store = MemoryStore::seeded(economy());
    let state = services::start_services(store.clone()).await.unwrap();
    let app = services::http::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, store)
}

/// Every seeded account uses the same fixture password.
pub async fn login(client: &reqwest::Client, addr: SocketAddr, email: &str) -> (String, Value) {
    let resp = client
        .post(format!("http://{}/api/auth/login", addr))
        .json(&serde_json::json!({"email": email, "password": "livego"}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success(), "login failed for {}", email);

    let body: Value = resp.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();
    (token, body["user"].clone())
}
