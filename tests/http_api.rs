use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn status_and_health_respond() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();

    let status: Value = client
        .get(format!("http://{}/api/status", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], "online");
    assert_eq!(status["service"], "livego");

    let health = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_login_and_me_round_trip() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{}/api/auth/register", addr))
        .json(&json!({"name": "Nova", "email": "nova@livego.app", "password": "secret"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let token = body["token"].as_str().unwrap();
    assert_eq!(body["user"]["name"], "Nova");
    assert_eq!(body["user"]["level"], 1);
    // Password digests never leave the server.
    assert!(body["user"].get("password_digest").is_none());

    let me: Value = client
        .get(format!("http://{}/api/users/me", addr))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["email"], "nova@livego.app");

    // Same email again is rejected.
    let dup = client
        .post(format!("http://{}/api/auth/register", addr))
        .json(&json!({"name": "Other", "email": "nova@livego.app", "password": "pw"}))
        .send()
        .await
        .unwrap();
    assert_eq!(dup.status(), StatusCode::BAD_REQUEST);

    // Wrong password is a 401.
    let bad = client
        .post(format!("http://{}/api/auth/login", addr))
        .json(&json!({"email": "nova@livego.app", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_requires_a_session() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{}/api/users/me", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("http://{}/api/users/me", addr))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stream_listing_honors_region_and_category() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();

    let all: Vec<Value> = client
        .get(format!("http://{}/api/live/all", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let brazil: Vec<Value> = client
        .get(format!("http://{}/api/live/all?region=br", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(brazil.len(), 2);

    let music: Vec<Value> = client
        .get(format!("http://{}/api/live/music?region=br", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(music.len(), 1);
    assert_eq!(music[0]["name"], "DJ Arromba");
}

#[tokio::test]
async fn go_live_and_end_stream() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();
    let (token, _user) = common::login(&client, addr, "alice@livego.app").await;

    let stream: Value = client
        .post(format!("http://{}/api/streams", addr))
        .bearer_auth(&token)
        .json(&json!({"title": "Alice live", "category": "popular", "country": "us"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let stream_id = stream["id"].as_str().unwrap();
    assert_eq!(stream["name"], "Alice Star");
    assert_eq!(stream["quality"], "hd");

    // A second go-live for the same host is rejected.
    let again = client
        .post(format!("http://{}/api/streams", addr))
        .bearer_auth(&token)
        .json(&json!({"title": "Again", "category": "popular", "country": "us"}))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);

    let quality: Value = client
        .patch(format!("http://{}/api/streams/{}/quality", addr, stream_id))
        .bearer_auth(&token)
        .json(&json!({"quality": "fullhd"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quality["quality"], "fullhd");

    let end = client
        .delete(format!("http://{}/api/streams/{}", addr, stream_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(end.status(), StatusCode::OK);

    let gone = client
        .delete(format!("http://{}/api/streams/{}", addr, stream_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn follow_block_and_search() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();
    let (token, _user) = common::login(&client, addr, "admin@livego.com").await;

    let follow: Value = client
        .post(format!("http://{}/api/users/u-mirella/follow", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(follow["following"], true);

    let mirella: Value = client
        .get(format!("http://{}/api/users/u-mirella", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mirella["fans"], 1);

    let unfollow: Value = client
        .post(format!("http://{}/api/users/u-mirella/follow", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unfollow["following"], false);

    // Numeric search hits the public id.
    let hits: Vec<Value> = client
        .get(format!("http://{}/api/users/search?q=1122334", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], "u-gamer");

    client
        .post(format!("http://{}/api/users/me/blocklist/u-ricardo", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let blocklist: Vec<Value> = client
        .get(format!("http://{}/api/users/me/blocklist", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(blocklist.len(), 1);
    assert_eq!(blocklist[0]["id"], "u-ricardo");

    client
        .post(format!(
            "http://{}/api/users/me/blocklist/u-ricardo/unblock",
            addr
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let blocklist: Vec<Value> = client
        .get(format!("http://{}/api/users/me/blocklist", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(blocklist.is_empty());
}

#[tokio::test]
async fn reminders_history_and_conversations() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();
    let (token, _user) = common::login(&client, addr, "admin@livego.com").await;

    let reminders: Vec<Value> = client
        .get(format!("http://{}/api/users/me/reminders", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reminders.len(), 3);

    let removed = client
        .delete(format!("http://{}/api/users/me/reminders/rem-2", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status(), StatusCode::OK);

    let missing = client
        .delete(format!("http://{}/api/users/me/reminders/rem-2", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let history: Vec<Value> = client
        .get(format!("http://{}/api/users/me/history", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["id"], "u-mirella");

    let conversations: Vec<Value> = client
        .get(format!("http://{}/api/chats/conversations", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0]["friend"]["id"], "u-support");

    let started: Value = client
        .post(format!("http://{}/api/chats/start", addr))
        .bearer_auth(&token)
        .json(&json!({"user_id": "u-mirella"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(started["friend"]["id"], "u-mirella");
}

#[tokio::test]
async fn profile_updates_are_owner_only() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();
    let (token, user) = common::login(&client, addr, "alice@livego.app").await;
    let user_id = user["id"].as_str().unwrap();

    let updated: Value = client
        .post(format!("http://{}/api/users/{}", addr, user_id))
        .bearer_auth(&token)
        .json(&json!({"name": "Alice Supernova", "age": 23}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["name"], "Alice Supernova");
    assert_eq!(updated["age"], 23);

    let forbidden = client
        .post(format!("http://{}/api/users/u-mirella", addr))
        .bearer_auth(&token)
        .json(&json!({"name": "Hijacked"}))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn ranking_periods_validate() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();

    let daily = client
        .get(format!("http://{}/api/ranking/daily", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(daily.status(), StatusCode::OK);

    let bogus = client
        .get(format!("http://{}/api/ranking/hourly", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(bogus.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn last_email_is_remembered() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();

    let initial: Value = client
        .get(format!("http://{}/api/auth/last-email", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(initial["email"], "admin@livego.com");

    client
        .post(format!("http://{}/api/auth/save-email", addr))
        .json(&json!({"email": "mirella@livego.app"}))
        .send()
        .await
        .unwrap();

    let saved: Value = client
        .get(format!("http://{}/api/auth/last-email", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved["email"], "mirella@livego.app");
}
