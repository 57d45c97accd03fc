use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn wallet_balance_breaks_down_earnings() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();
    let (token, _user) = common::login(&client, addr, "admin@livego.com").await;

    let balance: Value = client
        .get(format!("http://{}/api/wallet/balance", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(balance["diamonds"], 9999);
    // 3000 earned diamonds -> R$25.00 gross, 20% fee.
    assert_eq!(balance["user_earnings"]["available_diamonds"], 3000);
    assert_eq!(balance["user_earnings"]["gross_cents"], 2500);
    assert_eq!(balance["user_earnings"]["platform_fee_cents"], 500);
    assert_eq!(balance["user_earnings"]["net_cents"], 2000);
}

#[tokio::test]
async fn gift_debits_sender_and_credits_host() {
    let (addr, store) = common::spawn_server().await;
    let client = reqwest::Client::new();
    let (token, _user) = common::login(&client, addr, "admin@livego.com").await;

    let resp: Value = client
        .post(format!("http://{}/api/gift", addr))
        .bearer_auth(&token)
        .json(&json!({"stream_id": "s-mirella", "gift_name": "Rocket", "count": 2}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(resp["updated_sender"]["diamonds"], 9999 - 1000);
    assert_eq!(resp["leveled_up"], false);

    let host = store.users.get("u-mirella").unwrap().clone();
    assert_eq!(host.received_diamonds, 8400 * 2 + 1000);
    assert_eq!(host.earnings, 8400 + 500);

    let stream = store.streams.get("s-mirella").unwrap().clone();
    assert_eq!(stream.received_diamonds, 1000);

    // The host's gallery now owns the gift.
    let (host_token, _host) = common::login(&client, addr, "mirella@livego.app").await;
    let gallery: Vec<Value> = client
        .get(format!("http://{}/api/gifts/gallery", addr))
        .bearer_auth(&host_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(gallery.len(), 1);
    assert_eq!(gallery[0]["name"], "Rocket");
    assert_eq!(gallery[0]["count"], 2);
}

#[tokio::test]
async fn insufficient_diamonds_rejects_the_gift() {
    let (addr, store) = common::spawn_server().await;
    let client = reqwest::Client::new();
    let (token, _user) = common::login(&client, addr, "arromba@livego.app").await;

    let resp = client
        .post(format!("http://{}/api/gift", addr))
        .bearer_auth(&token)
        .json(&json!({"stream_id": "s-mirella", "gift_name": "Castle", "count": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "insufficient diamonds");

    // Nothing moved.
    assert_eq!(store.users.get("u-arromba").unwrap().diamonds, 340);
    assert_eq!(store.streams.get("s-mirella").unwrap().received_diamonds, 0);
}

#[tokio::test]
async fn unknown_gift_is_a_404() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();
    let (token, _user) = common::login(&client, addr, "admin@livego.com").await;

    let resp = client
        .post(format!("http://{}/api/gift", addr))
        .bearer_auth(&token)
        .json(&json!({"stream_id": "s-mirella", "gift_name": "Zeppelin", "count": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gift_catalog_filters() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();

    let popular: Vec<Value> = client
        .get(format!("http://{}/api/gifts", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(popular.iter().all(|g| g["category"] == "popular"));

    let cheap: Vec<Value> = client
        .get(format!("http://{}/api/gifts?category=20", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(cheap.iter().all(|g| g["price"].as_i64().unwrap() <= 20));

    let vip: Vec<Value> = client
        .get(format!("http://{}/api/gifts?category=vip", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(vip.len(), 2);
}

#[tokio::test]
async fn withdrawal_flow_books_fee_and_history() {
    let (addr, store) = common::spawn_server().await;
    let client = reqwest::Client::new();
    let (token, _user) = common::login(&client, addr, "mirella@livego.app").await;

    let quote: Value = client
        .post(format!("http://{}/api/earnings/withdraw/calculate", addr))
        .bearer_auth(&token)
        .json(&json!({"amount": 3000}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quote["gross_cents"], 2500);
    assert_eq!(quote["platform_fee_cents"], 500);
    assert_eq!(quote["net_cents"], 2000);

    client
        .post(format!("http://{}/api/earnings/withdraw/methods", addr))
        .bearer_auth(&token)
        .json(&json!({"method": "email", "email": "mirella@pay.me"}))
        .send()
        .await
        .unwrap();

    let platform_before = store.users.get("u-admin").unwrap().platform_earnings_cents;

    let resp = client
        .post(format!("http://{}/api/earnings/withdraw/request", addr))
        .bearer_auth(&token)
        .json(&json!({"amount": 3000}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let mirella = store.users.get("u-mirella").unwrap().clone();
    assert_eq!(mirella.earnings, 8400 - 3000);
    assert_eq!(mirella.earnings_withdrawn, 3000);

    let platform_after = store.users.get("u-admin").unwrap().platform_earnings_cents;
    assert_eq!(platform_after, platform_before + 500);

    let pending: Vec<Value> = client
        .get(format!(
            "http://{}/api/users/me/withdrawal-history?status=pending",
            addr
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["amount_cents"], 2000);
    assert!(pending[0]["description"]
        .as_str()
        .unwrap()
        .contains("mirella@pay.me"));

    // More than the remaining earnings is rejected.
    let too_much = client
        .post(format!("http://{}/api/earnings/withdraw/request", addr))
        .bearer_auth(&token)
        .json(&json!({"amount": 100000}))
        .send()
        .await
        .unwrap();
    assert_eq!(too_much.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recharge_and_purchase_add_diamonds() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();
    let (token, _user) = common::login(&client, addr, "gamer@livego.app").await;

    let recharged: Value = client
        .post(format!("http://{}/api/gifts/recharge", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(recharged["diamonds"], 950 + 5000);

    let purchased: Value = client
        .post(format!("http://{}/api/wallet/purchase", addr))
        .bearer_auth(&token)
        .json(&json!({"diamonds": 1000, "price_cents": 999}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(purchased["diamonds"], 950 + 5000 + 1000);

    let history: Vec<Value> = client
        .get(format!(
            "http://{}/api/users/me/withdrawal-history?status=all",
            addr
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|r| r["kind"] == "recharge"));
}

#[tokio::test]
async fn admin_surface_is_admin_only() {
    let (addr, store) = common::spawn_server().await;
    let client = reqwest::Client::new();

    let (outsider, _user) = common::login(&client, addr, "gamer@livego.app").await;
    let denied = client
        .get(format!("http://{}/api/admin/withdrawals", addr))
        .bearer_auth(&outsider)
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let (token, _admin) = common::login(&client, addr, "admin@livego.com").await;
    let records: Vec<Value> = client
        .get(format!("http://{}/api/admin/withdrawals", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!records.is_empty());

    let resp = client
        .post(format!("http://{}/api/admin/withdrawals/request", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        store.users.get("u-admin").unwrap().platform_earnings_cents,
        0
    );

    // Balance is drained, a second request has nothing to pay out.
    let empty = client
        .post(format!("http://{}/api/admin/withdrawals/request", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn gift_spending_feeds_the_ranking() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();

    let (juliana, _user) = common::login(&client, addr, "juliana@livego.app").await;
    client
        .post(format!("http://{}/api/gift", addr))
        .bearer_auth(&juliana)
        .json(&json!({"stream_id": "s-mirella", "gift_name": "Yacht", "count": 1}))
        .send()
        .await
        .unwrap();

    let (alice, _user) = common::login(&client, addr, "alice@livego.app").await;
    client
        .post(format!("http://{}/api/gift", addr))
        .bearer_auth(&alice)
        .json(&json!({"stream_id": "s-mirella", "gift_name": "Rocket", "count": 1}))
        .send()
        .await
        .unwrap();

    let ranking: Vec<Value> = client
        .get(format!("http://{}/api/ranking/daily", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0]["id"], "u-juliana");
    assert_eq!(ranking[0]["rank"], 1);
    assert_eq!(ranking[0]["value"], 3000);

    let fans: Vec<Value> = client
        .get(format!("http://{}/api/ranking/top-fans", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fans[0]["id"], "u-juliana");
    assert_eq!(fans[0]["amount"], 3000);

    let donors: Vec<Value> = client
        .get(format!("http://{}/api/streams/s-mirella/donors", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(donors.len(), 2);
    assert_eq!(donors[0]["id"], "u-juliana");
}
