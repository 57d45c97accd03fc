use livego::client::api::{Api, ApiError};
use livego::client::mock::MockApi;
use livego::models::events::{ClientEvent, EventKind, ServerEvent};
use livego::models::gifts::SendGift;
use livego::models::ranking::RankPeriod;
use livego::models::users::Credentials;

mod common;

fn credentials(email: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: "livego".to_string(),
    }
}

fn mock() -> MockApi {
    MockApi::new(common::economy())
}

#[tokio::test]
async fn login_and_me_follow_the_store() {
    let api = mock();

    let auth = api.login(credentials("admin@livego.com")).await.unwrap();
    assert_eq!(auth.user.id, "u-admin");
    assert!(!auth.token.is_empty());

    let me = api.me().await.unwrap();
    assert_eq!(me.diamonds, 9999);

    api.logout().await.unwrap();
    assert!(matches!(api.me().await, Err(ApiError::Unauthenticated)));
}

#[tokio::test]
async fn facade_calls_require_a_session() {
    let api = mock();
    assert!(matches!(
        api.wallet_balance().await,
        Err(ApiError::Unauthenticated)
    ));
    assert!(matches!(
        api.connect_events().await,
        Err(ApiError::Unauthenticated)
    ));
}

#[tokio::test]
async fn send_gift_pushes_a_simulated_room_event() {
    let api = mock();
    api.login(credentials("admin@livego.com")).await.unwrap();

    let mut gifts = api.events().subscribe(EventKind::StreamGift);

    let response = api
        .send_gift(SendGift {
            stream_id: "s-mirella".to_string(),
            gift_name: "Rocket".to_string(),
            count: 1,
            target_id: None,
        })
        .await
        .unwrap();
    assert_eq!(response.updated_sender.diamonds, 9999 - 500);

    let event = gifts.try_recv().expect("expected a simulated gift event");
    match event {
        ServerEvent::StreamGift(payload) => {
            assert_eq!(payload.gift.name, "Rocket");
            assert_eq!(payload.to_user.id, "u-mirella");
            assert_eq!(payload.room_id, "s-mirella");
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // The mock store reflects the transfer.
    let host = api.get_user("u-mirella").await.unwrap();
    assert_eq!(host.earnings, 8400 + 250);
}

#[tokio::test]
async fn insufficient_balance_surfaces_as_a_typed_error() {
    let api = mock();
    api.login(credentials("arromba@livego.app")).await.unwrap();

    let result = api
        .send_gift(SendGift {
            stream_id: "s-mirella".to_string(),
            gift_name: "Castle".to_string(),
            count: 1,
            target_id: None,
        })
        .await;

    match result {
        Err(ApiError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "insufficient diamonds");
        }
        other => panic!("expected a typed rejection, got {:?}", other.map(|_| ())),
    }

    // Caller can trust nothing moved and roll its optimistic UI back.
    let me = api.me().await.unwrap();
    assert_eq!(me.diamonds, 340);
}

#[tokio::test]
async fn emitted_client_events_come_back_as_server_push() {
    let api = mock();
    api.login(credentials("admin@livego.com")).await.unwrap();
    api.connect_events().await.unwrap();

    let mut messages = api.events().subscribe(EventKind::StreamMessage);
    let mut joins = api.events().subscribe(EventKind::UserJoined);

    api.emit(ClientEvent::JoinStream {
        stream_id: "s-mirella".to_string(),
    })
    .await
    .unwrap();
    api.emit(ClientEvent::StreamMessage {
        stream_id: "s-mirella".to_string(),
        text: "oi".to_string(),
    })
    .await
    .unwrap();

    match joins.try_recv().unwrap() {
        ServerEvent::UserJoined { user_id, .. } => assert_eq!(user_id, "u-admin"),
        other => panic!("unexpected event: {:?}", other),
    }
    match messages.try_recv().unwrap() {
        ServerEvent::StreamMessage(message) => {
            assert_eq!(message.text, "oi");
            assert_eq!(message.sender_name, "LiveGo Admin");
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn facade_surface_matches_the_rest_contract() {
    let api = mock();
    api.login(credentials("admin@livego.com")).await.unwrap();

    let streams = api.list_streams("all", Some("br")).await.unwrap();
    assert_eq!(streams.len(), 2);

    let following = api.toggle_follow("u-mirella").await.unwrap();
    assert!(following);
    assert!(!api.toggle_follow("u-mirella").await.unwrap());

    let balance = api.wallet_balance().await.unwrap();
    assert_eq!(balance.user_earnings.net_cents, 2000);

    let reminders = api.reminders().await.unwrap();
    assert_eq!(reminders.len(), 3);
    api.remove_reminder("rem-1").await.unwrap();
    assert_eq!(api.reminders().await.unwrap().len(), 2);

    let conversations = api.conversations().await.unwrap();
    assert_eq!(conversations[0].friend.id, "u-support");

    assert!(api.ranking(RankPeriod::Weekly).await.unwrap().is_empty());
    api.send_gift(SendGift {
        stream_id: "s-gamer".to_string(),
        gift_name: "Rose".to_string(),
        count: 10,
        target_id: None,
    })
    .await
    .unwrap();
    let ranking = api.ranking(RankPeriod::Weekly).await.unwrap();
    assert_eq!(ranking[0].id, "u-admin");
    assert_eq!(ranking[0].value, 10);

    let email = api.last_email().await.unwrap();
    assert_eq!(email.as_deref(), Some("admin@livego.com"));
}
