use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

mod common;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect_ws(addr: SocketAddr, user_id: &str, username: &str) -> Socket {
    let url = format!(
        "ws://{}/ws?userId={}&username={}",
        addr, user_id, username
    );
    let (socket, _) = connect_async(url.as_str()).await.unwrap();
    socket
}

async fn send_event(socket: &mut Socket, event: Value) {
    socket
        .send(Message::Text(event.to_string().into()))
        .await
        .unwrap();
}

async fn next_event(socket: &mut Socket) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for event")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn join(socket: &mut Socket, stream_id: &str) {
    send_event(
        socket,
        json!({"event": "stream:join", "data": {"stream_id": stream_id}}),
    )
    .await;
    // Joins carry no ack; give the server a beat to register the member.
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn join_notifies_the_room() {
    let (addr, _store) = common::spawn_server().await;

    let mut viewer = connect_ws(addr, "u-ricardo", "Ricardo").await;
    join(&mut viewer, "s-mirella").await;

    let mut newcomer = connect_ws(addr, "u-marcos", "Marcos").await;
    join(&mut newcomer, "s-mirella").await;

    let event = next_event(&mut viewer).await;
    assert_eq!(event["event"], "stream:user_joined");
    assert_eq!(event["data"]["user_id"], "u-marcos");
    assert_eq!(event["data"]["username"], "Marcos");
}

#[tokio::test]
async fn messages_broadcast_to_everyone_including_sender() {
    let (addr, _store) = common::spawn_server().await;

    let mut viewer = connect_ws(addr, "u-ricardo", "Ricardo").await;
    join(&mut viewer, "s-mirella").await;

    let mut sender = connect_ws(addr, "u-marcos", "Marcos").await;
    join(&mut sender, "s-mirella").await;

    // Drain the join notice on the first connection.
    let joined = next_event(&mut viewer).await;
    assert_eq!(joined["event"], "stream:user_joined");

    send_event(
        &mut sender,
        json!({"event": "stream:message", "data": {"stream_id": "s-mirella", "text": "hello room"}}),
    )
    .await;

    for socket in [&mut viewer, &mut sender] {
        let event = next_event(socket).await;
        assert_eq!(event["event"], "newStreamMessage");
        assert_eq!(event["data"]["text"], "hello room");
        assert_eq!(event["data"]["sender_name"], "Marcos");
        assert!(event["data"]["id"].as_str().is_some());
    }
}

#[tokio::test]
async fn rest_gift_reaches_the_room() {
    let (addr, _store) = common::spawn_server().await;
    let client = reqwest::Client::new();

    let mut viewer = connect_ws(addr, "u-ricardo", "Ricardo").await;
    join(&mut viewer, "s-mirella").await;

    let (token, _user) = common::login(&client, addr, "admin@livego.com").await;
    client
        .post(format!("http://{}/api/gift", addr))
        .bearer_auth(&token)
        .json(&json!({"stream_id": "s-mirella", "gift_name": "Heart", "count": 3}))
        .send()
        .await
        .unwrap();

    let event = next_event(&mut viewer).await;
    assert_eq!(event["event"], "newStreamGift");
    assert_eq!(event["data"]["gift"]["name"], "Heart");
    assert_eq!(event["data"]["quantity"], 3);
    assert_eq!(event["data"]["room_id"], "s-mirella");
    assert_eq!(event["data"]["to_user"]["id"], "u-mirella");
}

#[tokio::test]
async fn pk_start_flips_the_room_status() {
    let (addr, _store) = common::spawn_server().await;

    let mut viewer = connect_ws(addr, "u-ricardo", "Ricardo").await;
    join(&mut viewer, "s-mirella").await;

    let mut host = connect_ws(addr, "u-mirella", "Mirella").await;
    join(&mut host, "s-mirella").await;

    let joined = next_event(&mut viewer).await;
    assert_eq!(joined["event"], "stream:user_joined");

    send_event(
        &mut host,
        json!({"event": "pk:start", "data": {"stream_id": "s-mirella", "opponent_id": "u-gamer"}}),
    )
    .await;

    let event = next_event(&mut viewer).await;
    assert_eq!(event["event"], "pk:status_update");
    assert_eq!(event["data"]["active"], true);
    assert_eq!(event["data"]["opponent_id"], "u-gamer");
}

#[tokio::test]
async fn disconnecting_leaves_the_room() {
    let (addr, _store) = common::spawn_server().await;

    let mut viewer = connect_ws(addr, "u-ricardo", "Ricardo").await;
    join(&mut viewer, "s-mirella").await;

    let mut departing = connect_ws(addr, "u-marcos", "Marcos").await;
    join(&mut departing, "s-mirella").await;

    let joined = next_event(&mut viewer).await;
    assert_eq!(joined["event"], "stream:user_joined");

    departing.close(None).await.unwrap();

    let event = next_event(&mut viewer).await;
    assert_eq!(event["event"], "stream:user_left");
    assert_eq!(event["data"]["user_id"], "u-marcos");
}

#[tokio::test]
async fn malformed_frames_are_ignored() {
    let (addr, _store) = common::spawn_server().await;

    let mut viewer = connect_ws(addr, "u-ricardo", "Ricardo").await;
    join(&mut viewer, "s-mirella").await;

    let mut sender = connect_ws(addr, "u-marcos", "Marcos").await;
    join(&mut sender, "s-mirella").await;
    let joined = next_event(&mut viewer).await;
    assert_eq!(joined["event"], "stream:user_joined");

    // Garbage first, then a valid message; the connection survives.
    sender
        .send(Message::Text("not json".to_string().into()))
        .await
        .unwrap();
    send_event(
        &mut sender,
        json!({"event": "stream:message", "data": {"stream_id": "s-mirella", "text": "still here"}}),
    )
    .await;

    let event = next_event(&mut viewer).await;
    assert_eq!(event["event"], "newStreamMessage");
    assert_eq!(event["data"]["text"], "still here");
}
