//! Integration tests for the WebSocket layer
//!
//! - UserMap: duplicate connections, targeted signals
//! - ChatMap: session channels and fan-out
//! - process_message: frames from clients
//! - end to end over a real socket: match, message, bad frame, session end

mod common;

#[cfg(test)]
mod ws_tests {
    use super::common::*;
    use futures_util::{SinkExt, StreamExt};
    use genhpp::dtos::{MatchResultDTO, SendMessageDTO};
    use genhpp::entities::MessagePayload;
    use genhpp::matchmaking;
    use genhpp::repositories::Read;
    use genhpp::ws::chatmap::ChatMap;
    use genhpp::ws::event_handlers::process_message;
    use genhpp::ws::usermap::{InternalSignal, UserMap};
    use serde_json::Value;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::mpsc;
    use tokio::time::{Duration, sleep, timeout};
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::client::IntoClientRequest;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    fn session_id(result: &MatchResultDTO) -> i64 {
        match result {
            MatchResultDTO::Waiting(s) | MatchResultDTO::Matched(s) | MatchResultDTO::Existing(s) => {
                s.session_id
            }
        }
    }

    // ============================================================
    // UserMap
    // ============================================================

    /// The second connection of the same user replaces the first one, whose writer is
    /// told to shut down
    #[tokio::test]
    async fn test_usermap_duplicate_connection_overwrites() {
        let user_map = UserMap::new();
        let user_id = 1;

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        user_map.register_online(user_id, tx1);
        assert!(user_map.is_user_online(&user_id));

        let (tx2, _rx2) = mpsc::unbounded_channel();
        user_map.register_online(user_id, tx2);

        assert!(user_map.is_user_online(&user_id));
        assert_eq!(user_map.online_count(), 1, "user must not be duplicated");
        assert!(matches!(rx1.try_recv(), Ok(InternalSignal::Shutdown)));
    }

    /// A stale connection cleaning up after itself must not log out the new one
    #[tokio::test]
    async fn test_usermap_stale_cleanup_keeps_new_connection() {
        let user_map = UserMap::new();
        let (old_tx, _old_rx) = mpsc::unbounded_channel();
        let (new_tx, _new_rx) = mpsc::unbounded_channel();

        user_map.register_online(7, old_tx.clone());
        user_map.register_online(7, new_tx.clone());
        user_map.remove_from_online(&7, &old_tx);
        assert!(user_map.is_user_online(&7));

        user_map.remove_from_online(&7, &new_tx);
        assert!(!user_map.is_user_online(&7));
    }

    #[tokio::test]
    async fn test_usermap_signal_only_reaches_online_users() {
        let user_map = UserMap::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        user_map.register_online(1, tx);

        assert!(user_map.send_server_message_if_online(&1, InternalSignal::SessionEnded(9)));
        assert!(!user_map.send_server_message_if_online(&2, InternalSignal::SessionEnded(9)));
        assert!(matches!(rx.try_recv(), Ok(InternalSignal::SessionEnded(9))));
    }

    // ============================================================
    // ChatMap + process_message
    // ============================================================

    #[tokio::test]
    async fn test_chatmap_shares_one_channel_per_session() {
        let chat_map = ChatMap::new();
        let receivers = chat_map.subscribe_multiple(&[1, 2]);
        assert_eq!(receivers.len(), 2);
        let _again = chat_map.subscribe(&1);
        assert_eq!(chat_map.len(), 2);

        chat_map.remove(&1);
        assert_eq!(chat_map.len(), 1);
    }

    #[tokio::test]
    async fn test_process_message_broadcasts_to_subscribers() {
        let state = create_test_state(setup_pool().await);
        let (siti, _) = seed_user(&state, "siti").await;
        let (budi, _) = seed_user(&state, "budi").await;
        let (rina, _) = seed_user(&state, "rina").await;

        matchmaking::find_partner(&state, siti.user_id).await.unwrap();
        let matched = matchmaking::find_partner(&state, budi.user_id).await.unwrap();
        let session = session_id(&matched);

        let mut rx = state.sessions_online.subscribe(&session);

        process_message(
            &state,
            siti.user_id,
            SendMessageDTO {
                session_id: session,
                payload: MessagePayload::Text {
                    text: "Halo dari websocket".to_string(),
                },
            },
        )
        .await
        .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.sender_alias, "Anonim 1");
        assert_eq!(
            received.payload,
            MessagePayload::Text {
                text: "Halo dari websocket".to_string()
            }
        );

        // outsiders are refused
        let err = process_message(
            &state,
            rina.user_id,
            SendMessageDTO {
                session_id: session,
                payload: MessagePayload::Text {
                    text: "Nguping".to_string(),
                },
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_permission_error());
    }

    // ============================================================
    // End to end
    // ============================================================

    async fn spawn_server(state: Arc<genhpp::AppState>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = genhpp::create_router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn connect(addr: SocketAddr, token: &str) -> Client {
        let mut request = format!("ws://{}/ws", addr).into_client_request().unwrap();
        request
            .headers_mut()
            .insert("authorization", format!("Bearer {}", token).parse().unwrap());
        let (socket, _) = connect_async(request).await.expect("WebSocket handshake failed");
        socket
    }

    async fn wait_online(state: &genhpp::AppState, user_id: i64) {
        for _ in 0..100 {
            if state.users_online.is_user_online(&user_id) {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("user {} never came online", user_id);
    }

    /// Next event of the given type, skipping anything else
    async fn next_event(client: &mut Client, event_type: &str) -> Value {
        timeout(Duration::from_secs(5), async {
            loop {
                let frame = client.next().await.expect("socket closed").expect("socket error");
                if let Message::Text(text) = frame {
                    let event: Value = serde_json::from_str(&text).unwrap();
                    if event["type"] == event_type {
                        return event;
                    }
                }
            }
        })
        .await
        .unwrap_or_else(|_| panic!("no {} event received", event_type))
    }

    #[tokio::test]
    async fn test_websocket_requires_token() {
        let state = create_test_state(setup_pool().await);
        let addr = spawn_server(state).await;

        let request = format!("ws://{}/ws", addr).into_client_request().unwrap();
        assert!(connect_async(request).await.is_err());
    }

    #[tokio::test]
    async fn test_websocket_chat_round_trip() {
        let state = create_test_state(setup_pool().await);
        let (siti, siti_token) = seed_user(&state, "siti").await;
        let (budi, budi_token) = seed_user(&state, "budi").await;
        let addr = spawn_server(state.clone()).await;

        let mut siti_ws = connect(addr, &siti_token).await;
        let mut budi_ws = connect(addr, &budi_token).await;
        wait_online(&state, siti.user_id).await;
        wait_online(&state, budi.user_id).await;

        // 1. match, both sides are told
        matchmaking::find_partner(&state, siti.user_id).await.unwrap();
        let matched = matchmaking::find_partner(&state, budi.user_id).await.unwrap();
        let session = session_id(&matched);

        let siti_matched = next_event(&mut siti_ws, "session_matched").await;
        assert_eq!(siti_matched["data"]["session_id"], session);
        assert_eq!(siti_matched["data"]["partner_alias"], "Anonim 2");
        let budi_matched = next_event(&mut budi_ws, "session_matched").await;
        assert_eq!(budi_matched["data"]["my_alias"], "Anonim 2");

        // 2. a frame from one side arrives batched on the other
        let frame = serde_json::json!({
            "session_id": session,
            "payload": { "kind": "text", "text": "Halo, Anonim 2!" }
        });
        siti_ws.send(Message::Text(frame.to_string())).await.unwrap();

        let batch = next_event(&mut budi_ws, "messages").await;
        assert_eq!(batch["data"][0]["sender_alias"], "Anonim 1");
        assert_eq!(batch["data"][0]["payload"]["text"], "Halo, Anonim 2!");

        // 3. garbage gets an error event, the connection stays open
        siti_ws.send(Message::Text("bukan json".to_string())).await.unwrap();
        let error = next_event(&mut siti_ws, "error").await;
        assert_eq!(error["data"]["code"], 400);

        // 4. ending the session reaches both sides
        let participant = state
            .session
            .read(&(session, budi.user_id))
            .await
            .unwrap()
            .unwrap();
        matchmaking::end_session(&state, &participant).await.unwrap();

        let siti_ended = next_event(&mut siti_ws, "session_ended").await;
        assert_eq!(siti_ended["data"]["session_id"], session);
        next_event(&mut budi_ws, "session_ended").await;
    }

    #[tokio::test]
    async fn test_websocket_delivers_notifications() {
        let state = create_test_state(setup_pool().await);
        let (siti, siti_token) = seed_user(&state, "siti").await;
        let (_, admin_token) = seed_admin(&state).await;
        let addr = spawn_server(state.clone()).await;

        let mut siti_ws = connect(addr, &siti_token).await;
        wait_online(&state, siti.user_id).await;

        let server = create_test_server(state.clone());
        server
            .post("/api/send-admin-notification")
            .add_header(
                axum::http::HeaderName::from_static("authorization"),
                format!("Bearer {}", admin_token),
            )
            .json(&serde_json::json!({ "title": "Info", "message": "Fitur baru" }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let event = next_event(&mut siti_ws, "notification").await;
        assert_eq!(event["data"]["title"], "Info");
        assert_eq!(event["data"]["kind"], "admin");
    }
}
