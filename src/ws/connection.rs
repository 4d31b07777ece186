//! WebSocket Connection Management

use crate::ws::{BATCH_INTERVAL, BATCH_MAX_SIZE, RATE_LIMITER_MILLIS, TIMEOUT_DURATION_SECONDS};
use crate::{
    AppState,
    dtos::{ChatMessageDTO, SendMessageDTO, WsEventDTO},
    ws::{event_handlers::process_message, usermap::InternalSignal},
};
use axum::extract::ws::Utf8Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::Duration;
use tokio::time::{interval, timeout};
use tokio_stream::StreamMap;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, error, info, instrument, warn};

#[instrument(skip(ws, state))]
pub async fn handle_socket(ws: WebSocket, state: Arc<AppState>, user_id: i64) {
    info!("WebSocket connection established");

    let (ws_tx, ws_rx) = ws.split();

    // internal signals for the writer: matches, session ends, notifications, errors
    let (int_tx, int_rx) = unbounded_channel::<InternalSignal>();

    state.users_online.register_online(user_id, int_tx.clone());

    tokio::spawn(listen_ws(user_id, ws_rx, int_tx, state.clone()));
    tokio::spawn(write_ws(user_id, ws_tx, int_rx, state));
}

#[instrument(skip(websocket_tx, internal_rx, state))]
pub async fn write_ws(
    user_id: i64,
    mut websocket_tx: SplitSink<WebSocket, Message>,
    mut internal_rx: UnboundedReceiver<InternalSignal>,
    state: Arc<AppState>,
) {
    let session_ids = match state.session.find_active_ids_for_user(&user_id).await {
        Ok(ids) => ids,
        Err(e) => {
            error!("Failed to load active sessions: {:?}", e);
            return;
        }
    };
    debug!(sessions = session_ids.len(), "Active sessions loaded");

    let mut stream_map = StreamMap::new();
    state
        .sessions_online
        .subscribe_multiple(&session_ids)
        .into_iter()
        .zip(session_ids.iter())
        .for_each(|(rx, &session_id)| {
            stream_map.insert(session_id, BroadcastStream::new(rx));
        });

    let mut batch: Vec<Arc<ChatMessageDTO>> = Vec::new();
    let mut interval = interval(Duration::from_millis(BATCH_INTERVAL));
    interval.tick().await; // first tick completes immediately

    'external: loop {
        tokio::select! {
            Some((_, result)) = tokio_stream::StreamExt::next(&mut stream_map) => {
                match result {
                    Ok(msg) => {
                        batch.push(msg);
                        if batch.len() >= BATCH_MAX_SIZE
                            && send_batch(&mut websocket_tx, &mut batch).await.is_err()
                        {
                            warn!("Failed to send batch, closing connection");
                            break 'external;
                        }
                    }
                    Err(lagged) => warn!("Session stream lagged: {:?}", lagged),
                }
            }

            // flush partial batches so a lone message is not held back
            _ = interval.tick() => {
                if !batch.is_empty() && send_batch(&mut websocket_tx, &mut batch).await.is_err() {
                    warn!("Failed to send batch on interval, closing connection");
                    break 'external;
                }
            }

            signal = internal_rx.recv() => {
                let event = match signal {
                    Some(InternalSignal::Shutdown) | None => {
                        info!("Writer shutting down");
                        break 'external;
                    }
                    Some(InternalSignal::SessionMatched(session)) => {
                        info!(session_id = session.session_id, "Subscribing to matched session");
                        let rx = state.sessions_online.subscribe(&session.session_id);
                        stream_map.insert(session.session_id, BroadcastStream::new(rx));
                        WsEventDTO::SessionMatched(session)
                    }
                    Some(InternalSignal::SessionEnded(session_id)) => {
                        info!(session_id, "Session ended, unsubscribing");
                        // deliver what was already received for the session first
                        if !batch.is_empty() && send_batch(&mut websocket_tx, &mut batch).await.is_err() {
                            break 'external;
                        }
                        stream_map.remove(&session_id);
                        WsEventDTO::SessionEnded { session_id }
                    }
                    Some(InternalSignal::Notification(notification)) => {
                        WsEventDTO::Notification(notification)
                    }
                    Some(InternalSignal::Error(message)) => WsEventDTO::Error {
                        code: 400,
                        message: message.to_string(),
                    },
                };

                if send_event(&mut websocket_tx, &event).await.is_err() {
                    break 'external;
                }
            }
        }
    }

    if !batch.is_empty() {
        let _ = send_batch(&mut websocket_tx, &mut batch).await;
    }
    let _ = websocket_tx.close().await;

    info!("Write task terminated");
}

async fn send_event(
    websocket_tx: &mut SplitSink<WebSocket, Message>,
    event: &WsEventDTO,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(|e| {
        error!("Failed to serialize event: {:?}", e);
        axum::Error::new(e)
    })?;
    websocket_tx
        .send(Message::Text(Utf8Bytes::from(json)))
        .await
        .map_err(|e| {
            error!("Failed to send through WebSocket: {:?}", e);
            e
        })
}

/// Sends the batch as one `messages` event and empties it
async fn send_batch(
    websocket_tx: &mut SplitSink<WebSocket, Message>,
    batch: &mut Vec<Arc<ChatMessageDTO>>,
) -> Result<(), axum::Error> {
    let size = batch.len();
    let event = WsEventDTO::Messages(std::mem::take(batch));
    send_event(websocket_tx, &event).await?;
    debug!(batch_size = size, "Batch sent");
    Ok(())
}

#[instrument(skip(websocket_rx, internal_tx, state))]
pub async fn listen_ws(
    user_id: i64,
    mut websocket_rx: SplitStream<WebSocket>,
    internal_tx: UnboundedSender<InternalSignal>,
    state: Arc<AppState>,
) {
    let mut rate_limiter = interval(Duration::from_millis(RATE_LIMITER_MILLIS));
    let timeout_duration = Duration::from_secs(TIMEOUT_DURATION_SECONDS);

    loop {
        match timeout(timeout_duration, StreamExt::next(&mut websocket_rx)).await {
            Ok(Some(msg_result)) => {
                rate_limiter.tick().await;

                let msg = match msg_result {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("WebSocket error: {:?}", e);
                        break;
                    }
                };

                match msg {
                    Message::Text(text) => match serde_json::from_str::<SendMessageDTO>(&text) {
                        Ok(event) => {
                            if let Err(err) = process_message(&state, user_id, event).await {
                                let _ = internal_tx.send(InternalSignal::Error(err.message()));
                            }
                        }
                        Err(e) => {
                            warn!("Failed to deserialize frame: {}", e);
                            let _ = internal_tx
                                .send(InternalSignal::Error("Format pesan tidak valid"));
                        }
                    },
                    Message::Close(_) => {
                        info!("Close message received");
                        break;
                    }
                    _ => {}
                }
            }
            Ok(None) => {
                info!("WebSocket stream ended");
                break;
            }
            Err(_) => {
                warn!(timeout_secs = TIMEOUT_DURATION_SECONDS, "Connection timeout");
                break;
            }
        }
    }

    let _ = internal_tx.send(InternalSignal::Shutdown);
    state.users_online.remove_from_online(&user_id, &internal_tx);
    info!("Listen task terminated");
}
