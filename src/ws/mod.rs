//! WebSocket Module - Real-time delivery of chat messages and notifications
//!
//! - HTTP -> WebSocket upgrade
//! - one reader task and one writer task per connection
//! - incoming chat frames handled by [`event_handlers`]

pub mod chatmap;
pub mod connection;
pub mod event_handlers;
pub mod usermap;

pub use connection::handle_socket;

use crate::{AppState, entities::User};
use axum::{
    Extension,
    extract::{State, ws::WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;

/// Pending messages kept per session channel before slow receivers start lagging
pub const BROADCAST_CHANNEL_CAPACITY: usize = 64;
/// Flush interval of the outgoing message batch, in milliseconds
pub const BATCH_INTERVAL: u64 = 100;
pub const BATCH_MAX_SIZE: usize = 10;
/// Minimum spacing between two frames read from one client, in milliseconds
pub const RATE_LIMITER_MILLIS: u64 = 50;
/// Idle connections are closed after this many seconds without a frame
pub const TIMEOUT_DURATION_SECONDS: u64 = 300;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // from authentication_middleware
) -> Response {
    let user_id = current_user.user_id;
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}
