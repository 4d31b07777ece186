use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

use crate::dtos::{ChatSessionDTO, NotificationDTO};

/// Signals routed to the writer task of a user's websocket
#[derive(Debug)]
pub enum InternalSignal {
    Shutdown,
    /// Subscribe to the session channel and tell the client it has a partner
    SessionMatched(ChatSessionDTO),
    /// Unsubscribe from the session channel and tell the client
    SessionEnded(i64),
    Notification(NotificationDTO),
    Error(&'static str),
}

impl InternalSignal {
    fn kind(&self) -> &'static str {
        match self {
            InternalSignal::Shutdown => "Shutdown",
            InternalSignal::SessionMatched(_) => "SessionMatched",
            InternalSignal::SessionEnded(_) => "SessionEnded",
            InternalSignal::Notification(_) => "Notification",
            InternalSignal::Error(_) => "Error",
        }
    }
}

#[derive(Default)]
pub struct UserMap {
    users_online: DashMap<i64, UnboundedSender<InternalSignal>>,
}

impl UserMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A newer connection of the same user replaces the previous one
    #[instrument(skip(self, tx))]
    pub fn register_online(&self, user_id: i64, tx: UnboundedSender<InternalSignal>) {
        if let Some(previous) = self.users_online.insert(user_id, tx) {
            let _ = previous.send(InternalSignal::Shutdown);
        }
        info!("Total online users: {}", self.users_online.len());
    }

    /// Removes the user only while `tx` is still their registered channel, so a closing
    /// old socket cannot unregister a newer one
    #[instrument(skip(self, tx))]
    pub fn remove_from_online(&self, user_id: &i64, tx: &UnboundedSender<InternalSignal>) {
        if self
            .users_online
            .remove_if(user_id, |_, current| current.same_channel(tx))
            .is_some()
        {
            info!("User went offline");
        }
    }

    /// Returns whether the signal was handed to an online writer
    #[instrument(skip(self, message), fields(kind = message.kind()))]
    pub fn send_server_message_if_online(&self, user_id: &i64, message: InternalSignal) -> bool {
        let kind = message.kind();
        match self.users_online.get(user_id) {
            Some(entry) => match entry.value().send(message) {
                Ok(()) => {
                    debug!("{} signal sent to online user", kind);
                    true
                }
                Err(e) => {
                    warn!("Failed to send {} signal: {:?}", kind, e);
                    false
                }
            },
            None => {
                debug!("User {} not online, {} signal dropped", user_id, kind);
                false
            }
        }
    }

    pub fn online_count(&self) -> usize {
        self.users_online.len()
    }

    pub fn is_user_online(&self, user_id: &i64) -> bool {
        self.users_online.contains_key(user_id)
    }
}
