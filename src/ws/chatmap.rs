use crate::dtos::ChatMessageDTO;
use crate::ws::BROADCAST_CHANNEL_CAPACITY;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::SendError;
use tokio::sync::broadcast::{Receiver, Sender};
use tracing::{debug, instrument};

#[derive(Default)]
pub struct ChatMap {
    /// Broadcast head of every session with at least one subscriber, by session_id
    channels: DashMap<i64, Sender<Arc<ChatMessageDTO>>>,
}

impl ChatMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to a session channel, creating it on first use
    #[instrument(skip(self))]
    pub fn subscribe(&self, session_id: &i64) -> Receiver<Arc<ChatMessageDTO>> {
        self.channels
            .entry(*session_id)
            .or_insert_with(|| {
                debug!("Creating broadcast channel for session");
                // Arc so every receiver shares one copy of the message
                broadcast::channel::<Arc<ChatMessageDTO>>(BROADCAST_CHANNEL_CAPACITY).0
            })
            .subscribe()
    }

    pub fn subscribe_multiple(&self, session_ids: &[i64]) -> Vec<Receiver<Arc<ChatMessageDTO>>> {
        session_ids.iter().map(|id| self.subscribe(id)).collect()
    }

    /// Fans a message out to the subscribers of its session. A channel nobody listens to
    /// any more is dropped.
    #[instrument(skip(self, msg))]
    pub fn send(
        &self,
        session_id: &i64,
        msg: Arc<ChatMessageDTO>,
    ) -> Result<usize, SendError<Arc<ChatMessageDTO>>> {
        let Some(channel) = self.channels.get(session_id) else {
            debug!("No live channel for session");
            return Err(SendError(msg));
        };

        match channel.send(msg) {
            Ok(receivers) => {
                debug!(receivers, "Message broadcast");
                Ok(receivers)
            }
            Err(e) => {
                drop(channel); // release the shard lock before removing
                self.channels
                    .remove_if(session_id, |_, tx| tx.receiver_count() == 0);
                Err(e)
            }
        }
    }

    /// Drops the channel of an ended session, subscribers see the stream close
    pub fn remove(&self, session_id: &i64) {
        self.channels.remove(session_id);
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
