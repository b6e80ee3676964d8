//! Live notification connections, one per user.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::info;

use crag_models::{UserId, WsMessage};

/// The peer is gone; no further sends will succeed.
#[derive(Debug, Error)]
#[error("notification channel closed")]
pub struct ChannelClosed;

/// A duplex, message-oriented transport to one user session.
///
/// The API crate adapts a WebSocket to this; tests supply recording
/// fakes. Close is advisory: implementations deliver a close frame
/// best-effort and must tolerate being called after the peer vanished.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Push one text message to the peer.
    async fn send_text(&self, text: String) -> Result<(), ChannelClosed>;

    /// Ask the transport to close.
    async fn close(&self);
}

struct ActiveConnection {
    conn_id: u64,
    handle: Arc<dyn NotificationChannel>,
    closed_tx: watch::Sender<bool>,
}

/// Holds at most one live connection per user.
///
/// Registering a second connection for a user evicts the first: the old
/// channel gets an eviction notice and a close, and its notification loop
/// is signalled to stop. Unregistering is idempotent; a stale generation
/// (already evicted) is a no-op.
#[derive(Default)]
pub struct ConnectionManager {
    active: Mutex<HashMap<i64, ActiveConnection>>,
    next_conn_id: AtomicU64,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
            next_conn_id: AtomicU64::new(1),
        }
    }

    /// Install a connection for this user, evicting any predecessor.
    ///
    /// Returns the connection's generation id and the close signal its
    /// notification loop must watch.
    pub async fn register(
        &self,
        user_id: UserId,
        handle: Arc<dyn NotificationChannel>,
    ) -> (u64, watch::Receiver<bool>) {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::SeqCst);
        let (closed_tx, closed_rx) = watch::channel(false);

        let evicted = {
            let mut active = self.active.lock().await;
            active.insert(
                user_id.as_i64(),
                ActiveConnection {
                    conn_id,
                    handle,
                    closed_tx,
                },
            )
        };

        if let Some(old) = evicted {
            info!("Evicting previous connection for user {}", user_id);
            let _ = old.closed_tx.send(true);
            if let Ok(notice) = serde_json::to_string(&WsMessage::error(
                "replaced by a newer connection",
            )) {
                let _ = old.handle.send_text(notice).await;
            }
            old.handle.close().await;
        }

        (conn_id, closed_rx)
    }

    /// Remove a connection if this generation still owns the slot.
    ///
    /// Safe to call more than once, and after an eviction has already
    /// replaced the entry.
    pub async fn unregister(&self, user_id: UserId, conn_id: u64) {
        let mut active = self.active.lock().await;
        if active.get(&user_id.as_i64()).map(|c| c.conn_id) == Some(conn_id) {
            if let Some(conn) = active.remove(&user_id.as_i64()) {
                let _ = conn.closed_tx.send(true);
            }
        }
    }

    /// Whether a user currently has a live connection.
    pub async fn is_connected(&self, user_id: UserId) -> bool {
        self.active.lock().await.contains_key(&user_id.as_i64())
    }

    /// Number of live connections.
    pub async fn len(&self) -> usize {
        self.active.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
