//! WebSocket notification endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::info;

use crag_pipeline::{ChannelClosed, NotificationChannel};

use crate::auth::AuthUser;
use crate::state::AppState;

/// Outbound queue depth per connection.
const WS_SEND_BUFFER_SIZE: usize = 32;

/// Adapts one WebSocket's outbound half to the pipeline's channel seam.
struct WsChannel {
    tx: mpsc::Sender<Message>,
}

#[async_trait]
impl NotificationChannel for WsChannel {
    async fn send_text(&self, text: String) -> Result<(), ChannelClosed> {
        self.tx
            .send(Message::Text(text))
            .await
            .map_err(|_| ChannelClosed)
    }

    async fn close(&self) {
        let _ = self.tx.send(Message::Close(None)).await;
    }
}

/// WebSocket notification endpoint.
///
/// Installs the connection as the user's live channel (evicting any
/// previous one) and runs the notification loop until the client goes
/// away.
pub async fn ws_jobs(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    user: AuthUser,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, user))
}

async fn handle_socket(socket: WebSocket, state: AppState, user: AuthUser) {
    let (mut ws_sender, mut receiver) = socket.split();

    // Bounded channel between the notification loop and the socket so a
    // slow client backpressures instead of growing a queue.
    let (tx, mut rx) = mpsc::channel::<Message>(WS_SEND_BUFFER_SIZE);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let is_close = matches!(msg, Message::Close(_));
            if ws_sender.send(msg).await.is_err() || is_close {
                break;
            }
        }
    });

    let user_id = user.0;
    info!("Notification channel opened for user {}", user_id);

    let channel = Arc::new(WsChannel { tx: tx.clone() });
    let session = state
        .pipeline
        .open_notification_channel(user_id, channel)
        .await;
    let conn_id = session.conn_id;

    // Inbound half: nothing is expected from the client; this read loop
    // exists to observe the disconnect.
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) | Err(_) => break,
            _ => {}
        }
    }

    // Idempotent: a no-op if this session was already evicted.
    state.pipeline.disconnect(user_id, conn_id).await;
    let _ = session.task.await;

    drop(tx);
    let _ = send_task.await;

    info!("Notification channel closed for user {}", user_id);
}
