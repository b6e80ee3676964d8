//! Per-connection notification loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error};

use crag_models::{NewJobHistory, UserId, WsMessage};
use crag_store::JobHistoryStore;

use crate::connections::NotificationChannel;
use crate::pipeline::Pipeline;
use crate::registry::JobRegistry;

/// A running notification loop for one connection.
pub struct NotificationSession {
    /// Generation id for idempotent teardown
    pub conn_id: u64,
    /// The loop task; finishes on disconnect or eviction
    pub task: JoinHandle<()>,
}

impl Pipeline {
    /// Install `channel` as the user's live connection and start its
    /// notification loop.
    ///
    /// Any previous connection for the user is evicted first. The loop
    /// runs until [`disconnect`](Self::disconnect) is called for this
    /// session, the session is evicted, or a send fails.
    pub async fn open_notification_channel(
        &self,
        user_id: UserId,
        channel: Arc<dyn NotificationChannel>,
    ) -> NotificationSession {
        let (conn_id, closed_rx) = self
            .connections
            .register(user_id, Arc::clone(&channel))
            .await;

        let task = tokio::spawn(run_loop(
            Arc::clone(&self.registry),
            Arc::clone(&self.history),
            channel,
            user_id,
            self.config.notify_interval,
            closed_rx,
        ));

        NotificationSession { conn_id, task }
    }

    /// Tear down a session after its transport disconnected.
    ///
    /// Idempotent; a session that was already evicted is a no-op.
    pub async fn disconnect(&self, user_id: UserId, conn_id: u64) {
        self.connections.unregister(user_id, conn_id).await;
    }
}

/// Scan-and-deliver loop for one connection.
///
/// Each tick atomically takes the user's completed jobs from the
/// registry; for each, the completion message is pushed and a history
/// record is persisted. The take already consumed the job, so a crash or
/// dropped peer between take and send loses that notification — the
/// pipeline is best-effort by design.
async fn run_loop(
    registry: Arc<JobRegistry>,
    history: Arc<dyn JobHistoryStore>,
    channel: Arc<dyn NotificationChannel>,
    user_id: UserId,
    notify_interval: Duration,
    mut closed_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(notify_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for job in registry.take_completed(user_id).await {
                    let payload = match serde_json::to_string(&WsMessage::done(job.video_id)) {
                        Ok(p) => p,
                        Err(e) => {
                            error!("Failed to encode notification for video {}: {}", job.video_id, e);
                            continue;
                        }
                    };

                    if channel.send_text(payload).await.is_err() {
                        debug!("Channel gone mid-delivery for user {}", user_id);
                        return;
                    }

                    if let Err(e) = history.append(NewJobHistory::for_job(&job)).await {
                        error!(
                            "Failed to persist history for video {}: {}",
                            job.video_id, e
                        );
                    }
                }
            }
            changed = closed_rx.changed() => {
                // A send means eviction or explicit disconnect; a closed
                // sender means the manager dropped this connection's slot.
                if changed.is_err() || *closed_rx.borrow() {
                    break;
                }
            }
        }
    }

    debug!("Notification loop ended for user {}", user_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    use crag_models::{Job, RouteId, VideoId};
    use crag_store::{JobHistoryStore, MemoryStore};

    use crate::config::PipelineConfig;
    use crate::testing::{RecordingChannel, StubTranscoder};

    fn test_pipeline(store: Arc<MemoryStore>) -> Pipeline {
        Pipeline::new(
            store.clone(),
            store,
            Arc::new(StubTranscoder::succeeding()),
            PipelineConfig {
                videos_dir: std::env::temp_dir(),
                notify_interval: Duration::from_millis(20),
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_job_is_delivered_exactly_once() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = test_pipeline(store.clone());
        let user = UserId::new(1);

        pipeline
            .registry()
            .enqueue(Job::new(user, VideoId::new(42), RouteId::new(7)))
            .await
            .unwrap();
        pipeline.registry().mark_completed(VideoId::new(42)).await;

        let channel = Arc::new(RecordingChannel::new());
        let session = pipeline.open_notification_channel(user, channel.clone()).await;

        // Let several ticks elapse; the job must be delivered once only.
        tokio::time::sleep(Duration::from_millis(200)).await;

        let sent = channel.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("\"videoId\":42"));

        let rows = store.list_for_user(user).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].video_id, VideoId::new(42));
        assert_eq!(rows[0].route_id, RouteId::new(7));
        assert!(rows[0].completed);

        assert!(pipeline.registry().is_empty().await);

        pipeline.disconnect(user, session.conn_id).await;
        tokio::time::timeout(Duration::from_secs(1), session.task)
            .await
            .expect("loop must end on disconnect")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_job_is_not_delivered() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = test_pipeline(store.clone());
        let user = UserId::new(1);

        pipeline
            .registry()
            .enqueue(Job::new(user, VideoId::new(9), RouteId::new(2)))
            .await
            .unwrap();

        let channel = Arc::new(RecordingChannel::new());
        let session = pipeline.open_notification_channel(user, channel.clone()).await;

        tokio::time::sleep(Duration::from_millis(200)).await;

        // Nothing to deliver: the transcode has not finished (and if it
        // fails, nothing ever will be).
        assert!(channel.sent().await.is_empty());
        assert!(store.list_for_user(user).await.unwrap().is_empty());
        assert_eq!(pipeline.registry().pending_for(user).await, 1);

        pipeline.disconnect(user, session.conn_id).await;
        let _ = tokio::time::timeout(Duration::from_secs(1), session.task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_ends_previous_session() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = test_pipeline(store);
        let user = UserId::new(1);

        let first = Arc::new(RecordingChannel::new());
        let first_session = pipeline.open_notification_channel(user, first.clone()).await;

        let second = Arc::new(RecordingChannel::new());
        let second_session = pipeline
            .open_notification_channel(user, second.clone())
            .await;

        // The first loop terminates and its channel was closed.
        tokio::time::timeout(Duration::from_secs(1), first_session.task)
            .await
            .expect("evicted loop must end")
            .unwrap();
        assert!(first.is_closed());
        assert!(!second.is_closed());

        pipeline.disconnect(user, second_session.conn_id).await;
        let _ = tokio::time::timeout(Duration::from_secs(1), second_session.task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_jobs_completed_mid_session_are_picked_up() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = test_pipeline(store.clone());
        let user = UserId::new(3);

        let channel = Arc::new(RecordingChannel::new());
        let session = pipeline.open_notification_channel(user, channel.clone()).await;

        // Connection is idle for a while before the upload completes.
        tokio::time::sleep(Duration::from_millis(100)).await;

        pipeline
            .registry()
            .enqueue(Job::new(user, VideoId::new(5), RouteId::new(1)))
            .await
            .unwrap();
        pipeline.registry().mark_completed(VideoId::new(5)).await;

        tokio::time::sleep(Duration::from_millis(100)).await;

        let sent = channel.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("\"videoId\":5"));

        pipeline.disconnect(user, session.conn_id).await;
        let _ = tokio::time::timeout(Duration::from_secs(1), session.task).await;
    }
}
