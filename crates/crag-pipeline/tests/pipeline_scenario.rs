//! End-to-end pipeline scenarios over real files.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crag_models::{RouteId, UserId};
use crag_pipeline::testing::{RecordingChannel, StubTranscoder};
use crag_pipeline::{Pipeline, PipelineConfig};
use crag_store::{JobHistoryStore, MemoryStore, VideoStore};

fn build_pipeline(store: Arc<MemoryStore>, dir: &Path, fail_transcode: bool) -> Pipeline {
    let transcoder = if fail_transcode {
        StubTranscoder::failing()
    } else {
        StubTranscoder::succeeding()
    };
    Pipeline::new(
        store.clone(),
        store,
        Arc::new(transcoder),
        PipelineConfig {
            videos_dir: dir.to_path_buf(),
            notify_interval: Duration::from_millis(25),
        },
    )
}

/// Poll until `f` yields true or the deadline passes.
async fn wait_for<F, Fut>(mut f: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if f().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn upload_transcode_notify_history_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let pipeline = build_pipeline(store.clone(), dir.path(), false);
    let user = UserId::new(1);

    let channel = Arc::new(RecordingChannel::new());
    let session = pipeline.open_notification_channel(user, channel.clone()).await;

    let video_id = pipeline
        .ingest(user, RouteId::new(7), b"a raw climbing clip", Some("clip.mp4"))
        .await
        .unwrap();

    // The upload returned immediately; the transcode settles the record
    // in the background and the live connection hears about it.
    let delivered = wait_for(|| {
        let channel = channel.clone();
        async move { !channel.sent().await.is_empty() }
    })
    .await;
    assert!(delivered, "completion must reach the live connection");

    let sent = channel.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains(&format!("\"videoId\":{}", video_id.as_i64())));

    let record = store.get(video_id).await.unwrap().unwrap();
    assert!(record.completed);
    assert!(!record.failed);
    assert!(Path::new(&record.path).exists());

    let rows = store.list_for_user(user).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].video_id, video_id);
    assert_eq!(rows[0].route_id, RouteId::new(7));
    assert!(rows[0].completed);

    // Consumed exactly once: nothing remains to deliver.
    assert!(pipeline.registry().is_empty().await);

    // The raw upload is gone; only the compressed output remains.
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    assert_eq!(names.len(), 1);

    pipeline.disconnect(user, session.conn_id).await;
    let _ = tokio::time::timeout(Duration::from_secs(1), session.task).await;
}

#[tokio::test]
async fn failed_transcode_is_silent_and_keeps_raw_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let pipeline = build_pipeline(store.clone(), dir.path(), true);
    let user = UserId::new(2);

    let channel = Arc::new(RecordingChannel::new());
    let session = pipeline.open_notification_channel(user, channel.clone()).await;

    let video_id = pipeline
        .ingest(user, RouteId::new(3), b"doomed clip", Some("whipper.mp4"))
        .await
        .unwrap();

    let settled = wait_for(|| {
        let store = store.clone();
        async move {
            store
                .get(video_id)
                .await
                .unwrap()
                .map(|r| r.failed)
                .unwrap_or(false)
        }
    })
    .await;
    assert!(settled, "failure must be recorded on the video record");

    // Give the loop a few more ticks to prove its silence.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(
        channel.sent().await.is_empty(),
        "failures are only discoverable by polling the record"
    );

    let record = store.get(video_id).await.unwrap().unwrap();
    assert!(record.failed);
    assert!(!record.completed);

    // The raw upload stays on disk; the job stays orphaned.
    let mut count = 0;
    let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
    while let Some(_entry) = entries.next_entry().await.unwrap() {
        count += 1;
    }
    assert_eq!(count, 1, "raw file is left for operator inspection");
    assert!(pipeline.registry().contains(video_id).await);
    assert!(store.list_for_user(user).await.unwrap().is_empty());

    pipeline.disconnect(user, session.conn_id).await;
    let _ = tokio::time::timeout(Duration::from_secs(1), session.task).await;
}

#[tokio::test]
async fn two_users_only_hear_about_their_own_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let pipeline = build_pipeline(store.clone(), dir.path(), false);

    let alice = UserId::new(10);
    let bob = UserId::new(11);

    let alice_channel = Arc::new(RecordingChannel::new());
    let alice_session = pipeline
        .open_notification_channel(alice, alice_channel.clone())
        .await;
    let bob_channel = Arc::new(RecordingChannel::new());
    let bob_session = pipeline
        .open_notification_channel(bob, bob_channel.clone())
        .await;

    let alice_video = pipeline
        .ingest(alice, RouteId::new(1), b"alice clip", Some("send.mp4"))
        .await
        .unwrap();

    let delivered = wait_for(|| {
        let channel = alice_channel.clone();
        async move { !channel.sent().await.is_empty() }
    })
    .await;
    assert!(delivered);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(bob_channel.sent().await.is_empty());

    let sent = alice_channel.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains(&format!("\"videoId\":{}", alice_video.as_i64())));

    pipeline.disconnect(alice, alice_session.conn_id).await;
    pipeline.disconnect(bob, bob_session.conn_id).await;
    let _ = tokio::time::timeout(Duration::from_secs(1), alice_session.task).await;
    let _ = tokio::time::timeout(Duration::from_secs(1), bob_session.task).await;
}

#[tokio::test]
async fn disconnect_before_completion_orphans_the_job() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let pipeline = build_pipeline(store.clone(), dir.path(), false);
    let user = UserId::new(20);

    let channel = Arc::new(RecordingChannel::new());
    let session = pipeline.open_notification_channel(user, channel.clone()).await;

    // Disconnect immediately, then upload.
    pipeline.disconnect(user, session.conn_id).await;
    let _ = tokio::time::timeout(Duration::from_secs(1), session.task).await;

    let video_id = pipeline
        .ingest(user, RouteId::new(4), b"clip", Some("late.mp4"))
        .await
        .unwrap();

    let settled = wait_for(|| {
        let store = store.clone();
        async move {
            store
                .get(video_id)
                .await
                .unwrap()
                .map(|r| r.completed)
                .unwrap_or(false)
        }
    })
    .await;
    assert!(settled);

    // Nobody is listening: the job stays in the registry and no history
    // row is written. This is the documented process-lifetime leak.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(pipeline.registry().contains(video_id).await);
    assert!(store.list_for_user(user).await.unwrap().is_empty());
    assert!(channel.sent().await.is_empty());
}

#[tokio::test]
async fn reconnect_after_completion_still_gets_notified() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let pipeline = build_pipeline(store.clone(), dir.path(), false);
    let user = UserId::new(30);

    let video_id = pipeline
        .ingest(user, RouteId::new(5), b"clip", Some("proj.mp4"))
        .await
        .unwrap();

    let settled = wait_for(|| {
        let store = store.clone();
        async move {
            store
                .get(video_id)
                .await
                .unwrap()
                .map(|r| r.completed)
                .unwrap_or(false)
        }
    })
    .await;
    assert!(settled);

    // The user connects only after the transcode finished; the first
    // scan picks the job up.
    let channel = Arc::new(RecordingChannel::new());
    let session = pipeline.open_notification_channel(user, channel.clone()).await;

    let delivered = wait_for(|| {
        let channel = channel.clone();
        async move { !channel.sent().await.is_empty() }
    })
    .await;
    assert!(delivered);
    assert!(pipeline.registry().is_empty().await);

    pipeline.disconnect(user, session.conn_id).await;
    let _ = tokio::time::timeout(Duration::from_secs(1), session.task).await;
}
