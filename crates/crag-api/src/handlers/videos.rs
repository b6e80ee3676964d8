//! Video API handlers.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crag_models::{RouteId, VideoId};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Upload response.
#[derive(Serialize)]
pub struct UploadResponse {
    pub video_id: VideoId,
}

/// Video info response.
///
/// `failed` here is the only place a broken transcode ever surfaces;
/// nothing is pushed for failures.
#[derive(Serialize)]
pub struct VideoInfoResponse {
    pub id: VideoId,
    pub completed: bool,
    pub failed: bool,
}

/// Upload a clip for a route.
///
/// The multipart body must carry a `file` part. The response returns as
/// soon as the raw upload is on disk and the record exists; compression
/// runs in the background and completion is pushed over the user's
/// notification channel.
pub async fn upload_route_video(
    State(state): State<AppState>,
    Path(route_id): Path<i64>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
        .ok_or_else(|| ApiError::bad_request("Missing file part"))?;

    if field.name() != Some("file") {
        return Err(ApiError::bad_request("Expected a part named 'file'"));
    }

    let suggested_name = field.file_name().map(|s| s.to_string());
    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

    if data.is_empty() {
        return Err(ApiError::bad_request("Empty upload"));
    }

    let video_id = state
        .pipeline
        .ingest(user.0, RouteId::new(route_id), &data, suggested_name.as_deref())
        .await?;

    info!("Accepted upload for route {} as video {}", route_id, video_id);

    Ok((StatusCode::CREATED, Json(UploadResponse { video_id })))
}

/// Poll a video's transcode state.
pub async fn get_video_info(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
    _user: AuthUser,
) -> ApiResult<Json<VideoInfoResponse>> {
    let record = state
        .videos
        .get(VideoId::new(video_id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Video {} not found", video_id)))?;

    Ok(Json(VideoInfoResponse {
        id: record.id,
        completed: record.completed,
        failed: record.failed,
    }))
}
