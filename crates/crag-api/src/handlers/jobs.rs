//! Job history handlers.

use axum::extract::State;
use axum::Json;

use crag_models::JobHistoryRecord;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// List the caller's delivered-notification history, oldest first.
pub async fn list_user_jobs(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<JobHistoryRecord>>> {
    let rows = state.history.list_for_user(user.0).await?;
    Ok(Json(rows))
}
