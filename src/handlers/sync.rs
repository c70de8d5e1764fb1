use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::state::AppState;

// POST /api/sessions/:id/sync
//
// Push a session to the external calendar backend. Fails with 502 when no
// provider is configured or the remote call fails; the local record is left
// unchanged either way.
pub async fn push_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = {
        let db = state.db.lock().unwrap();
        queries::get_session_by_id(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("session {id}")))?
    };

    let Some(provider) = &state.sync else {
        return Err(AppError::SyncUnavailable(
            "no external calendar provider configured".to_string(),
        ));
    };

    let remote_id = provider
        .push_session(&session)
        .await
        .map_err(|e| AppError::SyncUnavailable(e.to_string()))?;

    tracing::info!(session_id = %id, remote_id = %remote_id, "session pushed to external calendar");
    Ok(Json(serde_json::json!({ "remote_id": remote_id })))
}
