use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::db::queries;
use crate::errors::AppError;
use crate::services::calendar::generate_ics;
use crate::state::AppState;

// GET /calendar/:session_id
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    // Strip .ics suffix if present
    let session_id = raw_id.strip_suffix(".ics").unwrap_or(&raw_id);

    let session = {
        let db = state.db.lock().unwrap();
        queries::get_session_by_id(&db, session_id)?
            .ok_or_else(|| AppError::NotFound(format!("session {session_id}")))?
    };

    let ics = generate_ics(&session)?;
    let filename = format!("session-{session_id}.ics");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                &format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}
