use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::services::scheduling;
use crate::state::AppState;

// GET /api/trainers/:trainer_id/slots?date=YYYY-MM-DD&duration=60
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String,
    pub duration: Option<i64>,
}

pub async fn get_available_slots(
    State(state): State<Arc<AppState>>,
    Path(trainer_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let duration = query.duration.unwrap_or(60);
    let db = state.db.lock().unwrap();
    let slots = scheduling::available_slots(&db, &trainer_id, &query.date, duration)?;
    Ok(Json(slots))
}
