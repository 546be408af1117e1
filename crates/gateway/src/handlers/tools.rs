//! Study tools

use axum::{extract::State, Json};
use studyhub_common::{
    errors::Result,
    timetable::{build_timetable, Timetable, TimetableRequest},
};

use crate::AppState;

pub async fn generate_timetable(
    State(state): State<AppState>,
    Json(request): Json<TimetableRequest>,
) -> Result<Json<Timetable>> {
    let timetable = build_timetable(&request, &state.content)?;
    tracing::info!(sessions = timetable.session_count(), "Timetable generated");
    Ok(Json(timetable))
}
