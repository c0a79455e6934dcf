use axum::extract::State;

use crate::{
    error::ApiError, extractors::ValidPath, hal::Hal, pacticipants::find_by_name,
    state::AppState, types::PacticipantResponse,
};

/// Looks a pacticipant up by name without creating it.
pub async fn get_pacticipant_handler(
    State(state): State<AppState>,
    ValidPath(name): ValidPath<String>,
) -> Result<Hal<PacticipantResponse>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let pacticipant = find_by_name(&mut *conn, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("pacticipant {name} not found")))?;

    Ok(Hal(PacticipantResponse::new(
        &pacticipant,
        &state.config.base_url,
    )))
}
