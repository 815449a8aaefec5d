//! Session API endpoints.

use axum::extract::State;

use super::{respond, ApiResult};
use crate::errors::AppError;
use crate::session::{self, SessionView};
use crate::AppState;

/// GET /api/session - The acting admin as currently known.
pub async fn get_session(State(state): State<AppState>) -> ApiResult<SessionView> {
    let view = state.session.read().await.view();
    respond(&state, Ok(view)).await
}

/// POST /api/session/refresh - Re-read the admin from upstream.
pub async fn refresh_session(State(state): State<AppState>) -> ApiResult<SessionView> {
    let result = async {
        session::refresh(
            &state.session,
            state.upstream.as_ref(),
            &state.config.session_cache,
        )
        .await?;
        Ok::<_, AppError>(state.session.read().await.view())
    }
    .await;
    respond(&state, result).await
}
