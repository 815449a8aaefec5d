//! Team member API endpoints.

use axum::extract::{Query, State};
use serde::Deserialize;

use super::{respond, ApiResult};
use crate::models::TeamMember;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// GET /api/team-members - Team members for assignment dropdowns.
pub async fn list_team_members(
    State(state): State<AppState>,
    Query(query): Query<TeamQuery>,
) -> ApiResult<Vec<TeamMember>> {
    let result = state.upstream.list_team_members(query.active_only).await;

    if let (true, Ok(members)) = (query.active_only, &result) {
        state.store.write().await.set_members(members.clone());
    }
    respond(&state, result).await
}
