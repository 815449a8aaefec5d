//! Lead API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{respond, ApiResult};
use crate::errors::AppError;
use crate::leads::policy::can_edit;
use crate::leads::{
    aggregate_counts, apply_filters, available_actions, available_views, fetch_all,
    global_counts, load_members, permissions, relative_age, FetchOutcome, LeadActions,
    LeadPermissions, LeadWorkflow, ViewOption,
};
use crate::models::{AdminUser, FilterState, GlobalCounts, Lead, LeadStats, LeadUpdate};
use crate::AppState;

/// Query parameters for the lead list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadQuery {
    pub view: Option<String>,
    pub status: Option<String>,
    pub inquiry_type: Option<String>,
    pub priority: Option<String>,
    #[serde(alias = "search")]
    pub q: Option<String>,
}

/// One row of the lead table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRow {
    #[serde(flatten)]
    pub lead: Lead,
    pub age: String,
    pub can_edit: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadListing {
    pub filters: FilterState,
    pub leads: Vec<LeadRow>,
    /// Counts over the filtered rows.
    pub stats: LeadStats,
    /// Counts over the whole master list.
    pub global_counts: GlobalCounts,
    pub views: Vec<ViewOption>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDetail {
    pub lead: Lead,
    pub permissions: LeadPermissions,
    pub actions: LeadActions,
}

impl LeadDetail {
    fn new(lead: Lead, user: &AdminUser) -> Self {
        Self {
            permissions: permissions(&lead, user),
            actions: available_actions(&lead, user),
            lead,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub count: Option<usize>,
    pub discarded: bool,
}

#[derive(Debug, Serialize)]
pub struct DeletedLead {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    #[serde(default)]
    pub assigned_to: Option<String>,
}

async fn current_admin(state: &AppState) -> Result<AdminUser, AppError> {
    state.session.read().await.require().cloned()
}

/// The acting admin plus the cached copy of lead `id`.
async fn snapshot(state: &AppState, id: &str) -> Result<(AdminUser, Lead), AppError> {
    let user = current_admin(state).await?;
    let lead = state
        .store
        .read()
        .await
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", id)))?;
    Ok((user, lead))
}

/// Install a lead returned by a successful write and describe it.
async fn install(state: &AppState, lead: Lead, user: &AdminUser) -> LeadDetail {
    if !state.store.write().await.replace(lead.clone()) {
        tracing::debug!(lead = %lead.id, "Updated lead no longer in master list");
    }
    LeadDetail::new(lead, user)
}

async fn build_listing(state: &AppState, query: LeadQuery) -> Result<LeadListing, AppError> {
    let filters = FilterState::parse(
        query.view.as_deref(),
        query.status.as_deref(),
        query.inquiry_type.as_deref(),
        query.priority.as_deref(),
        query.q.as_deref(),
    )?;
    let user = current_admin(state).await?;

    if !state.store.read().await.is_loaded() {
        fetch_all(&state.store, state.upstream.as_ref()).await?;
    }

    let store = state.store.read().await;
    let now = Utc::now();
    let visible = apply_filters(store.leads(), &filters, &user);
    let stats = aggregate_counts(visible.iter().copied());
    let global = global_counts(store.leads(), &user);
    let views = available_views(&user, store.members(), store.leads(), &global);

    let leads = visible
        .into_iter()
        .map(|lead| LeadRow {
            age: relative_age(lead.created_at, now),
            can_edit: can_edit(lead, &user),
            lead: lead.clone(),
        })
        .collect();

    Ok(LeadListing {
        filters,
        leads,
        stats,
        global_counts: global,
        views,
    })
}

/// GET /api/leads - Filtered lead list with stats and view counts.
pub async fn list_leads(
    State(state): State<AppState>,
    Query(query): Query<LeadQuery>,
) -> ApiResult<LeadListing> {
    let result = build_listing(&state, query).await;
    respond(&state, result).await
}

/// POST /api/leads/refresh - Reload the master list from upstream.
pub async fn refresh_leads(State(state): State<AppState>) -> ApiResult<RefreshSummary> {
    let result = fetch_all(&state.store, state.upstream.as_ref())
        .await
        .map(|outcome| match outcome {
            FetchOutcome::Applied { count, .. } => RefreshSummary {
                count: Some(count),
                discarded: false,
            },
            FetchOutcome::Discarded => RefreshSummary {
                count: None,
                discarded: true,
            },
        });
    respond(&state, result).await
}

/// DELETE /api/leads/refresh - Abandon any lead fetch still in flight.
///
/// Called when the dashboard navigates away from the list; a fetch that
/// completes afterwards is discarded instead of installed.
pub async fn cancel_refresh(State(state): State<AppState>) -> ApiResult<RefreshSummary> {
    state.store.write().await.invalidate();
    tracing::debug!("In-flight lead fetch invalidated");
    let summary = RefreshSummary {
        count: None,
        discarded: true,
    };
    respond(&state, Ok(summary)).await
}

/// GET /api/leads/:id - A single lead with what the admin may do with it.
pub async fn get_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<LeadDetail> {
    let result = snapshot(&state, &id)
        .await
        .map(|(user, lead)| LeadDetail::new(lead, &user));
    respond(&state, result).await
}

async fn apply_update(
    state: &AppState,
    id: &str,
    changes: LeadUpdate,
) -> Result<LeadDetail, AppError> {
    let (user, lead) = snapshot(state, id).await?;
    let updated = LeadWorkflow::new(state.upstream.as_ref(), &user)
        .update(&lead, changes)
        .await?;
    Ok(install(state, updated, &user).await)
}

/// PATCH /api/leads/:id - Update status, priority, notes or assignment.
pub async fn update_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<LeadUpdate>,
) -> ApiResult<LeadDetail> {
    let result = apply_update(&state, &id, changes).await;
    respond(&state, result).await
}

async fn apply_contacted(state: &AppState, id: &str) -> Result<LeadDetail, AppError> {
    let (user, lead) = snapshot(state, id).await?;
    let updated = LeadWorkflow::new(state.upstream.as_ref(), &user)
        .mark_contacted(&lead)
        .await?;
    Ok(install(state, updated, &user).await)
}

/// POST /api/leads/:id/contacted - Mark a lead as contacted.
pub async fn mark_lead_contacted(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<LeadDetail> {
    let result = apply_contacted(&state, &id).await;
    respond(&state, result).await
}

async fn apply_close(state: &AppState, id: &str) -> Result<LeadDetail, AppError> {
    let (user, lead) = snapshot(state, id).await?;
    let updated = LeadWorkflow::new(state.upstream.as_ref(), &user)
        .close(&lead)
        .await?;
    Ok(install(state, updated, &user).await)
}

/// POST /api/leads/:id/close - Close a lead.
pub async fn close_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<LeadDetail> {
    let result = apply_close(&state, &id).await;
    respond(&state, result).await
}

async fn apply_assignment(
    state: &AppState,
    id: &str,
    request: AssignmentRequest,
) -> Result<LeadDetail, AppError> {
    let (user, lead) = snapshot(state, id).await?;

    if state.store.read().await.members().is_empty() {
        load_members(&state.store, state.upstream.as_ref()).await?;
    }
    let roster = state.store.read().await.members().to_vec();

    let updated = LeadWorkflow::new(state.upstream.as_ref(), &user)
        .assign(&lead, request.assigned_to.as_deref(), &roster)
        .await?;
    Ok(install(state, updated, &user).await)
}

/// PUT /api/leads/:id/assignment - Reassign a lead (superadmin only).
pub async fn assign_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AssignmentRequest>,
) -> ApiResult<LeadDetail> {
    let result = apply_assignment(&state, &id, request).await;
    respond(&state, result).await
}

async fn apply_delete(state: &AppState, id: &str) -> Result<DeletedLead, AppError> {
    let (user, lead) = snapshot(state, id).await?;
    LeadWorkflow::new(state.upstream.as_ref(), &user)
        .delete(&lead)
        .await?;
    state.store.write().await.evict(id);
    Ok(DeletedLead { id: id.to_string() })
}

/// DELETE /api/leads/:id - Delete a lead (superadmin only).
pub async fn delete_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeletedLead> {
    let result = apply_delete(&state, &id).await;
    respond(&state, result).await
}
