//! Upstream REST API collaborator.
//!
//! The console never owns lead data; everything is read from and written to
//! the agency backend through [`LeadsApi`].

mod http;
mod wire;

#[cfg(test)]
pub mod fake;

pub use http::HttpLeadsApi;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{AdminUser, Lead, LeadUpdate, TeamMember};

/// Operations the console consumes from the upstream API.
#[async_trait]
pub trait LeadsApi: Send + Sync {
    /// Full lead list. Implementations must not apply any server-side view.
    async fn list_leads(&self) -> Result<Vec<Lead>, AppError>;

    async fn update_lead(&self, id: &str, changes: &LeadUpdate) -> Result<Lead, AppError>;

    async fn mark_lead_contacted(&self, id: &str) -> Result<Lead, AppError>;

    async fn close_lead(&self, id: &str) -> Result<Lead, AppError>;

    async fn assign_lead(&self, id: &str, member_id: Option<&str>) -> Result<Lead, AppError>;

    async fn delete_lead(&self, id: &str) -> Result<(), AppError>;

    async fn list_team_members(&self, active_only: bool) -> Result<Vec<TeamMember>, AppError>;

    /// Server round-trip for the logged-in account.
    async fn fresh_admin(&self) -> Result<AdminUser, AppError>;
}
