//! In-memory [`LeadsApi`] for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::LeadsApi;
use crate::errors::AppError;
use crate::models::{
    AdminUser, InquiryType, Lead, LeadStatus, LeadUpdate, Priority, TeamMember, TeamMemberRef,
};

#[derive(Default)]
struct State {
    leads: Vec<Lead>,
    members: Vec<TeamMember>,
    admin: Option<AdminUser>,
    offline: bool,
    calls: Vec<String>,
    last_update: Option<LeadUpdate>,
}

/// Backend double. Mirrors the real server's status-timestamp behaviour.
#[derive(Default)]
pub struct InMemoryApi {
    state: Mutex<State>,
}

impl InMemoryApi {
    pub fn with_leads(leads: Vec<Lead>) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().leads = leads;
        api
    }

    pub fn set_members(&self, members: Vec<TeamMember>) {
        self.state.lock().unwrap().members = members;
    }

    pub fn set_admin(&self, admin: AdminUser) {
        self.state.lock().unwrap().admin = Some(admin);
    }

    /// Make every call fail with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_update(&self) -> Option<LeadUpdate> {
        self.state.lock().unwrap().last_update.clone()
    }

    fn record(&self, call: String) -> Result<std::sync::MutexGuard<'_, State>, AppError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.offline {
            return Err(AppError::Network("connection refused".to_string()));
        }
        Ok(state)
    }

    fn modify(
        &self,
        call: String,
        id: &str,
        change: impl FnOnce(&mut Lead),
    ) -> Result<Lead, AppError> {
        let mut state = self.record(call)?;
        let lead = state
            .leads
            .iter_mut()
            .find(|lead| lead.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", id)))?;
        change(lead);
        Ok(lead.clone())
    }
}

#[async_trait]
impl LeadsApi for InMemoryApi {
    async fn list_leads(&self) -> Result<Vec<Lead>, AppError> {
        Ok(self.record("list_leads".to_string())?.leads.clone())
    }

    async fn update_lead(&self, id: &str, changes: &LeadUpdate) -> Result<Lead, AppError> {
        self.state.lock().unwrap().last_update = Some(changes.clone());
        self.modify(format!("update_lead:{}", id), id, |lead| {
            if let Some(status) = changes.status {
                lead.status = status;
            }
            if let Some(priority) = changes.priority {
                lead.priority = priority;
            }
            if let Some(notes) = &changes.notes {
                lead.notes = notes.clone();
            }
            if let Some(assignee) = &changes.assigned_to {
                lead.assigned_to = assignee.clone().map(TeamMemberRef::new);
            }
        })
    }

    async fn mark_lead_contacted(&self, id: &str) -> Result<Lead, AppError> {
        self.modify(format!("mark_lead_contacted:{}", id), id, |lead| {
            lead.status = LeadStatus::Contacted;
            lead.contacted_at.get_or_insert_with(Utc::now);
        })
    }

    async fn close_lead(&self, id: &str) -> Result<Lead, AppError> {
        // Leaves closedAt unset so client-side stamping gets exercised.
        self.modify(format!("close_lead:{}", id), id, |lead| {
            lead.status = LeadStatus::Closed;
        })
    }

    async fn assign_lead(&self, id: &str, member_id: Option<&str>) -> Result<Lead, AppError> {
        let member_id = member_id.map(str::to_string);
        self.modify(format!("assign_lead:{}", id), id, |lead| {
            lead.assigned_to = member_id.map(TeamMemberRef::new);
        })
    }

    async fn delete_lead(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.record(format!("delete_lead:{}", id))?;
        state.leads.retain(|lead| lead.id != id);
        Ok(())
    }

    async fn list_team_members(&self, active_only: bool) -> Result<Vec<TeamMember>, AppError> {
        let state = self.record("list_team_members".to_string())?;
        Ok(state
            .members
            .iter()
            .filter(|member| member.active || !active_only)
            .cloned()
            .collect())
    }

    async fn fresh_admin(&self) -> Result<AdminUser, AppError> {
        self.record("fresh_admin".to_string())?
            .admin
            .clone()
            .ok_or_else(|| AppError::Permission("Not logged in".to_string()))
    }
}

/// Minimal lead for tests; adjust fields with struct update syntax.
pub fn lead(id: &str, status: LeadStatus, assignee: Option<&str>) -> Lead {
    Lead {
        id: id.to_string(),
        full_name: format!("Client {}", id),
        email: format!("client{}@example.com", id),
        phone_number: "555-0100".to_string(),
        message: "Interested in a listing".to_string(),
        inquiry_type: InquiryType::Buying,
        status,
        priority: Priority::Medium,
        assigned_to: assignee.map(TeamMemberRef::new),
        notes: String::new(),
        source: "website".to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap(),
        contacted_at: None,
        closed_at: None,
    }
}

pub fn member(id: &str, name: &str, active: bool) -> TeamMember {
    TeamMember {
        id: id.to_string(),
        name: name.to_string(),
        title: "Agent".to_string(),
        role: "agent".to_string(),
        active,
        license_number: None,
    }
}

pub fn admin(worker: Option<&str>) -> AdminUser {
    AdminUser {
        id: "A1".to_string(),
        role: crate::models::AdminRole::Admin,
        worker_profile: worker.map(TeamMemberRef::new),
        name: None,
        email: None,
    }
}

pub fn superadmin() -> AdminUser {
    AdminUser {
        id: "S1".to_string(),
        role: crate::models::AdminRole::Superadmin,
        worker_profile: None,
        name: None,
        email: None,
    }
}
