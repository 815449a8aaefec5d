//! Status transitions, assignment and deletion for a single lead.
//!
//! Each operation checks the policy first, then forwards to upstream, then
//! reconciles the server's answer with what was already known locally.
//! None of them touch the [`LeadStore`](super::LeadStore); callers install
//! the returned lead on success.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::policy::{can_assign, can_delete, can_edit};
use crate::errors::AppError;
use crate::models::{AdminUser, Lead, LeadStatus, LeadUpdate, TeamMember};
use crate::upstream::LeadsApi;

/// Shortcut actions currently offered for a lead.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeadActions {
    pub mark_contacted: bool,
    pub close: bool,
}

pub fn available_actions(lead: &Lead, user: &AdminUser) -> LeadActions {
    let editable = can_edit(lead, user);
    LeadActions {
        mark_contacted: editable
            && !matches!(lead.status, LeadStatus::Contacted | LeadStatus::Closed),
        close: editable && lead.status != LeadStatus::Closed,
    }
}

/// Move `lead` into `status`, stamping the matching timestamp once.
pub fn enter_status(lead: &mut Lead, status: LeadStatus, now: DateTime<Utc>) {
    lead.status = status;
    match status {
        LeadStatus::Contacted => {
            lead.contacted_at.get_or_insert(now);
        }
        LeadStatus::Closed => {
            lead.closed_at.get_or_insert(now);
        }
        LeadStatus::New | LeadStatus::InProgress => {}
    }
}

/// Merge a server response over the previous copy.
///
/// Timestamps already seen are never cleared, and if `entered` names the
/// status just transitioned into, its timestamp is stamped when the server
/// left it empty.
pub fn reconcile(
    previous: &Lead,
    returned: Lead,
    entered: Option<LeadStatus>,
    now: DateTime<Utc>,
) -> Lead {
    let mut lead = returned;
    if lead.contacted_at.is_none() {
        lead.contacted_at = previous.contacted_at;
    }
    if lead.closed_at.is_none() {
        lead.closed_at = previous.closed_at;
    }
    if let Some(status) = entered.filter(|status| *status == lead.status) {
        enter_status(&mut lead, status, now);
    }
    lead
}

/// Strip what `user` may not change and reject updates left empty.
///
/// An empty assignee string means "unassign".
pub fn sanitize_update(mut changes: LeadUpdate, user: &AdminUser) -> Result<LeadUpdate, AppError> {
    if changes.assigned_to.is_some() && !can_assign(user) {
        tracing::debug!(admin = %user.id, "Ignoring assignment from non-superadmin");
        changes.assigned_to = None;
    }
    if let Some(Some(member_id)) = &changes.assigned_to {
        if member_id.trim().is_empty() {
            changes.assigned_to = Some(None);
        }
    }
    if changes.is_empty() {
        return Err(AppError::Validation("No changes provided".to_string()));
    }
    Ok(changes)
}

/// Lead actions on behalf of one admin.
pub struct LeadWorkflow<'a> {
    api: &'a dyn LeadsApi,
    user: &'a AdminUser,
}

impl<'a> LeadWorkflow<'a> {
    pub fn new(api: &'a dyn LeadsApi, user: &'a AdminUser) -> Self {
        Self { api, user }
    }

    fn require_edit(&self, lead: &Lead) -> Result<(), AppError> {
        if can_edit(lead, self.user) {
            Ok(())
        } else {
            Err(AppError::Permission(format!(
                "Lead {} is assigned to someone else",
                lead.id
            )))
        }
    }

    pub async fn mark_contacted(&self, lead: &Lead) -> Result<Lead, AppError> {
        self.require_edit(lead)?;
        let returned = self.api.mark_lead_contacted(&lead.id).await?;
        tracing::info!(lead = %lead.id, admin = %self.user.id, "Lead marked contacted");
        Ok(reconcile(lead, returned, Some(LeadStatus::Contacted), Utc::now()))
    }

    pub async fn close(&self, lead: &Lead) -> Result<Lead, AppError> {
        self.require_edit(lead)?;
        let returned = self.api.close_lead(&lead.id).await?;
        tracing::info!(lead = %lead.id, admin = %self.user.id, "Lead closed");
        Ok(reconcile(lead, returned, Some(LeadStatus::Closed), Utc::now()))
    }

    pub async fn update(&self, lead: &Lead, changes: LeadUpdate) -> Result<Lead, AppError> {
        self.require_edit(lead)?;
        let changes = sanitize_update(changes, self.user)?;
        let entered = changes.status.filter(|status| *status != lead.status);

        let returned = self.api.update_lead(&lead.id, &changes).await?;
        tracing::info!(lead = %lead.id, admin = %self.user.id, "Lead updated");
        Ok(reconcile(lead, returned, entered, Utc::now()))
    }

    /// Reassign through the dedicated endpoint. `None` unassigns.
    pub async fn assign(
        &self,
        lead: &Lead,
        member_id: Option<&str>,
        roster: &[TeamMember],
    ) -> Result<Lead, AppError> {
        if !can_assign(self.user) {
            return Err(AppError::Permission(
                "Only a superadmin can reassign leads".to_string(),
            ));
        }
        let member_id = member_id.map(str::trim).filter(|id| !id.is_empty());
        if let Some(id) = member_id {
            if !roster.iter().any(|member| member.id == id && member.active) {
                return Err(AppError::Validation(format!(
                    "Team member {} is not an active member",
                    id
                )));
            }
        }

        let returned = self.api.assign_lead(&lead.id, member_id).await?;
        tracing::info!(lead = %lead.id, assignee = ?member_id, "Lead reassigned");
        Ok(reconcile(lead, returned, None, Utc::now()))
    }

    pub async fn delete(&self, lead: &Lead) -> Result<(), AppError> {
        if !can_delete(self.user) {
            return Err(AppError::Permission(
                "Only a superadmin can delete leads".to_string(),
            ));
        }
        self.api.delete_lead(&lead.id).await?;
        tracing::info!(lead = %lead.id, admin = %self.user.id, "Lead deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use crate::upstream::fake::{admin, lead, member, superadmin, InMemoryApi};
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 2, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_enter_status_is_idempotent_on_timestamps() {
        let mut l = lead("1", LeadStatus::New, None);
        enter_status(&mut l, LeadStatus::Contacted, at(9));
        enter_status(&mut l, LeadStatus::Contacted, at(15));
        assert_eq!(l.contacted_at, Some(at(9)));
        assert_eq!(l.closed_at, None);

        enter_status(&mut l, LeadStatus::InProgress, at(16));
        enter_status(&mut l, LeadStatus::Closed, at(17));
        assert_eq!(l.contacted_at, Some(at(9)));
        assert_eq!(l.closed_at, Some(at(17)));
    }

    #[test]
    fn test_reconcile_never_clears_timestamps() {
        let previous = Lead {
            contacted_at: Some(at(9)),
            ..lead("1", LeadStatus::Contacted, None)
        };
        let returned = lead("1", LeadStatus::New, None);

        let merged = reconcile(&previous, returned, None, at(12));
        assert_eq!(merged.status, LeadStatus::New);
        assert_eq!(merged.contacted_at, Some(at(9)));
    }

    #[test]
    fn test_reconcile_stamps_missing_transition_time() {
        let previous = lead("1", LeadStatus::InProgress, None);
        let returned = lead("1", LeadStatus::Closed, None);

        let merged = reconcile(&previous, returned, Some(LeadStatus::Closed), at(12));
        assert_eq!(merged.closed_at, Some(at(12)));
        assert_eq!(merged.contacted_at, None);
    }

    #[test]
    fn test_sanitize_drops_assignment_for_admin() {
        let changes = LeadUpdate {
            notes: Some("called back".to_string()),
            assigned_to: Some(Some("W2".to_string())),
            ..LeadUpdate::default()
        };
        let cleaned = sanitize_update(changes, &admin(Some("W1"))).unwrap();
        assert_eq!(cleaned.assigned_to, None);
        assert_eq!(cleaned.notes.as_deref(), Some("called back"));

        let only_assign = LeadUpdate {
            assigned_to: Some(Some("W2".to_string())),
            ..LeadUpdate::default()
        };
        let err = sanitize_update(only_assign, &admin(Some("W1"))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_sanitize_empty_assignee_means_unassign() {
        let changes = LeadUpdate {
            assigned_to: Some(Some("  ".to_string())),
            ..LeadUpdate::default()
        };
        let cleaned = sanitize_update(changes, &superadmin()).unwrap();
        assert_eq!(cleaned.assigned_to, Some(None));
    }

    #[test]
    fn test_available_actions() {
        let user = admin(Some("W1"));
        let new = lead("1", LeadStatus::New, Some("W1"));
        assert_eq!(
            available_actions(&new, &user),
            LeadActions {
                mark_contacted: true,
                close: true
            }
        );

        let contacted = lead("2", LeadStatus::Contacted, Some("W1"));
        assert!(!available_actions(&contacted, &user).mark_contacted);
        assert!(available_actions(&contacted, &user).close);

        let closed = lead("3", LeadStatus::Closed, Some("W1"));
        assert!(!available_actions(&closed, &user).close);

        let foreign = lead("4", LeadStatus::New, Some("W2"));
        assert!(!available_actions(&foreign, &user).mark_contacted);
    }

    #[tokio::test]
    async fn test_mark_contacted_twice_keeps_first_time() {
        let api = InMemoryApi::with_leads(vec![lead("1", LeadStatus::New, Some("W1"))]);
        let user = admin(Some("W1"));
        let workflow = LeadWorkflow::new(&api, &user);

        let original = lead("1", LeadStatus::New, Some("W1"));
        let first = workflow.mark_contacted(&original).await.unwrap();
        let first_time = first.contacted_at.expect("contactedAt stamped");

        let second = workflow.mark_contacted(&first).await.unwrap();
        assert_eq!(second.status, LeadStatus::Contacted);
        assert_eq!(second.contacted_at, Some(first_time));
    }

    #[tokio::test]
    async fn test_close_stamps_when_server_omits_time() {
        let api = InMemoryApi::with_leads(vec![lead("1", LeadStatus::Contacted, None)]);
        let user = superadmin();
        let before = Utc::now() - Duration::seconds(1);

        let closed = LeadWorkflow::new(&api, &user)
            .close(&lead("1", LeadStatus::Contacted, None))
            .await
            .unwrap();
        assert_eq!(closed.status, LeadStatus::Closed);
        assert!(closed.closed_at.is_some_and(|t| t >= before));
    }

    #[tokio::test]
    async fn test_permission_denied_never_reaches_upstream() {
        let foreign = lead("1", LeadStatus::New, Some("W2"));
        let api = InMemoryApi::with_leads(vec![foreign.clone()]);
        let user = admin(Some("W1"));
        let workflow = LeadWorkflow::new(&api, &user);

        assert!(matches!(
            workflow.mark_contacted(&foreign).await,
            Err(AppError::Permission(_))
        ));
        assert!(matches!(
            workflow.close(&foreign).await,
            Err(AppError::Permission(_))
        ));
        let changes = LeadUpdate {
            priority: Some(Priority::High),
            ..LeadUpdate::default()
        };
        assert!(matches!(
            workflow.update(&foreign, changes).await,
            Err(AppError::Permission(_))
        ));
        assert!(matches!(
            workflow.delete(&foreign).await,
            Err(AppError::Permission(_))
        ));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_forwards_without_assignment_for_admin() {
        let own = lead("1", LeadStatus::New, Some("W1"));
        let api = InMemoryApi::with_leads(vec![own.clone()]);
        let user = admin(Some("W1"));

        let changes = LeadUpdate {
            status: Some(LeadStatus::Contacted),
            assigned_to: Some(None),
            ..LeadUpdate::default()
        };
        let updated = LeadWorkflow::new(&api, &user)
            .update(&own, changes)
            .await
            .unwrap();

        assert_eq!(api.last_update().unwrap().assigned_to, None);
        assert_eq!(updated.assignee_id(), Some("W1"));
        assert_eq!(updated.status, LeadStatus::Contacted);
        assert!(updated.contacted_at.is_some());
    }

    #[tokio::test]
    async fn test_assign_requires_active_member() {
        let target = lead("1", LeadStatus::New, None);
        let api = InMemoryApi::with_leads(vec![target.clone()]);
        let user = superadmin();
        let roster = vec![member("W1", "Sam", true), member("W2", "Gone", false)];
        let workflow = LeadWorkflow::new(&api, &user);

        assert!(matches!(
            workflow.assign(&target, Some("W2"), &roster).await,
            Err(AppError::Validation(_))
        ));

        let assigned = workflow.assign(&target, Some("W1"), &roster).await.unwrap();
        assert_eq!(assigned.assignee_id(), Some("W1"));

        let cleared = workflow.assign(&assigned, None, &roster).await.unwrap();
        assert!(cleared.assigned_to.is_none());
    }

    #[tokio::test]
    async fn test_network_failure_surfaces_as_transient() {
        let own = lead("1", LeadStatus::New, Some("W1"));
        let api = InMemoryApi::with_leads(vec![own.clone()]);
        api.set_offline(true);
        let user = admin(Some("W1"));

        let err = LeadWorkflow::new(&api, &user)
            .mark_contacted(&own)
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
