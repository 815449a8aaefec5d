//! Permission policy for lead actions.
//!
//! Every check the console makes goes through these functions. They take the
//! acting account explicitly and never look anything up.

use serde::Serialize;

use crate::models::{AdminRole, AdminUser, GlobalCounts, Lead, LeadView, TeamMember};

/// What the acting account may do with one lead.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeadPermissions {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_assign: bool,
}

/// Every admin may read every lead; editing is what is restricted.
pub fn can_view(_lead: &Lead, _user: &AdminUser) -> bool {
    true
}

pub fn can_edit(lead: &Lead, user: &AdminUser) -> bool {
    match user.role {
        AdminRole::Superadmin => true,
        AdminRole::Admin => user
            .worker_id()
            .is_some_and(|worker_id| lead.is_assigned_to(worker_id)),
    }
}

pub fn can_delete(user: &AdminUser) -> bool {
    user.is_superadmin()
}

pub fn can_assign(user: &AdminUser) -> bool {
    user.is_superadmin()
}

pub fn permissions(lead: &Lead, user: &AdminUser) -> LeadPermissions {
    LeadPermissions {
        can_view: can_view(lead, user),
        can_edit: can_edit(lead, user),
        can_delete: can_delete(user),
        can_assign: can_assign(user),
    }
}

/// One entry of the view selector.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ViewOption {
    pub value: LeadView,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// View options offered to `user`.
///
/// "My Leads" only makes sense for plain admins; per-member queues are a
/// superadmin tool and list active members only, counted over `leads`.
pub fn available_views(
    user: &AdminUser,
    members: &[TeamMember],
    leads: &[Lead],
    counts: &GlobalCounts,
) -> Vec<ViewOption> {
    let mut views = vec![ViewOption {
        value: LeadView::All,
        label: format!("All Leads ({})", counts.all),
        count: Some(counts.all),
    }];

    if user.role == AdminRole::Admin {
        views.push(ViewOption {
            value: LeadView::Mine,
            label: format!("My Leads ({})", counts.mine),
            count: Some(counts.mine),
        });
    }

    views.push(ViewOption {
        value: LeadView::Unassigned,
        label: format!("Unassigned ({})", counts.unassigned),
        count: Some(counts.unassigned),
    });

    if user.is_superadmin() {
        views.extend(
            members
                .iter()
                .filter(|member| member.active)
                .map(|member| {
                    let count = leads
                        .iter()
                        .filter(|lead| lead.is_assigned_to(&member.id))
                        .count();
                    ViewOption {
                        value: LeadView::Member(member.id.clone()),
                        label: format!("{}'s Leads ({})", member.name, count),
                        count: Some(count),
                    }
                }),
        );
    }

    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadStatus;
    use crate::upstream::fake::{admin, lead, member, superadmin};

    #[test]
    fn test_superadmin_can_edit_anything() {
        let user = superadmin();
        for l in [
            lead("1", LeadStatus::New, None),
            lead("2", LeadStatus::Closed, Some("W1")),
            lead("3", LeadStatus::InProgress, Some("W7")),
        ] {
            assert!(can_edit(&l, &user));
        }
        assert!(can_delete(&user));
        assert!(can_assign(&user));
    }

    #[test]
    fn test_admin_edits_only_own_leads() {
        let user = admin(Some("W1"));

        assert!(can_edit(&lead("1", LeadStatus::New, Some("W1")), &user));
        assert!(!can_edit(&lead("2", LeadStatus::New, Some("W2")), &user));
        assert!(!can_edit(&lead("3", LeadStatus::New, None), &user));
        assert!(!can_delete(&user));
        assert!(!can_assign(&user));
    }

    #[test]
    fn test_admin_without_profile_edits_nothing() {
        let user = admin(None);
        assert!(!can_edit(&lead("1", LeadStatus::New, None), &user));
        assert!(!can_edit(&lead("2", LeadStatus::New, Some("W1")), &user));
    }

    #[test]
    fn test_permission_bundle() {
        let perms = permissions(&lead("1", LeadStatus::New, Some("W2")), &admin(Some("W1")));
        assert_eq!(
            perms,
            LeadPermissions {
                can_view: true,
                can_edit: false,
                can_delete: false,
                can_assign: false,
            }
        );
    }

    #[test]
    fn test_views_for_admin() {
        let counts = GlobalCounts {
            all: 7,
            mine: 2,
            unassigned: 3,
        };
        let members = vec![member("W1", "Sam", true)];
        let views = available_views(&admin(Some("W1")), &members, &[], &counts);

        let values: Vec<&str> = views.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(values, vec!["all", "mine", "unassigned"]);
        assert_eq!(views[1].label, "My Leads (2)");
    }

    #[test]
    fn test_views_for_superadmin_list_active_members() {
        let members = vec![
            member("W1", "Sam", true),
            member("W2", "Former", false),
            member("W3", "Alex", true),
        ];
        let leads = vec![
            lead("1", LeadStatus::New, Some("W1")),
            lead("2", LeadStatus::Closed, Some("W1")),
            lead("3", LeadStatus::New, Some("W2")),
            lead("4", LeadStatus::New, None),
        ];
        let views = available_views(&superadmin(), &members, &leads, &GlobalCounts::default());

        let values: Vec<&str> = views.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(values, vec!["all", "unassigned", "W1", "W3"]);
        assert_eq!(views[2].label, "Sam's Leads (2)");
        assert_eq!(views[2].count, Some(2));
        assert_eq!(views[3].label, "Alex's Leads (0)");
        assert_eq!(views[3].count, Some(0));
    }
}
