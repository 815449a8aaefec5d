//! Admin account model.

use serde::{Deserialize, Serialize};

use super::TeamMemberRef;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Admin,
    Superadmin,
}

/// The logged-in dashboard account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub role: AdminRole,
    #[serde(default)]
    pub worker_profile: Option<TeamMemberRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AdminUser {
    pub fn is_superadmin(&self) -> bool {
        self.role == AdminRole::Superadmin
    }

    /// Id of the linked worker profile, if the account has one.
    pub fn worker_id(&self) -> Option<&str> {
        self.worker_profile
            .as_ref()
            .map(|profile| profile.id.as_str())
            .filter(|id| !id.is_empty())
    }
}
