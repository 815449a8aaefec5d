//! Lead model and its enumerations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::TeamMemberRef;

/// Pipeline stage of a lead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LeadStatus {
    New,
    Contacted,
    InProgress,
    Closed,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::InProgress,
        LeadStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::InProgress => "InProgress",
            LeadStatus::Closed => "Closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

/// What the customer is asking about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InquiryType {
    Buying,
    Selling,
    Renting,
    Land,
    Consulting,
}

impl InquiryType {
    pub const ALL: [InquiryType; 5] = [
        InquiryType::Buying,
        InquiryType::Selling,
        InquiryType::Renting,
        InquiryType::Land,
        InquiryType::Consulting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryType::Buying => "buying",
            InquiryType::Selling => "selling",
            InquiryType::Renting => "renting",
            InquiryType::Land => "land",
            InquiryType::Consulting => "consulting",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

/// A customer inquiry tracked through the sales pipeline.
///
/// The backend owns leads; the console only ever holds a copy of the last
/// server response for each one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub message: String,
    pub inquiry_type: InquiryType,
    pub status: LeadStatus,
    pub priority: Priority,
    #[serde(default)]
    pub assigned_to: Option<TeamMemberRef>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub source: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub contacted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Lead {
    /// Id of the assigned team member. A reference with an empty id counts as unassigned.
    pub fn assignee_id(&self) -> Option<&str> {
        self.assigned_to
            .as_ref()
            .map(|member| member.id.as_str())
            .filter(|id| !id.is_empty())
    }

    pub fn is_assigned_to(&self, member_id: &str) -> bool {
        self.assignee_id() == Some(member_id)
    }
}

/// Partial update for a lead.
///
/// `assigned_to` distinguishes "leave alone" (`None`) from "unassign" (`Some(None)`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub assigned_to: Option<Option<String>>,
}

impl LeadUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.notes.is_none()
            && self.assigned_to.is_none()
    }
}

/// Keeps an explicit `null` distinguishable from an absent field.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Per-status counts over a set of leads.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeadStats {
    pub total: usize,
    pub new: usize,
    pub contacted: usize,
    pub in_progress: usize,
    pub closed: usize,
}

/// View-selector counts, always taken over the unfiltered master list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalCounts {
    pub all: usize,
    pub mine: usize,
    pub unassigned: usize,
}
