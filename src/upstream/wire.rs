//! Upstream document shapes.
//!
//! The backend speaks Mongo-style documents: `_id` identifiers, populated or
//! bare references, and localized member names under `translations.en`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{
    AdminRole, AdminUser, InquiryType, Lead, LeadStatus, Priority, TeamMember, TeamMemberRef,
};

/// Responses arrive either bare or wrapped as `{ "data": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

/// Error body shapes seen from the backend.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Nested { error: NestedError },
    Flat { message: String },
}

#[derive(Debug, Deserialize)]
pub struct NestedError {
    pub message: String,
}

impl ErrorBody {
    pub fn into_message(self) -> String {
        match self {
            ErrorBody::Nested { error } => error.message,
            ErrorBody::Flat { message } => message,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Translations {
    #[serde(default)]
    pub en: Option<LocalizedProfile>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LocalizedProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub translations: Option<Translations>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub license_number: Option<String>,
}

fn default_active() -> bool {
    true
}

impl TeamMemberRecord {
    fn english(&self) -> Option<&LocalizedProfile> {
        self.translations.as_ref().and_then(|t| t.en.as_ref())
    }

    fn display_name(&self) -> Option<String> {
        self.english()
            .and_then(|en| en.name.clone())
            .or_else(|| self.name.clone())
    }
}

impl From<TeamMemberRecord> for TeamMember {
    fn from(record: TeamMemberRecord) -> Self {
        let name = record.display_name().unwrap_or_default();
        let title = record
            .english()
            .and_then(|en| en.title.clone())
            .or(record.title)
            .unwrap_or_default();
        TeamMember {
            id: record.id,
            name,
            title,
            role: record.role.unwrap_or_default(),
            active: record.active,
            license_number: record.license_number,
        }
    }
}

/// A member reference that may or may not have been populated.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MemberRefRecord {
    Populated(TeamMemberRecord),
    Id(String),
}

impl From<MemberRefRecord> for TeamMemberRef {
    fn from(record: MemberRefRecord) -> Self {
        match record {
            MemberRefRecord::Populated(member) => TeamMemberRef {
                name: member.display_name(),
                id: member.id,
            },
            MemberRefRecord::Id(id) => TeamMemberRef::new(id),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub message: String,
    pub inquiry_type: InquiryType,
    pub status: LeadStatus,
    pub priority: Priority,
    #[serde(default)]
    pub assigned_to: Option<MemberRefRecord>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub contacted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<LeadRecord> for Lead {
    fn from(record: LeadRecord) -> Self {
        Lead {
            id: record.id,
            full_name: record.full_name,
            email: record.email,
            phone_number: record.phone_number,
            message: record.message,
            inquiry_type: record.inquiry_type,
            status: record.status,
            priority: record.priority,
            assigned_to: record
                .assigned_to
                .map(TeamMemberRef::from)
                .filter(|member| !member.id.is_empty()),
            notes: record.notes.unwrap_or_default(),
            source: record.source.unwrap_or_default(),
            created_at: record.created_at,
            contacted_at: record.contacted_at,
            closed_at: record.closed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub role: AdminRole,
    #[serde(default)]
    pub worker_profile: Option<MemberRefRecord>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<AdminRecord> for AdminUser {
    fn from(record: AdminRecord) -> Self {
        AdminUser {
            id: record.id,
            role: record.role,
            worker_profile: record.worker_profile.map(TeamMemberRef::from),
            name: record.name,
            email: record.email,
        }
    }
}

/// Decode a lead list one document at a time, skipping those that do not fit.
pub fn decode_leads(documents: Vec<serde_json::Value>) -> Vec<Lead> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document
                .get("_id")
                .or_else(|| document.get("id"))
                .and_then(serde_json::Value::as_str)
                .unwrap_or("<unknown>")
                .to_string();
            match serde_json::from_value::<LeadRecord>(document) {
                Ok(record) => Some(Lead::from(record)),
                Err(e) => {
                    tracing::warn!(lead = %id, "Skipping undecodable lead: {}", e);
                    None
                }
            }
        })
        .collect()
}

/// Some backends answer `/admin/me` with `{ "admin": {...} }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AdminPayload {
    Keyed { admin: AdminRecord },
    Plain(AdminRecord),
}

impl From<AdminPayload> for AdminUser {
    fn from(payload: AdminPayload) -> Self {
        match payload {
            AdminPayload::Keyed { admin } | AdminPayload::Plain(admin) => admin.into(),
        }
    }
}
