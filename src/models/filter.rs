//! Filter selection for the leads list.

use serde::{Serialize, Serializer};

use super::{InquiryType, LeadStatus, Priority};
use crate::errors::AppError;

/// Named filter preset for the leads list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LeadView {
    #[default]
    All,
    Mine,
    Unassigned,
    /// Queue of one specific team member, by id.
    Member(String),
}

impl LeadView {
    /// Anything that is not a reserved keyword is taken as a team member id.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "all" => LeadView::All,
            "mine" => LeadView::Mine,
            "unassigned" => LeadView::Unassigned,
            member_id => LeadView::Member(member_id.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LeadView::All => "all",
            LeadView::Mine => "mine",
            LeadView::Unassigned => "unassigned",
            LeadView::Member(id) => id,
        }
    }
}

impl Serialize for LeadView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Current list filters. `None` on a dimension means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub view: LeadView,
    pub status: Option<LeadStatus>,
    pub inquiry_type: Option<InquiryType>,
    pub priority: Option<Priority>,
    pub search_query: String,
}

impl FilterState {
    /// Build filters from raw query values, rejecting unknown enum values.
    pub fn parse(
        view: Option<&str>,
        status: Option<&str>,
        inquiry_type: Option<&str>,
        priority: Option<&str>,
        search_query: Option<&str>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            view: view.map(LeadView::parse).unwrap_or_default(),
            status: parse_dimension("status", status, LeadStatus::parse)?,
            inquiry_type: parse_dimension("inquiryType", inquiry_type, InquiryType::parse)?,
            priority: parse_dimension("priority", priority, Priority::parse)?,
            search_query: search_query.unwrap_or_default().to_string(),
        })
    }
}

#[cfg(test)]
impl FilterState {
    pub fn with_view(mut self, view: LeadView) -> Self {
        self.view = view;
        self
    }

    pub fn with_status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }
}

fn parse_dimension<T>(
    name: &str,
    raw: Option<&str>,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => parse(value)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Unknown {} filter: {}", name, value))),
    }
}
