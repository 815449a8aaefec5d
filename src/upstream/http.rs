//! reqwest implementation of [`LeadsApi`].

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::wire::{self, AdminPayload, Envelope, ErrorBody, LeadRecord, TeamMemberRecord};
use super::LeadsApi;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{AdminUser, Lead, LeadUpdate, TeamMember};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignBody<'a> {
    assigned_to: Option<&'a str>,
}

/// HTTP client for the agency backend.
pub struct HttpLeadsApi {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpLeadsApi {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.upstream_url.clone(),
            token: config.upstream_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and fail on any non-success status.
    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(ErrorBody::into_message)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("error").to_string()
                } else {
                    body
                }
            });
        tracing::warn!(%status, %message, "Upstream request rejected");
        Err(AppError::from_upstream(status, message))
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, AppError> {
        let bytes = self.dispatch(builder).await?.bytes().await?;
        serde_json::from_slice::<Envelope<T>>(&bytes)
            .map(Envelope::into_inner)
            .map_err(|e| {
                tracing::error!("Undecodable upstream body: {:?}", e);
                AppError::Network(format!("Unexpected upstream response: {}", e))
            })
    }

    async fn fetch_lead(&self, builder: RequestBuilder) -> Result<Lead, AppError> {
        self.fetch::<LeadRecord>(builder).await.map(Lead::from)
    }
}

#[async_trait]
impl LeadsApi for HttpLeadsApi {
    async fn list_leads(&self) -> Result<Vec<Lead>, AppError> {
        // The backend's own view filter is unreliable; always ask for everything.
        let builder = self.request(Method::GET, "/leads").query(&[("view", "all")]);
        let documents: Vec<serde_json::Value> = self.fetch(builder).await?;
        Ok(wire::decode_leads(documents))
    }

    async fn update_lead(&self, id: &str, changes: &LeadUpdate) -> Result<Lead, AppError> {
        let builder = self
            .request(Method::PUT, &format!("/leads/{}", id))
            .json(changes);
        self.fetch_lead(builder).await
    }

    async fn mark_lead_contacted(&self, id: &str) -> Result<Lead, AppError> {
        let builder = self.request(Method::PATCH, &format!("/leads/{}/contacted", id));
        self.fetch_lead(builder).await
    }

    async fn close_lead(&self, id: &str) -> Result<Lead, AppError> {
        let builder = self.request(Method::PATCH, &format!("/leads/{}/close", id));
        self.fetch_lead(builder).await
    }

    async fn assign_lead(&self, id: &str, member_id: Option<&str>) -> Result<Lead, AppError> {
        let builder = self
            .request(Method::PATCH, &format!("/leads/{}/assign", id))
            .json(&AssignBody {
                assigned_to: member_id,
            });
        self.fetch_lead(builder).await
    }

    async fn delete_lead(&self, id: &str) -> Result<(), AppError> {
        let builder = self.request(Method::DELETE, &format!("/leads/{}", id));
        self.dispatch(builder).await.map(|_| ())
    }

    async fn list_team_members(&self, active_only: bool) -> Result<Vec<TeamMember>, AppError> {
        let records: Vec<TeamMemberRecord> = self.fetch(self.request(Method::GET, "/team")).await?;
        Ok(records
            .into_iter()
            .map(TeamMember::from)
            .filter(|member| member.active || !active_only)
            .collect())
    }

    async fn fresh_admin(&self) -> Result<AdminUser, AppError> {
        let payload: AdminPayload = self.fetch(self.request(Method::GET, "/admin/me")).await?;
        Ok(payload.into())
    }
}
