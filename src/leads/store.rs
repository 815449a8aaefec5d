//! Master list of leads as of the last successful fetch.
//!
//! The list is only ever replaced wholesale by a fetch, or one lead at a time
//! from a server response. A failed request never touches it.

use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::{Lead, TeamMember};
use crate::upstream::LeadsApi;

/// Identifies one in-flight fetch; stale tickets are rejected on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { count: usize, revision: i64 },
    /// Superseded or invalidated while in flight; the list was left alone.
    Discarded,
}

#[derive(Debug, Default)]
pub struct LeadStore {
    leads: Vec<Lead>,
    members: Vec<TeamMember>,
    loaded: bool,
    revision: i64,
    generation: u64,
}

impl LeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    /// Active team members known from the last roster load.
    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Bumped on every change to the master list.
    pub fn revision(&self) -> i64 {
        self.revision
    }

    pub fn get(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|lead| lead.id == id)
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket(self.generation)
    }

    /// Drop interest in any fetch currently in flight.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    pub fn complete_fetch(&mut self, ticket: FetchTicket, leads: Vec<Lead>) -> FetchOutcome {
        if ticket.0 != self.generation {
            return FetchOutcome::Discarded;
        }
        self.leads = leads;
        self.loaded = true;
        self.revision += 1;
        FetchOutcome::Applied {
            count: self.leads.len(),
            revision: self.revision,
        }
    }

    /// Swap in the server's copy of a lead, keeping its position.
    pub fn replace(&mut self, lead: Lead) -> bool {
        match self.leads.iter_mut().find(|existing| existing.id == lead.id) {
            Some(slot) => {
                *slot = lead;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn evict(&mut self, id: &str) -> Option<Lead> {
        let index = self.leads.iter().position(|lead| lead.id == id)?;
        self.revision += 1;
        Some(self.leads.remove(index))
    }

    pub fn set_members(&mut self, members: Vec<TeamMember>) {
        self.members = members;
    }
}

/// Fetch the complete lead list and install it.
///
/// Upstream is always asked for the unfiltered set; every view is derived
/// locally. On failure the previous list stays in place.
pub async fn fetch_all(
    store: &RwLock<LeadStore>,
    api: &dyn LeadsApi,
) -> Result<FetchOutcome, AppError> {
    let ticket = store.write().await.begin_fetch();

    let leads = match api.list_leads().await {
        Ok(leads) => leads,
        Err(e) => {
            tracing::warn!("Failed to load leads, keeping previous list: {}", e);
            return Err(e);
        }
    };

    let outcome = store.write().await.complete_fetch(ticket, leads);
    match outcome {
        FetchOutcome::Applied { count, revision } => {
            tracing::info!(count, revision, "Lead list refreshed");
        }
        FetchOutcome::Discarded => tracing::debug!("Discarded superseded lead fetch"),
    }
    Ok(outcome)
}

/// Reload the active team roster used for assignment and member views.
pub async fn load_members(store: &RwLock<LeadStore>, api: &dyn LeadsApi) -> Result<usize, AppError> {
    let members = api.list_team_members(true).await.map_err(|e| {
        tracing::warn!("Failed to load team members: {}", e);
        e
    })?;
    let count = members.len();
    store.write().await.set_members(members);
    Ok(count)
}
