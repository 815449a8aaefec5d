//! Pure list derivation: filtering and counting.
//!
//! Nothing here performs I/O; every function is deterministic over its inputs.

use crate::models::{AdminUser, FilterState, GlobalCounts, Lead, LeadStats, LeadStatus, LeadView};

/// Leads that satisfy every active filter, in input order.
pub fn apply_filters<'a>(
    leads: &'a [Lead],
    filters: &FilterState,
    user: &AdminUser,
) -> Vec<&'a Lead> {
    let query = filters.search_query.to_lowercase();

    leads
        .iter()
        .filter(|lead| matches_view(lead, &filters.view, user))
        .filter(|lead| filters.status.map_or(true, |s| lead.status == s))
        .filter(|lead| filters.inquiry_type.map_or(true, |t| lead.inquiry_type == t))
        .filter(|lead| filters.priority.map_or(true, |p| lead.priority == p))
        .filter(|lead| query.is_empty() || matches_search(lead, &query))
        .collect()
}

/// View predicate. `Mine` for an account without a worker profile matches nothing.
pub fn matches_view(lead: &Lead, view: &LeadView, user: &AdminUser) -> bool {
    match view {
        LeadView::All => true,
        LeadView::Mine => user
            .worker_id()
            .is_some_and(|worker_id| lead.is_assigned_to(worker_id)),
        LeadView::Unassigned => lead.assignee_id().is_none(),
        LeadView::Member(member_id) => lead.is_assigned_to(member_id),
    }
}

/// `query` must already be lowercased.
fn matches_search(lead: &Lead, query: &str) -> bool {
    [
        &lead.full_name,
        &lead.email,
        &lead.phone_number,
        &lead.message,
    ]
    .into_iter()
    .any(|field| field.to_lowercase().contains(query))
}

pub fn aggregate_counts<'a, I>(leads: I) -> LeadStats
where
    I: IntoIterator<Item = &'a Lead>,
{
    leads
        .into_iter()
        .fold(LeadStats::default(), |mut stats, lead| {
            stats.total += 1;
            match lead.status {
                LeadStatus::New => stats.new += 1,
                LeadStatus::Contacted => stats.contacted += 1,
                LeadStatus::InProgress => stats.in_progress += 1,
                LeadStatus::Closed => stats.closed += 1,
            }
            stats
        })
}

/// Counts for the view selector, taken over the whole master list.
pub fn global_counts(all_leads: &[Lead], user: &AdminUser) -> GlobalCounts {
    let count = |view: &LeadView| {
        all_leads
            .iter()
            .filter(|lead| matches_view(lead, view, user))
            .count()
    };

    GlobalCounts {
        all: all_leads.len(),
        mine: count(&LeadView::Mine),
        unassigned: count(&LeadView::Unassigned),
    }
}
