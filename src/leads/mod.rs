//! Lead management: the master list, its derived views, the permission
//! policy and the status workflow.

pub mod age;
pub mod filter;
pub mod policy;
pub mod store;
pub mod workflow;

pub use age::relative_age;
pub use filter::{aggregate_counts, apply_filters, global_counts};
pub use policy::{available_views, permissions, LeadPermissions, ViewOption};
pub use store::{fetch_all, load_members, FetchOutcome, LeadStore};
pub use workflow::{available_actions, LeadActions, LeadWorkflow};
