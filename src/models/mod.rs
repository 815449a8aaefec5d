//! Data models for the leads console.
//!
//! Field names serialize in camelCase to match what the dashboard already consumes.

mod admin;
mod filter;
mod lead;
mod member;

pub use admin::*;
pub use filter::*;
pub use lead::*;
pub use member::*;
