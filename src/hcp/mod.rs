//! TFE API client module
//!
//! This module provides the transport core (request building, retries,
//! JSON:API decoding) and one sub-module per resource family.

pub mod admin_settings;
mod client;
pub mod configuration_versions;
mod credentials;
pub mod helpers;
pub mod jsonapi;
pub mod org_memberships;
pub mod organizations;
pub mod policies;
pub mod projects;
mod retry;
pub mod runs;
pub mod state_versions;
pub mod teams;
pub mod traits;
pub mod validation;
pub mod variables;
pub mod workspaces;

use serde::Deserialize;

pub use client::{RemoteMeta, TfeClient};
pub use credentials::TokenResolver;
pub use jsonapi::{Nullable, Payload, Relation, ResourceIdentifier};
pub use retry::{RetryHook, RetryPolicy};
pub use traits::{ListResponse, TfeResource, Validate};
pub use validation::ListOptions;

/// Pagination details from `meta.pagination` (shared across resources)
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Pagination {
    /// Page the server actually returned, echoed even when out of range
    pub current_page: u32,
    #[serde(rename = "prev-page")]
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
    pub total_pages: u32,
    pub total_count: u32,
}
