//! tfe-client - a client for the HCP Terraform / Terraform Enterprise API
//!
//! Every resource family (organizations, projects, workspaces, runs, ...)
//! is a capability trait implemented by a small service borrowed from one
//! shared [`TfeClient`]. The client owns the plumbing all of them use:
//!
//! - option validation before anything is sent
//! - JSON:API request bodies and `include` resolution on the way back
//! - retries for rate limiting (429/425) and, when enabled, server errors
//! - a single error type whose sentinels can be compared directly
//!
//! # Example
//!
//! ```rust,no_run
//! use tfe_client::prelude::*;
//! use tfe_client::{ClientConfig, TfeClient, ValidationError};
//!
//! # async fn example() -> tfe_client::Result<()> {
//! let client = TfeClient::new(
//!     ClientConfig::new("https://app.terraform.io", "my-token").retry_server_errors(true),
//! )?;
//!
//! let options = WorkspaceListOptions {
//!     search: Some("prod".to_string()),
//!     ..Default::default()
//! };
//! let page = client.workspaces().list("my-org", Some(&options)).await?;
//! for ws in &page.items {
//!     println!("{} locked={}", ws.name, ws.locked);
//! }
//!
//! match client.workspaces().read("", "prod").await {
//!     Err(err) if err == ValidationError::InvalidOrg => {}
//!     other => panic!("unexpected: {:?}", other),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod hcp;

pub use config::ClientConfig;
pub use error::{Rejection, Result, TfeError, ValidationError};
pub use hcp::helpers::fetch_all_pages;
pub use hcp::{
    ListOptions, ListResponse, Nullable, Pagination, RemoteMeta, RetryHook, RetryPolicy,
    TfeClient, TfeResource, TokenResolver, Validate,
};

/// Capability traits and the option types most calls need
pub mod prelude {
    pub use crate::hcp::admin_settings::{AdminSmtpSettingUpdateOptions, AdminSmtpSettings};
    pub use crate::hcp::configuration_versions::{
        ConfigurationVersionCreateOptions, ConfigurationVersionListOptions, ConfigurationVersions,
    };
    pub use crate::hcp::org_memberships::{
        OrganizationMembershipCreateOptions, OrganizationMembershipListOptions,
        OrganizationMemberships,
    };
    pub use crate::hcp::organizations::{
        OrganizationCreateOptions, OrganizationListOptions, OrganizationUpdateOptions,
        Organizations,
    };
    pub use crate::hcp::policies::{
        Policies, PolicyCreateOptions, PolicyListOptions, PolicyUpdateOptions,
    };
    pub use crate::hcp::projects::{
        ProjectCreateOptions, ProjectListOptions, ProjectUpdateOptions, Projects,
    };
    pub use crate::hcp::runs::{RunActionOptions, RunCreateOptions, RunListOptions, Runs};
    pub use crate::hcp::state_versions::{
        StateVersionCreateOptions, StateVersionListOptions, StateVersions,
    };
    pub use crate::hcp::teams::{TeamCreateOptions, TeamListOptions, TeamUpdateOptions, Teams};
    pub use crate::hcp::variables::{
        CategoryType, VariableCreateOptions, VariableUpdateOptions, Variables,
    };
    pub use crate::hcp::workspaces::{
        WorkspaceCreateOptions, WorkspaceListOptions, WorkspaceLockOptions, WorkspaceUpdateOptions,
        Workspaces,
    };
    pub use crate::hcp::{ListOptions, Nullable};
}
