//! Organizations module

mod api;
mod models;

pub use api::{Organizations, OrganizationsService};
pub use models::{
    AuthPolicy, Organization, OrganizationCreateOptions, OrganizationListOptions,
    OrganizationPermissions, OrganizationUpdateOptions,
};
