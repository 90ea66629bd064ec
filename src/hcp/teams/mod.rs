//! Team module

mod api;
mod models;

pub use api::{Teams, TeamsService};
pub use models::{
    OrganizationAccess, OrganizationAccessOptions, Team, TeamCreateOptions, TeamInclude,
    TeamListOptions, TeamPermissions, TeamUpdateOptions,
};
