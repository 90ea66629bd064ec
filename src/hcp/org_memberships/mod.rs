//! Organization membership module

mod api;
mod models;

pub use api::{OrganizationMemberships, OrganizationMembershipsService};
pub use models::{
    OrganizationMembership, OrganizationMembershipCreateOptions, OrganizationMembershipInclude,
    OrganizationMembershipListOptions, OrganizationMembershipReadOptions, TwoFactor, User,
};
