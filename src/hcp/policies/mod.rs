//! Policy module

mod api;
mod models;

pub use api::{Policies, PoliciesService};
pub use models::{
    Enforcement, EnforcementLevel, Policy, PolicyCreateOptions, PolicyKind, PolicyListOptions,
    PolicyUpdateOptions,
};
