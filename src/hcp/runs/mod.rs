//! Run module

mod api;
mod models;

pub use api::{Runs, RunsService};
pub use models::{
    Apply, Plan, Run, RunActionOptions, RunActions, RunCreateOptions, RunInclude, RunListOptions,
    RunPermissions, RunReadOptions, RunStatus, RunVariable,
};
