//! Workspace variable module

mod api;
mod models;

pub use api::{Variables, VariablesService};
pub use models::{
    CategoryType, Variable, VariableCreateOptions, VariableListOptions, VariableUpdateOptions,
};
