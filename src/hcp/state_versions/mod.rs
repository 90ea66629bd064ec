//! State version module

mod api;
mod models;

pub use api::{StateVersions, StateVersionsService};
pub use models::{
    StateVersion, StateVersionCreateOptions, StateVersionInclude, StateVersionListOptions,
    StateVersionOutput, StateVersionReadOptions, TerraformState,
};
