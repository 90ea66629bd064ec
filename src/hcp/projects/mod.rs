//! Project module

mod api;
mod models;

pub use api::{Projects, ProjectsService};
pub use models::{Project, ProjectCreateOptions, ProjectListOptions, ProjectUpdateOptions};
