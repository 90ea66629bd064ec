//! Configuration version module

mod api;
mod models;

pub use api::{ConfigurationVersions, ConfigurationVersionsService};
pub use models::{
    ConfigurationVersion, ConfigurationVersionCreateOptions, ConfigurationVersionInclude,
    ConfigurationVersionLinks, ConfigurationVersionListOptions,
};
