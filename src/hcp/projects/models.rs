//! Project data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::hcp::jsonapi::{Nullable, Payload};
use crate::hcp::organizations::Organization;
use crate::hcp::traits::{TfeResource, Validate};
use crate::hcp::validation::{valid_string, ListOptions};

/// Project data from TFE API
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_unified: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub auto_destroy_activity_duration: Option<String>,
    pub organization: Option<Box<Organization>>,
}

impl TfeResource for Project {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Query options for listing projects
#[derive(Serialize, Debug, Clone, Default)]
pub struct ProjectListOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    /// Exact name filter
    #[serde(rename = "filter[names]", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Case-insensitive search on the name
    #[serde(rename = "q", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl Validate for ProjectListOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        self.list.validate()
    }
}

/// Options for creating a project
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectCreateOptions {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Inactivity period after which workspaces are destroyed, e.g. `"14d"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_destroy_activity_duration: Option<Nullable<String>>,
}

impl ProjectCreateOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Payload for ProjectCreateOptions {
    fn resource_type(&self) -> &'static str {
        "projects"
    }
}

impl Validate for ProjectCreateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if !valid_string(&self.name) {
            return Err(ValidationError::RequiredName);
        }
        Ok(())
    }
}

/// Options for updating a project; `Some(Nullable::Null)` clears a field
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectUpdateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Nullable<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_destroy_activity_duration: Option<Nullable<String>>,
}

impl Payload for ProjectUpdateOptions {
    fn resource_type(&self) -> &'static str {
        "projects"
    }
}

impl Validate for ProjectUpdateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) if !valid_string(name) => Err(ValidationError::InvalidName),
            _ => Ok(()),
        }
    }
}
