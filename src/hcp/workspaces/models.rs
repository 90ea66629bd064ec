//! Workspace data models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::hcp::configuration_versions::ConfigurationVersion;
use crate::hcp::jsonapi::{Nullable, Payload, Relation};
use crate::hcp::organizations::Organization;
use crate::hcp::projects::Project;
use crate::hcp::runs::Run;
use crate::hcp::state_versions::StateVersion;
use crate::hcp::traits::{TfeResource, Validate};
use crate::hcp::validation::{comma_separated, valid_string, valid_string_id, ListOptions};

/// Workspace data from TFE API
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub allow_destroy_plan: bool,
    pub auto_apply: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub environment: Option<String>,
    pub execution_mode: Option<String>,
    pub file_triggers_enabled: bool,
    pub global_remote_state: bool,
    pub locked: bool,
    pub operations: bool,
    pub queue_all_runs: bool,
    pub resource_count: u32,
    pub source: Option<String>,
    pub speculative_enabled: bool,
    pub structured_run_output_enabled: bool,
    pub terraform_version: Option<String>,
    pub trigger_prefixes: Vec<String>,
    pub working_directory: Option<String>,
    pub tag_names: Vec<String>,
    pub vcs_repo: Option<VcsRepo>,
    pub permissions: Option<WorkspacePermissions>,

    pub organization: Option<Box<Organization>>,
    pub project: Option<Box<Project>>,
    pub current_run: Option<Box<Run>>,
    pub current_state_version: Option<Box<StateVersion>>,
    pub current_configuration_version: Option<Box<ConfigurationVersion>>,
}

impl TfeResource for Workspace {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Workspace {
    /// Get execution mode, defaulting to "unknown" if not available
    pub fn execution_mode(&self) -> &str {
        self.execution_mode.as_deref().unwrap_or("unknown")
    }

    /// Get project ID if available
    pub fn project_id(&self) -> Option<&str> {
        self.project.as_deref().map(|p| p.id.as_str())
    }

    /// Get organization name if available
    pub fn organization_name(&self) -> Option<&str> {
        self.organization.as_deref().map(|o| o.id.as_str())
    }
}

/// VCS repository settings of a workspace
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct VcsRepo {
    pub branch: Option<String>,
    pub identifier: Option<String>,
    pub ingress_submodules: bool,
    pub oauth_token_id: Option<String>,
    pub repository_http_url: Option<String>,
    pub service_provider: Option<String>,
    pub tags_regex: Option<String>,
}

/// What the current token may do with the workspace
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct WorkspacePermissions {
    pub can_destroy: bool,
    pub can_force_unlock: bool,
    pub can_lock: bool,
    pub can_queue_apply: bool,
    pub can_queue_destroy: bool,
    pub can_queue_run: bool,
    pub can_read_settings: bool,
    pub can_unlock: bool,
    pub can_update: bool,
    pub can_update_variable: bool,
}

/// Related resources that can be requested with `include`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceInclude {
    Organization,
    Project,
    CurrentConfigurationVersion,
    CurrentConfigurationVersionIngressAttributes,
    CurrentRun,
    CurrentRunPlan,
    CurrentRunConfigurationVersion,
    CurrentStateVersion,
    Outputs,
}

impl WorkspaceInclude {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Project => "project",
            Self::CurrentConfigurationVersion => "current_configuration_version",
            Self::CurrentConfigurationVersionIngressAttributes => {
                "current_configuration_version.ingress_attributes"
            }
            Self::CurrentRun => "current_run",
            Self::CurrentRunPlan => "current_run.plan",
            Self::CurrentRunConfigurationVersion => "current_run.configuration_version",
            Self::CurrentStateVersion => "current_state_version",
            Self::Outputs => "outputs",
        }
    }

    const ALL: [WorkspaceInclude; 9] = [
        Self::Organization,
        Self::Project,
        Self::CurrentConfigurationVersion,
        Self::CurrentConfigurationVersionIngressAttributes,
        Self::CurrentRun,
        Self::CurrentRunPlan,
        Self::CurrentRunConfigurationVersion,
        Self::CurrentStateVersion,
        Self::Outputs,
    ];
}

impl AsRef<str> for WorkspaceInclude {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for WorkspaceInclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkspaceInclude {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|inc| inc.as_str() == s)
            .ok_or(ValidationError::InvalidIncludeValue)
    }
}

/// Query options for listing workspaces
#[derive(Serialize, Debug, Clone, Default)]
pub struct WorkspaceListOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    /// Filter by workspace name (fuzzy server-side search)
    #[serde(rename = "search[name]", skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Comma-separated tag names the workspace must have
    #[serde(rename = "search[tags]", skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Comma-separated tag names the workspace must not have
    #[serde(rename = "search[exclude-tags]", skip_serializing_if = "Option::is_none")]
    pub exclude_tags: Option<String>,
    /// Name pattern with `*` wildcards
    #[serde(rename = "search[wildcard-name]", skip_serializing_if = "Option::is_none")]
    pub wildcard_name: Option<String>,
    /// Filter by project ID
    #[serde(rename = "filter[project][id]", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Filter by the status of the current run
    #[serde(
        rename = "filter[current-run][status]",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_run_status: Option<String>,
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<WorkspaceInclude>>,
}

impl Validate for WorkspaceListOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        self.list.validate()
    }
}

/// Query options for reading one workspace
#[derive(Serialize, Debug, Clone, Default)]
pub struct WorkspaceReadOptions {
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<WorkspaceInclude>>,
}

/// VCS settings sent when creating or updating a workspace
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct VcsRepoOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress_submodules: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_token_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags_regex: Option<String>,
}

/// Options for creating a workspace
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceCreateOptions {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_pool_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_destroy_plan: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_apply: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_triggers_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_remote_state: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_all_runs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speculative_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terraform_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_prefixes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_repo: Option<VcsRepoOptions>,
    /// Project to create the workspace in (defaults to the organization's default project)
    #[serde(skip)]
    pub project_id: Option<String>,
}

impl WorkspaceCreateOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Payload for WorkspaceCreateOptions {
    fn resource_type(&self) -> &'static str {
        "workspaces"
    }

    fn relationships(&self) -> Vec<(&'static str, Relation)> {
        self.project_id
            .iter()
            .map(|id| ("project", Relation::one("projects", id.clone())))
            .collect()
    }
}

impl Validate for WorkspaceCreateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if !valid_string(&self.name) {
            return Err(ValidationError::RequiredName);
        }
        if !valid_string_id(&self.name) {
            return Err(ValidationError::InvalidName);
        }
        if let Some(project_id) = &self.project_id {
            if !valid_string_id(project_id) {
                return Err(ValidationError::InvalidProjectId);
            }
        }
        Ok(())
    }
}

/// Options for updating a workspace; unset fields are left unchanged
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceUpdateOptions {
    /// New name (renames the workspace)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Nullable<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_pool_id: Option<Nullable<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_destroy_plan: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_apply: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_triggers_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_remote_state: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_all_runs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speculative_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terraform_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_prefixes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<Nullable<String>>,
    /// `Some(Nullable::Null)` disconnects the workspace from VCS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_repo: Option<Nullable<VcsRepoOptions>>,
    /// Move the workspace to another project
    #[serde(skip)]
    pub project_id: Option<String>,
}

impl Payload for WorkspaceUpdateOptions {
    fn resource_type(&self) -> &'static str {
        "workspaces"
    }

    fn relationships(&self) -> Vec<(&'static str, Relation)> {
        self.project_id
            .iter()
            .map(|id| ("project", Relation::one("projects", id.clone())))
            .collect()
    }
}

impl Validate for WorkspaceUpdateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            if !valid_string_id(name) {
                return Err(ValidationError::InvalidName);
            }
        }
        if let Some(project_id) = &self.project_id {
            if !valid_string_id(project_id) {
                return Err(ValidationError::InvalidProjectId);
            }
        }
        Ok(())
    }
}

/// Body of the lock action
#[derive(Serialize, Debug, Clone, Default)]
pub struct WorkspaceLockOptions {
    /// Shown to other users while the workspace is locked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
