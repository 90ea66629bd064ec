//! Team data models

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::hcp::jsonapi::{Nullable, Payload};
use crate::hcp::org_memberships::{OrganizationMembership, User};
use crate::hcp::traits::{TfeResource, Validate};
use crate::hcp::validation::{comma_separated, valid_string, ListOptions};

/// Team data from TFE API
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub sso_team_id: Option<String>,
    pub users_count: u32,
    /// `secret` or `organization`
    pub visibility: Option<String>,
    pub allow_member_token_management: bool,
    pub is_unified: bool,
    pub permissions: Option<TeamPermissions>,
    pub organization_access: Option<OrganizationAccess>,

    pub users: Vec<User>,
    pub organization_memberships: Vec<OrganizationMembership>,
}

impl TfeResource for Team {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// What the current token may do with the team
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct TeamPermissions {
    pub can_update_membership: bool,
    pub can_destroy: bool,
    pub can_update_organization_access: bool,
    pub can_update_api_token: bool,
    pub can_update_visibility: bool,
}

/// Organization-level access granted to the team
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct OrganizationAccess {
    pub manage_policies: bool,
    pub manage_policy_overrides: bool,
    pub manage_run_tasks: bool,
    pub manage_workspaces: bool,
    pub manage_vcs_settings: bool,
    pub manage_agent_pools: bool,
    pub manage_projects: bool,
    pub read_projects: bool,
    pub read_workspaces: bool,
    pub manage_membership: bool,
    pub manage_teams: bool,
    pub manage_organization_access: bool,
}

/// Organization access to set; unset entries are left unchanged
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct OrganizationAccessOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_policies: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_policy_overrides: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_run_tasks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_workspaces: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_vcs_settings: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_agent_pools: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_projects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_projects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_workspaces: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_membership: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_teams: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_organization_access: Option<bool>,
}

/// Related resources that can be requested with `include`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamInclude {
    Users,
    OrganizationMemberships,
}

impl TeamInclude {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::OrganizationMemberships => "organization-memberships",
        }
    }
}

impl AsRef<str> for TeamInclude {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Query options for listing teams
#[derive(Serialize, Debug, Clone, Default)]
pub struct TeamListOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    #[serde(
        rename = "filter[names]",
        serialize_with = "comma_separated",
        skip_serializing_if = "Option::is_none"
    )]
    pub names: Option<Vec<String>>,
    /// Search by team name
    #[serde(rename = "q", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<TeamInclude>>,
}

impl Validate for TeamListOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        self.list.validate()
    }
}

/// Options for creating a team
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct TeamCreateOptions {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_member_token_management: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_access: Option<OrganizationAccessOptions>,
}

impl TeamCreateOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Payload for TeamCreateOptions {
    fn resource_type(&self) -> &'static str {
        "teams"
    }
}

impl Validate for TeamCreateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::RequiredName);
        }
        if !valid_string(&self.name) {
            return Err(ValidationError::InvalidName);
        }
        Ok(())
    }
}

/// Options for updating a team
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct TeamUpdateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `Some(Nullable::Null)` unlinks the SSO team
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_team_id: Option<Nullable<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_member_token_management: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_access: Option<OrganizationAccessOptions>,
}

impl Payload for TeamUpdateOptions {
    fn resource_type(&self) -> &'static str {
        "teams"
    }
}

impl Validate for TeamUpdateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) if !valid_string(name) => Err(ValidationError::InvalidName),
            _ => Ok(()),
        }
    }
}
