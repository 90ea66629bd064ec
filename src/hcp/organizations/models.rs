//! Organization data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::hcp::jsonapi::Payload;
use crate::hcp::traits::{TfeResource, Validate};
use crate::hcp::validation::{valid_email, valid_string, valid_string_id, ListOptions};

/// Organization data from TFE API
///
/// HCP API uses the organization name as the `id`; `external-id` carries
/// the `org-...` identifier.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub email: String,
    pub external_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub collaborator_auth_policy: Option<AuthPolicy>,
    pub cost_estimation_enabled: bool,
    pub assessments_enforced: bool,
    pub default_execution_mode: Option<String>,
    pub session_timeout: Option<u32>,
    pub session_remember: Option<u32>,
    pub two_factor_conformant: bool,
    pub saml_enabled: bool,
    pub plan_expired: bool,
    pub permissions: Option<OrganizationPermissions>,
}

impl TfeResource for Organization {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, input: &str) -> bool {
        self.id == input || self.name == input || self.external_id == input
    }
}

/// Authentication policy for organization collaborators
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthPolicy {
    Password,
    TwoFactorMandatory,
}

/// What the current token may do with the organization
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct OrganizationPermissions {
    pub can_create_team: bool,
    pub can_create_workspace: bool,
    pub can_create_project: bool,
    pub can_destroy: bool,
    pub can_manage_users: bool,
    pub can_update: bool,
}

/// Query options for listing organizations
#[derive(Serialize, Debug, Clone, Default)]
pub struct OrganizationListOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    /// Search by name or notification email (fuzzy)
    #[serde(rename = "q", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl Validate for OrganizationListOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        self.list.validate()
    }
}

/// Options for creating an organization
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct OrganizationCreateOptions {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_remember: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaborator_auth_policy: Option<AuthPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_estimation_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessments_enforced: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_execution_mode: Option<String>,
}

impl OrganizationCreateOptions {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }
}

impl Payload for OrganizationCreateOptions {
    fn resource_type(&self) -> &'static str {
        "organizations"
    }
}

impl Validate for OrganizationCreateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if !valid_string(&self.name) {
            return Err(ValidationError::RequiredName);
        }
        if !valid_string_id(&self.name) {
            return Err(ValidationError::InvalidName);
        }
        if !valid_string(&self.email) {
            return Err(ValidationError::RequiredEmail);
        }
        if !valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

/// Options for updating an organization; unset fields are left unchanged
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct OrganizationUpdateOptions {
    /// New name (renames the organization)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_remember: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaborator_auth_policy: Option<AuthPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_estimation_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessments_enforced: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_execution_mode: Option<String>,
}

impl Payload for OrganizationUpdateOptions {
    fn resource_type(&self) -> &'static str {
        "organizations"
    }
}

impl Validate for OrganizationUpdateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            if !valid_string_id(name) {
                return Err(ValidationError::InvalidName);
            }
        }
        if let Some(email) = &self.email {
            if !valid_email(email) {
                return Err(ValidationError::InvalidEmail);
            }
        }
        Ok(())
    }
}
