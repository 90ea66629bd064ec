//! Organization membership data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::hcp::jsonapi::{Payload, Relation};
use crate::hcp::organizations::Organization;
use crate::hcp::teams::Team;
use crate::hcp::traits::{TfeResource, Validate};
use crate::hcp::validation::{comma_separated, valid_email, valid_string_id, ListOptions};

/// Organization membership data from TFE API
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct OrganizationMembership {
    pub id: String,
    pub email: String,
    /// `invited` or `active`
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,

    pub organization: Option<Box<Organization>>,
    pub user: Option<Box<User>>,
    pub teams: Vec<Team>,
}

impl TfeResource for OrganizationMembership {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.email
    }
}

impl OrganizationMembership {
    /// True until the invitation is accepted
    pub fn is_invited(&self) -> bool {
        self.status == "invited"
    }
}

/// User account referenced by memberships and teams
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub is_service_account: bool,
    pub two_factor: Option<TwoFactor>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TwoFactor {
    pub enabled: bool,
    pub verified: bool,
}

/// Related resources that can be requested with `include`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrganizationMembershipInclude {
    User,
    Teams,
}

impl OrganizationMembershipInclude {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Teams => "teams",
        }
    }
}

impl AsRef<str> for OrganizationMembershipInclude {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Query options for listing memberships
#[derive(Serialize, Debug, Clone, Default)]
pub struct OrganizationMembershipListOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    /// Exact email addresses to match
    #[serde(
        rename = "filter[email]",
        serialize_with = "comma_separated",
        skip_serializing_if = "Option::is_none"
    )]
    pub emails: Option<Vec<String>>,
    /// `invited` or `active`
    #[serde(rename = "filter[status]", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Search by username or email
    #[serde(rename = "q", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<OrganizationMembershipInclude>>,
}

impl Validate for OrganizationMembershipListOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        self.list.validate()?;
        if let Some(emails) = &self.emails {
            if emails.iter().any(|e| !valid_email(e)) {
                return Err(ValidationError::InvalidEmail);
            }
        }
        Ok(())
    }
}

/// Query options for reading one membership
#[derive(Serialize, Debug, Clone, Default)]
pub struct OrganizationMembershipReadOptions {
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<OrganizationMembershipInclude>>,
}

/// Options for inviting a user to an organization
#[derive(Serialize, Debug, Clone, Default)]
pub struct OrganizationMembershipCreateOptions {
    pub email: String,
    /// Teams the invited user joins on acceptance
    #[serde(skip)]
    pub team_ids: Vec<String>,
}

impl OrganizationMembershipCreateOptions {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            team_ids: Vec::new(),
        }
    }
}

impl Payload for OrganizationMembershipCreateOptions {
    fn resource_type(&self) -> &'static str {
        "organization-memberships"
    }

    fn relationships(&self) -> Vec<(&'static str, Relation)> {
        if self.team_ids.is_empty() {
            return Vec::new();
        }
        vec![("teams", Relation::many("teams", self.team_ids.iter()))]
    }
}

impl Validate for OrganizationMembershipCreateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.email.is_empty() {
            return Err(ValidationError::RequiredEmail);
        }
        if !valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.team_ids.iter().any(|id| !valid_string_id(id)) {
            return Err(ValidationError::InvalidTeamId);
        }
        Ok(())
    }
}
