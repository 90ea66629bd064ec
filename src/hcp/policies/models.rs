//! Policy data models

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::hcp::jsonapi::{Nullable, Payload};
use crate::hcp::organizations::Organization;
use crate::hcp::traits::{TfeResource, Validate};
use crate::hcp::validation::{valid_string, valid_string_id, ListOptions};

/// Policy language
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Sentinel,
    Opa,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Sentinel => f.write_str("sentinel"),
            PolicyKind::Opa => f.write_str("opa"),
        }
    }
}

/// How a failing policy affects the run
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EnforcementLevel {
    Advisory,
    SoftMandatory,
    HardMandatory,
    /// OPA only
    Mandatory,
}

/// Legacy per-file enforcement entry
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Enforcement {
    pub path: String,
    pub mode: Option<EnforcementLevel>,
}

/// Policy data from TFE API
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub kind: PolicyKind,
    pub query: Option<String>,
    pub description: Option<String>,
    pub enforcement_level: Option<EnforcementLevel>,
    pub enforce: Vec<Enforcement>,
    pub policy_set_count: u32,
    pub updated_at: Option<DateTime<Utc>>,

    pub organization: Option<Box<Organization>>,
}

impl TfeResource for Policy {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Query options for listing policies
#[derive(Serialize, Debug, Clone, Default)]
pub struct PolicyListOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    #[serde(rename = "search[name]", skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(rename = "filter[kind]", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PolicyKind>,
}

impl Validate for PolicyListOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        self.list.validate()
    }
}

fn validate_enforce(enforce: &[Enforcement]) -> Result<(), ValidationError> {
    for entry in enforce {
        if !valid_string(&entry.path) {
            return Err(ValidationError::RequiredEnforcementPath);
        }
        if entry.mode.is_none() {
            return Err(ValidationError::RequiredEnforcementMode);
        }
    }
    Ok(())
}

/// Options for creating a policy
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyCreateOptions {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<PolicyKind>,
    /// OPA rule to evaluate, e.g. `data.terraform.main.deny`; required for OPA
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforcement_level: Option<EnforcementLevel>,
    /// Deprecated per-file form of `enforcement_level`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce: Option<Vec<Enforcement>>,
}

impl PolicyCreateOptions {
    pub fn new(name: impl Into<String>, level: EnforcementLevel) -> Self {
        Self {
            name: name.into(),
            enforcement_level: Some(level),
            ..Self::default()
        }
    }

    /// An OPA policy evaluating `query`
    pub fn opa(name: impl Into<String>, query: impl Into<String>, level: EnforcementLevel) -> Self {
        Self {
            kind: Some(PolicyKind::Opa),
            query: Some(query.into()),
            ..Self::new(name, level)
        }
    }
}

impl Payload for PolicyCreateOptions {
    fn resource_type(&self) -> &'static str {
        "policies"
    }
}

impl Validate for PolicyCreateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::RequiredName);
        }
        if !valid_string_id(&self.name) {
            return Err(ValidationError::InvalidName);
        }
        match &self.enforce {
            Some(enforce) => validate_enforce(enforce)?,
            None if self.enforcement_level.is_none() => {
                return Err(ValidationError::RequiredEnforce)
            }
            None => {}
        }
        if self.kind == Some(PolicyKind::Opa)
            && !self.query.as_deref().is_some_and(valid_string)
        {
            return Err(ValidationError::RequiredQuery);
        }
        Ok(())
    }
}

/// Options for updating a policy
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyUpdateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Nullable<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforcement_level: Option<EnforcementLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce: Option<Vec<Enforcement>>,
}

impl Payload for PolicyUpdateOptions {
    fn resource_type(&self) -> &'static str {
        "policies"
    }
}

impl Validate for PolicyUpdateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(enforce) = &self.enforce {
            validate_enforce(enforce)?;
        }
        if matches!(self.query.as_deref(), Some("")) {
            return Err(ValidationError::RequiredQuery);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hcp::jsonapi;

    #[test]
    fn test_create_validation() {
        assert_eq!(
            PolicyCreateOptions::default().validate(),
            Err(ValidationError::RequiredName)
        );
        let options = PolicyCreateOptions {
            name: "no-public-buckets".to_string(),
            ..Default::default()
        };
        assert_eq!(options.validate(), Err(ValidationError::RequiredEnforce));

        let options = PolicyCreateOptions {
            kind: Some(PolicyKind::Opa),
            ..PolicyCreateOptions::new("deny-all", EnforcementLevel::Mandatory)
        };
        assert_eq!(options.validate(), Err(ValidationError::RequiredQuery));

        let options =
            PolicyCreateOptions::opa("deny-all", "data.terraform.deny", EnforcementLevel::Mandatory);
        assert_eq!(options.validate(), Ok(()));
    }

    #[test]
    fn test_legacy_enforce_entries() {
        let options = PolicyCreateOptions {
            name: "legacy".to_string(),
            enforce: Some(vec![Enforcement {
                path: String::new(),
                mode: Some(EnforcementLevel::Advisory),
            }]),
            ..Default::default()
        };
        assert_eq!(
            options.validate(),
            Err(ValidationError::RequiredEnforcementPath)
        );

        let options = PolicyUpdateOptions {
            enforce: Some(vec![Enforcement {
                path: "legacy.sentinel".to_string(),
                mode: None,
            }]),
            ..Default::default()
        };
        assert_eq!(
            options.validate(),
            Err(ValidationError::RequiredEnforcementMode)
        );
    }

    #[test]
    fn test_create_payload() {
        let options =
            PolicyCreateOptions::opa("deny-all", "data.terraform.deny", EnforcementLevel::Mandatory);
        assert_eq!(
            jsonapi::encode(&options).unwrap(),
            serde_json::json!({
                "data": {
                    "type": "policies",
                    "attributes": {
                        "name": "deny-all",
                        "kind": "opa",
                        "query": "data.terraform.deny",
                        "enforcement-level": "mandatory"
                    }
                }
            })
        );
    }

    #[test]
    fn test_decode_policy() {
        let body = serde_json::json!({
            "data": {
                "id": "pol-1",
                "type": "policies",
                "attributes": {
                    "name": "cost-limit",
                    "kind": "sentinel",
                    "enforcement-level": "soft-mandatory",
                    "enforce": [{ "path": "cost-limit.sentinel", "mode": "soft-mandatory" }],
                    "policy-set-count": 2
                },
                "relationships": {
                    "organization": { "data": { "id": "acme", "type": "organizations" } }
                }
            }
        });
        let policy: Policy = jsonapi::decode_one(body.to_string().as_bytes(), &[]).unwrap();
        assert_eq!(policy.enforcement_level, Some(EnforcementLevel::SoftMandatory));
        assert_eq!(policy.enforce[0].path, "cost-limit.sentinel");
        assert_eq!(policy.policy_set_count, 2);
    }
}
