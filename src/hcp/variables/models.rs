//! Workspace variable data models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::hcp::jsonapi::{Nullable, Payload};
use crate::hcp::traits::{TfeResource, Validate};
use crate::hcp::validation::{valid_string, ListOptions};
use crate::hcp::workspaces::Workspace;

/// Where a variable is exposed during a run
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    /// Terraform input variable
    #[default]
    Terraform,
    /// Shell environment variable
    Env,
    /// Policy set parameter
    Policy,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Terraform => "terraform",
            CategoryType::Env => "env",
            CategoryType::Policy => "policy",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terraform" => Ok(CategoryType::Terraform),
            "env" => Ok(CategoryType::Env),
            "policy" => Ok(CategoryType::Policy),
            _ => Err(format!("Unknown variable category: {}", s)),
        }
    }
}

/// Workspace variable from TFE API
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Variable {
    pub id: String,
    pub key: String,
    /// `None` for sensitive variables
    pub value: Option<String>,
    pub description: Option<String>,
    pub category: CategoryType,
    pub hcl: bool,
    pub sensitive: bool,
    pub version_id: Option<String>,

    #[serde(alias = "configurable")]
    pub workspace: Option<Box<Workspace>>,
}

impl TfeResource for Variable {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.key
    }
}

/// Query options for listing variables
#[derive(Serialize, Debug, Clone, Default)]
pub struct VariableListOptions {
    #[serde(flatten)]
    pub list: ListOptions,
}

impl Validate for VariableListOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        self.list.validate()
    }
}

/// Options for creating a workspace variable
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct VariableCreateOptions {
    pub key: String,
    /// Required; `None` is rejected before sending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hcl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitive: Option<bool>,
}

impl VariableCreateOptions {
    pub fn new(key: impl Into<String>, category: CategoryType) -> Self {
        Self {
            key: key.into(),
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl Payload for VariableCreateOptions {
    fn resource_type(&self) -> &'static str {
        "vars"
    }
}

impl Validate for VariableCreateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if !valid_string(&self.key) {
            return Err(ValidationError::RequiredKey);
        }
        if self.category.is_none() {
            return Err(ValidationError::RequiredCategory);
        }
        Ok(())
    }
}

/// Options for updating a workspace variable
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct VariableUpdateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Nullable<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hcl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitive: Option<bool>,
}

impl Payload for VariableUpdateOptions {
    fn resource_type(&self) -> &'static str {
        "vars"
    }
}

impl Validate for VariableUpdateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        match &self.key {
            Some(key) if !valid_string(key) => Err(ValidationError::InvalidKey),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hcp::jsonapi;

    #[test]
    fn test_create_validation() {
        assert_eq!(
            VariableCreateOptions::default().validate(),
            Err(ValidationError::RequiredKey)
        );
        let options = VariableCreateOptions {
            key: "region".to_string(),
            ..Default::default()
        };
        assert_eq!(options.validate(), Err(ValidationError::RequiredCategory));
        assert_eq!(
            VariableCreateOptions::new("region", CategoryType::Terraform).validate(),
            Ok(())
        );
    }

    #[test]
    fn test_update_empty_key_is_invalid() {
        let options = VariableUpdateOptions {
            key: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(options.validate(), Err(ValidationError::InvalidKey));
    }

    #[test]
    fn test_create_payload() {
        let options = VariableCreateOptions {
            sensitive: Some(true),
            ..VariableCreateOptions::new("AWS_SECRET", CategoryType::Env).value("s3cr3t")
        };
        assert_eq!(
            jsonapi::encode(&options).unwrap(),
            serde_json::json!({
                "data": {
                    "type": "vars",
                    "attributes": {
                        "key": "AWS_SECRET",
                        "category": "env",
                        "value": "s3cr3t",
                        "sensitive": true
                    }
                }
            })
        );
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("ENV".parse::<CategoryType>(), Ok(CategoryType::Env));
        assert!("shell".parse::<CategoryType>().is_err());
    }

    #[test]
    fn test_decode_sensitive_variable() {
        let body = serde_json::json!({
            "data": {
                "id": "var-1",
                "type": "vars",
                "attributes": {
                    "key": "token",
                    "value": null,
                    "category": "terraform",
                    "sensitive": true
                },
                "relationships": {
                    "configurable": { "data": { "id": "ws-1", "type": "workspaces" } }
                }
            }
        });
        let var: Variable = jsonapi::decode_one(body.to_string().as_bytes(), &[]).unwrap();
        assert!(var.sensitive);
        assert_eq!(var.value, None);
        assert_eq!(var.workspace.unwrap().id, "ws-1");
    }
}
