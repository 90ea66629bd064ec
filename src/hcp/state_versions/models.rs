//! State version data models

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::{TfeError, ValidationError};
use crate::hcp::jsonapi::{Payload, Relation};
use crate::hcp::runs::Run;
use crate::hcp::traits::{TfeResource, Validate};
use crate::hcp::validation::{comma_separated, valid_string, valid_string_id, ListOptions};

/// State version data from TFE API
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct StateVersion {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub serial: u64,
    /// `pending`, `finalized` or `discarded`
    pub status: Option<String>,
    pub size: Option<u64>,
    pub terraform_version: Option<String>,
    pub state_version: Option<u32>,
    pub resources_processed: bool,
    pub hosted_state_download_url: Option<String>,
    pub hosted_json_state_download_url: Option<String>,
    pub vcs_commit_sha: Option<String>,
    pub vcs_commit_url: Option<String>,

    pub run: Option<Box<Run>>,
    pub outputs: Vec<StateVersionOutput>,
}

impl TfeResource for StateVersion {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }
}

/// Root module output recorded in a state version
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StateVersionOutput {
    pub id: String,
    pub name: String,
    pub sensitive: bool,
    #[serde(rename = "type")]
    pub output_type: Option<String>,
    /// `null` when sensitive
    pub value: serde_json::Value,
}

/// The parts of a Terraform state file this client reads
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TerraformState {
    pub version: u32,
    #[serde(default)]
    pub terraform_version: String,
    pub serial: u64,
    #[serde(default)]
    pub lineage: String,
    #[serde(default)]
    pub outputs: serde_json::Value,
    #[serde(default)]
    pub resources: Vec<serde_json::Value>,
}

/// Related resources that can be requested with `include`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVersionInclude {
    CreatedBy,
    Run,
    RunCreatedBy,
    RunConfigurationVersion,
    Outputs,
}

impl StateVersionInclude {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedBy => "created_by",
            Self::Run => "run",
            Self::RunCreatedBy => "run.created_by",
            Self::RunConfigurationVersion => "run.configuration_version",
            Self::Outputs => "outputs",
        }
    }
}

impl AsRef<str> for StateVersionInclude {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Query options for listing state versions
///
/// Both filters are mandatory for this endpoint.
#[derive(Serialize, Debug, Clone, Default)]
pub struct StateVersionListOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    #[serde(rename = "filter[organization][name]")]
    pub organization: String,
    #[serde(rename = "filter[workspace][name]")]
    pub workspace: String,
}

impl StateVersionListOptions {
    pub fn new(organization: impl Into<String>, workspace: impl Into<String>) -> Self {
        Self {
            list: ListOptions::default(),
            organization: organization.into(),
            workspace: workspace.into(),
        }
    }
}

impl Validate for StateVersionListOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        self.list.validate()?;
        if !valid_string_id(&self.organization) {
            return Err(ValidationError::InvalidOrg);
        }
        if !valid_string(&self.workspace) {
            return Err(ValidationError::RequiredWorkspace);
        }
        Ok(())
    }
}

/// Query options for reading one state version
#[derive(Serialize, Debug, Clone, Default)]
pub struct StateVersionReadOptions {
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<StateVersionInclude>>,
}

/// Options for creating a state version
///
/// The workspace must be locked by the caller.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct StateVersionCreateOptions {
    pub serial: u64,
    /// Hex MD5 of the raw state
    pub md5: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineage: Option<String>,
    /// Base64 of the raw state
    pub state: String,
    /// Replace the current state even if lineage or serial disagree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
    /// Base64 of `terraform show -json` output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_state_outputs: Option<String>,
    /// Run that produced this state
    #[serde(skip)]
    pub run_id: Option<String>,
}

impl StateVersionCreateOptions {
    /// Build options from a raw state file, taking serial and lineage from it
    pub fn from_state(raw: &[u8]) -> crate::error::Result<Self> {
        let parsed: TerraformState = serde_json::from_slice(raw)
            .map_err(|e| TfeError::Encode(format!("state is not a valid state file: {}", e)))?;

        let mut hasher = Md5::new();
        hasher.update(raw);
        let md5_hash = format!("{:x}", hasher.finalize());

        Ok(Self {
            serial: parsed.serial,
            md5: md5_hash,
            lineage: Some(parsed.lineage).filter(|l| !l.is_empty()),
            state: BASE64.encode(raw),
            ..Self::default()
        })
    }
}

impl Payload for StateVersionCreateOptions {
    fn resource_type(&self) -> &'static str {
        "state-versions"
    }

    fn relationships(&self) -> Vec<(&'static str, Relation)> {
        match &self.run_id {
            Some(run_id) => vec![("run", Relation::one("runs", run_id.clone()))],
            None => Vec::new(),
        }
    }
}

impl Validate for StateVersionCreateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if !valid_string(&self.md5) {
            return Err(ValidationError::RequiredMd5);
        }
        if let Some(run_id) = &self.run_id {
            if !valid_string_id(run_id) {
                return Err(ValidationError::InvalidRunId);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hcp::jsonapi;

    const STATE: &str = r#"{"version":4,"terraform_version":"1.9.0","serial":7,"lineage":"abc-123","outputs":{},"resources":[]}"#;

    #[test]
    fn test_from_state_computes_digest_and_encoding() {
        let options = StateVersionCreateOptions::from_state(STATE.as_bytes()).unwrap();
        assert_eq!(options.serial, 7);
        assert_eq!(options.lineage.as_deref(), Some("abc-123"));
        assert_eq!(options.md5.len(), 32);
        assert!(options.md5.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(BASE64.decode(&options.state).unwrap(), STATE.as_bytes());
        assert_eq!(options.validate(), Ok(()));
    }

    #[test]
    fn test_from_state_md5_of_empty_object() {
        let raw = br#"{"version":4,"serial":1}"#;
        let options = StateVersionCreateOptions::from_state(raw).unwrap();
        let mut hasher = Md5::new();
        hasher.update(raw);
        assert_eq!(options.md5, format!("{:x}", hasher.finalize()));
        assert_eq!(options.lineage, None);
    }

    #[test]
    fn test_from_state_rejects_garbage() {
        let err = StateVersionCreateOptions::from_state(b"not json").unwrap_err();
        assert!(matches!(err, TfeError::Encode(_)));
    }

    #[test]
    fn test_create_requires_md5() {
        assert_eq!(
            StateVersionCreateOptions::default().validate(),
            Err(ValidationError::RequiredMd5)
        );
    }

    #[test]
    fn test_list_options_require_both_filters() {
        assert_eq!(
            StateVersionListOptions::new("", "prod").validate(),
            Err(ValidationError::InvalidOrg)
        );
        assert_eq!(
            StateVersionListOptions::new("acme", "").validate(),
            Err(ValidationError::RequiredWorkspace)
        );
        let value = serde_json::to_value(StateVersionListOptions::new("acme", "prod")).unwrap();
        assert_eq!(value["filter[organization][name]"], "acme");
        assert_eq!(value["filter[workspace][name]"], "prod");
    }

    #[test]
    fn test_decode_with_outputs() {
        let body = serde_json::json!({
            "data": {
                "id": "sv-1",
                "type": "state-versions",
                "attributes": {
                    "serial": 3,
                    "status": "finalized",
                    "hosted-state-download-url": "https://archivist.example.com/sv-1"
                },
                "relationships": {
                    "outputs": { "data": [{ "id": "wsout-1", "type": "state-version-outputs" }] }
                }
            },
            "included": [{
                "id": "wsout-1",
                "type": "state-version-outputs",
                "attributes": { "name": "vpc_id", "sensitive": false, "type": "string", "value": "vpc-9" }
            }]
        });
        let sv: StateVersion = jsonapi::decode_one(body.to_string().as_bytes(), &[]).unwrap();
        assert_eq!(sv.serial, 3);
        assert_eq!(sv.outputs[0].name, "vpc_id");
        assert_eq!(sv.outputs[0].output_type.as_deref(), Some("string"));
        assert_eq!(sv.outputs[0].value, "vpc-9");
    }

    #[test]
    fn test_create_payload_with_run() {
        let options = StateVersionCreateOptions {
            run_id: Some("run-1".to_string()),
            ..StateVersionCreateOptions::from_state(STATE.as_bytes()).unwrap()
        };
        let doc = jsonapi::encode(&options).unwrap();
        assert_eq!(doc["data"]["type"], "state-versions");
        assert_eq!(doc["data"]["attributes"]["serial"], 7);
        assert_eq!(doc["data"]["relationships"]["run"]["data"]["id"], "run-1");
        assert!(doc["data"]["attributes"].get("force").is_none());
    }
}
