//! Configuration version data models

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::hcp::jsonapi::Payload;
use crate::hcp::traits::{TfeResource, Validate};
use crate::hcp::validation::{comma_separated, ListOptions};

/// Configuration version data from TFE API
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConfigurationVersion {
    pub id: String,
    /// Source of the configuration (e.g., "tfe-api", "gitlab", "github")
    pub source: Option<String>,
    /// Status: pending, fetching, uploaded, archived, errored
    pub status: String,
    pub auto_queue_runs: bool,
    pub speculative: bool,
    pub provisional: bool,
    pub error: Option<String>,
    /// Error message if status is "errored"
    pub error_message: Option<String>,
    /// Pre-signed archive upload target, only present right after create
    pub upload_url: Option<String>,
    pub links: Option<ConfigurationVersionLinks>,
}

/// Configuration version links
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigurationVersionLinks {
    #[serde(rename = "self")]
    pub self_link: Option<String>,
    /// Download link for configuration files
    pub download: Option<String>,
}

impl TfeResource for ConfigurationVersion {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        // Configuration versions don't have names, use ID
        &self.id
    }
}

impl ConfigurationVersion {
    /// Check if configuration version is downloadable
    pub fn is_downloadable(&self) -> bool {
        self.status == "uploaded"
    }

    /// Get download path if available
    pub fn download_path(&self) -> Option<&str> {
        self.links.as_ref().and_then(|l| l.download.as_deref())
    }
}

/// Related resources that can be requested with `include`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigurationVersionInclude {
    IngressAttributes,
    Run,
}

impl ConfigurationVersionInclude {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IngressAttributes => "ingress_attributes",
            Self::Run => "run",
        }
    }
}

impl AsRef<str> for ConfigurationVersionInclude {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Query options for listing configuration versions
#[derive(Serialize, Debug, Clone, Default)]
pub struct ConfigurationVersionListOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    #[serde(
        serialize_with = "comma_separated",
        skip_serializing_if = "Option::is_none"
    )]
    pub include: Option<Vec<ConfigurationVersionInclude>>,
}

impl Validate for ConfigurationVersionListOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        self.list.validate()
    }
}

/// Options for creating a configuration version
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigurationVersionCreateOptions {
    /// Queue a run as soon as the upload finishes (server default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_queue_runs: Option<bool>,
    /// Plan-only configuration that can never be applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speculative: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisional: Option<bool>,
}

impl Payload for ConfigurationVersionCreateOptions {
    fn resource_type(&self) -> &'static str {
        "configuration-versions"
    }
}
