//! Admin SMTP settings data models (Terraform Enterprise only)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::hcp::jsonapi::Payload;
use crate::hcp::traits::Validate;
use crate::hcp::validation::valid_string;

/// SMTP authentication mechanism
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmtpAuthType {
    #[default]
    None,
    Plain,
    Login,
}

impl SmtpAuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmtpAuthType::None => "none",
            SmtpAuthType::Plain => "plain",
            SmtpAuthType::Login => "login",
        }
    }

    /// Whether the mechanism sends credentials
    pub fn needs_credentials(&self) -> bool {
        matches!(self, SmtpAuthType::Plain | SmtpAuthType::Login)
    }
}

impl fmt::Display for SmtpAuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SmtpAuthType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SmtpAuthType::None),
            "plain" => Ok(SmtpAuthType::Plain),
            "login" => Ok(SmtpAuthType::Login),
            _ => Err(ValidationError::InvalidSmtpAuth),
        }
    }
}

/// SMTP settings of a Terraform Enterprise installation
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct AdminSmtpSetting {
    pub id: String,
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub sender: String,
    pub auth: SmtpAuthType,
    pub username: Option<String>,
}

/// Options for updating SMTP settings
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct AdminSmtpSettingUpdateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<SmtpAuthType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Address the server sends a test message to before saving
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_email_address: Option<String>,
}

impl Payload for AdminSmtpSettingUpdateOptions {
    fn resource_type(&self) -> &'static str {
        "smtp-settings"
    }
}

impl Validate for AdminSmtpSettingUpdateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        let needs_username = self.auth.is_some_and(|auth| auth.needs_credentials());
        if needs_username && !self.username.as_deref().is_some_and(valid_string) {
            return Err(ValidationError::InvalidSmtpConfiguration);
        }
        Ok(())
    }
}
