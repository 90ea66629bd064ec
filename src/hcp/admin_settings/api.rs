//! Admin SMTP settings API operations

use std::future::Future;

use log::debug;
use reqwest::Method;

use crate::config::api;
use crate::error::Result;
use crate::hcp::traits::Validate;
use crate::hcp::TfeClient;

use super::models::{AdminSmtpSetting, AdminSmtpSettingUpdateOptions};

/// Admin SMTP settings operations; need a site-admin token
pub trait AdminSmtpSettings {
    /// Read the SMTP settings
    fn read(&self) -> impl Future<Output = Result<AdminSmtpSetting>> + Send;

    /// Update the SMTP settings
    fn update(
        &self,
        options: &AdminSmtpSettingUpdateOptions,
    ) -> impl Future<Output = Result<AdminSmtpSetting>> + Send;
}

/// [`AdminSmtpSettings`] backed by a [`TfeClient`]
#[derive(Debug, Clone, Copy)]
pub struct AdminSmtpSettingsService<'a> {
    client: &'a TfeClient,
}

impl TfeClient {
    /// Admin SMTP settings operations
    pub fn admin_smtp_settings(&self) -> AdminSmtpSettingsService<'_> {
        AdminSmtpSettingsService { client: self }
    }
}

fn smtp_path() -> String {
    format!("{}/smtp", api::ADMIN_SETTINGS)
}

impl AdminSmtpSettings for AdminSmtpSettingsService<'_> {
    async fn read(&self) -> Result<AdminSmtpSetting> {
        debug!("Fetching admin SMTP settings");

        let builder = self.client.request(Method::GET, &smtp_path())?;
        self.client.read(builder, &[]).await
    }

    async fn update(&self, options: &AdminSmtpSettingUpdateOptions) -> Result<AdminSmtpSetting> {
        options.validate()?;
        debug!("Updating admin SMTP settings");

        let builder = self
            .client
            .payload_request(Method::PATCH, &smtp_path(), options)?;
        self.client.read(builder, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TfeError, ValidationError};
    use crate::hcp::admin_settings::SmtpAuthType;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn smtp_json(auth: &str) -> serde_json::Value {
        serde_json::json!({
            "data": {
                "id": "smtp",
                "type": "smtp-settings",
                "attributes": {
                    "enabled": true,
                    "host": "smtp.example.com",
                    "port": 587,
                    "sender": "tfe@example.com",
                    "auth": auth,
                    "username": "mailer"
                }
            }
        })
    }

    #[tokio::test]
    async fn test_read_smtp_settings() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/api/v2/admin/settings/smtp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(smtp_json("login")))
            .mount(&mock_server)
            .await;

        let settings = client.admin_smtp_settings().read().await.unwrap();
        assert_eq!(settings.port, 587);
        assert_eq!(settings.auth, SmtpAuthType::Login);
    }

    #[tokio::test]
    async fn test_update_smtp_settings() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("PATCH"))
            .and(path("/api/v2/admin/settings/smtp"))
            .and(body_json(serde_json::json!({
                "data": {
                    "type": "smtp-settings",
                    "attributes": { "auth": "plain", "username": "mailer", "password": "pw" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(smtp_json("plain")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let options = AdminSmtpSettingUpdateOptions {
            auth: Some(SmtpAuthType::Plain),
            username: Some("mailer".to_string()),
            password: Some("pw".to_string()),
            ..Default::default()
        };
        let settings = client.admin_smtp_settings().update(&options).await.unwrap();
        assert_eq!(settings.auth, SmtpAuthType::Plain);
    }

    #[tokio::test]
    async fn test_update_invalid_combination_makes_no_request() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        let options = AdminSmtpSettingUpdateOptions {
            auth: Some(SmtpAuthType::Login),
            ..Default::default()
        };
        let err = client
            .admin_smtp_settings()
            .update(&options)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TfeError::Validation(ValidationError::InvalidSmtpConfiguration)
        ));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }
}
