//! Organization API operations

use std::future::Future;

use log::debug;
use reqwest::Method;

use crate::config::api;
use crate::error::{Result, ValidationError};
use crate::hcp::traits::{ListResponse, Validate};
use crate::hcp::validation::require_id;
use crate::hcp::TfeClient;

use super::models::{
    Organization, OrganizationCreateOptions, OrganizationListOptions, OrganizationUpdateOptions,
};

/// Organization operations
pub trait Organizations {
    /// List organizations the token can access
    fn list(
        &self,
        options: Option<&OrganizationListOptions>,
    ) -> impl Future<Output = Result<ListResponse<Organization>>> + Send;

    /// Create an organization
    fn create(
        &self,
        options: &OrganizationCreateOptions,
    ) -> impl Future<Output = Result<Organization>> + Send;

    /// Read an organization by name
    fn read(&self, organization: &str) -> impl Future<Output = Result<Organization>> + Send;

    /// Update an organization
    fn update(
        &self,
        organization: &str,
        options: &OrganizationUpdateOptions,
    ) -> impl Future<Output = Result<Organization>> + Send;

    /// Delete an organization
    fn delete(&self, organization: &str) -> impl Future<Output = Result<()>> + Send;
}

/// [`Organizations`] backed by a [`TfeClient`]
#[derive(Debug, Clone, Copy)]
pub struct OrganizationsService<'a> {
    client: &'a TfeClient,
}

impl TfeClient {
    /// Organization operations
    pub fn organizations(&self) -> OrganizationsService<'_> {
        OrganizationsService { client: self }
    }
}

fn organization_path(organization: &str) -> String {
    format!(
        "{}/{}",
        api::ORGANIZATIONS,
        urlencoding::encode(organization)
    )
}

impl Organizations for OrganizationsService<'_> {
    async fn list(
        &self,
        options: Option<&OrganizationListOptions>,
    ) -> Result<ListResponse<Organization>> {
        options.validate()?;
        debug!("Listing organizations");

        let mut builder = self.client.request(Method::GET, api::ORGANIZATIONS)?;
        if let Some(options) = options {
            builder = builder.query(options);
        }
        self.client.read_list(builder, &[]).await
    }

    async fn create(&self, options: &OrganizationCreateOptions) -> Result<Organization> {
        options.validate()?;
        debug!("Creating organization: {}", options.name);

        let builder = self
            .client
            .payload_request(Method::POST, api::ORGANIZATIONS, options)?;
        self.client.read(builder, &[]).await
    }

    async fn read(&self, organization: &str) -> Result<Organization> {
        require_id(organization, ValidationError::InvalidOrg)?;
        debug!("Fetching organization: {}", organization);

        let builder = self
            .client
            .request(Method::GET, &organization_path(organization))?;
        self.client.read(builder, &[]).await
    }

    async fn update(
        &self,
        organization: &str,
        options: &OrganizationUpdateOptions,
    ) -> Result<Organization> {
        require_id(organization, ValidationError::InvalidOrg)?;
        options.validate()?;
        debug!("Updating organization: {}", organization);

        let builder = self.client.payload_request(
            Method::PATCH,
            &organization_path(organization),
            options,
        )?;
        self.client.read(builder, &[]).await
    }

    async fn delete(&self, organization: &str) -> Result<()> {
        require_id(organization, ValidationError::InvalidOrg)?;
        debug!("Deleting organization: {}", organization);

        let builder = self
            .client
            .request(Method::DELETE, &organization_path(organization))?;
        self.client.send_no_content(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TfeError;
    use crate::hcp::validation::ListOptions;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn org_json(id: &str, external_id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "type": "organizations",
            "attributes": {
                "name": id,
                "email": "test@example.com",
                "external-id": external_id,
                "created-at": "2025-01-01T00:00:00Z"
            }
        })
    }

    #[tokio::test]
    async fn test_list_organizations_success() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/api/v2/organizations"))
            .and(query_param("page[number]", "2"))
            .and(query_param("page[size]", "10"))
            .and(query_param("q", "my"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [org_json("my-org", "org-1"), org_json("my-other", "org-2")],
                "meta": { "pagination": {
                    "current-page": 2, "prev-page": 1, "next-page": null,
                    "total-pages": 2, "total-count": 12
                }}
            })))
            .mount(&mock_server)
            .await;

        let options = OrganizationListOptions {
            list: ListOptions::page(2, 10),
            query: Some("my".to_string()),
        };
        let list = client.organizations().list(Some(&options)).await.unwrap();

        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[1].external_id, "org-2");
        let pagination = list.pagination.unwrap();
        assert_eq!(pagination.current_page, 2);
        assert_eq!(pagination.previous_page, Some(1));
        assert_eq!(pagination.next_page, None);
        assert_eq!(pagination.total_count, 12);
    }

    #[tokio::test]
    async fn test_read_organization_success() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/api/v2/organizations/my-org"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "data": org_json("my-org", "org-ABC") })),
            )
            .mount(&mock_server)
            .await;

        let org = client.organizations().read("my-org").await.unwrap();
        assert_eq!(org.name, "my-org");
        assert_eq!(org.external_id, "org-ABC");
    }

    #[tokio::test]
    async fn test_read_organization_not_found() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/api/v2/organizations/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let err = client.organizations().read("missing").await.unwrap_err();
        assert!(matches!(err, TfeError::ResourceNotFound));
    }

    #[tokio::test]
    async fn test_read_invalid_name_makes_no_request() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        let err = client.organizations().read("bad org").await.unwrap_err();
        assert!(err == ValidationError::InvalidOrg);
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_organization_body() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/api/v2/organizations"))
            .and(body_json(serde_json::json!({
                "data": {
                    "type": "organizations",
                    "attributes": { "name": "acme", "email": "ops@acme.io" }
                }
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({ "data": org_json("acme", "org-NEW") })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let org = client
            .organizations()
            .create(&OrganizationCreateOptions::new("acme", "ops@acme.io"))
            .await
            .unwrap();
        assert_eq!(org.id, "acme");
    }

    #[tokio::test]
    async fn test_create_organization_name_taken() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/api/v2/organizations"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "errors": [{ "status": "422", "title": "invalid attribute",
                             "detail": "Name has already been taken" }]
            })))
            .mount(&mock_server)
            .await;

        let err = client
            .organizations()
            .create(&OrganizationCreateOptions::new("acme", "ops@acme.io"))
            .await
            .unwrap_err();
        assert!(err == crate::error::Rejection::NameTaken);
    }

    #[tokio::test]
    async fn test_delete_organization() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("DELETE"))
            .and(path("/api/v2/organizations/acme"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        client.organizations().delete("acme").await.unwrap();
    }
}
