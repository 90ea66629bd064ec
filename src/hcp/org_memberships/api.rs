//! Organization membership API operations

use std::future::Future;

use log::debug;
use reqwest::Method;

use crate::config::api;
use crate::error::{Result, ValidationError};
use crate::hcp::jsonapi::required_relationships;
use crate::hcp::traits::{ListResponse, Validate};
use crate::hcp::validation::require_id;
use crate::hcp::TfeClient;

use super::models::{
    OrganizationMembership, OrganizationMembershipCreateOptions,
    OrganizationMembershipListOptions, OrganizationMembershipReadOptions,
};

/// Organization membership operations
pub trait OrganizationMemberships {
    /// List members and pending invitations of an organization
    fn list(
        &self,
        organization: &str,
        options: Option<&OrganizationMembershipListOptions>,
    ) -> impl Future<Output = Result<ListResponse<OrganizationMembership>>> + Send;

    /// Invite a user by email
    fn create(
        &self,
        organization: &str,
        options: &OrganizationMembershipCreateOptions,
    ) -> impl Future<Output = Result<OrganizationMembership>> + Send;

    /// Read a membership by ID
    fn read(
        &self,
        membership_id: &str,
    ) -> impl Future<Output = Result<OrganizationMembership>> + Send;

    /// Read a membership by ID, with related resources
    fn read_with_options(
        &self,
        membership_id: &str,
        options: &OrganizationMembershipReadOptions,
    ) -> impl Future<Output = Result<OrganizationMembership>> + Send;

    /// Remove a member or revoke an invitation
    fn delete(&self, membership_id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// [`OrganizationMemberships`] backed by a [`TfeClient`]
#[derive(Debug, Clone, Copy)]
pub struct OrganizationMembershipsService<'a> {
    client: &'a TfeClient,
}

impl TfeClient {
    /// Organization membership operations
    pub fn organization_memberships(&self) -> OrganizationMembershipsService<'_> {
        OrganizationMembershipsService { client: self }
    }
}

fn organization_memberships_path(organization: &str) -> String {
    format!(
        "{}/{}/{}",
        api::ORGANIZATIONS,
        urlencoding::encode(organization),
        api::ORGANIZATION_MEMBERSHIPS
    )
}

fn membership_path(membership_id: &str) -> String {
    format!(
        "{}/{}",
        api::ORGANIZATION_MEMBERSHIPS,
        urlencoding::encode(membership_id)
    )
}

impl OrganizationMemberships for OrganizationMembershipsService<'_> {
    async fn list(
        &self,
        organization: &str,
        options: Option<&OrganizationMembershipListOptions>,
    ) -> Result<ListResponse<OrganizationMembership>> {
        require_id(organization, ValidationError::InvalidOrg)?;
        options.validate()?;
        debug!("Listing memberships for organization: {}", organization);

        let mut builder = self
            .client
            .request(Method::GET, &organization_memberships_path(organization))?;
        let mut required = Vec::new();
        if let Some(options) = options {
            builder = builder.query(options);
            required = required_relationships(options.include.as_deref().unwrap_or_default());
        }
        self.client.read_list(builder, &required).await
    }

    async fn create(
        &self,
        organization: &str,
        options: &OrganizationMembershipCreateOptions,
    ) -> Result<OrganizationMembership> {
        require_id(organization, ValidationError::InvalidOrg)?;
        options.validate()?;
        debug!("Inviting '{}' to {}", options.email, organization);

        let builder = self.client.payload_request(
            Method::POST,
            &organization_memberships_path(organization),
            options,
        )?;
        self.client.read(builder, &[]).await
    }

    async fn read(&self, membership_id: &str) -> Result<OrganizationMembership> {
        self.read_with_options(membership_id, &OrganizationMembershipReadOptions::default())
            .await
    }

    async fn read_with_options(
        &self,
        membership_id: &str,
        options: &OrganizationMembershipReadOptions,
    ) -> Result<OrganizationMembership> {
        require_id(membership_id, ValidationError::InvalidMembershipId)?;
        debug!("Fetching organization membership: {}", membership_id);

        let builder = self
            .client
            .request(Method::GET, &membership_path(membership_id))?
            .query(options);
        let required = required_relationships(options.include.as_deref().unwrap_or_default());
        self.client.read(builder, &required).await
    }

    async fn delete(&self, membership_id: &str) -> Result<()> {
        require_id(membership_id, ValidationError::InvalidMembershipId)?;
        debug!("Deleting organization membership: {}", membership_id);

        let builder = self
            .client
            .request(Method::DELETE, &membership_path(membership_id))?;
        self.client.send_no_content(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Rejection, TfeError};
    use crate::hcp::org_memberships::OrganizationMembershipInclude;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn membership_json(id: &str, email: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "type": "organization-memberships",
            "attributes": { "email": email, "status": status },
            "relationships": {
                "organization": { "data": { "id": "acme", "type": "organizations" } },
                "user": { "data": { "id": "user-1", "type": "users" } }
            }
        })
    }

    #[tokio::test]
    async fn test_list_memberships_by_email() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/api/v2/organizations/acme/organization-memberships"))
            .and(query_param("filter[email]", "a@example.com,b@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    membership_json("ou-1", "a@example.com", "active"),
                    membership_json("ou-2", "b@example.com", "invited")
                ]
            })))
            .mount(&mock_server)
            .await;

        let options = OrganizationMembershipListOptions {
            emails: Some(vec!["a@example.com".into(), "b@example.com".into()]),
            ..Default::default()
        };
        let list = client
            .organization_memberships()
            .list("acme", Some(&options))
            .await
            .unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.items[1].is_invited());
        assert!(list.pagination.is_none());
    }

    #[tokio::test]
    async fn test_invite_member() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/api/v2/organizations/acme/organization-memberships"))
            .and(body_json(serde_json::json!({
                "data": {
                    "type": "organization-memberships",
                    "attributes": { "email": "new@example.com" }
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": membership_json("ou-9", "new@example.com", "invited")
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let membership = client
            .organization_memberships()
            .create("acme", &OrganizationMembershipCreateOptions::new("new@example.com"))
            .await
            .unwrap();
        assert_eq!(membership.id, "ou-9");
        assert_eq!(membership.user.unwrap().id, "user-1");
    }

    #[tokio::test]
    async fn test_invite_invalid_email_makes_no_request() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        let err = client
            .organization_memberships()
            .create("acme", &OrganizationMembershipCreateOptions::new("nope"))
            .await
            .unwrap_err();
        assert!(err == ValidationError::InvalidEmail);
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_with_include() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/api/v2/organization-memberships/ou-1"))
            .and(query_param("include", "user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": membership_json("ou-1", "a@example.com", "active"),
                "included": [{
                    "id": "user-1",
                    "type": "users",
                    "attributes": { "username": "alice" }
                }]
            })))
            .mount(&mock_server)
            .await;

        let options = OrganizationMembershipReadOptions {
            include: Some(vec![OrganizationMembershipInclude::User]),
        };
        let membership = client
            .organization_memberships()
            .read_with_options("ou-1", &options)
            .await
            .unwrap();
        assert_eq!(membership.user.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_invalid_include_is_rejected() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/api/v2/organizations/acme/organization-memberships"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "errors": [{
                    "status": "400",
                    "title": "bad request",
                    "detail": "Invalid include parameter"
                }]
            })))
            .mount(&mock_server)
            .await;

        let err = client
            .organization_memberships()
            .list("acme", None)
            .await
            .unwrap_err();
        assert!(err == Rejection::InvalidIncludeValue);
    }

    #[tokio::test]
    async fn test_delete_membership() {
        let mock_server = MockServer::start().await;
        let client = TfeClient::test_client(&mock_server.uri());

        Mock::given(method("DELETE"))
            .and(path("/api/v2/organization-memberships/ou-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        client.organization_memberships().delete("ou-1").await.unwrap();

        let err = client
            .organization_memberships()
            .delete("")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TfeError::Validation(ValidationError::InvalidMembershipId)
        ));
    }
}
