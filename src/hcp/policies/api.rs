//! Policy API operations

use std::future::Future;

use log::debug;
use reqwest::Method;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::api;
use crate::error::{Result, ValidationError};
use crate::hcp::traits::{ListResponse, Validate};
use crate::hcp::validation::require_id;
use crate::hcp::TfeClient;

use super::models::{Policy, PolicyCreateOptions, PolicyListOptions, PolicyUpdateOptions};

/// Policy operations
pub trait Policies {
    /// List policies in an organization
    fn list(
        &self,
        organization: &str,
        options: Option<&PolicyListOptions>,
    ) -> impl Future<Output = Result<ListResponse<Policy>>> + Send;

    /// Create a policy; its code is sent separately with [`Policies::upload`]
    fn create(
        &self,
        organization: &str,
        options: &PolicyCreateOptions,
    ) -> impl Future<Output = Result<Policy>> + Send;

    /// Read a policy by ID
    fn read(&self, policy_id: &str) -> impl Future<Output = Result<Policy>> + Send;

    /// Update a policy
    fn update(
        &self,
        policy_id: &str,
        options: &PolicyUpdateOptions,
    ) -> impl Future<Output = Result<Policy>> + Send;

    /// Delete a policy
    fn delete(&self, policy_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Replace the policy code
    fn upload<R>(&self, policy_id: &str, content: R) -> impl Future<Output = Result<()>> + Send
    where
        R: AsyncRead + Unpin + Send;

    /// Stream the policy code into `writer`
    fn download<W>(
        &self,
        policy_id: &str,
        writer: &mut W,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        W: AsyncWrite + Unpin + Send;
}

/// [`Policies`] backed by a [`TfeClient`]
#[derive(Debug, Clone, Copy)]
pub struct PoliciesService<'a> {
    client: &'a TfeClient,
}

impl TfeClient {
    /// Policy operations
    pub fn policies(&self) -> PoliciesService<'_> {
        PoliciesService { client: self }
    }
}

fn organization_policies_path(organization: &str) -> String {
    format!(
        "{}/{}/{}",
        api::ORGANIZATIONS,
        urlencoding::encode(organization),
        api::POLICIES
    )
}

fn policy_path(policy_id: &str) -> String {
    format!("{}/{}", api::POLICIES, urlencoding::encode(policy_id))
}

impl Policies for PoliciesService<'_> {
    async fn list(
        &self,
        organization: &str,
        options: Option<&PolicyListOptions>,
    ) -> Result<ListResponse<Policy>> {
        require_id(organization, ValidationError::InvalidOrg)?;
        options.validate()?;
        debug!("Listing policies for organization: {}", organization);

        let mut builder = self
            .client
            .request(Method::GET, &organization_policies_path(organization))?;
        if let Some(options) = options {
            builder = builder.query(options);
        }
        self.client.read_list(builder, &[]).await
    }

    async fn create(&self, organization: &str, options: &PolicyCreateOptions) -> Result<Policy> {
        require_id(organization, ValidationError::InvalidOrg)?;
        options.validate()?;
        debug!("Creating policy '{}' in {}", options.name, organization);

        let builder = self.client.payload_request(
            Method::POST,
            &organization_policies_path(organization),
            options,
        )?;
        self.client.read(builder, &[]).await
    }

    async fn read(&self, policy_id: &str) -> Result<Policy> {
        require_id(policy_id, ValidationError::InvalidPolicyId)?;
        debug!("Fetching policy: {}", policy_id);

        let builder = self.client.request(Method::GET, &policy_path(policy_id))?;
        self.client.read(builder, &[]).await
    }

    async fn update(&self, policy_id: &str, options: &PolicyUpdateOptions) -> Result<Policy> {
        require_id(policy_id, ValidationError::InvalidPolicyId)?;
        options.validate()?;
        debug!("Updating policy: {}", policy_id);

        let builder = self
            .client
            .payload_request(Method::PATCH, &policy_path(policy_id), options)?;
        self.client.read(builder, &[]).await
    }

    async fn delete(&self, policy_id: &str) -> Result<()> {
        require_id(policy_id, ValidationError::InvalidPolicyId)?;
        debug!("Deleting policy: {}", policy_id);

        let builder = self
            .client
            .request(Method::DELETE, &policy_path(policy_id))?;
        self.client.send_no_content(builder).await
    }

    async fn upload<R>(&self, policy_id: &str, content: R) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        require_id(policy_id, ValidationError::InvalidPolicyId)?;
        let path = format!("{}/upload", policy_path(policy_id));
        self.client.upload(&path, content).await
    }

    async fn download<W>(&self, policy_id: &str, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        require_id(policy_id, ValidationError::InvalidPolicyId)?;
        debug!("Downloading policy: {}", policy_id);

        let path = format!("{}/download", policy_path(policy_id));
        let builder = self.client.raw_request(Method::GET, &path)?;
        self.client.download(builder, writer).await
    }
}
