//! Configuration version API operations

use std::future::Future;

use log::debug;
use reqwest::Method;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::api;
use crate::error::{Result, ValidationError};
use crate::hcp::jsonapi::required_relationships;
use crate::hcp::traits::{ListResponse, Validate};
use crate::hcp::validation::require_id;
use crate::hcp::TfeClient;

use super::models::{
    ConfigurationVersion, ConfigurationVersionCreateOptions, ConfigurationVersionListOptions,
};

/// Configuration version operations
pub trait ConfigurationVersions {
    /// List configuration versions of a workspace, newest first
    fn list(
        &self,
        workspace_id: &str,
        options: Option<&ConfigurationVersionListOptions>,
    ) -> impl Future<Output = Result<ListResponse<ConfigurationVersion>>> + Send;

    /// Create a configuration version; the result carries the upload URL
    fn create(
        &self,
        workspace_id: &str,
        options: &ConfigurationVersionCreateOptions,
    ) -> impl Future<Output = Result<ConfigurationVersion>> + Send;

    /// Read a configuration version by ID
    fn read(&self, cv_id: &str) -> impl Future<Output = Result<ConfigurationVersion>> + Send;

    /// Upload an already packed `.tar.gz` archive to the URL returned by
    /// [`ConfigurationVersions::create`]
    ///
    /// `archive` is consumed and dropped whether or not the upload succeeds.
    fn upload_tar_gzip<R>(
        &self,
        upload_url: &str,
        archive: R,
    ) -> impl Future<Output = Result<()>> + Send
    where
        R: AsyncRead + Unpin + Send;

    /// Download the configuration archive into `writer`
    ///
    /// Returns the number of bytes written.
    fn download<W>(&self, cv_id: &str, writer: &mut W) -> impl Future<Output = Result<u64>> + Send
    where
        W: AsyncWrite + Unpin + Send;
}

/// [`ConfigurationVersions`] backed by a [`TfeClient`]
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationVersionsService<'a> {
    client: &'a TfeClient,
}

impl TfeClient {
    /// Configuration version operations
    pub fn configuration_versions(&self) -> ConfigurationVersionsService<'_> {
        ConfigurationVersionsService { client: self }
    }
}

fn workspace_cvs_path(workspace_id: &str) -> String {
    format!(
        "{}/{}/{}",
        api::WORKSPACES,
        urlencoding::encode(workspace_id),
        api::CONFIGURATION_VERSIONS
    )
}

fn cv_path(cv_id: &str) -> String {
    format!(
        "{}/{}",
        api::CONFIGURATION_VERSIONS,
        urlencoding::encode(cv_id)
    )
}

impl ConfigurationVersions for ConfigurationVersionsService<'_> {
    async fn list(
        &self,
        workspace_id: &str,
        options: Option<&ConfigurationVersionListOptions>,
    ) -> Result<ListResponse<ConfigurationVersion>> {
        require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
        options.validate()?;
        debug!("Listing configuration versions for workspace: {}", workspace_id);

        let mut builder = self
            .client
            .request(Method::GET, &workspace_cvs_path(workspace_id))?;
        let mut required = Vec::new();
        if let Some(options) = options {
            builder = builder.query(options);
            required = required_relationships(options.include.as_deref().unwrap_or_default());
        }
        self.client.read_list(builder, &required).await
    }

    async fn create(
        &self,
        workspace_id: &str,
        options: &ConfigurationVersionCreateOptions,
    ) -> Result<ConfigurationVersion> {
        require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
        debug!("Creating configuration version in workspace: {}", workspace_id);

        let builder = self.client.payload_request(
            Method::POST,
            &workspace_cvs_path(workspace_id),
            options,
        )?;
        self.client.read(builder, &[]).await
    }

    async fn read(&self, cv_id: &str) -> Result<ConfigurationVersion> {
        require_id(cv_id, ValidationError::InvalidConfigVersionId)?;
        debug!("Fetching configuration version: {}", cv_id);

        let builder = self.client.request(Method::GET, &cv_path(cv_id))?;
        self.client.read(builder, &[]).await
    }

    async fn upload_tar_gzip<R>(&self, upload_url: &str, archive: R) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        if upload_url.is_empty() {
            return Err(ValidationError::RequiredUploadUrl.into());
        }
        self.client.upload(upload_url, archive).await
    }

    async fn download<W>(&self, cv_id: &str, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        require_id(cv_id, ValidationError::InvalidConfigVersionId)?;
        debug!("Downloading configuration version: {}", cv_id);

        // Answers with a redirect to the archive store
        let path = format!("{}/download", cv_path(cv_id));
        let builder = self.client.raw_request(Method::GET, &path)?;
        self.client.download(builder, writer).await
    }
}
