//! State version API operations

use std::future::Future;

use log::debug;
use reqwest::Method;
use tokio::io::AsyncWrite;

use crate::config::api;
use crate::error::{Result, TfeError, ValidationError};
use crate::hcp::jsonapi::required_relationships;
use crate::hcp::traits::{ListResponse, Validate};
use crate::hcp::validation::require_id;
use crate::hcp::TfeClient;

use super::models::{
    StateVersion, StateVersionCreateOptions, StateVersionListOptions, StateVersionReadOptions,
};

/// State version operations
pub trait StateVersions {
    /// List state versions of one workspace, newest first
    fn list(
        &self,
        options: &StateVersionListOptions,
    ) -> impl Future<Output = Result<ListResponse<StateVersion>>> + Send;

    /// Create a state version in a workspace the caller has locked
    fn create(
        &self,
        workspace_id: &str,
        options: &StateVersionCreateOptions,
    ) -> impl Future<Output = Result<StateVersion>> + Send;

    /// Read a state version by ID
    fn read(&self, sv_id: &str) -> impl Future<Output = Result<StateVersion>> + Send;

    /// Read a state version by ID, with related resources
    fn read_with_options(
        &self,
        sv_id: &str,
        options: &StateVersionReadOptions,
    ) -> impl Future<Output = Result<StateVersion>> + Send;

    /// Read the current state version of a workspace
    fn read_current(&self, workspace_id: &str)
        -> impl Future<Output = Result<StateVersion>> + Send;

    /// Stream a state file into `writer`
    ///
    /// `download_url` is a state version's `hosted_state_download_url` (or
    /// the JSON variant); returns the number of bytes written.
    fn download<W>(
        &self,
        download_url: &str,
        writer: &mut W,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        W: AsyncWrite + Unpin + Send;
}

/// [`StateVersions`] backed by a [`TfeClient`]
#[derive(Debug, Clone, Copy)]
pub struct StateVersionsService<'a> {
    client: &'a TfeClient,
}

impl TfeClient {
    /// State version operations
    pub fn state_versions(&self) -> StateVersionsService<'_> {
        StateVersionsService { client: self }
    }
}

fn sv_path(sv_id: &str) -> String {
    format!("{}/{}", api::STATE_VERSIONS, urlencoding::encode(sv_id))
}

fn workspace_path(workspace_id: &str, tail: &str) -> String {
    format!(
        "{}/{}/{}",
        api::WORKSPACES,
        urlencoding::encode(workspace_id),
        tail
    )
}

impl StateVersions for StateVersionsService<'_> {
    async fn list(&self, options: &StateVersionListOptions) -> Result<ListResponse<StateVersion>> {
        options.validate()?;
        debug!(
            "Listing state versions for {}/{}",
            options.organization, options.workspace
        );

        let builder = self
            .client
            .request(Method::GET, api::STATE_VERSIONS)?
            .query(options);
        self.client.read_list(builder, &[]).await
    }

    async fn create(
        &self,
        workspace_id: &str,
        options: &StateVersionCreateOptions,
    ) -> Result<StateVersion> {
        require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
        options.validate()?;
        debug!(
            "Creating state version (serial: {}) for: {}",
            options.serial, workspace_id
        );

        let builder = self.client.payload_request(
            Method::POST,
            &workspace_path(workspace_id, api::STATE_VERSIONS),
            options,
        )?;
        self.client.read(builder, &[]).await
    }

    async fn read(&self, sv_id: &str) -> Result<StateVersion> {
        self.read_with_options(sv_id, &StateVersionReadOptions::default())
            .await
    }

    async fn read_with_options(
        &self,
        sv_id: &str,
        options: &StateVersionReadOptions,
    ) -> Result<StateVersion> {
        require_id(sv_id, ValidationError::InvalidStateVersionId)?;
        debug!("Fetching state version: {}", sv_id);

        let builder = self
            .client
            .request(Method::GET, &sv_path(sv_id))?
            .query(options);
        let required = required_relationships(options.include.as_deref().unwrap_or_default());
        self.client.read(builder, &required).await
    }

    async fn read_current(&self, workspace_id: &str) -> Result<StateVersion> {
        require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
        debug!("Fetching current state version for: {}", workspace_id);

        let builder = self.client.request(
            Method::GET,
            &workspace_path(workspace_id, "current-state-version"),
        )?;
        self.client.read(builder, &[]).await
    }

    async fn download<W>(&self, download_url: &str, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        if download_url.is_empty() {
            return Err(TfeError::Config("state download URL is empty".to_string()));
        }
        debug!("Downloading state from: {}", download_url);

        let builder = self.client.raw_request(Method::GET, download_url)?;
        self.client.download(builder, writer).await
    }
}
