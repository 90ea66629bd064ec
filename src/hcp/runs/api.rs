//! Run API operations

use std::future::Future;

use log::debug;
use reqwest::Method;

use crate::config::api;
use crate::error::{Result, ValidationError};
use crate::hcp::jsonapi::required_relationships;
use crate::hcp::traits::{ListResponse, Validate};
use crate::hcp::validation::require_id;
use crate::hcp::TfeClient;

use super::models::{Run, RunActionOptions, RunCreateOptions, RunListOptions, RunReadOptions};

/// Run operations
pub trait Runs {
    /// List runs of a workspace, newest first
    fn list(
        &self,
        workspace_id: &str,
        options: Option<&RunListOptions>,
    ) -> impl Future<Output = Result<ListResponse<Run>>> + Send;

    /// Queue a new run
    fn create(&self, options: &RunCreateOptions) -> impl Future<Output = Result<Run>> + Send;

    /// Read a run by ID
    fn read(&self, run_id: &str) -> impl Future<Output = Result<Run>> + Send;

    /// Read a run by ID, with related resources
    fn read_with_options(
        &self,
        run_id: &str,
        options: &RunReadOptions,
    ) -> impl Future<Output = Result<Run>> + Send;

    /// Confirm a run that is waiting for approval
    fn apply(
        &self,
        run_id: &str,
        options: Option<&RunActionOptions>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Interrupt a planning or applying run
    fn cancel(
        &self,
        run_id: &str,
        options: Option<&RunActionOptions>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// End a run whose cancel did not take effect
    fn force_cancel(
        &self,
        run_id: &str,
        options: Option<&RunActionOptions>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Skip the apply phase of a run waiting for confirmation
    fn discard(
        &self,
        run_id: &str,
        options: Option<&RunActionOptions>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// [`Runs`] backed by a [`TfeClient`]
#[derive(Debug, Clone, Copy)]
pub struct RunsService<'a> {
    client: &'a TfeClient,
}

impl TfeClient {
    /// Run operations
    pub fn runs(&self) -> RunsService<'_> {
        RunsService { client: self }
    }
}

fn run_path(run_id: &str) -> String {
    format!("{}/{}", api::RUNS, urlencoding::encode(run_id))
}

impl RunsService<'_> {
    async fn action(
        &self,
        run_id: &str,
        action: &str,
        options: Option<&RunActionOptions>,
    ) -> Result<()> {
        require_id(run_id, ValidationError::InvalidRunId)?;
        debug!("Run {}: {}", run_id, action);

        let path = format!("{}/actions/{}", run_path(run_id), action);
        let builder = match options {
            Some(options) => {
                let body = serde_json::to_value(options)?;
                self.client.json_request(Method::POST, &path, &body)?
            }
            None => self.client.request(Method::POST, &path)?,
        };
        self.client.send_no_content(builder).await
    }
}

impl Runs for RunsService<'_> {
    async fn list(
        &self,
        workspace_id: &str,
        options: Option<&RunListOptions>,
    ) -> Result<ListResponse<Run>> {
        require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
        options.validate()?;
        debug!("Listing runs for workspace: {}", workspace_id);

        let path = format!(
            "{}/{}/{}",
            api::WORKSPACES,
            urlencoding::encode(workspace_id),
            api::RUNS
        );
        let mut builder = self.client.request(Method::GET, &path)?;
        let mut required = Vec::new();
        if let Some(options) = options {
            builder = builder.query(options);
            required = required_relationships(options.include.as_deref().unwrap_or_default());
        }
        self.client.read_list(builder, &required).await
    }

    async fn create(&self, options: &RunCreateOptions) -> Result<Run> {
        options.validate()?;
        debug!("Creating run in workspace: {}", options.workspace_id);

        let builder = self
            .client
            .payload_request(Method::POST, api::RUNS, options)?;
        self.client.read(builder, &[]).await
    }

    async fn read(&self, run_id: &str) -> Result<Run> {
        self.read_with_options(run_id, &RunReadOptions::default())
            .await
    }

    async fn read_with_options(&self, run_id: &str, options: &RunReadOptions) -> Result<Run> {
        require_id(run_id, ValidationError::InvalidRunId)?;
        debug!("Fetching run: {}", run_id);

        let builder = self
            .client
            .request(Method::GET, &run_path(run_id))?
            .query(options);
        let required = required_relationships(options.include.as_deref().unwrap_or_default());
        self.client.read(builder, &required).await
    }

    async fn apply(&self, run_id: &str, options: Option<&RunActionOptions>) -> Result<()> {
        self.action(run_id, "apply", options).await
    }

    async fn cancel(&self, run_id: &str, options: Option<&RunActionOptions>) -> Result<()> {
        self.action(run_id, "cancel", options).await
    }

    async fn force_cancel(&self, run_id: &str, options: Option<&RunActionOptions>) -> Result<()> {
        self.action(run_id, "force-cancel", options).await
    }

    async fn discard(&self, run_id: &str, options: Option<&RunActionOptions>) -> Result<()> {
        self.action(run_id, "discard", options).await
    }
}
