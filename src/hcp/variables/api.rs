//! Workspace variable API operations

use std::future::Future;

use log::debug;
use reqwest::Method;

use crate::config::api;
use crate::error::{Result, ValidationError};
use crate::hcp::traits::{ListResponse, Validate};
use crate::hcp::validation::require_id;
use crate::hcp::TfeClient;

use super::models::{Variable, VariableCreateOptions, VariableListOptions, VariableUpdateOptions};

/// Workspace variable operations
pub trait Variables {
    /// List variables of a workspace
    fn list(
        &self,
        workspace_id: &str,
        options: Option<&VariableListOptions>,
    ) -> impl Future<Output = Result<ListResponse<Variable>>> + Send;

    /// Create a variable in a workspace
    fn create(
        &self,
        workspace_id: &str,
        options: &VariableCreateOptions,
    ) -> impl Future<Output = Result<Variable>> + Send;

    /// Read a variable
    fn read(
        &self,
        workspace_id: &str,
        variable_id: &str,
    ) -> impl Future<Output = Result<Variable>> + Send;

    /// Update a variable
    fn update(
        &self,
        workspace_id: &str,
        variable_id: &str,
        options: &VariableUpdateOptions,
    ) -> impl Future<Output = Result<Variable>> + Send;

    /// Delete a variable
    fn delete(
        &self,
        workspace_id: &str,
        variable_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// [`Variables`] backed by a [`TfeClient`]
#[derive(Debug, Clone, Copy)]
pub struct VariablesService<'a> {
    client: &'a TfeClient,
}

impl TfeClient {
    /// Workspace variable operations
    pub fn variables(&self) -> VariablesService<'_> {
        VariablesService { client: self }
    }
}

fn workspace_vars_path(workspace_id: &str) -> String {
    format!(
        "{}/{}/{}",
        api::WORKSPACES,
        urlencoding::encode(workspace_id),
        api::VARS
    )
}

fn variable_path(workspace_id: &str, variable_id: &str) -> String {
    format!(
        "{}/{}",
        workspace_vars_path(workspace_id),
        urlencoding::encode(variable_id)
    )
}

fn validate_ids(workspace_id: &str, variable_id: &str) -> Result<()> {
    require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
    require_id(variable_id, ValidationError::InvalidVariableId)?;
    Ok(())
}

impl Variables for VariablesService<'_> {
    async fn list(
        &self,
        workspace_id: &str,
        options: Option<&VariableListOptions>,
    ) -> Result<ListResponse<Variable>> {
        require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
        options.validate()?;
        debug!("Listing variables for workspace: {}", workspace_id);

        let mut builder = self
            .client
            .request(Method::GET, &workspace_vars_path(workspace_id))?;
        if let Some(options) = options {
            builder = builder.query(options);
        }
        self.client.read_list(builder, &[]).await
    }

    async fn create(
        &self,
        workspace_id: &str,
        options: &VariableCreateOptions,
    ) -> Result<Variable> {
        require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
        options.validate()?;
        debug!("Creating variable '{}' in {}", options.key, workspace_id);

        let builder = self.client.payload_request(
            Method::POST,
            &workspace_vars_path(workspace_id),
            options,
        )?;
        self.client.read(builder, &[]).await
    }

    async fn read(&self, workspace_id: &str, variable_id: &str) -> Result<Variable> {
        validate_ids(workspace_id, variable_id)?;
        debug!("Fetching variable {} of {}", variable_id, workspace_id);

        let builder = self
            .client
            .request(Method::GET, &variable_path(workspace_id, variable_id))?;
        self.client.read(builder, &[]).await
    }

    async fn update(
        &self,
        workspace_id: &str,
        variable_id: &str,
        options: &VariableUpdateOptions,
    ) -> Result<Variable> {
        validate_ids(workspace_id, variable_id)?;
        options.validate()?;
        debug!("Updating variable {} of {}", variable_id, workspace_id);

        let builder = self.client.payload_request(
            Method::PATCH,
            &variable_path(workspace_id, variable_id),
            options,
        )?;
        self.client.read(builder, &[]).await
    }

    async fn delete(&self, workspace_id: &str, variable_id: &str) -> Result<()> {
        validate_ids(workspace_id, variable_id)?;
        debug!("Deleting variable {} of {}", variable_id, workspace_id);

        let builder = self
            .client
            .request(Method::DELETE, &variable_path(workspace_id, variable_id))?;
        self.client.send_no_content(builder).await
    }
}
