//! Workspace API operations

use std::future::Future;

use log::debug;
use reqwest::Method;

use crate::config::api;
use crate::error::{Rejection, Result, TfeError, ValidationError};
use crate::hcp::jsonapi::required_relationships;
use crate::hcp::traits::{ListResponse, Validate};
use crate::hcp::validation::require_id;
use crate::hcp::TfeClient;

use super::models::{
    Workspace, WorkspaceCreateOptions, WorkspaceListOptions, WorkspaceLockOptions,
    WorkspaceReadOptions, WorkspaceUpdateOptions,
};

/// Workspace operations
pub trait Workspaces {
    /// List workspaces in an organization
    fn list(
        &self,
        organization: &str,
        options: Option<&WorkspaceListOptions>,
    ) -> impl Future<Output = Result<ListResponse<Workspace>>> + Send;

    /// Create a workspace in an organization
    fn create(
        &self,
        organization: &str,
        options: &WorkspaceCreateOptions,
    ) -> impl Future<Output = Result<Workspace>> + Send;

    /// Read a workspace by organization and name
    fn read(
        &self,
        organization: &str,
        workspace: &str,
    ) -> impl Future<Output = Result<Workspace>> + Send;

    /// Read a workspace by organization and name, with related resources
    fn read_with_options(
        &self,
        organization: &str,
        workspace: &str,
        options: &WorkspaceReadOptions,
    ) -> impl Future<Output = Result<Workspace>> + Send;

    /// Read a workspace by ID
    fn read_by_id(&self, workspace_id: &str) -> impl Future<Output = Result<Workspace>> + Send;

    /// Update a workspace by organization and name
    fn update(
        &self,
        organization: &str,
        workspace: &str,
        options: &WorkspaceUpdateOptions,
    ) -> impl Future<Output = Result<Workspace>> + Send;

    /// Update a workspace by ID
    fn update_by_id(
        &self,
        workspace_id: &str,
        options: &WorkspaceUpdateOptions,
    ) -> impl Future<Output = Result<Workspace>> + Send;

    /// Delete a workspace by organization and name
    fn delete(&self, organization: &str, workspace: &str)
        -> impl Future<Output = Result<()>> + Send;

    /// Delete a workspace by ID
    fn delete_by_id(&self, workspace_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Delete a workspace only if it manages no resources
    fn safe_delete(
        &self,
        organization: &str,
        workspace: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Safe-delete a workspace by ID
    fn safe_delete_by_id(&self, workspace_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Lock a workspace to prevent runs
    fn lock(
        &self,
        workspace_id: &str,
        options: &WorkspaceLockOptions,
    ) -> impl Future<Output = Result<Workspace>> + Send;

    /// Unlock a workspace locked by the current user or team
    fn unlock(&self, workspace_id: &str) -> impl Future<Output = Result<Workspace>> + Send;

    /// Unlock a workspace regardless of who holds the lock
    fn force_unlock(&self, workspace_id: &str) -> impl Future<Output = Result<Workspace>> + Send;
}

/// [`Workspaces`] backed by a [`TfeClient`]
#[derive(Debug, Clone, Copy)]
pub struct WorkspacesService<'a> {
    client: &'a TfeClient,
}

impl TfeClient {
    /// Workspace operations
    pub fn workspaces(&self) -> WorkspacesService<'_> {
        WorkspacesService { client: self }
    }
}

fn organization_workspaces_path(organization: &str) -> String {
    format!(
        "{}/{}/{}",
        api::ORGANIZATIONS,
        urlencoding::encode(organization),
        api::WORKSPACES
    )
}

fn workspace_by_name_path(organization: &str, workspace: &str) -> String {
    format!(
        "{}/{}",
        organization_workspaces_path(organization),
        urlencoding::encode(workspace)
    )
}

fn workspace_path(workspace_id: &str) -> String {
    format!("{}/{}", api::WORKSPACES, urlencoding::encode(workspace_id))
}

fn validate_name_args(organization: &str, workspace: &str) -> Result<()> {
    require_id(organization, ValidationError::InvalidOrg)?;
    if workspace.is_empty() {
        return Err(ValidationError::RequiredWorkspace.into());
    }
    require_id(workspace, ValidationError::InvalidWorkspaceValue)?;
    Ok(())
}

/// A bare 409 on lock/unlock carries no detail; name the condition anyway
fn conflict_as(err: TfeError, rejection: Rejection) -> TfeError {
    match err {
        TfeError::Api { status: 409, .. } => TfeError::Rejected(rejection),
        other => other,
    }
}

impl WorkspacesService<'_> {
    async fn read_path(&self, path: &str, options: Option<&WorkspaceReadOptions>) -> Result<Workspace> {
        let mut builder = self.client.request(Method::GET, path)?;
        let mut required = Vec::new();
        if let Some(options) = options {
            builder = builder.query(options);
            required = required_relationships(options.include.as_deref().unwrap_or_default());
        }
        self.client.read(builder, &required).await
    }

    async fn action(&self, workspace_id: &str, action: &str) -> Result<Workspace> {
        require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
        debug!("Workspace {}: {}", workspace_id, action);

        let path = format!("{}/actions/{}", workspace_path(workspace_id), action);
        let builder = self.client.request(Method::POST, &path)?;
        self.client.read(builder, &[]).await
    }
}

impl Workspaces for WorkspacesService<'_> {
    async fn list(
        &self,
        organization: &str,
        options: Option<&WorkspaceListOptions>,
    ) -> Result<ListResponse<Workspace>> {
        require_id(organization, ValidationError::InvalidOrg)?;
        options.validate()?;
        debug!("Listing workspaces for organization: {}", organization);

        let mut builder = self
            .client
            .request(Method::GET, &organization_workspaces_path(organization))?;
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
        options: &WorkspaceCreateOptions,
    ) -> Result<Workspace> {
        require_id(organization, ValidationError::InvalidOrg)?;
        options.validate()?;
        debug!("Creating workspace '{}' in {}", options.name, organization);

        let builder = self.client.payload_request(
            Method::POST,
            &organization_workspaces_path(organization),
            options,
        )?;
        self.client.read(builder, &[]).await
    }

    async fn read(&self, organization: &str, workspace: &str) -> Result<Workspace> {
        validate_name_args(organization, workspace)?;
        debug!("Fetching workspace {}/{}", organization, workspace);
        self.read_path(&workspace_by_name_path(organization, workspace), None)
            .await
    }

    async fn read_with_options(
        &self,
        organization: &str,
        workspace: &str,
        options: &WorkspaceReadOptions,
    ) -> Result<Workspace> {
        validate_name_args(organization, workspace)?;
        debug!("Fetching workspace {}/{} with {:?}", organization, workspace, options);
        self.read_path(&workspace_by_name_path(organization, workspace), Some(options))
            .await
    }

    async fn read_by_id(&self, workspace_id: &str) -> Result<Workspace> {
        require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
        debug!("Fetching workspace directly by ID: {}", workspace_id);
        self.read_path(&workspace_path(workspace_id), None).await
    }

    async fn update(
        &self,
        organization: &str,
        workspace: &str,
        options: &WorkspaceUpdateOptions,
    ) -> Result<Workspace> {
        validate_name_args(organization, workspace)?;
        options.validate()?;
        debug!("Updating workspace {}/{}", organization, workspace);

        let builder = self.client.payload_request(
            Method::PATCH,
            &workspace_by_name_path(organization, workspace),
            options,
        )?;
        self.client.read(builder, &[]).await
    }

    async fn update_by_id(
        &self,
        workspace_id: &str,
        options: &WorkspaceUpdateOptions,
    ) -> Result<Workspace> {
        require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
        options.validate()?;
        debug!("Updating workspace: {}", workspace_id);

        let builder =
            self.client
                .payload_request(Method::PATCH, &workspace_path(workspace_id), options)?;
        self.client.read(builder, &[]).await
    }

    async fn delete(&self, organization: &str, workspace: &str) -> Result<()> {
        validate_name_args(organization, workspace)?;
        debug!("Deleting workspace {}/{}", organization, workspace);

        let builder = self.client.request(
            Method::DELETE,
            &workspace_by_name_path(organization, workspace),
        )?;
        self.client.send_no_content(builder).await
    }

    async fn delete_by_id(&self, workspace_id: &str) -> Result<()> {
        require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
        debug!("Deleting workspace: {}", workspace_id);

        let builder = self
            .client
            .request(Method::DELETE, &workspace_path(workspace_id))?;
        self.client.send_no_content(builder).await
    }

    async fn safe_delete(&self, organization: &str, workspace: &str) -> Result<()> {
        validate_name_args(organization, workspace)?;
        debug!("Safe-deleting workspace {}/{}", organization, workspace);

        let path = format!(
            "{}/actions/safe-delete",
            workspace_by_name_path(organization, workspace)
        );
        let builder = self.client.request(Method::POST, &path)?;
        self.client.send_no_content(builder).await
    }

    async fn safe_delete_by_id(&self, workspace_id: &str) -> Result<()> {
        require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
        debug!("Safe-deleting workspace: {}", workspace_id);

        let path = format!("{}/actions/safe-delete", workspace_path(workspace_id));
        let builder = self.client.request(Method::POST, &path)?;
        self.client.send_no_content(builder).await
    }

    async fn lock(&self, workspace_id: &str, options: &WorkspaceLockOptions) -> Result<Workspace> {
        require_id(workspace_id, ValidationError::InvalidWorkspaceId)?;
        debug!("Locking workspace: {}", workspace_id);

        let path = format!("{}/actions/lock", workspace_path(workspace_id));
        let body = serde_json::to_value(options)?;
        let builder = self.client.json_request(Method::POST, &path, &body)?;
        self.client
            .read(builder, &[])
            .await
            .map_err(|e| conflict_as(e, Rejection::WorkspaceLocked))
    }

    async fn unlock(&self, workspace_id: &str) -> Result<Workspace> {
        self.action(workspace_id, "unlock")
            .await
            .map_err(|e| conflict_as(e, Rejection::WorkspaceNotLocked))
    }

    async fn force_unlock(&self, workspace_id: &str) -> Result<Workspace> {
        self.action(workspace_id, "force-unlock")
            .await
            .map_err(|e| conflict_as(e, Rejection::WorkspaceNotLocked))
    }
}
