//! Project API operations

use std::future::Future;

use log::debug;
use reqwest::Method;

use crate::config::api;
use crate::error::{Result, ValidationError};
use crate::hcp::traits::{ListResponse, Validate};
use crate::hcp::validation::require_id;
use crate::hcp::TfeClient;

use super::models::{Project, ProjectCreateOptions, ProjectListOptions, ProjectUpdateOptions};

/// Project operations
pub trait Projects {
    /// List projects in an organization
    fn list(
        &self,
        organization: &str,
        options: Option<&ProjectListOptions>,
    ) -> impl Future<Output = Result<ListResponse<Project>>> + Send;

    /// Create a project in an organization
    fn create(
        &self,
        organization: &str,
        options: &ProjectCreateOptions,
    ) -> impl Future<Output = Result<Project>> + Send;

    /// Read a project by ID
    fn read(&self, project_id: &str) -> impl Future<Output = Result<Project>> + Send;

    /// Update a project
    fn update(
        &self,
        project_id: &str,
        options: &ProjectUpdateOptions,
    ) -> impl Future<Output = Result<Project>> + Send;

    /// Delete a project; the API refuses while it still holds workspaces
    fn delete(&self, project_id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// [`Projects`] backed by a [`TfeClient`]
#[derive(Debug, Clone, Copy)]
pub struct ProjectsService<'a> {
    client: &'a TfeClient,
}

impl TfeClient {
    /// Project operations
    pub fn projects(&self) -> ProjectsService<'_> {
        ProjectsService { client: self }
    }
}

fn organization_projects_path(organization: &str) -> String {
    format!(
        "{}/{}/{}",
        api::ORGANIZATIONS,
        urlencoding::encode(organization),
        api::PROJECTS
    )
}

fn project_path(project_id: &str) -> String {
    format!("{}/{}", api::PROJECTS, urlencoding::encode(project_id))
}

impl Projects for ProjectsService<'_> {
    async fn list(
        &self,
        organization: &str,
        options: Option<&ProjectListOptions>,
    ) -> Result<ListResponse<Project>> {
        require_id(organization, ValidationError::InvalidOrg)?;
        options.validate()?;
        debug!("Listing projects for organization: {}", organization);

        let mut builder = self
            .client
            .request(Method::GET, &organization_projects_path(organization))?;
        if let Some(options) = options {
            builder = builder.query(options);
        }
        self.client.read_list(builder, &[]).await
    }

    async fn create(&self, organization: &str, options: &ProjectCreateOptions) -> Result<Project> {
        require_id(organization, ValidationError::InvalidOrg)?;
        options.validate()?;
        debug!("Creating project '{}' in {}", options.name, organization);

        let builder = self.client.payload_request(
            Method::POST,
            &organization_projects_path(organization),
            options,
        )?;
        self.client.read(builder, &[]).await
    }

    async fn read(&self, project_id: &str) -> Result<Project> {
        require_id(project_id, ValidationError::InvalidProjectId)?;
        debug!("Fetching project: {}", project_id);

        let builder = self.client.request(Method::GET, &project_path(project_id))?;
        self.client.read(builder, &[]).await
    }

    async fn update(&self, project_id: &str, options: &ProjectUpdateOptions) -> Result<Project> {
        require_id(project_id, ValidationError::InvalidProjectId)?;
        options.validate()?;
        debug!("Updating project: {}", project_id);

        let builder =
            self.client
                .payload_request(Method::PATCH, &project_path(project_id), options)?;
        self.client.read(builder, &[]).await
    }

    async fn delete(&self, project_id: &str) -> Result<()> {
        require_id(project_id, ValidationError::InvalidProjectId)?;
        debug!("Deleting project: {}", project_id);

        let builder = self
            .client
            .request(Method::DELETE, &project_path(project_id))?;
        self.client.send_no_content(builder).await
    }
}
