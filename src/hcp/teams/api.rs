//! Team API operations

use std::future::Future;

use log::debug;
use reqwest::Method;

use crate::config::api;
use crate::error::{Result, ValidationError};
use crate::hcp::jsonapi::required_relationships;
use crate::hcp::traits::{ListResponse, Validate};
use crate::hcp::validation::require_id;
use crate::hcp::TfeClient;

use super::models::{Team, TeamCreateOptions, TeamListOptions, TeamUpdateOptions};

/// Team operations
pub trait Teams {
    /// List teams in an organization
    fn list(
        &self,
        organization: &str,
        options: Option<&TeamListOptions>,
    ) -> impl Future<Output = Result<ListResponse<Team>>> + Send;

    /// Create a team in an organization
    fn create(
        &self,
        organization: &str,
        options: &TeamCreateOptions,
    ) -> impl Future<Output = Result<Team>> + Send;

    /// Read a team by ID
    fn read(&self, team_id: &str) -> impl Future<Output = Result<Team>> + Send;

    /// Update a team
    fn update(
        &self,
        team_id: &str,
        options: &TeamUpdateOptions,
    ) -> impl Future<Output = Result<Team>> + Send;

    /// Delete a team
    fn delete(&self, team_id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// [`Teams`] backed by a [`TfeClient`]
#[derive(Debug, Clone, Copy)]
pub struct TeamsService<'a> {
    client: &'a TfeClient,
}

impl TfeClient {
    /// Team operations
    pub fn teams(&self) -> TeamsService<'_> {
        TeamsService { client: self }
    }
}

fn organization_teams_path(organization: &str) -> String {
    format!(
        "{}/{}/{}",
        api::ORGANIZATIONS,
        urlencoding::encode(organization),
        api::TEAMS
    )
}

fn team_path(team_id: &str) -> String {
    format!("{}/{}", api::TEAMS, urlencoding::encode(team_id))
}

impl Teams for TeamsService<'_> {
    async fn list(
        &self,
        organization: &str,
        options: Option<&TeamListOptions>,
    ) -> Result<ListResponse<Team>> {
        require_id(organization, ValidationError::InvalidOrg)?;
        options.validate()?;
        debug!("Listing teams for organization: {}", organization);

        let mut builder = self
            .client
            .request(Method::GET, &organization_teams_path(organization))?;
        let mut required = Vec::new();
        if let Some(options) = options {
            builder = builder.query(options);
            required = required_relationships(options.include.as_deref().unwrap_or_default());
        }
        self.client.read_list(builder, &required).await
    }

    async fn create(&self, organization: &str, options: &TeamCreateOptions) -> Result<Team> {
        require_id(organization, ValidationError::InvalidOrg)?;
        options.validate()?;
        debug!("Creating team '{}' in {}", options.name, organization);

        let builder = self.client.payload_request(
            Method::POST,
            &organization_teams_path(organization),
            options,
        )?;
        self.client.read(builder, &[]).await
    }

    async fn read(&self, team_id: &str) -> Result<Team> {
        require_id(team_id, ValidationError::InvalidTeamId)?;
        debug!("Fetching team: {}", team_id);

        let builder = self.client.request(Method::GET, &team_path(team_id))?;
        self.client.read(builder, &[]).await
    }

    async fn update(&self, team_id: &str, options: &TeamUpdateOptions) -> Result<Team> {
        require_id(team_id, ValidationError::InvalidTeamId)?;
        options.validate()?;
        debug!("Updating team: {}", team_id);

        let builder = self
            .client
            .payload_request(Method::PATCH, &team_path(team_id), options)?;
        self.client.read(builder, &[]).await
    }

    async fn delete(&self, team_id: &str) -> Result<()> {
        require_id(team_id, ValidationError::InvalidTeamId)?;
        debug!("Deleting team: {}", team_id);

        let builder = self.client.request(Method::DELETE, &team_path(team_id))?;
        self.client.send_no_content(builder).await
    }
}
