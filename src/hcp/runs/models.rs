//! Run data models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::hcp::configuration_versions::ConfigurationVersion;
use crate::hcp::jsonapi::{Payload, Relation};
use crate::hcp::traits::{TfeResource, Validate};
use crate::hcp::validation::{comma_separated, valid_string_id, ListOptions};
use crate::hcp::workspaces::Workspace;

/// Run lifecycle states reported by the API
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Pending,
    Fetching,
    FetchingCompleted,
    PrePlanRunning,
    PrePlanCompleted,
    Queuing,
    PlanQueued,
    Planning,
    Planned,
    CostEstimating,
    CostEstimated,
    PolicyChecking,
    PolicyOverride,
    PolicySoftFailed,
    PolicyChecked,
    Confirmed,
    PostPlanRunning,
    PostPlanCompleted,
    PlannedAndFinished,
    PlannedAndSaved,
    ApplyQueued,
    Applying,
    Applied,
    Discarded,
    Errored,
    Canceled,
    ForceCanceled,
    /// A status this client does not know yet
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Fetching => "fetching",
            RunStatus::FetchingCompleted => "fetching_completed",
            RunStatus::PrePlanRunning => "pre_plan_running",
            RunStatus::PrePlanCompleted => "pre_plan_completed",
            RunStatus::Queuing => "queuing",
            RunStatus::PlanQueued => "plan_queued",
            RunStatus::Planning => "planning",
            RunStatus::Planned => "planned",
            RunStatus::CostEstimating => "cost_estimating",
            RunStatus::CostEstimated => "cost_estimated",
            RunStatus::PolicyChecking => "policy_checking",
            RunStatus::PolicyOverride => "policy_override",
            RunStatus::PolicySoftFailed => "policy_soft_failed",
            RunStatus::PolicyChecked => "policy_checked",
            RunStatus::Confirmed => "confirmed",
            RunStatus::PostPlanRunning => "post_plan_running",
            RunStatus::PostPlanCompleted => "post_plan_completed",
            RunStatus::PlannedAndFinished => "planned_and_finished",
            RunStatus::PlannedAndSaved => "planned_and_saved",
            RunStatus::ApplyQueued => "apply_queued",
            RunStatus::Applying => "applying",
            RunStatus::Applied => "applied",
            RunStatus::Discarded => "discarded",
            RunStatus::Errored => "errored",
            RunStatus::Canceled => "canceled",
            RunStatus::ForceCanceled => "force_canceled",
            RunStatus::Unknown => "unknown",
        }
    }

    /// Check if this is a non-final (active) status
    ///
    /// Final statuses are: applied, discarded, errored, canceled, force_canceled,
    /// planned_and_finished, planned_and_saved
    pub fn is_non_final(&self) -> bool {
        !matches!(
            self,
            RunStatus::Applied
                | RunStatus::Discarded
                | RunStatus::Errored
                | RunStatus::Canceled
                | RunStatus::ForceCanceled
                | RunStatus::PlannedAndFinished
                | RunStatus::PlannedAndSaved
        )
    }
}

impl AsRef<str> for RunStatus {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        serde_json::from_value::<RunStatus>(serde_json::Value::String(lowered))
            .ok()
            .filter(|status| *status != RunStatus::Unknown)
            .ok_or_else(|| format!("Unknown run status: {}", s))
    }
}

/// Run data from TFE API
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    pub message: String,
    pub source: Option<String>,
    pub trigger_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub has_changes: bool,
    pub is_destroy: bool,
    pub auto_apply: bool,
    pub plan_only: bool,
    pub refresh: bool,
    pub refresh_only: bool,
    pub allow_empty_apply: bool,
    pub terraform_version: Option<String>,
    pub replace_addrs: Vec<String>,
    pub target_addrs: Vec<String>,
    pub actions: Option<RunActions>,
    pub permissions: Option<RunPermissions>,

    pub workspace: Option<Box<Workspace>>,
    pub configuration_version: Option<Box<ConfigurationVersion>>,
    pub plan: Option<Box<Plan>>,
    pub apply: Option<Box<Apply>>,
}

impl TfeResource for Run {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.message
    }
}

impl Run {
    /// Workspace ID if the relationship was present
    pub fn workspace_id(&self) -> Option<&str> {
        self.workspace.as_deref().map(|w| w.id.as_str())
    }
}

/// Actions currently allowed on a run
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct RunActions {
    pub is_cancelable: bool,
    pub is_confirmable: bool,
    pub is_discardable: bool,
    pub is_force_cancelable: bool,
}

/// What the current token may do with the run
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct RunPermissions {
    pub can_apply: bool,
    pub can_cancel: bool,
    pub can_discard: bool,
    pub can_force_cancel: bool,
    pub can_force_execute: bool,
}

/// Plan phase of a run
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Plan {
    pub id: String,
    pub status: String,
    pub has_changes: bool,
    pub resource_additions: i32,
    pub resource_changes: i32,
    pub resource_destructions: i32,
    pub resource_imports: i32,
    pub log_read_url: Option<String>,
}

/// Apply phase of a run
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Apply {
    pub id: String,
    pub status: String,
    pub resource_additions: i32,
    pub resource_changes: i32,
    pub resource_destructions: i32,
    pub resource_imports: i32,
    pub log_read_url: Option<String>,
}

/// Related resources that can be requested with `include`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunInclude {
    Plan,
    Apply,
    ConfigurationVersion,
    ConfigurationVersionIngressAttributes,
    CreatedBy,
    Workspace,
}

impl RunInclude {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Apply => "apply",
            Self::ConfigurationVersion => "configuration_version",
            Self::ConfigurationVersionIngressAttributes => {
                "configuration_version.ingress_attributes"
            }
            Self::CreatedBy => "created_by",
            Self::Workspace => "workspace",
        }
    }

    const ALL: [RunInclude; 6] = [
        Self::Plan,
        Self::Apply,
        Self::ConfigurationVersion,
        Self::ConfigurationVersionIngressAttributes,
        Self::CreatedBy,
        Self::Workspace,
    ];
}

impl AsRef<str> for RunInclude {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RunInclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunInclude {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|inc| inc.as_str() == s)
            .ok_or(ValidationError::InvalidIncludeValue)
    }
}

/// Query options for listing runs of a workspace
#[derive(Serialize, Debug, Clone, Default)]
pub struct RunListOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    #[serde(
        rename = "filter[status]",
        serialize_with = "comma_separated",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<Vec<RunStatus>>,
    /// Status group: `non_final`, `final` or `discardable`
    #[serde(rename = "filter[status_group]", skip_serializing_if = "Option::is_none")]
    pub status_group: Option<String>,
    /// e.g. `plan_only`, `plan_and_apply`, `destroy`
    #[serde(rename = "filter[operation]", skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// e.g. `tfe-api`, `tfe-ui`, `terraform+cloud`
    #[serde(rename = "filter[source]", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Search by run ID, message, commit SHA or author
    #[serde(rename = "search[basic]", skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<RunInclude>>,
}

impl RunListOptions {
    /// Only runs that are still in progress
    pub fn non_final() -> Self {
        Self {
            status_group: Some("non_final".to_string()),
            ..Self::default()
        }
    }
}

impl Validate for RunListOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        self.list.validate()
    }
}

/// Query options for reading one run
#[derive(Serialize, Debug, Clone, Default)]
pub struct RunReadOptions {
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<RunInclude>>,
}

/// A run-scoped variable override
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RunVariable {
    pub key: String,
    /// HCL-encoded value, e.g. `"\"text\""` or `"42"`
    pub value: String,
}

/// Options for queuing a run
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct RunCreateOptions {
    /// Workspace to run in (required)
    #[serde(skip)]
    pub workspace_id: String,
    /// Configuration to run; defaults to the workspace's latest
    #[serde(skip)]
    pub configuration_version_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_destroy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_apply: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_empty_apply: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terraform_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_addrs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_addrs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<RunVariable>>,
}

impl RunCreateOptions {
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            ..Self::default()
        }
    }
}

impl Payload for RunCreateOptions {
    fn resource_type(&self) -> &'static str {
        "runs"
    }

    fn relationships(&self) -> Vec<(&'static str, Relation)> {
        let mut relationships = vec![(
            "workspace",
            Relation::one("workspaces", self.workspace_id.clone()),
        )];
        if let Some(cv) = &self.configuration_version_id {
            relationships.push((
                "configuration-version",
                Relation::one("configuration-versions", cv.clone()),
            ));
        }
        relationships
    }
}

impl Validate for RunCreateOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.workspace_id.is_empty() {
            return Err(ValidationError::RequiredWorkspace);
        }
        if !valid_string_id(&self.workspace_id) {
            return Err(ValidationError::InvalidWorkspaceId);
        }
        if let Some(cv) = &self.configuration_version_id {
            if !valid_string_id(cv) {
                return Err(ValidationError::InvalidConfigVersionId);
            }
        }
        Ok(())
    }
}

/// Body of the apply, cancel, force-cancel and discard actions
#[derive(Serialize, Debug, Clone, Default)]
pub struct RunActionOptions {
    /// Recorded in the run's timeline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hcp::jsonapi;

    #[test]
    fn test_run_status_display_and_parse() {
        assert_eq!(RunStatus::PlannedAndFinished.to_string(), "planned_and_finished");
        assert_eq!("APPLIED".parse::<RunStatus>(), Ok(RunStatus::Applied));
        assert!("bogus".parse::<RunStatus>().is_err());
    }

    #[test]
    fn test_run_status_unknown_value() {
        let status: RunStatus = serde_json::from_str("\"brand_new_state\"").unwrap();
        assert_eq!(status, RunStatus::Unknown);
        assert!(status.is_non_final());
    }

    #[test]
    fn test_is_non_final() {
        assert!(RunStatus::Planning.is_non_final());
        assert!(RunStatus::PolicyOverride.is_non_final());
        assert!(!RunStatus::Applied.is_non_final());
        assert!(!RunStatus::ForceCanceled.is_non_final());
    }

    #[test]
    fn test_run_with_included_plan() {
        let body = serde_json::json!({
            "data": {
                "id": "run-1",
                "type": "runs",
                "attributes": {
                    "status": "planned",
                    "message": "Triggered via API",
                    "has-changes": true,
                    "actions": { "is-cancelable": false, "is-discardable": true }
                },
                "relationships": {
                    "plan": { "data": { "id": "plan-1", "type": "plans" } },
                    "workspace": { "data": { "id": "ws-1", "type": "workspaces" } },
                    "apply": { "links": { "related": "/api/v2/runs/run-1/apply" } }
                }
            },
            "included": [{
                "id": "plan-1",
                "type": "plans",
                "attributes": { "status": "finished", "has-changes": true, "resource-additions": 3 }
            }]
        });

        let run: Run = jsonapi::decode_one(body.to_string().as_bytes(), &[]).unwrap();
        assert_eq!(run.status, RunStatus::Planned);
        assert!(run.actions.as_ref().unwrap().is_discardable);
        assert_eq!(run.plan.as_ref().unwrap().resource_additions, 3);
        assert_eq!(run.workspace_id(), Some("ws-1"));
        assert!(run.apply.is_none());
    }

    #[test]
    fn test_create_options_validation() {
        assert_eq!(
            RunCreateOptions::default().validate(),
            Err(ValidationError::RequiredWorkspace)
        );
        assert_eq!(
            RunCreateOptions::new("ws 1").validate(),
            Err(ValidationError::InvalidWorkspaceId)
        );
        let options = RunCreateOptions {
            configuration_version_id: Some(String::new()),
            ..RunCreateOptions::new("ws-1")
        };
        assert_eq!(options.validate(), Err(ValidationError::InvalidConfigVersionId));
    }

    #[test]
    fn test_create_payload() {
        let options = RunCreateOptions {
            message: Some("deploy".to_string()),
            configuration_version_id: Some("cv-1".to_string()),
            ..RunCreateOptions::new("ws-1")
        };
        let doc = jsonapi::encode(&options).unwrap();
        assert_eq!(
            doc,
            serde_json::json!({
                "data": {
                    "type": "runs",
                    "attributes": { "message": "deploy" },
                    "relationships": {
                        "workspace": { "data": { "type": "workspaces", "id": "ws-1" } },
                        "configuration-version": {
                            "data": { "type": "configuration-versions", "id": "cv-1" }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_list_options_status_filter() {
        let options = RunListOptions {
            status: Some(vec![RunStatus::Planning, RunStatus::Applying]),
            ..Default::default()
        };
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value["filter[status]"], "planning,applying");
    }
}
