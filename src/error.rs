//! Error types and the mapping from API responses to sentinel errors

use serde::Deserialize;
use thiserror::Error;

/// Request options rejected locally, before any network call
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationError {
    #[error("invalid value for organization")]
    InvalidOrg,
    #[error("invalid value for name")]
    InvalidName,
    #[error("name is required")]
    RequiredName,
    #[error("email is required")]
    RequiredEmail,
    #[error("invalid value for email")]
    InvalidEmail,
    #[error("invalid value for project ID")]
    InvalidProjectId,
    #[error("invalid value for workspace ID")]
    InvalidWorkspaceId,
    #[error("invalid value for workspace")]
    InvalidWorkspaceValue,
    #[error("workspace is required")]
    RequiredWorkspace,
    #[error("invalid value for run ID")]
    InvalidRunId,
    #[error("invalid value for team ID")]
    InvalidTeamId,
    #[error("invalid value for membership ID")]
    InvalidMembershipId,
    #[error("invalid value for variable ID")]
    InvalidVariableId,
    #[error("key is required")]
    RequiredKey,
    #[error("invalid value for key")]
    InvalidKey,
    #[error("category is required")]
    RequiredCategory,
    #[error("invalid value for configuration version ID")]
    InvalidConfigVersionId,
    #[error("invalid value for state version ID")]
    InvalidStateVersionId,
    #[error("MD5 is required")]
    RequiredMd5,
    #[error("invalid value for policy ID")]
    InvalidPolicyId,
    #[error("enforce or enforcement-level is required")]
    RequiredEnforce,
    #[error("enforcement path is required")]
    RequiredEnforcementPath,
    #[error("enforcement mode is required")]
    RequiredEnforcementMode,
    #[error("query cannot be empty for OPA policies")]
    RequiredQuery,
    #[error("invalid value for include field")]
    InvalidIncludeValue,
    #[error("invalid value for page size")]
    InvalidPageSize,
    #[error("invalid smtp auth type")]
    InvalidSmtpAuth,
    #[error("invalid smtp configuration: username is required for the selected auth type")]
    InvalidSmtpConfiguration,
    #[error("upload URL is required")]
    RequiredUploadUrl,
}

/// Server-reported conditions recognised from the JSON:API error detail
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    #[error("invalid value for include field")]
    InvalidIncludeValue,
    #[error("workspace already locked")]
    WorkspaceLocked,
    #[error("workspace already unlocked")]
    WorkspaceNotLocked,
    #[error("unable to unlock workspace locked by run")]
    WorkspaceLockedByRun,
    #[error("unable to unlock workspace locked by team")]
    WorkspaceLockedByTeam,
    #[error("workspace is still being processed")]
    WorkspaceStillProcessing,
    #[error("workspace is not safe to delete")]
    WorkspaceNotSafeToDelete,
    #[error("name has already been taken")]
    NameTaken,
    #[error("workload provider name required")]
    WorkloadProviderNameRequired,
}

/// Detail fragments (lowercase) mapped to sentinels, most specific first
const REJECTIONS: &[(&str, Rejection)] = &[
    ("invalid include parameter", Rejection::InvalidIncludeValue),
    ("locked by run", Rejection::WorkspaceLockedByRun),
    ("locked by team", Rejection::WorkspaceLockedByTeam),
    ("is already locked", Rejection::WorkspaceLocked),
    ("is not locked", Rejection::WorkspaceNotLocked),
    ("already unlocked", Rejection::WorkspaceNotLocked),
    ("still being processed", Rejection::WorkspaceStillProcessing),
    ("not safe to delete", Rejection::WorkspaceNotSafeToDelete),
    ("has already been taken", Rejection::NameTaken),
    ("workload provider name", Rejection::WorkloadProviderNameRequired),
];

/// Custom error type for TFE operations
#[derive(Error, Debug)]
pub enum TfeError {
    /// Options failed local validation; no request was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// 401 from the API
    #[error("unauthorized")]
    Unauthorized,
    /// 403 from the API
    #[error("forbidden")]
    Forbidden,
    /// 404 from the API, for any resource type
    #[error("resource not found")]
    ResourceNotFound,
    /// The API rejected the request for a known reason
    #[error(transparent)]
    Rejected(#[from] Rejection),
    /// 400/422 with an error payload that matched no known reason
    #[error("invalid request (status {status}): {detail}")]
    InvalidRequest { status: u16, detail: String },
    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The overall request deadline elapsed
    #[error("request timed out")]
    Timeout,
    /// The response body could not be understood
    #[error("failed to decode response: {message}")]
    Decode { message: String, body: String },
    /// The request body could not be built
    #[error("failed to encode request: {0}")]
    Encode(String),
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
    /// Reading or writing caller-provided data failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Token not found in any source
    #[error("{0}")]
    TokenNotFound(String),
    /// Failed to read or parse credentials file
    #[error("{0}")]
    Credentials(String),
}

impl TfeError {
    /// True for the shared not-found sentinel
    pub fn is_not_found(&self) -> bool {
        matches!(self, TfeError::ResourceNotFound)
    }

    /// HTTP status behind the error, when the server produced it
    pub fn status(&self) -> Option<u16> {
        match self {
            TfeError::Unauthorized => Some(401),
            TfeError::Forbidden => Some(403),
            TfeError::ResourceNotFound => Some(404),
            TfeError::InvalidRequest { status, .. } | TfeError::Api { status, .. } => Some(*status),
            TfeError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn decode(err: serde_json::Error, body: &[u8]) -> Self {
        TfeError::Decode {
            message: err.to_string(),
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

impl PartialEq<ValidationError> for TfeError {
    fn eq(&self, other: &ValidationError) -> bool {
        matches!(self, TfeError::Validation(v) if v == other)
    }
}

impl PartialEq<Rejection> for TfeError {
    fn eq(&self, other: &Rejection) -> bool {
        matches!(self, TfeError::Rejected(r) if r == other)
    }
}

impl From<serde_json::Error> for TfeError {
    fn from(err: serde_json::Error) -> Self {
        TfeError::Encode(err.to_string())
    }
}

/// Result type alias for TFE operations
pub type Result<T> = std::result::Result<T, TfeError>;

#[derive(Deserialize, Debug)]
struct ErrorDocument {
    #[serde(default)]
    errors: Vec<ErrorObject>,
}

#[derive(Deserialize, Debug)]
struct ErrorObject {
    title: Option<String>,
    detail: Option<String>,
}

impl ErrorObject {
    fn message(&self) -> String {
        match (self.title.as_deref(), self.detail.as_deref()) {
            (Some(t), Some(d)) if !d.is_empty() => format!("{}\n\n{}", t, d),
            (Some(t), _) => t.to_string(),
            (None, Some(d)) => d.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// Look up the sentinel matching an error detail, if any
pub(crate) fn match_rejection(detail: &str) -> Option<Rejection> {
    let detail = detail.to_lowercase();
    REJECTIONS
        .iter()
        .find(|(fragment, _)| detail.contains(fragment))
        .map(|(_, rejection)| *rejection)
}

/// Map a non-2xx status and its raw body onto the error taxonomy
pub(crate) fn error_from_response(status: u16, body: &str) -> TfeError {
    match status {
        401 => return TfeError::Unauthorized,
        403 => return TfeError::Forbidden,
        404 => return TfeError::ResourceNotFound,
        _ => {}
    }

    let errors = serde_json::from_str::<ErrorDocument>(body)
        .map(|doc| doc.errors)
        .unwrap_or_default();

    if errors.is_empty() {
        return TfeError::Api {
            status,
            message: body.to_string(),
        };
    }

    // only client errors name a known condition
    let rejection = if (400..500).contains(&status) {
        errors.iter().find_map(|e| {
            e.detail
                .as_deref()
                .and_then(match_rejection)
                .or_else(|| e.title.as_deref().and_then(match_rejection))
        })
    } else {
        None
    };
    if let Some(rejection) = rejection {
        return TfeError::Rejected(rejection);
    }

    if status == 400 || status == 422 {
        let first = &errors[0];
        let detail = first
            .detail
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| first.message());
        return TfeError::InvalidRequest { status, detail };
    }

    TfeError::Api {
        status,
        message: errors
            .iter()
            .map(ErrorObject::message)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_body(title: &str, detail: &str) -> String {
        serde_json::json!({
            "errors": [{ "status": "422", "title": title, "detail": detail }]
        })
        .to_string()
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            TfeError::from(ValidationError::InvalidOrg).to_string(),
            "invalid value for organization"
        );
        assert_eq!(ValidationError::RequiredName.to_string(), "name is required");
    }

    #[test]
    fn test_sentinel_comparison() {
        let err = TfeError::from(ValidationError::InvalidWorkspaceId);
        assert!(err == ValidationError::InvalidWorkspaceId);
        assert!(err != ValidationError::InvalidOrg);

        let err = TfeError::Rejected(Rejection::WorkspaceLocked);
        assert!(err == Rejection::WorkspaceLocked);
        assert!(err != ValidationError::InvalidOrg);
    }

    #[test]
    fn test_status_mapping_auth_and_not_found() {
        assert!(matches!(error_from_response(401, ""), TfeError::Unauthorized));
        assert!(matches!(error_from_response(403, ""), TfeError::Forbidden));
        assert!(error_from_response(404, "{}").is_not_found());
    }

    #[test]
    fn test_422_with_unknown_detail_is_invalid_request() {
        let body = error_body("invalid attribute", "Serial is missing");
        match error_from_response(422, &body) {
            TfeError::InvalidRequest { status, detail } => {
                assert_eq!(status, 422);
                assert_eq!(detail, "Serial is missing");
            }
            other => panic!("Expected InvalidRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_known_detail_maps_to_rejection() {
        let body = error_body("invalid attribute", "Name has already been taken");
        assert!(error_from_response(422, &body) == Rejection::NameTaken);

        let body = error_body("bad request", "Invalid include parameter");
        assert!(error_from_response(400, &body) == Rejection::InvalidIncludeValue);
    }

    #[test]
    fn test_server_error_detail_is_not_a_rejection() {
        let body = serde_json::json!({
            "errors": [{ "status": "500", "title": "oops", "detail": "Name has already been taken" }]
        })
        .to_string();
        match error_from_response(500, &body) {
            TfeError::Api { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("already been taken"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_conflict_lock_details() {
        let locked = error_body("conflict", "Workspace ws-123 is already locked");
        assert!(error_from_response(409, &locked) == Rejection::WorkspaceLocked);

        let by_run = error_body("conflict", "Unable to unlock workspace: locked by run run-1");
        assert!(error_from_response(409, &by_run) == Rejection::WorkspaceLockedByRun);

        let not_locked = error_body("conflict", "Workspace is not locked");
        assert!(error_from_response(409, &not_locked) == Rejection::WorkspaceNotLocked);
    }

    #[test]
    fn test_other_status_keeps_raw_body() {
        match error_from_response(502, "<html>bad gateway</html>") {
            TfeError::Api { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("bad gateway"));
            }
            other => panic!("Expected Api, got {:?}", other),
        }
    }

    #[test]
    fn test_other_status_with_payload_joins_messages() {
        let body = serde_json::json!({
            "errors": [
                { "title": "conflict", "detail": "first" },
                { "title": "conflict" }
            ]
        })
        .to_string();
        match error_from_response(409, &body) {
            TfeError::Api { message, .. } => {
                assert_eq!(message, "conflict\n\nfirst\nconflict");
            }
            other => panic!("Expected Api, got {:?}", other),
        }
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(TfeError::ResourceNotFound.status(), Some(404));
        assert_eq!(TfeError::from(ValidationError::InvalidOrg).status(), None);
        assert_eq!(
            TfeError::Api {
                status: 500,
                message: String::new()
            }
            .status(),
            Some(500)
        );
    }

    #[test]
    fn test_decode_error_keeps_body() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        match TfeError::decode(json_err, b"not json") {
            TfeError::Decode { body, message } => {
                assert_eq!(body, "not json");
                assert!(!message.is_empty());
            }
            other => panic!("Expected Decode, got {:?}", other),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TfeError>();
    }
}
