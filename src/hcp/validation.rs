//! Pure validators for identifiers and option values

use serde::Serialize;

use crate::config::api;
use crate::error::ValidationError;
use crate::hcp::traits::Validate;

/// Non-empty string
pub fn valid_string(v: &str) -> bool {
    !v.is_empty()
}

/// Optional string that, when present, is non-empty
pub fn valid_optional_string(v: Option<&str>) -> bool {
    v.map_or(true, valid_string)
}

/// Identifier made of `[A-Za-z0-9._-]` only (organization names, resource IDs)
pub fn valid_string_id(v: &str) -> bool {
    !v.is_empty()
        && v
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
}

/// Loose e-mail shape check: `local@domain` with a dot in the domain
pub fn valid_email(v: &str) -> bool {
    match v.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !v.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Check an identifier, returning `err` when it is malformed
pub(crate) fn require_id(v: &str, err: ValidationError) -> Result<(), ValidationError> {
    if valid_string_id(v) {
        Ok(())
    } else {
        Err(err)
    }
}

/// Pagination options shared by every list endpoint
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Page to fetch (1-based)
    #[serde(rename = "page[number]", skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Items per page, at most 100
    #[serde(rename = "page[size]", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl ListOptions {
    /// Options for a specific page
    pub fn page(number: u32, size: u32) -> Self {
        Self {
            page_number: Some(number),
            page_size: Some(size),
        }
    }
}

impl Validate for ListOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.page_size {
            Some(size) if size == 0 || size > api::MAX_PAGE_SIZE => {
                Err(ValidationError::InvalidPageSize)
            }
            _ => Ok(()),
        }
    }
}

/// Serialize an optional list as one comma-separated query value
pub(crate) fn comma_separated<S, T>(
    values: &Option<Vec<T>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: AsRef<str>,
{
    match values {
        Some(values) => {
            let joined = values
                .iter()
                .map(|v| v.as_ref())
                .collect::<Vec<_>>()
                .join(",");
            serializer.serialize_str(&joined)
        }
        None => serializer.serialize_none(),
    }
}
