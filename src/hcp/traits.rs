//! Common traits for TFE resources and request options

use crate::error::ValidationError;
use crate::hcp::Pagination;

/// Common trait for named TFE resources (organizations, projects, workspaces, ...)
///
/// This trait provides a unified interface for resource identification
/// and matching.
pub trait TfeResource {
    /// Get the resource ID
    fn id(&self) -> &str;

    /// Get the human-readable name
    fn name(&self) -> &str;

    /// Check if the resource matches by name or ID
    ///
    /// Default implementation checks for exact match on either field.
    fn matches(&self, input: &str) -> bool {
        self.id() == input || self.name() == input
    }
}

/// Local, side-effect free checks run before a request is built
pub trait Validate {
    /// Return the first rule the value breaks
    fn validate(&self) -> Result<(), ValidationError>;
}

impl<T: Validate + ?Sized> Validate for &T {
    fn validate(&self) -> Result<(), ValidationError> {
        (**self).validate()
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Some(inner) => inner.validate(),
            None => Ok(()),
        }
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone)]
pub struct ListResponse<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Pagination envelope, `None` when the endpoint sent no pagination metadata
    pub pagination: Option<Pagination>,
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: None,
        }
    }
}

impl<T> ListResponse<T> {
    /// Page number the server actually returned
    pub fn current_page(&self) -> Option<u32> {
        self.pagination.as_ref().map(|p| p.current_page)
    }

    /// Page to request next, if there is one
    pub fn next_page(&self) -> Option<u32> {
        self.pagination.as_ref().and_then(|p| p.next_page)
    }

    /// Number of pages reported by the server (1 when unpaginated)
    pub fn total_pages(&self) -> u32 {
        self.pagination.as_ref().map_or(1, |p| p.total_pages)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T: TfeResource> ListResponse<T> {
    /// Find an item on this page by ID or name
    pub fn find(&self, input: &str) -> Option<&T> {
        self.items.iter().find(|item| item.matches(input))
    }
}

impl<T> IntoIterator for ListResponse<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
