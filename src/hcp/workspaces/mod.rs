//! Workspace module

mod api;
mod models;

pub use api::{Workspaces, WorkspacesService};
pub use models::{
    VcsRepo, VcsRepoOptions, Workspace, WorkspaceCreateOptions, WorkspaceInclude,
    WorkspaceListOptions, WorkspaceLockOptions, WorkspacePermissions, WorkspaceReadOptions,
    WorkspaceUpdateOptions,
};
