//! Repository cloning

use std::path::Path;

use git2::build::RepoBuilder;
use git2::{FetchOptions, RemoteCallbacks, Repository};
use tracing::debug;

use super::auth::setup_auth_callbacks;
use super::error::interpret_git_error;
use super::url;
use crate::error::{Result, git as git_error};

/// Clone `url` into `target`, checking out `branch` (remote HEAD when `None`).
///
/// Remote clones are shallow; local ones are not, since libgit2 cannot
/// shallow-clone a path.
pub fn clone(
    source: &str,
    target: &Path,
    branch: Option<&str>,
    token: Option<String>,
) -> Result<Repository> {
    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks, token);

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    if !url::is_local(source) {
        fetch_options.depth(1);
    }

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);
    if let Some(branch) = branch {
        builder.branch(branch);
    }

    let clone_url = url::for_clone(source);
    debug!(url = %url::redact(source), target = %target.display(), "cloning");
    builder
        .clone(&clone_url, target)
        .map_err(|e| git_error::clone_failed(url::redact(source), interpret_git_error(&e)))
}
