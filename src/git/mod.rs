//! Optional repository checkout
//!
//! Clones the project into the working directory before the bootstrap
//! proper. Authentication is a token read from a named environment
//! variable, then git's native credential system.

mod auth;
mod clone;
mod error;
pub mod url;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::CheckoutConfig;
use crate::error::{Result, git as git_error};

/// What a checkout produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    /// Source URL with any embedded credential removed
    pub url: String,
    pub branch: Option<String>,
    pub head: String,
    pub target: PathBuf,
}

impl fmt::Display for CheckoutSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)?;
        if let Some(branch) = &self.branch {
            write!(f, " ({branch})")?;
        }
        write!(f, " at {} into {}", self.head, self.target.display())
    }
}

/// Read the access token named by `token_env` through `lookup`.
///
/// No variable configured means no token. A configured but unset or
/// empty variable is an error: the clone would otherwise proceed without
/// the credential it was meant to use.
pub fn resolve_token(
    checkout: &CheckoutConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<String>> {
    let Some(var) = checkout.token_env.as_deref() else {
        return Ok(None);
    };
    match lookup(var) {
        Some(token) if !token.trim().is_empty() => Ok(Some(token)),
        _ => Err(git_error::credential_missing(var)),
    }
}

/// Clone the configured repository into `target`
pub fn checkout(checkout: &CheckoutConfig, target: &Path) -> Result<CheckoutSummary> {
    let token = resolve_token(checkout, |var| std::env::var(var).ok())?;
    let repo = clone::clone(&checkout.url, target, checkout.branch.as_deref(), token)?;

    let head = repo.head()?.peel_to_commit()?.id().to_string();
    let summary = CheckoutSummary {
        url: url::redact(&checkout.url).into_owned(),
        branch: checkout.branch.clone(),
        head: head.chars().take(12).collect(),
        target: target.to_path_buf(),
    };
    info!(checkout = %summary, "repository checked out");
    Ok(summary)
}
