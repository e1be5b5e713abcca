//! Checkout errors

use super::BootstrapError;

pub fn clone_failed(url: impl Into<String>, reason: impl Into<String>) -> BootstrapError {
    BootstrapError::GitCloneFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

pub fn credential_missing(var: impl Into<String>) -> BootstrapError {
    BootstrapError::CredentialMissing { var: var.into() }
}
