//! Configuration errors

use super::BootstrapError;

pub fn not_found(path: impl Into<String>) -> BootstrapError {
    BootstrapError::ConfigNotFound { path: path.into() }
}

pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> BootstrapError {
    BootstrapError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> BootstrapError {
    BootstrapError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

pub fn invalid(message: impl Into<String>) -> BootstrapError {
    BootstrapError::ConfigInvalid {
        message: message.into(),
    }
}

pub fn invalid_package(spec: impl Into<String>, reason: impl Into<String>) -> BootstrapError {
    BootstrapError::InvalidPackageSpec {
        spec: spec.into(),
        reason: reason.into(),
    }
}
