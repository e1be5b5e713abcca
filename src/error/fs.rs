//! File system errors

use std::path::Path;

use super::BootstrapError;

pub fn read_failed(path: &Path, err: &std::io::Error) -> BootstrapError {
    BootstrapError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

pub fn write_failed(path: &Path, err: &std::io::Error) -> BootstrapError {
    BootstrapError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
