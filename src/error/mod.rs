//! Error types and handling for envstrap
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`config`]: Configuration errors
//! - [`step`]: Bootstrap step and external tool errors
//! - [`git`]: Checkout errors
//! - [`fs`]: File system errors

pub mod config;
pub mod fs;
pub mod git;
pub mod step;

use miette::Diagnostic;
use thiserror::Error;

use crate::bootstrap::Step;

/// Main error type for envstrap operations
#[derive(Error, Diagnostic, Debug)]
pub enum BootstrapError {
    // Working directory errors
    #[error("Working directory not found: {path}")]
    #[diagnostic(
        code(envstrap::workdir::not_found),
        help("Create the directory, pass --workdir, or enable the checkout step with --checkout")
    )]
    WorkdirNotFound { path: String },

    // Step errors
    #[error("Tool not found: {program}")]
    #[diagnostic(
        code(envstrap::step::tool_not_found),
        help("Install the tool or point envstrap at it (e.g. --python /usr/bin/python3)")
    )]
    ToolNotFound { program: String, reason: String },

    #[error("Step '{step}' failed: {command} exited with {}", display_code(.code))]
    #[diagnostic(code(envstrap::step::failed))]
    StepFailed {
        step: Step,
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{command} exited with {}", display_code(.code))]
    #[diagnostic(code(envstrap::step::tool_failed))]
    ToolFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Step '{step}' cannot run from stage '{stage}'")]
    #[diagnostic(code(envstrap::step::out_of_order))]
    StepOutOfOrder { step: Step, stage: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(envstrap::config::not_found),
        help("Run 'envstrap init' to write a default envstrap.yaml")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(envstrap::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(envstrap::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(envstrap::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Configuration file already exists: {path}")]
    #[diagnostic(
        code(envstrap::config::exists),
        help("Pass --force to overwrite it")
    )]
    ConfigAlreadyExists { path: String },

    #[error("Invalid package spec '{spec}': {reason}")]
    #[diagnostic(
        code(envstrap::config::invalid_package),
        help("Package specs look like 'name', 'name==1.2.3' or 'name[extra]>=1.0'")
    )]
    InvalidPackageSpec { spec: String, reason: String },

    // Checkout errors
    #[error("Credential variable '{var}' is not set")]
    #[diagnostic(
        code(envstrap::git::credential_missing),
        help("Export the variable named by checkout.token_env before running with --checkout")
    )]
    CredentialMissing { var: String },

    #[error("Checkout is not configured")]
    #[diagnostic(
        code(envstrap::git::not_configured),
        help("Add a 'checkout' section with at least 'url' to envstrap.yaml")
    )]
    CheckoutNotConfigured,

    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(envstrap::git::clone_failed),
        help("Check that the URL and branch are correct and you have access to the repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Git operation failed: {message}")]
    #[diagnostic(code(envstrap::git::operation_failed))]
    GitOperationFailed { message: String },

    // Verification errors
    #[error("Environment not found: {path}")]
    #[diagnostic(
        code(envstrap::verify::env_not_found),
        help("Run 'envstrap run' to create it")
    )]
    EnvironmentNotFound { path: String },

    #[error("Environment is missing {count} expected package(s)")]
    #[diagnostic(
        code(envstrap::verify::failed),
        help("Run 'envstrap run' to install them")
    )]
    VerificationFailed { count: usize },

    #[error("Unexpected installer output: {reason}")]
    #[diagnostic(code(envstrap::verify::bad_output))]
    InstallerOutputInvalid { reason: String },

    #[error("Unsupported shell: {shell}")]
    #[diagnostic(
        code(envstrap::cli::unsupported_shell),
        help("Supported shells: bash, elvish, fish, powershell, zsh")
    )]
    UnsupportedShell { shell: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(envstrap::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(envstrap::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(envstrap::fs::io_error))]
    IoError { message: String },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl BootstrapError {
    /// Process exit code for this error.
    ///
    /// A failed external tool hands its own exit code through; everything
    /// else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::StepFailed {
                code: Some(code), ..
            }
            | BootstrapError::ToolFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }

    /// Captured stderr of the failing tool, if any
    pub fn tool_stderr(&self) -> Option<&str> {
        match self {
            BootstrapError::StepFailed { stderr, .. } | BootstrapError::ToolFailed { stderr, .. }
                if !stderr.trim().is_empty() =>
            {
                Some(stderr.as_str())
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for BootstrapError {
    fn from(err: std::io::Error) -> Self {
        BootstrapError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for BootstrapError {
    fn from(err: serde_yaml::Error) -> Self {
        BootstrapError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BootstrapError {
    fn from(err: serde_json::Error) -> Self {
        BootstrapError::InstallerOutputInvalid {
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for BootstrapError {
    fn from(err: git2::Error) -> Self {
        BootstrapError::GitOperationFailed {
            message: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for BootstrapError {
    fn from(err: inquire::InquireError) -> Self {
        BootstrapError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, BootstrapError>;
