//! Command helper utilities

use std::path::{Path, PathBuf};

use crate::cli::RunOptions;
use crate::config::BootstrapConfig;
use crate::error::{BootstrapError, Result};

/// Current directory of the envstrap process
pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| BootstrapError::IoError {
        message: format!("Failed to get current directory: {e}"),
    })
}

/// Load the configuration and apply command-line overrides on top of it
pub fn load_config(config_path: Option<&Path>, options: &RunOptions) -> Result<BootstrapConfig> {
    let mut config = BootstrapConfig::resolve(config_path)?;
    apply_overrides(&mut config, options);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut BootstrapConfig, options: &RunOptions) {
    if let Some(python) = &options.python {
        config.environment.python.clone_from(python);
    }
    if let (Some(branch), Some(checkout)) = (&options.branch, config.checkout.as_mut()) {
        checkout.branch = Some(branch.clone());
    }
}
