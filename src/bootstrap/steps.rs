//! Argument lists for each external tool invocation
//!
//! Shared by the bootstrapper and `plan`, so what is shown is exactly what runs.

use crate::config::BootstrapConfig;
use crate::error::Result;

/// `<python> -m venv|virtualenv <name>`
pub fn create_env_args(config: &BootstrapConfig) -> Vec<String> {
    vec![
        "-m".to_string(),
        config.environment.tool.module().to_string(),
        config.environment.name.clone(),
    ]
}

/// Pinned primary plus auxiliary packages from the alternate index
pub fn core_install_args(config: &BootstrapConfig) -> Result<Vec<String>> {
    let mut args = pip_install();
    args.push(config.primary()?.to_string());
    args.extend(config.auxiliary()?.iter().map(ToString::to_string));
    if let Some(index_url) = &config.core.index_url {
        args.push("--index-url".to_string());
        args.push(index_url.clone());
    }
    Ok(args)
}

/// Build helpers from the default index, `None` when there are none
pub fn helper_install_args(config: &BootstrapConfig) -> Result<Option<Vec<String>>> {
    let helpers = config.build_helpers()?;
    if helpers.is_empty() {
        return Ok(None);
    }
    let mut args = pip_install();
    args.extend(helpers.iter().map(ToString::to_string));
    Ok(Some(args))
}

/// Every package of the requirements manifest
pub fn manifest_install_args(config: &BootstrapConfig) -> Vec<String> {
    let mut args = pip_install();
    args.push("-r".to_string());
    args.push(config.manifest.display().to_string());
    args
}

/// Installed package listing used by `verify`
pub fn list_installed_args() -> Vec<String> {
    ["-m", "pip", "list", "--format=json"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn pip_install() -> Vec<String> {
    ["-m", "pip", "install"]
        .into_iter()
        .map(String::from)
        .collect()
}
