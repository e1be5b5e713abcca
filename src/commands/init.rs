//! Init command implementation
//!
//! Writes the default configuration so it can be edited instead of
//! written from scratch.

use std::fs;
use std::path::{Path, PathBuf};

use console::{Style, Term};
use inquire::Confirm;

use crate::cli::InitArgs;
use crate::config::{BootstrapConfig, CONFIG_FILE_NAME};
use crate::error::{BootstrapError, Result, fs as fs_error};

const HEADER: &str = "# envstrap configuration\n\
# Secrets never go here: checkout.token_env names the variable holding the token.\n";

/// Run init command
pub fn run(config_path: Option<PathBuf>, args: InitArgs) -> Result<()> {
    let path = config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    if path.exists() && !args.force && !confirm_overwrite(&path)? {
        return Err(BootstrapError::ConfigAlreadyExists {
            path: path.display().to_string(),
        });
    }

    write_default_config(&path)?;
    println!(
        "{} {}",
        Style::new().green().bold().apply_to("Wrote"),
        path.display()
    );
    Ok(())
}

/// Ask before overwriting; without a terminal the answer is no
fn confirm_overwrite(path: &Path) -> Result<bool> {
    if !Term::stdout().is_term() {
        return Ok(false);
    }
    let answer = Confirm::new(&format!("{} already exists. Overwrite?", path.display()))
        .with_default(false)
        .with_help_message("Press 'y' to overwrite, Enter to keep the existing file")
        .prompt()?;
    Ok(answer)
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| fs_error::write_failed(parent, &e))?;
        }
    }
    let yaml = BootstrapConfig::default().to_yaml()?;
    fs::write(path, format!("{HEADER}{yaml}")).map_err(|e| fs_error::write_failed(path, &e))
}
