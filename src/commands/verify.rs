//! Verify command implementation

use std::path::PathBuf;

use crate::bootstrap::resolve_workdir;
use crate::cli::{RunOptions, VerifyArgs};
use crate::commands::helpers;
use crate::error::{BootstrapError, Result};
use crate::inventory;
use crate::process::SystemRunner;
use crate::session::Session;
use crate::ui;

/// Run verify command
pub fn run(
    config_path: Option<PathBuf>,
    workdir: Option<PathBuf>,
    args: VerifyArgs,
) -> Result<()> {
    let cwd = helpers::current_dir()?;
    let config = helpers::load_config(config_path.as_deref(), &RunOptions::default())?;
    let workdir = resolve_workdir(workdir.as_deref(), &config, &cwd);

    let gaps = inventory::inspect(&config, &SystemRunner, Session::new(&cwd), &workdir)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&gaps)?);
    } else {
        ui::print_gaps(&gaps);
    }

    if gaps.is_empty() {
        Ok(())
    } else {
        Err(BootstrapError::VerificationFailed { count: gaps.len() })
    }
}
