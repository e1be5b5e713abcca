//! Plan command implementation

use std::path::PathBuf;

use crate::bootstrap::{self, resolve_workdir};
use crate::cli::PlanArgs;
use crate::commands::helpers;
use crate::error::Result;
use crate::ui;

/// Run plan command
pub fn run(config_path: Option<PathBuf>, workdir: Option<PathBuf>, args: PlanArgs) -> Result<()> {
    let cwd = helpers::current_dir()?;
    let config = helpers::load_config(config_path.as_deref(), &args.options)?;
    let workdir = resolve_workdir(workdir.as_deref(), &config, &cwd);
    let workdir = if workdir.is_absolute() {
        workdir
    } else {
        cwd.join(workdir)
    };

    let planned = bootstrap::plan(&config, &workdir, args.options.checkout)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&planned)?);
    } else {
        ui::print_plan(&planned);
    }
    Ok(())
}
