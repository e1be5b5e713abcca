//! Run command implementation
//!
//! With a terminal the steps are executed one by one so progress can be
//! shown between them. The report is printed either way, also on failure.

use std::path::PathBuf;

use tracing::debug;

use crate::bootstrap::{Bootstrapper, resolve_workdir};
use crate::cli::RunArgs;
use crate::commands::helpers;
use crate::error::Result;
use crate::process::{ProcessRunner, SystemRunner};
use crate::progress::StepProgress;
use crate::session::Session;
use crate::ui;

/// Run run command
pub fn run(config_path: Option<PathBuf>, workdir: Option<PathBuf>, args: RunArgs) -> Result<()> {
    let cwd = helpers::current_dir()?;
    let config = helpers::load_config(config_path.as_deref(), &args.options)?;
    let workdir = resolve_workdir(workdir.as_deref(), &config, &cwd);

    let runner = SystemRunner;
    let mut bootstrapper = Bootstrapper::new(&config, &runner, Session::new(&cwd), workdir)
        .with_checkout(args.options.checkout);

    let result = if args.json {
        bootstrapper.run()
    } else {
        run_with_progress(&mut bootstrapper)
    };
    debug!(
        stage = %bootstrapper.stage(),
        env = ?bootstrapper.session().active_env(),
        "run finished"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(bootstrapper.report())?);
    } else {
        ui::print_report(bootstrapper.report());
    }
    result
}

fn run_with_progress<R: ProcessRunner + ?Sized>(
    bootstrapper: &mut Bootstrapper<'_, R>,
) -> Result<()> {
    let steps = bootstrapper.steps().to_vec();
    let progress = StepProgress::new(steps.len());

    for step in steps {
        progress.start_step(step);
        if let Err(e) = bootstrapper.execute(step) {
            progress.abandon();
            return Err(e);
        }
        progress.finish_step();
    }
    progress.finish();
    Ok(())
}
