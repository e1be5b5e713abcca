//! envstrap - reproducible Python environment bootstrapper
//!
//! Changes into a project directory, creates and activates an isolated
//! package environment, installs a pinned core dependency set and then the
//! project's requirements manifest. Every step is an external tool
//! invocation; the first failure stops the run.

use clap::Parser;
use console::Style;
use miette::Diagnostic;

mod bootstrap;
mod cli;
mod commands;
mod config;
mod error;
mod git;
mod inventory;
mod logging;
mod process;
mod progress;
mod session;
mod ui;

use cli::{Cli, Commands};
use error::BootstrapError;

/// Print an error with its help text and the failing tool's stderr tail
fn report_error(err: &BootstrapError) {
    eprintln!("{} {err}", Style::new().red().bold().apply_to("Error:"));
    if let Some(help) = err.help() {
        eprintln!("  {} {help}", Style::new().bold().apply_to("help:"));
    }
    if let Some(stderr) = err.tool_stderr() {
        eprintln!();
        eprintln!("{}", Style::new().dim().apply_to("--- tool output (stderr) ---"));
        eprintln!("{stderr}");
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(cli.config, cli.workdir, args),
        Commands::Plan(args) => commands::plan::run(cli.config, cli.workdir, args),
        Commands::Verify(args) => commands::verify::run(cli.config, cli.workdir, args),
        Commands::Init(args) => commands::init::run(cli.config, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        report_error(&e);
        std::process::exit(e.exit_code());
    }
}
