//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// envstrap - reproducible Python environment bootstrapper
///
/// Creates an isolated package environment in a project directory and installs
/// a pinned core dependency set followed by the project's requirements manifest.
#[derive(Parser, Debug)]
#[command(
    name = "envstrap",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Bootstrap an isolated Python environment with pinned dependencies",
    long_about = "envstrap changes into a project directory, creates an isolated package \
                  environment, activates it, installs a pinned core dependency set from an \
                  alternate index plus build helpers, and finally installs every package of \
                  the project's requirements manifest. The first failing step stops the run.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  envstrap init\n    \
                  envstrap plan\n    \
                  envstrap run --workdir ./project\n    \
                  envstrap run --checkout --branch main\n    \
                  envstrap verify"
)]
pub struct Cli {
    /// Configuration file (defaults to ./envstrap.yaml when present)
    #[arg(long, short = 'c', global = true, env = "ENVSTRAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Working directory (overrides the configuration file)
    #[arg(long, short = 'w', global = true, env = "ENVSTRAP_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bootstrap sequence
    Run(RunArgs),

    /// Show the steps and commands a run would execute
    Plan(PlanArgs),

    /// Check that the environment holds every expected package
    Verify(VerifyArgs),

    /// Write a default configuration file
    Init(InitArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by commands that build a run
#[derive(Args, Debug, Default, Clone)]
pub struct RunOptions {
    /// Interpreter used to create the environment
    #[arg(long, value_name = "PATH")]
    pub python: Option<String>,

    /// Clone the configured repository into the working directory first
    #[arg(long)]
    pub checkout: bool,

    /// Branch to check out (overrides checkout.branch)
    #[arg(long, env = "ENVSTRAP_BRANCH")]
    pub branch: Option<String>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Bootstrap the current directory:\n    envstrap run\n\n\
                  Bootstrap another directory:\n    envstrap run --workdir ../project\n\n\
                  Use a specific interpreter:\n    envstrap run --python /usr/bin/python3.11\n\n\
                  Clone first, then bootstrap:\n    envstrap run --checkout --branch main\n\n\
                  Machine-readable report:\n    envstrap run --json")]
pub struct RunArgs {
    #[command(flatten)]
    pub options: RunOptions,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the plan command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show the plan:\n    envstrap plan\n\n\
                  Include the checkout step:\n    envstrap plan --checkout\n\n\
                  As JSON:\n    envstrap plan --json")]
pub struct PlanArgs {
    #[command(flatten)]
    pub options: RunOptions,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Verify the environment of the current directory:\n    envstrap verify\n\n\
                  Verify another directory:\n    envstrap verify --workdir ../project\n\n\
                  As JSON:\n    envstrap verify --json")]
pub struct VerifyArgs {
    /// Print the gaps as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Write ./envstrap.yaml:\n    envstrap init\n\n\
                  Write elsewhere:\n    envstrap init --config ci/envstrap.yaml\n\n\
                  Overwrite an existing file:\n    envstrap init --force")]
pub struct InitArgs {
    /// Overwrite an existing configuration file without asking
    #[arg(long, short = 'f')]
    pub force: bool,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    envstrap completions --shell bash > ~/.bash_completion.d/envstrap\n\n\
                  Generate zsh completions:\n    envstrap completions --shell zsh > ~/.zfunc/_envstrap\n\n\
                  Generate fish completions:\n    envstrap completions --shell fish > ~/.config/fish/completions/envstrap.fish\n\n\
                  Generate PowerShell completions:\n    envstrap completions --shell powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}
