//! Environment bootstrapper
//!
//! Runs the fixed, strictly ordered step sequence:
//!
//! ```text
//! Start -> [CheckedOut] -> DirectoryChanged -> EnvCreated -> EnvActivated
//!       -> CoreDepsInstalled -> ManifestDepsInstalled
//! ```
//!
//! The first failing step moves the run to `Failed` and nothing after it
//! runs. There is no retry, compensation or rollback: whatever a failed
//! tool left on disk stays there.

pub mod plan;
pub mod report;
pub mod steps;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

pub use plan::{PlannedStep, plan};
pub use report::{BootstrapReport, InvocationRecord, StepOutcome, StepStatus};

use crate::config::BootstrapConfig;
use crate::error::{BootstrapError, Result, step as step_error};
use crate::git;
use crate::process::{Invocation, ProcessRunner};
use crate::session::{EnvLayout, Session, python_executable};

/// A bootstrap operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Checkout,
    ChangeDir,
    CreateEnv,
    Activate,
    InstallCore,
    InstallManifest,
}

impl Step {
    /// Steps of a run, in execution order
    pub fn sequence(with_checkout: bool) -> Vec<Step> {
        let mut steps = Vec::with_capacity(6);
        if with_checkout {
            steps.push(Step::Checkout);
        }
        steps.extend([
            Step::ChangeDir,
            Step::CreateEnv,
            Step::Activate,
            Step::InstallCore,
            Step::InstallManifest,
        ]);
        steps
    }

    /// Human readable label
    pub fn describe(self) -> &'static str {
        match self {
            Step::Checkout => "Checking out repository",
            Step::ChangeDir => "Entering working directory",
            Step::CreateEnv => "Creating isolated environment",
            Step::Activate => "Activating environment",
            Step::InstallCore => "Installing core dependencies",
            Step::InstallManifest => "Installing manifest dependencies",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Checkout => "checkout",
            Step::ChangeDir => "change-dir",
            Step::CreateEnv => "create-env",
            Step::Activate => "activate",
            Step::InstallCore => "install-core",
            Step::InstallManifest => "install-manifest",
        };
        f.write_str(name)
    }
}

/// Where a run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    CheckedOut,
    DirectoryChanged,
    EnvCreated,
    EnvActivated,
    CoreDepsInstalled,
    ManifestDepsInstalled,
    Failed { at: Step },
}

impl Stage {
    /// Stage reached when `step` succeeds
    pub fn reached_by(step: Step) -> Stage {
        match step {
            Step::Checkout => Stage::CheckedOut,
            Step::ChangeDir => Stage::DirectoryChanged,
            Step::CreateEnv => Stage::EnvCreated,
            Step::Activate => Stage::EnvActivated,
            Step::InstallCore => Stage::CoreDepsInstalled,
            Step::InstallManifest => Stage::ManifestDepsInstalled,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::ManifestDepsInstalled | Stage::Failed { .. })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Start => f.write_str("start"),
            Stage::CheckedOut => f.write_str("checked-out"),
            Stage::DirectoryChanged => f.write_str("directory-changed"),
            Stage::EnvCreated => f.write_str("env-created"),
            Stage::EnvActivated => f.write_str("env-activated"),
            Stage::CoreDepsInstalled => f.write_str("core-deps-installed"),
            Stage::ManifestDepsInstalled => f.write_str("manifest-deps-installed"),
            Stage::Failed { at } => write!(f, "failed at {at}"),
        }
    }
}

/// Drives one bootstrap run against a [`ProcessRunner`]
pub struct Bootstrapper<'a, R: ProcessRunner + ?Sized> {
    config: &'a BootstrapConfig,
    runner: &'a R,
    session: Session,
    workdir: PathBuf,
    layout: Option<EnvLayout>,
    steps: Vec<Step>,
    position: usize,
    stage: Stage,
    report: BootstrapReport,
}

impl<'a, R: ProcessRunner + ?Sized> Bootstrapper<'a, R> {
    /// Prepare a run in `workdir`; relative paths resolve against the
    /// session's starting directory.
    pub fn new(
        config: &'a BootstrapConfig,
        runner: &'a R,
        session: Session,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        let workdir = workdir.into();
        let workdir = if workdir.is_absolute() {
            workdir
        } else {
            session.cwd().join(workdir)
        };
        Self {
            config,
            runner,
            session,
            workdir,
            layout: None,
            steps: Step::sequence(false),
            position: 0,
            stage: Stage::Start,
            report: BootstrapReport::new(),
        }
    }

    /// Run the repository checkout before anything else
    #[must_use]
    pub fn with_checkout(mut self, enabled: bool) -> Self {
        self.steps = Step::sequence(enabled);
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn report(&self) -> &BootstrapReport {
        &self.report
    }

    /// Run every remaining step, stopping at the first failure
    pub fn run(&mut self) -> Result<()> {
        let remaining: Vec<Step> = self.steps[self.position..].to_vec();
        for step in remaining {
            self.execute(step)?;
        }
        Ok(())
    }

    /// Run the next step, which must be `step`
    pub fn execute(&mut self, step: Step) -> Result<&StepOutcome> {
        let expected = self.steps.get(self.position).copied();
        if self.stage.is_terminal() || expected != Some(step) {
            return Err(BootstrapError::StepOutOfOrder {
                step,
                stage: self.stage.to_string(),
            });
        }

        info!(step = %step, "starting step");
        let started = Instant::now();
        let mut outcome = StepOutcome::new(step);

        let result = match step {
            Step::Checkout => self.checkout(&mut outcome),
            Step::ChangeDir => self.change_dir(&mut outcome),
            Step::CreateEnv => self.create_env(&mut outcome),
            Step::Activate => self.activate(&mut outcome),
            Step::InstallCore => self.install_core(&mut outcome),
            Step::InstallManifest => self.install_manifest(&mut outcome),
        };

        outcome.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.position += 1;

        match result {
            Ok(()) => {
                self.stage = Stage::reached_by(step);
                info!(step = %step, stage = %self.stage, "step finished");
            }
            Err(ref err) => {
                self.stage = Stage::Failed { at: step };
                outcome.status = StepStatus::Failed;
                outcome.error = Some(err.to_string());
                warn!(step = %step, error = %err, "step failed, halting");
            }
        }

        self.report.stage = self.stage;
        self.report.steps.push(outcome);
        result?;

        let last = self.report.steps.len() - 1;
        Ok(&self.report.steps[last])
    }

    fn checkout(&mut self, outcome: &mut StepOutcome) -> Result<()> {
        let checkout = self
            .config
            .checkout
            .as_ref()
            .ok_or(BootstrapError::CheckoutNotConfigured)?;
        let summary = git::checkout(checkout, &self.workdir)?;
        outcome.note = Some(summary.to_string());
        Ok(())
    }

    fn change_dir(&mut self, outcome: &mut StepOutcome) -> Result<()> {
        let cwd = self.session.change_dir(&self.workdir)?.to_path_buf();
        let layout = EnvLayout::new(&cwd, &self.config.environment.name);
        outcome.note = Some(cwd.display().to_string());
        self.report.workdir = Some(cwd);
        self.report.environment = Some(layout.root().to_path_buf());
        self.layout = Some(layout);
        Ok(())
    }

    fn create_env(&mut self, outcome: &mut StepOutcome) -> Result<()> {
        let invocation = self
            .session
            .invocation(&self.config.environment.python)
            .args(steps::create_env_args(self.config));
        self.invoke(Step::CreateEnv, &invocation, outcome)
    }

    fn activate(&mut self, outcome: &mut StepOutcome) -> Result<()> {
        let layout = self.layout()?.clone();
        self.session.activate(&layout)?;
        outcome.note = Some(layout.bin_dir().display().to_string());
        Ok(())
    }

    fn install_core(&mut self, outcome: &mut StepOutcome) -> Result<()> {
        let core = self
            .session
            .invocation(python_executable())
            .args(steps::core_install_args(self.config)?);
        self.invoke(Step::InstallCore, &core, outcome)?;

        if let Some(args) = steps::helper_install_args(self.config)? {
            let helpers = self.session.invocation(python_executable()).args(args);
            self.invoke(Step::InstallCore, &helpers, outcome)?;
        }
        Ok(())
    }

    fn install_manifest(&mut self, outcome: &mut StepOutcome) -> Result<()> {
        let invocation = self
            .session
            .invocation(python_executable())
            .args(steps::manifest_install_args(self.config));
        self.invoke(Step::InstallManifest, &invocation, outcome)
    }

    fn layout(&self) -> Result<&EnvLayout> {
        self.layout.as_ref().ok_or_else(|| BootstrapError::StepOutOfOrder {
            step: Step::Activate,
            stage: self.stage.to_string(),
        })
    }

    fn invoke(
        &self,
        step: Step,
        invocation: &Invocation,
        outcome: &mut StepOutcome,
    ) -> Result<()> {
        debug!(step = %step, command = %invocation.command_line(), "invoking");
        let output = self.runner.run(invocation)?;
        outcome
            .invocations
            .push(InvocationRecord::new(invocation, &output));
        if output.success() {
            Ok(())
        } else {
            Err(step_error::failed(step, invocation, &output))
        }
    }
}

/// Working directory for a run: explicit override, then config, then `cwd`
pub fn resolve_workdir(
    explicit: Option<&Path>,
    config: &BootstrapConfig,
    cwd: &Path,
) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| config.workdir.clone())
        .unwrap_or_else(|| cwd.to_path_buf())
}
