//! Outcome records for a bootstrap run

use std::path::PathBuf;

use serde::Serialize;

use super::{Stage, Step};
use crate::process::{Invocation, ProcessOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Failed,
}

/// One external command a step ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationRecord {
    pub command: String,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl InvocationRecord {
    pub fn new(invocation: &Invocation, output: &ProcessOutput) -> Self {
        Self {
            command: invocation.command_line(),
            code: output.code,
            stdout: output.stdout.clone(),
            stderr: output.stderr.clone(),
        }
    }
}

/// Result of a single step, including captured diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: Step,
    pub status: StepStatus,
    pub duration_ms: u64,
    pub invocations: Vec<InvocationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn new(step: Step) -> Self {
        Self {
            step,
            status: StepStatus::Succeeded,
            duration_ms: 0,
            invocations: Vec::new(),
            note: None,
            error: None,
        }
    }
}

/// Everything a run did, in order
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<PathBuf>,
    pub steps: Vec<StepOutcome>,
}

impl Default for BootstrapReport {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapReport {
    pub fn new() -> Self {
        Self {
            stage: Stage::Start,
            workdir: None,
            environment: None,
            steps: Vec::new(),
        }
    }

    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.steps.iter().find(|o| o.step == step)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.steps.iter().map(|o| o.duration_ms).sum()
    }
}
