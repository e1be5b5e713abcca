//! Bootstrap step errors

use super::BootstrapError;
use crate::bootstrap::Step;
use crate::process::{Invocation, ProcessOutput};

/// Number of trailing stderr lines kept on a failed step
const STDERR_TAIL_LINES: usize = 20;

/// Build the error for an invocation that exited unsuccessfully
pub fn failed(step: Step, invocation: &Invocation, output: &ProcessOutput) -> BootstrapError {
    BootstrapError::StepFailed {
        step,
        command: invocation.command_line(),
        code: output.code,
        stderr: tail(&output.stderr, STDERR_TAIL_LINES),
    }
}

/// Same as [`failed`] for invocations outside the step sequence
pub fn tool_failed(invocation: &Invocation, output: &ProcessOutput) -> BootstrapError {
    BootstrapError::ToolFailed {
        command: invocation.command_line(),
        code: output.code,
        stderr: tail(&output.stderr, STDERR_TAIL_LINES),
    }
}

pub fn tool_not_found(program: impl Into<String>, reason: impl Into<String>) -> BootstrapError {
    BootstrapError::ToolNotFound {
        program: program.into(),
        reason: reason.into(),
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}
