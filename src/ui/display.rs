//! Display functions for reports, plans and verification results

use std::fmt::Write;

use console::Style;

use crate::bootstrap::{BootstrapReport, PlannedStep, Stage, StepStatus};
use crate::inventory::Gap;

fn bold() -> Style {
    Style::new().bold()
}

/// Render the outcome of a run, one line per executed step
pub fn render_report(report: &BootstrapReport) -> String {
    let mut out = String::new();
    for outcome in &report.steps {
        let marker = match outcome.status {
            StepStatus::Succeeded => Style::new().green().apply_to("✓"),
            StepStatus::Failed => Style::new().red().bold().apply_to("✗"),
        };
        let _ = write!(
            out,
            "{marker} {} {}",
            outcome.step.describe(),
            Style::new().dim().apply_to(format!("({} ms)", outcome.duration_ms))
        );
        if let Some(note) = &outcome.note {
            let _ = write!(out, " {}", Style::new().cyan().apply_to(note));
        }
        out.push('\n');
    }

    match report.stage {
        Stage::ManifestDepsInstalled => {
            let _ = write!(
                out,
                "\n{}",
                Style::new().green().bold().apply_to("Environment ready")
            );
            if let Some(env) = &report.environment {
                let _ = write!(out, ": {}", env.display());
            }
            let _ = writeln!(
                out,
                " {}",
                Style::new()
                    .dim()
                    .apply_to(format!("in {} ms", report.total_duration_ms()))
            );
        }
        Stage::Failed { at } => {
            let _ = writeln!(
                out,
                "\n{} at step '{at}'",
                Style::new().red().bold().apply_to("Bootstrap failed")
            );
        }
        _ => {}
    }
    out
}

pub fn print_report(report: &BootstrapReport) {
    print!("{}", render_report(report));
}

/// Render the plan of a run
pub fn render_plan(plan: &[PlannedStep]) -> String {
    let mut out = String::new();
    for (idx, planned) in plan.iter().enumerate() {
        let _ = writeln!(
            out,
            "{} {} {}",
            Style::new().dim().apply_to(format!("{}.", idx + 1)),
            bold().apply_to(planned.description),
            Style::new().dim().apply_to(format!("[{}]", planned.step))
        );
        for action in &planned.actions {
            let _ = writeln!(out, "   {}", Style::new().cyan().apply_to(action));
        }
    }
    out
}

pub fn print_plan(plan: &[PlannedStep]) {
    print!("{}", render_plan(plan));
}

/// Render verification results
pub fn render_gaps(gaps: &[Gap]) -> String {
    if gaps.is_empty() {
        return format!(
            "{}\n",
            Style::new().green().bold().apply_to("All expected packages are installed")
        );
    }
    let mut out = format!("{}\n", bold().apply_to("Missing or mismatched packages:"));
    for gap in gaps {
        let _ = writeln!(out, "  {} {gap}", Style::new().red().apply_to("-"));
    }
    out
}

pub fn print_gaps(gaps: &[Gap]) {
    print!("{}", render_gaps(gaps));
}
