//! Installed package inventory checks
//!
//! `verify` compares what the installer reports as installed against what a
//! bootstrap run is supposed to have installed.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bootstrap::steps;
use crate::config::package::normalize_name;
use crate::config::requirements::read_manifest;
use crate::config::{BootstrapConfig, PackageSpec};
use crate::error::{BootstrapError, Result, step as step_error};
use crate::process::ProcessRunner;
use crate::session::{EnvLayout, Session, python_executable};

/// One entry of `pip list --format=json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
}

/// Where an expected package comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    Primary,
    Auxiliary,
    BuildHelper,
    Manifest,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Primary => "primary",
            Origin::Auxiliary => "auxiliary",
            Origin::BuildHelper => "build helper",
            Origin::Manifest => "manifest",
        })
    }
}

/// A package that should be present, optionally at an exact version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub spec: PackageSpec,
    pub origin: Origin,
    pub version: Option<String>,
}

/// An expectation the environment does not meet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gap {
    pub name: String,
    pub origin: Origin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,
    /// Installed version, `None` when the package is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<String>,
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.required, &self.found) {
            (_, None) => write!(f, "{} ({}) is not installed", self.name, self.origin),
            (Some(required), Some(found)) => write!(
                f,
                "{} ({}) is {found}, expected {required}",
                self.name, self.origin
            ),
            (None, Some(found)) => write!(f, "{} ({}) is {found}", self.name, self.origin),
        }
    }
}

/// Compare the environment in `workdir` against everything a run installs.
///
/// The environment is activated the same way a run activates it, but it
/// must already exist. Returns the unmet expectations.
pub fn inspect<R: ProcessRunner + ?Sized>(
    config: &BootstrapConfig,
    runner: &R,
    mut session: Session,
    workdir: &Path,
) -> Result<Vec<Gap>> {
    let dir = session.change_dir(workdir)?.to_path_buf();
    let layout = EnvLayout::new(&dir, &config.environment.name);
    if !layout.python().is_file() {
        return Err(BootstrapError::EnvironmentNotFound {
            path: layout.root().display().to_string(),
        });
    }
    session.activate(&layout)?;

    let manifest = read_manifest(&dir.join(&config.manifest))?;
    let expected = expected_packages(config, manifest)?;

    let invocation = session
        .invocation(python_executable())
        .args(steps::list_installed_args());
    let output = runner.run(&invocation)?;
    if !output.success() {
        return Err(step_error::tool_failed(&invocation, &output));
    }
    let installed = parse_installed(&output.stdout)?;
    debug!(
        installed = installed.len(),
        expected = expected.len(),
        "comparing inventory"
    );
    Ok(find_gaps(&expected, &installed))
}

/// Parse the installer's JSON package listing
pub fn parse_installed(json: &str) -> Result<Vec<InstalledPackage>> {
    let packages: Vec<InstalledPackage> = serde_json::from_str(json.trim())?;
    Ok(packages)
}

/// Everything a finished run should have installed.
///
/// The primary must match its pin; auxiliary packages and build helpers
/// only need to be present. Manifest requirements are held to their pin
/// when they have one; those behind an environment marker are left out.
pub fn expected_packages(
    config: &BootstrapConfig,
    manifest: Vec<PackageSpec>,
) -> Result<Vec<Expectation>> {
    let primary = config.primary()?;
    let mut expected = vec![Expectation {
        version: primary.pinned_version().map(String::from),
        spec: primary,
        origin: Origin::Primary,
    }];

    let unpinned = |spec: PackageSpec, origin: Origin| Expectation {
        spec,
        origin,
        version: None,
    };
    expected.extend(
        config
            .auxiliary()?
            .into_iter()
            .map(|spec| unpinned(spec, Origin::Auxiliary)),
    );
    expected.extend(
        config
            .build_helpers()?
            .into_iter()
            .map(|spec| unpinned(spec, Origin::BuildHelper)),
    );
    expected.extend(
        manifest
            .into_iter()
            .filter(applies_unconditionally)
            .map(|spec| Expectation {
                version: spec.pinned_version().map(String::from),
                spec,
                origin: Origin::Manifest,
            }),
    );
    Ok(expected)
}

/// Marker-gated requirements may be skipped by the installer on this
/// platform, so they are not expected.
fn applies_unconditionally(spec: &PackageSpec) -> bool {
    match &spec.marker {
        Some(marker) => {
            debug!(package = %spec.name, %marker, "not expecting marker-gated requirement");
            false
        }
        None => true,
    }
}

/// Expectations not met by `installed`, in expectation order
pub fn find_gaps(expected: &[Expectation], installed: &[InstalledPackage]) -> Vec<Gap> {
    let by_name: HashMap<String, &str> = installed
        .iter()
        .map(|p| (normalize_name(&p.name), p.version.as_str()))
        .collect();

    expected
        .iter()
        .filter_map(|expectation| {
            let found = by_name.get(&expectation.spec.normalized_name()).copied();
            let satisfied = match (found, expectation.version.as_deref()) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(found), Some(required)) => version_matches(required, found),
            };
            (!satisfied).then(|| Gap {
                name: expectation.spec.name.clone(),
                origin: expectation.origin,
                required: expectation.version.clone(),
                found: found.map(String::from),
            })
        })
        .collect()
}

/// `==` semantics for the versions installers report: trailing zero
/// release segments are insignificant, and a local label (`+cu121`) is
/// ignored unless the pin names one.
pub fn version_matches(required: &str, found: &str) -> bool {
    let found = if required.contains('+') {
        found
    } else {
        found.split('+').next().unwrap_or(found)
    };
    canonical_version(required) == canonical_version(found)
}

fn canonical_version(version: &str) -> String {
    let lowered = version.trim().to_ascii_lowercase();
    let version = lowered.strip_prefix('v').unwrap_or(lowered.as_str());
    let (release, suffix) = match version.find(|c: char| !(c.is_ascii_digit() || c == '.')) {
        Some(at) => version.split_at(at),
        None => (version, ""),
    };
    let mut segments: Vec<&str> = release.split('.').collect();
    while segments.len() > 1 && segments.last().is_some_and(|s| s.parse::<u64>() == Ok(0)) {
        segments.pop();
    }
    format!("{}{suffix}", segments.join("."))
}
