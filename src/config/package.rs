//! Package requirement specs (`name[extras]<constraint>; marker`)

use std::fmt;

use crate::error::{Result, config};

/// A single package requirement as handed to the installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Package name as written
    pub name: String,

    /// Version constraint including its operator (e.g. `==2.5.0`, `>=1.0,<2`)
    pub constraint: Option<String>,

    /// Environment marker after `;` (e.g. `sys_platform == "win32"`)
    pub marker: Option<String>,

    /// The original text, passed to the installer unchanged
    raw: String,
}

impl PackageSpec {
    /// Parse a requirement such as `torch==2.5.0`, `numpy`, `uvicorn[standard]>=0.30`
    /// or `requests==2.0; python_version >= "3.8"`.
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(config::invalid_package(input, "empty requirement"));
        }

        let (requirement, marker) = match raw.split_once(';') {
            Some((requirement, marker)) => {
                let marker = marker.trim();
                (requirement.trim(), (!marker.is_empty()).then(|| marker.to_string()))
            }
            None => (raw, None),
        };

        let name_end = requirement
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(requirement.len());
        let name = &requirement[..name_end];
        if name.is_empty() {
            return Err(config::invalid_package(input, "missing package name"));
        }

        let mut rest = requirement[name_end..].trim_start();
        if rest.starts_with('[') {
            let close = rest
                .find(']')
                .ok_or_else(|| config::invalid_package(input, "unterminated extras"))?;
            rest = rest[close + 1..].trim_start();
        }

        let constraint = if rest.is_empty() || rest.starts_with('@') {
            None
        } else if rest.starts_with(['=', '<', '>', '!', '~']) {
            Some(rest.split_whitespace().collect::<String>())
        } else {
            return Err(config::invalid_package(
                input,
                format!("unexpected text after name: '{rest}'"),
            ));
        };

        Ok(Self {
            name: name.to_string(),
            constraint,
            marker,
            raw: raw.to_string(),
        })
    }

    /// Exact version when the constraint is a single `==` pin without wildcards
    pub fn pinned_version(&self) -> Option<&str> {
        let version = self.constraint.as_deref()?.strip_prefix("==")?;
        if version.is_empty() || version.starts_with('=') || version.contains([',', '*']) {
            return None;
        }
        Some(version)
    }

    /// PEP 503 normalized name used for comparisons
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Lowercase and collapse runs of `-`, `_` and `.` into a single `-`
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut last_was_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !last_was_separator {
                normalized.push('-');
            }
            last_was_separator = true;
        } else {
            normalized.push(c.to_ascii_lowercase());
            last_was_separator = false;
        }
    }
    normalized
}
