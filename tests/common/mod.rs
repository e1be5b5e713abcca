//! Common test utilities for envstrap integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Variables that would leak the developer's setup into a test run
const AMBIENT_VARS: &[&str] = &[
    "ENVSTRAP_CONFIG",
    "ENVSTRAP_WORKDIR",
    "ENVSTRAP_BRANCH",
    "ENVSTRAP_LOG",
    "VIRTUAL_ENV",
    "PYTHONHOME",
];

/// Stand-in for a Python interpreter.
///
/// Appends `<argv0>|<VIRTUAL_ENV>|<args>` to `$ENVSTRAP_FAKE_LOG`. `-m venv X`
/// creates `X/bin/python` as a copy of itself, `-m pip list` prints
/// `$ENVSTRAP_FAKE_INSTALLED`, and any invocation with an argument equal to
/// `$ENVSTRAP_FAKE_FAIL` exits with `$ENVSTRAP_FAKE_CODE` (default 3).
const FAKE_PYTHON: &str = r#"#!/bin/sh
echo "$0|$VIRTUAL_ENV|$*" >> "$ENVSTRAP_FAKE_LOG"
if [ -n "$ENVSTRAP_FAKE_FAIL" ]; then
  for arg in "$@"; do
    if [ "$arg" = "$ENVSTRAP_FAKE_FAIL" ]; then
      echo "ERROR: scripted failure on $arg" >&2
      exit "${ENVSTRAP_FAKE_CODE:-3}"
    fi
  done
fi
if [ "$1" = "-m" ] && { [ "$2" = "venv" ] || [ "$2" = "virtualenv" ]; }; then
  mkdir -p "$3/bin"
  cp "$0" "$3/bin/python"
  chmod +x "$3/bin/python"
  exit 0
fi
if [ "$1" = "-m" ] && [ "$2" = "pip" ] && [ "$3" = "list" ]; then
  printf '%s\n' "${ENVSTRAP_FAKE_INSTALLED:-[]}"
  exit 0
fi
echo "Successfully installed"
exit 0
"#;

/// A temporary project for integration tests
pub struct TestWorkspace {
    /// Temporary directory
    pub temp: TempDir,
    /// Canonical path of the temporary directory
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = dunce::canonicalize(temp.path()).expect("Failed to canonicalize temp dir");
        Self { temp, path }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Create a project directory with a requirements manifest
    pub fn create_project(&self, name: &str, requirements: &str) -> PathBuf {
        self.write_file(&format!("{name}/requirements.txt"), requirements);
        self.path.join(name)
    }

    /// Install the fake interpreter and return its path
    #[cfg(unix)]
    pub fn fake_python(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.path.join("bin/python3");
        self.write_file("bin/python3", FAKE_PYTHON);
        let mut perms = std::fs::metadata(&path)
            .expect("Failed to stat fake python")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("Failed to make fake python executable");
        path
    }

    /// Where the fake interpreter logs its invocations
    pub fn log_path(&self) -> PathBuf {
        self.path.join("invocations.log")
    }

    /// Logged invocations, one per line
    pub fn invocations(&self) -> Vec<Invocation> {
        if !self.log_path().exists() {
            return Vec::new();
        }
        self.read_file("invocations.log")
            .lines()
            .map(Invocation::parse)
            .collect()
    }

    /// envstrap command running inside this workspace
    pub fn envstrap(&self) -> Command {
        let mut cmd = envstrap_cmd();
        cmd.current_dir(&self.path)
            .env("ENVSTRAP_FAKE_LOG", self.log_path());
        cmd
    }
}

/// One logged run of the fake interpreter
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub virtual_env: String,
    pub args: String,
}

impl Invocation {
    fn parse(line: &str) -> Self {
        let mut parts = line.splitn(3, '|');
        let mut next = || parts.next().unwrap_or_default().to_string();
        Self {
            program: next(),
            virtual_env: next(),
            args: next(),
        }
    }

    pub fn ran_from(&self, dir: &Path) -> bool {
        Path::new(&self.program).starts_with(dir)
    }
}

/// envstrap command with ambient configuration variables removed
#[allow(deprecated)]
pub fn envstrap_cmd() -> Command {
    let mut cmd = Command::cargo_bin("envstrap").expect("envstrap binary");
    for var in AMBIENT_VARS {
        cmd.env_remove(var);
    }
    cmd
}
