//! Per-run session state
//!
//! A shell script carries its current directory and activated environment
//! implicitly. Here they live in a [`Session`] that every step reads and
//! that is applied to each child process; envstrap never changes its own
//! working directory or environment.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BootstrapError, Result};
use crate::process::Invocation;

/// Variables unset when an environment is activated
const ACTIVATION_REMOVED_VARS: &[&str] = &["PYTHONHOME"];

/// On-disk layout of an isolated package environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLayout {
    root: PathBuf,
}

impl EnvLayout {
    pub fn new(workdir: &Path, name: &str) -> Self {
        Self {
            root: workdir.join(name),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the environment's executables
    pub fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.root.join("Scripts")
        } else {
            self.root.join("bin")
        }
    }

    /// Interpreter inside the environment
    pub fn python(&self) -> PathBuf {
        self.bin_dir().join(python_executable())
    }
}

/// Interpreter name looked up on `PATH` once an environment is active
pub fn python_executable() -> &'static str {
    if cfg!(windows) { "python.exe" } else { "python" }
}

/// Working directory plus environment overlay shared by all steps
#[derive(Debug, Clone)]
pub struct Session {
    cwd: PathBuf,
    base_path: Option<OsString>,
    env: BTreeMap<String, String>,
    env_remove: Vec<String>,
    active_env: Option<PathBuf>,
}

impl Session {
    /// Session rooted at `cwd`, inheriting this process's `PATH`
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self::with_base_path(cwd, std::env::var_os("PATH"))
    }

    /// Session with an explicit inherited `PATH`
    pub fn with_base_path(cwd: impl Into<PathBuf>, base_path: Option<OsString>) -> Self {
        Self {
            cwd: cwd.into(),
            base_path,
            env: BTreeMap::new(),
            env_remove: Vec::new(),
            active_env: None,
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn active_env(&self) -> Option<&Path> {
        self.active_env.as_deref()
    }

    /// Switch to `dir`, which must already exist.
    ///
    /// Relative paths resolve against the current session directory.
    pub fn change_dir(&mut self, dir: &Path) -> Result<&Path> {
        let target = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.cwd.join(dir)
        };
        if !target.is_dir() {
            return Err(BootstrapError::WorkdirNotFound {
                path: target.display().to_string(),
            });
        }
        self.cwd = dunce::canonicalize(&target)?;
        debug!(cwd = %self.cwd.display(), "changed directory");
        Ok(&self.cwd)
    }

    /// Make `layout` the active environment for every later invocation.
    ///
    /// This only rewrites the overlay: it sets `VIRTUAL_ENV`, puts the
    /// environment's bin directory first on `PATH` and drops `PYTHONHOME`.
    /// Nothing checks that the environment exists.
    pub fn activate(&mut self, layout: &EnvLayout) -> Result<()> {
        let bin_dir = layout.bin_dir();
        let mut dirs = vec![bin_dir];
        if let Some(base) = &self.base_path {
            dirs.extend(std::env::split_paths(base));
        }
        let path = std::env::join_paths(dirs).map_err(|e| BootstrapError::IoError {
            message: format!("cannot build PATH for activated environment: {e}"),
        })?;

        self.env.insert(
            "VIRTUAL_ENV".to_string(),
            layout.root().display().to_string(),
        );
        self.env
            .insert("PATH".to_string(), path.to_string_lossy().into_owned());
        for var in ACTIVATION_REMOVED_VARS {
            self.env_remove.push((*var).to_string());
        }
        self.active_env = Some(layout.root().to_path_buf());
        debug!(env = %layout.root().display(), "activated environment");
        Ok(())
    }

    /// Locate `program` on the session's effective `PATH`.
    ///
    /// Names containing a path separator are returned unchanged, as are
    /// names not found anywhere (the spawn then reports the missing tool).
    pub fn resolve_program(&self, program: &str) -> String {
        if program.contains(['/', '\\']) {
            return program.to_string();
        }
        let search: Option<OsString> = match self.env.get("PATH") {
            Some(path) => Some(OsString::from(path)),
            None => self.base_path.clone(),
        };
        let Some(search) = search else {
            return program.to_string();
        };

        std::env::split_paths(&search)
            .flat_map(|dir| candidates(&dir, program))
            .find(|candidate| candidate.is_file())
            .map_or_else(|| program.to_string(), |p| p.display().to_string())
    }

    /// Invocation of `program` inside this session
    pub fn invocation(&self, program: &str) -> Invocation {
        let mut invocation = Invocation::new(self.resolve_program(program), &self.cwd);
        invocation.env = self.env.clone();
        invocation.env_remove = self.env_remove.clone();
        invocation
    }
}

fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    if cfg!(windows) && Path::new(program).extension().is_none() {
        vec![dir.join(format!("{program}.exe")), dir.join(program)]
    } else {
        vec![dir.join(program)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_change_dir_requires_existing_directory() {
        let temp = TempDir::new().unwrap();
        let mut session = Session::with_base_path(temp.path(), None);

        let err = session.change_dir(&temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, BootstrapError::WorkdirNotFound { .. }));
        assert_eq!(session.cwd(), temp.path());
    }

    #[test]
    fn test_change_dir_rejects_files() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        let mut session = Session::with_base_path(temp.path(), None);
        assert!(session.change_dir(&file).is_err());
    }

    #[test]
    fn test_change_dir_relative() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("project")).unwrap();
        let mut session = Session::with_base_path(temp.path(), None);

        session.change_dir(Path::new("project")).unwrap();
        assert_eq!(
            session.cwd(),
            dunce::canonicalize(temp.path().join("project")).unwrap()
        );
    }

    #[test]
    fn test_activate_sets_overlay() {
        let temp = TempDir::new().unwrap();
        let base = std::env::join_paths(["/usr/local/bin", "/usr/bin"]).unwrap();
        let mut session = Session::with_base_path(temp.path(), Some(base));
        let layout = EnvLayout::new(temp.path(), ".venv");

        session.activate(&layout).unwrap();

        let inv = session.invocation("pip");
        assert_eq!(
            inv.env.get("VIRTUAL_ENV").map(String::as_str),
            Some(layout.root().display().to_string().as_str())
        );
        let path = inv.env.get("PATH").unwrap();
        let first = std::env::split_paths(path).next().unwrap();
        assert_eq!(first, layout.bin_dir());
        assert!(inv.env_remove.contains(&"PYTHONHOME".to_string()));
        assert_eq!(session.active_env(), Some(layout.root()));
    }

    #[test]
    fn test_resolve_program_prefers_activated_environment() {
        let temp = TempDir::new().unwrap();
        let system_bin = temp.path().join("system-bin");
        fs::create_dir_all(&system_bin).unwrap();
        fs::write(system_bin.join(python_executable()), "").unwrap();

        let base = std::env::join_paths([&system_bin]).unwrap();
        let mut session = Session::with_base_path(temp.path(), Some(base));
        assert_eq!(
            session.resolve_program(python_executable()),
            system_bin.join(python_executable()).display().to_string()
        );

        let layout = EnvLayout::new(temp.path(), ".venv");
        fs::create_dir_all(layout.bin_dir()).unwrap();
        fs::write(layout.python(), "").unwrap();
        session.activate(&layout).unwrap();

        assert_eq!(
            session.resolve_program(python_executable()),
            layout.python().display().to_string()
        );
    }

    #[test]
    fn test_resolve_program_falls_back_to_name() {
        let temp = TempDir::new().unwrap();
        let session = Session::with_base_path(temp.path(), None);
        assert_eq!(session.resolve_program("python3"), "python3");
        assert_eq!(session.resolve_program("/opt/py/bin/python"), "/opt/py/bin/python");
    }

    #[test]
    fn test_layout_paths() {
        let layout = EnvLayout::new(Path::new("/work"), "env");
        assert_eq!(layout.root(), Path::new("/work/env"));
        if cfg!(windows) {
            assert!(layout.bin_dir().ends_with("Scripts"));
        } else {
            assert_eq!(layout.python(), Path::new("/work/env/bin/python"));
        }
    }
}
