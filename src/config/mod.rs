//! Configuration file handling for envstrap
//!
//! `envstrap.yaml` carries every parameter of a bootstrap run. All fields are
//! optional; the defaults reproduce the stock setup (a `.venv` environment,
//! pinned torch plus xformers from the CUDA 12.1 wheel index, ninja, and
//! `requirements.txt`).

pub mod package;
pub mod requirements;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use package::PackageSpec;

use crate::error::{Result, config};

/// Default configuration file name, looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "envstrap.yaml";

/// Bootstrap configuration (envstrap.yaml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Working directory every step runs in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,

    /// Isolated environment settings
    pub environment: EnvironmentConfig,

    /// Pinned core dependency set
    pub core: CoreConfig,

    /// Build helpers installed from the default index
    pub build_helpers: Vec<String>,

    /// Requirements manifest, relative to the working directory
    pub manifest: PathBuf,

    /// Optional repository checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout: Option<CheckoutConfig>,
}

/// Tool used to create the isolated environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnvTool {
    #[default]
    Venv,
    Virtualenv,
}

impl EnvTool {
    /// Python module implementing the tool
    pub fn module(self) -> &'static str {
        match self {
            EnvTool::Venv => "venv",
            EnvTool::Virtualenv => "virtualenv",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    pub tool: EnvTool,

    /// Environment directory, relative to the working directory
    pub name: String,

    /// Interpreter used to create the environment
    pub python: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            tool: EnvTool::Venv,
            name: ".venv".to_string(),
            python: default_python().to_string(),
        }
    }
}

fn default_python() -> &'static str {
    if cfg!(windows) { "python" } else { "python3" }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Primary package, pinned to an exact version
    pub primary: String,

    /// Unpinned companion packages resolved from the same index
    pub auxiliary: Vec<String>,

    /// Alternate package index holding builds for the target compute toolkit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_url: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            primary: "torch==2.5.0".to_string(),
            auxiliary: vec!["xformers".to_string()],
            index_url: Some("https://download.pytorch.org/whl/cu121".to_string()),
        }
    }
}

/// Repository checkout settings. Never holds a secret: `token_env` names
/// the variable the credential is read from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CheckoutConfig {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            workdir: None,
            environment: EnvironmentConfig::default(),
            core: CoreConfig::default(),
            build_helpers: vec!["ninja".to_string()],
            manifest: PathBuf::from("requirements.txt"),
            checkout: None,
        }
    }
}

impl BootstrapConfig {
    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Serialize configuration to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(yaml)
    }

    /// Load and validate a configuration file.
    ///
    /// A relative `workdir` is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(config::not_found(path.display().to_string()));
        }
        let content = fs::read_to_string(path)
            .map_err(|e| config::read_failed(path.display().to_string(), e.to_string()))?;
        let mut loaded: Self = serde_yaml::from_str(&content)
            .map_err(|e| config::parse_failed(path.display().to_string(), e.to_string()))?;

        if let Some(workdir) = loaded.workdir.as_mut() {
            if workdir.is_relative() {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                *workdir = base.join(&*workdir);
            }
        }

        loaded.validate()?;
        Ok(loaded)
    }

    /// Resolve which configuration to use: an explicit path must exist,
    /// otherwise `./envstrap.yaml` is used when present, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(CONFIG_FILE_NAME);
                if local.is_file() {
                    Self::load(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let name = self.environment.name.trim();
        if name.is_empty() {
            return Err(config::invalid("environment name cannot be empty"));
        }
        if Path::new(name).is_absolute() {
            return Err(config::invalid(
                "environment name must be relative to the working directory",
            ));
        }
        if self.environment.python.trim().is_empty() {
            return Err(config::invalid("environment python cannot be empty"));
        }

        let primary = self.primary()?;
        if primary.pinned_version().is_none() {
            return Err(config::invalid(format!(
                "core primary '{primary}' must be pinned to an exact version (name==version)"
            )));
        }
        self.auxiliary()?;
        self.build_helpers()?;

        if self.manifest.as_os_str().is_empty() {
            return Err(config::invalid("manifest path cannot be empty"));
        }

        if let Some(checkout) = &self.checkout {
            if checkout.url.trim().is_empty() {
                return Err(config::invalid("checkout url cannot be empty"));
            }
            if checkout
                .token_env
                .as_deref()
                .is_some_and(|var| var.trim().is_empty())
            {
                return Err(config::invalid("checkout token_env cannot be empty"));
            }
        }

        Ok(())
    }

    pub fn primary(&self) -> Result<PackageSpec> {
        PackageSpec::parse(&self.core.primary)
    }

    pub fn auxiliary(&self) -> Result<Vec<PackageSpec>> {
        self.core
            .auxiliary
            .iter()
            .map(|s| PackageSpec::parse(s))
            .collect()
    }

    pub fn build_helpers(&self) -> Result<Vec<PackageSpec>> {
        self.build_helpers
            .iter()
            .map(|s| PackageSpec::parse(s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = BootstrapConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.environment.name, ".venv");
        assert_eq!(config.core.primary, "torch==2.5.0");
        assert_eq!(config.build_helpers, vec!["ninja"]);
        assert_eq!(config.manifest, PathBuf::from("requirements.txt"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = BootstrapConfig::from_yaml("manifest: deps/requirements.txt\n").unwrap();
        assert_eq!(config.manifest, PathBuf::from("deps/requirements.txt"));
        assert_eq!(config.core, CoreConfig::default());
        assert_eq!(config.environment, EnvironmentConfig::default());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r"
workdir: /srv/project
environment:
  tool: virtualenv
  name: blt_env
  python: /usr/bin/python3.12
core:
  primary: torch==2.4.1
  auxiliary: [xformers, triton]
  index_url: https://download.pytorch.org/whl/cu124
build_helpers: []
manifest: requirements.txt
checkout:
  url: https://github.com/owner/repo.git
  branch: main
  token_env: GITHUB_TOKEN
";
        let config = BootstrapConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.workdir, Some(PathBuf::from("/srv/project")));
        assert_eq!(config.environment.tool, EnvTool::Virtualenv);
        assert_eq!(config.core.auxiliary, vec!["xformers", "triton"]);
        assert!(config.build_helpers.is_empty());
        let checkout = config.checkout.as_ref().unwrap();
        assert_eq!(checkout.branch.as_deref(), Some("main"));
        assert_eq!(checkout.token_env.as_deref(), Some("GITHUB_TOKEN"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(BootstrapConfig::from_yaml("cor:\n  primary: torch==1.0\n").is_err());
    }

    #[test]
    fn test_unpinned_primary_is_invalid() {
        let mut config = BootstrapConfig::default();
        config.core.primary = "torch>=2.0".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must be pinned"));
    }

    #[test]
    fn test_empty_environment_name_is_invalid() {
        let mut config = BootstrapConfig::default();
        config.environment.name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_helper_spec_is_invalid() {
        let mut config = BootstrapConfig::default();
        config.build_helpers = vec!["ninja latest".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip_of_defaults() {
        let config = BootstrapConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("primary: torch==2.5.0"));
        assert!(!yaml.contains("checkout"));
        assert_eq!(BootstrapConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_load_resolves_relative_workdir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "workdir: project\n").unwrap();

        let config = BootstrapConfig::load(&path).unwrap();
        assert_eq!(config.workdir, Some(temp.path().join("project")));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = BootstrapConfig::load(&temp.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(
            err,
            crate::error::BootstrapError::ConfigNotFound { .. }
        ));
    }

    #[test]
    fn test_load_reports_path_on_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "core: [unclosed\n").unwrap();

        let err = BootstrapConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }
}
