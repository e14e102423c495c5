//! Package manifests (`port.toml`).
//!
//! A manifest holds a source list and a list of build configurations. Only
//! the first build configuration is consulted; later ones are parsed but
//! reserved. Accessors return empty slices or `None` for absent keys.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ConfigError, read_toml};
use crate::plan::BuildStep;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortManifest {
  pub packages: PackagesSection,
  pub build_configs: Vec<BuildConfig>,
}

/// The `[packages]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagesSection {
  pub packages: Vec<SourceEntry>,
}

/// One source location of a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceEntry {
  pub url: String,
  #[serde(rename = "ref")]
  pub reference: String,
}

/// A per-step working directory: either a bare string or an array whose
/// first element is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkDir {
  One(String),
  Many(Vec<String>),
}

impl WorkDir {
  pub fn first(&self) -> Option<&str> {
    match self {
      WorkDir::One(dir) => Some(dir.as_str()),
      WorkDir::Many(dirs) => dirs.first().map(String::as_str),
    }
  }
}

/// Commands a package prepends into the plan of every package that depends on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectRule {
  /// Target step name. Kept as text so unknown names can be reported and skipped.
  #[serde(rename = "type")]
  pub step: String,
  pub command: Vec<String>,
}

/// A named configure/build/install template dependents may inherit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportedBuildSystem {
  pub name: String,
  pub configure_command: String,
  pub configure_option: Vec<String>,
  pub build_command: String,
  pub build_option: Vec<String>,
  pub install_command: String,
  pub install_option: Vec<String>,
}

impl ExportedBuildSystem {
  /// Template command and options for an inheritable step.
  ///
  /// Only `configure`, `build` and `install` are inheritable.
  pub fn template(&self, step: BuildStep) -> Option<(&str, &[String])> {
    match step {
      BuildStep::Configure => Some((&self.configure_command, &self.configure_option)),
      BuildStep::Build => Some((&self.build_command, &self.build_option)),
      BuildStep::Install => Some((&self.install_command, &self.install_option)),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub build_system: Option<String>,
  pub dependencies: Vec<String>,

  pub pre_configure: Vec<String>,
  pub configure: Vec<String>,
  pub pre_build: Vec<String>,
  pub build: Vec<String>,
  pub post_build: Vec<String>,
  pub pre_install: Vec<String>,
  pub install: Vec<String>,
  pub post_install: Vec<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub pre_configure_work_dir: Option<WorkDir>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub configure_work_dir: Option<WorkDir>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pre_build_work_dir: Option<WorkDir>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub build_work_dir: Option<WorkDir>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub post_build_work_dir: Option<WorkDir>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pre_install_work_dir: Option<WorkDir>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub install_work_dir: Option<WorkDir>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub post_install_work_dir: Option<WorkDir>,

  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub inject: Vec<InjectRule>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub export_build_system: Vec<ExportedBuildSystem>,
}

impl BuildConfig {
  pub fn commands(&self, step: BuildStep) -> &[String] {
    match step {
      BuildStep::PreConfigure => &self.pre_configure,
      BuildStep::Configure => &self.configure,
      BuildStep::PreBuild => &self.pre_build,
      BuildStep::Build => &self.build,
      BuildStep::PostBuild => &self.post_build,
      BuildStep::PreInstall => &self.pre_install,
      BuildStep::Install => &self.install,
      BuildStep::PostInstall => &self.post_install,
    }
  }

  pub fn work_dir(&self, step: BuildStep) -> Option<&str> {
    let dir = match step {
      BuildStep::PreConfigure => &self.pre_configure_work_dir,
      BuildStep::Configure => &self.configure_work_dir,
      BuildStep::PreBuild => &self.pre_build_work_dir,
      BuildStep::Build => &self.build_work_dir,
      BuildStep::PostBuild => &self.post_build_work_dir,
      BuildStep::PreInstall => &self.pre_install_work_dir,
      BuildStep::Install => &self.install_work_dir,
      BuildStep::PostInstall => &self.post_install_work_dir,
    };
    dir.as_ref().and_then(WorkDir::first).filter(|d| !d.is_empty())
  }

  /// Find an exported build system by name.
  pub fn exported_build_system(&self, name: &str) -> Option<&ExportedBuildSystem> {
    self.export_build_system.iter().find(|system| system.name == name)
  }
}

impl PortManifest {
  /// Load a manifest from `path`.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    read_toml(path)
  }

  pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(content)
  }

  /// The active build configuration (the first element of `build_configs`).
  pub fn build_config(&self) -> Option<&BuildConfig> {
    self.build_configs.first()
  }

  pub fn dependencies(&self) -> &[String] {
    self.build_config().map(|c| c.dependencies.as_slice()).unwrap_or_default()
  }

  pub fn commands(&self, step: BuildStep) -> &[String] {
    self.build_config().map(|c| c.commands(step)).unwrap_or_default()
  }

  pub fn work_dir(&self, step: BuildStep) -> Option<&str> {
    self.build_config().and_then(|c| c.work_dir(step))
  }

  pub fn build_system(&self) -> Option<&str> {
    self
      .build_config()
      .and_then(|c| c.build_system.as_deref())
      .filter(|name| !name.is_empty())
  }

  pub fn inject_rules(&self) -> &[InjectRule] {
    self.build_config().map(|c| c.inject.as_slice()).unwrap_or_default()
  }

  /// The primary source URL, if one is declared.
  pub fn url(&self) -> Option<&str> {
    self
      .packages
      .packages
      .first()
      .map(|entry| entry.url.as_str())
      .filter(|url| !url.is_empty())
  }
}
