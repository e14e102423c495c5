//! Configuration files.
//!
//! - `kiln.toml` at the repository root: project settings and the container
//!   image, proxy and runtime options for install sessions
//! - `port.toml` per package: see [`manifest`]
//!
//! Both are deserialized into typed structs; absent tables and keys fall back
//! to defaults so callers never chase optional nodes.

pub mod manifest;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_CONTAINER_CLI, DEFAULT_CONTAINER_SHELL, DEFAULT_IMAGE, DEFAULT_NETWORK};

pub use manifest::{BuildConfig, ExportedBuildSystem, InjectRule, PortManifest};

/// Errors that can occur while loading or writing configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("configuration file not found: {}", path.display())]
  NotFound { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("failed to serialize configuration: {0}")]
  Serialize(#[from] toml::ser::Error),
}

/// Read a TOML file into `T`, mapping a missing file to [`ConfigError::NotFound`].
pub(crate) fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
  let content = std::fs::read_to_string(path).map_err(|e| {
    if e.kind() == std::io::ErrorKind::NotFound {
      ConfigError::NotFound { path: path.to_path_buf() }
    } else {
      ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
      }
    }
  })?;

  toml::from_str(&content).map_err(|e| ConfigError::Parse {
    path: path.to_path_buf(),
    source: e,
  })
}

/// The repository-wide `kiln.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
  pub global: ProjectSection,
  pub docker: ContainerSection,
}

/// The `[global]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
  pub conf_repo: String,
  pub platform: String,
  pub project: String,
  pub build_type: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub jobs: Option<usize>,
}

/// The `[docker]` table: how the session container is created and driven.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSection {
  pub image: String,
  pub proxy: String,
  pub network: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gpus: Option<String>,
  pub cli: String,
  pub shell: String,
  pub run_options: Vec<String>,
}

impl Default for ContainerSection {
  fn default() -> Self {
    Self {
      image: DEFAULT_IMAGE.to_string(),
      proxy: String::new(),
      network: DEFAULT_NETWORK.to_string(),
      gpus: None,
      cli: DEFAULT_CONTAINER_CLI.to_string(),
      shell: DEFAULT_CONTAINER_SHELL.to_string(),
      run_options: Vec::new(),
    }
  }
}

impl GlobalConfig {
  /// Load `kiln.toml` from `path`.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    read_toml(path)
  }

  pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(content)
  }

  /// Parallelism handed to build tools: the configured `jobs`, else the
  /// detected core count.
  pub fn jobs(&self) -> usize {
    self.global.jobs.filter(|jobs| *jobs > 0).unwrap_or_else(num_cpus)
  }

  /// The transfer proxy, if one is configured.
  pub fn proxy(&self) -> Option<&str> {
    Some(self.docker.proxy.as_str()).filter(|p| !p.is_empty())
  }

  pub fn to_toml(&self) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(self)?)
  }
}

/// Get the number of CPUs for default parallelism.
pub fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}
