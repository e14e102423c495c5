//! Repository scaffolding.
//!
//! This module provides the core logic for the `kiln create` and `kiln init`
//! commands:
//! - `create_project`: writes `kiln.toml` and the `buildtrees/`, `packages/` roots
//! - `create_port`: writes an empty manifest for a package descriptor
//! - `clone_config_repo`: clones a repository of ready-made manifests

mod templates;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::manifest::SourceEntry;
use crate::config::{BuildConfig, GlobalConfig, PortManifest, num_cpus};
use crate::layout::RepoLayout;
use crate::package::{PackageSpec, PackageSpecError};

pub use templates::{PORT_HEADER, PROJECT_HEADER};

/// Errors that can occur during scaffolding.
#[derive(Debug, Error)]
pub enum InitError {
  #[error("file already exists: {}", path.display())]
  PathExists { path: PathBuf },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to write file {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },

  #[error("failed to serialize template: {0}")]
  Serialize(#[from] toml::ser::Error),

  #[error(transparent)]
  Spec(#[from] PackageSpecError),

  #[error("failed to clone {url}: {source}")]
  Clone {
    url: String,
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

/// Result of a successful `create_project`.
#[derive(Debug)]
pub struct ProjectResult {
  pub config_path: PathBuf,
  pub buildtrees_dir: PathBuf,
  pub packages_dir: PathBuf,
}

/// The configuration written for a new project.
pub fn project_config(project: &str) -> GlobalConfig {
  let mut config = GlobalConfig::default();
  config.global.project = project.to_string();
  config.global.build_type = "debug".to_string();
  config.global.jobs = Some(num_cpus());
  config
}

/// The manifest written for a new port: one empty source and one build
/// configuration with every step empty.
pub fn port_template() -> PortManifest {
  let mut manifest = PortManifest::default();
  manifest.packages.packages.push(SourceEntry::default());
  manifest.build_configs.push(BuildConfig::default());
  manifest
}

/// Write `kiln.toml` for `project` and create the build and install roots.
///
/// # Errors
///
/// Returns an error if `kiln.toml` already exists or anything cannot be written.
pub fn create_project(layout: &RepoLayout, project: &str) -> Result<ProjectResult, InitError> {
  let config_path = layout.config_path();
  if config_path.exists() {
    return Err(InitError::PathExists { path: config_path });
  }

  create_dir(layout.root())?;
  let body = toml::to_string_pretty(&project_config(project))?;
  write_file(&config_path, &format!("{PROJECT_HEADER}{body}"))?;

  let buildtrees_dir = layout.buildtrees_root();
  let packages_dir = layout.packages_root();
  create_dir(&buildtrees_dir)?;
  create_dir(&packages_dir)?;

  info!(path = %config_path.display(), project, "created project");
  Ok(ProjectResult {
    config_path,
    buildtrees_dir,
    packages_dir,
  })
}

/// Write an empty manifest for `descriptor` and return its path.
///
/// # Errors
///
/// Returns an error if the descriptor is malformed, the manifest already
/// exists, or it cannot be written.
pub fn create_port(layout: &RepoLayout, descriptor: &str) -> Result<PathBuf, InitError> {
  let spec = PackageSpec::parse(descriptor)?;
  let path = layout.manifest_path(&spec);
  if path.exists() {
    return Err(InitError::PathExists { path });
  }

  create_dir(&layout.manifest_dir(&spec))?;
  let body = toml::to_string_pretty(&port_template())?;
  let header = PORT_HEADER.replace("{descriptor}", &spec.to_string());
  write_file(&path, &format!("{header}{body}"))?;

  info!(path = %path.display(), package = %spec, "created port");
  Ok(path)
}

/// Clone the configuration repository at `url` into `dest`.
///
/// # Errors
///
/// Returns an error if `dest` exists and is not empty, or the clone fails.
pub fn clone_config_repo(url: &str, dest: &Path) -> Result<PathBuf, InitError> {
  if dest.exists() && fs::read_dir(dest).map(|mut d| d.next().is_some()).unwrap_or(true) {
    return Err(InitError::PathExists {
      path: dest.to_path_buf(),
    });
  }
  if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
    create_dir(parent)?;
  }

  info!(url, dest = %dest.display(), "cloning configuration repository");

  let clone_err = |e: Box<dyn std::error::Error + Send + Sync>| InitError::Clone {
    url: url.to_string(),
    source: e,
  };

  let mut prepared = gix::prepare_clone(url, dest).map_err(|e| clone_err(Box::new(e)))?;
  let (mut checkout, _outcome) = prepared
    .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| clone_err(Box::new(e)))?;
  let (_repo, _outcome) = checkout
    .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| clone_err(Box::new(e)))?;

  info!(path = %dest.display(), "clone complete");
  Ok(dest.to_path_buf())
}

fn create_dir(path: &Path) -> Result<(), InitError> {
  fs::create_dir_all(path).map_err(|e| InitError::CreateDir {
    path: path.to_path_buf(),
    source: e,
  })
}

fn write_file(path: &Path, content: &str) -> Result<(), InitError> {
  fs::write(path, content).map_err(|e| InitError::WriteFile {
    path: path.to_path_buf(),
    source: e,
  })
}
