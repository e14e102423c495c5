//! Container runtime abstraction.
//!
//! Every package of an install session is built inside one long-lived
//! container. The core only needs four operations from a runtime: start an
//! instance, run a shell command inside it at a working directory, and stop
//! and remove it. [`DockerCli`] drives any `docker`-compatible CLI; tests
//! substitute a recording runtime that executes commands on the host.

mod docker;

use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::GlobalConfig;
use crate::layout::RepoLayout;

pub use docker::DockerCli;

/// Errors reported by a container runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
  #[error("failed to spawn '{program}': {source}")]
  Spawn { program: String, source: std::io::Error },

  #[error("container {action} failed for '{name}' (exit code {code:?}): {stderr}")]
  Failed {
    action: &'static str,
    name: String,
    code: Option<i32>,
    stderr: String,
  },
}

/// Exit status of a command run inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecStatus {
  pub code: Option<i32>,
}

impl ExecStatus {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// How a session container is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
  pub image: String,
  pub network: String,
  pub gpus: Option<String>,
  /// Host path mounted at the same path inside the container.
  pub mount: PathBuf,
  pub work_dir: PathBuf,
  /// Extra flags passed through verbatim.
  pub extra: Vec<String>,
}

impl RunOptions {
  /// Session options: the repository root is mounted at its own path so host
  /// and container paths agree.
  pub fn for_session(config: &GlobalConfig, layout: &RepoLayout) -> Self {
    Self {
      image: config.docker.image.clone(),
      network: config.docker.network.clone(),
      gpus: config.docker.gpus.clone().filter(|g| !g.is_empty()),
      mount: layout.root().to_path_buf(),
      work_dir: layout.root().to_path_buf(),
      extra: config.docker.run_options.clone(),
    }
  }
}

/// A runtime able to host a session container.
pub trait ContainerRuntime: Send + Sync {
  /// Start a detached instance named `name`.
  fn run(&self, name: &str, options: &RunOptions) -> impl Future<Output = Result<(), RuntimeError>> + Send;

  /// Run `command` through the container shell at `work_dir`.
  ///
  /// A command that runs and exits non-zero is `Ok` with a failing status;
  /// `Err` means the runtime itself could not be driven.
  fn exec(
    &self,
    name: &str,
    work_dir: &str,
    command: &str,
  ) -> impl Future<Output = Result<ExecStatus, RuntimeError>> + Send;

  fn stop(&self, name: &str) -> impl Future<Output = Result<(), RuntimeError>> + Send;

  fn remove(&self, name: &str) -> impl Future<Output = Result<(), RuntimeError>> + Send;
}

/// Handle to the running session container, passed down the resolution chain.
#[derive(Debug)]
pub struct Sandbox<'a, R: ContainerRuntime> {
  runtime: &'a R,
  name: String,
}

impl<'a, R: ContainerRuntime> Sandbox<'a, R> {
  pub fn new(runtime: &'a R, name: impl Into<String>) -> Self {
    Self {
      runtime,
      name: name.into(),
    }
  }

  pub async fn exec(&self, work_dir: &str, command: &str) -> Result<ExecStatus, RuntimeError> {
    self.runtime.exec(&self.name, work_dir, command).await
  }
}
