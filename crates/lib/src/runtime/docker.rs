//! `docker`-compatible CLI runtime.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use super::{ContainerRuntime, ExecStatus, RunOptions, RuntimeError};
use crate::config::GlobalConfig;

/// Drives containers through a `docker`-style command-line program.
///
/// Any CLI accepting `run`, `exec -w`, `stop` and `rm` with docker's
/// argument conventions works (e.g. `podman`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerCli {
  program: String,
  shell: String,
}

impl DockerCli {
  pub fn new(program: impl Into<String>, shell: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      shell: shell.into(),
    }
  }

  pub fn from_config(config: &GlobalConfig) -> Self {
    Self::new(&config.docker.cli, &config.docker.shell)
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  /// Arguments for `run`.
  fn run_args(name: &str, options: &RunOptions) -> Vec<String> {
    let mount = options.mount.to_string_lossy();
    let mut args = vec!["run".to_string(), "-d".to_string(), "--name".to_string(), name.to_string()];
    if let Some(gpus) = &options.gpus {
      args.extend(["--gpus".to_string(), gpus.clone()]);
    }
    args.extend([
      "--network".to_string(),
      options.network.clone(),
      "-v".to_string(),
      format!("{mount}:{mount}"),
      "-w".to_string(),
      options.work_dir.to_string_lossy().into_owned(),
    ]);
    args.extend(options.extra.iter().cloned());
    args.extend([options.image.clone(), "sleep".to_string(), "infinity".to_string()]);
    args
  }

  /// Arguments for `exec`.
  fn exec_args(&self, name: &str, work_dir: &str, command: &str) -> Vec<String> {
    vec![
      "exec".to_string(),
      "-w".to_string(),
      work_dir.to_string(),
      name.to_string(),
      self.shell.clone(),
      "-c".to_string(),
      command.to_string(),
    ]
  }

  /// Run a management command, capturing stderr for error reporting.
  async fn manage(&self, action: &'static str, name: &str, args: &[String]) -> Result<(), RuntimeError> {
    debug!(program = %self.program, args = ?args, "spawning container cli");
    let output = Command::new(&self.program)
      .args(args)
      .stdin(Stdio::null())
      .output()
      .await
      .map_err(|source| RuntimeError::Spawn {
        program: self.program.clone(),
        source,
      })?;

    if !output.status.success() {
      return Err(RuntimeError::Failed {
        action,
        name: name.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      });
    }
    Ok(())
  }
}

impl Default for DockerCli {
  fn default() -> Self {
    Self::from_config(&GlobalConfig::default())
  }
}

impl ContainerRuntime for DockerCli {
  async fn run(&self, name: &str, options: &RunOptions) -> Result<(), RuntimeError> {
    info!(container = %name, image = %options.image, "starting container");
    self.manage("run", name, &Self::run_args(name, options)).await
  }

  async fn exec(&self, name: &str, work_dir: &str, command: &str) -> Result<ExecStatus, RuntimeError> {
    let args = self.exec_args(name, work_dir, command);
    debug!(program = %self.program, container = %name, work_dir = %work_dir, "spawning command");

    // Build output streams straight to the terminal.
    let status = Command::new(&self.program)
      .args(&args)
      .stdin(Stdio::null())
      .status()
      .await
      .map_err(|source| RuntimeError::Spawn {
        program: self.program.clone(),
        source,
      })?;

    Ok(ExecStatus { code: status.code() })
  }

  async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
    self.manage("stop", name, &["stop".to_string(), name.to_string()]).await
  }

  async fn remove(&self, name: &str) -> Result<(), RuntimeError> {
    self
      .manage("rm", name, &["rm".to_string(), "-f".to_string(), name.to_string()])
      .await
  }
}
