//! Test utilities for kiln-lib.
//!
//! Provides a [`RecordingRuntime`] that stands in for a container runtime by
//! running commands on the host, plus helpers for laying out manifests.

use std::path::PathBuf;
use std::sync::Mutex;

use tokio::process::Command;

use crate::layout::RepoLayout;
use crate::package::PackageSpec;
use crate::runtime::{ContainerRuntime, ExecStatus, RunOptions, RuntimeError};

/// A call observed by [`RecordingRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
  Run { name: String, image: String },
  Exec { name: String, work_dir: String, command: String },
  Stop { name: String },
  Remove { name: String },
}

/// Records every call and executes `exec` commands locally with `/bin/sh -c`
/// in the requested working directory.
#[derive(Debug, Default)]
pub struct RecordingRuntime {
  calls: Mutex<Vec<RuntimeCall>>,
  fail_run: bool,
  fail_stop: bool,
  panic_exec: bool,
}

impl RecordingRuntime {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make `run` fail as if the image could not be started.
  pub fn failing_run() -> Self {
    Self {
      fail_run: true,
      ..Self::default()
    }
  }

  /// Make `stop` fail; `remove` still succeeds.
  pub fn failing_stop() -> Self {
    Self {
      fail_stop: true,
      ..Self::default()
    }
  }

  /// Make `exec` panic after recording the call.
  pub fn panicking_exec() -> Self {
    Self {
      panic_exec: true,
      ..Self::default()
    }
  }

  pub fn calls(&self) -> Vec<RuntimeCall> {
    self.calls.lock().unwrap().clone()
  }

  /// Commands passed to `exec`, in order.
  pub fn commands(&self) -> Vec<String> {
    self
      .calls()
      .into_iter()
      .filter_map(|call| match call {
        RuntimeCall::Exec { command, .. } => Some(command),
        _ => None,
      })
      .collect()
  }

  fn record(&self, call: RuntimeCall) {
    self.calls.lock().unwrap().push(call);
  }

  fn failure(action: &'static str, name: &str) -> RuntimeError {
    RuntimeError::Failed {
      action,
      name: name.to_string(),
      code: Some(125),
      stderr: "simulated failure".to_string(),
    }
  }
}

impl ContainerRuntime for RecordingRuntime {
  async fn run(&self, name: &str, options: &RunOptions) -> Result<(), RuntimeError> {
    self.record(RuntimeCall::Run {
      name: name.to_string(),
      image: options.image.clone(),
    });
    if self.fail_run {
      return Err(Self::failure("run", name));
    }
    Ok(())
  }

  async fn exec(&self, name: &str, work_dir: &str, command: &str) -> Result<ExecStatus, RuntimeError> {
    self.record(RuntimeCall::Exec {
      name: name.to_string(),
      work_dir: work_dir.to_string(),
      command: command.to_string(),
    });
    if self.panic_exec {
      panic!("simulated runtime panic");
    }
    let output = Command::new("/bin/sh")
      .arg("-c")
      .arg(command)
      .current_dir(work_dir)
      .output()
      .await
      .map_err(|source| RuntimeError::Spawn {
        program: "/bin/sh".to_string(),
        source,
      })?;
    Ok(ExecStatus {
      code: output.status.code(),
    })
  }

  async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
    self.record(RuntimeCall::Stop { name: name.to_string() });
    if self.fail_stop {
      return Err(Self::failure("stop", name));
    }
    Ok(())
  }

  async fn remove(&self, name: &str) -> Result<(), RuntimeError> {
    self.record(RuntimeCall::Remove { name: name.to_string() });
    Ok(())
  }
}

/// Write `content` as the manifest of `descriptor` under `layout`.
pub fn write_port(layout: &RepoLayout, descriptor: &str, content: &str) -> PathBuf {
  let spec = PackageSpec::parse(descriptor).unwrap();
  let path = layout.manifest_path(&spec);
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(&path, content).unwrap();
  path
}

/// Create the install directory of `descriptor`, marking it as cached.
pub fn mark_installed(layout: &RepoLayout, descriptor: &str) -> PathBuf {
  let spec = PackageSpec::parse(descriptor).unwrap();
  let dir = layout.install_dir(&spec);
  std::fs::create_dir_all(&dir).unwrap();
  dir
}
