//! Shared helpers for library integration tests.

use std::path::PathBuf;
use std::sync::Mutex;

use kiln_lib::layout::RepoLayout;
use kiln_lib::runtime::{ContainerRuntime, ExecStatus, RunOptions, RuntimeError};
use tempfile::TempDir;

/// Runs `exec` commands on the host with `/bin/sh -c` and records the
/// lifecycle calls it sees.
#[derive(Debug, Default)]
pub struct HostRuntime {
  events: Mutex<Vec<String>>,
}

impl HostRuntime {
  pub fn events(&self) -> Vec<String> {
    self.events.lock().unwrap().clone()
  }

  fn push(&self, event: String) {
    self.events.lock().unwrap().push(event);
  }
}

impl ContainerRuntime for HostRuntime {
  async fn run(&self, _name: &str, options: &RunOptions) -> Result<(), RuntimeError> {
    self.push(format!("run {}", options.image));
    Ok(())
  }

  async fn exec(&self, _name: &str, work_dir: &str, command: &str) -> Result<ExecStatus, RuntimeError> {
    self.push(format!("exec {command}"));
    let status = tokio::process::Command::new("/bin/sh")
      .arg("-c")
      .arg(command)
      .current_dir(work_dir)
      .status()
      .await
      .map_err(|source| RuntimeError::Spawn {
        program: "/bin/sh".to_string(),
        source,
      })?;
    Ok(ExecStatus { code: status.code() })
  }

  async fn stop(&self, _name: &str) -> Result<(), RuntimeError> {
    self.push("stop".to_string());
    Ok(())
  }

  async fn remove(&self, _name: &str) -> Result<(), RuntimeError> {
    self.push("rm".to_string());
    Ok(())
  }
}

/// A temporary repository with a minimal `kiln.toml`.
pub struct TestRepo {
  _temp: TempDir,
  pub layout: RepoLayout,
}

impl TestRepo {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let layout = RepoLayout::from_root(temp.path()).unwrap();
    std::fs::write(layout.config_path(), "[global]\njobs = 3\n\n[docker]\nimage = \"host\"\n").unwrap();
    Self { _temp: temp, layout }
  }

  /// Write the manifest of `descriptor`.
  pub fn port(&self, descriptor: &str, content: &str) -> PathBuf {
    let spec = kiln_lib::package::PackageSpec::parse(descriptor).unwrap();
    let path = self.layout.manifest_path(&spec);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
  }

  pub fn install_dir(&self, name: &str, version: &str) -> PathBuf {
    self.layout.packages_root().join(name).join(version)
  }
}

/// A gzip-compressed tarball holding `files` (path, body, mode).
pub fn tar_gz(files: &[(&str, &str, u32)]) -> Vec<u8> {
  let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
  let mut builder = tar::Builder::new(encoder);
  for (path, body, mode) in files {
    let mut header = tar::Header::new_gnu();
    header.set_size(body.len() as u64);
    header.set_mode(*mode);
    header.set_cksum();
    builder.append_data(&mut header, path, body.as_bytes()).unwrap();
  }
  builder.into_inner().unwrap().finish().unwrap()
}
