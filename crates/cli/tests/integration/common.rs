//! Shared test helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// A `docker` stand-in. Every invocation is appended to `$FAKE_DOCKER_LOG`;
/// `exec -w DIR NAME SHELL -c CMD` runs `SHELL -c CMD` on the host in `DIR`.
/// `run` fails when `$FAKE_DOCKER_FAIL_RUN` is set.
const FAKE_DOCKER: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_DOCKER_LOG"
case "$1" in
  run)
    if [ -n "$FAKE_DOCKER_FAIL_RUN" ]; then
      echo "fake: image not found" >&2
      exit 125
    fi
    ;;
  exec)
    cd "$3" || exit 126
    shift 4
    exec "$@"
    ;;
esac
exit 0
"#;

/// Isolated repository root wired to the fake container CLI.
pub struct TestEnv {
  pub temp: TempDir,
  pub root: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("repo");
    std::fs::create_dir_all(&root).unwrap();
    let root = dunce::canonicalize(&root).unwrap_or(root);

    let script = temp.path().join("fake-docker");
    std::fs::write(&script, FAKE_DOCKER).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let env = Self { temp, root };
    env.write_file(
      "kiln.toml",
      &format!(
        "[global]\nproject = \"it\"\njobs = 2\n\n[docker]\nimage = \"test:latest\"\ncli = \"{}\"\nshell = \"sh\"\n",
        script.display()
      ),
    );
    env
  }

  /// Write a file relative to the repository root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.root.join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Write the manifest for `name@namespace@version`.
  pub fn write_port(&self, descriptor: &str, content: &str) {
    let parts: Vec<&str> = descriptor.split('@').collect();
    let [name, namespace, version] = parts[..] else {
      panic!("bad descriptor in test: {descriptor}");
    };
    self.write_file(&format!("port/{namespace}/{name}/{version}/port.toml"), content);
  }

  pub fn install_dir(&self, name: &str, version: &str) -> PathBuf {
    self.root.join("packages").join(name).join(version)
  }

  /// Every recorded fake CLI invocation, one per line.
  pub fn docker_log(&self) -> Vec<String> {
    std::fs::read_to_string(self.log_path())
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  fn log_path(&self) -> PathBuf {
    self.temp.path().join("docker.log")
  }

  /// Get a pre-configured Command for the kiln binary.
  ///
  /// Sets `KILN_ROOT` to the isolated repository and points the fake CLI at
  /// its log file.
  pub fn kiln_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("kiln");
    cmd.env("KILN_ROOT", &self.root);
    cmd.env("FAKE_DOCKER_LOG", self.log_path());
    cmd.env_remove("FAKE_DOCKER_FAIL_RUN");
    cmd
  }
}
