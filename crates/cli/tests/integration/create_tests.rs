//! Create command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn scaffolded_port_installs_as_noop() {
  let env = TestEnv::new();

  env
    .kiln_cmd()
    .args(["create", "--port", "empty@demo@0.1"])
    .assert()
    .success();

  env
    .kiln_cmd()
    .args(["install", "empty@demo@0.1"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Packages built: 1"));

  assert!(env.install_dir("empty", "0.1").is_dir());
  assert!(!env.docker_log().iter().any(|line| line.starts_with("exec ")));
}

#[test]
fn create_port_twice_fails() {
  let env = TestEnv::new();

  env.kiln_cmd().args(["create", "--port", "zlib@c@1"]).assert().success();
  env
    .kiln_cmd()
    .args(["create", "--port", "zlib@c@1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("already exists"));
}
