//! Install command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

const GREETER: &str = r##"
[[build_configs]]
install = [
  "mkdir -p ${install_dir}/bin",
  'printf "#!/bin/sh\necho hello from ${name}\n" > ${install_dir}/bin/greet',
  "chmod +x ${install_dir}/bin/greet",
]
"##;

const APP: &str = r#"
[[build_configs]]
dependencies = ["greeter@tools@1"]
build = ["greet > ${install_dir}/greeting"]
"#;

#[test]
fn install_single_package() {
  let env = TestEnv::new();
  env.write_port(
    "zlib@compression@1.3",
    "[[build_configs]]\nbuild = [\"echo ${name}-${version} jobs=${jobs} > ${install_dir}/marker\"]\n",
  );

  env
    .kiln_cmd()
    .args(["install", "zlib@compression@1.3"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Packages built: 1"));

  let marker = std::fs::read_to_string(env.install_dir("zlib", "1.3").join("marker")).unwrap();
  assert_eq!(marker, "zlib-1.3 jobs=2\n");
}

#[test]
fn container_lifecycle_wraps_the_build() {
  let env = TestEnv::new();
  env.write_port("zlib@compression@1.3", "[[build_configs]]\nbuild = [\"true\"]\n");

  env.kiln_cmd().args(["install", "zlib@compression@1.3"]).assert().success();

  let log = env.docker_log();
  let actions: Vec<&str> = log.iter().filter_map(|line| line.split_whitespace().next()).collect();
  assert_eq!(actions, ["rm", "run", "exec", "stop", "rm"]);
  assert!(log[1].contains("test:latest sleep infinity"));
  assert!(log[1].contains("--network host"));
}

#[test]
fn dependency_tools_are_on_path() {
  let env = TestEnv::new();
  env.write_port("greeter@tools@1", GREETER);
  env.write_port("app@apps@2", APP);

  env
    .kiln_cmd()
    .args(["install", "app@apps@2"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Packages built: 2"))
    .stdout(predicate::str::contains("greeter@tools@1 → app@apps@2"));

  let greeting = std::fs::read_to_string(env.install_dir("app", "2").join("greeting")).unwrap();
  assert_eq!(greeting, "hello from greeter\n");
}

#[test]
fn second_install_is_served_from_cache() {
  let env = TestEnv::new();
  env.write_port("greeter@tools@1", GREETER);

  env.kiln_cmd().args(["install", "greeter@tools@1"]).assert().success();
  env
    .kiln_cmd()
    .args(["install", "greeter@tools@1"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Packages built: 0"))
    .stdout(predicate::str::contains("Packages cached: 1"));
}

#[test]
fn failing_build_exits_non_zero_and_cleans_up() {
  let env = TestEnv::new();
  env.write_port("broken@x@1", "[[build_configs]]\nbuild = [\"touch partial\", \"exit 3\"]\n");

  env
    .kiln_cmd()
    .args(["install", "broken@x@1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Install of broken@x@1 failed"));

  assert!(!env.install_dir("broken", "1").exists());
  let log = env.docker_log();
  assert!(log.iter().any(|line| line.starts_with("stop ")));
  assert!(log.last().is_some_and(|line| line.starts_with("rm -f ")));
}

#[test]
fn container_start_failure_is_reported() {
  let env = TestEnv::new();
  env.write_port("zlib@compression@1.3", "[[build_configs]]\nbuild = [\"touch built\"]\n");

  env
    .kiln_cmd()
    .env("FAKE_DOCKER_FAIL_RUN", "1")
    .args(["install", "zlib@compression@1.3"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to start container"))
    .stderr(predicate::str::contains("image not found"));

  assert!(!env.docker_log().iter().any(|line| line.starts_with("exec ")));
  assert!(!env.root.join("built").exists());
}

#[test]
fn missing_manifest_fails() {
  let env = TestEnv::new();

  env
    .kiln_cmd()
    .args(["install", "ghost@x@1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("port.toml"));
}
