//! Full install sessions through the public API.

use kiln_lib::package::PackageSpec;
use kiln_lib::session::{InstallError, install};

use super::common::{HostRuntime, TestRepo, tar_gz};

const BUILD_SCRIPT: &str = "#!/bin/sh\nset -e\nmkdir -p \"$1/bin\"\ncp greet \"$1/bin/greet\"\n";
const GREET: &str = "#!/bin/sh\necho hello from the tarball\n";

#[tokio::test]
async fn fetch_extract_build_install_pipeline() {
  let repo = TestRepo::new();
  let mut server = mockito::Server::new_async().await;
  let tarball = tar_gz(&[
    ("hello-1.0/build.sh", BUILD_SCRIPT, 0o755),
    ("hello-1.0/greet", GREET, 0o755),
  ]);
  let mock = server
    .mock("GET", "/src/hello-1.0.tar.gz")
    .with_status(200)
    .with_body(tarball)
    .create_async()
    .await;

  repo.port(
    "hello@demo@1.0",
    &format!(
      r#"
[packages]
packages = [{{ url = "{}/src/hello-1.0.tar.gz", ref = "" }}]

[[build_configs]]
pre_configure = ["kiln_fetch ${{url}}", "kiln_extract ${{last_file}}"]
build_work_dir = "${{build_dir}}/hello-1.0"
build = ["./build.sh ${{install_dir}}"]
"#,
      server.url()
    ),
  );
  repo.port(
    "app@demo@1",
    "[[build_configs]]\ndependencies = [\"hello@demo@1.0\"]\nbuild = [\"greet > ${install_dir}/out\"]\n",
  );
  let runtime = HostRuntime::default();

  let outcome = install(&runtime, &repo.layout, "app@demo@1").await.unwrap();

  mock.assert_async().await;
  assert_eq!(
    outcome.built,
    [PackageSpec::new("hello", "demo", "1.0"), PackageSpec::new("app", "demo", "1")]
  );
  let downloaded = repo
    .layout
    .downloads_dir(&PackageSpec::new("hello", "demo", "1.0"))
    .join("hello-1.0.tar.gz");
  assert!(downloaded.is_file());
  assert!(repo.install_dir("hello", "1.0").join("bin/greet").is_file());
  let out = std::fs::read_to_string(repo.install_dir("app", "1").join("out")).unwrap();
  assert_eq!(out, "hello from the tarball\n");

  let events = runtime.events();
  assert_eq!(events.first().map(String::as_str), Some("rm"));
  assert_eq!(events.get(1).map(String::as_str), Some("run host"));
  assert_eq!(&events[events.len() - 2..], ["stop", "rm"]);
}

#[tokio::test]
async fn failed_download_aborts_and_leaves_no_install_dir() {
  let repo = TestRepo::new();
  let mut server = mockito::Server::new_async().await;
  let _mock = server.mock("GET", "/gone.tar.gz").with_status(404).create_async().await;
  repo.port(
    "gone@demo@1",
    &format!(
      "[[build_configs]]\npre_configure = [\"kiln_fetch {}/gone.tar.gz\"]\nbuild = [\"touch built\"]\n",
      server.url()
    ),
  );
  let runtime = HostRuntime::default();

  let err = install(&runtime, &repo.layout, "gone@demo@1").await.unwrap_err();

  assert!(matches!(err, InstallError::Build { .. }), "unexpected error: {err}");
  assert!(!repo.install_dir("gone", "1").exists());
  assert!(!runtime.events().iter().any(|e| e.starts_with("exec")));
  assert_eq!(runtime.events().last().map(String::as_str), Some("rm"));
}

#[tokio::test]
async fn reinstall_after_success_is_cached() {
  let repo = TestRepo::new();
  repo.port("lib@demo@1", "[[build_configs]]\nbuild = [\"echo ${jobs} > ${install_dir}/jobs\"]\n");
  let runtime = HostRuntime::default();

  let first = install(&runtime, &repo.layout, "lib@demo@1").await.unwrap();
  let second = install(&runtime, &repo.layout, "lib@demo@1").await.unwrap();

  assert_eq!(first.built.len(), 1);
  assert!(second.built.is_empty());
  assert_eq!(second.cached, [PackageSpec::new("lib", "demo", "1")]);
  assert_ne!(first.container, "");
  let jobs = std::fs::read_to_string(repo.install_dir("lib", "1").join("jobs")).unwrap();
  assert_eq!(jobs, "3\n");
}
