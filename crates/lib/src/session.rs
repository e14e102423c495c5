//! Install sessions.
//!
//! One top-level install owns one container. The container is started before
//! resolution begins, shared by the whole dependency tree, and stopped and
//! removed once resolution returns, whatever the outcome. A panic during
//! resolution is re-raised only after teardown.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, GlobalConfig};
use crate::consts::SESSION_PREFIX;
use crate::execute::ExecuteError;
use crate::layout::RepoLayout;
use crate::package::{PackageSpec, PackageSpecError};
use crate::resolve::{DependencyResolver, InstallSession};
use crate::runtime::{ContainerRuntime, DockerCli, RunOptions, RuntimeError, Sandbox};

/// Errors that abort an install.
#[derive(Debug, Error)]
pub enum InstallError {
  #[error(transparent)]
  Spec(#[from] PackageSpecError),

  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("failed to start container '{name}': {source}")]
  ContainerStart {
    name: String,
    #[source]
    source: RuntimeError,
  },

  #[error("dependency cycle: {chain}")]
  DependencyCycle { chain: String },

  #[error("dependency {dependency} failed: {source}")]
  DependencyFailed {
    dependency: PackageSpec,
    #[source]
    source: Box<InstallError>,
  },

  #[error("build of {spec} failed: {source}")]
  Build {
    spec: PackageSpec,
    #[source]
    source: ExecuteError,
  },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Summary of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
  /// Name of the session container.
  pub container: String,
  /// Packages built, in build order.
  pub built: Vec<PackageSpec>,
  /// Packages that were already installed.
  pub cached: Vec<PackageSpec>,
}

/// Sessions started by this process so far.
static SESSION_SEQ: AtomicU64 = AtomicU64::new(0);

/// A session-unique container name: `kiln-session-<unix-seconds>-<pid>-<seq>`.
pub fn session_name() -> String {
  let secs = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_secs())
    .unwrap_or_default();
  let seq = SESSION_SEQ.fetch_add(1, Ordering::Relaxed);
  format!("{SESSION_PREFIX}-{secs}-{}-{seq}", std::process::id())
}

/// Install `descriptor` using `runtime` for the session container.
///
/// Loads `kiln.toml` from the repository root.
pub async fn install<R: ContainerRuntime>(
  runtime: &R,
  layout: &RepoLayout,
  descriptor: &str,
) -> Result<InstallOutcome, InstallError> {
  let spec = PackageSpec::parse(descriptor)?;
  let config = GlobalConfig::load(&layout.config_path())?;
  run_session(runtime, layout, &config, &spec).await
}

/// Install `descriptor` with the container CLI configured in `kiln.toml`.
pub async fn install_with_docker(layout: &RepoLayout, descriptor: &str) -> Result<InstallOutcome, InstallError> {
  let spec = PackageSpec::parse(descriptor)?;
  let config = GlobalConfig::load(&layout.config_path())?;
  let runtime = DockerCli::from_config(&config);
  run_session(&runtime, layout, &config, &spec).await
}

async fn run_session<R: ContainerRuntime>(
  runtime: &R,
  layout: &RepoLayout,
  config: &GlobalConfig,
  spec: &PackageSpec,
) -> Result<InstallOutcome, InstallError> {
  let name = session_name();
  info!(container = %name, package = %spec, image = %config.docker.image, "starting install session");

  // A stale container of the same name would make `run` fail.
  if let Err(e) = runtime.remove(&name).await {
    debug!(container = %name, error = %e, "no stale container removed");
  }

  if let Err(source) = runtime.run(&name, &RunOptions::for_session(config, layout)).await {
    if let Err(e) = runtime.remove(&name).await {
      debug!(container = %name, error = %e, "cleanup after failed start");
    }
    return Err(InstallError::ContainerStart { name, source });
  }

  let mut session = InstallSession::new(Sandbox::new(runtime, name.as_str()));
  let result = AssertUnwindSafe(DependencyResolver::new(layout, config).resolve(spec, &mut session))
    .catch_unwind()
    .await;

  teardown(runtime, &name).await;

  match result {
    Ok(result) => result?,
    Err(panic) => std::panic::resume_unwind(panic),
  }
  let (built, cached) = session.into_results();
  info!(package = %spec, built = built.len(), cached = cached.len(), "install session complete");
  Ok(InstallOutcome {
    container: name,
    built,
    cached,
  })
}

/// Stop and remove the session container. Failures are logged only.
async fn teardown<R: ContainerRuntime>(runtime: &R, name: &str) {
  info!(container = %name, "tearing down container");
  if let Err(e) = runtime.stop(name).await {
    warn!(container = %name, error = %e, "failed to stop container");
  }
  if let Err(e) = runtime.remove(name).await {
    warn!(container = %name, error = %e, "failed to remove container");
  }
}
